// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Canonical byte layout for sketch interchange.
//!
//! Little-endian throughout:
//!
//! ```text
//! byte 0      magic 0xE7
//! byte 1      serial version (1)
//! byte 2      precision p
//! byte 3      flags (bit 0: sparse)
//! byte 4      mixer id
//! bytes 5..8  reserved, zero
//! sparse:     u32 entry count, then count ascending u32 encoded hashes
//! dense:      2^p register bytes
//! ```

use byteorder::{ByteOrder, LE};

use crate::dense::DenseRegisters;
use crate::error::{Error, ErrorKind};
use crate::mixer::Mixer;
use crate::sketch::{HllSketch, Mode, MAX_PRECISION, MIN_PRECISION};
use crate::sparse::SparseList;

const SKETCH_MAGIC: u8 = 0xE7;
const SER_VER: u8 = 1;

// Preamble offsets
const MAGIC_BYTE: usize = 0;
const SER_VER_BYTE: usize = 1;
const PRECISION_BYTE: usize = 2;
const FLAGS_BYTE: usize = 3;
const MIXER_BYTE: usize = 4;
const PREAMBLE_BYTES: usize = 8;
const SPARSE_DATA_START: usize = PREAMBLE_BYTES + 4;

// Flag bit masks (byte 3)
const SPARSE_FLAG_MASK: u8 = 1;

impl HllSketch {
    /// Serialize the sketch into its canonical byte layout.
    ///
    /// Returns `ConfigInvalid` for sketches configured with a custom mixer;
    /// function pointers have no stable identity to write out.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mixer_id = self.mixer.wire_id().ok_or_else(|| {
            Error::new(
                ErrorKind::ConfigInvalid,
                "custom mixers have no serialized form",
            )
        })?;

        let payload = match &self.mode {
            Mode::Sparse(list) => 4 + 4 * list.len(),
            Mode::Dense(registers) => registers.len(),
        };
        let mut bytes = Vec::with_capacity(PREAMBLE_BYTES + payload);

        bytes.push(SKETCH_MAGIC);
        bytes.push(SER_VER);
        bytes.push(self.precision);
        bytes.push(match self.mode {
            Mode::Sparse(_) => SPARSE_FLAG_MASK,
            Mode::Dense(_) => 0,
        });
        bytes.push(mixer_id);
        bytes.extend_from_slice(&[0u8; 3]);

        match &self.mode {
            Mode::Sparse(list) => {
                bytes.extend_from_slice(&(list.len() as u32).to_le_bytes());
                for encoded in list.as_slice() {
                    bytes.extend_from_slice(&encoded.to_le_bytes());
                }
            }
            Mode::Dense(registers) => {
                bytes.extend_from_slice(registers.as_slice());
            }
        }

        Ok(bytes)
    }

    /// Reconstruct a sketch from its canonical byte layout.
    ///
    /// Every field is validated; any inconsistency yields
    /// `MalformedDeserializeData`.
    pub fn from_bytes(bytes: &[u8]) -> Result<HllSketch, Error> {
        if bytes.len() < PREAMBLE_BYTES {
            return Err(malformed("sketch data shorter than the preamble")
                .with_context("len", bytes.len()));
        }

        if bytes[MAGIC_BYTE] != SKETCH_MAGIC {
            return Err(malformed("bad magic byte").with_context("magic", bytes[MAGIC_BYTE]));
        }
        if bytes[SER_VER_BYTE] != SER_VER {
            return Err(
                malformed("unsupported serial version").with_context("version", bytes[SER_VER_BYTE])
            );
        }

        let precision = bytes[PRECISION_BYTE];
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(malformed("precision out of range").with_context("precision", precision));
        }

        let flags = bytes[FLAGS_BYTE];
        if flags & !SPARSE_FLAG_MASK != 0 {
            return Err(malformed("unknown flag bits set").with_context("flags", flags));
        }

        let mixer = Mixer::from_wire_id(bytes[MIXER_BYTE])
            .ok_or_else(|| malformed("unknown mixer id").with_context("id", bytes[MIXER_BYTE]))?;

        let m = 1usize << precision;
        let mode = if flags & SPARSE_FLAG_MASK != 0 {
            if bytes.len() < SPARSE_DATA_START {
                return Err(malformed("sparse sketch data missing entry count"));
            }
            // Adds promote past m/4 entries, but a sparse-sparse merge can
            // legally leave up to m entries behind.
            let count = LE::read_u32(&bytes[PREAMBLE_BYTES..SPARSE_DATA_START]) as usize;
            if count > m {
                return Err(malformed("sparse entry count exceeds the sparse bound")
                    .with_context("count", count)
                    .with_context("bound", m));
            }
            if bytes.len() != SPARSE_DATA_START + 4 * count {
                return Err(malformed("sparse sketch data has the wrong length")
                    .with_context("len", bytes.len())
                    .with_context("count", count));
            }

            let mut entries = Vec::with_capacity(count);
            for i in 0..count {
                let offset = SPARSE_DATA_START + 4 * i;
                entries.push(LE::read_u32(&bytes[offset..offset + 4]));
            }
            if !entries.windows(2).all(|w| w[0] < w[1]) {
                return Err(malformed("sparse entries are not strictly ascending"));
            }

            Mode::Sparse(SparseList::from_sorted(entries))
        } else {
            if bytes.len() != PREAMBLE_BYTES + m {
                return Err(malformed("dense sketch data has the wrong length")
                    .with_context("len", bytes.len())
                    .with_context("expected", PREAMBLE_BYTES + m));
            }

            let registers = bytes[PREAMBLE_BYTES..].to_vec();
            let ceiling = 64 - precision + 1;
            if let Some(&rank) = registers.iter().find(|&&r| r > ceiling) {
                return Err(malformed("register value above the rank ceiling")
                    .with_context("rank", rank)
                    .with_context("ceiling", ceiling));
            }

            Mode::Dense(DenseRegisters::from_bytes(registers))
        };

        Ok(HllSketch {
            precision,
            mixer,
            mode,
        })
    }
}

fn malformed(message: &'static str) -> Error {
    Error::new(ErrorKind::MalformedDeserializeData, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_roundtrip() {
        let mut sketch = HllSketch::with_precision(14).unwrap();
        for i in 0..100u64 {
            sketch.add(i);
        }
        assert!(sketch.is_sparse());

        let bytes = sketch.to_bytes().unwrap();
        let restored = HllSketch::from_bytes(&bytes).unwrap();
        assert_eq!(sketch, restored);
    }

    #[test]
    fn test_dense_roundtrip() {
        let mut sketch = HllSketch::new(10, false, Mixer::Wang).unwrap();
        for i in 0..5000u64 {
            sketch.add(i);
        }

        let bytes = sketch.to_bytes().unwrap();
        let restored = HllSketch::from_bytes(&bytes).unwrap();
        assert_eq!(sketch, restored);
        assert_eq!(restored.mixer(), Mixer::Wang);
    }

    #[test]
    fn test_custom_mixer_refuses_to_serialize() {
        let sketch = HllSketch::new(14, true, Mixer::Custom(|x| x)).unwrap();
        let err = sketch.to_bytes().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_rejects_malformed_preambles() {
        let good = HllSketch::with_precision(14).unwrap().to_bytes().unwrap();

        let cases: Vec<(usize, u8)> = vec![
            (MAGIC_BYTE, 0x00),
            (SER_VER_BYTE, 9),
            (PRECISION_BYTE, 3),
            (PRECISION_BYTE, 19),
            (FLAGS_BYTE, 0xFF),
            (MIXER_BYTE, 7),
        ];
        for (offset, value) in cases {
            let mut bytes = good.clone();
            bytes[offset] = value;
            let err = HllSketch::from_bytes(&bytes).unwrap_err();
            assert_eq!(
                err.kind(),
                ErrorKind::MalformedDeserializeData,
                "offset {offset} value {value}"
            );
        }

        let err = HllSketch::from_bytes(&good[..4]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
    }

    #[test]
    fn test_rejects_unsorted_sparse_entries() {
        let mut sketch = HllSketch::with_precision(14).unwrap();
        sketch.add(1);
        sketch.add(2);
        let mut bytes = sketch.to_bytes().unwrap();

        // Swap the two entries.
        let (a, b) = (SPARSE_DATA_START, SPARSE_DATA_START + 4);
        for i in 0..4 {
            bytes.swap(a + i, b + i);
        }
        let err = HllSketch::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
    }

    #[test]
    fn test_rejects_out_of_bounds_register() {
        let mut sketch = HllSketch::new(4, false, Mixer::default()).unwrap();
        sketch.add(7);
        let mut bytes = sketch.to_bytes().unwrap();
        bytes[PREAMBLE_BYTES] = 64; // above the 64 - 4 + 1 ceiling
        let err = HllSketch::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
    }

    #[test]
    fn test_rejects_truncated_payload() {
        let mut sketch = HllSketch::with_precision(14).unwrap();
        for i in 0..50u64 {
            sketch.add(i);
        }
        let bytes = sketch.to_bytes().unwrap();
        let err = HllSketch::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDeserializeData);
    }
}

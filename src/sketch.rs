//! The HyperLogLog++ sketch façade.

use std::hash::Hash;

use crate::bits::{get_index, get_rank};
use crate::dense::DenseRegisters;
use crate::error::{Error, ErrorKind};
use crate::estimator;
use crate::mixer::Mixer;
use crate::sparse::{decode_index, decode_rank, encode_hash, SparseList, M_PRIME, P_PRIME};

/// Minimum precision allowed.
pub(crate) const MIN_PRECISION: u8 = 4;
/// Maximum precision allowed.
pub(crate) const MAX_PRECISION: u8 = 18;
/// Seed for the item-hashing convenience path.
const DEFAULT_SEED: u32 = 9001;

/// Current sketch representation.
///
/// Exactly one representation is authoritative at a time. Promotion from
/// `Sparse` to `Dense` is the only transition; there is no way back short of
/// [`HllSketch::reset`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Mode {
    Sparse(SparseList),
    Dense(DenseRegisters),
}

/// A HyperLogLog++ sketch estimating the number of distinct 64-bit items.
///
/// The sketch keeps `2^p` registers (or, while small, a sparse list of
/// encoded hashes at an increased precision) and estimates cardinality with
/// a relative error of about `1.04 / sqrt(2^p)`. Items never leave the
/// sketch; only hash-derived state is stored.
///
/// A sketch is a single-owner mutable object. For parallel ingestion,
/// build one sketch per worker and [`merge`](HllSketch::merge) at the end;
/// merge is commutative and associative up to promotion timing.
///
/// # Examples
///
/// ```
/// use hllpp::HllSketch;
///
/// let mut sketch = HllSketch::with_precision(14)?;
/// sketch.add_many(&[1, 2, 3, 2, 1]);
/// assert_eq!(sketch.cardinality(), 3);
/// # Ok::<(), hllpp::error::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HllSketch {
    pub(crate) precision: u8,
    pub(crate) mixer: Mixer,
    pub(crate) mode: Mode,
}

impl HllSketch {
    /// Create a sketch with the given precision, starting representation,
    /// and mixer.
    ///
    /// Returns `ConfigInvalid` when `precision` is outside `[4, 18]`.
    pub fn new(precision: u8, sparse: bool, mixer: Mixer) -> Result<Self, Error> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::new(
                ErrorKind::ConfigInvalid,
                "precision (register count = 2^precision) must be between 4 and 18",
            )
            .with_context("precision", precision));
        }

        let m = 1usize << precision;
        let mode = if sparse {
            Mode::Sparse(SparseList::with_capacity(m / 4 + 1))
        } else {
            Mode::Dense(DenseRegisters::new(m))
        };

        Ok(Self {
            precision,
            mixer,
            mode,
        })
    }

    /// Create a sparse sketch with the default mixer.
    pub fn with_precision(precision: u8) -> Result<Self, Error> {
        Self::new(precision, true, Mixer::default())
    }

    /// The configured precision `p`.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// The configured mixer.
    pub fn mixer(&self) -> Mixer {
        self.mixer
    }

    /// Number of registers in the dense representation.
    pub fn num_registers(&self) -> usize {
        1 << self.precision
    }

    /// Whether the sketch is still in the sparse representation.
    pub fn is_sparse(&self) -> bool {
        matches!(self.mode, Mode::Sparse(_))
    }

    /// Whether no item has been added since construction or reset.
    pub fn is_empty(&self) -> bool {
        match &self.mode {
            Mode::Sparse(list) => list.is_empty(),
            Mode::Dense(registers) => registers.is_empty(),
        }
    }

    /// Add one item.
    pub fn add(&mut self, item: u64) {
        let hash = self.mixer.mix(item);
        self.add_hash(hash);
    }

    /// Add a batch of items.
    pub fn add_many(&mut self, items: &[u64]) {
        for &item in items {
            self.add(item);
        }
    }

    /// Hash an arbitrary item into the sketch.
    ///
    /// The 128-bit murmur output is uniform already, so it feeds the
    /// registers directly without going through the configured mixer.
    pub fn update<T: Hash + ?Sized>(&mut self, item: &T) {
        let mut hasher = mur3::Hasher128::with_seed(DEFAULT_SEED);
        item.hash(&mut hasher);
        let (hash, _) = hasher.finish128();
        self.add_hash(hash);
    }

    /// Route a mixed hash into the current representation.
    pub(crate) fn add_hash(&mut self, hash: u64) {
        match &mut self.mode {
            Mode::Sparse(list) => {
                list.insert(encode_hash(hash, self.precision));
                if list.len() > (1usize << self.precision) / 4 {
                    self.promote();
                }
            }
            Mode::Dense(registers) => {
                let idx = get_index(hash, self.precision) as usize;
                let rank = get_rank(hash, self.precision);
                registers.update(idx, rank);
            }
        }
    }

    /// Return to the sparse empty state.
    pub fn reset(&mut self) {
        let m = 1usize << self.precision;
        self.mode = Mode::Sparse(SparseList::with_capacity(m / 4 + 1));
    }

    /// Switch from the sparse list to dense registers. Irreversible.
    ///
    /// Every encoded hash is decoded back to its index and rank at the
    /// normal precision; registers take the maximum per index.
    pub(crate) fn promote(&mut self) {
        let list = match &self.mode {
            Mode::Sparse(list) => list,
            Mode::Dense(_) => return,
        };

        let mut registers = DenseRegisters::new(1 << self.precision);
        for encoded in list.iter() {
            let idx = decode_index(encoded, self.precision) as usize;
            let rank = decode_rank(encoded, self.precision);
            registers.update(idx, rank);
        }
        self.mode = Mode::Dense(registers);
    }

    /// Merge another sketch into this one.
    ///
    /// Returns `PrecisionMismatch` when the precisions differ. Merging may
    /// promote this sketch to the dense representation: always when the
    /// other sketch is dense, and when the two sparse lists together hold
    /// more entries than there are registers. That bound double-counts
    /// indices present in both lists, so promotion can fire earlier than
    /// strictly necessary.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if self.precision != other.precision {
            return Err(Error::new(
                ErrorKind::PrecisionMismatch,
                "merged sketches must share the same precision",
            )
            .with_context("precision", self.precision)
            .with_context("other_precision", other.precision));
        }

        let m = 1usize << self.precision;
        let needs_promotion = match (&self.mode, &other.mode) {
            (Mode::Sparse(list), Mode::Sparse(other_list)) => list.len() + other_list.len() > m,
            (Mode::Sparse(_), Mode::Dense(_)) => true,
            (Mode::Dense(_), _) => false,
        };
        if needs_promotion {
            self.promote();
        }

        match (&mut self.mode, &other.mode) {
            (Mode::Sparse(list), Mode::Sparse(other_list)) => {
                for encoded in other_list.iter() {
                    list.insert(encoded);
                }
            }
            (Mode::Dense(registers), Mode::Sparse(other_list)) => {
                for encoded in other_list.iter() {
                    let idx = decode_index(encoded, self.precision) as usize;
                    let rank = decode_rank(encoded, self.precision);
                    registers.update(idx, rank);
                }
            }
            (Mode::Dense(registers), Mode::Dense(other_registers)) => {
                registers.merge(other_registers);
            }
            (Mode::Sparse(_), Mode::Dense(_)) => unreachable!("promoted above"),
        }

        Ok(())
    }

    /// Estimated number of distinct items added so far.
    ///
    /// Uses Ertl's improved estimator, which handles the small- and
    /// large-cardinality boundaries without threshold switching and stays
    /// monotone across them.
    pub fn cardinality(&self) -> u64 {
        self.ertl_cardinality()
    }

    /// Cardinality estimate per Ertl, 2017.
    pub fn ertl_cardinality(&self) -> u64 {
        let estimate = match &self.mode {
            Mode::Sparse(list) => {
                let q = 64 - P_PRIME;
                let histogram = estimator::sparse_histogram(list, self.precision);
                estimator::ertl_estimate(&histogram, M_PRIME, q)
            }
            Mode::Dense(registers) => {
                let q = 64 - self.precision;
                let histogram = estimator::register_histogram(registers.as_slice(), q);
                estimator::ertl_estimate(&histogram, registers.len() as u64, q)
            }
        };
        estimate.round() as u64
    }

    /// Cardinality estimate per Heule et al., 2013.
    ///
    /// Sparse sketches use linear counting at the increased sparse
    /// precision. Dense sketches use linear counting while it stays under
    /// the per-precision threshold, then the bias-corrected raw estimate.
    pub fn heule_cardinality(&self) -> u64 {
        let registers = match &self.mode {
            Mode::Sparse(list) => {
                let estimate = estimator::linear_counting(M_PRIME, M_PRIME - list.len() as u64);
                return estimate.round() as u64;
            }
            Mode::Dense(registers) => registers,
        };

        let m = registers.len() as u64;
        let zeros = registers.count_zeros() as u64;
        if zeros > 0 {
            let lc_estimate = estimator::linear_counting(m, zeros);
            if lc_estimate <= crate::bias::threshold(self.precision) {
                return lc_estimate.round() as u64;
            }
        }

        let mut estimate = estimator::raw_estimate(registers.as_slice());
        if estimate <= 5.0 * m as f64 {
            estimate -= crate::bias::estimate_bias(estimate, self.precision);
        }
        estimate.round() as u64
    }
}

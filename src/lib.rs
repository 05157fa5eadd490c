//! HyperLogLog++ sketch for cardinality estimation.
//!
//! This crate provides a probabilistic data structure for estimating the
//! number of distinct 64-bit items in a stream using `2^p` bytes of state,
//! with a relative error of about `1.04 / sqrt(2^p)`.
//!
//! # Overview
//!
//! The sketch follows the HyperLogLog++ refinements of Heule et al., 2013,
//! and supports two storage representations that adapt to cardinality:
//!
//! - **Sparse mode**: stores one 32-bit encoded hash per observed index at
//!   an increased precision while few registers are populated
//! - **Dense mode**: stores one rank byte per register; the sketch promotes
//!   to it automatically once the sparse list outgrows its budget
//!
//! Two estimators are available: Ertl's improved estimator (the default,
//! free of empirical correction tables) and Heule's original combination of
//! linear counting and bias-corrected raw estimation.
//!
//! # Mixers
//!
//! Items are routed through a configurable 64-bit mixer. Three well-known
//! mixers are built in (Numerical Recipes, the MurmurHash3 finalizer, and
//! Thomas Wang's mixer); any pure `fn(u64) -> u64` can be supplied instead.
//!
//! # Example
//!
//! ```
//! use hllpp::{HllSketch, Mixer};
//!
//! let mut workers: Vec<HllSketch> = (0..4)
//!     .map(|_| HllSketch::new(14, true, Mixer::Murmur3Finalizer))
//!     .collect::<Result<_, _>>()?;
//!
//! for (i, worker) in workers.iter_mut().enumerate() {
//!     let base = (i as u64) * 1000;
//!     for item in base..base + 1000 {
//!         worker.add(item);
//!     }
//! }
//!
//! let mut combined = workers.pop().unwrap();
//! for worker in &workers {
//!     combined.merge(worker)?;
//! }
//! let estimate = combined.cardinality();
//! assert!((3800..=4200).contains(&estimate));
//! # Ok::<(), hllpp::error::Error>(())
//! ```

mod bias;
mod bits;
mod dense;
pub mod error;
mod estimator;
mod mixer;
mod serialization;
mod sketch;
mod sparse;

pub use error::{Error, ErrorKind};
pub use mixer::Mixer;
pub use sketch::HllSketch;

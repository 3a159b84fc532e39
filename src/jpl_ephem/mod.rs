//! # JPL DE binary ephemerides
//!
//! Decoding and evaluation of the fixed-record binary files distributed by JPL
//! (`lnxp1600p2200.405`, `linux_p1550p2650.440`, ...).
//!
//! - [`byte_order`]: endianness heuristic and nom decoding primitives
//! - [`header`]: first record (layout, descriptors, version table)
//! - [`records`]: data records and the Chebyshev kernel
//! - [`store`]: [`EphemerisStore`], the public entry point
//! - [`bodies`]: descriptor slot identifiers
//! - [`state_vector`]: evaluation results

pub mod bodies;
pub mod byte_order;
pub mod header;
pub mod records;
pub mod state_vector;
pub mod store;

pub use bodies::Body;
pub use state_vector::{Evaluation, StateVector};
pub use store::{EphemerisStore, LoadSpan};

//! Local alignment of adapter, barcode, and primer queries against read windows
//!
//! The engine is a Smith-Waterman with affine gaps and a reusable
//! workspace sized for the longest supported query and window. Each worker
//! thread owns one [`AlignmentConfig`] and drives every alignment through it,
//! so steady-state trimming performs no allocation in the scoring loop.
mod config;
mod engine;
mod result;

pub use config::{AlignmentConfig, Scoring, MAX_QUERY_LEN, MAX_TARGET_LEN};
pub use result::AlignmentResult;

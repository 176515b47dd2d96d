//! Asset export
//!
//! Dumps what a provider can supply to disk, which is the quickest way to
//! check a localization pack for gaps.

mod wav;

pub use wav::{dump_assets, DumpSummary};

//! Pipeline entry points.
//!
//! - `walk`: paginate the news listing
//! - `sync`: backfill and incremental update of the canonical collection
//! - `translate`: fill the per-language collections
//! - `merge`: pure diff and merge of collections

pub mod merge;
pub mod sync;
pub mod translate;
pub mod walk;

pub use sync::{ListReport, SyncReport, Synchronizer, UpdateReport};
pub use translate::{TranslationJob, TranslationReport, parse_translation};
pub use walk::{StopReason, WalkOutcome, Walker};

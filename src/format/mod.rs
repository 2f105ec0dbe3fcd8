//! Text rendering for narrow display surfaces
//!
//! - `ConsolidationFormatter`: width-budgeted event lines and duplicate runs
//! - `RecordEquivalence`: pluggable "is this a duplicate" policy

mod equivalence;
mod formatter;

pub use equivalence::{EquivalencePolicy, RecordEquivalence};
pub use formatter::{count_suffix_len, push_count_suffix, ConsolidationFormatter, ELLIPSIS};

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/quarry/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod document;
pub mod error;
pub mod facts;
pub mod scale;
pub mod table;

pub use context::{ContextDescriptor, ContextRules, Dimension, ParseStatus, PeriodKind, RuleSpec};
pub use document::{DocumentInfo, TaggedDocument, TaggedElement};
pub use error::{ExtractError, Result};
pub use facts::{ExtractionConfig, RawFact, concepts, extract_facts};
pub use scale::{Decimals, NormalizedValue, normalize};
pub use table::{LongFormRow, LongFormTable, Provenance};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

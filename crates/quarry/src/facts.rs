//! Fact extraction from parsed instance documents.
//!
//! The extractor walks a [`TaggedDocument`] and pulls out every
//! occurrence of the configured target concepts, together with the
//! side-band metadata needed to interpret each occurrence. The same
//! concept routinely appears many times per document — different
//! reporting periods, consolidated vs. subsidiary contexts — and every
//! occurrence is kept.

use crate::document::TaggedDocument;
use crate::scale::Decimals;
use serde::{Deserialize, Serialize};

/// One tagged occurrence of a target concept.
///
/// Created once per occurrence found in a document, immutable
/// thereafter, and consumed by the table assembler. Attributes absent
/// in the source are `None`, never an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFact {
    /// Taxonomy-qualified concept name (e.g. "us-gaap:NetIncomeLoss")
    pub concept: String,

    /// Literal text content of the occurrence (numeric or textual)
    pub value: String,

    /// Opaque context reference linking to period/entity metadata
    pub context_ref: Option<String>,

    /// Currency/unit identifier; absent for non-monetary facts
    pub unit_ref: Option<String>,

    /// Declared rounding precision; absent means exact
    pub decimals: Option<Decimals>,

    /// Document-local tracking id, retained for traceability only
    pub source_id: Option<String>,
}

/// The set of target concepts to extract from each document.
///
/// Supplied as data so operators can add financial-statement concepts
/// without touching extraction logic; never ambient or global state,
/// so multiple extraction profiles can run concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Taxonomy-qualified concept names to look for
    pub concepts: Vec<String>,
}

impl ExtractionConfig {
    /// Build a config from a list of concept names.
    pub const fn new(concepts: Vec<String>) -> Self {
        Self { concepts }
    }

    /// Income-statement and balance-sheet concepts commonly present in
    /// insurance and financial-sector quarterly reports.
    pub fn standard() -> Self {
        Self::new(
            [
                concepts::ASSETS_CURRENT,
                concepts::EPS_BASIC,
                concepts::NET_INCOME,
                concepts::OPERATING_EXPENSES,
                concepts::REVENUES,
                concepts::STOCKHOLDERS_EQUITY,
                concepts::LIABILITIES_AND_EQUITY,
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        )
    }
}

/// Common US-GAAP concept names.
pub mod concepts {
    /// Current assets
    pub const ASSETS_CURRENT: &str = "us-gaap:AssetsCurrent";

    /// Earnings per share, basic
    pub const EPS_BASIC: &str = "us-gaap:EarningsPerShareBasic";

    /// Net income (loss)
    pub const NET_INCOME: &str = "us-gaap:NetIncomeLoss";

    /// Operating expenses
    pub const OPERATING_EXPENSES: &str = "us-gaap:OperatingExpenses";

    /// Total revenues
    pub const REVENUES: &str = "us-gaap:Revenues";

    /// Stockholders' equity
    pub const STOCKHOLDERS_EQUITY: &str = "us-gaap:StockholdersEquity";

    /// Total liabilities and stockholders' equity
    pub const LIABILITIES_AND_EQUITY: &str = "us-gaap:LiabilitiesAndStockholdersEquity";
}

/// Extract every occurrence of the configured concepts from a document.
///
/// For each concept, all occurrences are taken in document order. A
/// concept not present in the document contributes zero facts; that is
/// an empty result, not an error. The document itself is only
/// traversed, never mutated or re-parsed.
pub fn extract_facts(document: &TaggedDocument, config: &ExtractionConfig) -> Vec<RawFact> {
    let mut facts = Vec::new();

    for concept in &config.concepts {
        for element in document.find_all(concept) {
            facts.push(RawFact {
                concept: element.name.clone(),
                value: element.text.trim().to_string(),
                context_ref: element.attr("contextRef").map(str::to_string),
                unit_ref: element.attr("unitRef").map(str::to_string),
                decimals: element.attr("decimals").and_then(Decimals::parse),
                source_id: element.attr("id").map(str::to_string),
            });
        }
    }

    facts
}

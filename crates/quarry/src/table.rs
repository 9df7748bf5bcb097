//! Long-form table assembly.
//!
//! The assembler combines raw facts, decoded context descriptors, and
//! normalized values into one growing long-form (tidy) table: one row
//! per observed fact occurrence, tagged with the provenance of the
//! filing it came from. Repeated calls accumulate across filings and
//! companies, which is the point — the table is built for
//! cross-filing, cross-company analysis.

use crate::context::{ContextDescriptor, ContextRules};
use crate::facts::RawFact;
use crate::scale::{NormalizedValue, normalize};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Provenance tags applied to every row of one assembly call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Company identifier (CIK or ticker)
    pub company_id: String,

    /// Filing date of the source document
    pub filing_date: NaiveDate,

    /// Identifier of the source document (accession number or URL)
    pub source_document_id: String,
}

/// One row of the long-form table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongFormRow {
    /// Company identifier from the assembly provenance
    pub company_id: String,

    /// Filing date from the assembly provenance
    pub filing_date: NaiveDate,

    /// Taxonomy-qualified concept name
    pub concept: String,

    /// Decoded context descriptor (always present, possibly unmatched)
    pub context: ContextDescriptor,

    /// Currency/unit identifier, if declared
    pub unit: Option<String>,

    /// Literal reported value
    pub raw_value: String,

    /// Rescaled numeric value, or a non-numeric marker
    pub normalized: NormalizedValue,

    /// Document-local tracking id, if declared
    pub source_id: Option<String>,
}

/// The accumulated long-form table.
///
/// Row order is insertion order — concept-extraction order within a
/// document, documents in input order — and carries no semantic
/// guarantee beyond reproducibility. The table is the only owner of
/// its rows and mutates solely by appending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LongFormTable {
    rows: Vec<LongFormRow>,
}

impl LongFormTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row per raw fact, resolving context descriptors and
    /// normalized values on the way. Returns the number of rows added.
    ///
    /// Identical `context_ref` strings within one call are decoded
    /// once through a call-scoped cache. The cache deliberately does
    /// not outlive the call, so descriptors from different documents
    /// can never collide.
    ///
    /// No deduplication is performed: the same concept reported under
    /// both a consolidated and a subsidiary context is two meaningful
    /// rows, not a duplicate.
    pub fn assemble(
        &mut self,
        facts: &[RawFact],
        provenance: &Provenance,
        rules: &ContextRules,
    ) -> usize {
        let mut cache: HashMap<String, ContextDescriptor> = HashMap::new();

        for fact in facts {
            let context_ref = fact.context_ref.as_deref().unwrap_or("");
            let context = cache
                .entry(context_ref.to_string())
                .or_insert_with(|| rules.decode(context_ref))
                .clone();

            self.rows.push(LongFormRow {
                company_id: provenance.company_id.clone(),
                filing_date: provenance.filing_date,
                concept: fact.concept.clone(),
                context,
                unit: fact.unit_ref.clone(),
                raw_value: fact.value.clone(),
                normalized: normalize(&fact.value, fact.decimals),
                source_id: fact.source_id.clone(),
            });
        }

        facts.len()
    }

    /// All rows, in insertion order.
    pub fn rows(&self) -> &[LongFormRow] {
        &self.rows
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows contributed for one company.
    pub fn rows_for_company<'a>(
        &'a self,
        company_id: &'a str,
    ) -> impl Iterator<Item = &'a LongFormRow> + 'a {
        self.rows.iter().filter(move |r| r.company_id == company_id)
    }

    /// Absorb another table, appending its rows after this table's.
    ///
    /// Supports the one-assembler-per-worker pattern: workers build
    /// private tables over independent documents and merge at the end.
    pub fn merge(&mut self, other: Self) {
        self.rows.extend(other.rows);
    }
}

impl<'a> IntoIterator for &'a LongFormTable {
    type Item = &'a LongFormRow;
    type IntoIter = std::slice::Iter<'a, LongFormRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

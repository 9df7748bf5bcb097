//! Export functionality for the long-form fact table.
//!
//! Downstream consumers expect a flat tabular serialization with a
//! stable column order: company_id, filing_date, concept, period_kind,
//! period_start, period_end, entity_id, dimensions, unit, raw_value,
//! magnitude, scale_label, source_id.

use chrono::NaiveDate;
use quarry::{LongFormRow, LongFormTable, PeriodKind};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One flattened output row in the stable column order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlatRow {
    /// Company identifier.
    pub company_id: String,

    /// Filing date.
    pub filing_date: NaiveDate,

    /// Taxonomy-qualified concept name.
    pub concept: String,

    /// Period kind ("instant", "duration", "unspecified").
    pub period_kind: String,

    /// Period start date, empty for instants and unmatched contexts.
    pub period_start: Option<NaiveDate>,

    /// Period end date.
    pub period_end: Option<NaiveDate>,

    /// Registrant identifier from the context.
    pub entity_id: Option<String>,

    /// Dimensional qualifiers flattened as "axis=member|axis=member".
    pub dimensions: String,

    /// Currency/unit identifier.
    pub unit: Option<String>,

    /// Literal reported value.
    pub raw_value: String,

    /// Rescaled numeric value; empty for non-numeric facts.
    pub magnitude: Option<f64>,

    /// Unit multiplier applied to the magnitude.
    pub scale_label: String,

    /// Document-local tracking id.
    pub source_id: Option<String>,
}

impl From<&LongFormRow> for FlatRow {
    fn from(row: &LongFormRow) -> Self {
        let period_kind = match row.context.period_kind {
            PeriodKind::Instant => "instant",
            PeriodKind::Duration => "duration",
            PeriodKind::Unspecified => "unspecified",
        };

        let dimensions = row
            .context
            .dimensions
            .iter()
            .map(|d| format!("{}={}", d.axis, d.member))
            .collect::<Vec<_>>()
            .join("|");

        Self {
            company_id: row.company_id.clone(),
            filing_date: row.filing_date,
            concept: row.concept.clone(),
            period_kind: period_kind.to_string(),
            period_start: row.context.period_start,
            period_end: row.context.period_end,
            entity_id: row.context.entity_id.clone(),
            dimensions,
            unit: row.unit.clone(),
            raw_value: row.raw_value.clone(),
            magnitude: row.normalized.magnitude,
            scale_label: row.normalized.scale_label.clone(),
            source_id: row.source_id.clone(),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for LongFormTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let flat: Vec<FlatRow> = self.rows().iter().map(FlatRow::from).collect();

        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in &flat {
                    wtr.serialize(record)?;
                }
                let data = String::from_utf8(wtr.into_inner().map_err(|e| e.into_error())?)
                    .expect("CSV output is UTF-8");
                Ok(data)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&flat)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&flat)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry::{ContextRules, Decimals, Provenance, RawFact};

    fn sample_table() -> LongFormTable {
        let rules = ContextRules::standard();
        let mut table = LongFormTable::new();

        let facts = vec![
            RawFact {
                concept: "us-gaap:NetIncomeLoss".to_string(),
                value: "1234000000".to_string(),
                context_ref: Some(
                    "FROM_Jul01_2018_TO_Sep30_2018_Entity_0000005272\
                     _dei_LegalEntityAxis_srt_ParentCompanyMember"
                        .to_string(),
                ),
                unit_ref: Some("USD".to_string()),
                decimals: Some(Decimals::Digits(-6)),
                source_id: Some("Fact-01".to_string()),
            },
            RawFact {
                concept: "us-gaap:NetIncomeLoss".to_string(),
                value: "n/a".to_string(),
                context_ref: Some("garbage_string".to_string()),
                unit_ref: None,
                decimals: None,
                source_id: None,
            },
        ];

        table.assemble(
            &facts,
            &Provenance {
                company_id: "0000005272".to_string(),
                filing_date: NaiveDate::from_ymd_opt(2018, 11, 2).unwrap(),
                source_document_id: "aig-20180930.xml".to_string(),
            },
            &rules,
        );
        table
    }

    #[test]
    fn test_csv_column_order() {
        let csv = sample_table().export_to_string(ExportFormat::Csv).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "company_id,filing_date,concept,period_kind,period_start,period_end,\
             entity_id,dimensions,unit,raw_value,magnitude,scale_label,source_id"
        );
    }

    #[test]
    fn test_csv_rows() {
        let csv = sample_table().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);

        assert!(lines[1].contains("duration"));
        assert!(lines[1].contains("2018-07-01"));
        assert!(lines[1].contains("2018-09-30"));
        assert!(lines[1].contains("1234"));
        assert!(lines[1].contains("millions"));
        assert!(lines[1].contains("dei_LegalEntityAxis=srt_ParentCompanyMember"));

        // Non-numeric row keeps its raw text and an empty magnitude.
        assert!(lines[2].contains("n/a"));
        assert!(lines[2].contains("unspecified"));
    }

    #[test]
    fn test_json_export() {
        let json = sample_table().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"us-gaap:NetIncomeLoss\""));
        assert!(json.contains("\"millions\""));
        assert!(json.contains("\"magnitude\":null"));
    }

    #[test]
    fn test_pretty_json_export() {
        let json = sample_table()
            .export_to_string(ExportFormat::PrettyJson)
            .unwrap();
        assert!(json.contains("  "));
    }

    #[test]
    fn test_export_to_file() {
        use std::io::Read;

        let table = sample_table();
        let path = std::env::temp_dir().join("quarry_test_export.csv");

        table.export_to_file(&path, ExportFormat::Csv).unwrap();
        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.contains("us-gaap:NetIncomeLoss"));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_empty_table_csv_has_no_rows() {
        let table = LongFormTable::new();
        let csv = table.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.is_empty());
    }
}

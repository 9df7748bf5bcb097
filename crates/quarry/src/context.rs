//! Context reference decoding.
//!
//! Every XBRL fact carries a `contextRef` string linking it to the
//! reporting period, legal entity, and dimensional qualifiers it
//! applies to. EDGAR filings encode this information directly in the
//! reference string, but the grammar is not uniform: instant and
//! date-range encodings are mixed, entity identifiers are optional,
//! and dimensional axis/member suffixes are appended over time as
//! taxonomies evolve.
//!
//! The decoder therefore works from an ordered list of pattern rules,
//! most specific first. The first rule whose pattern matches the head
//! of the string fixes the period kind, dates, and entity id; whatever
//! trails the match is scanned separately for axis/member qualifier
//! pairs. Decoding is total: a string matching no rule yields an
//! [`Unmatched`](ParseStatus::Unmatched) descriptor that still carries
//! the raw input, so no row is ever silently dropped. New context
//! shapes are handled by adding a [`RuleSpec`] rather than touching
//! the decode logic.

use crate::error::{ExtractError, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Date encoding used inside context references, e.g. "Sep30_2018".
const CONTEXT_DATE_FORMAT: &str = "%b%d_%Y";

/// Regex fragment recognizing one context date ("MmmDD_YYYY").
const DATE_FRAGMENT: &str = r"[A-Z][a-z]{2}\d{2}_\d{4}";

/// Temporal kind of a decoded context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    /// Fact valid at a single point in time (balance sheet items)
    Instant,
    /// Fact valid over a date range (income statement items)
    Duration,
    /// Context carried no recognizable temporal information
    Unspecified,
}

/// How much of a context reference the rule set could account for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseStatus {
    /// A rule matched and every captured component decoded cleanly
    Matched,
    /// A rule matched but some component (typically a date) did not decode
    PartiallyMatched,
    /// No rule matched; only the raw string is available
    Unmatched,
}

/// One axis/member dimensional qualifier, e.g. restricting a fact to
/// the parent company rather than the consolidated group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Axis name including its taxonomy prefix (e.g. "dei_LegalEntityAxis")
    pub axis: String,
    /// Member name including its taxonomy prefix (e.g. "srt_ParentCompanyMember")
    pub member: String,
}

/// Structured form of one `contextRef` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextDescriptor {
    /// Temporal kind of the context
    pub period_kind: PeriodKind,

    /// Period start date; always `None` for instant contexts
    pub period_start: Option<NaiveDate>,

    /// Period end date (or the instant itself)
    pub period_end: Option<NaiveDate>,

    /// Registrant identifier embedded in the context, if any
    pub entity_id: Option<String>,

    /// Dimensional qualifiers; empty means the unqualified/consolidated context
    pub dimensions: Vec<Dimension>,

    /// The original reference string, always retained
    pub raw: String,

    /// Decode fidelity
    pub parse_status: ParseStatus,
}

impl ContextDescriptor {
    /// Descriptor for a string no rule recognized.
    pub fn unmatched(raw: &str) -> Self {
        Self {
            period_kind: PeriodKind::Unspecified,
            period_start: None,
            period_end: None,
            entity_id: None,
            dimensions: Vec::new(),
            raw: raw.to_string(),
            parse_status: ParseStatus::Unmatched,
        }
    }

    /// Returns true when the context carries no dimensional qualifiers,
    /// i.e. refers to the consolidated reporting entity.
    pub fn is_consolidated(&self) -> bool {
        self.dimensions.is_empty()
    }
}

/// A context pattern rule supplied as data.
///
/// `pattern` is a regex applied to the head of the reference string
/// (anchor it with `^`). Recognized named capture groups: `start` and
/// `end` for dates in "MmmDD_YYYY" form, and `entity` for the
/// registrant identifier. Groups the pattern does not define are
/// simply left unpopulated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule name, used in configuration errors
    pub name: String,
    /// Period kind a match implies
    pub kind: PeriodKind,
    /// Regex with optional `start`/`end`/`entity` named groups
    pub pattern: String,
}

/// One compiled pattern rule.
#[derive(Debug, Clone)]
struct PatternRule {
    name: String,
    kind: PeriodKind,
    regex: Regex,
}

/// Ordered context pattern rules plus the qualifier-segment pattern.
///
/// Rules are tried in order; the first match wins, so more qualified
/// shapes must precede their less qualified prefixes.
#[derive(Debug, Clone)]
pub struct ContextRules {
    rules: Vec<PatternRule>,
    qualifier: Regex,
}

impl ContextRules {
    /// The built-in rule set covering the context shapes observed in
    /// EDGAR filings: date ranges and instants, each with an optional
    /// entity suffix, plus bare entity references.
    pub fn standard() -> Self {
        let specs = [
            (
                "duration_entity",
                PeriodKind::Duration,
                format!(
                    r"^FROM_(?P<start>{d})_TO_(?P<end>{d})_Entity_(?P<entity>\d+)",
                    d = DATE_FRAGMENT
                ),
            ),
            (
                "duration",
                PeriodKind::Duration,
                format!(r"^FROM_(?P<start>{d})_TO_(?P<end>{d})", d = DATE_FRAGMENT),
            ),
            (
                "instant_entity",
                PeriodKind::Instant,
                format!(
                    r"^AS_OF_(?P<end>{d})_Entity_(?P<entity>\d+)",
                    d = DATE_FRAGMENT
                ),
            ),
            (
                "instant",
                PeriodKind::Instant,
                format!(r"^AS_OF_(?P<end>{d})", d = DATE_FRAGMENT),
            ),
            (
                "entity_only",
                PeriodKind::Unspecified,
                r"^Entity_(?P<entity>\d+)".to_string(),
            ),
        ];

        let rules = specs
            .into_iter()
            .map(|(name, kind, pattern)| PatternRule {
                name: name.to_string(),
                kind,
                regex: Regex::new(&pattern).expect("built-in context pattern is valid"),
            })
            .collect();

        Self {
            rules,
            qualifier: Self::qualifier_pattern(),
        }
    }

    /// Compile a rule set from data.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Rule`] naming the first spec whose
    /// pattern fails to compile.
    pub fn from_specs(specs: &[RuleSpec]) -> Result<Self> {
        let mut rules = Vec::with_capacity(specs.len());
        for spec in specs {
            let regex = Regex::new(&spec.pattern).map_err(|source| ExtractError::Rule {
                name: spec.name.clone(),
                source,
            })?;
            rules.push(PatternRule {
                name: spec.name.clone(),
                kind: spec.kind,
                regex,
            });
        }
        Ok(Self {
            rules,
            qualifier: Self::qualifier_pattern(),
        })
    }

    /// Append a rule, trying it after all existing rules.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Rule`] when the pattern fails to compile.
    pub fn push_rule(&mut self, spec: &RuleSpec) -> Result<()> {
        let regex = Regex::new(&spec.pattern).map_err(|source| ExtractError::Rule {
            name: spec.name.clone(),
            source,
        })?;
        self.rules.push(PatternRule {
            name: spec.name.clone(),
            kind: spec.kind,
            regex,
        });
        Ok(())
    }

    /// Number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Names of the rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Decode one context reference string.
    ///
    /// Total over all inputs: the worst case is an `Unmatched`
    /// descriptor carrying the raw string. Callers must not treat
    /// unmatched contexts as filterable noise; they are valid rows
    /// with reduced fidelity and a signal to extend the rule set.
    pub fn decode(&self, raw: &str) -> ContextDescriptor {
        for rule in &self.rules {
            if let Some(caps) = rule.regex.captures(raw) {
                return self.build_descriptor(raw, rule, &caps);
            }
        }
        ContextDescriptor::unmatched(raw)
    }

    fn build_descriptor(
        &self,
        raw: &str,
        rule: &PatternRule,
        caps: &regex::Captures<'_>,
    ) -> ContextDescriptor {
        let mut degraded = false;
        let mut parse_date = |group: &str| -> Option<NaiveDate> {
            let text = caps.name(group)?.as_str();
            match NaiveDate::parse_from_str(text, CONTEXT_DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    degraded = true;
                    None
                }
            }
        };

        let mut period_start = parse_date("start");
        let period_end = parse_date("end");
        let entity_id = caps.name("entity").map(|m| m.as_str().to_string());

        // An inverted range would violate the start <= end invariant;
        // keep the end date and downgrade instead of discarding.
        if let (Some(start), Some(end)) = (period_start, period_end)
            && start > end
        {
            period_start = None;
            degraded = true;
        }

        // Instant contexts only populate the end date.
        if rule.kind == PeriodKind::Instant {
            period_start = None;
        }

        let matched_end = caps.get(0).map_or(raw.len(), |m| m.end());
        let dimensions = self.parse_qualifiers(&raw[matched_end..]);

        ContextDescriptor {
            period_kind: rule.kind,
            period_start,
            period_end,
            entity_id,
            dimensions,
            raw: raw.to_string(),
            parse_status: if degraded {
                ParseStatus::PartiallyMatched
            } else {
                ParseStatus::Matched
            },
        }
    }

    /// Scan trailing qualifier segments for axis/member pairs.
    fn parse_qualifiers(&self, residue: &str) -> Vec<Dimension> {
        self.qualifier
            .captures_iter(residue)
            .map(|caps| Dimension {
                axis: caps["axis"].to_string(),
                member: caps["member"].to_string(),
            })
            .collect()
    }

    /// Pattern recognizing one "prefix_NameAxis_prefix_NameMember"
    /// qualifier segment. Name parts never contain underscores, which
    /// keeps adjacent segments from running into each other.
    fn qualifier_pattern() -> Regex {
        Regex::new(
            r"(?P<axis>[A-Za-z][A-Za-z0-9-]*_[A-Za-z][A-Za-z0-9-]*Axis)_(?P<member>[A-Za-z][A-Za-z0-9-]*_[A-Za-z][A-Za-z0-9-]*Member)",
        )
        .expect("qualifier pattern is valid")
    }
}

impl Default for ContextRules {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duration_with_entity() {
        let rules = ContextRules::standard();
        let ctx = rules.decode("FROM_Jul01_2018_TO_Sep30_2018_Entity_0000005272");

        assert_eq!(ctx.parse_status, ParseStatus::Matched);
        assert_eq!(ctx.period_kind, PeriodKind::Duration);
        assert_eq!(ctx.period_start, Some(date(2018, 7, 1)));
        assert_eq!(ctx.period_end, Some(date(2018, 9, 30)));
        assert_eq!(ctx.entity_id.as_deref(), Some("0000005272"));
        assert!(ctx.dimensions.is_empty());
        assert!(ctx.period_start.unwrap() <= ctx.period_end.unwrap());
    }

    #[test]
    fn test_instant_with_entity() {
        let rules = ContextRules::standard();
        let ctx = rules.decode("AS_OF_Dec31_2017_Entity_0000005272");

        assert_eq!(ctx.parse_status, ParseStatus::Matched);
        assert_eq!(ctx.period_kind, PeriodKind::Instant);
        assert!(ctx.period_start.is_none());
        assert_eq!(ctx.period_end, Some(date(2017, 12, 31)));
        assert_eq!(ctx.entity_id.as_deref(), Some("0000005272"));
    }

    #[rstest]
    #[case::duration_no_entity("FROM_Jan01_2018_TO_Mar31_2018", PeriodKind::Duration)]
    #[case::instant_no_entity("AS_OF_Mar31_2018", PeriodKind::Instant)]
    #[case::entity_only("Entity_0000896159", PeriodKind::Unspecified)]
    fn test_base_shapes(#[case] raw: &str, #[case] kind: PeriodKind) {
        let rules = ContextRules::standard();
        let ctx = rules.decode(raw);
        assert_eq!(ctx.parse_status, ParseStatus::Matched);
        assert_eq!(ctx.period_kind, kind);
        assert_eq!(ctx.raw, raw);
    }

    #[test]
    fn test_single_qualifier() {
        let rules = ContextRules::standard();
        let ctx = rules.decode(
            "AS_OF_Sep30_2018_Entity_0000005272_dei_LegalEntityAxis_srt_ParentCompanyMember",
        );

        assert_eq!(ctx.parse_status, ParseStatus::Matched);
        assert_eq!(ctx.dimensions.len(), 1);
        assert_eq!(ctx.dimensions[0].axis, "dei_LegalEntityAxis");
        assert_eq!(ctx.dimensions[0].member, "srt_ParentCompanyMember");
        assert!(!ctx.is_consolidated());
    }

    #[test]
    fn test_multiple_qualifiers() {
        let rules = ContextRules::standard();
        let ctx = rules.decode(
            "FROM_Jul01_2018_TO_Sep30_2018_Entity_0000005272\
             _dei_LegalEntityAxis_srt_ParentCompanyMember\
             _srt_ConsolidationItemsAxis_srt_SubsidiariesMember",
        );

        assert_eq!(ctx.parse_status, ParseStatus::Matched);
        assert_eq!(ctx.dimensions.len(), 2);
        assert!(ctx.dimensions.contains(&Dimension {
            axis: "dei_LegalEntityAxis".to_string(),
            member: "srt_ParentCompanyMember".to_string(),
        }));
        assert!(ctx.dimensions.contains(&Dimension {
            axis: "srt_ConsolidationItemsAxis".to_string(),
            member: "srt_SubsidiariesMember".to_string(),
        }));
    }

    #[rstest]
    #[case::empty("")]
    #[case::garbage("garbage_string")]
    #[case::lowercase("from_jul01_2018")]
    #[case::numeric("1234567890")]
    fn test_decode_is_total(#[case] raw: &str) {
        let rules = ContextRules::standard();
        let ctx = rules.decode(raw);
        assert_eq!(ctx.parse_status, ParseStatus::Unmatched);
        assert_eq!(ctx.raw, raw);
        assert!(ctx.period_start.is_none());
        assert!(ctx.period_end.is_none());
        assert!(ctx.entity_id.is_none());
        assert!(ctx.dimensions.is_empty());
    }

    #[test]
    fn test_bad_month_degrades_to_partial() {
        let rules = ContextRules::standard();
        // "Xyz" matches the date shape but is not a month abbreviation.
        let ctx = rules.decode("FROM_Xyz01_2018_TO_Sep30_2018_Entity_0000005272");

        assert_eq!(ctx.parse_status, ParseStatus::PartiallyMatched);
        assert_eq!(ctx.period_kind, PeriodKind::Duration);
        assert!(ctx.period_start.is_none());
        assert_eq!(ctx.period_end, Some(date(2018, 9, 30)));
        assert_eq!(ctx.entity_id.as_deref(), Some("0000005272"));
    }

    #[test]
    fn test_inverted_range_degrades() {
        let rules = ContextRules::standard();
        let ctx = rules.decode("FROM_Sep30_2018_TO_Jul01_2018_Entity_0000005272");

        assert_eq!(ctx.parse_status, ParseStatus::PartiallyMatched);
        assert!(ctx.period_start.is_none());
        assert_eq!(ctx.period_end, Some(date(2018, 7, 1)));
    }

    #[test]
    fn test_rule_priority_most_specific_wins() {
        let rules = ContextRules::standard();
        // Both duration rules could match the head; the entity-bearing
        // rule is earlier and must consume the entity suffix.
        let ctx = rules.decode("FROM_Jul01_2018_TO_Sep30_2018_Entity_0000005272");
        assert_eq!(ctx.entity_id.as_deref(), Some("0000005272"));
    }

    #[test]
    fn test_from_specs_and_push_rule() {
        let specs = vec![RuleSpec {
            name: "fiscal_year".to_string(),
            kind: PeriodKind::Duration,
            pattern: r"^FY(?P<end>[A-Z][a-z]{2}\d{2}_\d{4})".to_string(),
        }];
        let mut rules = ContextRules::from_specs(&specs).unwrap();
        assert_eq!(rules.len(), 1);

        let ctx = rules.decode("FYDec31_2018");
        assert_eq!(ctx.parse_status, ParseStatus::Matched);
        assert_eq!(ctx.period_end, Some(date(2018, 12, 31)));

        rules
            .push_rule(&RuleSpec {
                name: "entity_only".to_string(),
                kind: PeriodKind::Unspecified,
                pattern: r"^Entity_(?P<entity>\d+)".to_string(),
            })
            .unwrap();
        assert_eq!(rules.rule_names(), vec!["fiscal_year", "entity_only"]);
    }

    #[test]
    fn test_from_specs_invalid_pattern() {
        let specs = vec![RuleSpec {
            name: "broken".to_string(),
            kind: PeriodKind::Instant,
            pattern: "([unclosed".to_string(),
        }];
        let err = ContextRules::from_specs(&specs).unwrap_err();
        assert!(matches!(err, ExtractError::Rule { name, .. } if name == "broken"));
    }

    #[test]
    fn test_rule_spec_roundtrip_json() {
        let json = r#"[{"name": "instant", "kind": "instant", "pattern": "^AS_OF_"}]"#;
        let specs: Vec<RuleSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(specs[0].kind, PeriodKind::Instant);
        assert!(ContextRules::from_specs(&specs).is_ok());
    }
}

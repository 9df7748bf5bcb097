//! Parsed tag tree for XBRL instance documents.
//!
//! An XBRL instance is an XML document whose interesting content is a
//! flat collection of taxonomy-prefixed fact elements such as
//! `<us-gaap:NetIncomeLoss contextRef="..." unitRef="USD" decimals="-6"
//! id="...">17765000000</us-gaap:NetIncomeLoss>`. [`TaggedDocument`]
//! exposes exactly the two operations the extraction engine needs:
//! find all elements by qualified tag name, and read an attribute by
//! name or get an explicit absent marker.
//!
//! How the XML text was obtained (network, local file) is not this
//! module's concern; see the `quarry-data` crate for retrieval.

use crate::error::{ExtractError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One element of a parsed instance document.
///
/// Tag and attribute names are matched case-insensitively: EDGAR
/// instance documents are not consistent about casing, and the
/// widely used HTML-oriented parsers case-fold everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedElement {
    /// Qualified tag name as written in the source (e.g. "us-gaap:NetIncomeLoss")
    pub name: String,

    /// Attributes in source order as (name, value) pairs
    pub attributes: Vec<(String, String)>,

    /// Concatenated text content of the element
    pub text: String,
}

impl TaggedElement {
    /// Read an attribute by name, case-insensitively.
    ///
    /// Returns `None` when the attribute is absent. An attribute that
    /// is present with an empty value returns `Some("")`; the two are
    /// deliberately distinguishable.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A parsed XBRL instance document.
///
/// Holds every element of the document in document order. Query
/// methods never fail; a tag that does not occur yields an empty
/// iterator, not an error.
#[derive(Debug, Clone, Default)]
pub struct TaggedDocument {
    elements: Vec<TaggedElement>,
}

impl TaggedDocument {
    /// Parse an XBRL instance document from XML text.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Xml`] when the markup cannot be
    /// traversed at all. This is fatal for the document only; callers
    /// processing many filings are expected to skip it and continue.
    pub fn parse(xml: &str) -> Result<Self> {
        use quick_xml::Reader;
        use quick_xml::events::Event;

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        // (document-order index, partially built element)
        let mut stack: Vec<(usize, TaggedElement)> = Vec::new();
        let mut finished: Vec<(usize, TaggedElement)> = Vec::new();
        let mut next_index = 0usize;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let element = element_from_start(&e)?;
                    stack.push((next_index, element));
                    next_index += 1;
                }
                Ok(Event::Empty(e)) => {
                    finished.push((next_index, element_from_start(&e)?));
                    next_index += 1;
                }
                Ok(Event::Text(t)) => {
                    if let Some((_, element)) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| ExtractError::Xml(e.to_string()))?;
                        element.text.push_str(&text);
                    }
                }
                Ok(Event::CData(t)) => {
                    if let Some((_, element)) = stack.last_mut() {
                        element.text.push_str(&String::from_utf8_lossy(&t));
                    }
                }
                Ok(Event::End(_)) => {
                    if let Some(done) = stack.pop() {
                        finished.push(done);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(ExtractError::Xml(e.to_string())),
            }
            buf.clear();
        }

        // Elements finish innermost-first; restore document order.
        finished.sort_by_key(|(idx, _)| *idx);

        Ok(Self {
            elements: finished.into_iter().map(|(_, e)| e).collect(),
        })
    }

    /// Iterate over all occurrences of a qualified tag name, in
    /// document order. The comparison is case-insensitive.
    pub fn find_all<'a, 'b>(
        &'a self,
        name: &'b str,
    ) -> impl Iterator<Item = &'a TaggedElement> + use<'a, 'b> {
        self.elements
            .iter()
            .filter(move |e| e.name.eq_ignore_ascii_case(name))
    }

    /// First occurrence of a qualified tag name, if any.
    pub fn find(&self, name: &str) -> Option<&TaggedElement> {
        self.find_all(name).next()
    }

    /// Total number of elements in the document.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true when the document contains no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn element_from_start(e: &quick_xml::events::BytesStart<'_>) -> Result<TaggedElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|e| ExtractError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ExtractError::Xml(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(TaggedElement {
        name,
        attributes,
        text: String::new(),
    })
}

/// Ancillary document information from the dei taxonomy.
///
/// Every instance document carries Document and Entity Information
/// elements describing the filing itself. These are useful for tagging
/// extracted rows with provenance without any external metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Registrant name (dei:EntityRegistrantName)
    pub registrant_name: Option<String>,

    /// Central Index Key (dei:EntityCentralIndexKey)
    pub central_index_key: Option<String>,

    /// Form type, e.g. "10-Q" (dei:DocumentType)
    pub document_type: Option<String>,

    /// Fiscal period focus, e.g. "Q3" (dei:DocumentFiscalPeriodFocus)
    pub fiscal_period_focus: Option<String>,

    /// Reporting period end date (dei:DocumentPeriodEndDate)
    pub period_end_date: Option<NaiveDate>,
}

impl DocumentInfo {
    /// Collect dei fields from a parsed document. Every field is
    /// optional; a filing that omits one simply leaves it `None`.
    pub fn from_document(document: &TaggedDocument) -> Self {
        let text_of = |name: &str| {
            document
                .find(name)
                .map(|e| e.text.trim().to_string())
                .filter(|t| !t.is_empty())
        };

        let period_end_date = text_of("dei:DocumentPeriodEndDate")
            .and_then(|t| NaiveDate::parse_from_str(&t, "%Y-%m-%d").ok());

        Self {
            registrant_name: text_of("dei:EntityRegistrantName"),
            central_index_key: text_of("dei:EntityCentralIndexKey"),
            document_type: text_of("dei:DocumentType"),
            fiscal_period_focus: text_of("dei:DocumentFiscalPeriodFocus"),
            period_end_date,
        }
    }
}

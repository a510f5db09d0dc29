//! OAI-PMH `ListRecords` response parser for the `oai_dc` metadata format.
//!
//! Only Dublin Core elements inside `<metadata>` are read; the OAI `<header>`
//! carries its own `identifier` which must not leak into the record.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;

use crate::models::{BibliographicRecord, RecordBuilder};
use crate::sources::SourceError;

/// OAI-PMH protocol error reported inside a 200 response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiError {
    pub code: String,
    pub message: String,
}

impl OaiError {
    /// The request was valid but the window holds no records
    pub fn is_no_records_match(&self) -> bool {
        self.code == "noRecordsMatch"
    }
}

impl std::fmt::Display for OaiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// A parsed `ListRecords` batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OaiDocument {
    /// Records in document order, deleted records excluded
    pub records: Vec<BibliographicRecord>,

    /// Protocol-level error, if the repository reported one
    pub error: Option<OaiError>,

    /// Token for the next batch, if the list is incomplete
    pub resumption_token: Option<String>,

    /// Size of the complete list, when the repository announces it
    pub complete_list_size: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DcField {
    Title,
    Creator,
    Subject,
    Date,
    Identifier,
    Source,
}

impl DcField {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(DcField::Title),
            b"creator" => Some(DcField::Creator),
            b"subject" => Some(DcField::Subject),
            b"date" => Some(DcField::Date),
            b"identifier" => Some(DcField::Identifier),
            b"source" => Some(DcField::Source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Field(DcField),
    Error,
    Token,
}

#[derive(Debug, Default)]
struct DcFields {
    titles: Vec<String>,
    creators: Vec<String>,
    subjects: Vec<String>,
    dates: Vec<String>,
    identifiers: Vec<String>,
    sources: Vec<String>,
    deleted: bool,
}

impl DcFields {
    /// Blank title/date/source elements are kept, so the first element decides
    /// even when it is empty; blank list entries are dropped.
    fn push(&mut self, field: DcField, value: String) {
        let positional = matches!(field, DcField::Title | DcField::Date | DcField::Source);
        if value.is_empty() && !positional {
            return;
        }

        let values = match field {
            DcField::Title => &mut self.titles,
            DcField::Creator => &mut self.creators,
            DcField::Subject => &mut self.subjects,
            DcField::Date => &mut self.dates,
            DcField::Identifier => &mut self.identifiers,
            DcField::Source => &mut self.sources,
        };
        values.push(value);
    }

    /// First DOI-looking and first URL-looking identifier win; later ones are dropped.
    fn into_record(self, label: &str) -> BibliographicRecord {
        let doi = self
            .identifiers
            .iter()
            .find(|id| id.starts_with("10."))
            .cloned()
            .unwrap_or_default();
        let url = self
            .identifiers
            .iter()
            .find(|id| id.starts_with("http"))
            .cloned()
            .unwrap_or_default();

        let mut titles = self.titles.into_iter();
        let mut dates = self.dates.into_iter();
        let mut sources = self.sources.into_iter();

        RecordBuilder::new(titles.next().unwrap_or_default(), label)
            .authors(self.creators)
            .subjects(self.subjects)
            .date(dates.next().unwrap_or_default())
            .doi(doi)
            .url(url)
            .journal(sources.next().unwrap_or_default())
            .build()
    }
}

fn attribute(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn text_of(t: &BytesText) -> String {
    match t.unescape() {
        Ok(text) => text.into_owned(),
        // Unknown entities (e.g. HTML ones) are kept verbatim
        Err(_) => String::from_utf8_lossy(t).into_owned(),
    }
}

/// Parse a `ListRecords` response, stamping `label` on every record.
///
/// A document without `<record>` elements yields no records. Markup that is
/// not well formed is a [`SourceError::Parse`].
pub fn parse_oai_dc(xml: &str, label: &str) -> Result<OaiDocument, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut doc = OaiDocument::default();

    let mut depth = 0usize;
    let mut current: Option<DcFields> = None;
    let mut in_metadata = false;
    let mut capture: Option<(Capture, usize, String)> = None;
    let mut error_code = String::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            SourceError::Parse(format!(
                "XML parsing error at position {}: {}",
                reader.error_position(),
                e
            ))
        })?;

        match event {
            Event::Start(ref e) => {
                depth += 1;
                let name = e.local_name();
                match name.as_ref() {
                    b"record" => {
                        current = Some(DcFields::default());
                        in_metadata = false;
                    }
                    b"header" => {
                        if let Some(fields) = current.as_mut() {
                            fields.deleted = attribute(e, b"status").as_deref() == Some("deleted");
                        }
                    }
                    b"metadata" if current.is_some() => in_metadata = true,
                    b"error" if current.is_none() => {
                        error_code = attribute(e, b"code").unwrap_or_default();
                        capture = Some((Capture::Error, depth, String::new()));
                    }
                    b"resumptionToken" => {
                        doc.complete_list_size = attribute(e, b"completeListSize")
                            .and_then(|s| s.trim().parse().ok());
                        capture = Some((Capture::Token, depth, String::new()));
                    }
                    local if in_metadata && capture.is_none() => {
                        if let Some(field) = DcField::from_local_name(local) {
                            capture = Some((Capture::Field(field), depth, String::new()));
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"error" if current.is_none() => {
                    doc.error = Some(OaiError {
                        code: attribute(e, b"code").unwrap_or_default(),
                        message: String::new(),
                    });
                }
                b"resumptionToken" => {
                    doc.complete_list_size = attribute(e, b"completeListSize")
                        .and_then(|s| s.trim().parse().ok());
                }
                local if in_metadata && capture.is_none() => {
                    if let (Some(field), Some(fields)) =
                        (DcField::from_local_name(local), current.as_mut())
                    {
                        fields.push(field, String::new());
                    }
                }
                _ => {}
            },
            Event::Text(ref t) => {
                if let Some((_, _, buf)) = capture.as_mut() {
                    buf.push_str(&text_of(t));
                }
            }
            Event::CData(ref c) => {
                if let Some((_, _, buf)) = capture.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::End(ref e) => {
                if matches!(capture, Some((_, d, _)) if d == depth) {
                    if let Some((kind, _, buf)) = capture.take() {
                        let value = buf.trim().to_string();
                        match kind {
                            Capture::Field(field) => {
                                if let Some(fields) = current.as_mut() {
                                    fields.push(field, value);
                                }
                            }
                            Capture::Error => {
                                doc.error = Some(OaiError {
                                    code: std::mem::take(&mut error_code),
                                    message: value,
                                });
                            }
                            Capture::Token => {
                                if !value.is_empty() {
                                    doc.resumption_token = Some(value);
                                }
                            }
                        }
                    }
                }

                match e.local_name().as_ref() {
                    b"metadata" => in_metadata = false,
                    b"record" => {
                        if let Some(fields) = current.take() {
                            if !fields.deleted {
                                doc.records.push(fields.into_record(label));
                            }
                        }
                        in_metadata = false;
                    }
                    _ => {}
                }

                depth = depth.checked_sub(1).ok_or_else(|| {
                    SourceError::Parse("XML parsing error: unmatched closing tag".to_string())
                })?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(SourceError::Parse(format!(
            "XML parsing error: document ended with {} unclosed element(s)",
            depth
        )));
    }

    Ok(doc)
}

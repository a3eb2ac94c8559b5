//! Template document validation.
//!
//! A template is an opaque XML payload consumed as-is by the session
//! store; the only thing checked here is that the top-level element is
//! `event_sessions`. The rest of the schema belongs to the host
//! database.

use quick_xml::events::Event;
use quick_xml::Reader;

use xe_domain::error::{Error, Result};

/// Root element every tracing-session template must carry.
pub const TEMPLATE_ROOT: &str = "event_sessions";

/// A parsed template document, held only for the duration of one
/// provisioning attempt.
#[derive(Debug, Clone)]
pub struct TemplateDocument {
    xml: String,
}

impl TemplateDocument {
    /// Parse raw bytes and verify the document kind.
    ///
    /// Declarations, comments, and processing instructions before the
    /// root element are skipped; the first start element must be
    /// `event_sessions`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| Error::InvalidTemplate(format!("not valid UTF-8: {e}")))?;

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    if name != TEMPLATE_ROOT {
                        return Err(Error::InvalidTemplate(format!(
                            "unexpected root element <{name}>, expected <{TEMPLATE_ROOT}>"
                        )));
                    }
                    break;
                }
                Ok(Event::Eof) => {
                    return Err(Error::InvalidTemplate("document has no root element".into()))
                }
                // Declaration, DOCTYPE, comments, PIs, leading whitespace.
                Ok(_) => continue,
                Err(e) => return Err(Error::Xml(e.to_string())),
            }
        }

        Ok(Self {
            xml: xml.to_owned(),
        })
    }

    /// The raw XML payload, passed to the store unchanged.
    pub fn xml(&self) -> &str {
        &self.xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_root_is_accepted() {
        let doc = TemplateDocument::parse(b"<event_sessions><event_session name=\"qw\"/></event_sessions>")
            .unwrap();
        assert!(doc.xml().starts_with("<event_sessions>"));
    }

    #[test]
    fn declaration_and_comments_before_root_are_skipped() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<!-- curated template -->
<event_sessions xmlns="http://schemas.example.com/trace/2016">
  <event_session name="query_waits"/>
</event_sessions>"#;
        assert!(TemplateDocument::parse(xml).is_ok());
    }

    #[test]
    fn self_closing_root_is_accepted() {
        assert!(TemplateDocument::parse(b"<event_sessions/>").is_ok());
    }

    #[test]
    fn wrong_root_is_rejected() {
        let err = TemplateDocument::parse(b"<sessions><a/></sessions>").unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate(_)));
        assert!(err.to_string().contains("<sessions>"));
    }

    #[test]
    fn non_xml_bytes_are_rejected() {
        assert!(TemplateDocument::parse(b"definitely not xml").is_err());
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = TemplateDocument::parse(b"").unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate(_)));
    }

    #[test]
    fn non_utf8_bytes_are_rejected() {
        let err = TemplateDocument::parse(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate(_)));
    }
}

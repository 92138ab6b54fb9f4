//! Core properties part (`docProps/core.xml`)
//!
//! Reading goes through the XML tree. Writing patches the original text in
//! place so that every property we do not touch keeps its exact bytes.

use crate::pptx::error::PptxResult;
use crate::pptx::xml_tree;
use chrono::{SecondsFormat, Utc};
use doc_model::DocumentMetadata;
use quick_xml::escape::escape;
use regex_lite::{NoExpand, Regex};

/// Parse metadata from the core properties part
pub fn parse_core_properties(part: &str, bytes: &[u8]) -> PptxResult<DocumentMetadata> {
    let doc = xml_tree::decode(part, bytes)?;
    let value = |local: &str| {
        doc.root
            .child(local)
            .map(|node| node.text())
            .filter(|text| !text.is_empty())
    };

    Ok(DocumentMetadata {
        title: value("title"),
        author: value("creator"),
        subject: value("subject"),
        keywords: value("keywords"),
        last_modified_by: value("lastModifiedBy"),
        revision: value("revision"),
        created: value("created"),
        modified: value("modified"),
    })
}

/// Current time as a W3CDTF timestamp
pub fn w3cdtf_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Replace the text of one property element.
///
/// Handles `<tag>..</tag>` and `<tag/>`; when the property is absent it is
/// inserted before the closing root tag.
pub fn set_property(xml: &str, tag: &str, attributes: &str, value: &str) -> String {
    let escaped = escape(value);
    let name = regex_lite::escape(tag);

    let patterns = (
        Regex::new(&format!(r"(?s)(<{name}(?:\s[^>]*[^/])?>)(.*?)(</{name}>)")),
        Regex::new(&format!(r"<{name}(\s[^>]*)?/>")),
    );
    let (pair, empty) = match patterns {
        (Ok(pair), Ok(empty)) => (pair, empty),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!("Cannot build pattern for {}: {}", tag, e);
            return xml.to_string();
        }
    };

    if let Some(caps) = pair.captures(xml) {
        let replacement = format!("{}{}{}", &caps[1], escaped, &caps[3]);
        return pair.replace(xml, NoExpand(&replacement)).into_owned();
    }

    if let Some(caps) = empty.captures(xml) {
        let existing = caps.get(1).map_or("", |m| m.as_str());
        let replacement = format!("<{}{}>{}</{}>", tag, existing, escaped, tag);
        return empty.replace(xml, NoExpand(&replacement)).into_owned();
    }

    match xml.rfind("</") {
        Some(index) => format!(
            "{}<{}{}>{}</{}>{}",
            &xml[..index],
            tag,
            attributes,
            escaped,
            tag,
            &xml[index..]
        ),
        None => xml.to_string(),
    }
}

/// Apply title, subject and modified changes to the core properties text
pub fn update_core_properties(
    xml: &str,
    original: &DocumentMetadata,
    current: &DocumentMetadata,
    modified: Option<&str>,
) -> String {
    let mut patched = xml.to_string();

    if current.title != original.title {
        patched = set_property(&patched, "dc:title", "", current.title.as_deref().unwrap_or(""));
    }
    if current.subject != original.subject {
        patched = set_property(&patched, "dc:subject", "", current.subject.as_deref().unwrap_or(""));
    }
    if let Some(timestamp) = modified {
        patched = set_property(
            &patched,
            "dcterms:modified",
            r#" xsi:type="dcterms:W3CDTF""#,
            timestamp,
        );
    }

    patched
}

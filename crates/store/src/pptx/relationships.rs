//! Relationships (.rels) part parsing and target resolution
//!
//! Slides reference images, layouts and other parts through relationship ids;
//! the `.rels` part next to the slide maps those ids to target paths.

use crate::pptx::error::{PptxError, PptxResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A single relationship in a .rels part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Unique ID within the rels part (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path, relative to the source part
    pub target: String,
    pub target_mode: TargetMode,
}

/// Target mode for relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    /// Target inside the container
    #[default]
    Internal,
    /// External target (URL)
    External,
}

/// Relationships of one source part, in document order
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    relationships: Vec<Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a .rels part
    pub fn parse(part: &str, content: &str) -> PptxResult<Self> {
        let mut result = Self::new();
        let mut reader = Reader::from_str(content);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() != b"Relationship" {
                        continue;
                    }
                    let id = required_attribute(part, e, "Id")?;
                    let rel_type = required_attribute(part, e, "Type")?;
                    let target = required_attribute(part, e, "Target")?;
                    let target_mode = attribute(part, e, "TargetMode")?
                        .map(|m| {
                            if m == "External" {
                                TargetMode::External
                            } else {
                                TargetMode::Internal
                            }
                        })
                        .unwrap_or_default();

                    result.insert(Relationship {
                        id,
                        rel_type,
                        target,
                        target_mode,
                    });
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PptxError::malformed(part, e)),
                _ => {}
            }
        }

        Ok(result)
    }

    /// Add a relationship; a repeated ID replaces the earlier entry
    fn insert(&mut self, relationship: Relationship) {
        match self.relationships.iter_mut().find(|r| r.id == relationship.id) {
            Some(existing) => *existing = relationship,
            None => self.relationships.push(relationship),
        }
    }

    /// Get a relationship by ID
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.id == id)
    }

    /// First relationship of a type in document order
    pub fn get_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|r| r.rel_type == rel_type)
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

fn attribute(part: &str, element: &BytesStart<'_>, name: &str) -> PptxResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| PptxError::malformed(part, e))?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr
                .unescape_value()
                .map_err(|e| PptxError::malformed(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_attribute(part: &str, element: &BytesStart<'_>, name: &str) -> PptxResult<String> {
    attribute(part, element, name)?
        .ok_or_else(|| PptxError::malformed(part, format!("Relationship missing {}", name)))
}

/// Path of the .rels part for a source part,
/// e.g. `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a slide relationship target to a container path.
///
/// `../x` resolves under `ppt/`, `./x` under `ppt/slides/`, `/x` is absolute
/// and a bare `x` is taken relative to `ppt/`. When the resolved path does not
/// exist, the raw target is used if that exists instead.
pub fn resolve_target(target: &str, exists: impl Fn(&str) -> bool) -> String {
    let resolved = if let Some(rest) = target.strip_prefix("../") {
        format!("ppt/{}", rest)
    } else if let Some(rest) = target.strip_prefix("./") {
        format!("ppt/slides/{}", rest)
    } else if let Some(rest) = target.strip_prefix('/') {
        rest.to_string()
    } else {
        format!("ppt/{}", target)
    };

    if !exists(&resolved) && exists(target) {
        return target.to_string();
    }
    resolved
}

/// Resolve a target relative to the directory of the part that owns it.
///
/// Used for parts outside `ppt/slides/` (the presentation part and layouts),
/// where `..` segments walk up from the owner's directory.
pub fn resolve_relative(owner: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match owner.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

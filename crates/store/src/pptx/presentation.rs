//! Presentation part: slide order and slide size

use crate::pptx::container::Container;
use crate::pptx::relationships::{rels_path_for, resolve_relative, Relationships};
use crate::pptx::xml_tree;
use crate::pptx::{relationship_types, PRESENTATION_PART};
use doc_model::{Size, DEFAULT_SLIDE_SIZE};

/// What the presentation part tells us about the deck
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationInfo {
    /// Slide part paths in presentation order
    pub slide_parts: Vec<String>,
    pub slide_size: Size,
}

/// Read slide order and size.
///
/// Slide order comes from `p:sldIdLst` resolved through the presentation
/// relationships. When that is unavailable, slide parts found in the
/// container are ordered by their number.
pub fn read_presentation_info(container: &Container) -> PresentationInfo {
    let mut slide_size = DEFAULT_SLIDE_SIZE;
    let mut slide_parts = Vec::new();

    match container
        .part(PRESENTATION_PART)
        .map(|bytes| xml_tree::decode(PRESENTATION_PART, bytes))
    {
        Some(Ok(doc)) => {
            if let Some(size) = doc.root.child("sldSz") {
                let cx = size.attr("cx").and_then(|v| v.parse::<i64>().ok());
                let cy = size.attr("cy").and_then(|v| v.parse::<i64>().ok());
                if let (Some(cx), Some(cy)) = (cx, cy) {
                    slide_size = Size::from_emu(cx, cy);
                }
            }
            slide_parts = ordered_slide_parts(container, &doc.root);
        }
        Some(Err(e)) => tracing::warn!("Failed to parse presentation part: {}", e),
        None => tracing::warn!("Container has no {}", PRESENTATION_PART),
    }

    if slide_parts.is_empty() {
        slide_parts = discover_slide_parts(container);
    }

    PresentationInfo {
        slide_parts,
        slide_size,
    }
}

fn ordered_slide_parts(container: &Container, root: &xml_tree::XmlNode) -> Vec<String> {
    let rels_path = rels_path_for(PRESENTATION_PART);
    let rels = match container.part_as_string(&rels_path) {
        Ok(content) => match Relationships::parse(&rels_path, &content) {
            Ok(rels) => rels,
            Err(e) => {
                tracing::warn!("Failed to parse presentation relationships: {}", e);
                return Vec::new();
            }
        },
        Err(_) => return Vec::new(),
    };

    let Some(list) = root.child("sldIdLst") else {
        return Vec::new();
    };

    list.elements()
        .filter(|node| node.is("sldId"))
        .filter_map(|node| {
            let rel_id = node.attr("r:id")?;
            let rel = rels.get(rel_id);
            if rel.is_none() {
                tracing::warn!("Slide list references unknown relationship {}", rel_id);
            }
            let rel = rel.filter(|r| r.rel_type == relationship_types::SLIDE)?;
            let path = resolve_relative(PRESENTATION_PART, &rel.target);
            container.contains(&path).then_some(path)
        })
        .collect()
}

/// `ppt/slides/slideN.xml` parts sorted by N
pub fn discover_slide_parts(container: &Container) -> Vec<String> {
    let mut numbered: Vec<(u32, String)> = container
        .part_names()
        .filter_map(|name| {
            let number = name
                .strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse::<u32>()
                .ok()?;
            Some((number, name.to_string()))
        })
        .collect();
    numbered.sort_by_key(|(number, _)| *number);
    numbered.into_iter().map(|(_, name)| name).collect()
}

//! Re-encoder - projects model edits back onto the source container
//!
//! Every slide is rewritten from a copy of its original tree. Only elements
//! that carry a back-reference can be projected; text, geometry and deletions
//! are written, while added elements and style edits are reported as skipped.
//! A part that fails to rewrite keeps its original bytes.

use crate::pptx::core_properties::{update_core_properties, w3cdtf_now};
use crate::pptx::error::{PptxError, PptxResult};
use crate::pptx::reader::PresentationPackage;
use crate::pptx::slide_decoder::paragraphs;
use crate::pptx::xml_tree::{self, XmlChild, XmlDocument, XmlNode};
use crate::pptx::CORE_PROPERTIES_PART;
use doc_model::{Document, Element, ElementId, Slide, SlideId, SourceRef};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Export behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Write moved/resized elements back to `a:off` / `a:ext`
    pub rewrite_geometry: bool,
    /// Stamp `dcterms:modified` when anything changed
    pub update_modified_timestamp: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            rewrite_geometry: true,
            update_modified_timestamp: true,
        }
    }
}

/// Which kinds of edit the exporter projects into the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportCapabilities {
    pub text: bool,
    pub geometry: bool,
    pub deletions: bool,
    pub added_elements: bool,
    pub styles: bool,
}

impl ExportCapabilities {
    pub fn for_options(options: &ExportOptions) -> Self {
        Self {
            text: true,
            geometry: options.rewrite_geometry,
            deletions: true,
            added_elements: false,
            styles: false,
        }
    }
}

/// Why an edit was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The element was created in this session and has no source node
    AddedElement,
    StyleChange,
    /// Geometry changed but geometry rewriting is disabled
    GeometryChange,
    /// Text changed on a node without a text body
    NoTextBody,
}

/// An edit present in the model but absent from the output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedEdit {
    pub slide_id: SlideId,
    pub element_id: ElementId,
    pub reason: SkipReason,
}

/// A part that kept its original bytes because rewriting it failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportWarning {
    pub part: String,
    pub message: String,
}

/// Result of an export
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub warnings: Vec<ExportWarning>,
    pub skipped: Vec<SkippedEdit>,
    /// What this export projected
    pub capabilities: ExportCapabilities,
}

/// Re-encode the document into a copy of its source container.
///
/// Only serializing the archive can fail; per-part problems become warnings.
pub fn export(
    document: &Document,
    package: &PresentationPackage,
    options: &ExportOptions,
) -> PptxResult<ExportOutcome> {
    let mut container = package.container().clone();
    let mut warnings = Vec::new();
    let mut skipped = Vec::new();

    for slide in &document.slides {
        let Some(original) = package.slide_tree(&slide.part_name) else {
            tracing::debug!("{} has no source tree, nothing to project", slide.part_name);
            continue;
        };

        let mut tree = original.clone();
        let changed = project_slide(slide, &mut tree, package, options, &mut skipped);
        if !changed {
            continue;
        }

        match xml_tree::encode(&tree) {
            Ok(bytes) => container.set_part(&slide.part_name, bytes),
            Err(e) => {
                tracing::warn!("Keeping original {}: {}", slide.part_name, e);
                warnings.push(ExportWarning {
                    part: slide.part_name.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    let metadata_changed = document.metadata.title != package.metadata().title
        || document.metadata.subject != package.metadata().subject;
    if container.is_modified() || metadata_changed {
        let modified = options.update_modified_timestamp.then(w3cdtf_now);
        match container.part_as_string(CORE_PROPERTIES_PART) {
            Ok(xml) => {
                let patched = update_core_properties(
                    &xml,
                    package.metadata(),
                    &document.metadata,
                    modified.as_deref(),
                );
                container.set_part(CORE_PROPERTIES_PART, patched.into_bytes());
            }
            Err(PptxError::MissingPart(_)) => {
                tracing::debug!("No {}, document properties not written", CORE_PROPERTIES_PART);
            }
            Err(e) => {
                tracing::warn!("Document properties not updated: {}", e);
                warnings.push(ExportWarning {
                    part: CORE_PROPERTIES_PART.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    for edit in &skipped {
        tracing::info!(
            "Edit to element {} on slide {} not exported: {:?}",
            edit.element_id,
            edit.slide_id,
            edit.reason
        );
    }

    let bytes = container.serialize()?;
    tracing::info!(
        "Exported presentation: {} bytes, {} warnings, {} skipped edits",
        bytes.len(),
        warnings.len(),
        skipped.len()
    );

    Ok(ExportOutcome {
        bytes,
        warnings,
        skipped,
        capabilities: ExportCapabilities::for_options(options),
    })
}

/// Apply a slide's edits to its tree. Returns whether anything was written.
fn project_slide(
    slide: &Slide,
    tree: &mut XmlDocument,
    package: &PresentationPackage,
    options: &ExportOptions,
    skipped: &mut Vec<SkippedEdit>,
) -> bool {
    let mut changed = false;
    let mut skip = |element: &Element, reason| {
        skipped.push(SkippedEdit {
            slide_id: slide.id,
            element_id: element.id,
            reason,
        })
    };

    for element in &slide.elements {
        let Some(source) = &element.source else {
            skip(element, SkipReason::AddedElement);
            continue;
        };
        let Some(baseline) = package.baseline(source) else {
            continue;
        };
        let Some(node) = tree.root.at_path_mut(&source.node_path) else {
            tracing::warn!("{}: source node {:?} not found", source.part_name, source.node_path);
            continue;
        };

        if element.text_value() != baseline.text_value() {
            let text = element.text_value().unwrap_or_default();
            if write_text(node, text) {
                changed = true;
            } else {
                skip(element, SkipReason::NoTextBody);
            }
        }

        let moved = element.position.to_emu() != baseline.position.to_emu()
            || element.size.to_emu() != baseline.size.to_emu();
        if moved {
            if !options.rewrite_geometry {
                skip(element, SkipReason::GeometryChange);
            } else if write_geometry(node, element).is_some() {
                changed = true;
            } else {
                tracing::warn!("{}: cannot place geometry on <{}>", source.part_name, node.name);
                skip(element, SkipReason::GeometryChange);
            }
        }

        if element.style != baseline.style {
            skip(element, SkipReason::StyleChange);
        }
    }

    let present: HashSet<&SourceRef> = slide
        .elements
        .iter()
        .filter_map(|e| e.source.as_ref())
        .collect();
    let mut deleted: Vec<&SourceRef> = package
        .baseline_sources(&slide.part_name)
        .filter(|source| !present.contains(source))
        .collect();
    // Removing later siblings first keeps the earlier paths valid
    deleted.sort_by(|a, b| b.node_path.cmp(&a.node_path));

    for source in deleted {
        if remove_node(&mut tree.root, &source.node_path) {
            changed = true;
        } else {
            tracing::warn!("{}: cannot remove node {:?}", source.part_name, source.node_path);
        }
    }

    changed
}

/// Write text into an element's text body, one line per paragraph.
///
/// The first text run of each paragraph receives the line and the other runs
/// are emptied. Extra lines clone the last paragraph; paragraphs beyond the
/// last line are emptied. Returns false when the node has no text body.
fn write_text(node: &mut XmlNode, text: &str) -> bool {
    let Some(body) = node.child_mut("txBody") else {
        return false;
    };
    if paragraphs(body).join("\n") == text {
        return true;
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut indices: Vec<usize> = body
        .indexed_elements()
        .filter(|(_, n)| n.is("p"))
        .map(|(i, _)| i)
        .collect();

    if indices.is_empty() {
        body.children.push(XmlChild::Element(XmlNode::new("a:p")));
        indices.push(body.children.len() - 1);
    }

    while indices.len() < lines.len() {
        let last = indices[indices.len() - 1];
        let template = match &body.children[last] {
            XmlChild::Element(p) => p.clone(),
            _ => XmlNode::new("a:p"),
        };
        body.children.insert(last + 1, XmlChild::Element(template));
        indices.push(last + 1);
    }

    for (n, index) in indices.into_iter().enumerate() {
        if let XmlChild::Element(paragraph) = &mut body.children[index] {
            set_paragraph_text(paragraph, lines.get(n).copied().unwrap_or(""));
        }
    }
    true
}

fn set_paragraph_text(paragraph: &mut XmlNode, line: &str) {
    let mut first = true;
    paragraph.for_each_descendant_mut("t", &mut |t| {
        t.set_text(if first { line } else { "" });
        first = false;
    });
    if !first || line.is_empty() {
        return;
    }

    let mut run = XmlNode::new("a:r");
    let mut t = XmlNode::new("a:t");
    t.set_text(line);
    run.children.push(XmlChild::Element(t));

    // Runs go before the closing paragraph properties
    let at = paragraph
        .children
        .iter()
        .position(|c| matches!(c, XmlChild::Element(n) if n.is("endParaRPr")))
        .unwrap_or(paragraph.children.len());
    paragraph.children.insert(at, XmlChild::Element(run));
}

/// Rewrite `a:off` / `a:ext`, creating the transform when the node has none
fn write_geometry(node: &mut XmlNode, element: &Element) -> Option<()> {
    let (x, y) = element.position.to_emu();
    let (cx, cy) = element.size.to_emu();

    // Transforms follow the non-visual properties (`p:nvSpPr`, `p:nvPicPr`, ...)
    let after_nv = after_non_visual(node);
    let xfrm = if node.is("graphicFrame") {
        ensure_child(node, "p:xfrm", Some(after_nv))?
    } else {
        let sp_pr = ensure_child(node, "p:spPr", Some(after_nv))?;
        ensure_child(sp_pr, "a:xfrm", Some(0))?
    };

    let off = ensure_child(xfrm, "a:off", Some(0))?;
    off.set_attr("x", x.to_string());
    off.set_attr("y", y.to_string());
    let after_off = child_index(xfrm, "off").map_or(0, |i| i + 1);
    let ext = ensure_child(xfrm, "a:ext", Some(after_off))?;
    ext.set_attr("cx", cx.to_string());
    ext.set_attr("cy", cy.to_string());
    Some(())
}

fn child_index(node: &XmlNode, local: &str) -> Option<usize> {
    node.children
        .iter()
        .position(|c| matches!(c, XmlChild::Element(n) if n.is(local)))
}

/// Index just past the leading `nv*Pr` child, or 0 when there is none
fn after_non_visual(node: &XmlNode) -> usize {
    node.children
        .iter()
        .position(|c| {
            matches!(c, XmlChild::Element(n) if n.local_name().starts_with("nv") && n.local_name().ends_with("Pr"))
        })
        .map_or(0, |i| i + 1)
}

/// Child matching the local part of `name`, inserted at `at` (or appended)
/// when missing
fn ensure_child<'a>(node: &'a mut XmlNode, name: &str, at: Option<usize>) -> Option<&'a mut XmlNode> {
    let local = xml_tree::local_name(name);
    if node.child(local).is_none() {
        let index = at.unwrap_or(node.children.len()).min(node.children.len());
        node.children.insert(index, XmlChild::Element(XmlNode::new(name)));
    }
    node.child_mut(local)
}

fn remove_node(root: &mut XmlNode, path: &[usize]) -> bool {
    let Some((&last, parent_path)) = path.split_last() else {
        return false;
    };
    match root.at_path_mut(parent_path) {
        Some(parent) if last < parent.children.len() => {
            parent.children.remove(last);
            true
        }
        _ => false,
    }
}

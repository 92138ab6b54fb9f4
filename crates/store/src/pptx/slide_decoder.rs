//! Slide decoder - turns a slide part's XML tree into a flat list of elements
//!
//! Only direct children of `p:cSld/p:spTree` are considered. Shapes and text
//! boxes (`p:sp`), pictures (`p:pic`) and graphic frames (`p:graphicFrame`,
//! kept as chart/table placeholders) become elements; group shapes and
//! anything else are skipped. An element that fails to extract is logged and
//! dropped without affecting its siblings.

use crate::pptx::error::{PptxError, PptxResult};
use crate::pptx::media::{data_uri, mime_type_for, MediaResolver};
use crate::pptx::relationships::{resolve_target, Relationships};
use crate::pptx::relationship_types;
use crate::pptx::xml_tree::{XmlDocument, XmlNode};
use doc_model::{
    emu_to_points, Background, Border, Element, ElementContent, ElementId, ElementKind,
    ElementStyle, ImageContent, ImageResolution, Position, ShapeContent, Size, Slide, SourceRef,
    TextAlign, TextContent, UnsupportedContent,
};

const CHART_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

/// Decode one slide.
///
/// Returns `None` when the slide has no `p:cSld` or no `p:spTree`; the caller
/// omits such slides.
pub fn decode_slide(
    part_name: &str,
    doc: &XmlDocument,
    rels: &Relationships,
    media: &dyn MediaResolver,
    number: u32,
) -> Option<Slide> {
    let Some((csld_index, csld)) = doc.root.indexed_elements().find(|(_, n)| n.is("cSld")) else {
        tracing::warn!("{}: slide has no p:cSld, skipping", part_name);
        return None;
    };
    let Some((tree_index, tree)) = csld.indexed_elements().find(|(_, n)| n.is("spTree")) else {
        tracing::warn!("{}: slide has no p:spTree, skipping", part_name);
        return None;
    };

    let mut slide = Slide::new(number, part_name);
    slide.name = csld.attr("name").map(str::to_string);
    slide.background = decode_background(csld);
    slide.layout = rels
        .get_by_type(relationship_types::SLIDE_LAYOUT)
        .map(|rel| resolve_target(&rel.target, |path| media.has_media(path)));

    let mut z_order = 0u32;
    for (index, node) in tree.indexed_elements() {
        let source = SourceRef::new(part_name, vec![csld_index, tree_index, index]);
        match extract_element(part_name, node) {
            Ok(Some(element)) => {
                slide.elements.push(element.with_z_order(z_order).with_source(source));
                z_order += 1;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("{}: dropping <{}>: {}", part_name, node.name, e),
        }
    }

    resolve_images(&mut slide, rels, media);

    tracing::debug!(
        "Decoded {} with {} elements",
        part_name,
        slide.elements.len()
    );
    Some(slide)
}

/// Resolve pending image references against the slide relationships.
///
/// Elements already resolved or marked missing are left alone, so calling
/// this again is a no-op.
pub fn resolve_images(slide: &mut Slide, rels: &Relationships, media: &dyn MediaResolver) {
    let part_name = slide.part_name.clone();
    for element in &mut slide.elements {
        let Some(image) = element.content.as_image_mut() else {
            continue;
        };
        if image.resolution != ImageResolution::Pending {
            continue;
        }

        match resolve_image(&part_name, image, rels, media) {
            Ok(()) => image.resolution = ImageResolution::Resolved,
            Err(e) => {
                tracing::warn!("{}", e);
                image.resolution = ImageResolution::Missing;
            }
        }
    }
}

fn resolve_image(
    part_name: &str,
    image: &mut ImageContent,
    rels: &Relationships,
    media: &dyn MediaResolver,
) -> PptxResult<()> {
    let rel_id = image.rel_id.clone().unwrap_or_default();
    let missing = || PptxError::MissingRelationship {
        part: part_name.to_string(),
        rel_id: rel_id.clone(),
    };

    let rel = rels.get(&rel_id).ok_or_else(missing)?;
    let path = resolve_target(&rel.target, |p| media.has_media(p));
    let bytes = media
        .media(&path)
        .ok_or_else(|| PptxError::MissingPart(path.clone()))?;

    let mime_type = mime_type_for(&path);
    image.data_uri = Some(data_uri(mime_type, bytes));
    image.mime_type = Some(mime_type.to_string());
    image.media_path = Some(path);
    Ok(())
}

/// Extract one spTree child. `Ok(None)` means the node kind is not decoded.
fn extract_element(part_name: &str, node: &XmlNode) -> PptxResult<Option<Element>> {
    let element = match node.local_name() {
        "sp" => extract_shape(part_name, node)?,
        "pic" => extract_picture(part_name, node)?,
        "graphicFrame" => match extract_graphic_frame(part_name, node)? {
            Some(element) => element,
            None => return Ok(None),
        },
        other => {
            tracing::debug!("{}: skipping unsupported node <{}>", part_name, other);
            return Ok(None);
        }
    };
    Ok(Some(element))
}

fn new_element(kind: ElementKind, (position, size): (Position, Size), content: ElementContent) -> Element {
    Element {
        id: ElementId::new(),
        kind,
        position,
        size,
        content,
        style: None,
        z_order: 0,
        name: None,
        source: None,
    }
}

fn extract_shape(part_name: &str, node: &XmlNode) -> PptxResult<Element> {
    let sp_pr = node.child("spPr");
    let geometry = read_xfrm(part_name, sp_pr.and_then(|p| p.child("xfrm")))?;
    let non_visual = node.child("nvSpPr");

    let text = node.child("txBody").map(body_text).unwrap_or_default();
    let is_text_box = non_visual
        .and_then(|nv| nv.child("cNvSpPr"))
        .and_then(|c| c.attr("txBox"))
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let mut element = if is_text_box || !text.is_empty() {
        let placeholder = non_visual
            .and_then(|nv| nv.find(&["nvPr", "ph"]))
            .map(|ph| ph.attr("type").unwrap_or("body").to_string());
        new_element(
            ElementKind::Text,
            geometry,
            ElementContent::Text(TextContent { text, placeholder }),
        )
    } else {
        let preset = sp_pr
            .and_then(|p| p.child("prstGeom"))
            .and_then(|g| g.attr("prst"))
            .map(str::to_string);
        let mut shape = ShapeContent::default();
        if let Some(preset) = preset {
            shape.geometry = preset;
        }
        new_element(ElementKind::Shape, geometry, ElementContent::Shape(shape))
    };

    element.name = display_name(non_visual);
    element.style = extract_style(part_name, node)?;
    Ok(element)
}

fn extract_picture(part_name: &str, node: &XmlNode) -> PptxResult<Element> {
    let geometry = read_xfrm(part_name, node.find(&["spPr", "xfrm"]))?;
    let non_visual = node.child("nvPicPr");

    let mut image = ImageContent {
        rel_id: node
            .find(&["blipFill", "blip"])
            .and_then(|blip| blip.attr("r:embed"))
            .map(str::to_string),
        ..Default::default()
    };
    image.alt_text = non_visual
        .and_then(|nv| nv.child("cNvPr"))
        .and_then(|c| c.attr("descr"))
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let mut element = new_element(ElementKind::Image, geometry, ElementContent::Image(image));
    element.name = display_name(non_visual);
    Ok(element)
}

fn extract_graphic_frame(part_name: &str, node: &XmlNode) -> PptxResult<Option<Element>> {
    let uri = node
        .find(&["graphic", "graphicData"])
        .and_then(|data| data.attr("uri"))
        .map(str::to_string);

    let kind = match uri.as_deref() {
        Some(CHART_URI) => ElementKind::Chart,
        Some(TABLE_URI) => ElementKind::Table,
        other => {
            tracing::debug!("{}: skipping graphic frame {:?}", part_name, other);
            return Ok(None);
        }
    };

    let geometry = read_xfrm(part_name, node.child("xfrm"))?;
    let placeholder = UnsupportedContent { graphic_uri: uri };
    let content = match kind {
        ElementKind::Table => ElementContent::Table(placeholder),
        _ => ElementContent::Chart(placeholder),
    };

    let mut element = new_element(kind, geometry, content);
    element.name = display_name(node.child("nvGraphicFramePr"));
    Ok(Some(element))
}

/// Position and size from an `a:xfrm` / `p:xfrm`; absent parts read as zero
fn read_xfrm(part_name: &str, xfrm: Option<&XmlNode>) -> PptxResult<(Position, Size)> {
    let Some(xfrm) = xfrm else {
        return Ok((Position::default(), Size::default()));
    };

    let (x, y) = read_pair(part_name, xfrm.child("off"), "x", "y")?;
    let (cx, cy) = read_pair(part_name, xfrm.child("ext"), "cx", "cy")?;
    Ok((Position::from_emu(x, y), Size::from_emu(cx, cy)))
}

fn read_pair(part_name: &str, node: Option<&XmlNode>, a: &str, b: &str) -> PptxResult<(i64, i64)> {
    let Some(node) = node else {
        return Ok((0, 0));
    };
    Ok((emu_attr(part_name, node, a)?, emu_attr(part_name, node, b)?))
}

fn emu_attr(part_name: &str, node: &XmlNode, name: &str) -> PptxResult<i64> {
    match node.attr(name) {
        None => Ok(0),
        Some(value) => value.trim().parse::<i64>().map_err(|_| {
            PptxError::malformed(part_name, format!("invalid {}@{}: {:?}", node.name, name, value))
        }),
    }
}

/// `cNvPr@name` under a non-visual properties node
fn display_name(non_visual: Option<&XmlNode>) -> Option<String> {
    non_visual
        .and_then(|nv| nv.child("cNvPr"))
        .and_then(|c| c.attr("name"))
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Paragraph texts of a text body, joined with '\n'
pub fn body_text(body: &XmlNode) -> String {
    paragraphs(body).join("\n")
}

/// Text of each `a:p` in a text body
pub fn paragraphs(body: &XmlNode) -> Vec<String> {
    body.elements()
        .filter(|node| node.is("p"))
        .map(|p| p.descendants("t").into_iter().map(|t| t.text()).collect())
        .collect()
}

fn extract_style(part_name: &str, node: &XmlNode) -> PptxResult<Option<ElementStyle>> {
    let mut style = ElementStyle::new();

    if let Some(body) = node.child("txBody") {
        let first_paragraph = body.child("p");
        if let Some(rpr) = first_paragraph
            .and_then(|p| p.elements().find(|r| r.is("r")))
            .and_then(|r| r.child("rPr"))
        {
            if let Some(sz) = rpr.attr("sz") {
                let hundredths = sz.parse::<f32>().map_err(|_| {
                    PptxError::malformed(part_name, format!("invalid a:rPr@sz: {:?}", sz))
                })?;
                style.font_size = Some(hundredths / 100.0);
            }
            style.bold = rpr.attr("b").map(is_on);
            style.italic = rpr.attr("i").map(is_on);
            style.underline = rpr.attr("u").map(|u| u != "none");
            style.color = solid_fill(rpr);
            style.font_family = rpr
                .child("latin")
                .and_then(|l| l.attr("typeface"))
                .map(str::to_string);
        }
        style.alignment = first_paragraph
            .and_then(|p| p.child("pPr"))
            .and_then(|ppr| ppr.attr("algn"))
            .and_then(TextAlign::from_ooxml);
    }

    if let Some(sp_pr) = node.child("spPr") {
        style.fill = solid_fill(sp_pr);
        if let Some(line) = sp_pr.child("ln") {
            let width = match line.attr("w") {
                Some(_) => Some(emu_to_points(emu_attr(part_name, line, "w")?) as f32),
                None => None,
            };
            let border = Border {
                color: solid_fill(line),
                width,
            };
            if border.color.is_some() || border.width.is_some() {
                style.border = Some(border);
            }
        }
    }

    Ok((!style.is_empty()).then_some(style))
}

/// `a:solidFill/a:srgbClr@val` of a properties node
fn solid_fill(props: &XmlNode) -> Option<String> {
    props
        .find(&["solidFill", "srgbClr"])
        .and_then(|c| c.attr("val"))
        .map(str::to_string)
}

fn is_on(value: &str) -> bool {
    value == "1" || value == "true"
}

fn decode_background(csld: &XmlNode) -> Option<Background> {
    let bg_pr = csld.find(&["bg", "bgPr"])?;
    if let Some(color) = solid_fill(bg_pr) {
        return Some(Background::Solid { color });
    }
    bg_pr
        .find(&["blipFill", "blip"])
        .and_then(|blip| blip.attr("r:embed"))
        .map(|rel_id| Background::Image {
            rel_id: rel_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::xml_tree::decode;
    use std::collections::HashMap;

    struct Media(HashMap<String, Vec<u8>>);

    impl MediaResolver for Media {
        fn media(&self, path: &str) -> Option<&[u8]> {
            self.0.get(path).map(Vec::as_slice)
        }
    }

    fn media(parts: &[(&str, &[u8])]) -> Media {
        Media(parts.iter().map(|(k, v)| (k.to_string(), v.to_vec())).collect())
    }

    const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

    fn slide_xml(tree: &str) -> String {
        format!(
            r#"<p:sld {NS}><p:cSld name="Intro"><p:bg><p:bgPr><a:solidFill><a:srgbClr val="112233"/></a:solidFill></p:bgPr></p:bg><p:spTree><p:nvGrpSpPr/><p:grpSpPr/>{tree}</p:spTree></p:cSld></p:sld>"#
        )
    }

    const SHAPE: &str = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Rectangle 1"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="914400" y="457200"/><a:ext cx="1828800" cy="914400"/></a:xfrm><a:prstGeom prst="ellipse"/><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill><a:ln w="12700"><a:solidFill><a:srgbClr val="000000"/></a:solidFill></a:ln></p:spPr></p:sp>"#;
    const PICTURE: &str = r#"<p:pic><p:nvPicPr><p:cNvPr id="3" name="Picture 2" descr="Logo"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="12700" cy="25400"/></a:xfrm></p:spPr></p:pic>"#;
    const TEXT_BOX: &str = r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="TextBox 3"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="2400" b="1"><a:solidFill><a:srgbClr val="00FF00"/></a:solidFill><a:latin typeface="Arial"/></a:rPr><a:t>Hello</a:t></a:r><a:r><a:t> there</a:t></a:r></a:p><a:p><a:r><a:t>Second</a:t></a:r></a:p></p:txBody></p:sp>"#;

    const RELS: &str = r#"<Relationships>
        <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
        <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
    </Relationships>"#;

    fn decode_fixture(tree: &str, resolver: &Media) -> Option<Slide> {
        let doc = decode("ppt/slides/slide1.xml", slide_xml(tree).as_bytes()).unwrap();
        let rels = Relationships::parse("rels", RELS).unwrap();
        decode_slide("ppt/slides/slide1.xml", &doc, &rels, resolver, 1)
    }

    #[test]
    fn test_z_order_follows_document_order() {
        let resolver = media(&[("ppt/media/image1.png", b"png-bytes")]);
        let slide = decode_fixture(&format!("{SHAPE}{PICTURE}{TEXT_BOX}"), &resolver).unwrap();

        let kinds: Vec<_> = slide.elements.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ElementKind::Shape, ElementKind::Image, ElementKind::Text]);
        let z: Vec<_> = slide.elements.iter().map(|e| e.z_order).collect();
        assert_eq!(z, vec![0, 1, 2]);
        assert_eq!(slide.name.as_deref(), Some("Intro"));
        assert_eq!(
            slide.background,
            Some(Background::Solid {
                color: "112233".to_string()
            })
        );
    }

    #[test]
    fn test_shape_geometry_and_style() {
        let slide = decode_fixture(SHAPE, &media(&[])).unwrap();
        let shape = &slide.elements[0];

        assert_eq!(shape.position, Position::new(72.0, 36.0));
        assert_eq!(shape.size, Size::new(144.0, 72.0));
        assert_eq!(shape.name.as_deref(), Some("Rectangle 1"));
        match &shape.content {
            ElementContent::Shape(s) => assert_eq!(s.geometry, "ellipse"),
            other => panic!("expected shape, got {:?}", other),
        }
        let style = shape.style.as_ref().unwrap();
        assert_eq!(style.fill.as_deref(), Some("FF0000"));
        let border = style.border.as_ref().unwrap();
        assert_eq!(border.color.as_deref(), Some("000000"));
        assert_eq!(border.width, Some(1.0));
        // spTree > [nvGrpSpPr, grpSpPr, sp]
        assert_eq!(shape.source.as_ref().unwrap().node_path, vec![0, 1, 2]);
    }

    #[test]
    fn test_text_box_text_and_style() {
        let slide = decode_fixture(TEXT_BOX, &media(&[])).unwrap();
        let text = &slide.elements[0];

        assert_eq!(text.text_value(), Some("Hello there\nSecond"));
        let style = text.style.as_ref().unwrap();
        assert_eq!(style.font_size, Some(24.0));
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.color.as_deref(), Some("00FF00"));
        assert_eq!(style.font_family.as_deref(), Some("Arial"));
        assert_eq!(style.alignment, Some(TextAlign::Center));
    }

    #[test]
    fn test_image_resolution() {
        let resolver = media(&[("ppt/media/image1.png", b"abc")]);
        let slide = decode_fixture(PICTURE, &resolver).unwrap();
        let image = slide.elements[0].content.as_image().unwrap();

        assert!(image.is_resolved());
        assert_eq!(image.media_path.as_deref(), Some("ppt/media/image1.png"));
        assert_eq!(image.data_uri.as_deref(), Some("data:image/png;base64,YWJj"));
        assert_eq!(image.alt_text.as_deref(), Some("Logo"));
        assert_eq!(slide.elements[0].size, Size::new(1.0, 2.0));
    }

    #[test]
    fn test_missing_media_keeps_placeholder() {
        let slide = decode_fixture(PICTURE, &media(&[])).unwrap();
        let image = slide.elements[0].content.as_image().unwrap();
        assert_eq!(image.resolution, ImageResolution::Missing);
        assert!(image.data_uri.is_none());
    }

    #[test]
    fn test_unknown_relationship_keeps_placeholder() {
        let picture = PICTURE.replace("rId2", "rId9");
        let slide = decode_fixture(&picture, &media(&[])).unwrap();
        assert_eq!(slide.elements.len(), 1);
        assert_eq!(
            slide.elements[0].content.as_image().unwrap().resolution,
            ImageResolution::Missing
        );
    }

    #[test]
    fn test_resolve_images_is_idempotent() {
        let resolver = media(&[("ppt/media/image1.png", b"abc")]);
        let mut slide = decode_fixture(PICTURE, &resolver).unwrap();
        let before = slide.clone();

        let rels = Relationships::parse("rels", RELS).unwrap();
        resolve_images(&mut slide, &rels, &resolver);
        assert_eq!(slide, before);
    }

    #[test]
    fn test_bad_element_is_dropped() {
        let broken = SHAPE.replace(r#"x="914400""#, r#"x="wide""#);
        let slide = decode_fixture(&format!("{broken}{TEXT_BOX}"), &media(&[])).unwrap();

        assert_eq!(slide.elements.len(), 1);
        assert_eq!(slide.elements[0].kind, ElementKind::Text);
        assert_eq!(slide.elements[0].z_order, 0);
    }

    #[test]
    fn test_missing_transform_reads_as_zero() {
        let shape = r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="x"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#;
        let slide = decode_fixture(shape, &media(&[])).unwrap();
        assert_eq!(slide.elements[0].position, Position::default());
        assert_eq!(slide.elements[0].size, Size::default());
        assert!(slide.elements[0].style.is_none());
    }

    #[test]
    fn test_graphic_frames_and_groups() {
        let frames = format!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="6" name="Chart 1"/></p:nvGraphicFramePr><p:xfrm><a:off x="0" y="0"/><a:ext cx="12700" cy="12700"/></p:xfrm><a:graphic><a:graphicData uri="{CHART_URI}"/></a:graphic></p:graphicFrame><p:grpSp/><p:graphicFrame><a:graphic><a:graphicData uri="{TABLE_URI}"/></a:graphic></p:graphicFrame>"#
        );
        let slide = decode_fixture(&frames, &media(&[])).unwrap();
        let kinds: Vec<_> = slide.elements.iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ElementKind::Chart, ElementKind::Table]);
        assert_eq!(slide.elements[1].z_order, 1);
    }

    #[test]
    fn test_slide_without_tree_is_omitted() {
        let doc = decode("s.xml", format!(r#"<p:sld {NS}><p:cSld/></p:sld>"#).as_bytes()).unwrap();
        let rels = Relationships::new();
        assert!(decode_slide("s.xml", &doc, &rels, &media(&[]), 1).is_none());

        let doc = decode("s.xml", format!(r#"<p:sld {NS}/>"#).as_bytes()).unwrap();
        assert!(decode_slide("s.xml", &doc, &rels, &media(&[]), 1).is_none());
    }

    #[test]
    fn test_layout_reference() {
        let resolver = media(&[("ppt/slideLayouts/slideLayout1.xml", b"<x/>")]);
        let slide = decode_fixture("", &resolver).unwrap();
        assert_eq!(slide.layout.as_deref(), Some("ppt/slideLayouts/slideLayout1.xml"));
        assert!(slide.elements.is_empty());
    }
}

//! Theme part: color scheme and font scheme

use crate::pptx::error::PptxResult;
use crate::pptx::xml_tree::{self, XmlNode};
use doc_model::{FontScheme, Theme};

/// Parse a theme part (`ppt/theme/themeN.xml`)
pub fn parse_theme(part: &str, bytes: &[u8]) -> PptxResult<Theme> {
    let doc = xml_tree::decode(part, bytes)?;
    let mut theme = Theme {
        name: doc.root.attr("name").map(str::to_string),
        ..Default::default()
    };

    let Some(elements) = doc.root.child("themeElements") else {
        return Ok(theme);
    };

    if let Some(scheme) = elements.child("clrScheme") {
        for slot in scheme.elements() {
            if let Some(color) = scheme_color(slot) {
                theme.colors.insert(slot.local_name().to_string(), color);
            }
        }
    }

    if let Some(fonts) = elements.child("fontScheme") {
        theme.fonts = FontScheme {
            major: latin_typeface(fonts, "majorFont"),
            minor: latin_typeface(fonts, "minorFont"),
        };
    }

    Ok(theme)
}

/// `a:srgbClr@val`, or the last computed value of a system color
fn scheme_color(slot: &XmlNode) -> Option<String> {
    if let Some(rgb) = slot.child("srgbClr") {
        return rgb.attr("val").map(str::to_string);
    }
    slot.child("sysClr")
        .and_then(|sys| sys.attr("lastClr"))
        .map(str::to_string)
}

fn latin_typeface(fonts: &XmlNode, which: &str) -> Option<String> {
    fonts
        .find(&[which, "latin"])
        .and_then(|latin| latin.attr("typeface"))
        .filter(|face| !face.is_empty())
        .map(str::to_string)
}

//! Drawing the label onto page 1 with lopdf.
//!
//! The stamper never touches the caller's buffer. It parses a fresh copy,
//! appends one label stream to page 1, and serialises the whole document
//! again. Existing content streams are kept byte-for-byte; pages other than
//! page 1 are not edited at all.
//!
//! ## Resources
//!
//! Page 1 gets a private copy of its resource dictionary (even when the
//! original is inherited from the page tree or shared with other pages) and
//! two new entries in it:
//!
//! - a standard-14 `Helvetica-Bold` font with `WinAnsiEncoding`
//! - an `ExtGState` carrying the stamp opacity as `ca`/`CA`
//!
//! Resource names are chosen so they never shadow an existing entry.
//!
//! ## Content
//!
//! ```text
//! q /GSStamp gs BT r g b rg /FStamp size Tf a b c d e f Tm (FAST) Tj ET Q
//! ```
//!
//! The stream is appended after the existing ones, so the label paints over
//! the page. The existing streams are bracketed by two one-operator streams,
//! `q` before and `Q` after, so a transform they leave behind is undone
//! before the label is drawn:
//!
//! ```text
//! [ q ] [ existing … ] [ Q ] [ label ]
//! ```

use crate::config::StampStyle;
use crate::error::StampError;
use crate::font::StandardFont;
use crate::geometry::{PageSize, StampGeometry};
use crate::placement::PlacementSuggestion;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::fmt::Write as _;
use tracing::{debug, info};

/// Upper bound on page-tree depth when looking up inherited attributes.
const MAX_TREE_DEPTH: usize = 32;

const FONT_RESOURCE: &str = "FStamp";
const GSTATE_RESOURCE: &str = "GSStamp";

/// A stamped copy of the input.
#[derive(Debug, Clone)]
pub struct StampedDocument {
    pub bytes: Vec<u8>,
    pub page_size: PageSize,
    pub geometry: StampGeometry,
}

/// Stamp page 1 of `original` at `placement`.
pub fn stamp_first_page(
    original: &[u8],
    placement: &PlacementSuggestion,
    style: &StampStyle,
) -> Result<StampedDocument, StampError> {
    let mut doc = Document::load_mem(original).map_err(|e| StampError::Load {
        detail: e.to_string(),
    })?;

    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(StampError::Load {
            detail: "document is encrypted".to_string(),
        });
    }

    let page_id = first_page_id(&doc)?;
    let page_size = page_size(&doc, page_id)?;

    let font = StandardFont::HelveticaBold;
    let mut effective = placement.clone();
    effective.font_size = style.font_size_policy.apply(placement.font_size);
    let text_width = font.text_width(&style.text, effective.font_size)?;
    let geometry = StampGeometry::compute(page_size, &effective, text_width);

    debug!(
        "Page 1 is {:.1}×{:.1} pt; label '{}' is {:.2} pt wide at {:.1} pt",
        page_size.width, page_size.height, style.text, text_width, effective.font_size
    );

    let font_id = doc.add_object(font_dictionary(font));
    let gstate_id = doc.add_object(opacity_state(style.opacity));
    let (font_name, gstate_name) = attach_resources(&mut doc, page_id, font_id, gstate_id)?;

    let content = stamp_content(&geometry, style, &font_name, &gstate_name);
    append_content(&mut doc, page_id, content.into_bytes())?;

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| StampError::SaveFailed {
        detail: e.to_string(),
    })?;

    info!(
        "Stamped page 1 at ({:.1}, {:.1}) pt, {} → {} bytes",
        geometry.target_x,
        geometry.target_y,
        original.len(),
        bytes.len()
    );

    Ok(StampedDocument {
        bytes,
        page_size,
        geometry,
    })
}

fn first_page_id(doc: &Document) -> Result<ObjectId, StampError> {
    doc.get_pages()
        .get(&1)
        .copied()
        .ok_or_else(|| StampError::Load {
            detail: "document has no page 1".to_string(),
        })
}

/// Follow one level of indirection.
fn deref<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(deref(doc, value));
        }
        let parent = match node.get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Page size from the MediaBox. The box origin is not applied.
fn page_size(doc: &Document, page_id: ObjectId) -> Result<PageSize, StampError> {
    let values: Vec<f64> = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .map(|arr| arr.iter().filter_map(|o| number(deref(doc, o))).collect())
        .unwrap_or_default();

    match values.as_slice() {
        [llx, lly, urx, ury] => Ok(PageSize::new((urx - llx).abs(), (ury - lly).abs())),
        _ => Err(StampError::Load {
            detail: "page 1 has no usable MediaBox".to_string(),
        }),
    }
}

fn font_dictionary(font: StandardFont) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Font".to_vec()));
    dict.set("Subtype", Object::Name(b"Type1".to_vec()));
    dict.set("BaseFont", Object::Name(font.base_font().as_bytes().to_vec()));
    dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
    dict
}

fn opacity_state(opacity: f64) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"ExtGState".to_vec()));
    dict.set("ca", Object::Real(opacity as f32));
    dict.set("CA", Object::Real(opacity as f32));
    dict
}

/// First of `base`, `base1`, `base2`, … not already used in `dict`.
fn unique_name(dict: &Dictionary, base: &str) -> String {
    if !dict.has(base.as_bytes()) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}{n}"))
        .find(|name| !dict.has(name.as_bytes()))
        .unwrap_or_else(|| base.to_string())
}

/// Copy of the sub-dictionary `key` of `resources`, or an empty one.
fn owned_subdict(doc: &Document, resources: &Dictionary, key: &[u8]) -> Result<Dictionary, StampError> {
    match resources.get(key) {
        Ok(obj) => deref(doc, obj)
            .as_dict()
            .cloned()
            .map_err(|e| StampError::FontEmbed {
                detail: format!(
                    "/{} resource is not a dictionary: {}",
                    String::from_utf8_lossy(key),
                    e
                ),
            }),
        Err(_) => Ok(Dictionary::new()),
    }
}

/// Give page 1 a private resource dictionary holding the stamp font and
/// graphics state. Returns the names they were registered under.
fn attach_resources(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    gstate_id: ObjectId,
) -> Result<(String, String), StampError> {
    let mut resources = match inherited(doc, page_id, b"Resources") {
        Some(obj) => obj.as_dict().cloned().map_err(|e| StampError::FontEmbed {
            detail: format!("page 1 resources are not a dictionary: {}", e),
        })?,
        None => Dictionary::new(),
    };

    let mut fonts = owned_subdict(doc, &resources, b"Font")?;
    let font_name = unique_name(&fonts, FONT_RESOURCE);
    fonts.set(font_name.as_str(), Object::Reference(font_id));

    let mut states = owned_subdict(doc, &resources, b"ExtGState")?;
    let gstate_name = unique_name(&states, GSTATE_RESOURCE);
    states.set(gstate_name.as_str(), Object::Reference(gstate_id));

    resources.set("Font", Object::Dictionary(fonts));
    resources.set("ExtGState", Object::Dictionary(states));

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| StampError::FontEmbed {
            detail: format!("page 1 is not a dictionary: {}", e),
        })?;
    page.set("Resources", Object::Dictionary(resources));

    Ok((font_name, gstate_name))
}

/// Escape a string for a PDF literal.
fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn stamp_content(geometry: &StampGeometry, style: &StampStyle, font: &str, gstate: &str) -> String {
    let [r, g, b] = style.color;
    let [ma, mb, mc, md, me, mf] = geometry.text_matrix();

    let mut content = String::new();
    content.push_str("q\n");
    let _ = writeln!(content, "/{gstate} gs");
    content.push_str("BT\n");
    let _ = writeln!(content, "{r:.4} {g:.4} {b:.4} rg");
    let _ = writeln!(content, "/{font} {:.4} Tf", geometry.font_size);
    let _ = writeln!(
        content,
        "{ma:.6} {mb:.6} {mc:.6} {md:.6} {me:.4} {mf:.4} Tm"
    );
    let _ = writeln!(content, "({}) Tj", escape_literal(&style.text));
    content.push_str("ET\n");
    content.push_str("Q\n");
    content
}

/// Existing `/Contents` of a page as a list of stream references.
fn existing_streams(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let contents = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Contents").ok());

    match contents {
        // Indirect array of streams: copied so no other page sees the change.
        Some(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(arr)) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Some(Object::Array(arr)) => arr.clone(),
        _ => Vec::new(),
    }
}

/// Add `content` as a new stream after page 1's existing content, which is
/// isolated in its own `q`/`Q` pair first.
fn append_content(doc: &mut Document, page_id: ObjectId, content: Vec<u8>) -> Result<(), StampError> {
    let existing = existing_streams(doc, page_id);
    let stamp_id = doc.add_object(Stream::new(Dictionary::new(), content));

    let contents = if existing.is_empty() {
        Object::Reference(stamp_id)
    } else {
        let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        let mut streams = Vec::with_capacity(existing.len() + 3);
        streams.push(Object::Reference(save_id));
        streams.extend(existing);
        streams.push(Object::Reference(restore_id));
        streams.push(Object::Reference(stamp_id));
        Object::Array(streams)
    };

    let page = doc
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| StampError::Load {
            detail: format!("page 1 is not a dictionary: {}", e),
        })?;
    page.set("Contents", contents);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FontSizePolicy;
    use lopdf::content::Content;
    use lopdf::dictionary;

    /// Two Letter pages sharing one resource dictionary via reference.
    /// MediaBox lives on the Pages node and is inherited.
    fn two_page_pdf() -> (Vec<u8>, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let helv = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => Object::Reference(helv) },
        });
        let c1 = doc.add_object(Stream::new(
            Dictionary::new(),
            b"BT /F1 12 Tf 72 720 Td (Manifest) Tj ET".to_vec(),
        ));
        let c2 = doc.add_object(Stream::new(
            Dictionary::new(),
            b"BT /F1 12 Tf 72 720 Td (Page two) Tj ET".to_vec(),
        ));
        let pages_id = doc.new_object_id();
        let p1 = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(c1),
            "Resources" => Object::Reference(resources_id),
        });
        let p2 = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(c2),
            "Resources" => Object::Reference(resources_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(p1), Object::Reference(p2)],
                "Count" => 2,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        (buffer, resources_id)
    }

    fn contents_of(doc: &Document, page: u32) -> Object {
        let id = doc.get_pages()[&page];
        doc.get_dictionary(id).unwrap().get(b"Contents").unwrap().clone()
    }

    fn stream_text(doc: &Document, obj: &Object) -> String {
        let id = obj.as_reference().unwrap();
        let stream = doc.get_object(id).unwrap().as_stream().unwrap();
        String::from_utf8_lossy(&stream.content).into_owned()
    }

    fn operand(obj: &Object) -> f64 {
        number(obj).expect("numeric operand")
    }

    fn centred() -> PlacementSuggestion {
        PlacementSuggestion::new(50.0, 10.0, 90.0, 0.0)
    }

    #[test]
    fn wraps_page_and_appends_label() {
        let (pdf, _) = two_page_pdf();
        let out = stamp_first_page(&pdf, &centred(), &StampStyle::default()).unwrap();
        assert!(out.bytes.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&out.bytes).unwrap();
        let Object::Array(streams) = contents_of(&doc, 1) else {
            panic!("page 1 contents should become an array");
        };
        assert_eq!(streams.len(), 4);
        assert_eq!(stream_text(&doc, &streams[0]).trim(), "q");
        assert!(stream_text(&doc, &streams[1]).contains("(Manifest) Tj"));
        assert_eq!(stream_text(&doc, &streams[2]).trim(), "Q");
        let stamp = stream_text(&doc, &streams[3]);
        assert!(stamp.contains("(FAST) Tj"), "got: {stamp}");
        assert!(stamp.contains("/GSStamp gs"));
        assert!(stamp.contains("0.1000 0.2000 0.8000 rg"));
    }

    #[test]
    fn other_pages_are_untouched() {
        let (pdf, resources_id) = two_page_pdf();
        let out = stamp_first_page(&pdf, &centred(), &StampStyle::default()).unwrap();
        let doc = Document::load_mem(&out.bytes).unwrap();

        let c2 = contents_of(&doc, 2);
        assert!(matches!(c2, Object::Reference(_)));
        assert!(stream_text(&doc, &c2).contains("(Page two) Tj"));

        let p2 = doc.get_dictionary(doc.get_pages()[&2]).unwrap();
        assert_eq!(
            p2.get(b"Resources").unwrap().as_reference().unwrap(),
            resources_id
        );
    }

    #[test]
    fn shared_resources_are_not_mutated() {
        let (pdf, resources_id) = two_page_pdf();
        let out = stamp_first_page(&pdf, &centred(), &StampStyle::default()).unwrap();
        let doc = Document::load_mem(&out.bytes).unwrap();

        let shared = doc.get_dictionary(resources_id).unwrap();
        let shared_fonts = shared.get(b"Font").unwrap().as_dict().unwrap();
        assert!(!shared_fonts.has(b"FStamp"));
        assert!(shared.get(b"ExtGState").is_err());

        let p1 = doc.get_dictionary(doc.get_pages()[&1]).unwrap();
        let own = p1.get(b"Resources").unwrap().as_dict().unwrap();
        let fonts = own.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"), "existing fonts stay available");
        let stamp_font = doc
            .get_dictionary(fonts.get(b"FStamp").unwrap().as_reference().unwrap())
            .unwrap();
        assert_eq!(
            stamp_font.get(b"BaseFont").unwrap().as_name().unwrap(),
            b"Helvetica-Bold"
        );

        let states = own.get(b"ExtGState").unwrap().as_dict().unwrap();
        let gs = doc
            .get_dictionary(states.get(b"GSStamp").unwrap().as_reference().unwrap())
            .unwrap();
        assert!((operand(gs.get(b"ca").unwrap()) - 0.85).abs() < 1e-6);
        assert!((operand(gs.get(b"CA").unwrap()) - 0.85).abs() < 1e-6);
    }

    #[test]
    fn text_matrix_matches_geometry() {
        let (pdf, _) = two_page_pdf();
        let out = stamp_first_page(&pdf, &centred(), &StampStyle::default()).unwrap();
        assert_eq!(out.page_size, PageSize::new(612.0, 792.0));
        assert!((out.geometry.target_y - 712.8).abs() < 1e-9);
        assert!((out.geometry.target_x - (306.0 - 2611.0 * 90.0 / 2000.0)).abs() < 1e-9);

        let doc = Document::load_mem(&out.bytes).unwrap();
        let Object::Array(streams) = contents_of(&doc, 1) else {
            panic!("expected array");
        };
        let text = stream_text(&doc, streams.last().unwrap());
        let ops = Content::decode(text.as_bytes()).unwrap().operations;

        let tm = ops.iter().find(|op| op.operator == "Tm").unwrap();
        assert!((operand(&tm.operands[4]) - out.geometry.target_x).abs() < 1e-3);
        assert!((operand(&tm.operands[5]) - 712.8).abs() < 1e-3);

        let tf = ops.iter().find(|op| op.operator == "Tf").unwrap();
        assert_eq!(tf.operands[0].as_name().unwrap(), b"FStamp");
        assert!((operand(&tf.operands[1]) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn stamping_twice_adds_two_labels() {
        let (pdf, _) = two_page_pdf();
        let once = stamp_first_page(&pdf, &centred(), &StampStyle::default()).unwrap();
        let twice = stamp_first_page(&once.bytes, &centred(), &StampStyle::default()).unwrap();

        let doc = Document::load_mem(&twice.bytes).unwrap();
        let Object::Array(streams) = contents_of(&doc, 1) else {
            panic!("expected array");
        };
        // [q [q page Q label1] Q label2]
        assert_eq!(streams.len(), 7);
        let labels = streams
            .iter()
            .filter(|s| stream_text(&doc, s).contains("(FAST) Tj"))
            .count();
        assert_eq!(labels, 2);
        // The second run must not shadow the first run's resources.
        let last = stream_text(&doc, streams.last().unwrap());
        assert!(last.contains("/FStamp1 "));
        assert!(last.contains("/GSStamp1 gs"));
    }

    #[test]
    fn original_buffer_is_not_modified() {
        let (pdf, _) = two_page_pdf();
        let before = pdf.clone();
        let _ = stamp_first_page(&pdf, &centred(), &StampStyle::default()).unwrap();
        assert_eq!(pdf, before);
    }

    #[test]
    fn clamp_policy_changes_the_drawn_size() {
        let (pdf, _) = two_page_pdf();
        let style = StampStyle {
            font_size_policy: FontSizePolicy::Clamp { min: 70.0, max: 110.0 },
            ..StampStyle::default()
        };
        let huge = PlacementSuggestion::new(50.0, 10.0, 400.0, 0.0);
        let out = stamp_first_page(&pdf, &huge, &style).unwrap();
        assert_eq!(out.geometry.font_size, 110.0);
    }

    #[test]
    fn page_without_contents_gets_a_single_reference() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(595.28), Object::Real(841.89)],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page)],
                "Count" => 1,
            }),
        );
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog));
        let mut pdf = Vec::new();
        doc.save_to(&mut pdf).unwrap();

        let out = stamp_first_page(&pdf, &centred(), &StampStyle::default()).unwrap();
        assert!((out.page_size.width - 595.28).abs() < 1e-3);

        let stamped = Document::load_mem(&out.bytes).unwrap();
        let contents = contents_of(&stamped, 1);
        assert!(stream_text(&stamped, &contents).contains("(FAST) Tj"));
    }

    /// Scale factor of the CTM in effect at the label's `BT`, tracking
    /// `q`, `Q` and `cm` across the page's concatenated content.
    fn ctm_scale_at_label(doc: &Document) -> f64 {
        let page_id = doc.get_pages()[&1];
        let content = doc.get_page_content(page_id).unwrap();
        let ops = Content::decode(&content).unwrap().operations;

        let mut stack = Vec::new();
        let mut scale = 1.0;
        let mut in_label = false;
        for op in &ops {
            match op.operator.as_str() {
                "q" => stack.push(scale),
                "Q" => scale = stack.pop().unwrap_or(1.0),
                "cm" => scale *= operand(&op.operands[0]),
                "Tf" if op.operands[0].as_name().unwrap() == b"FStamp" => in_label = true,
                "Tj" if in_label => return scale,
                _ => {}
            }
        }
        panic!("label not found");
    }

    #[test]
    fn leaked_transform_does_not_reach_the_label() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content = doc.add_object(Stream::new(
            Dictionary::new(),
            b"0.5 0 0 0.5 0 0 cm 0 0 100 100 re f".to_vec(),
        ));
        let page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => Object::Reference(content),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page)],
                "Count" => 1,
            }),
        );
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog));
        let mut pdf = Vec::new();
        doc.save_to(&mut pdf).unwrap();

        let out = stamp_first_page(&pdf, &centred(), &StampStyle::default()).unwrap();
        let stamped = Document::load_mem(&out.bytes).unwrap();
        assert_eq!(ctm_scale_at_label(&stamped), 1.0);

        // The scanned content itself is unchanged.
        let original = stamped.get_object(content).unwrap().as_stream().unwrap();
        assert_eq!(original.content, b"0.5 0 0 0.5 0 0 cm 0 0 100 100 re f");
    }

    #[test]
    fn garbage_is_a_load_error() {
        let err = stamp_first_page(b"definitely not a pdf", &centred(), &StampStyle::default())
            .unwrap_err();
        assert!(matches!(err, StampError::Load { .. }));
    }

    #[test]
    fn unmeasurable_label_is_a_font_error() {
        let (pdf, _) = two_page_pdf();
        let style = StampStyle {
            text: "RÁPIDO→".to_string(),
            ..StampStyle::default()
        };
        let err = stamp_first_page(&pdf, &centred(), &style).unwrap_err();
        assert!(matches!(err, StampError::FontEmbed { .. }));
    }

    #[test]
    fn literal_escaping() {
        assert_eq!(escape_literal("FAST"), "FAST");
        assert_eq!(escape_literal(r"a(b)c\d"), r"a\(b\)c\\d");
    }

    #[test]
    fn unique_names_skip_existing() {
        let mut dict = Dictionary::new();
        assert_eq!(unique_name(&dict, "FStamp"), "FStamp");
        dict.set("FStamp", Object::Null);
        dict.set("FStamp1", Object::Null);
        assert_eq!(unique_name(&dict, "FStamp"), "FStamp2");
    }
}

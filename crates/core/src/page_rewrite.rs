//! Page text replacement
//!
//! A page is rebuilt rather than edited in place: everything in its content
//! stream except text objects is carried over to a fresh page of the same
//! size, and the new text is written as plain Helvetica lines from a fixed
//! anchor near the top-left corner. Original text positions, fonts and
//! styling are lost.
//!
//! Only text objects in the page's own content stream are removed. Text
//! drawn by a Form XObject (`Do`) lives in that XObject's stream, so it is
//! kept and still shows under the replacement text.

use crate::page_tree::{self, PageBox};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Resource name the inserted font is registered under
pub const FONT_RESOURCE: &str = "EdHelv";

/// Where and how replacement text is written
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPlacement {
    /// Distance of the first baseline from the page's left edge, in points
    pub anchor_x: f32,

    /// Distance of the first baseline from the page's top edge, in points
    pub anchor_y: f32,

    /// Font size in points
    pub font_size: f32,

    /// Baseline-to-baseline distance as a multiple of the font size
    pub line_height: f32,
}

impl Default for TextPlacement {
    fn default() -> Self {
        Self { anchor_x: 50.0, anchor_y: 50.0, font_size: 11.0, line_height: 1.2 }
    }
}

impl TextPlacement {
    /// Text leading (TL) in points
    pub fn leading(&self) -> f32 {
        self.font_size * self.line_height
    }

    /// Baseline origin of the first line in PDF coordinates
    pub fn origin(&self, media: &PageBox) -> (f32, f32) {
        (media.left() + self.anchor_x, media.top() - self.anchor_y)
    }
}

/// Drop every `BT ... ET` text object, keeping all other operators in order.
///
/// XObject invocations (`Do`) are graphics operators and pass through.
pub fn strip_text_objects(operations: Vec<Operation>) -> Vec<Operation> {
    let mut in_text = false;
    operations
        .into_iter()
        .filter(|operation| match operation.operator.as_str() {
            "BT" => {
                in_text = true;
                false
            }
            "ET" => {
                in_text = false;
                false
            }
            _ => !in_text,
        })
        .collect()
}

/// Wrap operators in `q ... Q` so their graphics state cannot leak.
///
/// Saves left open by the original stream are closed before the outer `Q`.
pub fn isolate_graphics_state(operations: Vec<Operation>) -> Vec<Operation> {
    if operations.is_empty() {
        return operations;
    }

    let mut depth = 0usize;
    for operation in &operations {
        match operation.operator.as_str() {
            "q" => depth += 1,
            "Q" => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    let mut isolated = Vec::with_capacity(operations.len() + depth + 2);
    isolated.push(Operation::new("q", vec![]));
    isolated.extend(operations);
    isolated.extend((0..depth).map(|_| Operation::new("Q", vec![])));
    isolated.push(Operation::new("Q", vec![]));
    isolated
}

/// Encode one line for a WinAnsiEncoding simple font.
///
/// Tabs become spaces, carriage returns are dropped, anything the encoding
/// cannot represent is written as `?`.
pub fn encode_win_ansi(line: &str) -> Vec<u8> {
    line.chars().filter(|c| *c != '\r').map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\t' => b' ',
        ' '..='~' => c as u8,
        '\u{a0}'..='\u{ff}' => c as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => b'?',
    }
}

/// Text object writing `text` line by line from `origin`.
///
/// Returns no operators for empty text.
pub fn text_operations(
    text: &str,
    origin: (f32, f32),
    placement: &TextPlacement,
) -> Vec<Operation> {
    if text.is_empty() {
        return Vec::new();
    }

    let font = Object::Name(FONT_RESOURCE.as_bytes().to_vec());
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font, Object::Real(placement.font_size)]),
        Operation::new("TL", vec![Object::Real(placement.leading())]),
        Operation::new("Td", vec![Object::Real(origin.0), Object::Real(origin.1)]),
    ];

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        let encoded = encode_win_ansi(line);
        if !encoded.is_empty() {
            let string = Object::String(encoded, StringFormat::Literal);
            operations.push(Operation::new("Tj", vec![string]));
        }
    }

    operations.push(Operation::new("ET", vec![]));
    operations
}

fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Rebuild `page_id` with its non-text content and `text` at the anchor.
///
/// The new page dictionary takes over the original object id, which keeps
/// the page at its index in the page tree. The superseded content streams
/// become unreferenced and are dropped when the document is pruned.
pub fn rebuild_page(
    doc: &mut Document,
    page_id: ObjectId,
    text: &str,
    placement: &TextPlacement,
) -> lopdf::Result<()> {
    let media = page_tree::media_box(doc, page_id);
    let crop = page_tree::crop_box(doc, page_id);
    let rotate = page_tree::inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|object| object.as_i64().ok());
    let parent = doc.get_dictionary(page_id)?.get(b"Parent").ok().cloned();
    let mut resources = page_tree::resources(doc, page_id);
    let mut fonts = resources
        .get(b"Font")
        .ok()
        .map(|object| page_tree::resolve(doc, object))
        .and_then(|object| object.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new);

    let original = Content::decode(&doc.get_page_content(page_id)?)?;
    let kept = strip_text_objects(original.operations);
    let kept_count = kept.len();

    let mut operations = isolate_graphics_state(kept);
    operations.extend(text_operations(text, placement.origin(&media), placement));
    let encoded = Content { operations }.encode()?;

    let font_id = doc.add_object(helvetica());
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let contents_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let mut page = dictionary! {
        "Type" => "Page",
        "MediaBox" => media.to_object(),
        "Resources" => resources,
        "Contents" => contents_id,
    };
    if let Some(parent) = parent {
        page.set("Parent", parent);
    }
    if let Some(crop) = crop {
        page.set("CropBox", crop.to_object());
    }
    if let Some(rotate) = rotate {
        page.set("Rotate", rotate);
    }

    doc.objects.insert(page_id, Object::Dictionary(page));

    debug!(?page_id, kept_operators = kept_count, text_len = text.len(), "rebuilt page");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn op(operator: &str) -> Operation {
        Operation::new(operator, vec![])
    }

    fn operators(operations: &[Operation]) -> Vec<&str> {
        operations.iter().map(|o| o.operator.as_str()).collect()
    }

    fn decoded_page(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
        Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap().operations
    }

    #[test]
    fn test_strip_text_objects_keeps_graphics() {
        let ops = vec![op("q"), op("re"), op("f"), op("BT"), op("Tf"), op("Tj"), op("ET"), op("Q")];
        assert_eq!(operators(&strip_text_objects(ops)), vec!["q", "re", "f", "Q"]);
    }

    #[test]
    fn test_strip_text_objects_handles_several_blocks() {
        let ops = vec![op("BT"), op("Tj"), op("ET"), op("m"), op("BT"), op("TJ"), op("ET")];
        assert_eq!(operators(&strip_text_objects(ops)), vec!["m"]);
    }

    #[test]
    fn test_strip_text_objects_keeps_xobject_invocations() {
        let ops = vec![op("q"), op("cm"), op("Do"), op("Q"), op("BT"), op("Tj"), op("ET")];
        assert_eq!(operators(&strip_text_objects(ops)), vec!["q", "cm", "Do", "Q"]);
    }

    #[test]
    fn test_isolate_graphics_state_closes_open_saves() {
        let ops = vec![op("q"), op("cm"), op("q"), op("re"), op("Q")];
        let isolated = isolate_graphics_state(ops);
        assert_eq!(operators(&isolated), vec!["q", "q", "cm", "q", "re", "Q", "Q", "Q"]);
    }

    #[test]
    fn test_isolate_graphics_state_empty() {
        assert!(isolate_graphics_state(Vec::new()).is_empty());
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Hello"), b"Hello".to_vec());
        assert_eq!(encode_win_ansi("a\tb\r"), b"a b".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_win_ansi("€ “x”"), vec![0x80, b' ', 0x93, b'x', 0x94]);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_text_operations_lines() {
        let placement = TextPlacement::default();
        let ops = text_operations("one\n\nthree", (50.0, 742.0), &placement);
        assert_eq!(
            operators(&ops),
            vec!["BT", "Tf", "TL", "Td", "Tj", "T*", "T*", "Tj", "ET"]
        );
    }

    #[test]
    fn test_text_operations_empty_text() {
        assert!(text_operations("", (0.0, 0.0), &TextPlacement::default()).is_empty());
    }

    #[test]
    fn test_placement_origin_from_top_left() {
        let placement = TextPlacement::default();
        assert_eq!(placement.origin(&PageBox::LETTER), (50.0, 742.0));
        assert!((placement.leading() - 13.2).abs() < 1e-4);
    }

    #[test]
    fn test_rebuild_page_replaces_text_and_keeps_graphics() {
        let mut doc = Document::load_mem(&fixtures::sample_pdf(&["Original text"])).unwrap();
        let page_id = page_tree::page_ids(&doc)[0];

        rebuild_page(&mut doc, page_id, "Hello", &TextPlacement::default()).unwrap();

        assert_eq!(page_tree::page_ids(&doc), vec![page_id]);

        let ops = decoded_page(&doc, page_id);
        let names = operators(&ops);
        assert!(names.contains(&"re"), "filled rectangle should survive: {:?}", names);
        assert_eq!(names.iter().filter(|n| **n == "BT").count(), 1);

        let strings: Vec<&[u8]> = ops
            .iter()
            .filter(|o| o.operator == "Tj")
            .filter_map(|o| o.operands.first())
            .filter_map(|o| o.as_str().ok())
            .collect();
        assert_eq!(strings, vec![b"Hello".as_slice()]);

        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Hello"));
        assert!(!text.contains("Original"));
    }

    #[test]
    fn test_rebuild_page_copies_geometry_and_registers_font() {
        let mut doc = Document::load_mem(&fixtures::sample_pdf(&["x"])).unwrap();
        let page_id = page_tree::page_ids(&doc)[0];

        rebuild_page(&mut doc, page_id, "y", &TextPlacement::default()).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Parent"));
        assert_eq!(page_tree::media_box(&doc, page_id), PageBox::LETTER);

        let resources = page_tree::resources(&doc, page_id);
        let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(FONT_RESOURCE.as_bytes()));
        assert!(fonts.has(b"F1"), "existing fonts stay registered");
    }

    #[test]
    fn test_rebuild_page_only_touches_target_page() {
        let mut doc =
            Document::load_mem(&fixtures::sample_pdf(&["first", "second", "third"])).unwrap();
        let ids = page_tree::page_ids(&doc);

        rebuild_page(&mut doc, ids[1], "replacement", &TextPlacement::default()).unwrap();

        assert_eq!(page_tree::page_ids(&doc), ids);
        assert!(doc.extract_text(&[1]).unwrap().contains("first"));
        assert!(doc.extract_text(&[2]).unwrap().contains("replacement"));
        assert!(doc.extract_text(&[3]).unwrap().contains("third"));
    }
}

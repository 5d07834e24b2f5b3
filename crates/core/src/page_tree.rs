//! Page tree lookups on a lopdf document
//!
//! Page attributes such as MediaBox and Resources may live on any ancestor
//! /Pages node, so every read here walks the /Parent chain.

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdf_editor_render::PageDimensions;

/// Cap on /Parent hops, guards against cyclic page trees
const MAX_TREE_DEPTH: usize = 64;

/// Page boundary rectangle in default user space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl PageBox {
    /// US Letter at the origin
    pub const LETTER: PageBox = PageBox { llx: 0.0, lly: 0.0, urx: 612.0, ury: 792.0 };

    pub fn dimensions(&self) -> PageDimensions {
        PageDimensions { width: (self.urx - self.llx).abs(), height: (self.ury - self.lly).abs() }
    }

    /// Left edge, whichever corner the box was written with
    pub fn left(&self) -> f32 {
        self.llx.min(self.urx)
    }

    /// Top edge in PDF coordinates (origin bottom-left)
    pub fn top(&self) -> f32 {
        self.lly.max(self.ury)
    }

    pub fn to_object(self) -> Object {
        Object::Array(vec![
            Object::Real(self.llx),
            Object::Real(self.lly),
            Object::Real(self.urx),
            Object::Real(self.ury),
        ])
    }
}

/// Page object ids in document order
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Follow a reference to its target, leaving direct objects as they are
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Look up `key` on the page or the nearest ancestor that defines it
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

fn parse_box(doc: &Document, object: &Object) -> Option<PageBox> {
    let array = object.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }

    let number = |index: usize| resolve(doc, &array[index]).as_float().ok();
    Some(PageBox { llx: number(0)?, lly: number(1)?, urx: number(2)?, ury: number(3)? })
}

/// The page's MediaBox, US Letter when missing or malformed
pub fn media_box(doc: &Document, page_id: ObjectId) -> PageBox {
    inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|object| parse_box(doc, object))
        .unwrap_or(PageBox::LETTER)
}

/// The page's CropBox if one is set anywhere up the tree
pub fn crop_box(doc: &Document, page_id: ObjectId) -> Option<PageBox> {
    inherited_attribute(doc, page_id, b"CropBox").and_then(|object| parse_box(doc, object))
}

/// The page's resource dictionary as an owned copy.
///
/// Sub-dictionaries stay as written, references included, so the copy can be
/// attached to a new page of the same document.
pub fn resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    inherited_attribute(doc, page_id, b"Resources")
        .and_then(|object| object.as_dict().ok())
        .cloned()
        .unwrap_or_else(Dictionary::new)
}

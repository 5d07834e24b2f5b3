//! Sample documents for tests.
//!
//! Each page gets a light grey filled rectangle (non-text content) and one
//! line of Helvetica text, with MediaBox and Resources inherited from the
//! page tree root like many real-world producers write them.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::io;
use std::path::{Path, PathBuf};

/// US Letter, in points
pub const LETTER_SIZE: (f32, f32) = (612.0, 792.0);

/// US Legal, in points
pub const LEGAL_SIZE: (f32, f32) = (612.0, 1008.0);

/// Build a Letter-sized PDF with one page per entry of `pages`, each showing
/// that text
pub fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    sample_pdf_with_size(pages, LETTER_SIZE)
}

/// Like [`sample_pdf`] with every page `size` points wide and high
pub fn sample_pdf_with_size(pages: &[&str], size: (f32, f32)) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("rg", vec![Object::Real(0.9), Object::Real(0.9), Object::Real(0.9)]),
                Operation::new("re", vec![36.into(), 36.into(), 540.into(), 120.into()]),
                Operation::new("f", vec![]),
                Operation::new("Q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(text.as_bytes().to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let encoded = content.encode().unwrap_or_default();
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(size.0), Object::Real(size.1)],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = doc.save_to(&mut bytes);
    bytes
}

/// Write a sample PDF named `name` into `dir` and return its path
pub fn write_sample_pdf(dir: &Path, name: &str, pages: &[&str]) -> io::Result<PathBuf> {
    write_sample_pdf_with_size(dir, name, pages, LETTER_SIZE)
}

pub fn write_sample_pdf_with_size(
    dir: &Path,
    name: &str,
    pages: &[&str],
    size: (f32, f32),
) -> io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, sample_pdf_with_size(pages, size))?;
    Ok(path)
}

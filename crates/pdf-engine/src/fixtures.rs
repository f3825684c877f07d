//! Minimal in-memory PDFs for tests.

use lopdf::{dictionary, Document, Object};
use std::fs;
use std::io;
use std::path::Path;

/// Builds a PDF with one page per entry. `None` leaves the page without a
/// MediaBox so it inherits the page tree's 400x500 box.
pub fn pdf_bytes(media_boxes: &[Option<(i64, i64)>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = media_boxes
        .iter()
        .map(|media_box| {
            let mut page = dictionary! { "Type" => "Page", "Parent" => pages_id };
            if let Some((width, height)) = media_box {
                page.set("MediaBox", rect(*width, *height));
            }
            doc.add_object(page).into()
        })
        .collect();

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => media_boxes.len() as i64,
        "MediaBox" => rect(400, 500),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    // Writing into a Vec cannot fail for a document built in memory.
    let _ = doc.save_to(&mut bytes);
    bytes
}

/// Writes `pages` Letter-sized pages to `path`.
pub fn write_letter_pdf(path: &Path, pages: usize) -> io::Result<()> {
    fs::write(path, pdf_bytes(&vec![Some((612, 792)); pages]))
}

fn rect(width: i64, height: i64) -> Vec<Object> {
    vec![Object::Integer(0), Object::Integer(0), Object::Integer(width), Object::Integer(height)]
}

//! Document loading and page geometry.

use crate::interpreter::{interpret_page, PageContent};
use crate::PdfError;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

/// US Letter, used when a page has no usable `/MediaBox`.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Follow a reference to the object it points at. Non-references and
/// dangling references come back unchanged.
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    doc.dereference(obj).map(|(_, o)| o).unwrap_or(obj)
}

/// Dictionary lookup with the value dereferenced.
pub(crate) fn dict_get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().map(|o| resolve(doc, o))
}

/// Helper to get f64 from Object
///
/// Reals are stored as `f32`; they are widened through their shortest
/// decimal form so `595.276` stays `595.276`.
pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(widen(*r)),
        _ => None,
    }
}

fn widen(r: f32) -> f64 {
    if r.fract() == 0.0 || !r.is_finite() {
        return r as f64;
    }
    // Longest f32 Display output is well under this
    let mut buf = [0u8; 64];
    let mut cursor = Cursor::new(&mut buf[..]);
    if write!(cursor, "{}", r).is_err() {
        return r as f64;
    }
    let len = cursor.position() as usize;
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(r as f64)
}

/// Stream data with filters applied when it has any.
pub(crate) fn stream_bytes(stream: &Stream) -> Vec<u8> {
    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone())
    } else {
        stream.content.clone()
    }
}

/// Geometry of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageInfo {
    /// 1-based page number
    pub number: usize,
    /// Width in points, after rotation
    pub width: f64,
    /// Height in points, after rotation
    pub height: f64,
    /// `/Rotate`, normalized to 0, 90, 180 or 270
    pub rotation: i64,
    /// `[x0, y0, x1, y1]` in default user space
    pub media_box: [f64; 4],
    /// Sum of the heights of all preceding pages
    pub doctop_offset: f64,
}

/// An opened PDF.
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PdfDocument {
    /// Open a PDF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PdfError> {
        let file = File::open(path.as_ref())?;
        let doc = Document::load_from(file)?;
        Self::from_document(doc)
    }

    /// Load a PDF from a memory buffer
    pub fn load_mem(buffer: &[u8]) -> Result<Self, PdfError> {
        let doc = Document::load_mem(buffer)?;
        Self::from_document(doc)
    }

    /// Wrap an already loaded document
    pub fn from_document(doc: Document) -> Result<Self, PdfError> {
        if doc.catalog().is_err() {
            return Err(PdfError::InvalidStructure("missing document catalog".to_string()));
        }
        if doc.trailer.has(b"Encrypt") {
            log::warn!("document is encrypted; extraction may return garbled text");
        }
        let pages: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        log::debug!("loaded document with {} pages", pages.len());
        Ok(Self { doc, pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_id(&self, number: usize) -> Result<ObjectId, PdfError> {
        if number == 0 || number > self.pages.len() {
            return Err(PdfError::PageOutOfRange {
                page: number,
                page_count: self.pages.len(),
            });
        }
        Ok(self.pages[number - 1])
    }

    /// Geometry of a page (1-based)
    pub fn page_info(&self, number: usize) -> Result<PageInfo, PdfError> {
        let page_id = self.page_id(number)?;
        let (width, height, rotation, media_box) = self.page_geometry(page_id)?;

        let mut doctop_offset = 0.0;
        for &prev in &self.pages[..number - 1] {
            doctop_offset += self.page_geometry(prev)?.1;
        }

        Ok(PageInfo {
            number,
            width,
            height,
            rotation,
            media_box,
            doctop_offset,
        })
    }

    fn page_geometry(&self, page_id: ObjectId) -> Result<(f64, f64, i64, [f64; 4]), PdfError> {
        let page = self.doc.get_dictionary(page_id)?;

        let media_box = inherited(&self.doc, page, b"MediaBox")
            .and_then(|o| o.as_array().ok())
            .and_then(|arr| {
                let nums: Vec<f64> = arr
                    .iter()
                    .filter_map(|o| number(resolve(&self.doc, o)))
                    .collect();
                (nums.len() == 4).then(|| {
                    [
                        nums[0].min(nums[2]),
                        nums[1].min(nums[3]),
                        nums[0].max(nums[2]),
                        nums[1].max(nums[3]),
                    ]
                })
            })
            .unwrap_or_else(|| {
                log::warn!("page {:?} has no usable MediaBox, assuming Letter", page_id);
                DEFAULT_MEDIA_BOX
            });

        let rotation = inherited(&self.doc, page, b"Rotate")
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360);
        let rotation = rotation - rotation % 90;

        let w = media_box[2] - media_box[0];
        let h = media_box[3] - media_box[1];
        let (width, height) = if rotation == 90 || rotation == 270 {
            (h, w)
        } else {
            (w, h)
        };

        Ok((width, height, rotation, media_box))
    }

    /// Interpret a page into positioned chars and ruling edges
    pub fn page_content(&self, info: &PageInfo) -> Result<PageContent, PdfError> {
        let page_id = self.page_id(info.number)?;
        let page = self.doc.get_dictionary(page_id)?;
        let resources = inherited(&self.doc, page, b"Resources").and_then(|o| o.as_dict().ok());

        let content = self.doc.get_page_content(page_id);
        interpret_page(&self.doc, &content, resources, info)
    }
}

/// Page attribute lookup walking up `/Parent` for inheritable keys.
fn inherited<'a>(doc: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    for _ in 0..32 {
        if let Some(obj) = dict_get(doc, current, key) {
            return Some(obj);
        }
        current = dict_get(doc, current, b"Parent")?.as_dict().ok()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn doc_with_pages(boxes: &[(Vec<Object>, Option<i64>)]) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for (media_box, rotate) in boxes {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
            };
            if let Some(r) = rotate {
                page.set("Rotate", *r);
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_page_info_and_doctop() {
        let doc = doc_with_pages(&[
            (vec![0.into(), 0.into(), 612.into(), 792.into()], None),
            (vec![0.into(), 0.into(), 595.5.into(), 842.into()], None),
        ]);
        let pdf = PdfDocument::from_document(doc).unwrap();
        assert_eq!(pdf.page_count(), 2);

        let second = pdf.page_info(2).unwrap();
        assert_eq!(second.width, 595.5);
        assert_eq!(second.height, 842.0);
        assert_eq!(second.doctop_offset, 792.0);
    }

    #[test]
    fn test_reals_widen_to_their_decimal_form() {
        assert_eq!(number(&Object::Real(595.276)), Some(595.276));
        assert_eq!(number(&Object::Real(0.01)), Some(0.01));
        assert_eq!(number(&Object::Real(-12.0)), Some(-12.0));
        assert_eq!(number(&Object::Integer(7)), Some(7.0));
        assert_eq!(number(&Object::Null), None);
    }

    #[test]
    fn test_rotated_page_swaps_dimensions() {
        let doc = doc_with_pages(&[(vec![0.into(), 0.into(), 612.into(), 792.into()], Some(90))]);
        let pdf = PdfDocument::from_document(doc).unwrap();
        let info = pdf.page_info(1).unwrap();
        assert_eq!(info.rotation, 90);
        assert_eq!((info.width, info.height), (792.0, 612.0));
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = doc_with_pages(&[(vec![0.into(), 0.into(), 612.into(), 792.into()], None)]);
        let pdf = PdfDocument::from_document(doc).unwrap();
        match pdf.page_info(3) {
            Err(PdfError::PageOutOfRange { page, page_count }) => {
                assert_eq!((page, page_count), (3, 1));
            }
            other => panic!("expected PageOutOfRange, got {:?}", other),
        }
        assert!(pdf.page_info(0).is_err());
    }
}

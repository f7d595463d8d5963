//! Document assembly: one PDF page per saved image, in order.
//!
//! Each page is exactly as large as its image at 96 DPI
//! (1 px = 0.264583 mm), and the image covers the whole page from (0, 0).
//! Every image is loaded before anything is written, so a bad image aborts
//! the compile without producing a file.

use crate::error::ImgSeqError;
use crate::pipeline::embed::{self, EmbeddedImage};
use crate::progress::ProgressCallback;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Millimetres per pixel at the assumed 96 DPI.
pub const MM_PER_PX: f64 = 0.264583;

const PT_PER_MM: f64 = 72.0 / 25.4;

/// Page orientation label attached to every page.
///
/// Always [`Orientation::Portrait`]: it is a label only and does not follow
/// the image's aspect ratio. Page geometry comes from [`PageSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
}

/// Physical size of one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
    pub orientation: Orientation,
}

impl PageSize {
    pub fn from_pixels(width_px: u32, height_px: u32) -> Self {
        Self {
            width_mm: width_px as f64 * MM_PER_PX,
            height_mm: height_px as f64 * MM_PER_PX,
            orientation: Orientation::Portrait,
        }
    }

    /// Width and height in PDF points.
    pub fn to_points(&self) -> (f64, f64) {
        (self.width_mm * PT_PER_MM, self.height_mm * PT_PER_MM)
    }
}

/// A document that was written successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDocument {
    pub path: PathBuf,
    pub pages: Vec<PageSize>,
}

/// Bind `images` into a single PDF at `output_path`.
///
/// An empty list is rejected with [`ImgSeqError::EmptyDocument`].
pub fn compile(
    images: &[PathBuf],
    output_path: &Path,
    progress: &dyn ProgressCallback,
) -> Result<CompiledDocument, ImgSeqError> {
    if images.is_empty() {
        return Err(ImgSeqError::EmptyDocument {
            path: output_path.to_path_buf(),
        });
    }
    info!("Compiling {} image(s) into {}", images.len(), output_path.display());

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut page_ids = Vec::with_capacity(images.len());
    let mut sizes = Vec::with_capacity(images.len());

    for (i, path) in images.iter().enumerate() {
        let image = embed::load_image(path)?;
        let (width_px, height_px) = (image.width, image.height);
        let size = PageSize::from_pixels(width_px, height_px);

        page_ids.push(add_page(&mut doc, pages_id, image, &size));
        debug!(
            "Page {}: {} ({}×{} px → {:.3}×{:.3} mm)",
            i + 1,
            path.display(),
            width_px,
            height_px,
            size.width_mm,
            size.height_mm
        );
        sizes.push(size);
        progress.on_page_added(i + 1, images.len());
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    pages.set("Kids", Object::Array(kids));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(Object::Dictionary(catalog));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut info_dict = Dictionary::new();
    if let Some(stem) = output_path.file_stem() {
        info_dict.set("Title", Object::string_literal(stem.to_string_lossy().into_owned()));
    }
    info_dict.set(
        "Producer",
        Object::string_literal(concat!("imgseq-pdf ", env!("CARGO_PKG_VERSION"))),
    );
    let info_id = doc.add_object(Object::Dictionary(info_dict));
    doc.trailer.set("Info", Object::Reference(info_id));

    doc.compress();
    doc.save(output_path).map_err(|e| ImgSeqError::PdfWrite {
        path: output_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!("Wrote {} page(s) to {}", sizes.len(), output_path.display());
    Ok(CompiledDocument {
        path: output_path.to_path_buf(),
        pages: sizes,
    })
}

/// Add the image (and its soft mask) plus a page that shows it full-bleed.
fn add_page(doc: &mut Document, pages_id: ObjectId, image: EmbeddedImage, size: &PageSize) -> ObjectId {
    let EmbeddedImage {
        mut stream, smask, ..
    } = image;
    if let Some(mask) = smask {
        let mask_id = doc.add_object(Object::Stream(mask));
        stream.dict.set("SMask", Object::Reference(mask_id));
    }
    let image_id = doc.add_object(Object::Stream(stream));

    let (w, h) = size.to_points();
    let content = format!("q\n{w:.4} 0 0 {h:.4} 0 0 cm\n/Im0 Do\nQ\n");
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let mut xobjects = Dictionary::new();
    xobjects.set("Im0", Object::Reference(image_id));
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(w as f32),
            Object::Real(h as f32),
        ]),
    );
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Reference(content_id));

    doc.add_object(Object::Dictionary(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::embed::tests::{write_jpeg, write_png};
    use crate::progress::NoopProgressCallback;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn media_box(doc: &Document, page_id: ObjectId) -> Vec<f32> {
        let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
        page.get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o.as_float().unwrap())
            .collect()
    }

    #[test]
    fn page_size_at_96_dpi() {
        let size = PageSize::from_pixels(1000, 2000);
        assert!((size.width_mm - 264.583).abs() < 1e-9);
        assert!((size.height_mm - 529.166).abs() < 1e-9);
        assert_eq!(size.orientation, Orientation::Portrait);
    }

    #[test]
    fn landscape_images_are_still_labelled_portrait() {
        let size = PageSize::from_pixels(2000, 1000);
        assert!(size.width_mm > size.height_mm);
        assert_eq!(size.orientation, Orientation::Portrait);
    }

    #[test]
    fn points_conversion() {
        // 96 px = 1 inch = 72 pt (within the rounding of the mm constant).
        let (w, h) = PageSize::from_pixels(96, 192).to_points();
        assert!((w - 72.0).abs() < 0.01, "w = {w}");
        assert!((h - 144.0).abs() < 0.01, "h = {h}");
    }

    #[test]
    fn empty_list_is_rejected_without_writing() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("empty.pdf");
        let err = compile(&[], &out, &NoopProgressCallback).unwrap_err();
        assert!(matches!(err, ImgSeqError::EmptyDocument { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn one_page_per_image_in_order() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("p_000001.png");
        let b = tmp.path().join("p_000002.jpg");
        let c = tmp.path().join("p_000003.png");
        write_png(&a, 100, 200);
        write_jpeg(&b, 300, 150);
        write_png(&c, 96, 96);
        let out = tmp.path().join("p.pdf");

        let compiled = compile(&[a, b, c], &out, &NoopProgressCallback).unwrap();
        assert_eq!(compiled.pages.len(), 3);
        assert_eq!(compiled.pages[1], PageSize::from_pixels(300, 150));

        let doc = Document::load(&out).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 3);

        let expected = [(100u32, 200u32), (300, 150), (96, 96)];
        for (n, (w_px, h_px)) in expected.iter().enumerate() {
            let (w, h) = PageSize::from_pixels(*w_px, *h_px).to_points();
            let mb = media_box(&doc, pages[&(n as u32 + 1)]);
            assert_eq!(mb[0], 0.0);
            assert_eq!(mb[1], 0.0);
            assert!((mb[2] as f64 - w).abs() < 0.01, "page {} width", n + 1);
            assert!((mb[3] as f64 - h).abs() < 0.01, "page {} height", n + 1);
        }
    }

    #[test]
    fn decode_error_aborts_and_names_path() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("p_000001.png");
        let bad = tmp.path().join("p_000002.png");
        write_png(&good, 10, 10);
        std::fs::write(&bad, b"definitely not an image").unwrap();
        let out = tmp.path().join("p.pdf");

        let err = compile(&[good, bad.clone()], &out, &NoopProgressCallback).unwrap_err();
        match err {
            ImgSeqError::Decode { path, .. } => assert_eq!(path, bad),
            other => panic!("expected Decode, got {other}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn reports_each_page() {
        struct Pages(AtomicUsize);
        impl ProgressCallback for Pages {
            fn on_page_added(&self, page_num: usize, total_pages: usize) {
                assert!(page_num <= total_pages);
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.png");
        let b = tmp.path().join("b.png");
        write_png(&a, 4, 4);
        write_png(&b, 4, 4);
        let cb = Pages(AtomicUsize::new(0));

        compile(&[a, b], &tmp.path().join("x.pdf"), &cb).unwrap();
        assert_eq!(cb.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unwritable_output_is_pdf_write_error() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.png");
        write_png(&a, 4, 4);
        let out = tmp.path().join("missing-dir").join("x.pdf");

        let err = compile(&[a], &out, &NoopProgressCallback).unwrap_err();
        assert!(matches!(err, ImgSeqError::PdfWrite { .. }));
    }
}

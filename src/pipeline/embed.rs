//! Image embedding: saved file → PDF image XObject stream(s).
//!
//! The format is sniffed from the header bytes, never from the extension,
//! because servers happily serve PNGs under `.jpg` names.
//!
//! - Gray and RGB JPEGs are copied into the PDF untouched (`DCTDecode`).
//! - Everything else (PNG, CMYK JPEG) is decoded to 8-bit samples and stored
//!   losslessly with `FlateDecode`; an alpha channel becomes a soft mask.

use crate::error::ImgSeqError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, ImageFormat, ImageReader};
use lopdf::{Dictionary, Object, Stream};
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::debug;

/// A decoded-enough image, ready to be added to a `lopdf::Document`.
#[derive(Debug)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    /// The image XObject itself.
    pub stream: Stream,
    /// Soft mask to be referenced from the image's `SMask` entry.
    pub smask: Option<Stream>,
}

/// Load the image at `path` and build its XObject stream(s).
pub fn load_image(path: &Path) -> Result<EmbeddedImage, ImgSeqError> {
    let bytes = std::fs::read(path).map_err(|e| decode_err(path, e))?;
    let format = image::guess_format(&bytes).map_err(|e| decode_err(path, e))?;

    let (width, height) = ImageReader::with_format(Cursor::new(&bytes), format)
        .into_dimensions()
        .map_err(|e| decode_err(path, e))?;

    if format == ImageFormat::Jpeg {
        match jpeg_components(&bytes) {
            Some(components @ (1 | 3)) => {
                debug!("{}: JPEG passthrough ({} component(s))", path.display(), components);
                let color_space = if components == 1 { "DeviceGray" } else { "DeviceRGB" };
                let dict = image_dict(width, height, color_space, "DCTDecode");
                return Ok(EmbeddedImage {
                    width,
                    height,
                    stream: Stream::new(dict, bytes).with_compression(false),
                    smask: None,
                });
            }
            other => debug!("{}: JPEG with {:?} components, re-encoding", path.display(), other),
        }
    }

    let img = image::load_from_memory_with_format(&bytes, format)
        .map_err(|e| decode_err(path, e))?;
    flate_image(&img).map_err(|e| decode_err(path, e))
}

fn decode_err(path: &Path, e: impl std::fmt::Display) -> ImgSeqError {
    ImgSeqError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

fn image_dict(width: u32, height: u32, color_space: &str, filter: &str) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", Object::Name(color_space.as_bytes().to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    dict
}

/// Decode to 8-bit gray or RGB samples, splitting off alpha.
fn flate_image(img: &DynamicImage) -> std::io::Result<EmbeddedImage> {
    let (width, height) = (img.width(), img.height());
    let color = img.color();
    let pixel_count = (width as usize) * (height as usize);

    let (color_space, samples, alpha) = match (color.has_color(), color.has_alpha()) {
        (false, false) => ("DeviceGray", img.to_luma8().into_raw(), None),
        (false, true) => {
            let raw = img.to_luma_alpha8().into_raw();
            let mut gray = Vec::with_capacity(pixel_count);
            let mut alpha = Vec::with_capacity(pixel_count);
            for px in raw.chunks_exact(2) {
                gray.push(px[0]);
                alpha.push(px[1]);
            }
            ("DeviceGray", gray, Some(alpha))
        }
        (true, false) => ("DeviceRGB", img.to_rgb8().into_raw(), None),
        (true, true) => {
            let raw = img.to_rgba8().into_raw();
            let mut rgb = Vec::with_capacity(pixel_count * 3);
            let mut alpha = Vec::with_capacity(pixel_count);
            for px in raw.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
            ("DeviceRGB", rgb, Some(alpha))
        }
    };

    let stream = Stream::new(
        image_dict(width, height, color_space, "FlateDecode"),
        deflate(&samples)?,
    )
    .with_compression(false);

    // Fully opaque alpha carries no information.
    let smask = match alpha {
        Some(a) if a.iter().any(|&v| v != u8::MAX) => Some(
            Stream::new(
                image_dict(width, height, "DeviceGray", "FlateDecode"),
                deflate(&a)?,
            )
            .with_compression(false),
        ),
        _ => None,
    };

    Ok(EmbeddedImage {
        width,
        height,
        stream,
        smask,
    })
}

fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Component count from the first SOF0–SOF3 segment, if any.
fn jpeg_components(data: &[u8]) -> Option<u8> {
    let len = data.len();
    let mut i = 0;
    while i + 1 < len {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        if (0xC0..=0xC3).contains(&marker) {
            return data.get(i + 9).copied();
        }
        if marker == 0xFF || marker == 0x00 {
            i += 1;
            continue;
        }
        // SOI, EOI and RSTn carry no length.
        if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
            i += 2;
            continue;
        }
        if i + 3 >= len {
            break;
        }
        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        i += 2 + seg_len;
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    pub(crate) fn write_png(path: &Path, w: u32, h: u32) {
        RgbImage::from_pixel(w, h, Rgb([200, 40, 40]))
            .save_with_format(path, ImageFormat::Png)
            .unwrap();
    }

    pub(crate) fn write_jpeg(path: &Path, w: u32, h: u32) {
        RgbImage::from_pixel(w, h, Rgb([10, 120, 220]))
            .save_with_format(path, ImageFormat::Jpeg)
            .unwrap();
    }

    fn name(dict: &Dictionary, key: &[u8]) -> Vec<u8> {
        dict.get(key).unwrap().as_name().unwrap().to_vec()
    }

    #[test]
    fn jpeg_is_embedded_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a_000001.jpg");
        write_jpeg(&path, 30, 20);

        let img = load_image(&path).unwrap();
        assert_eq!((img.width, img.height), (30, 20));
        assert_eq!(name(&img.stream.dict, b"Filter"), b"DCTDecode");
        assert_eq!(name(&img.stream.dict, b"ColorSpace"), b"DeviceRGB");
        assert_eq!(img.stream.content, std::fs::read(&path).unwrap());
        assert!(img.smask.is_none());
    }

    #[test]
    fn format_comes_from_header_not_extension() {
        let tmp = TempDir::new().unwrap();
        // PNG bytes under a .jpg name.
        let path = tmp.path().join("a_000001.jpg");
        write_png(&path, 8, 6);

        let img = load_image(&path).unwrap();
        assert_eq!(name(&img.stream.dict, b"Filter"), b"FlateDecode");
        assert_eq!((img.width, img.height), (8, 6));
    }

    #[test]
    fn gray_png_uses_device_gray() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("g.png");
        GrayImage::from_pixel(4, 4, Luma([128])).save(&path).unwrap();

        let img = load_image(&path).unwrap();
        assert_eq!(name(&img.stream.dict, b"ColorSpace"), b"DeviceGray");
    }

    #[test]
    fn translucent_png_gets_soft_mask() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.png");
        RgbaImage::from_pixel(5, 5, Rgba([0, 255, 0, 100])).save(&path).unwrap();

        let img = load_image(&path).unwrap();
        let smask = img.smask.expect("soft mask");
        assert_eq!(name(&smask.dict, b"ColorSpace"), b"DeviceGray");
    }

    #[test]
    fn opaque_alpha_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("o.png");
        RgbaImage::from_pixel(5, 5, Rgba([0, 255, 0, 255])).save(&path).unwrap();

        assert!(load_image(&path).unwrap().smask.is_none());
    }

    #[test]
    fn garbage_is_decode_error_naming_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad_000002.png");
        std::fs::write(&path, b"<html>not found</html>").unwrap();

        match load_image(&path).unwrap_err() {
            ImgSeqError::Decode { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected Decode, got {other}"),
        }
    }

    #[test]
    fn missing_file_is_decode_error() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ImgSeqError::Decode { .. }));
    }

    #[test]
    fn jpeg_components_reads_sof() {
        // SOI, then a minimal SOF0 segment declaring 3 components.
        let data = [
            0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x10, 0x00, 0x20, 0x03,
        ];
        assert_eq!(jpeg_components(&data), Some(3));
        assert_eq!(jpeg_components(&[0xFF, 0xD8, 0xFF, 0xD9]), None);
    }
}

//! Raster image to single-page PDF conversion.
//!
//! The image is decoded, flattened to RGB (alpha is discarded) and embedded
//! as one DeviceRGB image XObject on a page sized to the image at 72 dpi.

use ::image::ImageReader;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use std::path::Path;

use crate::error::{FolderCatError, Result};
use crate::io::PdfWriter;

/// Build a one-page PDF document showing `rgb`.
///
/// # Errors
///
/// Returns an error if the page content stream cannot be encoded.
pub fn image_to_pdf(rgb: &::image::RgbImage) -> Result<Document> {
    let (width, height) = rgb.dimensions();
    let (w, h) = (i64::from(width), i64::from(height));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w,
            "Height" => h,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        rgb.as_raw().clone(),
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), w.into(), h.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    Ok(doc)
}

/// Convert the image at `src` into a single-page PDF at `dest`.
///
/// # Errors
///
/// Returns [`FolderCatError::ImageConversion`] if the image cannot be
/// decoded or the PDF cannot be written.
pub fn convert_image(src: &Path, dest: &Path) -> Result<()> {
    let fail = |reason: String| FolderCatError::image_conversion(src.to_path_buf(), reason);

    // Format comes from the file content, not its extension.
    let decoded = ImageReader::open(src)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|e| fail(e.to_string()))?
        .decode()
        .map_err(|e| fail(e.to_string()))?;
    let rgb = decoded.to_rgb8();

    tracing::debug!(
        src = %src.display(),
        width = rgb.width(),
        height = rgb.height(),
        "encoding image as PDF"
    );

    let mut doc = image_to_pdf(&rgb).map_err(|e| fail(e.reason()))?;
    PdfWriter::non_atomic()
        .write(&mut doc, dest)
        .map_err(|e| fail(e.to_string()))?;

    Ok(())
}

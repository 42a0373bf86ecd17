//! Assembling phase: one raster image on one A4 portrait page.
//!
//! The image is scaled to the page width, keeping its aspect ratio exactly, and
//! placed with its top edge at the top of the page. Images taller than the page
//! are not split; the part below the media box is clipped by viewers.

use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};

use crate::export::raster::RasterImage;
use crate::export::ExportError;

pub const A4_WIDTH_MM: f32 = 210.0;
pub const A4_HEIGHT_MM: f32 = 297.0;

const PT_PER_MM: f32 = 72.0 / 25.4;
const IMAGE_NAME: Name<'static> = Name(b"Im1");

/// Height of the embedded image when scaled to `page_width`, in the same unit.
pub fn scaled_height(page_width: f32, image_width: u32, image_height: u32) -> f32 {
    page_width * (image_height as f32 / image_width as f32)
}

/// Placement of the image on the page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Placement {
    pub fn for_image(image: &RasterImage) -> Self {
        Self {
            width_mm: A4_WIDTH_MM,
            height_mm: scaled_height(A4_WIDTH_MM, image.width, image.height),
        }
    }

    /// True when the scaled image runs past the bottom of the page.
    pub fn overflows(&self) -> bool {
        self.height_mm > A4_HEIGHT_MM
    }
}

/// Writes the PDF. `title` goes into the document info dictionary.
pub fn assemble(image: &RasterImage, title: &str) -> Result<(Vec<u8>, Placement), ExportError> {
    if image.width == 0 || image.height == 0 {
        return Err(ExportError::Assemble("image has no pixels".to_string()));
    }
    let expected = image.width as usize * image.height as usize * 3;
    if image.rgb.len() != expected {
        return Err(ExportError::Assemble(format!(
            "pixel buffer is {} bytes, expected {expected}",
            image.rgb.len()
        )));
    }

    let placement = Placement::for_image(image);
    let page_w = A4_WIDTH_MM * PT_PER_MM;
    let page_h = A4_HEIGHT_MM * PT_PER_MM;
    let img_w = placement.width_mm * PT_PER_MM;
    let img_h = placement.height_mm * PT_PER_MM;

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);
    let info_id = Ref::new(6);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, page_w, page_h));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(IMAGE_NAME, image_id);
    page.finish();

    let compressed = compress_to_vec_zlib(&image.rgb, 6);
    let mut xobject = pdf.image_xobject(image_id, &compressed);
    xobject.filter(Filter::FlateDecode);
    xobject.width(image.width as i32);
    xobject.height(image.height as i32);
    xobject.color_space().device_rgb();
    xobject.bits_per_component(8);
    xobject.finish();

    // PDF origin is bottom-left; anchor the image's top edge to the page top.
    let mut content = Content::new();
    content.save_state();
    content.transform([img_w, 0.0, 0.0, img_h, 0.0, page_h - img_h]);
    content.x_object(IMAGE_NAME);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(concat!("folio ", env!("CARGO_PKG_VERSION"))));

    Ok((pdf.finish(), placement))
}

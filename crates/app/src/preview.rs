//! Local image preview. Reading and decoding run in a worker, the UI thread
//! only uploads the finished texture.

use anyhow::{Context, Result};
use shared::submission::ImageAttachment;
use std::path::Path;

/// A decoded preview ready to be handed to the UI thread
pub struct PreviewImage {
    pub data_uri: String,
    pub image: egui::ColorImage,
}

pub fn decode_image(bytes: &[u8]) -> Result<egui::ColorImage> {
    let image = image::load_from_memory(bytes)?;
    let rgba = image.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

/// Read the attached file from disk and decode it
pub fn load_preview(path: &Path) -> Result<PreviewImage> {
    let attachment = ImageAttachment::from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let image = decode_image(&attachment.bytes)
        .with_context(|| format!("decoding {}", attachment.file_name))?;
    Ok(PreviewImage {
        data_uri: attachment.to_data_uri(),
        image,
    })
}

pub fn load_preview_texture(ctx: &egui::Context, image: egui::ColorImage) -> egui::TextureHandle {
    ctx.load_texture("original_image", image, egui::TextureOptions::LINEAR)
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;

    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
        .unwrap();
    png
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_png_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        std::fs::write(&path, sample_png(3, 2)).unwrap();

        let preview = load_preview(&path).unwrap();
        assert_eq!(preview.image.size, [3, 2]);
        assert!(preview.data_uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_garbage_preview_fails() {
        assert!(decode_image(b"AAAA").is_err());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        let err = load_preview(&missing).err().unwrap();
        assert!(format!("{:#}", err).contains("missing.png"));
    }
}

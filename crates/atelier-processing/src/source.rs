//! Source decoding and metadata extraction.

use atelier_core::models::ImageMetadata;
use atelier_core::AppError;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// A source image decoded exactly once.
///
/// The decoded pixels are reused for every derived variant, so an ingestion
/// never re-reads or re-decodes the uploaded bytes.
pub struct DecodedSource {
    pub image: DynamicImage,
    pub format: String,
    pub width: i32,
    pub height: i32,
    pub byte_size: i64,
    pub color_space: Option<String>,
}

impl DecodedSource {
    /// Decode source bytes. Fails with `InvalidSource` when the bytes are
    /// not a decodable image.
    pub fn from_bytes(data: &[u8]) -> Result<Self, AppError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| AppError::InvalidSource(format!("Could not read image bytes: {}", e)))?;

        let format = reader.format().map(format_name).unwrap_or("unknown");

        let image = reader
            .decode()
            .map_err(|e| AppError::InvalidSource(format!("Could not decode image: {}", e)))?;

        let width = image.width() as i32;
        let height = image.height() as i32;
        let color_space = color_space_name(image.color());

        Ok(Self {
            image,
            format: format.to_string(),
            width,
            height,
            byte_size: data.len() as i64,
            color_space,
        })
    }

    /// Decode on the blocking pool; image decode is CPU-bound.
    pub async fn decode(data: Vec<u8>) -> Result<Self, AppError> {
        tokio::task::spawn_blocking(move || Self::from_bytes(&data))
            .await
            .map_err(|e| AppError::Internal(format!("Image decode task failed: {}", e)))?
    }

    /// Catalog metadata for this source.
    pub fn metadata(&self) -> ImageMetadata {
        ImageMetadata {
            width: self.width,
            height: self.height,
            format: self.format.clone(),
            size: self.byte_size,
            color_space: self.color_space.clone(),
        }
    }
}

fn format_name(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpeg",
        ImageFormat::Png => "png",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        _ => "unknown",
    }
}

fn color_space_name(color: ColorType) -> Option<String> {
    match color {
        ColorType::L8 | ColorType::L16 | ColorType::La8 | ColorType::La16 => {
            Some("gray".to_string())
        }
        ColorType::Rgb8
        | ColorType::Rgba8
        | ColorType::Rgb16
        | ColorType::Rgba16
        | ColorType::Rgb32F
        | ColorType::Rgba32F => Some("srgb".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_decode_extracts_metadata() {
        let data = png_bytes(120, 80);
        let source = DecodedSource::from_bytes(&data).unwrap();

        assert_eq!(source.width, 120);
        assert_eq!(source.height, 80);
        assert_eq!(source.format, "png");
        assert_eq!(source.byte_size, data.len() as i64);

        let meta = source.metadata();
        assert_eq!(meta.width, 120);
        assert_eq!(meta.height, 80);
        assert_eq!(meta.format, "png");
        assert_eq!(meta.size, data.len() as i64);
        assert_eq!(meta.color_space.as_deref(), Some("srgb"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = DecodedSource::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(AppError::InvalidSource(_))));
    }

    #[tokio::test]
    async fn test_async_decode() {
        let data = png_bytes(10, 10);
        let source = DecodedSource::decode(data).await.unwrap();
        assert_eq!(source.width, 10);
    }
}

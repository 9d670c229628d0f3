//! Variant generation: resize to a spec's bounding box and encode.

use atelier_core::AppError;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::sync::Arc;

use crate::planner::{fit_within, OutputFormat, VariantSpec, JPEG_QUALITY, WEBP_QUALITY};

/// One realized variant: encoded bytes plus the dimensions actually produced.
#[derive(Debug, Clone)]
pub struct GeneratedVariant {
    pub spec: VariantSpec,
    pub data: Bytes,
    pub width: i32,
    pub height: i32,
    pub byte_size: i64,
}

/// Realizes variant specs against a decoded source image.
pub struct VariantGenerator;

impl VariantGenerator {
    /// Resize and encode on the blocking pool; both steps are CPU-bound.
    pub async fn generate(
        source: Arc<DynamicImage>,
        spec: VariantSpec,
    ) -> Result<GeneratedVariant, AppError> {
        tokio::task::spawn_blocking(move || Self::generate_sync(&source, &spec))
            .await
            .map_err(|e| AppError::Internal(format!("Variant encode task failed: {}", e)))?
    }

    pub fn generate_sync(
        source: &DynamicImage,
        spec: &VariantSpec,
    ) -> Result<GeneratedVariant, AppError> {
        let (source_width, source_height) = source.dimensions();
        let (width, height) =
            fit_within(source_width, source_height, spec.max_width, spec.max_height);

        let resized = if (width, height) == (source_width, source_height) {
            source.clone()
        } else {
            source.resize_exact(width, height, FilterType::Lanczos3)
        };

        let data = match spec.format {
            OutputFormat::Jpeg => encode_jpeg(&resized, spec)?,
            OutputFormat::Webp => encode_webp(&resized, spec)?,
        };

        tracing::debug!(
            variant = %spec.label(),
            width = width,
            height = height,
            bytes = data.len(),
            "Encoded variant"
        );

        Ok(GeneratedVariant {
            spec: *spec,
            byte_size: data.len() as i64,
            data,
            width: width as i32,
            height: height as i32,
        })
    }
}

/// Progressive JPEG with optimized coding via mozjpeg.
fn encode_jpeg(img: &DynamicImage, spec: &VariantSpec) -> Result<Bytes, AppError> {
    let rgb_img = img.to_rgb8();
    let (width, height) = rgb_img.dimensions();

    let mut comp = mozjpeg::Compress::new(mozjpeg::ColorSpace::JCS_RGB);
    comp.set_size(width as usize, height as usize);
    comp.set_quality(JPEG_QUALITY);
    comp.set_progressive_mode();
    comp.set_optimize_coding(true);

    let mut comp = comp
        .start_compress(Vec::new())
        .map_err(|e| encode_error(spec, e))?;
    comp.write_scanlines(&rgb_img)
        .map_err(|e| encode_error(spec, e))?;
    let jpeg_data = comp.finish().map_err(|e| encode_error(spec, e))?;

    Ok(Bytes::from(jpeg_data))
}

fn encode_webp(img: &DynamicImage, _spec: &VariantSpec) -> Result<Bytes, AppError> {
    let rgba_img = img.to_rgba8();
    let (width, height) = rgba_img.dimensions();

    let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
    let webp_data = encoder.encode(WEBP_QUALITY);

    Ok(Bytes::copy_from_slice(&webp_data))
}

fn encode_error(spec: &VariantSpec, reason: impl ToString) -> AppError {
    AppError::Encode {
        variant: spec.label(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::models::VariantType;
    use image::{Rgba, RgbaImage};

    fn source_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([40, 120, 200, 255]),
        ))
    }

    fn spec(
        size: VariantType,
        format: OutputFormat,
        max_width: u32,
        max_height: u32,
    ) -> VariantSpec {
        VariantSpec {
            size,
            format,
            max_width,
            max_height,
        }
    }

    #[test]
    fn test_generate_downscales_to_box() {
        let img = source_image(600, 300);
        let spec = spec(VariantType::Thumbnail, OutputFormat::Jpeg, 150, 150);

        let variant = VariantGenerator::generate_sync(&img, &spec).unwrap();
        assert_eq!(variant.width, 150);
        assert_eq!(variant.height, 75);
        assert!(!variant.data.is_empty());
        assert_eq!(variant.byte_size, variant.data.len() as i64);
        // JPEG SOI marker.
        assert_eq!(&variant.data[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_generate_keeps_small_source_dimensions() {
        let img = source_image(100, 60);
        let spec = spec(VariantType::Large, OutputFormat::Jpeg, 1024, 768);

        let variant = VariantGenerator::generate_sync(&img, &spec).unwrap();
        assert_eq!(variant.width, 100);
        assert_eq!(variant.height, 60);
    }

    #[test]
    fn test_generate_webp_output() {
        let img = source_image(400, 400);
        let spec = spec(VariantType::Small, OutputFormat::Webp, 320, 240);

        let variant = VariantGenerator::generate_sync(&img, &spec).unwrap();
        assert_eq!(variant.width, 240);
        assert_eq!(variant.height, 240);
        // RIFF....WEBP container header.
        assert_eq!(&variant.data[..4], b"RIFF");
        assert_eq!(&variant.data[8..12], b"WEBP");
    }

    #[tokio::test]
    async fn test_async_generate() {
        let img = Arc::new(source_image(300, 200));
        let spec = spec(VariantType::Thumbnail, OutputFormat::Webp, 150, 150);

        let variant = VariantGenerator::generate(img, spec).await.unwrap();
        assert_eq!(variant.width, 150);
        assert_eq!(variant.height, 100);
    }
}

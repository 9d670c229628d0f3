//! The fixed derived-variant plan.

use atelier_core::models::VariantType;

/// JPEG encode quality for every derived variant.
pub const JPEG_QUALITY: f32 = 85.0;
/// WebP encode quality for every derived variant.
pub const WEBP_QUALITY: f32 = 85.0;

/// Encoded output format for a derived variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Webp => "image/webp",
        }
    }

    /// File name of the encoded object inside its size directory.
    pub fn filename(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image.jpg",
            OutputFormat::Webp => "image.webp",
        }
    }
}

/// One planned derived variant: a size slot plus an output format.
///
/// The storage key always uses the size slot's directory; `row_type` decides
/// how the catalog row is typed (WebP outputs share a single row type).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSpec {
    pub size: VariantType,
    pub format: OutputFormat,
    pub max_width: u32,
    pub max_height: u32,
}

impl VariantSpec {
    /// Variant type recorded on the catalog row.
    pub fn row_type(&self) -> VariantType {
        match self.format {
            OutputFormat::Jpeg => self.size,
            OutputFormat::Webp => VariantType::Webp,
        }
    }

    /// Stable identity used in logs and encode errors, e.g. `thumbnail-webp`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.size.as_str(), self.format.as_str())
    }
}

/// Size slots and their bounding boxes, ordered smallest to largest.
const SIZE_SLOTS: [(VariantType, u32, u32); 5] = [
    (VariantType::Thumbnail, 150, 150),
    (VariantType::Small, 320, 240),
    (VariantType::Medium, 640, 480),
    (VariantType::Large, 1024, 768),
    (VariantType::Full, 1920, 1440),
];

/// Produces the derived-variant plan for an ingestion.
pub struct VariantPlanner;

impl VariantPlanner {
    /// The full plan: every size slot in both formats, JPEG before WebP
    /// within a slot. The plan does not depend on the source image; sources
    /// smaller than a bounding box keep their dimensions at generation time.
    pub fn plan() -> Vec<VariantSpec> {
        let mut specs = Vec::with_capacity(SIZE_SLOTS.len() * 2);
        for (size, max_width, max_height) in SIZE_SLOTS {
            for format in [OutputFormat::Jpeg, OutputFormat::Webp] {
                specs.push(VariantSpec {
                    size,
                    format,
                    max_width,
                    max_height,
                });
            }
        }
        specs
    }
}

/// Largest dimensions that fit `(max_width, max_height)` while preserving
/// aspect ratio. Never upscales: a source already inside the box keeps its
/// dimensions.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let width_ratio = max_width as f64 / width as f64;
    let height_ratio = max_height as f64 / height as f64;
    let ratio = width_ratio.min(height_ratio);

    let fitted_width = ((width as f64 * ratio).round() as u32).max(1);
    let fitted_height = ((height as f64 * ratio).round() as u32).max(1);
    (fitted_width, fitted_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_is_ten_specs_in_order() {
        let plan = VariantPlanner::plan();
        assert_eq!(plan.len(), 10);

        let expected = [
            (VariantType::Thumbnail, OutputFormat::Jpeg),
            (VariantType::Thumbnail, OutputFormat::Webp),
            (VariantType::Small, OutputFormat::Jpeg),
            (VariantType::Small, OutputFormat::Webp),
            (VariantType::Medium, OutputFormat::Jpeg),
            (VariantType::Medium, OutputFormat::Webp),
            (VariantType::Large, OutputFormat::Jpeg),
            (VariantType::Large, OutputFormat::Webp),
            (VariantType::Full, OutputFormat::Jpeg),
            (VariantType::Full, OutputFormat::Webp),
        ];
        for (spec, (size, format)) in plan.iter().zip(expected) {
            assert_eq!(spec.size, size);
            assert_eq!(spec.format, format);
        }
    }

    #[test]
    fn test_row_type_folds_webp() {
        let plan = VariantPlanner::plan();
        let thumb_jpeg = &plan[0];
        let thumb_webp = &plan[1];

        assert_eq!(thumb_jpeg.row_type(), VariantType::Thumbnail);
        assert_eq!(thumb_webp.row_type(), VariantType::Webp);
        // Both specs still key under the same size directory.
        assert_eq!(thumb_webp.size, VariantType::Thumbnail);
    }

    #[test]
    fn test_fit_within_preserves_aspect_ratio() {
        assert_eq!(fit_within(2000, 1000, 150, 150), (150, 75));
        assert_eq!(fit_within(1000, 2000, 150, 150), (75, 150));
        assert_eq!(fit_within(640, 480, 320, 240), (320, 240));
        assert_eq!(fit_within(4000, 2000, 1024, 768), (1024, 512));
    }

    #[test]
    fn test_fit_within_never_upscales() {
        assert_eq!(fit_within(100, 50, 320, 240), (100, 50));
        assert_eq!(fit_within(150, 150, 150, 150), (150, 150));
    }

    #[test]
    fn test_fit_within_extreme_ratio_clamps_to_one() {
        assert_eq!(fit_within(10_000, 2, 150, 150), (150, 1));
    }

    #[test]
    fn test_label_and_format_names() {
        let spec = VariantSpec {
            size: VariantType::Medium,
            format: OutputFormat::Webp,
            max_width: 640,
            max_height: 480,
        };
        assert_eq!(spec.label(), "medium-webp");
        assert_eq!(spec.format.content_type(), "image/webp");
        assert_eq!(spec.format.filename(), "image.webp");
    }
}

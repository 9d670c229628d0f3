pub mod image;

pub use image::{
    Image, ImageCategory, ImageMetadata, ImageResponse, ImageStatus, ImageVariant, VariantType,
};

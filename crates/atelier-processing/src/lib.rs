//! Image decoding, variant planning, and variant encoding.
//!
//! The pipeline is split into three stages: `source` decodes bytes once into
//! a reusable in-memory image, `planner` produces the fixed derived-variant
//! plan, and `generator` realizes one spec into an
//! encoded buffer. All CPU-bound work runs under `spawn_blocking` behind the
//! async entry points.

pub mod generator;
pub mod planner;
pub mod source;

pub use generator::{GeneratedVariant, VariantGenerator};
pub use planner::{OutputFormat, VariantPlanner, VariantSpec, JPEG_QUALITY, WEBP_QUALITY};
pub use source::DecodedSource;

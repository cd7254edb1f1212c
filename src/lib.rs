//! Place-name normalization and variant generation for geocoding indexes
//!
//! ```text
//! let processor = NameProcessor::from_config(&VariantConfig::load(path)?)?;
//! let normalized = processor.get_normalized("Meier Weg");
//! let variants = processor.get_variants_ascii(&normalized);
//! ```

pub mod config;
pub mod error;
pub mod variants;

pub use config::{CompoundSuffixGroup, RuleMode, VariantConfig, VariantSection};
pub use error::ConfigurationError;
pub use variants::{NameProcessor, ProcessedName, VariantSet};

//! Core data types for quote resolution.
//!
//! - `asset` - Asset classification (AssetClass)
//! - `identifier` - Normalized identifier carried through a resolution
//! - `quote` - The canonical, provider-agnostic quote record

mod asset;
mod identifier;
mod quote;

pub use asset::AssetClass;
pub use identifier::NormalizedIdentifier;
pub use quote::{CanonicalQuote, QuoteExtras};

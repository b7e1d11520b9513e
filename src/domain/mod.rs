//! Domain layer: portfolio types, filtering, grouping and the detail overlay.

pub mod error;
pub mod filter;
pub mod grouping;
pub mod overlay;
pub mod types;

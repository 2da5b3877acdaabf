//! Static career catalog and RIASEC-code matching.

pub mod catalog;
pub mod matching;

pub use catalog::{CareerCatalog, CatalogEntry};
pub use matching::match_careers;

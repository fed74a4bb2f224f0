//! Star catalog, horizon-coordinate model and visibility scheduling.
//!
//! The pieces, leaf first: [`geometry`] holds the pure horizon-coordinate
//! formulas; [`Star`] wraps one catalog entry with a dependency-tracked cache
//! of derived angles; [`Sky`] owns the catalog and keeps the visible /
//! pending-rise partition current without rescanning everything each frame.

pub mod catalog;
pub mod geometry;
mod sky;
mod star;

pub use catalog::{load_catalog, CatalogEntry, CatalogError};
pub use sky::Sky;
pub use star::Star;

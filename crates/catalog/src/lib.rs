//! Catalog domain module: labs, categories and the components they stock.
//!
//! This crate contains the entity types and their creation-time validation,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod category;
pub mod component;
pub mod lab;

pub use category::Category;
pub use component::{Component, NewComponent, StockState};
pub use lab::Lab;

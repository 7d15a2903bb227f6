//! SQL layer: the embedded store and ready-made query builders.

pub mod builder;
pub mod store;

pub use store::SqlStore;

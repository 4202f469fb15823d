//! Share domain entities.

pub mod model;

pub use model::{CreateShareRecord, ShareRecord};

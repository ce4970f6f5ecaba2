//! Rendering of scan reports

pub mod json;
pub mod table;

pub use json::render_json;
pub use table::{render_skipped, render_table};

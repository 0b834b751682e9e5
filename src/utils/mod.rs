//! Module for additional helpers
pub mod math_utils;
pub mod test_helper;
pub mod uom_macros;
pub use math_utils::usize_to_f64;

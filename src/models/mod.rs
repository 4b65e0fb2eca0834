pub mod common;
pub mod embedding;
pub mod image;
pub mod text;

pub use common::*;
pub use embedding::*;
pub use image::*;
pub use text::*;

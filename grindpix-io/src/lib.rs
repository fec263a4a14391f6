//! grindpix-io: Image loading and result export for grindpix.
//!
//! Decodes image files into the 8-bit grayscale buffers the analysis
//! consumes, and writes results as JSON and particle tables as CSV.
//!

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::{decode_grayscale, load_grayscale, read_result_json};
pub use writer::{write_result_json, ResultWriter};

//! Image and result readers.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use grindpix_core::{AnalysisResult, GrayImage};
use image::DynamicImage;

use crate::Result;

/// Loads an image file as 8-bit grayscale.
///
/// Any format the `image` crate decodes is accepted. Color input is
/// reduced to luma; 16-bit input is scaled to 8 bits.
pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
    let path = path.as_ref();
    let decoded = image::open(path)?;
    log::debug!(
        "decoded {} ({}x{}, {:?})",
        path.display(),
        decoded.width(),
        decoded.height(),
        decoded.color()
    );
    into_gray(decoded)
}

/// Decodes an in-memory encoded image as 8-bit grayscale.
pub fn decode_grayscale(bytes: &[u8]) -> Result<GrayImage> {
    into_gray(image::load_from_memory(bytes)?)
}

fn into_gray(decoded: DynamicImage) -> Result<GrayImage> {
    let luma = decoded.into_luma8();
    let (width, height) = luma.dimensions();
    Ok(GrayImage::new(width, height, luma.into_raw())?)
}

/// Reads a result previously written with [`crate::write_result_json`].
pub fn read_result_json<P: AsRef<Path>>(path: P) -> Result<AnalysisResult> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

use std::time::Duration;

use grindpix_core::{AnalysisResult, CategoryShare, SizeCategory};
use grindpix_io::{decode_grayscale, read_result_json, write_result_json, Error};
use tempfile::tempdir;

#[test]
fn test_result_json_survives_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("result.json");
    let result = AnalysisResult {
        particle_count: 4,
        size_distribution: vec![CategoryShare {
            category: SizeCategory::Medium,
            count: 4,
            percentage: 100.0,
        }],
        average_size: 712.5,
        confidence: 12.0,
        microns_per_pixel: 18.0,
        processing_duration: Duration::from_micros(1500),
        ..Default::default()
    };

    write_result_json(&path, &result).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"particle_count\": 4"));
    assert_eq!(read_result_json(&path).unwrap(), result);
}

#[test]
fn test_truncated_json_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"particle_count\": ").unwrap();
    assert!(matches!(read_result_json(&path), Err(Error::Json(_))));
}

#[test]
fn test_decode_encoded_png() {
    let mut bytes = Vec::new();
    let img = image::GrayImage::from_pixel(5, 2, image::Luma([77u8]));
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    let gray = decode_grayscale(&bytes).unwrap();
    assert_eq!((gray.width(), gray.height()), (5, 2));
    assert!(gray.as_raw().iter().all(|&v| v == 77));
}

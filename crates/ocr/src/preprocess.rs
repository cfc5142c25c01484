//! The two renderings of a receipt photo that get OCR'd: a binarized one and
//! an unmodified one.

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use recibo_core::PreprocessConfig;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Grayscale + adaptive threshold, returned as PNG bytes.
pub fn binarize_for_ocr(data: &[u8], opts: &PreprocessConfig) -> Result<Vec<u8>, PreprocessError> {
    let img = fit_within(image::load_from_memory(data)?, opts.max_dimension);
    let bw = adaptive_threshold(&img.to_luma8(), opts.block_size, opts.offset);
    encode_as_png(DynamicImage::ImageLuma8(bw))
}

/// The photo as-is (RGB), returned as PNG bytes.
pub fn prepare_raw_for_ocr(data: &[u8], max_dimension: u32) -> Result<Vec<u8>, PreprocessError> {
    let img = fit_within(image::load_from_memory(data)?, max_dimension);
    encode_as_png(DynamicImage::ImageRgb8(img.to_rgb8()))
}

// Tesseract works best around 300 DPI; very large photos only slow it down.
fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, image::imageops::FilterType::Lanczos3)
    } else {
        img
    }
}

/// Local-mean threshold: a pixel turns white when it is brighter than the mean
/// of its `block_size`² neighbourhood minus `offset`, black otherwise.
pub fn adaptive_threshold(gray: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }
    let radius = (block_size.max(1) | 1) / 2;

    // Summed-area table with a zero row and column in front.
    let stride = w as usize + 1;
    let mut integral = vec![0u64; stride * (h as usize + 1)];
    for y in 0..h as usize {
        let mut row_sum = 0u64;
        for x in 0..w as usize {
            row_sum += u64::from(gray.get_pixel(x as u32, y as u32)[0]);
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    ImageBuffer::from_fn(w, h, |x, y| {
        let x0 = x.saturating_sub(radius) as usize;
        let y0 = y.saturating_sub(radius) as usize;
        let x1 = (x + radius).min(w - 1) as usize + 1;
        let y1 = (y + radius).min(h - 1) as usize + 1;
        let area = ((x1 - x0) * (y1 - y0)) as i64;
        let sum = (integral[y1 * stride + x1] + integral[y0 * stride + x0]) as i64
            - (integral[y0 * stride + x1] + integral[y1 * stride + x0]) as i64;
        let mean = sum / area;
        let p = i64::from(gray.get_pixel(x, y)[0]);
        Luma([if p > mean - i64::from(offset) { 255 } else { 0 }])
    })
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

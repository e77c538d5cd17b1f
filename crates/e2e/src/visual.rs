//! Pixel-level comparison of two screenshots

use std::io::Cursor;
use std::time::Instant;

use image::{ImageOutputFormat, Rgba, RgbaImage};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Colour of pixels that differ between the two images
pub const ERROR_COLOR: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// Largest per-channel difference still treated as equal (anti-aliasing, compression)
const CHANNEL_TOLERANCE: i32 = 16;

/// Alpha of the faded copy drawn for unchanged pixels
const UNCHANGED_ALPHA: u8 = 64;

/// Bounding box of all differing pixels, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiffBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl DiffBounds {
    fn point(x: u32, y: u32) -> Self {
        Self {
            left: x,
            top: y,
            right: x,
            bottom: y,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.left = self.left.min(x);
        self.top = self.top.min(y);
        self.right = self.right.max(x);
        self.bottom = self.bottom.max(y);
    }
}

/// Size change from the first image to the second
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DimensionDifference {
    pub width: i64,
    pub height: i64,
}

/// Metadata describing a comparison
#[derive(Debug, Clone, Serialize)]
pub struct ImageDiffSummary {
    /// Number of different pixels
    pub diff_pixels: u64,

    /// Pixels compared (the first image's area)
    pub total_pixels: u64,

    /// Percentage of pixels that differ
    pub mismatch_percent: f64,

    pub is_same_dimensions: bool,
    pub dimension_difference: DimensionDifference,

    /// `None` when no pixel differs
    pub diff_bounds: Option<DiffBounds>,

    pub analysis_time_ms: u64,

    /// SHA-256 of the encoded inputs
    pub first_hash: String,
    pub second_hash: String,
}

impl ImageDiffSummary {
    /// Same size and no differing pixels
    pub fn is_identical(&self) -> bool {
        self.diff_pixels == 0 && self.is_same_dimensions
    }
}

/// Result of a comparison: metadata plus the rendered difference image
#[derive(Debug, Clone)]
pub struct ImageDiff {
    pub summary: ImageDiffSummary,

    /// Difference image with the first image's dimensions
    pub image: RgbaImage,
}

impl ImageDiff {
    /// Encode the difference image as PNG
    pub fn to_png(&self) -> E2eResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.image.write_to(&mut buf, ImageOutputFormat::Png)?;
        Ok(buf.into_inner())
    }
}

/// Compare two encoded screenshots pixel by pixel.
///
/// Images are not resized or aligned. The first image defines the compared
/// area; pixels outside the second image count as different.
pub fn compare_images(first: &[u8], second: &[u8]) -> E2eResult<ImageDiff> {
    let start = Instant::now();

    let first_img = decode(first, "first")?;
    let second_img = decode(second, "second")?;

    let first_hash = hash_bytes(first);
    let second_hash = hash_bytes(second);
    let same_bytes = first_hash == second_hash;

    let (width, height) = first_img.dimensions();
    let (other_width, other_height) = second_img.dimensions();

    let mut diff_img = RgbaImage::new(width, height);
    let mut diff_pixels = 0u64;
    let mut diff_bounds: Option<DiffBounds> = None;

    for (x, y, pixel) in first_img.enumerate_pixels() {
        let differs = !same_bytes
            && (x >= other_width
                || y >= other_height
                || pixels_differ(pixel, second_img.get_pixel(x, y)));

        if differs {
            diff_pixels += 1;
            diff_img.put_pixel(x, y, ERROR_COLOR);
            diff_bounds = Some(match diff_bounds {
                Some(mut bounds) => {
                    bounds.include(x, y);
                    bounds
                }
                None => DiffBounds::point(x, y),
            });
        } else {
            diff_img.put_pixel(x, y, faded(pixel));
        }
    }

    let total_pixels = (width as u64) * (height as u64);
    let mismatch_percent = if total_pixels == 0 {
        0.0
    } else {
        (diff_pixels as f64 / total_pixels as f64) * 100.0
    };

    let summary = ImageDiffSummary {
        diff_pixels,
        total_pixels,
        mismatch_percent,
        is_same_dimensions: (width, height) == (other_width, other_height),
        dimension_difference: DimensionDifference {
            width: other_width as i64 - width as i64,
            height: other_height as i64 - height as i64,
        },
        diff_bounds,
        analysis_time_ms: start.elapsed().as_millis() as u64,
        first_hash,
        second_hash,
    };

    debug!(
        "Compared {}x{} against {}x{}: {} pixels differ ({:.2}%)",
        width, height, other_width, other_height, diff_pixels, mismatch_percent
    );

    Ok(ImageDiff {
        summary,
        image: diff_img,
    })
}

/// Run [`compare_images`] on the blocking pool
pub async fn compare_images_async(first: Vec<u8>, second: Vec<u8>) -> E2eResult<ImageDiff> {
    tokio::task::spawn_blocking(move || compare_images(&first, &second)).await?
}

fn decode(bytes: &[u8], which: &str) -> E2eResult<RgbaImage> {
    if bytes.is_empty() {
        return Err(E2eError::ImageDiff(format!("{} image buffer is empty", which)));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| E2eError::ImageDiff(format!("cannot decode {} image: {}", which, e)))?;
    Ok(img.to_rgba8())
}

/// Check if two pixels differ beyond the channel tolerance
fn pixels_differ(a: &Rgba<u8>, b: &Rgba<u8>) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .any(|(&x, &y)| (x as i32 - y as i32).abs() > CHANNEL_TOLERANCE)
}

/// Grayscale copy of an unchanged pixel, mostly transparent
fn faded(pixel: &Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, _] = pixel.0;
    let luma = (0.3 * r as f64 + 0.59 * g as f64 + 0.11 * b as f64).round() as u8;
    Rgba([luma, luma, luma, UNCHANGED_ALPHA])
}

fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

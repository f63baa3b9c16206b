//! Image enhancement for OCR accuracy.
//!
//! A deterministic, ordered pipeline: grayscale, deskew, tile-based
//! contrast equalization, denoise, then a global brightness/contrast
//! polish. Binarization is kept as a separate stage because the
//! non-binarized enhanced image doubles as the human-preview artifact.
//!
//! No step is allowed to fail a page: anything that goes wrong keeps the
//! best image produced so far and records the degradation.

use std::panic::{catch_unwind, AssertUnwindSafe};

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{adaptive_threshold, otsu_level, threshold, ThresholdType};
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::hough::{detect_lines, LineDetectionOptions};
use tracing::{debug, info, warn};

/// Deskew angles beyond this are treated as detection noise, not skew.
const MAX_SKEW_DEGREES: i32 = 10;

/// Adaptive thresholding's integral image can overflow on large buffers;
/// above this pixel count a global threshold is used instead.
const MAX_ADAPTIVE_THRESHOLD_PIXELS: u64 = 1_500_000;

#[derive(Debug, Clone)]
pub struct ImageQualityStats {
    pub average_brightness: f32,
    pub contrast_ratio: f32,
}

/// Result of an enhancement pass. `applied` lists the steps that ran;
/// `degraded` is set when any step had to be skipped.
#[derive(Debug)]
pub struct EnhanceOutcome {
    pub image: GrayImage,
    pub applied: Vec<String>,
    pub degraded: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageEnhancer;

impl ImageEnhancer {
    pub fn new() -> Self {
        Self
    }

    /// Run the enhancement pipeline. The input is not mutated.
    pub fn enhance(&self, img: &DynamicImage) -> EnhanceOutcome {
        let mut applied = Vec::new();
        let mut degraded = false;
        let mut reason: Option<String> = None;

        let mut gray = img.to_luma8();
        applied.push("grayscale".to_string());

        match self.estimate_skew(&gray) {
            Some(skew) => {
                debug!(skew, "correcting page skew");
                gray = rotate_about_center(
                    &gray,
                    (-skew).to_radians(),
                    Interpolation::Bilinear,
                    Luma([255u8]),
                );
                applied.push(format!("deskew ({skew:+.1} deg)"));
            }
            None => {
                debug!("no plausible skew detected, leaving orientation alone");
            }
        }

        gray = self.tile_equalize(&gray);
        applied.push("local contrast equalization".to_string());

        match self.denoise(&gray) {
            Ok(denoised) => {
                gray = denoised;
                applied.push("denoise".to_string());
            }
            Err(cause) => {
                warn!(%cause, "denoise skipped, keeping previous image");
                degraded = true;
                reason.get_or_insert(cause);
            }
        }

        let stats = self.analyze(&gray);
        gray = self.polish(&gray, &stats);
        applied.push("brightness/contrast polish".to_string());

        EnhanceOutcome {
            image: gray,
            applied,
            degraded,
            reason,
        }
    }

    /// Enhancement plus adaptive binarization, producing the strict
    /// black/white image handed to the OCR engine.
    pub fn preprocess_for_ocr(&self, img: &DynamicImage) -> EnhanceOutcome {
        let mut outcome = self.enhance(img);
        match self.binarize(&outcome.image) {
            Ok(binary) => {
                outcome.image = binary;
                outcome.applied.push("adaptive binarization".to_string());
            }
            Err(cause) => {
                warn!(%cause, "binarization failed, passing enhanced image to OCR");
                outcome.degraded = true;
                outcome.reason.get_or_insert(cause);
            }
        }
        outcome
    }

    /// Cap very large pages and upscale very small ones before OCR.
    /// Separate from `enhance` so previews keep the native geometry.
    pub fn smart_resize_for_ocr(&self, img: DynamicImage) -> DynamicImage {
        let (width, height) = (img.width(), img.height());
        let max_dim = width.max(height);
        let min_dim = width.min(height).max(1);

        let scale = if max_dim > 2048 {
            2048.0 / max_dim as f32
        } else if min_dim < 300 {
            600.0 / min_dim as f32
        } else {
            return img;
        };

        let new_w = ((width as f32 * scale) as u32).max(1);
        let new_h = ((height as f32 * scale) as u32).max(1);
        info!(width, height, new_w, new_h, "resizing page image for OCR");
        img.resize(new_w, new_h, image::imageops::FilterType::Lanczos3)
    }

    /// Estimate page skew from the orientation of detected text lines.
    /// Returns `None` when no lines are found, the page is already level,
    /// or the estimate is outside the plausible range.
    fn estimate_skew(&self, gray: &GrayImage) -> Option<f32> {
        let (w, h) = gray.dimensions();
        if w < 64 || h < 64 {
            return None;
        }

        let edges = canny(gray, 50.0, 100.0);
        let options = LineDetectionOptions {
            vote_threshold: (w.min(h) / 4).max(100),
            suppression_radius: 8,
        };
        let lines = detect_lines(&edges, options);

        // Text lines are near-horizontal; their polar normal sits near 90
        // degrees, so the offset from 90 is the skew.
        let mut offsets: Vec<i32> = lines
            .iter()
            .map(|line| line.angle_in_degrees as i32 - 90)
            .filter(|offset| offset.abs() <= MAX_SKEW_DEGREES)
            .collect();

        if offsets.is_empty() {
            return None;
        }
        offsets.sort_unstable();
        let median = offsets[offsets.len() / 2];
        (median != 0).then_some(median as f32)
    }

    /// Tile-based histogram equalization with bilinear blending between
    /// tile lookup tables, to flatten uneven scan lighting without the
    /// halo artifacts of a single global pass.
    fn tile_equalize(&self, img: &GrayImage) -> GrayImage {
        let (width, height) = img.dimensions();
        const TILES: u32 = 8;

        if width < TILES * 8 || height < TILES * 8 {
            return imageproc::contrast::equalize_histogram(img);
        }

        let tile_w = width.div_ceil(TILES);
        let tile_h = height.div_ceil(TILES);

        // Per-tile lookup tables from clipped histograms.
        let mut luts = vec![[0u8; 256]; (TILES * TILES) as usize];
        for ty in 0..TILES {
            for tx in 0..TILES {
                let x0 = tx * tile_w;
                let y0 = ty * tile_h;
                let x1 = (x0 + tile_w).min(width);
                let y1 = (y0 + tile_h).min(height);

                let mut histogram = [0u64; 256];
                let mut count = 0u64;
                for y in y0..y1 {
                    for x in x0..x1 {
                        histogram[img.get_pixel(x, y)[0] as usize] += 1;
                        count += 1;
                    }
                }
                if count == 0 {
                    continue;
                }

                // Clip and redistribute to limit noise amplification.
                let clip = (count / 64).max(4);
                let mut excess = 0u64;
                for bin in histogram.iter_mut() {
                    if *bin > clip {
                        excess += *bin - clip;
                        *bin = clip;
                    }
                }
                let bump = excess / 256;
                for bin in histogram.iter_mut() {
                    *bin += bump;
                }

                let mut cdf = 0u64;
                let lut = &mut luts[(ty * TILES + tx) as usize];
                for (value, bin) in histogram.iter().enumerate() {
                    cdf += bin;
                    lut[value] = ((cdf as f64 / count as f64) * 255.0).round() as u8;
                }
            }
        }

        // Bilinear interpolation between the four surrounding tile LUTs.
        let mut out = GrayImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels() {
            let value = pixel[0] as usize;

            let fx = (x as f32 / tile_w as f32 - 0.5).max(0.0);
            let fy = (y as f32 / tile_h as f32 - 0.5).max(0.0);
            let tx0 = (fx as u32).min(TILES - 1);
            let ty0 = (fy as u32).min(TILES - 1);
            let tx1 = (tx0 + 1).min(TILES - 1);
            let ty1 = (ty0 + 1).min(TILES - 1);
            let wx = fx - tx0 as f32;
            let wy = fy - ty0 as f32;

            let sample = |tx: u32, ty: u32| luts[(ty * TILES + tx) as usize][value] as f32;
            let top = sample(tx0, ty0) * (1.0 - wx) + sample(tx1, ty0) * wx;
            let bottom = sample(tx0, ty1) * (1.0 - wx) + sample(tx1, ty1) * wx;
            let blended = top * (1.0 - wy) + bottom * wy;

            out.put_pixel(x, y, Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
        out
    }

    /// Median filtering to knock out scan speckle, then a light blur so
    /// character strokes stay intact.
    fn denoise(&self, img: &GrayImage) -> Result<GrayImage, String> {
        let (w, h) = img.dimensions();
        if w < 3 || h < 3 {
            return Err(format!("image too small to denoise ({w}x{h})"));
        }
        let filtered = median_filter(img, 1, 1);
        Ok(gaussian_blur_f32(&filtered, 0.5))
    }

    fn analyze(&self, img: &GrayImage) -> ImageQualityStats {
        let mut sum = 0u64;
        let mut count = 0u64;
        for pixel in img.pixels() {
            sum += pixel[0] as u64;
            count += 1;
        }
        let average_brightness = if count > 0 {
            sum as f32 / count as f32
        } else {
            128.0
        };

        let mut variance = 0.0f32;
        for pixel in img.pixels() {
            let diff = pixel[0] as f32 - average_brightness;
            variance += diff * diff;
        }
        let variance = if count > 0 { variance / count as f32 } else { 0.0 };

        ImageQualityStats {
            average_brightness,
            contrast_ratio: variance.sqrt() / 255.0,
        }
    }

    /// Final global brightness and contrast pass, scaled by how dim and
    /// flat the page still is.
    fn polish(&self, img: &GrayImage, stats: &ImageQualityStats) -> GrayImage {
        let brightness_boost = if stats.average_brightness < 50.0 {
            60.0 - stats.average_brightness
        } else if stats.average_brightness < 80.0 {
            30.0 - (stats.average_brightness - 50.0) * 0.5
        } else {
            0.0
        };

        let contrast_multiplier = if stats.contrast_ratio < 0.2 {
            1.8
        } else if stats.contrast_ratio < 0.4 {
            1.3
        } else {
            1.1
        };

        debug!(brightness_boost, contrast_multiplier, "polishing image");

        let (width, height) = img.dimensions();
        let mut out = GrayImage::new(width, height);
        for (x, y, pixel) in img.enumerate_pixels() {
            let centered = pixel[0] as f32 + brightness_boost - 128.0;
            let value = (centered * contrast_multiplier + 128.0).round();
            out.put_pixel(x, y, Luma([value.clamp(0.0, 255.0) as u8]));
        }
        out
    }

    /// Adaptive local thresholding, with a global Otsu fallback for
    /// buffers large enough to overflow the integral-image path.
    pub fn binarize(&self, img: &GrayImage) -> Result<GrayImage, String> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err("empty image".to_string());
        }

        if (width as u64) * (height as u64) > MAX_ADAPTIVE_THRESHOLD_PIXELS {
            debug!(width, height, "image too large for adaptive threshold, using Otsu");
            let level = otsu_level(img);
            return Ok(threshold(img, level, ThresholdType::Binary));
        }

        let block_radius = (width.min(height) / 20).clamp(5, 25);
        let result = catch_unwind(AssertUnwindSafe(|| adaptive_threshold(img, block_radius)));
        match result {
            Ok(binary) => Ok(binary),
            Err(_) => {
                warn!("adaptive threshold panicked, falling back to Otsu");
                let level = otsu_level(img);
                Ok(threshold(img, level, ThresholdType::Binary))
            }
        }
    }
}

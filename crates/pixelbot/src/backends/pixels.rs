//! Pixel-scan recognition backends.
//!
//! These are deliberately simple reference implementations: grayscale
//! sum-of-absolute-differences template search and 32-bin histogram
//! intersection. They trade speed for having no native dependencies; a
//! deployment that needs faster matching swaps in its own
//! [`TemplateMatcher`]/[`HistogramComparer`] behind the same traits.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use image::{GrayImage, Luma};
use pixelbot_common::mutex_lock_or_recover;
use pixelbot_core::Rect;
use pixelbot_engine::{
    Frame, HistogramComparer, RecognizeError, TemplateMatch, TemplateMatcher,
};
use tracing::trace;

const HISTOGRAM_BINS: usize = 32;

/// Lazily loads template images from a directory and caches the grayscale
/// conversions. Shared between the matcher and the comparer.
pub struct TemplateStore {
    dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<GrayImage>>>,
}

impl TemplateStore {
    pub fn new(dir: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            dir,
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn load(&self, name: &str) -> Result<Arc<GrayImage>, RecognizeError> {
        if let Some(template) = mutex_lock_or_recover(&self.cache).get(name) {
            return Ok(Arc::clone(template));
        }
        let path = self.dir.join(name);
        if !path.exists() {
            return Err(RecognizeError::MissingTemplate(name.to_string()));
        }
        let template = image::open(&path)
            .map_err(|e| RecognizeError::Backend(format!("{}: {e}", path.display())))?
            .to_luma8();
        let template = Arc::new(template);
        mutex_lock_or_recover(&self.cache).insert(name.to_string(), Arc::clone(&template));
        Ok(template)
    }
}

fn gray_frame(frame: &Frame) -> Result<GrayImage, RecognizeError> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(RecognizeError::Backend(format!(
            "frame buffer is {} bytes, expected {expected} for {}x{} rgba",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }
    let mut gray = GrayImage::new(frame.width, frame.height);
    for (i, pixel) in gray.pixels_mut().enumerate() {
        let rgba = &frame.data[i * 4..i * 4 + 4];
        // Integer luma with weights summing to 256, exact for gray inputs.
        let luma = (u32::from(rgba[0]) * 77 + u32::from(rgba[1]) * 150 + u32::from(rgba[2]) * 29)
            >> 8;
        *pixel = Luma([luma as u8]);
    }
    Ok(gray)
}

/// Exhaustive grayscale SAD search over the frame.
pub struct PixelMatcher {
    store: Arc<TemplateStore>,
}

impl PixelMatcher {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self { store }
    }
}

impl TemplateMatcher for PixelMatcher {
    fn find(
        &self,
        frame: &Frame,
        template: &str,
        threshold: f64,
    ) -> Result<Option<TemplateMatch>, RecognizeError> {
        let template_image = self.store.load(template)?;
        let gray = gray_frame(frame)?;
        let (fw, fh) = gray.dimensions();
        let (tw, th) = template_image.dimensions();
        if tw == 0 || th == 0 || tw > fw || th > fh {
            return Ok(None);
        }

        let pixel_count = u64::from(tw) * u64::from(th);
        let sad_budget = |score: f64| ((1.0 - score) * 255.0 * pixel_count as f64) as u64;

        let mut best: Option<(u64, u32, u32)> = None;
        // Positions worse than the threshold (or the best so far) are
        // abandoned mid-accumulation.
        let mut budget = sad_budget(threshold);
        for y in 0..=fh - th {
            for x in 0..=fw - tw {
                let mut sad: u64 = 0;
                'rows: for ty in 0..th {
                    for tx in 0..tw {
                        let a = gray.get_pixel(x + tx, y + ty)[0];
                        let b = template_image.get_pixel(tx, ty)[0];
                        sad += u64::from(a.abs_diff(b));
                        if sad > budget {
                            break 'rows;
                        }
                    }
                }
                if sad <= budget && best.map_or(true, |(b, _, _)| sad < b) {
                    best = Some((sad, x, y));
                    budget = sad;
                }
            }
        }

        Ok(best.map(|(sad, x, y)| {
            let score = 1.0 - sad as f64 / (255.0 * pixel_count as f64);
            trace!(template, score, x, y, "template hit");
            TemplateMatch {
                score,
                bounds: Rect::new(x as i32, y as i32, tw as i32, th as i32),
            }
        }))
    }
}

fn histogram(image: &GrayImage) -> [f64; HISTOGRAM_BINS] {
    let mut bins = [0u64; HISTOGRAM_BINS];
    for pixel in image.pixels() {
        bins[pixel[0] as usize * HISTOGRAM_BINS / 256] += 1;
    }
    let total = (u64::from(image.width()) * u64::from(image.height())).max(1) as f64;
    let mut normalized = [0.0; HISTOGRAM_BINS];
    for (out, count) in normalized.iter_mut().zip(bins) {
        *out = count as f64 / total;
    }
    normalized
}

/// Histogram-intersection comparison of the whole frame against a template's
/// grayscale distribution. Positionless, so it only answers "does this look
/// like that screen", which is what the recognition cache needs.
pub struct PixelComparer {
    store: Arc<TemplateStore>,
}

impl PixelComparer {
    pub fn new(store: Arc<TemplateStore>) -> Self {
        Self { store }
    }
}

impl HistogramComparer for PixelComparer {
    fn compare(
        &self,
        frame: &Frame,
        template: &str,
        threshold: f64,
    ) -> Result<Option<f64>, RecognizeError> {
        let template_image = self.store.load(template)?;
        let gray = gray_frame(frame)?;
        let frame_hist = histogram(&gray);
        let template_hist = histogram(&template_image);
        let score: f64 = frame_hist
            .iter()
            .zip(template_hist)
            .map(|(a, b)| a.min(b))
            .sum();
        Ok((score >= threshold).then_some(score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from_gray(gray: &GrayImage) -> Frame {
        let mut data = Vec::with_capacity(gray.pixels().len() * 4);
        for pixel in gray.pixels() {
            data.extend_from_slice(&[pixel[0], pixel[0], pixel[0], 255]);
        }
        Frame::new(gray.width(), gray.height(), data)
    }

    fn store_with(name: &str, image: &GrayImage) -> (tempfile::TempDir, Arc<TemplateStore>) {
        let dir = tempfile::tempdir().unwrap();
        image.save(dir.path().join(name)).unwrap();
        let store = TemplateStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn test_matcher_locates_embedded_template() {
        let template = GrayImage::from_pixel(4, 4, Luma([10]));
        let (_dir, store) = store_with("button.png", &template);

        let mut screen = GrayImage::from_pixel(16, 16, Luma([200]));
        for ty in 0..4 {
            for tx in 0..4 {
                screen.put_pixel(5 + tx, 6 + ty, Luma([10]));
            }
        }

        let hit = PixelMatcher::new(store)
            .find(&frame_from_gray(&screen), "button.png", 0.9)
            .unwrap()
            .unwrap();
        assert_eq!(hit.bounds, Rect::new(5, 6, 4, 4));
        assert!(hit.score > 0.99);
    }

    #[test]
    fn test_matcher_misses_below_threshold() {
        let template = GrayImage::from_pixel(4, 4, Luma([10]));
        let (_dir, store) = store_with("button.png", &template);
        let screen = GrayImage::from_pixel(16, 16, Luma([200]));

        let hit = PixelMatcher::new(store)
            .find(&frame_from_gray(&screen), "button.png", 0.9)
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_matcher_rejects_oversized_template() {
        let template = GrayImage::from_pixel(32, 32, Luma([10]));
        let (_dir, store) = store_with("big.png", &template);
        let screen = GrayImage::from_pixel(16, 16, Luma([200]));

        let hit = PixelMatcher::new(store)
            .find(&frame_from_gray(&screen), "big.png", 0.5)
            .unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TemplateStore::new(dir.path().to_path_buf());
        let err = PixelMatcher::new(store)
            .find(&frame_from_gray(&GrayImage::new(4, 4)), "ghost.png", 0.5)
            .unwrap_err();
        assert!(matches!(err, RecognizeError::MissingTemplate(name) if name == "ghost.png"));
    }

    #[test]
    fn test_comparer_scores_identical_distributions_as_one() {
        let template = GrayImage::from_pixel(8, 8, Luma([120]));
        let (_dir, store) = store_with("screen.png", &template);

        let score = PixelComparer::new(store)
            .compare(&frame_from_gray(&template), "screen.png", 0.9)
            .unwrap()
            .unwrap();
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_comparer_misses_disjoint_distributions() {
        let template = GrayImage::from_pixel(8, 8, Luma([250]));
        let (_dir, store) = store_with("screen.png", &template);
        let dark = GrayImage::from_pixel(8, 8, Luma([5]));

        let score = PixelComparer::new(store)
            .compare(&frame_from_gray(&dark), "screen.png", 0.5)
            .unwrap();
        assert!(score.is_none());
    }
}

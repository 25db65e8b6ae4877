use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbaImage};

use crate::geometry::Rect;

/// Converts a grayscale image to binary by keeping only dark pixels.
///
/// Pixels darker than `threshold` become black (ink), everything else
/// white (paper). Printed grid sheets carry dark digits on light paper.
pub fn threshold_dark_pixels(img: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if pixel[0] < threshold { 0u8 } else { 255u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Prepares a raster for OCR: grayscale, then optional binarization.
pub fn prepare_for_ocr(img: &RgbaImage, binarize_threshold: Option<u8>) -> GrayImage {
    let gray = imageops::grayscale(img);
    match binarize_threshold {
        Some(threshold) => threshold_dark_pixels(&gray, threshold),
        None => gray,
    }
}

/// Crops a sub-region given in native pixel coordinates.
///
/// The region is clamped into the image and is never smaller than 1x1.
/// Returns the crop and its pixel origin within the source image.
pub fn crop_region(img: &RgbaImage, region: &Rect) -> (RgbaImage, (u32, u32)) {
    let (w, h) = img.dimensions();
    let max_x = w.saturating_sub(1);
    let max_y = h.saturating_sub(1);

    let x0 = (region.x.max(0.0).floor() as u32).min(max_x);
    let y0 = (region.y.max(0.0).floor() as u32).min(max_y);
    let rw = (region.w.max(0.0).ceil() as u32).max(1).min(w - x0);
    let rh = (region.h.max(0.0).ceil() as u32).max(1).min(h - y0);

    (imageops::crop_imm(img, x0, y0, rw, rh).to_image(), (x0, y0))
}

/// Downsamples so the long edge is at most `max_long_edge`, preserving the
/// aspect ratio. Images already small enough are returned unchanged.
///
/// Returns the working image and the working/original scale factor.
pub fn downsample_to_long_edge(img: &RgbaImage, max_long_edge: u32) -> (RgbaImage, f32) {
    let (w, h) = img.dimensions();
    let long_edge = w.max(h);
    if long_edge <= max_long_edge || max_long_edge == 0 {
        return (img.clone(), 1.0);
    }

    let scale = max_long_edge as f32 / long_edge as f32;
    let nw = ((w as f32 * scale).round() as u32).max(1);
    let nh = ((h as f32 * scale).round() as u32).max(1);

    (imageops::resize(img, nw, nh, FilterType::Triangle), scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_crop_region() {
        // 100x200 image
        let img: RgbaImage = RgbaImage::from_fn(100, 200, |x, y| Rgba([x as u8, y as u8, 0, 255]));

        let (cropped, origin) = crop_region(&img, &Rect::new(10.0, 50.0, 50.0, 20.0));

        assert_eq!(cropped.dimensions(), (50, 20));
        assert_eq!(origin, (10, 50));
        assert_eq!(cropped.get_pixel(0, 0)[0], 10);
        assert_eq!(cropped.get_pixel(0, 0)[1], 50);
    }

    #[test]
    fn test_crop_region_clamps() {
        let img = RgbaImage::new(100, 100);
        let (cropped, origin) = crop_region(&img, &Rect::new(90.0, 90.0, 50.0, 50.0));

        // Should clamp to 10x10 (remaining pixels)
        assert_eq!(cropped.dimensions(), (10, 10));
        assert_eq!(origin, (90, 90));
    }

    #[test]
    fn test_crop_region_minimum_one_pixel() {
        let img = RgbaImage::new(100, 100);

        let (cropped, _) = crop_region(&img, &Rect::new(20.0, 20.0, 0.0, 0.0));
        assert_eq!(cropped.dimensions(), (1, 1));

        let (edge, origin) = crop_region(&img, &Rect::new(150.0, 150.0, 10.0, 10.0));
        assert_eq!(edge.dimensions(), (1, 1));
        assert_eq!(origin, (99, 99));
    }

    #[test]
    fn test_threshold_dark_pixels() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([20]));
        img.put_pixel(1, 0, Luma([240]));
        img.put_pixel(2, 0, Luma([127]));

        let result = threshold_dark_pixels(&img, 128);

        assert_eq!(result.get_pixel(0, 0)[0], 0, "Dark pixel should become black");
        assert_eq!(result.get_pixel(1, 0)[0], 255, "Paper should become white");
        assert_eq!(result.get_pixel(2, 0)[0], 0, "Just below threshold is ink");
    }

    #[test]
    fn test_downsample_preserves_aspect() {
        let img = RgbaImage::new(1800, 1200);
        let (small, scale) = downsample_to_long_edge(&img, 900);

        assert_eq!(small.dimensions(), (900, 600));
        assert_eq!(scale, 0.5);
    }

    #[test]
    fn test_downsample_never_upsamples() {
        let img = RgbaImage::new(400, 300);
        let (same, scale) = downsample_to_long_edge(&img, 900);

        assert_eq!(same.dimensions(), (400, 300));
        assert_eq!(scale, 1.0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Grayscale sampling and binarization for floor plan scanning
//!
//! Gray values are the unweighted mean of the red, green and blue channels
//! (alpha ignored), truncated to an integer. Truncation does not change any
//! comparison against an integer threshold.

use image::{DynamicImage, GrayImage, Luma, RgbaImage};

const INK: u8 = 0;
const BACKGROUND: u8 = 255;

/// Unweighted channel mean of one pixel
#[inline]
pub fn mean_gray(r: u8, g: u8, b: u8) -> u8 {
    ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8
}

/// Convert an RGBA image to grayscale using the channel mean
pub fn rgb_mean_grayscale(rgba: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, _] = rgba.get_pixel(x, y).0;
        Luma([mean_gray(r, g, b)])
    })
}

/// Convert any decoded image to grayscale using the channel mean
pub fn dynamic_to_grayscale(image: &DynamicImage) -> GrayImage {
    match image {
        // Already single channel: the mean of three equal channels is the value
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => rgb_mean_grayscale(&other.to_rgba8()),
    }
}

/// Convert RGBA bytes to a grayscale image
///
/// Pixels not covered by a short buffer read as background (white), so a
/// truncated upload never produces wall ink.
pub fn rgba_to_grayscale(rgba: &[u8], width: u32, height: u32) -> GrayImage {
    let row_len = width as usize;
    GrayImage::from_fn(width, height, |x, y| {
        let i = (y as usize * row_len + x as usize) * 4;
        match rgba.get(i..i + 3) {
            Some(&[r, g, b]) => Luma([mean_gray(r, g, b)]),
            _ => Luma([BACKGROUND]),
        }
    })
}

/// Wall mask: ink (0) where the gray value is below `dark_threshold`,
/// background (255) elsewhere
pub fn threshold_dark(image: &GrayImage, dark_threshold: u8) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [gray] = image.get_pixel(x, y).0;
        Luma([if gray < dark_threshold { INK } else { BACKGROUND }])
    })
}

/// True when a mask pixel is wall ink
#[inline]
pub fn is_ink(mask: &GrayImage, x: u32, y: u32) -> bool {
    mask.get_pixel(x, y).0[0] == INK
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_mean_gray_is_unweighted() {
        assert_eq!(mean_gray(255, 255, 255), 255);
        assert_eq!(mean_gray(0, 0, 0), 0);
        // Pure red weighs the same as pure blue
        assert_eq!(mean_gray(255, 0, 0), 85);
        assert_eq!(mean_gray(0, 0, 255), 85);
        // 299 / 3 = 99.67 stays below a threshold of 100
        assert_eq!(mean_gray(100, 100, 99), 99);
    }

    #[test]
    fn test_rgb_mean_ignores_alpha() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([30, 60, 90, 0]));
        img.put_pixel(1, 0, Rgba([30, 60, 90, 255]));

        let gray = rgb_mean_grayscale(&img);

        assert_eq!(gray.get_pixel(0, 0).0[0], 60);
        assert_eq!(gray.get_pixel(1, 0).0[0], 60);
    }

    #[test]
    fn test_threshold_boundary_is_exclusive() {
        let row = GrayImage::from_fn(4, 1, |x, _| Luma([[0, 99, 100, 255][x as usize]]));

        let mask = threshold_dark(&row, 100);
        let ink: Vec<bool> = (0..4).map(|x| is_ink(&mask, x, 0)).collect();
        assert_eq!(ink, vec![true, true, false, false]);

        // A zero threshold marks nothing as ink
        let none = threshold_dark(&row, 0);
        assert!((0..4).all(|x| !is_ink(&none, x, 0)));
    }

    #[test]
    fn test_truncated_rgba_buffer_reads_as_background() {
        // Two full pixels (dark gray, light gray) and a partial third
        let rgba = [30, 30, 30, 255, 200, 210, 220, 255, 0, 0];
        let gray = rgba_to_grayscale(&rgba, 2, 2);

        assert_eq!(gray.get_pixel(0, 0).0[0], 30);
        assert_eq!(gray.get_pixel(1, 0).0[0], 210);
        assert_eq!(gray.get_pixel(0, 1).0[0], BACKGROUND);
        assert_eq!(gray.get_pixel(1, 1).0[0], BACKGROUND);
    }

    #[test]
    fn test_dynamic_luma_passthrough() {
        let gray = GrayImage::from_pixel(4, 4, Luma([42]));
        let converted = dynamic_to_grayscale(&DynamicImage::ImageLuma8(gray.clone()));
        assert_eq!(converted, gray);
    }
}

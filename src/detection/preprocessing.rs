use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use crate::models::BoundingBox;

/// Grey used for letterbox padding
pub const PAD_VALUE: u8 = 114;

/// A source image resized into a square model input, plus the transform
/// needed to map model coordinates back onto the source
#[derive(Debug, Clone)]
pub struct Letterbox {
    pub image: RgbImage,
    pub scale: f32,
    pub pad_x: u32,
    pub pad_y: u32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    /// Map a box in model input coordinates onto the source image
    pub fn to_source(&self, bbox: &BoundingBox) -> BoundingBox {
        let (px, py) = (self.pad_x as f32, self.pad_y as f32);
        BoundingBox {
            x_min: (bbox.x_min - px) / self.scale,
            y_min: (bbox.y_min - py) / self.scale,
            x_max: (bbox.x_max - px) / self.scale,
            y_max: (bbox.y_max - py) / self.scale,
        }
        .clamp_to(self.source_width, self.source_height)
    }

    /// NCHW float tensor data in [0, 1]
    pub fn to_nchw(&self) -> Vec<f32> {
        let (width, height) = self.image.dimensions();
        let plane = (width * height) as usize;
        let mut data = vec![0f32; plane * 3];

        for (x, y, pixel) in self.image.enumerate_pixels() {
            let idx = (y * width + x) as usize;
            data[idx] = pixel[0] as f32 / 255.0;
            data[plane + idx] = pixel[1] as f32 / 255.0;
            data[2 * plane + idx] = pixel[2] as f32 / 255.0;
        }

        data
    }
}

/// Resize into a `size` x `size` canvas keeping the aspect ratio, centring
/// the image and padding the rest with grey. A zero size is treated as 1.
pub fn letterbox(img: &RgbImage, size: u32) -> Letterbox {
    let size = size.max(1);
    let (width, height) = img.dimensions();
    let scale = (size as f32 / width as f32).min(size as f32 / height as f32);

    let new_w = ((width as f32 * scale).round() as u32).clamp(1, size);
    let new_h = ((height as f32 * scale).round() as u32).clamp(1, size);
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;

    let resized = imageops::resize(img, new_w, new_h, FilterType::Triangle);
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
    imageops::overlay(&mut canvas, &resized, pad_x.into(), pad_y.into());

    Letterbox {
        image: canvas,
        scale,
        pad_x,
        pad_y,
        source_width: width,
        source_height: height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letterbox_wide_image_pads_vertically() {
        let img = RgbImage::from_pixel(200, 100, Rgb([255, 0, 0]));
        let lb = letterbox(&img, 64);

        assert_eq!(lb.image.dimensions(), (64, 64));
        assert!((lb.scale - 0.32).abs() < 1e-6);
        assert_eq!(lb.pad_x, 0);
        assert_eq!(lb.pad_y, 16);
        assert_eq!(lb.image.get_pixel(10, 0), &Rgb([PAD_VALUE; 3]));
        assert_eq!(lb.image.get_pixel(10, 32), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_to_source_undoes_letterbox() {
        let img = RgbImage::new(200, 100);
        let lb = letterbox(&img, 64);

        // Model-space box covering the whole unpadded region
        let model_box = BoundingBox { x_min: 0.0, y_min: 16.0, x_max: 64.0, y_max: 48.0 };
        let source = lb.to_source(&model_box);
        assert!((source.x_min - 0.0).abs() < 1e-3);
        assert!((source.y_min - 0.0).abs() < 1e-3);
        assert!((source.x_max - 200.0).abs() < 1e-3);
        assert!((source.y_max - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_letterbox_zero_size_does_not_panic() {
        let lb = letterbox(&RgbImage::new(10, 10), 0);
        assert_eq!(lb.image.dimensions(), (1, 1));
    }

    #[test]
    fn test_nchw_layout() {
        let img = RgbImage::from_pixel(4, 4, Rgb([255, 0, 51]));
        let lb = letterbox(&img, 4);
        let data = lb.to_nchw();

        assert_eq!(data.len(), 3 * 16);
        assert!((data[0] - 1.0).abs() < 1e-6);
        assert_eq!(data[16], 0.0);
        assert!((data[32] - 0.2).abs() < 1e-6);
    }
}

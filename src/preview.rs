//! Conversion of session buffers into what the preview widget displays.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

/// Size of the preview area in the main window
pub const PREVIEW_WIDTH: u32 = 820;
pub const PREVIEW_HEIGHT: u32 = 460;
/// Gap between the preview frame and the image inside it
pub const PREVIEW_PADDING: u32 = 10;

/// RGBA8 pixels ready to be wrapped in the GUI toolkit's image handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Largest size with the source aspect ratio that fits inside the bounds.
/// Scales up as well as down.
pub fn fit_size(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let fitted_w = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let fitted_h = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (fitted_w, fitted_h)
}

/// Scale an RGB buffer to fit the bounds with smooth resampling and convert
/// it to RGBA
pub fn render(img: &RgbImage, max_width: u32, max_height: u32) -> PreviewImage {
    let (width, height) = fit_size(img.width(), img.height(), max_width, max_height);
    if width == 0 || height == 0 {
        return PreviewImage {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
    }

    let scaled = if (width, height) == img.dimensions() {
        img.clone()
    } else {
        imageops::resize(img, width, height, FilterType::Lanczos3)
    };

    PreviewImage {
        width,
        height,
        pixels: DynamicImage::ImageRgb8(scaled).into_rgba8().into_raw(),
    }
}

/// Render for the preview frame, sized to the area left inside its padding
/// so the widget shows the image without scaling it again
pub fn render_preview(img: &RgbImage) -> PreviewImage {
    render(
        img,
        PREVIEW_WIDTH - 2 * PREVIEW_PADDING,
        PREVIEW_HEIGHT - 2 * PREVIEW_PADDING,
    )
}

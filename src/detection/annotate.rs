use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::warn;

use crate::models::{BoundingBox, Prediction};

const FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_PADDING: i32 = 3;
const MIN_LINE_WIDTH: u32 = 2;
const MIN_FONT_SIZE: f32 = 12.0;

/// Per-class box colours, cycled by class index
const PALETTE: [[u8; 3]; 20] = [
    [0xFF, 0x38, 0x38],
    [0xFF, 0x9D, 0x97],
    [0xFF, 0x70, 0x1F],
    [0xFF, 0xB2, 0x1D],
    [0xCF, 0xD2, 0x31],
    [0x48, 0xF9, 0x0A],
    [0x92, 0xCC, 0x17],
    [0x3D, 0xDB, 0x86],
    [0x1A, 0x93, 0x34],
    [0x00, 0xD4, 0xBB],
    [0x2C, 0x99, 0xA8],
    [0x00, 0xC2, 0xFF],
    [0x34, 0x45, 0x93],
    [0x64, 0x73, 0xFF],
    [0x00, 0x18, 0xEC],
    [0x84, 0x38, 0xFF],
    [0x52, 0x00, 0x85],
    [0xCB, 0x38, 0xFF],
    [0xFF, 0x95, 0xC8],
    [0xFF, 0x37, 0xC7],
];

pub fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(PALETTE[class_id % PALETTE.len()])
}

/// Draws detection boxes and `name confidence` tabs onto images
pub struct Annotator {
    font: Option<FontRef<'static>>,
}

impl Default for Annotator {
    fn default() -> Self {
        let font = match FontRef::try_from_slice(FONT_BYTES) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!("Embedded label font unusable, drawing boxes only: {}", e);
                None
            }
        };
        Self { font }
    }
}

impl Annotator {
    /// Copy the prediction's source image and burn every detection into it
    pub fn plot(&self, prediction: &Prediction) -> RgbImage {
        let mut canvas = prediction.image.clone();
        let (width, height) = canvas.dimensions();
        if width == 0 || height == 0 {
            return canvas;
        }

        // Stroke and text scale with the image size
        let mean_side = (width + height) as f32 / 2.0;
        let line_width = ((mean_side * 0.003).round() as u32).max(MIN_LINE_WIDTH);
        let font_size = (mean_side * 0.035).round().max(MIN_FONT_SIZE);

        for detection in &prediction.detections {
            let color = class_color(detection.class_id);
            let Some((x0, y0)) = draw_box(&mut canvas, &detection.bbox, color, line_width) else {
                continue;
            };

            let label = format!("{} {:.2}", prediction.label(detection), detection.confidence);
            self.draw_label(&mut canvas, x0, y0, &label, color, font_size);
        }

        canvas
    }

    fn draw_label(
        &self,
        image: &mut RgbImage,
        x: i32,
        y: i32,
        label: &str,
        color: Rgb<u8>,
        font_size: f32,
    ) {
        let Some(font) = &self.font else {
            return;
        };

        let scale = PxScale::from(font_size);
        let (text_w, text_h) = text_size(scale, font, label);
        let tab_w = text_w as i32 + 2 * LABEL_PADDING;
        let tab_h = text_h as i32 + 2 * LABEL_PADDING;

        let (width, height) = (image.width() as i32, image.height() as i32);
        // Above the box when there is room, otherwise just inside its top edge
        let tab_y = if y >= tab_h { y - tab_h } else { y };
        let tab_x = x.min(width - tab_w).max(0);
        let visible_w = tab_w.min(width - tab_x);
        let visible_h = tab_h.min(height - tab_y);
        if visible_w <= 0 || visible_h <= 0 {
            return;
        }

        draw_filled_rect_mut(
            image,
            Rect::at(tab_x, tab_y).of_size(visible_w as u32, visible_h as u32),
            color,
        );
        draw_text_mut(
            image,
            TEXT_COLOR,
            tab_x + LABEL_PADDING,
            tab_y + LABEL_PADDING,
            scale,
            font,
            label,
        );
    }
}

/// Draw a box outline `line_width` pixels thick, growing inwards.
/// Returns the top-left corner, or `None` when the box is empty after
/// clamping to the image.
fn draw_box(
    image: &mut RgbImage,
    bbox: &BoundingBox,
    color: Rgb<u8>,
    line_width: u32,
) -> Option<(i32, i32)> {
    let (width, height) = image.dimensions();
    let clamped = bbox.clamp_to(width, height);

    let x0 = clamped.x_min.floor() as i32;
    let y0 = clamped.y_min.floor() as i32;
    let x1 = (clamped.x_max.ceil() as i32).min(width as i32 - 1);
    let y1 = (clamped.y_max.ceil() as i32).min(height as i32 - 1);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }

    for t in 0..line_width as i32 {
        let w = x1 - x0 - 2 * t + 1;
        let h = y1 - y0 - 2 * t + 1;
        if w <= 0 || h <= 0 {
            break;
        }
        draw_hollow_rect_mut(image, Rect::at(x0 + t, y0 + t).of_size(w as u32, h as u32), color);
    }

    Some((x0, y0))
}

//! QR rendering of seed values

use image::imageops::{self, FilterType};
use image::Luma;
use qrcode::QrCode;

/// Grayscale QR bitmap
pub type QrImage = image::GrayImage;

/// Turns text into a square scannable image
pub trait QrEncoder: Send + Sync {
    /// `None` when the text cannot be encoded at that size
    fn encode(&self, text: &str, size: u32) -> Option<QrImage>;
}

/// [`QrEncoder`] backed by the `qrcode` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct QrRenderer;

impl QrEncoder for QrRenderer {
    fn encode(&self, text: &str, size: u32) -> Option<QrImage> {
        if size == 0 {
            return None;
        }
        let code = QrCode::new(text.as_bytes()).ok()?;
        let image = code.render::<Luma<u8>>().build();

        Some(imageops::resize(&image, size, size, FilterType::Nearest))
    }
}

/// Render `text` as Unicode block characters for terminal display
pub fn render_terminal(text: &str) -> Option<String> {
    let code = QrCode::new(text.as_bytes()).ok()?;
    Some(
        code.render::<char>()
            .quiet_zone(true)
            .module_dimensions(2, 1)
            .build(),
    )
}

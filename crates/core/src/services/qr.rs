//! QR label rendering.
//!
//! A label is a PNG holding the QR symbol for the exhibit's public URL with
//! the exhibit code printed underneath:
//!
//! ```text
//! +--------------------------+
//! |  padding                 |
//! |   +------------------+   |
//! |   |    QR symbol     |   |
//! |   |  qr_size x size  |   |
//! |   +------------------+   |
//! |  padding                 |
//! |     ISC-REN2-1.0001      |  caption_height
//! +--------------------------+
//! ```

use std::io::Cursor;

use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use museum_common::config::QrConfig;
use museum_common::{AppError, AppResult};
use qrcode::{Color, EcLevel, QrCode};

/// Light modules around the symbol.
const QUIET_ZONE: u32 = 2;

/// Renders QR labels for exhibits.
pub trait QrRenderer: Send + Sync {
    /// URL encoded into the label of an exhibit.
    fn payload(&self, museum_slug: &str, exhibit_slug: &str) -> String;

    /// PNG label for an exhibit.
    fn render(&self, museum_slug: &str, exhibit_slug: &str) -> AppResult<Vec<u8>>;
}

/// Canonical public URL of an exhibit.
#[must_use]
pub fn qr_payload(base_url: &str, museum_slug: &str, exhibit_slug: &str) -> String {
    format!(
        "{}/{museum_slug}/{exhibit_slug}",
        base_url.trim_end_matches('/')
    )
}

/// Render the bare QR symbol, black on white, scaled to `size` pixels.
pub fn render_code(payload: &str, size: u32) -> AppResult<GrayImage> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
        .map_err(|e| AppError::Image(format!("Failed to encode QR payload: {e}")))?;

    let modules = code.width() as u32;
    let side = modules + QUIET_ZONE * 2;
    let colors = code.to_colors();

    let mut symbol = GrayImage::from_pixel(side, side, Luma([255]));
    for (i, color) in colors.iter().enumerate() {
        if *color == Color::Dark {
            let x = i as u32 % modules + QUIET_ZONE;
            let y = i as u32 / modules + QUIET_ZONE;
            symbol.put_pixel(x, y, Luma([0]));
        }
    }

    Ok(imageops::resize(&symbol, size, size, FilterType::Nearest))
}

/// Canvas geometry of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    pub width: u32,
    pub height: u32,
    /// Top edge of the caption band.
    pub caption_top: u32,
}

impl LabelLayout {
    /// Geometry for the configured sizes.
    #[must_use]
    pub const fn new(config: &QrConfig) -> Self {
        let width = config.qr_size + config.padding * 2;
        Self {
            width,
            height: width + config.caption_height,
            caption_top: config.padding + config.qr_size,
        }
    }

    /// Top-left corner of a caption of the given size, centered in its band.
    #[must_use]
    pub fn caption_origin(&self, caption_height: u32, text_width: u32, text_height: u32) -> (i32, i32) {
        let x = (i64::from(self.width) - i64::from(text_width)) / 2;
        let y = i64::from(self.caption_top)
            + (i64::from(caption_height) - i64::from(text_height)) / 2;
        (x as i32, y as i32)
    }
}

/// QR label renderer backed by a TrueType/OpenType font.
pub struct QrComposer {
    config: QrConfig,
    font: FontArc,
}

impl QrComposer {
    /// Load the caption font and build a composer.
    ///
    /// A missing or unparsable font is a configuration error.
    pub fn from_config(config: &QrConfig) -> AppResult<Self> {
        let data = std::fs::read(&config.font_path).map_err(|e| {
            AppError::Config(format!(
                "Cannot read QR font {}: {e}",
                config.font_path.display()
            ))
        })?;
        let font = FontArc::try_from_vec(data).map_err(|e| {
            AppError::Config(format!(
                "Invalid QR font {}: {e}",
                config.font_path.display()
            ))
        })?;

        Ok(Self {
            config: config.clone(),
            font,
        })
    }

    /// Compose the label canvas for an exhibit.
    pub fn compose(&self, museum_slug: &str, exhibit_slug: &str) -> AppResult<RgbImage> {
        let payload = self.payload(museum_slug, exhibit_slug);
        let symbol = DynamicImage::ImageLuma8(render_code(&payload, self.config.qr_size)?).to_rgb8();

        let layout = LabelLayout::new(&self.config);
        let mut canvas = RgbImage::from_pixel(layout.width, layout.height, Rgb([255, 255, 255]));
        imageops::replace(
            &mut canvas,
            &symbol,
            i64::from(self.config.padding),
            i64::from(self.config.padding),
        );

        let scale = PxScale::from(self.config.font_size);
        let (text_width, text_height) = text_size(scale, &self.font, exhibit_slug);
        let (x, y) = layout.caption_origin(self.config.caption_height, text_width, text_height);
        draw_text_mut(&mut canvas, Rgb([0, 0, 0]), x, y, scale, &self.font, exhibit_slug);

        Ok(canvas)
    }
}

impl QrRenderer for QrComposer {
    fn payload(&self, museum_slug: &str, exhibit_slug: &str) -> String {
        qr_payload(&self.config.base_url, museum_slug, exhibit_slug)
    }

    fn render(&self, museum_slug: &str, exhibit_slug: &str) -> AppResult<Vec<u8>> {
        let canvas = self.compose(museum_slug, exhibit_slug)?;
        encode_png(&DynamicImage::ImageRgb8(canvas))
    }
}

/// Encode an image as PNG.
pub fn encode_png(image: &DynamicImage) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| AppError::Image(format!("Failed to encode PNG: {e}")))?;
    Ok(buf)
}

use crate::foundation::error::{CarouselError, CarouselResult};

pub use kurbo::{Affine, Point, Rect};

/// Logical edge length of every slide, in pixels.
pub const SLIDE_SIZE: u32 = 1080;

/// Largest accepted output scale (4320×4320 for a slide).
pub const MAX_RENDER_SCALE: f32 = 4.0;

/// Output canvas dimensions in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// The fixed square slide canvas.
    pub const SLIDE: Canvas = Canvas {
        width: SLIDE_SIZE,
        height: SLIDE_SIZE,
    };

    /// Canvas size as floating point `(w, h)`.
    pub fn size_f64(self) -> (f64, f64) {
        (f64::from(self.width), f64::from(self.height))
    }

    /// Center point of the canvas.
    pub fn center(self) -> Point {
        let (w, h) = self.size_f64();
        Point::new(w / 2.0, h / 2.0)
    }

    /// Convert a `(x%, y%)` position into absolute pixels.
    pub fn percent_to_px(self, x_pct: f64, y_pct: f64) -> Point {
        let (w, h) = self.size_f64();
        Point::new(w * x_pct / 100.0, h * y_pct / 100.0)
    }

    /// Canvas size multiplied by an output scale, validated to fit the pixmap limits.
    pub fn scaled(self, scale: f32) -> CarouselResult<(u16, u16)> {
        check_render_scale(scale)?;
        let to_u16 = |v: u32| -> CarouselResult<u16> {
            let px = (f64::from(v) * f64::from(scale)).round();
            if px < 1.0 || px > f64::from(u16::MAX) {
                return Err(CarouselError::validation(
                    "scaled canvas dimension out of range",
                ));
            }
            Ok(px as u16)
        };
        Ok((to_u16(self.width)?, to_u16(self.height)?))
    }
}

/// Reject scales that are not finite, not positive, or above [`MAX_RENDER_SCALE`].
pub fn check_render_scale(scale: f32) -> CarouselResult<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CarouselError::validation("render scale must be finite and > 0"));
    }
    if scale > MAX_RENDER_SCALE {
        return Err(CarouselError::validation(format!(
            "render scale {scale} exceeds the maximum of {MAX_RENDER_SCALE}"
        )));
    }
    Ok(())
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// Same color with alpha scaled by `factor` (clamped to 0..1).
    pub fn with_alpha_mul(self, factor: f32) -> Self {
        let a = (f32::from(self.a) * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub(crate) fn to_cpu(self) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_maps_to_canvas_pixels() {
        let p = Canvas::SLIDE.percent_to_px(50.0, 25.0);
        assert_eq!(p, Point::new(540.0, 270.0));
        assert_eq!(Canvas::SLIDE.center(), Point::new(540.0, 540.0));
    }

    #[test]
    fn scaled_doubles_and_rejects_bad_scale() {
        assert_eq!(Canvas::SLIDE.scaled(2.0).unwrap(), (2160, 2160));
        assert!(Canvas::SLIDE.scaled(0.0).is_err());
        assert!(Canvas::SLIDE.scaled(f32::NAN).is_err());
        assert!(Canvas::SLIDE.scaled(100.0).is_err());
        assert_eq!(Canvas::SLIDE.scaled(MAX_RENDER_SCALE).unwrap(), (4320, 4320));
        let err = Canvas::SLIDE.scaled(60.0).unwrap_err();
        assert!(matches!(err, CarouselError::Validation(_)));
    }

    #[test]
    fn alpha_mul_clamps() {
        let c = Rgba8::rgb(10, 20, 30).with_alpha_mul(0.5);
        assert_eq!(c.a, 128);
        assert_eq!(Rgba8::rgb(1, 2, 3).with_alpha_mul(4.0).a, 255);
    }
}

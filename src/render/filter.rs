use crate::foundation::error::{CarouselError, CarouselResult};

/// Per-pixel color filter run over a finished slide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterPreset {
    /// Leave pixels untouched.
    None,
    /// Blend towards sepia by `amount` (0..1), then scale contrast.
    Sepia { amount: f32, contrast: f32 },
    /// Scale saturation (1 = unchanged).
    Saturate { amount: f32 },
    /// Luma grayscale, then scale contrast.
    Grayscale { contrast: f32 },
    /// Lift blacks towards white by `lift` (0..1).
    Fade { lift: f32 },
    /// Multiply each channel.
    Tint { r: f32, g: f32, b: f32 },
}

/// Apply `preset` in place to straight-alpha RGBA8 pixels. Alpha is preserved.
pub fn apply_filter_rgba8(rgba: &mut [u8], preset: FilterPreset) -> CarouselResult<()> {
    if rgba.len() % 4 != 0 {
        return Err(CarouselError::render(
            "filter expects a buffer of whole RGBA8 pixels",
        ));
    }
    if preset == FilterPreset::None {
        return Ok(());
    }

    for px in rgba.chunks_exact_mut(4) {
        let rgb = [
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
        ];
        let out = filter_rgb(rgb, preset);
        for (dst, v) in px.iter_mut().zip(out) {
            *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
    Ok(())
}

fn luma([r, g, b]: [f32; 3]) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

fn contrast(rgb: [f32; 3], k: f32) -> [f32; 3] {
    rgb.map(|c| (c - 0.5) * k + 0.5)
}

fn filter_rgb(rgb: [f32; 3], preset: FilterPreset) -> [f32; 3] {
    match preset {
        FilterPreset::None => rgb,
        FilterPreset::Sepia { amount, contrast: k } => {
            let [r, g, b] = rgb;
            let sepia = [
                0.393 * r + 0.769 * g + 0.189 * b,
                0.349 * r + 0.686 * g + 0.168 * b,
                0.272 * r + 0.534 * g + 0.131 * b,
            ];
            let t = amount.clamp(0.0, 1.0);
            let mixed = [
                rgb[0] + (sepia[0] - rgb[0]) * t,
                rgb[1] + (sepia[1] - rgb[1]) * t,
                rgb[2] + (sepia[2] - rgb[2]) * t,
            ];
            contrast(mixed, k)
        }
        FilterPreset::Saturate { amount } => {
            let y = luma(rgb);
            rgb.map(|c| y + (c - y) * amount)
        }
        FilterPreset::Grayscale { contrast: k } => {
            let y = luma(rgb);
            contrast([y, y, y], k)
        }
        FilterPreset::Fade { lift } => {
            let l = lift.clamp(0.0, 1.0);
            rgb.map(|c| l + c * (1.0 - l))
        }
        FilterPreset::Tint { r, g, b } => [rgb[0] * r, rgb[1] * g, rgb[2] * b],
    }
}

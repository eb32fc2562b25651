use crate::foundation::core::Affine;

/// Image-to-canvas scaling policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Uniform scale that covers the whole canvas, cropping overflow.
    #[default]
    Cover,
    /// Uniform scale that shows the whole image, letterboxing the rest.
    Contain,
    /// Independent per-axis scale that stretches the image onto the canvas.
    Fill,
}

/// Where and how large to draw a source image on the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Horizontal scale from source pixels to canvas pixels.
    pub scale_x: f64,
    /// Vertical scale from source pixels to canvas pixels.
    pub scale_y: f64,
    /// Canvas x of the image's left edge.
    pub offset_x: f64,
    /// Canvas y of the image's top edge.
    pub offset_y: f64,
}

impl Placement {
    /// Drawn size on the canvas.
    pub fn drawn_size(&self, src_w: f64, src_h: f64) -> (f64, f64) {
        (src_w * self.scale_x, src_h * self.scale_y)
    }

    /// Transform mapping source pixel space onto the canvas.
    pub fn transform(&self) -> Affine {
        Affine::new([
            self.scale_x,
            0.0,
            0.0,
            self.scale_y,
            self.offset_x,
            self.offset_y,
        ])
    }
}

/// Compute the placement of a `src_w × src_h` image on a `dst_w × dst_h` canvas.
///
/// `bias_x_pct`/`bias_y_pct` shift a cover-fitted image away from center by a percentage of its
/// overflow (clamped to ±50, where ±50 aligns an edge with the canvas edge). The bias is ignored by
/// the other modes. Degenerate source sizes yield an identity scale at the origin.
pub fn place_image(
    mode: FitMode,
    src_w: f64,
    src_h: f64,
    dst_w: f64,
    dst_h: f64,
    bias_x_pct: f64,
    bias_y_pct: f64,
) -> Placement {
    if !(src_w > 0.0 && src_h > 0.0 && src_w.is_finite() && src_h.is_finite()) {
        return Placement {
            scale_x: 1.0,
            scale_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
    }

    let rx = dst_w / src_w;
    let ry = dst_h / src_h;
    let (scale_x, scale_y) = match mode {
        FitMode::Cover => {
            let s = rx.max(ry);
            (s, s)
        }
        FitMode::Contain => {
            let s = rx.min(ry);
            (s, s)
        }
        FitMode::Fill => (rx, ry),
    };

    let drawn_w = src_w * scale_x;
    let drawn_h = src_h * scale_y;
    let mut offset_x = (dst_w - drawn_w) / 2.0;
    let mut offset_y = (dst_h - drawn_h) / 2.0;

    if mode == FitMode::Cover {
        let bias = |pct: f64| if pct.is_finite() { pct.clamp(-50.0, 50.0) / 100.0 } else { 0.0 };
        // Overflow is >= 0 in cover mode; positive bias reveals more of the right/bottom side.
        offset_x -= (drawn_w - dst_w) * bias(bias_x_pct);
        offset_y -= (drawn_h - dst_h) * bias(bias_y_pct);
    }

    Placement {
        scale_x,
        scale_y,
        offset_x,
        offset_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn covers(p: &Placement, sw: f64, sh: f64, dw: f64, dh: f64) -> bool {
        let (w, h) = p.drawn_size(sw, sh);
        p.offset_x <= EPS
            && p.offset_y <= EPS
            && p.offset_x + w >= dw - EPS
            && p.offset_y + h >= dh - EPS
    }

    fn contained(p: &Placement, sw: f64, sh: f64, dw: f64, dh: f64) -> bool {
        let (w, h) = p.drawn_size(sw, sh);
        p.offset_x >= -EPS
            && p.offset_y >= -EPS
            && p.offset_x + w <= dw + EPS
            && p.offset_y + h <= dh + EPS
    }

    const SIZES: [(f64, f64); 6] = [
        (1920.0, 1080.0),
        (1080.0, 1920.0),
        (500.0, 500.0),
        (4000.0, 3000.0),
        (37.0, 1001.0),
        (1080.0, 1080.0),
    ];

    #[test]
    fn cover_always_covers_even_with_bias() {
        for (sw, sh) in SIZES {
            for bias in [-80.0, -50.0, 0.0, 25.0, 50.0, 120.0] {
                let p = place_image(FitMode::Cover, sw, sh, 1080.0, 1080.0, bias, -bias);
                assert!(covers(&p, sw, sh, 1080.0, 1080.0), "{sw}x{sh} bias {bias}");
                assert_eq!(p.scale_x, p.scale_y);
            }
        }
    }

    #[test]
    fn contain_never_crops() {
        for (sw, sh) in SIZES {
            let p = place_image(FitMode::Contain, sw, sh, 1080.0, 1080.0, 40.0, 40.0);
            assert!(contained(&p, sw, sh, 1080.0, 1080.0), "{sw}x{sh}");
            let (w, h) = p.drawn_size(sw, sh);
            assert!((w - 1080.0).abs() < 1e-6 || (h - 1080.0).abs() < 1e-6);
        }
    }

    #[test]
    fn fill_scales_each_axis_exactly() {
        for (sw, sh) in SIZES {
            let p = place_image(FitMode::Fill, sw, sh, 1080.0, 1080.0, 10.0, 10.0);
            assert_eq!(p.scale_x, 1080.0 / sw);
            assert_eq!(p.scale_y, 1080.0 / sh);
            assert!(p.offset_x.abs() < 1e-9 && p.offset_y.abs() < 1e-9);
        }
    }

    #[test]
    fn cover_bias_aligns_edges_at_limits() {
        let p = place_image(FitMode::Cover, 2160.0, 1080.0, 1080.0, 1080.0, -50.0, 0.0);
        assert!((p.offset_x - 0.0).abs() < 1e-9);
        let p = place_image(FitMode::Cover, 2160.0, 1080.0, 1080.0, 1080.0, 50.0, 0.0);
        assert!((p.offset_x + 1080.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_source_is_identity() {
        let p = place_image(FitMode::Cover, 0.0, 10.0, 1080.0, 1080.0, 0.0, 0.0);
        assert_eq!(p.transform(), Affine::IDENTITY);
    }

    #[test]
    fn fit_mode_serde_names() {
        let m: FitMode = serde_json::from_str("\"contain\"").unwrap();
        assert_eq!(m, FitMode::Contain);
        assert_eq!(serde_json::to_string(&FitMode::Fill).unwrap(), "\"fill\"");
    }
}

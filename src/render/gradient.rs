use std::sync::LazyLock;

use regex::Regex;

use crate::{
    assets::color::parse_css_color,
    foundation::core::{Canvas, Point, Rgba8},
};

/// Angle used when a gradient names no direction (CSS would use 180deg; the editor uses 135deg).
pub const DEFAULT_GRADIENT_ANGLE_DEG: f64 = 135.0;

static WRAPPER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)linear-gradient\s*\(").expect("valid regex"));

static ANGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(-?\d*\.?\d+)\s*(deg|grad|rad|turn)$").expect("valid regex")
});

static DIRECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^to\s+(top|bottom|left|right)(?:\s+(top|bottom|left|right))?$")
        .expect("valid regex")
});

static STOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(#[0-9a-f]{3,8}|(?:rgba?|hsla?)\([^)]*\)|[a-z]+)(?:\s+(-?\d*\.?\d+)%)?(?:\s+-?\d*\.?\d+%)?$",
    )
    .expect("valid regex")
});

/// One color stop with a resolved offset in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Stop color.
    pub color: Rgba8,
    /// Offset along the gradient line.
    pub offset: f32,
}

/// Decoded CSS `linear-gradient(...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradientSpec {
    /// CSS angle in degrees (0 = towards top, 90 = towards right).
    pub angle_deg: f64,
    /// Stops ordered by offset, never empty.
    pub stops: Vec<GradientStop>,
}

impl LinearGradientSpec {
    /// Endpoints of the gradient line on `canvas`.
    pub fn line(&self, canvas: Canvas) -> (Point, Point) {
        gradient_line(self.angle_deg, canvas)
    }
}

/// Decode the first `linear-gradient(...)` layer of a CSS background string.
///
/// Returns `None` when no wrapper is found or no stop parses; callers fall back to a flat color.
pub fn parse_linear_gradient(css: &str) -> Option<LinearGradientSpec> {
    let body = wrapper_body(css)?;
    let mut args = split_top_level(body).into_iter().peekable();

    let mut angle_deg = DEFAULT_GRADIENT_ANGLE_DEG;
    if let Some(first) = args.peek() {
        if let Some(a) = parse_angle(first) {
            angle_deg = a;
            args.next();
        } else if let Some(a) = parse_direction(first) {
            angle_deg = a;
            args.next();
        }
    }

    let mut colors = Vec::new();
    let mut raw_offsets = Vec::new();
    for arg in args {
        let Some(caps) = STOP.captures(arg) else {
            tracing::debug!(arg, "skipping unrecognized gradient argument");
            continue;
        };
        let Some(color) = parse_css_color(&caps[1]) else {
            tracing::debug!(arg, "skipping gradient stop with unknown color");
            continue;
        };
        let offset = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<f32>().ok())
            .map(|pct| pct / 100.0);
        colors.push(color);
        raw_offsets.push(offset);
    }

    if colors.is_empty() {
        return None;
    }

    let offsets = resolve_offsets(&raw_offsets);
    let stops = colors
        .into_iter()
        .zip(offsets)
        .map(|(color, offset)| GradientStop { color, offset })
        .collect();

    Some(LinearGradientSpec { angle_deg, stops })
}

/// Text between the parentheses of the first `linear-gradient(`, respecting nesting.
fn wrapper_body(css: &str) -> Option<&str> {
    let m = WRAPPER_START.find(css)?;
    let start = m.end();
    let mut depth = 1usize;
    for (i, c) in css[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&css[start..start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut last = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                out.push(s[last..i].trim());
                last = i + 1;
            }
            _ => {}
        }
    }
    out.push(s[last..].trim());
    out.retain(|p| !p.is_empty());
    out
}

fn parse_angle(s: &str) -> Option<f64> {
    let caps = ANGLE.captures(s.trim())?;
    let v: f64 = caps[1].parse().ok()?;
    let deg = match caps[2].to_ascii_lowercase().as_str() {
        "deg" => v,
        "grad" => v * 0.9,
        "rad" => v.to_degrees(),
        "turn" => v * 360.0,
        _ => return None,
    };
    Some(deg)
}

fn parse_direction(s: &str) -> Option<f64> {
    let caps = DIRECTION.captures(s.trim())?;
    let a = caps[1].to_ascii_lowercase();
    let b = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());

    let side = |k: &str| -> f64 {
        match k {
            "top" => 0.0,
            "right" => 90.0,
            "bottom" => 180.0,
            _ => 270.0,
        }
    };

    match b.as_deref() {
        None => Some(side(&a)),
        Some(b) => {
            let vertical = |k: &str| k == "top" || k == "bottom";
            if vertical(&a) == vertical(b) {
                return None;
            }
            let (v, h) = if vertical(&a) { (a.as_str(), b) } else { (b, a.as_str()) };
            // Corner directions on a square canvas bisect the two sides.
            Some(match (v, h) {
                ("top", "right") => 45.0,
                ("bottom", "right") => 135.0,
                ("bottom", _) => 225.0,
                _ => 315.0,
            })
        }
    }
}

/// Resolve optional stop positions: ends default to 0 and 1, explicit positions are clamped to
/// `[0, 1]` and made non-decreasing, and missing interior positions are spaced evenly between
/// their explicit neighbours.
pub fn resolve_offsets(raw: &[Option<f32>]) -> Vec<f32> {
    let n = raw.len();
    if n == 0 {
        return Vec::new();
    }

    let mut fixed: Vec<Option<f32>> = raw
        .iter()
        .map(|o| o.filter(|v| v.is_finite()).map(|v| v.clamp(0.0, 1.0)))
        .collect();
    if fixed[0].is_none() {
        fixed[0] = Some(0.0);
    }
    if n > 1 && fixed[n - 1].is_none() {
        fixed[n - 1] = Some(1.0);
    }

    let mut prev = 0.0f32;
    for v in fixed.iter_mut().flatten() {
        *v = v.max(prev);
        prev = *v;
    }

    let mut out = vec![0.0f32; n];
    let mut i = 0;
    while i < n {
        let Some(start) = fixed[i] else {
            i += 1;
            continue;
        };
        out[i] = start;
        let Some(j) = (i + 1..n).find(|&k| fixed[k].is_some()) else {
            break;
        };
        let end = fixed[j].unwrap_or(start);
        let span = (j - i) as f32;
        for (step, slot) in out.iter_mut().enumerate().take(j).skip(i + 1) {
            *slot = start + (end - start) * ((step - i) as f32) / span;
        }
        i = j;
    }
    out
}

/// Endpoints of a CSS gradient line for `angle_deg` on `canvas`.
///
/// A vector of half the canvas diagonal is rotated by `angle - 90°` around the center; the line
/// runs from `center - v` to `center + v`.
pub fn gradient_line(angle_deg: f64, canvas: Canvas) -> (Point, Point) {
    let (w, h) = canvas.size_f64();
    let half_diag = (w * w + h * h).sqrt() / 2.0;
    let theta = (angle_deg - 90.0).to_radians();
    let dx = theta.cos() * half_diag;
    let dy = theta.sin() * half_diag;
    let c = canvas.center();
    (Point::new(c.x - dx, c.y - dy), Point::new(c.x + dx, c.y + dy))
}

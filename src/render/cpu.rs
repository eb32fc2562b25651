use std::sync::Arc;

use crate::{
    assets::{
        decode::PreparedImage,
        text::{FontBook, FontSpec, TextLayoutEngine, TextMeasure},
    },
    foundation::{
        core::{Affine, Point, Rect, Rgba8, check_render_scale},
        error::{CarouselError, CarouselResult},
    },
    render::{
        filter::apply_filter_rgba8,
        gradient::GradientStop,
        plan::{DrawOp, Paint, RenderPlan, compile_slide},
    },
    slide::model::SlideRecord,
};

/// Rendered slide pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Straight-alpha RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Slide renderer powered by `vello_cpu`.
///
/// Rendering is synchronous: when [`CpuRenderer::execute`] returns, every layer (including decoded
/// background images) is in the frame.
pub struct CpuRenderer {
    text: TextLayoutEngine,
    scale: f32,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl CpuRenderer {
    /// Renderer with the fonts of `book` and an output scale (1.0 = 1080×1080).
    pub fn new(book: &FontBook, scale: f32) -> CarouselResult<Self> {
        check_render_scale(scale)?;
        Ok(Self {
            text: TextLayoutEngine::with_fonts(book)?,
            scale,
        })
    }

    /// Output scale multiplier.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Text measurement backed by the registered fonts.
    pub fn measure(&mut self) -> &mut dyn TextMeasure {
        &mut self.text
    }

    /// Compile and rasterize one slide.
    #[tracing::instrument(skip_all, fields(slide = %slide.id, scale = self.scale))]
    pub fn render_slide(&mut self, slide: &SlideRecord) -> CarouselResult<FrameRGBA> {
        let plan = compile_slide(slide, &mut self.text)?;
        self.execute(&plan)
    }

    /// Rasterize a compiled plan.
    pub fn execute(&mut self, plan: &RenderPlan) -> CarouselResult<FrameRGBA> {
        let (w, h) = plan.canvas.scaled(self.scale)?;
        let device = Affine::scale(f64::from(self.scale));

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        for op in &plan.ops {
            self.draw_op(&mut ctx, op, device, w, h)?;
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        apply_filter_rgba8(&mut data, plan.filter)?;

        tracing::debug!(width = w, height = h, ops = plan.ops.len(), "rendered frame");
        Ok(FrameRGBA {
            width: u32::from(w),
            height: u32::from(h),
            data,
        })
    }

    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        op: &DrawOp,
        device: Affine,
        w: u16,
        h: u16,
    ) -> CarouselResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match op {
            DrawOp::FillRect {
                rect,
                paint: Paint::Solid(c),
            } => {
                ctx.set_transform(affine_to_cpu(device));
                ctx.set_paint(c.to_cpu());
                ctx.fill_rect(&rect_to_cpu(*rect));
            }
            DrawOp::FillRect {
                rect,
                paint: Paint::LinearGradient { start, end, stops },
            } => {
                // Rasterized directly in device space.
                let img =
                    linear_gradient_image(*start, *end, stops, f64::from(self.scale), w, h)?;
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(img);
                ctx.fill_rect(&rect_to_cpu(device.transform_rect_bbox(*rect)));
            }
            DrawOp::Image { image, transform } => {
                let img = image_paint(image)?;
                ctx.set_transform(affine_to_cpu(device * *transform));
                ctx.set_paint(img);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    f64::from(image.width),
                    f64::from(image.height),
                ));
            }
            DrawOp::Text {
                text,
                font,
                color,
                origin,
                line_height,
                ..
            } => self.draw_text(ctx, text, font, *color, *origin, *line_height, device)?,
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        font: &FontSpec,
        color: Rgba8,
        origin: Point,
        line_height: f64,
        device: Affine,
    ) -> CarouselResult<()> {
        let (layout, font_data) = self.text.layout_line(text, font, color.into())?;
        let dy = (line_height - f64::from(layout.height())) / 2.0;
        let tr = device * Affine::translate((origin.x, origin.y + dy));
        ctx.set_transform(affine_to_cpu(tr));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CarouselResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CarouselError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CarouselError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CarouselError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> CarouselResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_paint(image: &PreparedImage) -> CarouselResult<vello_cpu::Image> {
    rgba_premul_to_image(&image.rgba8_premul, image.width, image.height)
}

/// Straight-alpha color at `t` along a sorted stop list.
pub(crate) fn sample_stops(stops: &[GradientStop], t: f32) -> Rgba8 {
    let Some(first) = stops.first() else {
        return Rgba8::transparent();
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let k = if span <= f32::EPSILON {
                1.0
            } else {
                (t - a.offset) / span
            };
            let lerp = |x: u8, y: u8| -> u8 {
                let (x, y) = (f32::from(x), f32::from(y));
                (x + (y - x) * k).round().clamp(0.0, 255.0) as u8
            };
            return Rgba8::rgba(
                lerp(a.color.r, b.color.r),
                lerp(a.color.g, b.color.g),
                lerp(a.color.b, b.color.b),
                lerp(a.color.a, b.color.a),
            );
        }
    }
    stops.last().map(|s| s.color).unwrap_or_else(Rgba8::transparent)
}

fn linear_gradient_image(
    start: Point,
    end: Point,
    stops: &[GradientStop],
    scale: f64,
    w: u16,
    h: u16,
) -> CarouselResult<vello_cpu::Image> {
    let (w, h) = (u32::from(w), u32::from(h));
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len2 = dx * dx + dy * dy;

    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    for y in 0..h {
        let ly = (f64::from(y) + 0.5) / scale;
        for x in 0..w {
            let lx = (f64::from(x) + 0.5) / scale;
            let t = if len2 <= f64::EPSILON {
                0.0
            } else {
                (((lx - start.x) * dx + (ly - start.y) * dy) / len2) as f32
            };
            let c = sample_stops(stops, t);
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&premul_rgba8([c.r, c.g, c.b, c.a]));
        }
    }
    rgba_premul_to_image(&bytes, w, h)
}

fn premul_rgba8(rgba: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = rgba;
    let a16 = u16::from(a);
    let premul = |c: u8| -> u8 { ((u16::from(c) * a16 + 127) / 255) as u8 };
    [premul(r), premul(g), premul(b), a]
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::core::Canvas,
        render::{filter::FilterPreset, gradient::parse_linear_gradient},
    };

    fn renderer(scale: f32) -> CpuRenderer {
        CpuRenderer::new(&FontBook::new(), scale).unwrap()
    }

    fn close(a: [u8; 4], b: [u8; 4], tol: i16) -> bool {
        a.iter()
            .zip(b.iter())
            .all(|(x, y)| (i16::from(*x) - i16::from(*y)).abs() <= tol)
    }

    #[test]
    fn solid_background_fills_every_pixel() {
        let mut slide = SlideRecord::with_text("s", "", "");
        slide.set_color_background("#ff0000");
        let frame = renderer(0.1).render_slide(&slide).unwrap();
        assert_eq!((frame.width, frame.height), (108, 108));
        assert_eq!(frame.data.len(), 108 * 108 * 4);
        for (x, y) in [(0, 0), (54, 54), (107, 107)] {
            assert_eq!(frame.pixel(x, y), Some([255, 0, 0, 255]));
        }
    }

    #[test]
    fn diagonal_gradient_runs_corner_to_corner() {
        let mut slide = SlideRecord::with_text("g", "", "");
        slide.set_gradient_background("linear-gradient(135deg, #667eea 0%, #764ba2 100%)");
        let frame = renderer(0.1).render_slide(&slide).unwrap();
        let tl = frame.pixel(0, 0).unwrap();
        let br = frame.pixel(107, 107).unwrap();
        assert!(close(tl, [0x66, 0x7e, 0xea, 255], 3), "{tl:?}");
        assert!(close(br, [0x76, 0x4b, 0xa2, 255], 3), "{br:?}");
    }

    #[test]
    fn scale_multiplies_output_size() {
        let slide = SlideRecord::with_text("s", "", "");
        let mut r = renderer(0.2);
        let frame = r.render_slide(&slide).unwrap();
        assert_eq!((frame.width, frame.height), (216, 216));
        assert_eq!(r.scale(), 0.2);
    }

    #[test]
    fn invalid_scale_is_rejected() {
        assert!(CpuRenderer::new(&FontBook::new(), 0.0).is_err());
        assert!(CpuRenderer::new(&FontBook::new(), f32::NAN).is_err());
        let err = CpuRenderer::new(&FontBook::new(), 60.0).unwrap_err();
        assert!(matches!(err, CarouselError::Validation(_)));
    }

    #[test]
    fn text_without_fonts_is_a_validation_error() {
        let slide = SlideRecord::with_text("t", "Hello", "");
        let err = renderer(0.1).render_slide(&slide).unwrap_err();
        assert!(matches!(err, CarouselError::Validation(_)));
    }

    #[test]
    fn filter_is_applied_to_output() {
        let plan = RenderPlan {
            canvas: Canvas::SLIDE,
            ops: vec![DrawOp::FillRect {
                rect: Rect::new(0.0, 0.0, 1080.0, 1080.0),
                paint: Paint::Solid(Rgba8::rgb(200, 40, 90)),
            }],
            filter: FilterPreset::Grayscale { contrast: 1.0 },
        };
        let frame = renderer(0.05).execute(&plan).unwrap();
        let [r, g, b, a] = frame.pixel(10, 10).unwrap();
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn sampling_interpolates_between_stops() {
        let spec = parse_linear_gradient("linear-gradient(90deg, #000000, #ffffff)").unwrap();
        assert_eq!(sample_stops(&spec.stops, -1.0), Rgba8::rgb(0, 0, 0));
        assert_eq!(sample_stops(&spec.stops, 0.5), Rgba8::rgb(128, 128, 128));
        assert_eq!(sample_stops(&spec.stops, 2.0), Rgba8::rgb(255, 255, 255));
    }

    #[test]
    fn unpremultiply_restores_straight_color() {
        let mut px = premul_rgba8([200, 100, 50, 128]).to_vec();
        unpremultiply_rgba8_in_place(&mut px);
        assert!(close([px[0], px[1], px[2], px[3]], [200, 100, 50, 128], 2));
    }
}

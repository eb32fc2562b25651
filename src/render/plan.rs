use crate::{
    assets::{
        color::parse_css_color,
        decode::{PreparedImage, decode_image_data_uri},
        text::{FontSpec, TextMeasure},
    },
    foundation::{
        core::{Affine, Canvas, Point, Rect, Rgba8},
        error::{CarouselError, CarouselResult},
    },
    render::{
        filter::FilterPreset,
        fit::place_image,
        gradient::{GradientStop, LinearGradientSpec, parse_linear_gradient},
        wrap::{split_hashtags, wrap_text},
    },
    slide::model::{
        DEFAULT_BACKGROUND_COLOR, Position, ResolvedBackground, SlideRecord, TextAlign, TextStyle,
    },
};

/// Horizontal padding on each side of wrapped text.
pub const TEXT_PADDING_PX: f64 = 80.0;
/// Line height multiplier for titles.
pub const TITLE_LINE_HEIGHT: f64 = 1.2;
/// Line height multiplier for body content.
pub const CONTENT_LINE_HEIGHT: f64 = 1.4;
/// Vertical position of the hashtag line, in percent of canvas height.
pub const HASHTAG_Y_PCT: f64 = 90.0;
/// Hashtag font size relative to the content font size.
pub const HASHTAG_SIZE_RATIO: f32 = 0.6;

const WHITE: Rgba8 = Rgba8::rgb(255, 255, 255);

/// Backend-agnostic description of one slide, in logical canvas pixels.
#[derive(Clone, Debug)]
pub struct RenderPlan {
    pub canvas: Canvas,
    /// Ops in paint order.
    pub ops: Vec<DrawOp>,
    /// Filter applied to the final pixels.
    pub filter: FilterPreset,
}

/// Fill style for shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba8),
    LinearGradient {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
}

/// Which slide field a text op came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextLayer {
    Emoji,
    Title,
    Content,
    Hashtags,
}

/// Draw operation emitted by [`compile_slide`].
#[derive(Clone, Debug)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    Image {
        image: PreparedImage,
        transform: Affine,
    },
    /// One already-wrapped line; `origin` is the top-left corner of its line box.
    Text {
        layer: TextLayer,
        text: String,
        font: FontSpec,
        color: Rgba8,
        origin: Point,
        line_height: f64,
    },
}

impl RenderPlan {
    /// Text ops of a given layer, in order.
    pub fn text_lines(&self, layer: TextLayer) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { layer: l, text, .. } if *l == layer => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `true` when any op draws text (and therefore needs a registered font).
    pub fn has_text(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, DrawOp::Text { .. }))
    }
}

/// Compile a slide into a [`RenderPlan`] on the fixed slide canvas.
#[tracing::instrument(skip_all, fields(slide = %slide.id))]
pub fn compile_slide(
    slide: &SlideRecord,
    measure: &mut dyn TextMeasure,
) -> CarouselResult<RenderPlan> {
    let canvas = Canvas::SLIDE;
    let mut ops = Vec::new();

    compile_background(slide, canvas, &mut ops)?;

    let max_width = (f64::from(canvas.width) - 2.0 * TEXT_PADDING_PX) as f32;

    if !slide.emoji.trim().is_empty() {
        let font = font_spec(&slide.title_style.font_family, slide.emoji_size)?;
        let line_height = f64::from(font.size_px) * TITLE_LINE_HEIGHT;
        push_block(
            &mut ops,
            measure,
            TextBlock {
                layer: TextLayer::Emoji,
                lines: vec![slide.emoji.trim().to_string()],
                font,
                color: WHITE,
                anchor: canvas.percent_to_px(slide.emoji_position.x, slide.emoji_position.y),
                align: TextAlign::Center,
                line_height,
            },
        )?;
    }

    push_wrapped(
        &mut ops,
        measure,
        TextLayer::Title,
        &slide.title,
        &slide.title_style,
        slide.title_position,
        TITLE_LINE_HEIGHT,
        max_width,
        canvas,
    )?;

    let split = split_hashtags(&slide.content);
    push_wrapped(
        &mut ops,
        measure,
        TextLayer::Content,
        &split.main,
        &slide.content_style,
        slide.content_position,
        CONTENT_LINE_HEIGHT,
        max_width,
        canvas,
    )?;

    if !split.hashtags.is_empty() {
        let font = font_spec(
            &slide.content_style.font_family,
            slide.content_style.font_size * HASHTAG_SIZE_RATIO,
        )?;
        let line_height = f64::from(font.size_px) * CONTENT_LINE_HEIGHT;
        push_block(
            &mut ops,
            measure,
            TextBlock {
                layer: TextLayer::Hashtags,
                lines: vec![split.hashtags],
                font,
                color: text_color(&slide.content_style).with_alpha_mul(0.8),
                anchor: canvas.percent_to_px(50.0, HASHTAG_Y_PCT),
                align: TextAlign::Center,
                line_height,
            },
        )?;
    }

    tracing::debug!(ops = ops.len(), "compiled slide plan");
    Ok(RenderPlan {
        canvas,
        ops,
        filter: slide.template.filter(),
    })
}

fn full_rect(canvas: Canvas) -> Rect {
    let (w, h) = canvas.size_f64();
    Rect::new(0.0, 0.0, w, h)
}

fn flat_paint(slide: &SlideRecord) -> Paint {
    let color = parse_css_color(slide.flat_color())
        .or_else(|| parse_css_color(DEFAULT_BACKGROUND_COLOR))
        .unwrap_or(WHITE);
    Paint::Solid(color)
}

fn compile_background(
    slide: &SlideRecord,
    canvas: Canvas,
    ops: &mut Vec<DrawOp>,
) -> CarouselResult<()> {
    let rect = full_rect(canvas);
    match slide.resolved_background() {
        ResolvedBackground::Color(c) => {
            let paint = match parse_css_color(c) {
                Some(color) => Paint::Solid(color),
                None => {
                    tracing::warn!(color = c, "unparsable background color, using default");
                    flat_paint(&SlideRecord::default())
                }
            };
            ops.push(DrawOp::FillRect { rect, paint });
        }
        ResolvedBackground::Gradient(g) => {
            let paint = match parse_linear_gradient(g) {
                Some(spec) if spec.stops.len() >= 2 => {
                    let (start, end) = spec.line(canvas);
                    Paint::LinearGradient {
                        start,
                        end,
                        stops: spec.stops,
                    }
                }
                Some(LinearGradientSpec { stops, .. }) if !stops.is_empty() => {
                    Paint::Solid(stops[0].color)
                }
                _ => {
                    tracing::warn!(gradient = g, "unparsable gradient, using flat color");
                    flat_paint(slide)
                }
            };
            ops.push(DrawOp::FillRect { rect, paint });
        }
        ResolvedBackground::Image(uri) => {
            let image = decode_image_data_uri(uri)?;
            let (w, h) = canvas.size_f64();
            let placement = place_image(
                slide.image_fit,
                f64::from(image.width),
                f64::from(image.height),
                w,
                h,
                slide.image_position.x,
                slide.image_position.y,
            );
            ops.push(DrawOp::FillRect {
                rect,
                paint: flat_paint(slide),
            });
            ops.push(DrawOp::Image {
                image,
                transform: placement.transform(),
            });
            let alpha = slide.template.image_overlay_alpha();
            if alpha > 0.0 {
                ops.push(DrawOp::FillRect {
                    rect,
                    paint: Paint::Solid(Rgba8::rgb(0, 0, 0).with_alpha_mul(alpha)),
                });
            }
        }
    }
    Ok(())
}

fn font_spec(family: &str, size_px: f32) -> CarouselResult<FontSpec> {
    if !size_px.is_finite() || size_px <= 0.0 {
        return Err(CarouselError::validation(format!(
            "font size must be finite and > 0 (got {size_px})"
        )));
    }
    Ok(FontSpec {
        family: family.to_string(),
        size_px,
    })
}

fn text_color(style: &TextStyle) -> Rgba8 {
    parse_css_color(&style.color).unwrap_or(WHITE)
}

struct TextBlock {
    layer: TextLayer,
    lines: Vec<String>,
    font: FontSpec,
    color: Rgba8,
    anchor: Point,
    align: TextAlign,
    line_height: f64,
}

#[allow(clippy::too_many_arguments)]
fn push_wrapped(
    ops: &mut Vec<DrawOp>,
    measure: &mut dyn TextMeasure,
    layer: TextLayer,
    text: &str,
    style: &TextStyle,
    position: Position,
    line_height_mul: f64,
    max_width: f32,
    canvas: Canvas,
) -> CarouselResult<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let font = font_spec(&style.font_family, style.font_size)?;
    let lines = wrap_text(measure, text, &font, max_width)?;
    let line_height = f64::from(font.size_px) * line_height_mul;
    push_block(
        ops,
        measure,
        TextBlock {
            layer,
            lines,
            font,
            color: text_color(style),
            anchor: canvas.percent_to_px(position.x, position.y),
            align: style.align,
            line_height,
        },
    )
}

/// Stack lines vertically centered on the anchor, aligning each horizontally.
fn push_block(
    ops: &mut Vec<DrawOp>,
    measure: &mut dyn TextMeasure,
    block: TextBlock,
) -> CarouselResult<()> {
    let total = block.line_height * block.lines.len() as f64;
    let top = block.anchor.y - total / 2.0;

    for (i, line) in block.lines.into_iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let width = f64::from(measure.measure(&line, &block.font)?);
        let x = match block.align {
            TextAlign::Left => block.anchor.x,
            TextAlign::Center => block.anchor.x - width / 2.0,
            TextAlign::Right => block.anchor.x - width,
        };
        ops.push(DrawOp::Text {
            layer: block.layer,
            text: line,
            font: block.font.clone(),
            color: block.color,
            origin: Point::new(x, top + block.line_height * i as f64),
            line_height: block.line_height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::decode::encode_data_uri,
        render::fit::FitMode,
        slide::{model::BackgroundType, template::TemplateTag},
    };

    struct Mono;

    impl TextMeasure for Mono {
        fn measure(&mut self, text: &str, font: &FontSpec) -> CarouselResult<f32> {
            Ok(text.chars().count() as f32 * font.size_px * 0.5)
        }
    }

    fn png_uri(w: u32, h: u32) -> String {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 200, 30, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        encode_data_uri("image/png", &buf)
    }

    #[test]
    fn gradient_slide_yields_two_stop_gradient() {
        let mut slide = SlideRecord::with_text("g", "", "");
        slide.background_type = Some(BackgroundType::Gradient);
        slide.gradient = Some("linear-gradient(135deg, #667eea 0%, #764ba2 100%)".into());

        let plan = compile_slide(&slide, &mut Mono).unwrap();
        let DrawOp::FillRect {
            paint: Paint::LinearGradient { start, end, stops },
            ..
        } = &plan.ops[0]
        else {
            panic!("expected gradient fill, got {:?}", plan.ops[0]);
        };
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].offset, 0.0);
        assert_eq!(stops[0].color, Rgba8::rgb(0x66, 0x7e, 0xea));
        assert_eq!(stops[1].offset, 1.0);
        assert_eq!(stops[1].color, Rgba8::rgb(0x76, 0x4b, 0xa2));
        assert!(start.x < end.x && start.y < end.y);
    }

    #[test]
    fn broken_gradient_falls_back_to_flat_color() {
        let mut slide = SlideRecord::with_text("g", "", "");
        slide.background_color = Some("#112233".into());
        slide.set_gradient_background("not a gradient");
        let plan = compile_slide(&slide, &mut Mono).unwrap();
        assert!(matches!(
            &plan.ops[0],
            DrawOp::FillRect { paint: Paint::Solid(c), .. } if *c == Rgba8::rgb(0x11, 0x22, 0x33)
        ));
    }

    #[test]
    fn hashtags_render_as_separate_line() {
        let slide = SlideRecord::with_text("h", "Title", "Hello #foo #bar");
        let plan = compile_slide(&slide, &mut Mono).unwrap();
        assert_eq!(plan.text_lines(TextLayer::Content), vec!["Hello"]);
        assert_eq!(plan.text_lines(TextLayer::Hashtags), vec!["#foo #bar"]);
        assert_eq!(plan.text_lines(TextLayer::Title), vec!["Title"]);
    }

    #[test]
    fn text_block_is_centered_on_anchor() {
        let slide = SlideRecord::with_text("c", "abcd", "");
        let plan = compile_slide(&slide, &mut Mono).unwrap();
        let origin = plan
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Text { origin, .. } => Some(*origin),
                _ => None,
            })
            .unwrap();
        // 4 chars * 64px * 0.5 = 128px wide, centered on x = 540.
        assert!((origin.x - (540.0 - 64.0)).abs() < 1e-9);
        // One 76.8px line centered on y = 35% of 1080.
        assert!((origin.y - (378.0 - 38.4)).abs() < 1e-9);
    }

    #[test]
    fn alignment_moves_line_origin() {
        let mut slide = SlideRecord::with_text("c", "abcd", "");
        slide.title_style.align = TextAlign::Right;
        let plan = compile_slide(&slide, &mut Mono).unwrap();
        let DrawOp::Text { origin, .. } = plan.ops.last().unwrap() else {
            panic!("expected text op");
        };
        assert!((origin.x - (540.0 - 128.0)).abs() < 1e-9);
    }

    #[test]
    fn image_background_emits_base_image_and_scrim() {
        let mut slide = SlideRecord::with_text("i", "", "");
        slide.set_image_background(png_uri(20, 10));
        slide.image_fit = FitMode::Cover;
        slide.template = TemplateTag::Noir;

        let plan = compile_slide(&slide, &mut Mono).unwrap();
        assert_eq!(plan.ops.len(), 3);
        let DrawOp::Image { transform, .. } = &plan.ops[1] else {
            panic!("expected image op");
        };
        let c = transform.as_coeffs();
        assert_eq!(c[0], 108.0);
        assert_eq!(c[3], 108.0);
        assert!(matches!(
            &plan.ops[2],
            DrawOp::FillRect { paint: Paint::Solid(c), .. } if c.a > 0 && c.r == 0
        ));
        assert_ne!(plan.filter, FilterPreset::None);
    }

    #[test]
    fn bad_image_uri_is_an_error() {
        let mut slide = SlideRecord::with_text("i", "", "");
        slide.set_image_background("data:image/png;base64,AAAA");
        assert!(compile_slide(&slide, &mut Mono).is_err());
    }

    #[test]
    fn zero_font_size_is_rejected() {
        let mut slide = SlideRecord::with_text("z", "Title", "");
        slide.title_style.font_size = 0.0;
        let err = compile_slide(&slide, &mut Mono).unwrap_err();
        assert!(matches!(err, CarouselError::Validation(_)));
    }

    #[test]
    fn emoji_is_drawn_above_title() {
        let mut slide = SlideRecord::with_text("e", "T", "");
        slide.emoji = "🚀".into();
        let plan = compile_slide(&slide, &mut Mono).unwrap();
        assert_eq!(plan.text_lines(TextLayer::Emoji), vec!["🚀"]);
        assert!(plan.has_text());
    }
}

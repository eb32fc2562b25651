use crate::{render::fit::FitMode, slide::template::TemplateTag};

/// Flat color used when a slide has no usable background.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#667eea";

/// Discriminator selecting which background field of a slide is authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    /// `backgroundColor`.
    Color,
    /// `gradient`.
    Gradient,
    /// `backgroundImage`.
    Image,
}

/// Background after resolving the discriminator against the stored fields.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedBackground<'a> {
    /// CSS color string.
    Color(&'a str),
    /// CSS `linear-gradient(...)` string.
    Gradient(&'a str),
    /// `data:` URI.
    Image(&'a str),
}

/// A point expressed in percent of canvas width/height.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// Horizontal position, 0..100.
    pub x: f64,
    /// Vertical position, 0..100.
    pub y: f64,
}

impl Position {
    /// Construct a position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn title_default() -> Self {
        Self::new(50.0, 35.0)
    }

    fn content_default() -> Self {
        Self::new(50.0, 60.0)
    }

    fn emoji_default() -> Self {
        Self::new(50.0, 15.0)
    }

    fn centered() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Horizontal text alignment relative to a layer's anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Anchor is the left edge.
    Left,
    /// Anchor is the center.
    #[default]
    Center,
    /// Anchor is the right edge.
    Right,
}

/// Font settings for one text field.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// CSS family list.
    pub font_family: String,
    /// Font size in logical pixels.
    pub font_size: f32,
    /// CSS color string.
    pub color: String,
    /// Alignment relative to the anchor.
    #[serde(default)]
    pub align: TextAlign,
}

impl TextStyle {
    fn title_default() -> Self {
        Self {
            font_family: "Inter, sans-serif".to_string(),
            font_size: 64.0,
            color: "#ffffff".to_string(),
            align: TextAlign::Center,
        }
    }

    fn content_default() -> Self {
        Self {
            font_size: 36.0,
            ..Self::title_default()
        }
    }
}

fn default_emoji_size() -> f32 {
    96.0
}

/// One carousel panel: background, text fields and their styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRecord {
    /// Opaque id, unique within a carousel.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub emoji: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_type: Option<BackgroundType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,

    #[serde(default)]
    pub image_fit: FitMode,
    /// Bias from center in percent, only used by [`FitMode::Cover`].
    #[serde(default = "Position::centered")]
    pub image_position: Position,

    #[serde(default = "Position::title_default")]
    pub title_position: Position,
    #[serde(default = "Position::content_default")]
    pub content_position: Position,
    #[serde(default = "Position::emoji_default")]
    pub emoji_position: Position,

    #[serde(default = "TextStyle::title_default")]
    pub title_style: TextStyle,
    #[serde(default = "TextStyle::content_default")]
    pub content_style: TextStyle,
    #[serde(default = "default_emoji_size")]
    pub emoji_size: f32,

    #[serde(default)]
    pub template: TemplateTag,
}

impl Default for SlideRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            content: String::new(),
            emoji: String::new(),
            background_type: None,
            background_color: None,
            gradient: None,
            background_image: None,
            image_fit: FitMode::default(),
            image_position: Position::centered(),
            title_position: Position::title_default(),
            content_position: Position::content_default(),
            emoji_position: Position::emoji_default(),
            title_style: TextStyle::title_default(),
            content_style: TextStyle::content_default(),
            emoji_size: default_emoji_size(),
            template: TemplateTag::default(),
        }
    }
}

impl SlideRecord {
    /// Slide with text and a flat background color.
    pub fn with_text(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Effective background type: the stored discriminator, else inferred from which fields are set.
    pub fn background_type(&self) -> BackgroundType {
        if let Some(t) = self.background_type {
            return t;
        }
        if non_blank(&self.background_image).is_some() {
            BackgroundType::Image
        } else if non_blank(&self.gradient).is_some() {
            BackgroundType::Gradient
        } else {
            BackgroundType::Color
        }
    }

    /// Resolve the background to draw.
    ///
    /// A discriminator pointing at an empty field falls back to the flat color.
    pub fn resolved_background(&self) -> ResolvedBackground<'_> {
        let color = || {
            ResolvedBackground::Color(
                non_blank(&self.background_color).unwrap_or(DEFAULT_BACKGROUND_COLOR),
            )
        };
        match self.background_type() {
            BackgroundType::Image => non_blank(&self.background_image)
                .map(ResolvedBackground::Image)
                .unwrap_or_else(color),
            BackgroundType::Gradient => non_blank(&self.gradient)
                .map(ResolvedBackground::Gradient)
                .unwrap_or_else(color),
            BackgroundType::Color => color(),
        }
    }

    /// Fallback flat color for this slide.
    pub fn flat_color(&self) -> &str {
        non_blank(&self.background_color).unwrap_or(DEFAULT_BACKGROUND_COLOR)
    }

    /// Switch to a flat color background.
    pub fn set_color_background(&mut self, color: impl Into<String>) {
        self.background_type = Some(BackgroundType::Color);
        self.background_color = Some(color.into());
    }

    /// Switch to a gradient background.
    pub fn set_gradient_background(&mut self, gradient: impl Into<String>) {
        self.background_type = Some(BackgroundType::Gradient);
        self.gradient = Some(gradient.into());
    }

    /// Switch to an image background.
    pub fn set_image_background(&mut self, data_uri: impl Into<String>) {
        self.background_type = Some(BackgroundType::Image);
        self.background_image = Some(data_uri.into());
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Partial update merged into a [`SlideRecord`] by the store.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlidePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub emoji: Option<String>,
    pub background_type: Option<BackgroundType>,
    pub background_color: Option<String>,
    pub gradient: Option<String>,
    pub background_image: Option<String>,
    pub image_fit: Option<FitMode>,
    pub image_position: Option<Position>,
    pub title_position: Option<Position>,
    pub content_position: Option<Position>,
    pub emoji_position: Option<Position>,
    pub title_style: Option<TextStyle>,
    pub content_style: Option<TextStyle>,
    pub emoji_size: Option<f32>,
    pub template: Option<TemplateTag>,
}

impl SlidePatch {
    /// Overwrite every field of `slide` that is set in the patch. The id is never changed.
    pub fn apply_to(self, slide: &mut SlideRecord) {
        fn set<T>(dst: &mut T, v: Option<T>) {
            if let Some(v) = v {
                *dst = v;
            }
        }
        fn set_opt<T>(dst: &mut Option<T>, v: Option<T>) {
            if v.is_some() {
                *dst = v;
            }
        }

        set(&mut slide.title, self.title);
        set(&mut slide.content, self.content);
        set(&mut slide.emoji, self.emoji);
        set_opt(&mut slide.background_type, self.background_type);
        set_opt(&mut slide.background_color, self.background_color);
        set_opt(&mut slide.gradient, self.gradient);
        set_opt(&mut slide.background_image, self.background_image);
        set(&mut slide.image_fit, self.image_fit);
        set(&mut slide.image_position, self.image_position);
        set(&mut slide.title_position, self.title_position);
        set(&mut slide.content_position, self.content_position);
        set(&mut slide.emoji_position, self.emoji_position);
        set(&mut slide.title_style, self.title_style);
        set(&mut slide.content_style, self.content_style);
        set(&mut slide.emoji_size, self.emoji_size);
        set(&mut slide.template, self.template);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn minimal_json_fills_defaults() {
        let s: SlideRecord =
            serde_json::from_value(json!({"title": "Hi", "content": "There"})).unwrap();
        assert_eq!(s.title, "Hi");
        assert_eq!(s.title_position, Position::new(50.0, 35.0));
        assert_eq!(s.content_style.font_size, 36.0);
        assert_eq!(s.template, TemplateTag::Classic);
        assert_eq!(s.image_fit, FitMode::Cover);
    }

    #[test]
    fn serializes_camel_case_and_skips_absent_backgrounds() {
        let s = SlideRecord::with_text("a", "t", "c");
        let v = serde_json::to_value(&s).unwrap();
        assert!(v.get("titlePosition").is_some());
        assert!(v.get("backgroundImage").is_none());
    }

    #[test]
    fn background_type_is_inferred_when_missing() {
        let mut s = SlideRecord::default();
        assert_eq!(s.background_type(), BackgroundType::Color);

        s.gradient = Some("linear-gradient(90deg, red, blue)".into());
        assert_eq!(s.background_type(), BackgroundType::Gradient);

        s.background_image = Some("data:image/png;base64,AAAA".into());
        assert_eq!(s.background_type(), BackgroundType::Image);
    }

    #[test]
    fn explicit_discriminator_beats_stale_fields() {
        let mut s = SlideRecord::default();
        s.set_image_background("data:image/png;base64,AAAA");
        s.set_color_background("#000000");
        assert_eq!(s.resolved_background(), ResolvedBackground::Color("#000000"));
        assert!(s.background_image.is_some());
    }

    #[test]
    fn discriminator_with_missing_field_falls_back_to_color() {
        let s = SlideRecord {
            background_type: Some(BackgroundType::Gradient),
            ..SlideRecord::default()
        };
        assert_eq!(
            s.resolved_background(),
            ResolvedBackground::Color(DEFAULT_BACKGROUND_COLOR)
        );
    }

    #[test]
    fn patch_merges_only_set_fields() {
        let mut s = SlideRecord::with_text("id-1", "old", "body");
        SlidePatch {
            title: Some("new".into()),
            template: Some(TemplateTag::Noir),
            ..SlidePatch::default()
        }
        .apply_to(&mut s);
        assert_eq!(s.id, "id-1");
        assert_eq!(s.title, "new");
        assert_eq!(s.content, "body");
        assert_eq!(s.template, TemplateTag::Noir);
    }
}

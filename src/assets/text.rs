use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::{
    core::Rgba8,
    error::{CarouselError, CarouselResult},
};

/// Font selection for a single run of text.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// CSS-style family list, e.g. `"Inter, sans-serif"`.
    pub family: String,
    /// Font size in logical pixels.
    pub size_px: f32,
}

/// Width measurement seam used by word wrapping and alignment.
pub trait TextMeasure {
    /// Advance width of `text` set in `font`, in logical pixels.
    fn measure(&mut self, text: &str, font: &FontSpec) -> CarouselResult<f32>;
}

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Raw font files available to the renderer.
#[derive(Clone, Debug, Default)]
pub struct FontBook {
    fonts: Vec<Arc<Vec<u8>>>,
}

impl FontBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every font file in `paths`.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> CarouselResult<Self> {
        let mut book = Self::new();
        for p in paths {
            let p = p.as_ref();
            let bytes =
                std::fs::read(p).with_context(|| format!("read font file '{}'", p.display()))?;
            book.add_bytes(bytes);
        }
        Ok(book)
    }

    /// Add one font file's bytes.
    pub fn add_bytes(&mut self, bytes: Vec<u8>) {
        self.fonts.push(Arc::new(bytes));
    }

    /// `true` when no font has been added.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<Vec<u8>>> {
        self.fonts.iter()
    }
}

#[derive(Clone)]
struct RegisteredFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Stateful helper for building Parley text layouts from registered font files.
///
/// Only explicitly registered fonts are visible; there is no system font discovery, so output is
/// identical across machines given the same font files.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    fonts: Vec<RegisteredFont>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts and no fonts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: Vec::new(),
        }
    }

    /// Construct an engine with every font of `book` registered.
    pub fn with_fonts(book: &FontBook) -> CarouselResult<Self> {
        let mut engine = Self::new();
        for bytes in book.iter() {
            engine.register_font(bytes)?;
        }
        Ok(engine)
    }

    /// Register a font file, returning its family name.
    pub fn register_font(&mut self, font_bytes: &Arc<Vec<u8>>) -> CarouselResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CarouselError::validation("no font families registered from font bytes")
        })?;

        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CarouselError::validation("registered font family has no name"))?
            .to_string();

        let data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
            0,
        );
        tracing::debug!(family = %family, "registered font");
        self.fonts.push(RegisteredFont {
            family: family.clone(),
            data,
        });
        Ok(family)
    }

    /// Pick the first family of a CSS family list that is registered, else the first font.
    fn resolve(&self, family_list: &str) -> CarouselResult<RegisteredFont> {
        let wanted = family_list
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|f| !f.is_empty());
        for name in wanted {
            if let Some(found) = self
                .fonts
                .iter()
                .find(|f| f.family.eq_ignore_ascii_case(name))
            {
                return Ok(found.clone());
            }
        }
        self.fonts.first().cloned().ok_or_else(|| {
            CarouselError::validation("no fonts registered; pass --font or set CAROUSEL_FONT")
        })
    }

    /// Shape a single unbroken line of text.
    ///
    /// Returns the layout and the font data glyph ids refer to.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &FontSpec,
        brush: TextBrushRgba8,
    ) -> CarouselResult<(parley::Layout<TextBrushRgba8>, vello_cpu::peniko::FontData)> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(CarouselError::validation(
                "font size must be finite and > 0",
            ));
        }
        let resolved = self.resolve(&font.family)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(resolved.family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok((layout, resolved.data))
    }
}

impl TextMeasure for TextLayoutEngine {
    fn measure(&mut self, text: &str, font: &FontSpec) -> CarouselResult<f32> {
        if text.is_empty() {
            return Ok(0.0);
        }
        let (layout, _) = self.layout_line(text, font, TextBrushRgba8::default())?;
        Ok(layout.width())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> FontSpec {
        FontSpec {
            family: "Inter".to_string(),
            size_px: 32.0,
        }
    }

    #[test]
    fn engine_without_fonts_reports_validation_error() {
        let mut engine = TextLayoutEngine::new();
        let err = engine.measure("hello", &spec()).unwrap_err();
        assert!(err.to_string().contains("no fonts registered"));
    }

    #[test]
    fn empty_text_measures_zero_without_fonts() {
        let mut engine = TextLayoutEngine::new();
        assert_eq!(engine.measure("", &spec()).unwrap(), 0.0);
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let mut engine = TextLayoutEngine::new();
        assert!(engine.register_font(&Arc::new(vec![0u8; 16])).is_err());
    }

    #[test]
    fn font_book_reports_missing_files() {
        let err = FontBook::from_paths(&["definitely/not/here.ttf"]).unwrap_err();
        assert!(err.to_string().contains("read font file"));
        assert!(FontBook::new().is_empty());
    }

    #[test]
    fn brush_from_rgba8() {
        let b = TextBrushRgba8::from(Rgba8::rgba(1, 2, 3, 4));
        assert_eq!(
            b,
            TextBrushRgba8 {
                r: 1,
                g: 2,
                b: 3,
                a: 4
            }
        );
    }
}

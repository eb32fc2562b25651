use crate::render::filter::FilterPreset;

/// Cosmetic template applied to a slide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateTag {
    /// Sepia toning with softened contrast.
    Vintage,
    /// Saturation boost.
    Vivid,
    /// Black and white with extra contrast.
    Noir,
    /// Lifted blacks, washed-out look.
    Fade,
    /// Warm color tint.
    Warm,
    /// No filter. Unknown tags land here too.
    #[default]
    #[serde(other)]
    Classic,
}

impl TemplateTag {
    /// Every template, in display order.
    pub const ALL: [TemplateTag; 6] = [
        TemplateTag::Classic,
        TemplateTag::Vintage,
        TemplateTag::Vivid,
        TemplateTag::Noir,
        TemplateTag::Fade,
        TemplateTag::Warm,
    ];

    /// Pixel filter run over the finished slide.
    pub fn filter(self) -> FilterPreset {
        match self {
            TemplateTag::Classic => FilterPreset::None,
            TemplateTag::Vintage => FilterPreset::Sepia {
                amount: 0.45,
                contrast: 0.9,
            },
            TemplateTag::Vivid => FilterPreset::Saturate { amount: 1.4 },
            TemplateTag::Noir => FilterPreset::Grayscale { contrast: 1.25 },
            TemplateTag::Fade => FilterPreset::Fade { lift: 0.12 },
            TemplateTag::Warm => FilterPreset::Tint {
                r: 1.08,
                g: 1.0,
                b: 0.88,
            },
        }
    }

    /// Gradient a fresh slide of this template starts with.
    ///
    /// Persisted snapshots omit gradients equal to this value and restore them on load.
    pub fn default_gradient(self) -> &'static str {
        match self {
            TemplateTag::Classic => "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
            TemplateTag::Vintage => "linear-gradient(135deg, #f6d365 0%, #fda085 100%)",
            TemplateTag::Vivid => {
                "linear-gradient(135deg, #f093fb 0%, #f5576c 50%, #4facfe 100%)"
            }
            TemplateTag::Noir => "linear-gradient(180deg, #232526 0%, #414345 100%)",
            TemplateTag::Fade => "linear-gradient(135deg, #e0c3fc 0%, #8ec5fc 100%)",
            TemplateTag::Warm => {
                "linear-gradient(45deg, #ff9a56 0%, #ff6a88 50%, #ff99ac 100%)"
            }
        }
    }

    /// Alpha of the black scrim drawn over image backgrounds so text stays legible.
    pub fn image_overlay_alpha(self) -> f32 {
        match self {
            TemplateTag::Noir => 0.45,
            TemplateTag::Fade => 0.15,
            _ => 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gradient::parse_linear_gradient;

    #[test]
    fn every_default_gradient_parses() {
        for tag in TemplateTag::ALL {
            let g = parse_linear_gradient(tag.default_gradient());
            assert!(g.is_some(), "{tag:?} default gradient must parse");
        }
    }

    #[test]
    fn unknown_tag_deserializes_as_classic() {
        let t: TemplateTag = serde_json::from_str("\"sparkle\"").unwrap();
        assert_eq!(t, TemplateTag::Classic);
        let t: TemplateTag = serde_json::from_str("\"noir\"").unwrap();
        assert_eq!(t, TemplateTag::Noir);
    }

    #[test]
    fn classic_has_no_filter() {
        assert_eq!(TemplateTag::Classic.filter(), FilterPreset::None);
        assert_ne!(TemplateTag::Vivid.filter(), FilterPreset::None);
    }

    #[test]
    fn slide_template_field_round_trips() {
        for tag in TemplateTag::ALL {
            let json = serde_json::to_string(&tag).unwrap();
            let back: TemplateTag = serde_json::from_str(&json).unwrap();
            assert_eq!(back, tag);
        }
        assert_eq!(serde_json::to_string(&TemplateTag::default()).unwrap(), "\"classic\"");
    }
}

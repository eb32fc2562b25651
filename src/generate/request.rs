use crate::foundation::error::{CarouselError, CarouselResult};

/// Largest slide count a single generation request may ask for.
pub const MAX_SLIDE_COUNT: u32 = 20;

/// Narrative structure requested from the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarouselMode {
    Listicle,
    Educational,
    Storytelling,
    Tips,
    Quotes,
    /// Anything unrecognized.
    #[default]
    #[serde(other)]
    General,
}

impl CarouselMode {
    /// Parse a mode name; unknown names map to [`CarouselMode::General`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "listicle" => Self::Listicle,
            "educational" => Self::Educational,
            "storytelling" => Self::Storytelling,
            "tips" => Self::Tips,
            "quotes" => Self::Quotes,
            _ => Self::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Listicle => "listicle",
            Self::Educational => "educational",
            Self::Storytelling => "storytelling",
            Self::Tips => "tips",
            Self::Quotes => "quotes",
            Self::General => "general",
        }
    }
}

fn default_slide_count() -> u32 {
    5
}

fn default_tone() -> String {
    "professional".to_string()
}

/// Input to carousel generation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselRequest {
    pub topic: String,
    #[serde(default)]
    pub mode: CarouselMode,
    #[serde(default = "default_slide_count")]
    pub slide_count: u32,
    #[serde(default = "default_tone")]
    pub tone: String,
}

impl CarouselRequest {
    /// Request with default mode, count and tone.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            mode: CarouselMode::default(),
            slide_count: default_slide_count(),
            tone: default_tone(),
        }
    }

    /// Reject blank topics and slide counts outside `1..=20`.
    pub fn validate(&self) -> CarouselResult<()> {
        if self.topic.trim().is_empty() {
            return Err(CarouselError::validation("topic must not be blank"));
        }
        if !(1..=MAX_SLIDE_COUNT).contains(&self.slide_count) {
            return Err(CarouselError::validation(format!(
                "slideCount must be within 1..={MAX_SLIDE_COUNT} (got {})",
                self.slide_count
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mode_maps_to_general() {
        let req: CarouselRequest =
            serde_json::from_str(r#"{"topic":"x","mode":"haiku","slideCount":3}"#).unwrap();
        assert_eq!(req.mode, CarouselMode::General);
        assert_eq!(req.tone, "professional");
        assert_eq!(CarouselMode::from_name(" Tips "), CarouselMode::Tips);
        assert_eq!(CarouselMode::from_name("nope"), CarouselMode::General);
    }

    #[test]
    fn validation_bounds() {
        let mut req = CarouselRequest::new("Rust");
        assert!(req.validate().is_ok());
        req.slide_count = 0;
        assert!(req.validate().is_err());
        req.slide_count = 21;
        assert!(req.validate().is_err());
        req.slide_count = 20;
        assert!(req.validate().is_ok());
        req.topic = "   ".into();
        assert!(matches!(req.validate(), Err(CarouselError::Validation(_))));
    }
}

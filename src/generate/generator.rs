use std::sync::Arc;

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    generate::{
        client::TextCompletion, parse::parse_slides, prompt::build_prompt,
        request::CarouselRequest,
    },
    slide::model::SlideRecord,
};

/// Drafts carousel slides from a topic through a [`TextCompletion`] backend.
#[derive(Clone)]
pub struct CarouselGenerator {
    completion: Arc<dyn TextCompletion>,
}

impl std::fmt::Debug for CarouselGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselGenerator").finish_non_exhaustive()
    }
}

impl CarouselGenerator {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    /// Validate, prompt, complete and parse.
    ///
    /// Slides get ids `slide-1..` in reply order and are capped at the requested count. Transport
    /// failures are errors; unparsable replies fall back to line-based slides.
    #[tracing::instrument(skip_all, fields(mode = request.mode.as_str(), count = request.slide_count))]
    pub async fn generate(&self, request: &CarouselRequest) -> CarouselResult<Vec<SlideRecord>> {
        request.validate()?;

        let prompt = build_prompt(request);
        let raw = self.completion.complete(&prompt).await?;

        let mut slides = parse_slides(&raw);
        if slides.is_empty() {
            return Err(CarouselError::generation(
                "completion reply contained no usable slides",
            ));
        }
        slides.truncate(request.slide_count as usize);
        for (i, slide) in slides.iter_mut().enumerate() {
            slide.id = format!("slide-{}", i + 1);
        }

        tracing::info!(slides = slides.len(), "generated carousel");
        Ok(slides)
    }
}

use crate::generate::request::{CarouselMode, CarouselRequest};

fn mode_guidance(mode: CarouselMode) -> &'static str {
    match mode {
        CarouselMode::Listicle => "Structure it as a numbered list, one item per slide.",
        CarouselMode::Educational => {
            "Teach the topic step by step, building from basics to a key takeaway."
        }
        CarouselMode::Storytelling => {
            "Tell a short story with a hook, rising tension and a resolution."
        }
        CarouselMode::Tips => "Give one concrete, actionable tip per slide.",
        CarouselMode::Quotes => "Use one memorable quote or punchy statement per slide.",
        CarouselMode::General => "Cover the topic in a clear, engaging sequence.",
    }
}

/// Prompt asking the model for a JSON slide list.
pub fn build_prompt(request: &CarouselRequest) -> String {
    format!(
        "Create an Instagram carousel about \"{topic}\".\n\
         Style: {mode}. {guidance}\n\
         Tone: {tone}.\n\
         Produce exactly {count} slides. The first slide is a hook, the last a call to action.\n\
         Keep titles under 8 words and content under 30 words. Add relevant hashtags to the last \
         slide's content.\n\
         Reply with JSON only, in this shape:\n\
         {{\"slides\":[{{\"title\":\"...\",\"content\":\"...\",\"emoji\":\"...\",\
         \"backgroundColor\":\"#rrggbb\"}}]}}",
        topic = request.topic.trim(),
        mode = request.mode.as_str(),
        guidance = mode_guidance(request.mode),
        tone = request.tone.trim(),
        count = request.slide_count,
    )
}

use std::sync::Arc;

use async_trait::async_trait;
use carousel_forge::{
    CarouselError, CarouselGenerator, CarouselMode, CarouselRequest, CarouselResult,
    GenerationConfig, HttpCompletionClient, TextCompletion,
};

struct Fixed(&'static str);

#[async_trait]
impl TextCompletion for Fixed {
    async fn complete(&self, _prompt: &str) -> CarouselResult<String> {
        Ok(self.0.to_string())
    }
}

const FIVE: &str = r##"Here is your carousel:
```json
{"slides": [
  {"title": "Hook", "content": "Stop scrolling", "emoji": "🛑", "backgroundColor": "#111111"},
  {"title": "Tip 1", "content": "Sleep well #health"},
  {"title": "Tip 2", "content": "Drink water"},
  {"title": "Tip 3", "content": "Move daily"},
  {"title": "Follow", "content": "For more #tips #wellness"}
]}
```"##;

#[tokio::test]
async fn stub_backend_yields_slides_in_order() {
    let generator = CarouselGenerator::new(Arc::new(Fixed(FIVE)));
    let request = CarouselRequest {
        topic: "healthy habits".into(),
        mode: CarouselMode::Tips,
        slide_count: 5,
        tone: "friendly".into(),
    };
    let slides = generator.generate(&request).await.unwrap();

    let titles: Vec<_> = slides.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Hook", "Tip 1", "Tip 2", "Tip 3", "Follow"]);
    let ids: Vec<_> = slides.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["slide-1", "slide-2", "slide-3", "slide-4", "slide-5"]);
    assert_eq!(slides[0].flat_color(), "#111111");
}

#[tokio::test]
async fn prose_reply_falls_back_to_line_slides() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let generator = CarouselGenerator::new(Arc::new(Fixed(
        "1. Plan your week\n2. Batch similar tasks\n3. Review on Friday",
    )));
    let slides = generator
        .generate(&CarouselRequest::new("productivity"))
        .await
        .unwrap();
    assert_eq!(slides.len(), 3);
    assert_eq!(slides[1].title, "Batch similar tasks");
    assert_eq!(slides[2].id, "slide-3");
}

#[tokio::test]
async fn unconfigured_http_backend_is_unavailable() {
    let client = HttpCompletionClient::new(&GenerationConfig::default());
    let generator = CarouselGenerator::new(Arc::new(client));
    let err = generator
        .generate(&CarouselRequest::new("anything"))
        .await
        .unwrap_err();
    assert!(matches!(err, CarouselError::BackendUnavailable(_)));
}

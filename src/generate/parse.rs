use std::sync::LazyLock;

use regex::Regex;

use crate::slide::model::SlideRecord;

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\n?(.*?)```").expect("valid regex")
});

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:#{1,6}\s+|[-*+•]\s+|\d+[.)]\s+|(?i:slide)\s*\d+\s*[:.)-]\s*)")
        .expect("valid regex")
});

/// Background colors cycled through by slides that did not get one.
pub const FALLBACK_COLORS: [&str; 5] = ["#667eea", "#764ba2", "#f093fb", "#4facfe", "#43e97b"];

/// Emoji used by line-based fallback slides.
pub const FALLBACK_EMOJI: &str = "✨";

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DraftSlide {
    title: String,
    content: String,
    emoji: String,
    background_color: String,
}

/// Turn raw model output into slides.
///
/// Tries, in order, the body of a fenced code block, the outermost `{...}` span and the outermost
/// `[...]` span, accepting either an object with a `slides` array or a bare array. The first
/// candidate yielding slides wins. When none does, every non-empty line becomes a slide. Never
/// fails; blank input yields no slides.
pub fn parse_slides(raw: &str) -> Vec<SlideRecord> {
    let drafts = json_candidates(raw)
        .into_iter()
        .filter_map(parse_drafts)
        .find(|d| !d.is_empty())
        .unwrap_or_default();

    if drafts.is_empty() {
        if !raw.trim().is_empty() {
            tracing::warn!("model reply had no parsable slide JSON, falling back to lines");
        }
        return fallback_slides(raw);
    }

    drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let mut slide = SlideRecord::with_text("", d.title.trim(), d.content.trim());
            slide.emoji = d.emoji.trim().to_string();
            let color = match d.background_color.trim() {
                "" => FALLBACK_COLORS[i % FALLBACK_COLORS.len()],
                c => c,
            };
            slide.set_color_background(color);
            slide
        })
        .collect()
}

fn json_candidates(raw: &str) -> Vec<&str> {
    let fenced = FENCED_JSON
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|body| !body.is_empty());
    [fenced, outermost_span(raw, '{', '}'), outermost_span(raw, '[', ']')]
        .into_iter()
        .flatten()
        .collect()
}

/// Slice from the first `open` to the last `close`.
fn outermost_span(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}

fn parse_drafts(json: &str) -> Option<Vec<DraftSlide>> {
    let value: serde_json::Value = serde_json::from_str(json).ok()?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut obj) => match obj.remove("slides") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };
    let drafts = items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<DraftSlide>(v).ok())
        .filter(|d| !d.title.trim().is_empty() || !d.content.trim().is_empty())
        .collect::<Vec<_>>();
    Some(drafts)
}

fn fallback_slides(raw: &str) -> Vec<SlideRecord> {
    raw.lines()
        .map(|l| LIST_MARKER.replace(l, "").trim().to_string())
        .filter(|l| !l.is_empty() && !l.starts_with("```"))
        .enumerate()
        .map(|(i, line)| {
            let mut slide = SlideRecord::with_text("", line, "");
            slide.emoji = FALLBACK_EMOJI.to_string();
            slide.set_color_background(FALLBACK_COLORS[i % FALLBACK_COLORS.len()]);
            slide
        })
        .collect()
}

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    assets::text::{FontSpec, TextMeasure},
    foundation::error::CarouselResult,
};

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").expect("valid regex"));

/// Greedy word wrap.
///
/// Words are accumulated into a line while the measured width stays within `max_width`; an
/// overflowing word starts a new line. Explicit newlines start a new paragraph and blank lines are
/// kept. A single word wider than `max_width` is emitted on its own line unbroken.
pub fn wrap_text(
    measure: &mut dyn TextMeasure,
    text: &str,
    font: &FontSpec,
    max_width: f32,
) -> CarouselResult<Vec<String>> {
    let mut lines = Vec::new();
    if text.trim().is_empty() {
        return Ok(lines);
    }

    for paragraph in text.trim().lines() {
        let mut line = String::new();
        let mut words = paragraph.split_whitespace().peekable();
        if words.peek().is_none() {
            lines.push(String::new());
            continue;
        }
        for word in words {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{line} {word}");
            if measure.measure(&candidate, font)? > max_width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Body text with hashtags removed, and the hashtags joined by single spaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitContent {
    /// Content without `#tag` tokens, whitespace-normalized per line.
    pub main: String,
    /// `#tag` tokens in order of appearance.
    pub hashtags: String,
}

/// Pull `#word` tokens out of slide content.
pub fn split_hashtags(content: &str) -> SplitContent {
    let hashtags = HASHTAG
        .find_iter(content)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    let stripped = HASHTAG.replace_all(content, "");
    let main = stripped
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    SplitContent { main, hashtags }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed advance per character, so widths are predictable without fonts.
    struct Mono(f32);

    impl TextMeasure for Mono {
        fn measure(&mut self, text: &str, font: &FontSpec) -> CarouselResult<f32> {
            Ok(text.chars().count() as f32 * self.0 * font.size_px / 10.0)
        }
    }

    fn font() -> FontSpec {
        FontSpec {
            family: "Mono".into(),
            size_px: 10.0,
        }
    }

    #[test]
    fn wraps_greedily() {
        let mut m = Mono(1.0);
        let lines = wrap_text(&mut m, "aa bb cc dd", &font(), 5.0).unwrap();
        assert_eq!(lines, vec!["aa bb", "cc dd"]);
    }

    #[test]
    fn no_line_exceeds_width_unless_single_word() {
        let mut m = Mono(1.0);
        let text = "the quick brown fox jumps over the extraordinarily lazy dog again and again";
        for max in [1.0f32, 4.0, 7.0, 12.0, 20.0, 200.0] {
            let lines = wrap_text(&mut m, text, &font(), max).unwrap();
            for line in &lines {
                let w = m.measure(line, &font()).unwrap();
                assert!(
                    w <= max || !line.contains(' '),
                    "line {line:?} width {w} > {max}"
                );
            }
            let rejoined = lines.join(" ");
            assert_eq!(rejoined, text);
        }
    }

    #[test]
    fn long_word_stays_whole() {
        let mut m = Mono(1.0);
        let lines = wrap_text(&mut m, "a supercalifragilistic b", &font(), 3.0).unwrap();
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn newlines_split_paragraphs() {
        let mut m = Mono(1.0);
        let lines = wrap_text(&mut m, "one\n\ntwo three", &font(), 100.0).unwrap();
        assert_eq!(lines, vec!["one", "", "two three"]);
    }

    #[test]
    fn blank_text_has_no_lines() {
        let mut m = Mono(1.0);
        assert!(wrap_text(&mut m, "  \n ", &font(), 10.0).unwrap().is_empty());
    }

    #[test]
    fn hashtags_are_split_from_content() {
        let s = split_hashtags("Hello #foo #bar");
        assert_eq!(s.main, "Hello");
        assert_eq!(s.hashtags, "#foo #bar");
    }

    #[test]
    fn hashtags_in_the_middle_and_multiline() {
        let s = split_hashtags("Grow #growth your\naudience #tips today");
        assert_eq!(s.main, "Grow your\naudience today");
        assert_eq!(s.hashtags, "#growth #tips");

        let s = split_hashtags("No tags here");
        assert_eq!(s.main, "No tags here");
        assert!(s.hashtags.is_empty());
    }
}

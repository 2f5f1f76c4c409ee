//! Banner text: length limit and forced line breaks.

use serde::{Deserialize, Serialize};

/// Maximum length of the title and of the subtitle, in characters.
pub const MAX_TEXT_CHARS: usize = 200;

/// Title and subtitle of a banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextContent {
    pub title: String,
    pub subtitle: String,
}

impl TextContent {
    pub fn set_title(&mut self, title: &str) {
        self.title = truncate_chars(title, MAX_TEXT_CHARS);
    }

    pub fn set_subtitle(&mut self, subtitle: &str) {
        self.subtitle = truncate_chars(subtitle, MAX_TEXT_CHARS);
    }

    pub fn sanitized(&self) -> Self {
        Self {
            title: truncate_chars(&self.title, MAX_TEXT_CHARS),
            subtitle: truncate_chars(&self.subtitle, MAX_TEXT_CHARS),
        }
    }
}

/// Keep at most `max` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Split on line feeds. Every `\n` yields exactly one break, so the result
/// always has `text.split('\n').count()` entries. A trailing `\r` is dropped
/// from each line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_truncated_to_200() {
        let mut text = TextContent::default();
        text.set_title(&"a".repeat(250));
        assert_eq!(text.title.chars().count(), 200);
    }

    #[test]
    fn test_truncate_multibyte() {
        let title = "Заголовок".repeat(30);
        let truncated = truncate_chars(&title, 200);
        assert_eq!(truncated.chars().count(), 200);
        assert!(title.starts_with(&truncated));
    }

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_chars("Hello", 200), "Hello");
        assert_eq!(truncate_chars("", 200), "");
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("Hello\nWorld"), vec!["Hello", "World"]);
        assert_eq!(split_lines("Sub"), vec!["Sub"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b", ""]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
    }

    #[test]
    fn test_sanitized() {
        let text = TextContent {
            title: "x".repeat(300),
            subtitle: "ok".into(),
        };
        let clean = text.sanitized();
        assert_eq!(clean.title.len(), 200);
        assert_eq!(clean.subtitle, "ok");
    }
}

//! Banner color themes.

use serde::{Deserialize, Serialize};

/// Identifier of a built-in theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    White,
    #[default]
    Blue,
    Black,
}

/// Colors (hex strings) and the image prompt template of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeConfig {
    pub id: ThemeId,
    pub background_start: &'static str,
    pub background_end: &'static str,
    pub title_color: &'static str,
    pub subtitle_color: &'static str,
    pub subtitle_background_color: &'static str,
    pub subtitle_color_on_background: &'static str,
    /// Title color while the subtitle badge is shown.
    pub title_color_on_subtitle_background: &'static str,
    /// Prompt template; `{prompt}` is replaced by the user's text.
    pub prompt_template: &'static str,
}

const WHITE: ThemeConfig = ThemeConfig {
    id: ThemeId::White,
    background_start: "#E8E8E8",
    background_end: "#FFFFFF",
    title_color: "#000000",
    subtitle_color: "#0065FF",
    subtitle_background_color: "#0065FF",
    subtitle_color_on_background: "#FFFFFF",
    title_color_on_subtitle_background: "#FFFFFF",
    prompt_template: "3D illustration of {prompt}, isolated object, soft studio light, \
                      light gray and electric blue accents, no text",
};

const BLUE: ThemeConfig = ThemeConfig {
    id: ThemeId::Blue,
    background_start: "#0065FF",
    background_end: "#61A4FF",
    title_color: "#FFFFFF",
    subtitle_color: "#BFFF44",
    subtitle_background_color: "#BFFF44",
    subtitle_color_on_background: "#000000",
    title_color_on_subtitle_background: "#000000",
    prompt_template: "3D illustration of {prompt}, isolated object, soft studio light, \
                      white and lime accents on a blue mood, no text",
};

const BLACK: ThemeConfig = ThemeConfig {
    id: ThemeId::Black,
    background_start: "#010205",
    background_end: "#433100",
    title_color: "#FFFFFF",
    subtitle_color: "#E0A500",
    subtitle_background_color: "#E0A500",
    subtitle_color_on_background: "#000000",
    title_color_on_subtitle_background: "#000000",
    prompt_template: "3D illustration of {prompt}, isolated object, dramatic rim light, \
                      black and gold accents, no text",
};

impl ThemeId {
    pub const ALL: [ThemeId; 3] = [ThemeId::White, ThemeId::Blue, ThemeId::Black];

    pub fn config(self) -> &'static ThemeConfig {
        match self {
            ThemeId::White => &WHITE,
            ThemeId::Blue => &BLUE,
            ThemeId::Black => &BLACK,
        }
    }
}

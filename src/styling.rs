use std::io::IsTerminal;

use once_cell::sync::Lazy;
pub use owo_colors::Style;
use owo_colors::OwoColorize;

static STDOUT_SUPPORTS_COLOR: Lazy<bool> =
    Lazy::new(|| std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal());

/// Maps a style plus text to the string that ends up in the output stream.
///
/// Implementations are picked once, when the [crate::LineWriter] is built, so emitters never
/// need to ask whether the destination understands escape codes.
pub trait Styler: Send + Sync {
    fn paint(&self, style: Style, text: &str) -> String;
}

/// Renders styles as ANSI escape sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct Colored;

impl Styler for Colored {
    fn paint(&self, style: Style, text: &str) -> String {
        text.style(style).to_string()
    }
}

/// Returns the text untouched. Hidden markers stay as their literal characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct Plain;

impl Styler for Plain {
    fn paint(&self, _style: Style, text: &str) -> String {
        text.to_string()
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stdout is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => *STDOUT_SUPPORTS_COLOR,
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }

    pub fn styler(self) -> Box<dyn Styler> {
        if self.enabled() {
            Box::new(Colored)
        } else {
            Box::new(Plain)
        }
    }
}

pub(crate) mod styles {
    use super::Style;

    pub fn hidden() -> Style {
        Style::new().hidden()
    }

    pub fn bold() -> Style {
        Style::new().bold()
    }

    pub fn dim() -> Style {
        Style::new().dimmed()
    }

    pub fn dim_bold() -> Style {
        Style::new().dimmed().bold()
    }

    pub fn grey() -> Style {
        Style::new().bright_black()
    }

    pub fn cyan() -> Style {
        Style::new().cyan()
    }

    pub fn green() -> Style {
        Style::new().green()
    }

    pub fn red() -> Style {
        Style::new().red()
    }

    pub fn yellow() -> Style {
        Style::new().yellow()
    }

    pub fn red_bold() -> Style {
        Style::new().red().bold()
    }

    pub fn yellow_bold() -> Style {
        Style::new().yellow().bold()
    }

    pub fn green_bold() -> Style {
        Style::new().green().bold()
    }

    pub fn fail_label() -> Style {
        Style::new().red().bold().reversed()
    }

    pub fn pass_label() -> Style {
        Style::new().green().bold().reversed()
    }
}

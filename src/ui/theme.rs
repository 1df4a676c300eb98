//! Terminal styles for catalog output

use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles by role: status lines, then the parts of a concept
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub label: Style,
    pub concept: Style,
    pub attribute: Style,
    pub inherited: Style,
    pub link: Style,
    pub mapping: Style,
}

impl Theme {
    /// Colored when stdout is a terminal and colors are not disabled
    pub fn detect() -> Self {
        if console::Term::stdout().is_term() && console::colors_enabled() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            label: Style::new().white().dimmed(),
            concept: Style::new().blue().bold(),
            attribute: Style::new().green(),
            inherited: Style::new().bright_black().italic(),
            link: Style::new().magenta(),
            mapping: Style::new().yellow(),
        }
    }

    pub fn plain() -> Self {
        let none = Style::new();
        Self {
            header: none,
            success: none,
            error: none,
            warn: none,
            label: none,
            concept: none,
            attribute: none,
            inherited: none,
            link: none,
            mapping: none,
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use owo_colors::OwoColorize;

    #[test]
    fn test_plain_theme_adds_no_escapes() {
        let plain = Theme::plain();
        assert_eq!("Person".style(plain.concept).to_string(), "Person");
        assert_ne!("Person".style(Theme::colored().concept).to_string(), "Person");
    }
}

//! Theme colors for the analyzer view
//! Defaults follow a pink/purple palette; any color can be overridden from config.

use ratatui::style::Color;

use crate::config::ThemeOverrides;

/// Theme colors for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub accent: Color,      // Focused borders, button, sentiment label
    pub highlight: Color,   // Confidence score, selected option
    pub danger: Color,      // Error results
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Placeholder, hints
    pub inactive: Color,    // Unfocused borders, disabled button
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(244, 114, 182),   // #f472b6
            highlight: Color::Rgb(192, 132, 252), // #c084fc
            danger: Color::Rgb(243, 139, 168),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(147, 153, 178),
            inactive: Color::Rgb(88, 91, 112),
        }
    }
}

impl Theme {
    /// Build the theme from config overrides, keeping defaults for anything unset or unparseable
    pub fn from_overrides(overrides: &ThemeOverrides) -> Self {
        let base = Self::default();
        let pick = |value: &Option<String>, fallback: Color| {
            value
                .as_deref()
                .and_then(|v| {
                    let parsed = Self::parse_hex_color(v);
                    if parsed.is_none() {
                        tracing::warn!("Ignoring invalid theme color: {}", v);
                    }
                    parsed
                })
                .unwrap_or(fallback)
        };

        Self {
            accent: pick(&overrides.accent, base.accent),
            highlight: pick(&overrides.highlight, base.highlight),
            danger: pick(&overrides.danger, base.danger),
            text: pick(&overrides.text, base.text),
            text_dim: pick(&overrides.text_dim, base.text_dim),
            inactive: pick(&overrides.inactive, base.inactive),
        }
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(Theme::parse_hex_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(Theme::parse_hex_color("fff"), Some(Color::Rgb(255, 255, 255)));
        assert_eq!(Theme::parse_hex_color("#12345"), None);
        assert_eq!(Theme::parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_overrides_replace_only_valid_colors() {
        let overrides = ThemeOverrides {
            accent: Some("#000000".to_string()),
            danger: Some("not-a-color".to_string()),
            ..Default::default()
        };

        let theme = Theme::from_overrides(&overrides);
        let defaults = Theme::default();
        assert_eq!(theme.accent, Color::Rgb(0, 0, 0));
        assert_eq!(theme.danger, defaults.danger);
        assert_eq!(theme.text, defaults.text);
    }
}

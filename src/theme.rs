use serde::Deserialize;
use tui::style::Color;

/// Theme preference held in settings.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    System,
}

impl ThemeMode {
    pub fn label(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
            ThemeMode::System => ThemeMode::Light,
        }
    }
}

/// Source of the platform's light/dark preference.
pub trait AppearanceProbe {
    fn prefers_dark(&self) -> bool;
}

/// Reads the COLORFGBG convention ("<fg>;<bg>") that terminals export.
/// Background colors 0-6 and 8 are the dark half of the ANSI palette; an
/// absent or unparsable value is treated as a dark terminal.
pub struct TerminalAppearance;

impl AppearanceProbe for TerminalAppearance {
    fn prefers_dark(&self) -> bool {
        let Ok(value) = std::env::var("COLORFGBG") else {
            return true;
        };
        match value.rsplit(';').next().and_then(|bg| bg.trim().parse::<u8>().ok()) {
            Some(bg) => bg < 7 || bg == 8,
            None => true,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResolvedTheme {
    Light,
    Dark,
}

/// Colors used by every render function.
#[derive(Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub highlight: Color,
    pub danger: Color,
    pub background: Color,
}

/// Resolves the theme setting into a concrete palette. `System` consults the
/// appearance probe on every resolve, so the app tracks preference changes
/// live instead of snapshotting once at startup.
pub struct ThemeEngine {
    probe: Box<dyn AppearanceProbe>,
    resolved: ResolvedTheme,
}

impl ThemeEngine {
    pub fn new(probe: Box<dyn AppearanceProbe>, mode: ThemeMode) -> Self {
        let mut engine = ThemeEngine {
            probe,
            resolved: ResolvedTheme::Dark,
        };
        engine.resolve(mode);
        engine
    }

    pub fn resolve(&mut self, mode: ThemeMode) {
        self.resolved = match mode {
            ThemeMode::Light => ResolvedTheme::Light,
            ThemeMode::Dark => ResolvedTheme::Dark,
            ThemeMode::System => {
                if self.probe.prefers_dark() {
                    ResolvedTheme::Dark
                } else {
                    ResolvedTheme::Light
                }
            }
        };
    }

    pub fn resolved(&self) -> ResolvedTheme {
        self.resolved
    }

    pub fn palette(&self) -> Palette {
        match self.resolved {
            ResolvedTheme::Dark => Palette {
                text: Color::White,
                dim: Color::Gray,
                accent: Color::Cyan,
                highlight: Color::Yellow,
                danger: Color::Red,
                background: Color::Black,
            },
            ResolvedTheme::Light => Palette {
                text: Color::Black,
                dim: Color::DarkGray,
                accent: Color::Blue,
                highlight: Color::Magenta,
                danger: Color::Red,
                background: Color::White,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(bool);

    impl AppearanceProbe for Fixed {
        fn prefers_dark(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn explicit_modes_ignore_the_probe() {
        let mut engine = ThemeEngine::new(Box::new(Fixed(true)), ThemeMode::Light);
        assert_eq!(engine.resolved(), ResolvedTheme::Light);
        engine.resolve(ThemeMode::Dark);
        assert_eq!(engine.resolved(), ResolvedTheme::Dark);
    }

    #[test]
    fn system_mode_follows_the_probe() {
        let engine = ThemeEngine::new(Box::new(Fixed(false)), ThemeMode::System);
        assert_eq!(engine.resolved(), ResolvedTheme::Light);
        let engine = ThemeEngine::new(Box::new(Fixed(true)), ThemeMode::System);
        assert_eq!(engine.resolved(), ResolvedTheme::Dark);
    }

    #[test]
    fn cycling_visits_every_mode() {
        let mode = ThemeMode::Light;
        assert_eq!(mode.cycled(), ThemeMode::Dark);
        assert_eq!(mode.cycled().cycled(), ThemeMode::System);
        assert_eq!(mode.cycled().cycled().cycled(), ThemeMode::Light);
    }
}

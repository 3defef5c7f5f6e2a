//! Interpreter settings and the `.plixyrc` loader.
//!
//! Every constant the command handlers use (window geometry, default font,
//! text position, highlight colours) lives in [`Settings`].  A settings file
//! is a list of `name = value` lines:
//!
//! ```text
//! ; comments start with ';' or '#'
//! font_family = "Courier"
//! window_width = 640
//! ```
//!
//! | Key | Default |
//! |-----|---------|
//! | `window_title` | `Plixy Window` |
//! | `window_width` / `window_height` | `500` / `360` |
//! | `window_background` | `white` |
//! | `font_family` / `font_size` | `Arial` / `16` |
//! | `text_x` / `text_y` | `250` / `180` |
//! | `text_color` | `black` |
//! | `background_color` | `lightblue` |
//! | `textbox_color` | `lightyellow` |
//! | `button_color` | `lightgreen` |
//! | `scroll_lines` | `79` |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::surface::{Font, WindowOptions};

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Defaults used by the command handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub window_background: String,
    pub font_family: String,
    pub font_size: u32,
    pub text_x: i32,
    pub text_y: i32,
    pub text_color: String,
    pub background_color: String,
    pub textbox_color: String,
    pub button_color: String,
    /// Placeholder lines in a new scroll area.
    pub scroll_lines: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            window_title: "Plixy Window".into(),
            window_width: 500,
            window_height: 360,
            window_background: "white".into(),
            font_family: "Arial".into(),
            font_size: 16,
            text_x: 250,
            text_y: 180,
            text_color: "black".into(),
            background_color: "lightblue".into(),
            textbox_color: "lightyellow".into(),
            button_color: "lightgreen".into(),
            scroll_lines: 79,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a window created by `let window.run.window.play = blank`.
    pub fn window_options(&self) -> WindowOptions {
        WindowOptions {
            title: self.window_title.clone(),
            width: self.window_width,
            height: self.window_height,
            background: self.window_background.clone(),
        }
    }

    /// The font a fresh session starts with.
    pub fn default_font(&self) -> Font {
        Font {
            family: self.font_family.clone(),
            size: self.font_size,
        }
    }

    /// Parse a settings string on top of the defaults.
    ///
    /// Bad lines are reported and skipped; the remaining lines still apply.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut settings = Settings::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                errors.push(ConfigError { line: lineno, message: format!("expected 'name = value', got '{line}'") });
                continue;
            };
            if let Err(message) = settings.apply(key.trim(), unquote(value.trim())) {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        for e in &errors {
            log::warn!("settings {e}");
        }
        (settings, errors)
    }

    /// Read and parse a settings file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        log::info!("loading settings from {}", path.display());
        Ok(Self::load_str(&s))
    }

    /// Set one key.  Returns a message for unknown keys and bad values.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "window_title" => self.window_title = value.to_owned(),
            "window_width" => self.window_width = parse_num(key, value)?,
            "window_height" => self.window_height = parse_num(key, value)?,
            "window_background" => self.window_background = value.to_owned(),
            "font_family" => self.font_family = value.to_owned(),
            "font_size" => self.font_size = parse_num(key, value)?,
            "text_x" => self.text_x = parse_num(key, value)?,
            "text_y" => self.text_y = parse_num(key, value)?,
            "text_color" => self.text_color = value.to_owned(),
            "background_color" => self.background_color = value.to_owned(),
            "textbox_color" => self.textbox_color = value.to_owned(),
            "button_color" => self.button_color = value.to_owned(),
            "scroll_lines" => self.scroll_lines = parse_num(key, value)?,
            _ => return Err(format!("unknown setting '{key}'")),
        }
        Ok(())
    }
}

/// Search `~/.plixyrc`, `~/plixyrc`, `./.plixyrc`, `./plixyrc` in order.
pub fn find_user_config() -> Option<PathBuf> {
    let home = std::env::var("HOME").unwrap_or_default();
    [
        format!("{home}/.plixyrc"),
        format!("{home}/plixyrc"),
        "./.plixyrc".to_owned(),
        "./plixyrc".to_owned(),
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

fn parse_num<T: FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{key}: '{value}' is not a valid number"))
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_playground() {
        let s = Settings::default();
        assert_eq!(s.window_options().title, "Plixy Window");
        assert_eq!((s.window_width, s.window_height), (500, 360));
        assert_eq!(s.default_font(), Font { family: "Arial".into(), size: 16 });
        assert_eq!((s.text_x, s.text_y), (250, 180));
    }

    #[test]
    fn load_overrides() {
        let (s, errs) = Settings::load_str(
            "; my settings\n\
             # another comment\n\
             font_family = \"Courier New\"\n\
             window_width=640\n\
             button_color = orange\n",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(s.font_family, "Courier New");
        assert_eq!(s.window_width, 640);
        assert_eq!(s.button_color, "orange");
        assert_eq!(s.window_height, 360);
    }

    #[test]
    fn bad_lines_reported_with_line_numbers() {
        let (s, errs) = Settings::load_str("font_size = big\nnonsense\ncolour = red\ntext_x = -5\n");
        assert_eq!(errs.len(), 3);
        assert_eq!(errs[0].line, 1);
        assert!(errs[0].message.contains("font_size"));
        assert_eq!(errs[1].line, 2);
        assert_eq!(errs[2].to_string(), "line 3: unknown setting 'colour'");
        assert_eq!(s.font_size, 16);
        assert_eq!(s.text_x, -5);
    }

    #[test]
    fn load_file_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "window_title = Sandbox").unwrap();
        let (s, errs) = Settings::load_file(f.path()).unwrap();
        assert!(errs.is_empty());
        assert_eq!(s.window_title, "Sandbox");
    }

    #[test]
    fn load_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load_file(&dir.path().join("absent")).is_err());
    }
}

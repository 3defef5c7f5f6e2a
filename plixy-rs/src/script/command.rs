//! Script line classification.
//!
//! A Plixy line is not tokenised.  Each command kind is recognised by a
//! literal prefix followed by a structural check on the whole line: either a
//! regex that extracts the arguments, or a marker substring.  Kinds are tried
//! in a fixed priority order and the first complete match wins.
//!
//! | Kind | Prefix | Shape |
//! |------|--------|-------|
//! | print | `print ` | rest of the line is the expression |
//! | let | `let ` | `let <dotted.path> = <expr>` |
//! | draw-text | `local print` | `local print = "<text>" = print` |
//! | set-font | `local font` | `local font = "<name>" local.print` |
//! | create-button | `local button` | `local button = create = "<text>" print` |
//! | create-textbox | `local text` | `local text = "<text>" here = textbox` |
//! | create-scroll-area | `local scroll` | contains `weel = print` |
//! | enable-ai | `local think` | contains `create.ai.print` |
//! | apply-color | `local color` | `local color = "<spec>" .run` |
//! | set-title | `local title` | `local title = "<text>" of window.run` |
//!
//! A line whose prefix matches but whose shape does not keeps going down the
//! table; if nothing else matches it is [`Command::Unknown`].

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

// ── CommandKind ───────────────────────────────────────────────────────────────

/// The kinds of command a line can hold, in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Print,
    Let,
    DrawText,
    SetFont,
    CreateButton,
    CreateTextbox,
    CreateScrollArea,
    EnableAi,
    ApplyColor,
    SetTitle,
}

impl CommandKind {
    /// Every kind, in the order lines are tested against them.
    pub const ALL: &'static [CommandKind] = &[
        CommandKind::Print,
        CommandKind::Let,
        CommandKind::DrawText,
        CommandKind::SetFont,
        CommandKind::CreateButton,
        CommandKind::CreateTextbox,
        CommandKind::CreateScrollArea,
        CommandKind::EnableAi,
        CommandKind::ApplyColor,
        CommandKind::SetTitle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Print => "print",
            CommandKind::Let => "let",
            CommandKind::DrawText => "draw-text",
            CommandKind::SetFont => "set-font",
            CommandKind::CreateButton => "create-button",
            CommandKind::CreateTextbox => "create-textbox",
            CommandKind::CreateScrollArea => "create-scroll-area",
            CommandKind::EnableAi => "enable-ai",
            CommandKind::ApplyColor => "apply-color",
            CommandKind::SetTitle => "set-title",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            CommandKind::Print => "print ",
            CommandKind::Let => "let ",
            CommandKind::DrawText => "local print",
            CommandKind::SetFont => "local font",
            CommandKind::CreateButton => "local button",
            CommandKind::CreateTextbox => "local text",
            CommandKind::CreateScrollArea => "local scroll",
            CommandKind::EnableAi => "local think",
            CommandKind::ApplyColor => "local color",
            CommandKind::SetTitle => "local title",
        }
    }

    fn shape(self) -> ShapeSrc {
        match self {
            CommandKind::Print => ShapeSrc::Rest,
            CommandKind::Let => ShapeSrc::Regex(r"^let\s+([\w.]+)\s*=\s*(.+)"),
            CommandKind::DrawText => ShapeSrc::Regex(r#"^local\s+print\s*=\s*"(.*)"\s*=\s*print"#),
            CommandKind::SetFont => ShapeSrc::Regex(r#"^local\s+font\s*=\s*"(.*)"\s*local\.print"#),
            CommandKind::CreateButton => {
                ShapeSrc::Regex(r#"^local\s+button\s*=\s*create\s*=\s*"(.*)"\s*print"#)
            }
            CommandKind::CreateTextbox => {
                ShapeSrc::Regex(r#"^local\s+text\s*=\s*"(.*)"\s*here\s*=\s*textbox"#)
            }
            CommandKind::CreateScrollArea => ShapeSrc::Marker("weel = print"),
            CommandKind::EnableAi => ShapeSrc::Marker("create.ai.print"),
            CommandKind::ApplyColor => ShapeSrc::Regex(r#"^local\s+color\s*=\s*"(.*)"\s*\.run"#),
            CommandKind::SetTitle => {
                ShapeSrc::Regex(r#"^local\s+title\s*=\s*"(.*)"\s*of\s*window\.run"#)
            }
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Command ───────────────────────────────────────────────────────────────────

/// A classified script line with its extracted arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Print { expr: &'a str },
    Let { path: &'a str, expr: &'a str },
    DrawText { text: &'a str },
    SetFont { family: &'a str },
    CreateButton { label: &'a str },
    CreateTextbox { text: &'a str },
    CreateScrollArea,
    EnableAi,
    ApplyColor { spec: &'a str },
    SetTitle { title: &'a str },
    /// No kind matched.
    Unknown,
}

impl Command<'_> {
    /// The kind of a recognised command; `None` for [`Command::Unknown`].
    pub fn kind(&self) -> Option<CommandKind> {
        Some(match self {
            Command::Print { .. } => CommandKind::Print,
            Command::Let { .. } => CommandKind::Let,
            Command::DrawText { .. } => CommandKind::DrawText,
            Command::SetFont { .. } => CommandKind::SetFont,
            Command::CreateButton { .. } => CommandKind::CreateButton,
            Command::CreateTextbox { .. } => CommandKind::CreateTextbox,
            Command::CreateScrollArea => CommandKind::CreateScrollArea,
            Command::EnableAi => CommandKind::EnableAi,
            Command::ApplyColor { .. } => CommandKind::ApplyColor,
            Command::SetTitle { .. } => CommandKind::SetTitle,
            Command::Unknown => return None,
        })
    }
}

// ── CommandSet ────────────────────────────────────────────────────────────────

// Uncompiled shape, as written in the table above.
enum ShapeSrc {
    Rest,
    Regex(&'static str),
    Marker(&'static str),
}

enum Shape {
    Rest,
    Regex(Regex),
    Marker(&'static str),
}

/// The compiled classification table.
pub struct CommandSet {
    entries: Vec<(CommandKind, Shape)>,
}

impl fmt::Debug for CommandSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(kind, _)| kind))
            .finish()
    }
}

impl CommandSet {
    /// Compile every shape in [`CommandKind::ALL`] order.
    pub fn new() -> Result<Self, regex::Error> {
        let entries = CommandKind::ALL
            .iter()
            .map(|&kind| -> Result<(CommandKind, Shape), regex::Error> {
                let shape = match kind.shape() {
                    ShapeSrc::Rest => Shape::Rest,
                    ShapeSrc::Regex(src) => Shape::Regex(Regex::new(src)?),
                    ShapeSrc::Marker(m) => Shape::Marker(m),
                };
                Ok((kind, shape))
            })
            .collect::<Result<_, regex::Error>>()?;
        Ok(Self { entries })
    }

    /// The process-wide compiled table.
    pub fn shared() -> Result<&'static CommandSet, regex::Error> {
        static SHARED: OnceLock<Result<CommandSet, regex::Error>> = OnceLock::new();
        SHARED.get_or_init(CommandSet::new).as_ref().map_err(Clone::clone)
    }

    /// Classify a trimmed script line.
    pub fn classify<'a>(&self, line: &'a str) -> Command<'a> {
        for (kind, shape) in &self.entries {
            let Some(rest) = line.strip_prefix(kind.prefix()) else { continue };
            let matched = match shape {
                Shape::Rest => Some(build(*kind, &[rest])),
                Shape::Marker(m) => line.contains(m).then(|| build(*kind, &[])),
                Shape::Regex(re) => re.captures(line).map(|caps| {
                    let args: Vec<&'a str> = caps
                        .iter()
                        .skip(1)
                        .map(|m| m.map_or("", |m| m.as_str()))
                        .collect();
                    build(*kind, &args)
                }),
            };
            match matched {
                Some(cmd) => return cmd,
                None => log::debug!("{kind} prefix matched but shape did not: {line:?}"),
            }
        }
        Command::Unknown
    }
}

fn build<'a>(kind: CommandKind, args: &[&'a str]) -> Command<'a> {
    let arg = |i: usize| args.get(i).copied().unwrap_or_default();
    match kind {
        CommandKind::Print => Command::Print { expr: arg(0) },
        CommandKind::Let => Command::Let { path: arg(0), expr: arg(1) },
        CommandKind::DrawText => Command::DrawText { text: arg(0) },
        CommandKind::SetFont => Command::SetFont { family: arg(0) },
        CommandKind::CreateButton => Command::CreateButton { label: arg(0) },
        CommandKind::CreateTextbox => Command::CreateTextbox { text: arg(0) },
        CommandKind::CreateScrollArea => Command::CreateScrollArea,
        CommandKind::EnableAi => Command::EnableAi,
        CommandKind::ApplyColor => Command::ApplyColor { spec: arg(0) },
        CommandKind::SetTitle => Command::SetTitle { title: arg(0) },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Command<'_> {
        CommandSet::shared().expect("table compiles").classify(line)
    }

    #[test]
    fn every_kind_has_a_distinct_prefix() {
        let mut prefixes: Vec<_> = CommandKind::ALL.iter().map(|k| k.prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), CommandKind::ALL.len());
    }

    #[test]
    fn print_takes_rest_of_line() {
        assert_eq!(classify("print 2 + 2"), Command::Print { expr: "2 + 2" });
        assert_eq!(classify("print"), Command::Unknown);
    }

    #[test]
    fn let_extracts_path_and_expr() {
        assert_eq!(
            classify("let window.run.window.play = blank"),
            Command::Let { path: "window.run.window.play", expr: "blank" }
        );
        assert_eq!(classify("let x=1+2"), Command::Let { path: "x", expr: "1+2" });
    }

    #[test]
    fn local_shapes() {
        assert_eq!(
            classify(r#"local print = "Hello, world!" = print"#),
            Command::DrawText { text: "Hello, world!" }
        );
        assert_eq!(
            classify(r#"local font = "Courier" local.print"#),
            Command::SetFont { family: "Courier" }
        );
        assert_eq!(
            classify(r#"local button = create = "Click Me!" print"#),
            Command::CreateButton { label: "Click Me!" }
        );
        assert_eq!(
            classify(r#"local text = "Type here..." here = textbox"#),
            Command::CreateTextbox { text: "Type here..." }
        );
        assert_eq!(classify("local scroll = weel = print"), Command::CreateScrollArea);
        assert_eq!(classify("local think = create.ai.print"), Command::EnableAi);
        assert_eq!(
            classify(r#"local color = "background" .run"#),
            Command::ApplyColor { spec: "background" }
        );
        assert_eq!(
            classify(r#"local title = "My Window" of window.run"#),
            Command::SetTitle { title: "My Window" }
        );
    }

    #[test]
    fn quoted_argument_is_greedy() {
        assert_eq!(
            classify(r#"local print = "say "hi"" = print"#),
            Command::DrawText { text: r#"say "hi""# }
        );
    }

    #[test]
    fn trailing_text_after_shape_is_allowed() {
        assert_eq!(
            classify(r#"local title = "T" of window.run now"#),
            Command::SetTitle { title: "T" }
        );
    }

    #[test]
    fn malformed_shape_is_unknown() {
        assert_eq!(classify("let = 5"), Command::Unknown);
        assert_eq!(classify("local print = Hello = print"), Command::Unknown);
        assert_eq!(classify("local scroll = wheel"), Command::Unknown);
        assert_eq!(classify("local think = hard"), Command::Unknown);
    }

    #[test]
    fn unrecognised_line() {
        assert_eq!(classify("foobar 123"), Command::Unknown);
        assert_eq!(classify("foobar 123").kind(), None);
    }

    #[test]
    fn kind_round_trip() {
        assert_eq!(classify("print x").kind(), Some(CommandKind::Print));
        assert_eq!(CommandKind::CreateScrollArea.to_string(), "create-scroll-area");
    }
}

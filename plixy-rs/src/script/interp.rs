//! Plixy command dispatcher.
//!
//! [`Interpreter::run`] executes a script line by line against a
//! [`Surface`].  Each line is classified by [`CommandSet`] and handed to the
//! matching handler; messages go to the caller's [`OutputSink`].  Nothing
//! aborts a run: unknown lines and handler failures are reported and the
//! next line runs.
//!
//! All mutable state of a run (variables, font, playful flag, the windows
//! and widgets created so far) lives in a [`Session`] that is created at the
//! start of `run` and dropped at the end.

use std::fmt::{self, Write as _};
use std::sync::{Arc, OnceLock};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use log::{debug, info, warn};

use crate::config::Settings;
use crate::surface::{
    ClickAction, ColorTarget, Font, OutputSink, SubmitAction, Surface, SurfaceError, WidgetId,
    WindowId,
};
use crate::var::VarStore;
use super::{
    command::{Command, CommandKind, CommandSet},
    expr::evaluate,
    reply::{playful_reply, RandomSource, XorShift64},
};

/// Assigning `blank` to this path opens a new window.
pub const WINDOW_PATH: &str = "window.run.window.play";

/// Value bound to [`WINDOW_PATH`] once the window exists.
pub const BLANK_WINDOW: &str = "<BlankWindow>";

/// Guidance emitted when a command needs a window and none exists yet.
pub const NO_WINDOW: &str = "No window. Use: let window.run.window.play = blank";

// ── ExecError ─────────────────────────────────────────────────────────────────

/// A failure while handling one line.
#[derive(Debug)]
pub enum ExecError {
    Surface(SurfaceError),
    /// The command table failed to compile.
    Pattern(regex::Error),
}

impl ExecError {
    /// Label shown in the `[Plixy ERROR]` diagnostic.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecError::Surface(_) => "SurfaceError",
            ExecError::Pattern(_) => "PatternError",
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Surface(e) => write!(f, "{e}"),
            ExecError::Pattern(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Surface(e) => Some(e),
            ExecError::Pattern(e) => Some(e),
        }
    }
}

impl From<SurfaceError> for ExecError {
    fn from(e: SurfaceError) -> Self {
        ExecError::Surface(e)
    }
}

impl From<regex::Error> for ExecError {
    fn from(e: regex::Error) -> Self {
        ExecError::Pattern(e)
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// State of one interpreter run.
#[derive(Debug, Clone)]
pub struct Session {
    vars: VarStore,
    font: Font,
    playful: bool,
    windows: Vec<WindowId>,
    last_button: Option<WidgetId>,
    last_textbox: Option<WidgetId>,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Session {
            vars: VarStore::new(),
            font: settings.default_font(),
            playful: false,
            windows: Vec::new(),
            last_button: None,
            last_textbox: None,
        }
    }

    pub fn vars(&self) -> &VarStore {
        &self.vars
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Whether `print` output goes through the playful reply templates.
    pub fn playful(&self) -> bool {
        self.playful
    }

    /// Windows created in this session, oldest first.
    pub fn windows(&self) -> &[WindowId] {
        &self.windows
    }

    /// The window commands act on: the most recently created one.
    pub fn current_window(&self) -> Option<WindowId> {
        self.windows.last().copied()
    }

    pub fn last_button(&self) -> Option<WidgetId> {
        self.last_button
    }

    pub fn last_textbox(&self) -> Option<WidgetId> {
        self.last_textbox
    }
}

// ── Outcomes ──────────────────────────────────────────────────────────────────

/// What happened to one script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Empty after trimming trailing whitespace.
    Skipped,
    Executed(CommandKind),
    /// Reported as `Unknown command`.
    Unknown,
    /// Reported as `[Plixy ERROR]`.
    Failed,
}

/// Line counts for one [`Interpreter::run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub executed: usize,
    pub unknown: usize,
    pub failed: usize,
}

// ── Interpreter ───────────────────────────────────────────────────────────────

/// The Plixy script interpreter.
pub struct Interpreter {
    settings: Settings,
    output: OutputSink,
    rng: Box<dyn RandomSource>,
    /// Source of the compiled command table.
    commands: fn() -> Result<&'static CommandSet, regex::Error>,
}

impl fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interpreter")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Interpreter {
    /// An interpreter with default [`Settings`] and an OS-seeded random source.
    pub fn new(output: OutputSink) -> Self {
        Interpreter {
            settings: Settings::default(),
            output,
            rng: Box::new(XorShift64::from_os()),
            commands: CommandSet::shared,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the random source used for playful replies.
    pub fn with_random(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A fresh session using this interpreter's settings.
    pub fn new_session(&self) -> Session {
        Session::new(&self.settings)
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    /// Execute `script` with a fresh session.
    pub fn run(&mut self, script: &str, surface: &mut dyn Surface) -> RunStats {
        let mut session = self.new_session();
        let mut stats = RunStats::default();
        info!("run started: {} lines", script.lines().count());
        for line in script.lines() {
            match self.exec_line(&mut session, surface, line) {
                LineOutcome::Skipped => {}
                LineOutcome::Executed(_) => stats.executed += 1,
                LineOutcome::Unknown => stats.unknown += 1,
                LineOutcome::Failed => stats.failed += 1,
            }
        }
        info!(
            "run finished: {} executed, {} unknown, {} failed",
            stats.executed, stats.unknown, stats.failed
        );
        stats
    }

    /// Execute a single line in `session`.
    pub fn exec_line(
        &mut self,
        session: &mut Session,
        surface: &mut dyn Surface,
        raw: &str,
    ) -> LineOutcome {
        let line = raw.trim_end();
        if line.is_empty() {
            return LineOutcome::Skipped;
        }

        let commands = match (self.commands)() {
            Ok(commands) => commands,
            Err(e) => {
                self.report(&ExecError::from(e), line);
                return LineOutcome::Failed;
            }
        };

        let cmd = commands.classify(line);
        let Some(kind) = cmd.kind() else {
            self.emit(&format!("Unknown command: {line}"));
            return LineOutcome::Unknown;
        };

        debug!("{kind}: {line:?}");
        match self.dispatch(session, surface, cmd) {
            Ok(()) => LineOutcome::Executed(kind),
            Err(e) => {
                self.report(&e, line);
                LineOutcome::Failed
            }
        }
    }

    fn dispatch(
        &mut self,
        session: &mut Session,
        surface: &mut dyn Surface,
        cmd: Command<'_>,
    ) -> Result<(), ExecError> {
        match cmd {
            Command::Print { expr } => self.print(session, expr),
            Command::Let { path, expr } => self.assign(session, surface, path, expr)?,
            Command::DrawText { text } => self.draw_text(session, surface, text)?,
            Command::SetFont { family } => {
                session.font.family = family.to_owned();
                surface.set_font_family(family)?;
                self.emit(&format!("Font set to {family}"));
            }
            Command::CreateButton { label } => self.create_button(session, surface, label)?,
            Command::CreateTextbox { text } => self.create_textbox(session, surface, text)?,
            Command::CreateScrollArea => self.create_scroll_area(session, surface)?,
            Command::EnableAi => {
                session.playful = true;
                self.emit("Basic AI enabled. `print` will reply playfully.");
            }
            Command::ApplyColor { spec } => self.apply_color(session, surface, spec)?,
            Command::SetTitle { title } => {
                let Some(window) = self.require_window(session) else { return Ok(()) };
                surface.set_title(window, title)?;
                self.emit(&format!("Window title set to '{title}'"));
            }
            Command::Unknown => {}
        }
        Ok(())
    }

    // ── Handlers ──────────────────────────────────────────────────────────────

    fn print(&mut self, session: &Session, expr: &str) {
        let mut msg = evaluate(expr, &session.vars).to_string();
        if session.playful {
            msg = playful_reply(&msg, self.rng.as_mut());
        }
        self.emit(&msg);
    }

    fn assign(
        &mut self,
        session: &mut Session,
        surface: &mut dyn Surface,
        path: &str,
        expr: &str,
    ) -> Result<(), ExecError> {
        if path == WINDOW_PATH && expr.trim().eq_ignore_ascii_case("blank") {
            let window = surface.create_window(&self.settings.window_options())?;
            session.windows.push(window);
            session.vars.set(path, BLANK_WINDOW);
            self.emit("Window created.");
        } else {
            let value = evaluate(expr, &session.vars);
            debug!("{path} = {value:?}");
            session.vars.set(path, value);
        }
        Ok(())
    }

    fn draw_text(
        &mut self,
        session: &Session,
        surface: &mut dyn Surface,
        text: &str,
    ) -> Result<(), ExecError> {
        let Some(window) = self.require_window(session) else { return Ok(()) };
        let at = (self.settings.text_x, self.settings.text_y);
        surface.draw_text(window, text, at, &session.font, &self.settings.text_color)?;
        Ok(())
    }

    fn create_button(
        &mut self,
        session: &mut Session,
        surface: &mut dyn Surface,
        label: &str,
    ) -> Result<(), ExecError> {
        let Some(window) = self.require_window(session) else { return Ok(()) };
        let sink = Arc::clone(&self.output);
        let message = format!("Button '{label}' clicked");
        let on_click: ClickAction = Box::new(move || sink(&message));
        session.last_button = Some(surface.add_button(window, label, on_click)?);
        self.emit("Button created.");
        Ok(())
    }

    fn create_textbox(
        &mut self,
        session: &mut Session,
        surface: &mut dyn Surface,
        text: &str,
    ) -> Result<(), ExecError> {
        let Some(window) = self.require_window(session) else { return Ok(()) };
        let sink = Arc::clone(&self.output);
        let on_submit: SubmitAction = Box::new(move |input: &str| sink(&format!("Textbox input: {input}")));
        session.last_textbox = Some(surface.add_textbox(window, text, &session.font, on_submit)?);
        self.emit("Textbox created.");
        Ok(())
    }

    fn create_scroll_area(
        &mut self,
        session: &Session,
        surface: &mut dyn Surface,
    ) -> Result<(), ExecError> {
        let Some(window) = self.require_window(session) else { return Ok(()) };
        let content = scroll_placeholder(self.settings.scroll_lines);
        surface.add_scroll_area(window, &content)?;
        self.emit("Scroll area created.");
        Ok(())
    }

    /// First keyword wins: `background`, then `textbox`, then `button`.
    /// Widget keywords only count once such a widget exists.
    fn apply_color(
        &mut self,
        session: &Session,
        surface: &mut dyn Surface,
        spec: &str,
    ) -> Result<(), ExecError> {
        let Some(window) = self.require_window(session) else { return Ok(()) };

        let mut found = [false; COLOR_KEYWORDS.len()];
        for m in color_keywords().find_iter(spec) {
            found[m.pattern()] = true;
        }

        let settings = &self.settings;
        let message = if found[BACKGROUND] {
            surface.recolor(ColorTarget::Background(window), &settings.background_color)?;
            "Background color changed."
        } else if let (true, Some(textbox)) = (found[TEXTBOX], session.last_textbox) {
            surface.recolor(ColorTarget::Widget(textbox), &settings.textbox_color)?;
            "Textbox color changed."
        } else if let (true, Some(button)) = (found[BUTTON], session.last_button) {
            surface.recolor(ColorTarget::Widget(button), &settings.button_color)?;
            "Button color changed."
        } else {
            "No matching element for color change."
        };
        self.emit(message);
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// The current window, or `None` after emitting [`NO_WINDOW`].
    fn require_window(&self, session: &Session) -> Option<WindowId> {
        let window = session.current_window();
        if window.is_none() {
            self.emit(NO_WINDOW);
        }
        window
    }

    fn emit(&self, msg: &str) {
        (self.output)(msg);
    }

    fn report(&self, err: &ExecError, line: &str) {
        warn!("{} on {line:?}: {err}", err.kind());
        self.emit(&format!("[Plixy ERROR] {}: {err}\nLine: {line}", err.kind()));
    }
}

const COLOR_KEYWORDS: [&str; 3] = ["background", "textbox", "button"];
const BACKGROUND: usize = 0;
const TEXTBOX: usize = 1;
const BUTTON: usize = 2;

fn color_keywords() -> &'static AhoCorasick {
    static KEYWORDS: OnceLock<AhoCorasick> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .build(COLOR_KEYWORDS)
    })
}

fn scroll_placeholder(lines: u32) -> String {
    let mut content = String::from("Scroll area ready.");
    for i in 1..=lines {
        let _ = write!(content, "\nLine {i}");
    }
    content
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::script::reply::variants;
    use crate::script::value::Value;
    use crate::surface::{RecordingSurface, SurfaceCall};

    struct Fixed(u64);

    impl RandomSource for Fixed {
        fn next_u64(&mut self) -> u64 {
            self.0
        }
    }

    fn collector() -> (OutputSink, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink_lines = Arc::clone(&lines);
        let sink: OutputSink = Arc::new(move |msg: &str| sink_lines.lock().unwrap().push(msg.to_owned()));
        (sink, lines)
    }

    fn interp() -> (Interpreter, Arc<Mutex<Vec<String>>>) {
        let (sink, lines) = collector();
        (Interpreter::new(sink).with_random(Box::new(Fixed(0))), lines)
    }

    fn run(src: &str) -> (Vec<String>, RecordingSurface) {
        let (mut interp, lines) = interp();
        let mut surface = RecordingSurface::new();
        interp.run(src, &mut surface);
        let out = lines.lock().unwrap().clone();
        (out, surface)
    }

    fn output(src: &str) -> Vec<String> {
        run(src).0
    }

    #[test]
    fn print_literal_and_arithmetic() {
        assert_eq!(output("print \"hi\"\nprint 2 + 2\nprint 7 / 2"), ["hi", "4", "3.5"]);
    }

    #[test]
    fn let_then_print() {
        assert_eq!(output("let x = 5\nprint x * 2\nprint x == 5"), ["10", "True"]);
    }

    #[test]
    fn let_string_and_concat() {
        assert_eq!(output("let name = \"Ada\"\nprint \"hi \" + \"name\""), ["hi Ada"]);
    }

    #[test]
    fn dotted_path_coercion() {
        assert_eq!(
            output("let a.b = 1\nlet a.b.c = 2\nprint a.b.c\nprint a"),
            ["2", "{b: {c: 2}}"]
        );
    }

    #[test]
    fn unknown_command() {
        assert_eq!(output("foobar 123"), ["Unknown command: foobar 123"]);
    }

    #[test]
    fn malformed_command_reported_as_unknown() {
        assert_eq!(
            output("local title = Untitled of window.run"),
            ["Unknown command: local title = Untitled of window.run"]
        );
    }

    #[test]
    fn blank_lines_skipped() {
        assert_eq!(output("\n   \nprint 1  \n\t\n"), ["1"]);
    }

    #[test]
    fn hash_line_is_an_unknown_command() {
        assert_eq!(output("# hello"), ["Unknown command: # hello"]);
    }

    #[test]
    fn leading_whitespace_is_part_of_the_line() {
        assert_eq!(output("  print 1"), ["Unknown command:   print 1"]);
    }

    #[test]
    fn title_without_window_is_guidance_only() {
        let (out, surface) = run("local title = \"X\" of window.run");
        assert_eq!(out, [NO_WINDOW]);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn every_window_command_needs_a_window() {
        let script = [
            "local print = \"a\" = print",
            "local button = create = \"b\" print",
            "local text = \"c\" here = textbox",
            "local scroll = weel = print",
            "local color = \"background\" .run",
            "local title = \"d\" of window.run",
        ];
        let (out, surface) = run(&script.join("\n"));
        assert_eq!(out, vec![NO_WINDOW; script.len()]);
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn set_font_needs_no_window() {
        let (out, surface) = run("local font = \"Courier\" local.print");
        assert_eq!(out, ["Font set to Courier"]);
        assert_eq!(surface.calls(), [SurfaceCall::SetFontFamily("Courier".into())]);
    }

    #[test]
    fn blank_window_binds_sentinel() {
        let (mut interp, lines) = interp();
        let mut surface = RecordingSurface::new();
        let mut session = interp.new_session();
        let outcome = interp.exec_line(&mut session, &mut surface, "let window.run.window.play = Blank");
        assert_eq!(outcome, LineOutcome::Executed(CommandKind::Let));
        assert_eq!(session.vars().get(WINDOW_PATH), Some(&Value::from(BLANK_WINDOW)));
        assert_eq!(session.windows().len(), 1);
        assert_eq!(surface.window_title(WindowId(0)), Some("Plixy Window"));
        assert_eq!(*lines.lock().unwrap(), ["Window created."]);
    }

    #[test]
    fn blank_on_other_path_is_a_plain_value() {
        let (mut interp, _) = interp();
        let mut surface = RecordingSurface::new();
        let mut session = interp.new_session();
        interp.exec_line(&mut session, &mut surface, "let other = blank");
        assert_eq!(session.vars().get("other"), Some(&Value::from("blank")));
        assert_eq!(surface.window_count(), 0);
    }

    #[test]
    fn window_button_and_recolor() {
        let (out, surface) = run(
            "let window.run.window.play = blank\n\
             local button = create = \"Click Me!\" print\n\
             local color = \"button\" .run",
        );
        assert_eq!(out, ["Window created.", "Button created.", "Button color changed."]);
        assert_eq!(surface.count(|c| matches!(c, SurfaceCall::CreateWindow { .. })), 1);
        let button = WidgetId(0);
        assert_eq!(
            surface.calls()[1],
            SurfaceCall::AddButton { window: WindowId(0), widget: button, label: "Click Me!".into() }
        );
        assert_eq!(
            surface.calls()[2],
            SurfaceCall::Recolor { target: ColorTarget::Widget(button), color: "lightgreen".into() }
        );
    }

    #[test]
    fn button_click_reaches_sink_after_run() {
        let (mut interp, lines) = interp();
        let mut surface = RecordingSurface::new();
        interp.run(
            "let window.run.window.play = blank\nlocal button = create = \"Go\" print",
            &mut surface,
        );
        assert!(surface.click(WidgetId(0)));
        assert_eq!(lines.lock().unwrap().last().map(String::as_str), Some("Button 'Go' clicked"));
    }

    #[test]
    fn textbox_submit_reaches_sink() {
        let (mut interp, lines) = interp();
        let mut surface = RecordingSurface::new();
        interp.run(
            "let window.run.window.play = blank\n\
             local font = \"Courier\" local.print\n\
             local text = \"Type here...\" here = textbox",
            &mut surface,
        );
        let textbox = WidgetId(0);
        assert_eq!(surface.textbox_text(textbox), Some("Type here..."));
        assert!(matches!(
            &surface.calls()[2],
            SurfaceCall::AddTextbox { font, .. } if font.family == "Courier" && font.size == 16
        ));
        surface.type_text(textbox, "hello");
        assert!(surface.submit(textbox));
        assert_eq!(lines.lock().unwrap().last().map(String::as_str), Some("Textbox input: hello"));
    }

    #[test]
    fn apply_color_priority() {
        let setup = "let window.run.window.play = blank\nlocal button = create = \"B\" print\n";
        assert_eq!(
            output(&format!("{setup}local color = \"Background and BUTTON\" .run")).last().map(String::as_str),
            Some("Background color changed.")
        );
        assert_eq!(
            output(&format!("{setup}local color = \"textbox\" .run")).last().map(String::as_str),
            Some("No matching element for color change.")
        );
        assert_eq!(
            output(&format!("{setup}local color = \"textbox button\" .run")).last().map(String::as_str),
            Some("Button color changed.")
        );
        assert_eq!(
            output(&format!("{setup}local color = \"purple\" .run")).last().map(String::as_str),
            Some("No matching element for color change.")
        );
    }

    #[test]
    fn background_recolors_current_window() {
        let (_, surface) = run(
            "let window.run.window.play = blank\n\
             let window.run.window.play = blank\n\
             local color = \"background\" .run",
        );
        assert_eq!(surface.window_background(WindowId(0)), Some("white"));
        assert_eq!(surface.window_background(WindowId(1)), Some("lightblue"));
    }

    #[test]
    fn draw_text_uses_position_and_font() {
        let (out, surface) = run(
            "let window.run.window.play = blank\n\
             local font = \"Courier\" local.print\n\
             local print = \"Hello Plixy!\" = print",
        );
        assert_eq!(out, ["Window created.", "Font set to Courier"]);
        assert_eq!(
            surface.calls().last(),
            Some(&SurfaceCall::DrawText {
                window: WindowId(0),
                text: "Hello Plixy!".into(),
                at: (250, 180),
                font: Font { family: "Courier".into(), size: 16 },
                color: "black".into(),
            })
        );
    }

    #[test]
    fn scroll_area_placeholder() {
        let (out, surface) = run("let window.run.window.play = blank\nlocal scroll = weel = print");
        assert_eq!(out.last().map(String::as_str), Some("Scroll area created."));
        let Some(SurfaceCall::AddScrollArea { content, .. }) = surface.calls().last() else {
            panic!("no scroll area: {:?}", surface.calls());
        };
        assert!(content.starts_with("Scroll area ready.\nLine 1\nLine 2\n"));
        assert!(content.ends_with("\nLine 79"));
        assert_eq!(content.lines().count(), 80);
    }

    #[test]
    fn set_title_on_window() {
        let (out, surface) = run(
            "let window.run.window.play = blank\nlocal title = \"Beginner Window\" of window.run",
        );
        assert_eq!(out, ["Window created.", "Window title set to 'Beginner Window'"]);
        assert_eq!(surface.window_title(WindowId(0)), Some("Beginner Window"));
    }

    #[test]
    fn playful_print_uses_injected_source() {
        let (sink, lines) = collector();
        let mut interp = Interpreter::new(sink).with_random(Box::new(Fixed(1)));
        interp.run("print \"hi\"\nlocal think = create.ai.print\nprint \"hi\"", &mut RecordingSurface::new());
        assert_eq!(
            *lines.lock().unwrap(),
            ["hi", "Basic AI enabled. `print` will reply playfully.", "I’m thinking about 'hi'..."]
        );
    }

    #[test]
    fn playful_print_with_os_random_is_a_variant() {
        let (sink, lines) = collector();
        let mut interp = Interpreter::new(sink);
        interp.run("local think = create.ai.print\nprint \"hi\"", &mut RecordingSurface::new());
        let reply = lines.lock().unwrap()[1].clone();
        assert!(variants("hi").contains(&reply), "{reply}");
    }

    #[test]
    fn surface_failure_is_reported_and_run_continues() {
        let (mut interp, lines) = interp();
        let mut surface = RecordingSurface::new();
        surface.fail_next("display lost");
        let stats = interp.run("let window.run.window.play = blank\nprint 1", &mut surface);
        assert_eq!(
            *lines.lock().unwrap(),
            [
                "[Plixy ERROR] SurfaceError: display lost\nLine: let window.run.window.play = blank",
                "1",
            ]
        );
        assert_eq!(stats, RunStats { executed: 1, unknown: 0, failed: 1 });
    }

    #[test]
    fn each_run_gets_a_fresh_session() {
        let (mut interp, lines) = interp();
        let mut surface = RecordingSurface::new();
        interp.run("let window.run.window.play = blank\nlet x = 1", &mut surface);
        interp.run("local title = \"Again\" of window.run\nprint x", &mut surface);
        assert_eq!(*lines.lock().unwrap(), ["Window created.", NO_WINDOW, "x"]);
        assert_eq!(surface.window_count(), 1);
        assert_eq!(surface.window_title(WindowId(0)), Some("Plixy Window"));
    }

    #[test]
    fn settings_feed_handlers() {
        let (sink, _) = collector();
        let settings = Settings { window_title: "Sandbox".into(), text_x: 10, text_y: 20, ..Settings::default() };
        let mut interp = Interpreter::new(sink).with_settings(settings);
        let mut surface = RecordingSurface::new();
        interp.run("let window.run.window.play = blank\nlocal print = \"t\" = print", &mut surface);
        assert_eq!(surface.window_title(WindowId(0)), Some("Sandbox"));
        assert!(matches!(surface.calls().last(), Some(SurfaceCall::DrawText { at: (10, 20), .. })));
    }

    #[test]
    fn run_stats_count_lines() {
        let (mut interp, _) = interp();
        let stats = interp.run("# header\nprint 1\n\nnope\nlet y = 2\n", &mut RecordingSurface::new());
        assert_eq!(stats, RunStats { executed: 2, unknown: 2, failed: 0 });
    }

    fn broken_table() -> Result<&'static CommandSet, regex::Error> {
        Err(regex::Regex::new("(").unwrap_err())
    }

    #[test]
    fn pattern_error_is_reported_per_line() {
        let (mut interp, lines) = interp();
        interp.commands = broken_table;
        let stats = interp.run("print 1\nfoobar", &mut RecordingSurface::new());
        assert_eq!(stats, RunStats { executed: 0, unknown: 0, failed: 2 });

        let out = lines.lock().unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].starts_with("[Plixy ERROR] PatternError: "), "{}", out[0]);
        assert!(out[0].ends_with("\nLine: print 1"), "{}", out[0]);
        assert!(out[1].ends_with("\nLine: foobar"), "{}", out[1]);
    }

    #[test]
    fn exec_error_kinds() {
        let pattern = ExecError::from(regex::Regex::new("(").unwrap_err());
        assert_eq!(pattern.kind(), "PatternError");
        assert!(std::error::Error::source(&pattern).is_some());
        assert_eq!(ExecError::from(SurfaceError::new("gone")).kind(), "SurfaceError");
    }
}

//! Presentation surface.
//!
//! The interpreter never touches a GUI toolkit directly.  Everything visible
//! goes through the [`Surface`] trait: windows, text drawn on a window's
//! canvas, and widgets (buttons, textboxes, scroll areas) added to a window's
//! container.  Widget callbacks are handed to the surface, which invokes them
//! later when the user clicks or presses enter.
//!
//! [`RecordingSurface`] is an in-memory implementation that records every
//! call in order.  It backs headless runs and the test suite.

use std::fmt;
use std::sync::Arc;

// ── Callbacks ─────────────────────────────────────────────────────────────────

/// Receives each message the interpreter emits, in order.
pub type OutputSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Invoked when a button is clicked.
pub type ClickAction = Box<dyn Fn() + Send + Sync>;

/// Invoked with the textbox's current text when input is committed.
pub type SubmitAction = Box<dyn Fn(&str) + Send + Sync>;

// ── Handles and parameters ────────────────────────────────────────────────────

/// A window context: the window, its canvas, and its widget container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub usize);

/// A widget inside some window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub usize);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window #{}", self.0)
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget #{}", self.0)
    }
}

/// Font family plus point size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Font {
    pub family: String,
    pub size: u32,
}

/// Parameters for a new window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background: String,
}

/// What a colour change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    /// A window's canvas and widget container.
    Background(WindowId),
    Widget(WidgetId),
}

/// A failure reported by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError {
    message: String,
}

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        SurfaceError { message: message.into() }
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SurfaceError {}

// ── Surface ───────────────────────────────────────────────────────────────────

/// Operations the interpreter performs on the presentation layer.
pub trait Surface {
    fn create_window(&mut self, options: &WindowOptions) -> Result<WindowId, SurfaceError>;

    /// Draw `text` on the window's canvas, centred on `at`.
    fn draw_text(
        &mut self,
        window: WindowId,
        text: &str,
        at: (i32, i32),
        font: &Font,
        color: &str,
    ) -> Result<(), SurfaceError>;

    /// Notification that the session font family changed.
    fn set_font_family(&mut self, family: &str) -> Result<(), SurfaceError>;

    fn add_button(
        &mut self,
        window: WindowId,
        label: &str,
        on_click: ClickAction,
    ) -> Result<WidgetId, SurfaceError>;

    /// Add a single-line entry prefilled with `text`.
    fn add_textbox(
        &mut self,
        window: WindowId,
        text: &str,
        font: &Font,
        on_submit: SubmitAction,
    ) -> Result<WidgetId, SurfaceError>;

    /// Add a scrollable multi-line text region holding `content`.
    fn add_scroll_area(&mut self, window: WindowId, content: &str) -> Result<WidgetId, SurfaceError>;

    fn recolor(&mut self, target: ColorTarget, color: &str) -> Result<(), SurfaceError>;

    fn set_title(&mut self, window: WindowId, title: &str) -> Result<(), SurfaceError>;
}

// ── RecordingSurface ──────────────────────────────────────────────────────────

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    CreateWindow { window: WindowId, options: WindowOptions },
    DrawText { window: WindowId, text: String, at: (i32, i32), font: Font, color: String },
    SetFontFamily(String),
    AddButton { window: WindowId, widget: WidgetId, label: String },
    AddTextbox { window: WindowId, widget: WidgetId, text: String, font: Font },
    AddScrollArea { window: WindowId, widget: WidgetId, content: String },
    Recolor { target: ColorTarget, color: String },
    SetTitle { window: WindowId, title: String },
}

struct WindowState {
    title: String,
    background: String,
}

enum WidgetKind {
    Button { on_click: ClickAction },
    Textbox { text: String, on_submit: SubmitAction },
    ScrollArea,
}

struct WidgetState {
    window: WindowId,
    color: Option<String>,
    kind: WidgetKind,
}

/// In-memory [`Surface`] that records calls and holds widget callbacks.
#[derive(Default)]
pub struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    windows: Vec<WindowState>,
    widgets: Vec<WidgetState>,
    pending_failure: Option<String>,
}

impl fmt::Debug for RecordingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSurface")
            .field("calls", &self.calls)
            .field("windows", &self.windows.len())
            .field("widgets", &self.widgets.len())
            .finish()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every successful call so far, oldest first.
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub fn window_title(&self, window: WindowId) -> Option<&str> {
        self.windows.get(window.0).map(|w| w.title.as_str())
    }

    pub fn window_background(&self, window: WindowId) -> Option<&str> {
        self.windows.get(window.0).map(|w| w.background.as_str())
    }

    /// The colour last applied to a widget, if any.
    pub fn widget_color(&self, widget: WidgetId) -> Option<&str> {
        self.widgets.get(widget.0)?.color.as_deref()
    }

    /// The window a widget was added to.
    pub fn widget_window(&self, widget: WidgetId) -> Option<WindowId> {
        self.widgets.get(widget.0).map(|w| w.window)
    }

    /// Make the next surface call fail with `message`.
    pub fn fail_next(&mut self, message: impl Into<String>) {
        self.pending_failure = Some(message.into());
    }

    /// Simulate a click.  Returns `false` if `widget` is not a button.
    pub fn click(&self, widget: WidgetId) -> bool {
        match self.widgets.get(widget.0).map(|w| &w.kind) {
            Some(WidgetKind::Button { on_click }) => {
                on_click();
                true
            }
            _ => false,
        }
    }

    /// Replace a textbox's text, as if typed.  Returns `false` if `widget` is
    /// not a textbox.
    pub fn type_text(&mut self, widget: WidgetId, text: &str) -> bool {
        match self.widgets.get_mut(widget.0).map(|w| &mut w.kind) {
            Some(WidgetKind::Textbox { text: current, .. }) => {
                *current = text.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Current text of a textbox.
    pub fn textbox_text(&self, widget: WidgetId) -> Option<&str> {
        match self.widgets.get(widget.0).map(|w| &w.kind) {
            Some(WidgetKind::Textbox { text, .. }) => Some(text),
            _ => None,
        }
    }

    /// Simulate pressing enter in a textbox.  Returns `false` if `widget` is
    /// not a textbox.
    pub fn submit(&self, widget: WidgetId) -> bool {
        match self.widgets.get(widget.0).map(|w| &w.kind) {
            Some(WidgetKind::Textbox { text, on_submit }) => {
                on_submit(text.as_str());
                true
            }
            _ => false,
        }
    }

    /// Count of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&SurfaceCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    fn check(&mut self) -> Result<(), SurfaceError> {
        match self.pending_failure.take() {
            Some(message) => Err(SurfaceError::new(message)),
            None => Ok(()),
        }
    }

    fn window_mut(&mut self, window: WindowId) -> Result<&mut WindowState, SurfaceError> {
        self.windows
            .get_mut(window.0)
            .ok_or_else(|| SurfaceError::new(format!("no such window: {window}")))
    }

    fn push_widget(&mut self, window: WindowId, kind: WidgetKind) -> Result<WidgetId, SurfaceError> {
        self.window_mut(window)?;
        let id = WidgetId(self.widgets.len());
        self.widgets.push(WidgetState { window, color: None, kind });
        Ok(id)
    }
}

impl Surface for RecordingSurface {
    fn create_window(&mut self, options: &WindowOptions) -> Result<WindowId, SurfaceError> {
        self.check()?;
        let window = WindowId(self.windows.len());
        self.windows.push(WindowState {
            title: options.title.clone(),
            background: options.background.clone(),
        });
        self.calls.push(SurfaceCall::CreateWindow { window, options: options.clone() });
        Ok(window)
    }

    fn draw_text(
        &mut self,
        window: WindowId,
        text: &str,
        at: (i32, i32),
        font: &Font,
        color: &str,
    ) -> Result<(), SurfaceError> {
        self.check()?;
        self.window_mut(window)?;
        self.calls.push(SurfaceCall::DrawText {
            window,
            text: text.to_owned(),
            at,
            font: font.clone(),
            color: color.to_owned(),
        });
        Ok(())
    }

    fn set_font_family(&mut self, family: &str) -> Result<(), SurfaceError> {
        self.check()?;
        self.calls.push(SurfaceCall::SetFontFamily(family.to_owned()));
        Ok(())
    }

    fn add_button(
        &mut self,
        window: WindowId,
        label: &str,
        on_click: ClickAction,
    ) -> Result<WidgetId, SurfaceError> {
        self.check()?;
        let widget = self.push_widget(window, WidgetKind::Button { on_click })?;
        self.calls.push(SurfaceCall::AddButton { window, widget, label: label.to_owned() });
        Ok(widget)
    }

    fn add_textbox(
        &mut self,
        window: WindowId,
        text: &str,
        font: &Font,
        on_submit: SubmitAction,
    ) -> Result<WidgetId, SurfaceError> {
        self.check()?;
        let kind = WidgetKind::Textbox { text: text.to_owned(), on_submit };
        let widget = self.push_widget(window, kind)?;
        self.calls.push(SurfaceCall::AddTextbox {
            window,
            widget,
            text: text.to_owned(),
            font: font.clone(),
        });
        Ok(widget)
    }

    fn add_scroll_area(&mut self, window: WindowId, content: &str) -> Result<WidgetId, SurfaceError> {
        self.check()?;
        let widget = self.push_widget(window, WidgetKind::ScrollArea)?;
        self.calls.push(SurfaceCall::AddScrollArea { window, widget, content: content.to_owned() });
        Ok(widget)
    }

    fn recolor(&mut self, target: ColorTarget, color: &str) -> Result<(), SurfaceError> {
        self.check()?;
        match target {
            ColorTarget::Background(window) => {
                self.window_mut(window)?.background = color.to_owned();
            }
            ColorTarget::Widget(widget) => {
                let state = self
                    .widgets
                    .get_mut(widget.0)
                    .ok_or_else(|| SurfaceError::new(format!("no such widget: {widget}")))?;
                state.color = Some(color.to_owned());
            }
        }
        self.calls.push(SurfaceCall::Recolor { target, color: color.to_owned() });
        Ok(())
    }

    fn set_title(&mut self, window: WindowId, title: &str) -> Result<(), SurfaceError> {
        self.check()?;
        self.window_mut(window)?.title = title.to_owned();
        self.calls.push(SurfaceCall::SetTitle { window, title: title.to_owned() });
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

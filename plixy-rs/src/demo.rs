//! Built-in Plixy scripts.

/// The known-good script a new editor starts with.
pub const STARTER: &str = r#"let window.run.window.play = blank
local title = "My First Plixy Window" of window.run
local font = "Courier" local.print
local print = "Hello Plixy!" = print
local button = create = "Click Me!" print
local text = "Type here..." here = textbox
local scroll = weel = print
local color = "background" .run
local color = "textbox" .run
local color = "button" .run
local think = create.ai.print
print "What do you think?"
"#;

/// A short introduction: one window, a title, some text and a button.
pub const BEGINNER: &str = r#"# Beginner Plixy Script
let window.run.window.play = blank
local title = "Beginner Window" of window.run
local print = "Hello, world!" = print
local button = create = "Click Me!" print
"#;

/// Every command kind in one script.
pub const EXPERT: &str = r#"# Expert Plixy Script
let window.run.window.play = blank
local title = "Expert Window" of window.run
local font = "Courier" local.print
local print = "Welcome to Expert Mode!" = print
local button = create = "Click Me!" print
local text = "Type here..." here = textbox
local scroll = weel = print
local color = "background" .run
local color = "textbox" .run
local color = "button" .run
local think = create.ai.print
print "Testing AI response"
"#;

/// Look a script up by name: `starter`, `beginner` or `expert`.
pub fn by_name(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "starter" => Some(STARTER),
        "beginner" => Some(BEGINNER),
        "expert" => Some(EXPERT),
        _ => None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

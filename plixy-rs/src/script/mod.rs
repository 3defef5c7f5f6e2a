//! Plixy scripting language.
//!
//! A Plixy script is a list of independent lines.  Each line is classified
//! against a fixed command table ([`command`]) and executed by the
//! [`Interpreter`], which evaluates expressions ([`expr`]) over the variable
//! store and drives a [`Surface`](crate::surface::Surface).
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use plixy::script::Interpreter;
//! use plixy::surface::{OutputSink, RecordingSurface};
//!
//! let out = Arc::new(Mutex::new(Vec::new()));
//! let sink_out = Arc::clone(&out);
//! let sink: OutputSink = Arc::new(move |msg: &str| sink_out.lock().unwrap().push(msg.to_owned()));
//!
//! let mut interp = Interpreter::new(sink);
//! interp.run("let x = 6\nprint x * 7", &mut RecordingSurface::new());
//! assert_eq!(*out.lock().unwrap(), vec!["42"]);
//! ```

pub mod command;
pub mod expr;
pub mod interp;
pub mod reply;
pub mod value;

pub use command::{Command, CommandKind, CommandSet};
pub use interp::{ExecError, Interpreter, LineOutcome, RunStats, Session};
pub use reply::{RandomSource, XorShift64};
pub use value::{EvalError, Value};

//! Plixy: a line-oriented playground scripting language.
//!
//! The crate holds the command dispatcher, the dotted-path variable store
//! and the expression evaluator.  Rendering goes through the
//! [`surface::Surface`] trait supplied by the caller.

pub mod config;
pub mod demo;
pub mod script;
pub mod surface;
pub mod var;

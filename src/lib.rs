//! Pixel color picker and painter core.
//!
//! An [`session::EditorSession`] owns one decoded image and turns UI events
//! (pointer press/move/release, undo, redo, brush and mode changes) into
//! edits of its pixel buffer. Pointer positions arrive in widget coordinates
//! and go through the letterbox mapping in [`viewport`] first.

pub mod logger;

pub mod canvas;
pub mod cli;
pub mod commands;
pub mod components;
pub mod io;
pub mod session;
pub mod settings;
pub mod viewport;

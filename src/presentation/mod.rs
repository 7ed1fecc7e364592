//! Presentation layer handling terminal UI and user input.
//!
//! This module draws the header, item list and footer with ratatui and
//! maps key presses onto application operations.

pub mod input;
pub mod ui;

pub use input::*;
pub use ui::*;

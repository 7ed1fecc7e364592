//! Application layer managing state and business workflows.
//!
//! This module holds the item store with its operations, and the UI state
//! the terminal front-end drives it through.

pub mod state;
pub mod store;
pub mod text_input;

pub use state::*;
pub use store::*;
pub use text_input::*;

//! Infrastructure layer providing external service integrations.
//!
//! This module contains the key-value stores the item list is saved to,
//! the JSON snapshot format, and the worker thread that performs the I/O.

pub mod errors;
pub mod persistence;
pub mod snapshot;
pub mod worker;

pub use errors::*;
pub use persistence::*;
pub use snapshot::*;
pub use worker::*;

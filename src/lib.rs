//! TTODO - Terminal To-Do List Library
//!
//! A single-screen to-do list for the terminal, built in Rust. Items are kept
//! in an [`application::ItemStore`] and saved to local storage after every
//! change by a background worker.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use application::*;
pub use domain::*;

//! stockroom: a terminal client for a remote inventory API.
//!
//! Browse populated categories, search and filter items, add, edit and
//! delete records, and create an account, all against a REST backend.

pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod forms;
pub mod keybindings;
pub mod theme;
pub mod ui;
pub mod util;

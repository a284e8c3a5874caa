//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Screen dispatch and overlays
//! - `helpers` - Background task spawning
//! - `categories` - Category grid widget
//! - `items` - Item table widget
//! - `form` - Add/edit item modal
//! - `signup` - Account creation screen
//! - `status` - Status bar widget
//! - `help` - Keybinding help overlay

mod categories;
mod events;
mod form;
mod help;
mod helpers;
mod input;
mod items;
mod loop_runner;
mod render;
mod signup;
mod status;

pub use helpers::spawn_fetch;
pub use loop_runner::{run, Action};

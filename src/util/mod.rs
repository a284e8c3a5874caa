//! Utility functions shared across the client.
//!
//! - **URL handling**: base-URL policy for the inventory API and checks before
//!   handing a URL to the system browser
//! - **Text processing**: Unicode-aware width calculation, truncation, and
//!   stripping of terminal control sequences from server-provided strings

mod text;
mod url_policy;

pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_policy::{validate_base_url, validate_url_for_open, UrlValidationError};

/// Maximum length of any single text input (search box, form fields).
pub const MAX_INPUT_LENGTH: usize = 256;

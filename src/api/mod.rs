//! Remote inventory API: wire types and the HTTP client.
//!
//! - [`types`] - records, drafts, signup payloads and [`ApiError`]
//! - [`client`] - [`InventoryClient`], one method per endpoint

mod client;
mod types;

pub use client::InventoryClient;
pub use types::{ApiError, InventoryItem, ItemDraft, ItemStatus, SignupRequest, SignupResponse};

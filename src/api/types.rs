use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors returned by the inventory API client.
///
/// Every remote failure is surfaced as one of these; the client never retries.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Non-2xx response. `message` is the server's `message` field when the
    /// error body is JSON and carries one.
    #[error("HTTP error: status {status}")]
    HttpStatus {
        status: u16,
        message: Option<String>,
    },
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid UTF-8 in response")]
    InvalidUtf8,
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

impl ApiError {
    /// Best message to show a user: the server's own message when it sent one,
    /// otherwise the error's display text.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::HttpStatus {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// Item Status
// ============================================================================

/// Stock status of an item.
///
/// Carried on the wire as its display string. Unknown strings are kept
/// verbatim in `Other` so an update never rewrites a status the client
/// doesn't recognise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemStatus {
    InStock,
    LowStock,
    OutOfStock,
    Other(String),
}

impl ItemStatus {
    /// Statuses offered by the item form, in cycle order.
    pub const SELECTABLE: [ItemStatus; 3] = [
        ItemStatus::InStock,
        ItemStatus::LowStock,
        ItemStatus::OutOfStock,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ItemStatus::InStock => "In Stock",
            ItemStatus::LowStock => "Low Stock",
            ItemStatus::OutOfStock => "Out of Stock",
            ItemStatus::Other(s) => s,
        }
    }

    /// Next selectable status. `Other` wraps to the first selectable one.
    pub fn next(&self) -> Self {
        match self {
            ItemStatus::InStock => ItemStatus::LowStock,
            ItemStatus::LowStock => ItemStatus::OutOfStock,
            ItemStatus::OutOfStock | ItemStatus::Other(_) => ItemStatus::InStock,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ItemStatus::InStock | ItemStatus::Other(_) => ItemStatus::OutOfStock,
            ItemStatus::LowStock => ItemStatus::InStock,
            ItemStatus::OutOfStock => ItemStatus::LowStock,
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::InStock
    }
}

impl From<String> for ItemStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "In Stock" => ItemStatus::InStock,
            "Low Stock" => ItemStatus::LowStock,
            "Out of Stock" => ItemStatus::OutOfStock,
            _ => ItemStatus::Other(s),
        }
    }
}

impl From<ItemStatus> for String {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Inventory Records
// ============================================================================

/// A single stock-keeping record as returned by the backend.
///
/// The identifier is read from `id`, falling back to `_id`; records carrying
/// both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    /// Free-text label; matched against the static category list by exact equality.
    pub category: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_quantity: Option<i64>,
}

/// Wire shape of an item, before the two id keys are reconciled.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireItem {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    name: String,
    category: String,
    #[serde(default)]
    quantity: i64,
    #[serde(default, with = "rust_decimal::serde::float")]
    price: Decimal,
    #[serde(default)]
    status: ItemStatus,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    minimum_quantity: Option<i64>,
}

impl<'de> Deserialize<'de> for InventoryItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = WireItem::deserialize(deserializer)?;
        let id = wire
            .id
            .or(wire.mongo_id)
            .ok_or_else(|| serde::de::Error::missing_field("id"))?;
        Ok(InventoryItem {
            id,
            name: wire.name,
            category: wire.category,
            quantity: wire.quantity,
            price: wire.price,
            status: wire.status,
            image: wire.image,
            minimum_quantity: wire.minimum_quantity,
        })
    }
}

/// Payload for create and full-replacement update calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    pub category: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_quantity: Option<i64>,
}

// ============================================================================
// Signup
// ============================================================================

/// Account creation request. Passwords are held as secrets so Debug output
/// and logs never carry them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "serialize_secret")]
    pub password: SecretString,
    #[serde(serialize_with = "serialize_secret")]
    pub password_confirm: SecretString,
    pub company_name: String,
    pub role: String,
}

fn serialize_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

/// Signup response. Both fields are optional; backends differ in what they return.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SignupResponse {
    pub token: Option<String>,
    pub message: Option<String>,
}

/// Error body shape used to extract a server-provided message.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

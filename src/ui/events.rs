//! Application event handling.
//!
//! Applies the results of background API calls to `App`. Every successful
//! mutation triggers a full refetch; failures leave the displayed collection
//! untouched.

use crate::api::{ApiError, InventoryItem, SignupResponse};
use crate::app::{App, AppEvent};
use secrecy::SecretString;
use tokio::sync::mpsc;

use super::helpers::spawn_fetch;

/// Handle application events from background tasks.
pub(super) fn handle_app_event(
    app: &mut App,
    event: AppEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match event {
        AppEvent::ItemsLoaded { generation, result } => {
            handle_items_loaded(app, generation, result);
        }
        AppEvent::ItemCreated => {
            app.is_submitting = false;
            app.close_form();
            app.notify_success("Item added successfully");
            spawn_fetch(app, event_tx);
        }
        AppEvent::ItemCreateFailed { error } => {
            app.is_submitting = false;
            tracing::warn!(error = %error, "Create item failed");
            app.notify_error("Failed to add item");
        }
        AppEvent::ItemUpdated { id } => {
            tracing::debug!(id = %id, "Item updated");
            app.is_submitting = false;
            app.close_form();
            app.notify_success("Item updated successfully");
            spawn_fetch(app, event_tx);
        }
        AppEvent::ItemUpdateFailed { id, error } => {
            app.is_submitting = false;
            tracing::warn!(id = %id, error = %error, "Update item failed");
            app.notify_error("Failed to update item");
        }
        AppEvent::ItemDeleted { id } => {
            tracing::debug!(id = %id, "Item deleted");
            app.deleting = None;
            app.notify_success("Item deleted successfully");
            spawn_fetch(app, event_tx);
        }
        AppEvent::ItemDeleteFailed { id, error } => {
            tracing::warn!(id = %id, error = %error, "Delete item failed");
            app.deleting = None;
            app.notify_error("Failed to delete item");
        }
        AppEvent::SignupCompleted(response) => {
            handle_signup_completed(app, response, event_tx);
        }
        AppEvent::SignupFailed { error } => {
            app.signup_submitting = false;
            tracing::warn!(error = %error, "Signup failed");
            app.notify_error(signup_error_message(&error));
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            match task {
                "fetch_items" => app.is_loading = false,
                "create_item" | "update_item" => app.is_submitting = false,
                "delete_item" => app.deleting = None,
                "signup" => app.signup_submitting = false,
                _ => {}
            }
            app.notify_error(format!("Internal error in {} task", task));
        }
    }
}

fn handle_items_loaded(
    app: &mut App,
    generation: u64,
    result: Result<Vec<InventoryItem>, ApiError>,
) {
    if generation != app.fetch_generation {
        tracing::debug!(
            generation,
            current = app.fetch_generation,
            "Discarding stale inventory fetch"
        );
        return;
    }
    app.is_loading = false;

    match result {
        Ok(items) => {
            tracing::info!(count = items.len(), "Inventory loaded");
            app.set_items(items);
        }
        Err(e) => {
            tracing::error!(error = %e, "Inventory fetch failed");
            app.notify_error("Failed to fetch inventory items");
        }
    }
}

fn handle_signup_completed(
    app: &mut App,
    response: SignupResponse,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    app.signup_submitting = false;
    if let Some(token) = response.token.filter(|t| !t.is_empty()) {
        app.client.set_token(Some(SecretString::from(token)));
        tracing::info!("Signup returned a token, authenticating subsequent requests");
    }
    app.signup = Default::default();
    app.leave_signup();
    app.notify_success("Account created successfully!");
    spawn_fetch(app, event_tx);
}

/// Server-provided message when there is one, the error text otherwise.
fn signup_error_message(error: &ApiError) -> String {
    let msg = error.user_message();
    if msg.trim().is_empty() {
        "Failed to create account".to_string()
    } else {
        msg
    }
}

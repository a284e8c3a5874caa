//! Background task spawning and other helpers shared across the UI layer.
//!
//! Every remote call runs in its own tokio task wrapped in `catch_task_panic`
//! and reports back through the `AppEvent` channel; nothing here awaits the
//! network on the UI thread.

use crate::api::InventoryClient;
use crate::app::{App, AppEvent, ConfirmAction};
use crate::catalog::resolve_image_url;
use crate::forms::FormMode;
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Wraps a future to catch panics and convert them to errors.
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn `work` and deliver the event it produces. A panic is delivered as
/// `AppEvent::TaskPanicked` instead.
fn spawn_reporting<F>(task: &'static str, tx: &mpsc::Sender<AppEvent>, work: F) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(work).await {
            Ok(event) => event,
            Err(panic_msg) => {
                tracing::error!(task, error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task,
                    error: panic_msg,
                }
            }
        };
        let name = event.name();
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
        }
    })
}

/// Start a full refetch of the item collection.
pub fn spawn_fetch(app: &mut App, tx: &mpsc::Sender<AppEvent>) -> JoinHandle<()> {
    let generation = app.begin_fetch();
    let client: InventoryClient = app.client.clone();
    tracing::debug!(generation, "Spawning inventory fetch");
    spawn_reporting("fetch_items", tx, async move {
        let result = client.list_items().await;
        AppEvent::ItemsLoaded { generation, result }
    })
}

/// Validate the open item form and spawn create or update.
///
/// Validation errors are shown and issue no call. Ignored while a submit is
/// already in flight. The form stays open until the result arrives.
pub(crate) fn submit_form(app: &mut App, tx: &mpsc::Sender<AppEvent>) -> Option<JoinHandle<()>> {
    if app.is_submitting {
        return None;
    }
    let form = app.form.as_ref()?;
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => {
            app.notify_error(e.to_string());
            return None;
        }
    };
    let mode = form.mode.clone();
    app.is_submitting = true;

    let client = app.client.clone();
    let handle = match mode {
        FormMode::Add => spawn_reporting("create_item", tx, async move {
            match client.create_item(&draft).await {
                Ok(()) => AppEvent::ItemCreated,
                Err(error) => AppEvent::ItemCreateFailed { error },
            }
        }),
        FormMode::Edit { id } => spawn_reporting("update_item", tx, async move {
            match client.update_item(&id, &draft).await {
                Ok(()) => AppEvent::ItemUpdated { id },
                Err(error) => AppEvent::ItemUpdateFailed { id, error },
            }
        }),
    };
    Some(handle)
}

/// Act on the pending delete confirmation.
pub(crate) fn confirm_delete(app: &mut App, tx: &mpsc::Sender<AppEvent>) -> Option<JoinHandle<()>> {
    let ConfirmAction::DeleteItem { id, name } = app.pending_confirm.take()?;
    if app.deleting.is_some() {
        app.set_status("Another delete is still in progress");
        return None;
    }
    tracing::info!(id = %id, name = %name, "Deleting item");
    app.deleting = Some(id.clone());

    let client = app.client.clone();
    Some(spawn_reporting("delete_item", tx, async move {
        match client.delete_item(&id).await {
            Ok(()) => AppEvent::ItemDeleted { id },
            Err(error) => AppEvent::ItemDeleteFailed { id, error },
        }
    }))
}

/// Validate the signup form and spawn account creation.
///
/// Password mismatch is reported before any other check and before any call.
pub(crate) fn submit_signup(app: &mut App, tx: &mpsc::Sender<AppEvent>) -> Option<JoinHandle<()>> {
    if app.signup_submitting {
        return None;
    }
    let request = match app.signup.validate() {
        Ok(request) => request,
        Err(e) => {
            app.notify_error(e.to_string());
            return None;
        }
    };
    app.signup_submitting = true;

    let client = app.client.clone();
    Some(spawn_reporting("signup", tx, async move {
        match client.signup(&request).await {
            Ok(response) => AppEvent::SignupCompleted(response),
            Err(error) => AppEvent::SignupFailed { error },
        }
    }))
}

/// Open the selected item's image in the system browser.
pub(super) fn open_selected_image(app: &mut App) {
    let Some(item) = app.selected_item() else {
        return;
    };
    let Some(image) = item.image.as_deref().filter(|s| !s.trim().is_empty()) else {
        app.set_status("Item has no image");
        return;
    };
    let url = resolve_image_url(app.client.base_url(), image);

    // SEC: Validate before open::that() so a stored reference can't launch a local handler
    match validate_url_for_open(&url) {
        Err(e) => app.notify_error(e.to_string()),
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.notify_error(format!("Failed to open browser: {}", e));
            } else {
                app.set_status("Opening image...");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_passes_value_through() {
        let out = catch_task_panic(async { 7 }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_extracts_message() {
        let out: Result<(), String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(out, Err("boom".to_string()));

        let out: Result<(), String> =
            catch_task_panic(async { panic!("{} items", 3) }).await;
        assert_eq!(out, Err("3 items".to_string()));
    }

    #[tokio::test]
    async fn test_spawn_reporting_converts_panic() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = spawn_reporting("exploding", &tx, async {
            panic!("kaboom");
        });
        handle.await.unwrap();
        match rx.recv().await {
            Some(AppEvent::TaskPanicked { task, error }) => {
                assert_eq!(task, "exploding");
                assert_eq!(error, "kaboom");
            }
            _ => panic!("expected TaskPanicked"),
        }
    }
}

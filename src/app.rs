use crate::api::{ApiError, InventoryClient, InventoryItem, SignupResponse};
use crate::catalog::{self, Category};
use crate::forms::{ItemForm, SignupForm};
use crate::keybindings::{Context as KbContext, KeybindingRegistry};
use crate::theme::{StyleMap, ThemeVariant};
use ratatui::style::Style;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::time::Instant;

/// How long a notification stays in the status bar.
pub const NOTIFICATION_SECS: u64 = 3;

// ============================================================================
// Screen and Notification Enums
// ============================================================================

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Grid of populated categories (or search results across all of them).
    Categories,
    /// Item table for the selected category.
    Items,
    /// Account creation form.
    Signup,
}

/// Colour class of a status-bar notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn style_role(self) -> &'static str {
        match self {
            Self::Success => "notify_success",
            Self::Error => "notify_error",
            Self::Info => "notify_info",
        }
    }
}

/// Pending confirmation for a destructive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteItem { id: String, name: String },
}

impl ConfirmAction {
    pub fn prompt(&self) -> &'static str {
        match self {
            ConfirmAction::DeleteItem { .. } => "Are you sure you want to delete this item?",
        }
    }
}

// ============================================================================
// Background Events
// ============================================================================

/// Events from background tasks.
pub enum AppEvent {
    /// Item list fetched. `generation` is the fetch counter when the request
    /// was spawned; older generations are discarded.
    ItemsLoaded {
        generation: u64,
        result: Result<Vec<InventoryItem>, ApiError>,
    },
    ItemCreated,
    ItemCreateFailed {
        error: ApiError,
    },
    ItemUpdated {
        id: String,
    },
    ItemUpdateFailed {
        id: String,
        error: ApiError,
    },
    ItemDeleted {
        id: String,
    },
    ItemDeleteFailed {
        id: String,
        error: ApiError,
    },
    SignupCompleted(SignupResponse),
    SignupFailed {
        error: ApiError,
    },
    /// A background task panicked.
    ///
    /// - `task`: name of the task that panicked (e.g., "fetch_items")
    /// - `error`: the panic message extracted from the payload
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

impl AppEvent {
    /// Variant name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::ItemsLoaded { .. } => "ItemsLoaded",
            AppEvent::ItemCreated => "ItemCreated",
            AppEvent::ItemCreateFailed { .. } => "ItemCreateFailed",
            AppEvent::ItemUpdated { .. } => "ItemUpdated",
            AppEvent::ItemUpdateFailed { .. } => "ItemUpdateFailed",
            AppEvent::ItemDeleted { .. } => "ItemDeleted",
            AppEvent::ItemDeleteFailed { .. } => "ItemDeleteFailed",
            AppEvent::SignupCompleted(_) => "SignupCompleted",
            AppEvent::SignupFailed { .. } => "SignupFailed",
            AppEvent::TaskPanicked { .. } => "TaskPanicked",
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state.
pub struct App {
    pub client: InventoryClient,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // Data
    /// Last fetched collection, in server order. Replaced wholesale on each fetch.
    pub items: Arc<Vec<InventoryItem>>,
    /// Category labels carried by at least one item; recomputed in `set_items`.
    pub populated: BTreeSet<String>,

    // Navigation
    pub screen: Screen,
    pub selected_category: Option<String>,
    pub selected_tile: usize,
    pub selected_row: usize,
    /// Grid column count from the last render, used for up/down in the grid.
    pub grid_columns: usize,

    // Search
    pub search_mode: bool,
    pub search_query: String,

    // Remote operation flags
    pub is_loading: bool,
    pub has_loaded: bool,
    pub is_submitting: bool,
    /// Id of the item whose delete is in flight.
    pub deleting: Option<String>,
    pub signup_submitting: bool,

    /// Generation counter for item fetches.
    ///
    /// Incremented each time a fetch is spawned. `ItemsLoaded` responses
    /// carrying an older generation are dropped, so a slow early fetch can't
    /// overwrite the result of a later one.
    pub fetch_generation: u64,

    // Overlays
    /// Open add/edit form. At most one form exists at a time.
    pub form: Option<ItemForm>,
    pub signup: SignupForm,
    pub pending_confirm: Option<ConfirmAction>,
    pub show_help: bool,
    pub help_scroll_offset: usize,

    /// Notification with kind and creation time; `Cow` avoids allocating literals.
    pub status_message: Option<(Cow<'static, str>, NotificationKind, Instant)>,

    /// Dirty flag to skip unnecessary frame renders.
    pub needs_redraw: bool,
    /// Current frame of the loading spinner (0-9).
    pub spinner_frame: usize,
}

impl App {
    pub fn new(client: InventoryClient) -> Self {
        Self {
            client,
            theme_variant: ThemeVariant::Dark,
            theme: StyleMap::from_palette(&ThemeVariant::Dark.palette()),
            keybindings: KeybindingRegistry::new(),
            items: Arc::new(Vec::new()),
            populated: BTreeSet::new(),
            screen: Screen::Categories,
            selected_category: None,
            selected_tile: 0,
            selected_row: 0,
            grid_columns: 1,
            search_mode: false,
            search_query: String::new(),
            is_loading: false,
            has_loaded: false,
            is_submitting: false,
            deleting: None,
            signup_submitting: false,
            fetch_generation: 0,
            form: None,
            signup: SignupForm::default(),
            pending_confirm: None,
            show_help: false,
            help_scroll_offset: 0,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant; returns its name for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ------------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------------

    /// Replace the collection and recompute the populated-category set.
    pub fn set_items(&mut self, items: Vec<InventoryItem>) {
        self.populated = catalog::populated_categories(&items);
        self.items = Arc::new(items);
        self.has_loaded = true;
        self.clamp_selections();
    }

    /// Mark a fetch as started and return its generation.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_generation = self.fetch_generation.wrapping_add(1);
        self.is_loading = true;
        self.fetch_generation
    }

    pub fn visible_categories(&self) -> Vec<&'static Category> {
        catalog::visible_categories(&self.populated)
    }

    pub fn category_count(&self, name: &str) -> usize {
        catalog::category_count(&self.items, name)
    }

    /// True when the category screen shows search results instead of the grid.
    pub fn showing_search_results(&self) -> bool {
        self.screen == Screen::Categories && !self.search_query.is_empty()
    }

    /// Items shown in the table: the selected category filtered by the query,
    /// or matches across all categories when searching from the grid.
    pub fn filtered_items(&self) -> Vec<&InventoryItem> {
        match self.screen {
            Screen::Items => catalog::filter_items(
                &self.items,
                self.selected_category.as_deref(),
                &self.search_query,
            ),
            Screen::Categories if !self.search_query.is_empty() => {
                catalog::filter_items(&self.items, None, &self.search_query)
            }
            _ => Vec::new(),
        }
    }

    pub fn selected_item(&self) -> Option<&InventoryItem> {
        self.filtered_items().get(self.selected_row).copied()
    }

    pub fn selected_tile_category(&self) -> Option<&'static Category> {
        self.visible_categories().get(self.selected_tile).copied()
    }

    /// Keybinding context for the current screen and mode.
    pub fn key_context(&self) -> KbContext {
        if self.search_mode {
            KbContext::Search
        } else if self.screen == Screen::Items || self.showing_search_results() {
            KbContext::Items
        } else {
            KbContext::Categories
        }
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn select_category(&mut self, name: &str) {
        self.selected_category = Some(name.to_string());
        self.screen = Screen::Items;
        self.selected_row = 0;
        self.needs_redraw = true;
    }

    pub fn back_to_categories(&mut self) {
        self.selected_category = None;
        self.screen = Screen::Categories;
        self.selected_row = 0;
        self.clamp_selections();
        self.needs_redraw = true;
    }

    /// Open the category under the grid cursor. No-op when the grid is hidden.
    pub fn open_selected_tile(&mut self) -> bool {
        if self.screen != Screen::Categories || self.showing_search_results() {
            return false;
        }
        match self.selected_tile_category() {
            Some(cat) => {
                self.select_category(cat.name);
                true
            }
            None => false,
        }
    }

    fn in_table(&self) -> bool {
        self.screen == Screen::Items || self.showing_search_results()
    }

    pub fn nav_down(&mut self) {
        if self.in_table() {
            let len = self.filtered_items().len();
            if self.selected_row + 1 < len {
                self.selected_row += 1;
            }
        } else if self.screen == Screen::Categories {
            let len = self.visible_categories().len();
            let next = self.selected_tile + self.grid_columns.max(1);
            if next < len {
                self.selected_tile = next;
            }
        }
    }

    pub fn nav_up(&mut self) {
        if self.in_table() {
            self.selected_row = self.selected_row.saturating_sub(1);
        } else if self.screen == Screen::Categories {
            let cols = self.grid_columns.max(1);
            if self.selected_tile >= cols {
                self.selected_tile -= cols;
            }
        }
    }

    pub fn nav_left(&mut self) {
        if self.screen == Screen::Categories && !self.showing_search_results() {
            self.selected_tile = self.selected_tile.saturating_sub(1);
        }
    }

    pub fn nav_right(&mut self) {
        if self.screen == Screen::Categories && !self.showing_search_results() {
            let len = self.visible_categories().len();
            if self.selected_tile + 1 < len {
                self.selected_tile += 1;
            }
        }
    }

    /// Keep cursors inside the current lists after the data or filter changes.
    pub fn clamp_selections(&mut self) {
        let tiles = self.visible_categories().len();
        self.selected_tile = self.selected_tile.min(tiles.saturating_sub(1));
        let rows = self.filtered_items().len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    pub fn enter_search(&mut self) {
        self.search_mode = true;
        self.needs_redraw = true;
    }

    pub fn set_search_query(&mut self, query: String) {
        self.search_query = query;
        self.selected_row = 0;
        self.clamp_selections();
        self.needs_redraw = true;
    }

    pub fn clear_search(&mut self) {
        self.search_mode = false;
        self.set_search_query(String::new());
    }

    // ------------------------------------------------------------------------
    // Forms
    // ------------------------------------------------------------------------

    /// Open the add form, replacing any open form. Pre-fills the selected category.
    pub fn open_add_form(&mut self) {
        self.form = Some(ItemForm::new_add(self.selected_category.as_deref()));
        self.needs_redraw = true;
    }

    /// Open the edit form for `item`, replacing any open form.
    pub fn open_edit_form(&mut self, item: &InventoryItem) {
        self.form = Some(ItemForm::new_edit(item));
        self.needs_redraw = true;
    }

    /// Open the edit form for the row under the cursor.
    pub fn open_edit_for_selected(&mut self) -> bool {
        match self.selected_item().cloned() {
            Some(item) => {
                self.open_edit_form(&item);
                true
            }
            None => false,
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.needs_redraw = true;
    }

    pub fn enter_signup(&mut self) {
        self.screen = Screen::Signup;
        self.search_mode = false;
        self.needs_redraw = true;
    }

    pub fn leave_signup(&mut self) {
        self.screen = Screen::Categories;
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------------

    /// Ask for confirmation before deleting the selected row.
    ///
    /// Refused while another delete is in flight, since only one id is tracked.
    pub fn request_delete(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        if let Some(id) = &self.deleting {
            let msg = if *id == item.id {
                "Item is already being deleted"
            } else {
                "Another delete is still in progress"
            };
            self.notify(NotificationKind::Info, msg);
            return;
        }
        self.pending_confirm = Some(ConfirmAction::DeleteItem {
            id: item.id.clone(),
            name: item.name.clone(),
        });
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    pub fn notify(&mut self, kind: NotificationKind, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), kind, Instant::now()));
        self.needs_redraw = true;
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.notify(NotificationKind::Info, msg);
    }

    pub fn notify_success(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.notify(NotificationKind::Success, msg);
    }

    pub fn notify_error(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.notify(NotificationKind::Error, msg);
    }

    /// Clear the notification once it is older than `NOTIFICATION_SECS`.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, _, time)) = &self.status_message {
            if time.elapsed().as_secs() >= NOTIFICATION_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ItemStatus;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use tokio::time::{self, Duration};

    pub(crate) fn item(id: &str, name: &str, category: &str) -> InventoryItem {
        InventoryItem {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            quantity: 3,
            price: Decimal::new(1999, 2),
            status: ItemStatus::InStock,
            image: None,
            minimum_quantity: None,
        }
    }

    fn test_app() -> App {
        let client = InventoryClient::new("http://localhost:5000", 30, None).unwrap();
        App::new(client)
    }

    fn stocked_app() -> App {
        let mut app = test_app();
        app.set_items(vec![
            item("1", "Milk", "Dairy, Bread & Eggs"),
            item("2", "Bread", "Dairy, Bread & Eggs"),
            item("3", "Dog food", "Pet Care"),
            item("4", "Phone", "Mobiles & Tablets"),
        ]);
        app
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.notify_success("Item added successfully");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.status_message.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_status_not_expired_before_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.notify_error("Failed to delete item");
        time::advance(Duration::from_millis(2999)).await;
        app.clear_expired_status();
        let (msg, kind, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Failed to delete item");
        assert_eq!(*kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn test_set_items_recomputes_populated() {
        let mut app = stocked_app();
        let names: Vec<&str> = app.visible_categories().iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["Mobiles & Tablets", "Dairy, Bread & Eggs", "Pet Care"]
        );

        app.set_items(vec![item("9", "Soap", "Personal Care")]);
        assert_eq!(app.populated.len(), 1);
        assert!(app.populated.contains("Personal Care"));
    }

    #[tokio::test]
    async fn test_select_and_back() {
        let mut app = stocked_app();
        app.select_category("Dairy, Bread & Eggs");
        assert_eq!(app.screen, Screen::Items);
        assert_eq!(app.filtered_items().len(), 2);

        app.back_to_categories();
        assert_eq!(app.screen, Screen::Categories);
        assert!(app.selected_category.is_none());
        assert!(app.filtered_items().is_empty());
    }

    #[tokio::test]
    async fn test_search_from_grid_spans_categories() {
        let mut app = stocked_app();
        app.set_search_query("o".to_string());
        assert!(app.showing_search_results());
        let names: Vec<&str> = app.filtered_items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Dog food", "Phone"]);
        assert_eq!(app.key_context(), KbContext::Items);
    }

    #[tokio::test]
    async fn test_search_within_category() {
        let mut app = stocked_app();
        app.select_category("Dairy, Bread & Eggs");
        app.set_search_query("BREAD".to_string());
        // Category label contains "Bread" too, so both rows match
        assert_eq!(app.filtered_items().len(), 2);
        app.set_search_query("milk".to_string());
        assert_eq!(app.filtered_items().len(), 1);
    }

    #[tokio::test]
    async fn test_grid_navigation_uses_columns() {
        let mut app = stocked_app();
        app.grid_columns = 2;
        app.nav_right();
        assert_eq!(app.selected_tile, 1);
        app.nav_right();
        assert_eq!(app.selected_tile, 2);
        app.nav_right();
        assert_eq!(app.selected_tile, 2);
        app.nav_up();
        assert_eq!(app.selected_tile, 0);
        app.nav_down();
        assert_eq!(app.selected_tile, 2);
        app.nav_left();
        assert_eq!(app.selected_tile, 1);

        assert!(app.open_selected_tile());
        assert_eq!(app.selected_category.as_deref(), Some("Dairy, Bread & Eggs"));
    }

    #[tokio::test]
    async fn test_add_form_prefills_category_and_replaces_edit() {
        let mut app = stocked_app();
        app.select_category("Pet Care");
        assert!(app.open_edit_for_selected());
        assert!(app.form.as_ref().unwrap().is_edit());

        app.open_add_form();
        let form = app.form.as_ref().unwrap();
        assert!(!form.is_edit());
        assert_eq!(form.category, "Pet Care");

        app.close_form();
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn test_request_delete_opens_confirm() {
        let mut app = stocked_app();
        app.select_category("Pet Care");
        app.request_delete();
        assert_eq!(
            app.pending_confirm,
            Some(ConfirmAction::DeleteItem {
                id: "3".into(),
                name: "Dog food".into()
            })
        );
        assert_eq!(
            app.pending_confirm.as_ref().unwrap().prompt(),
            "Are you sure you want to delete this item?"
        );
    }

    #[tokio::test]
    async fn test_request_delete_refused_while_in_flight() {
        let mut app = stocked_app();
        app.select_category("Pet Care");
        app.deleting = Some("3".into());
        app.request_delete();
        assert!(app.pending_confirm.is_none());
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_clamp_after_shrink() {
        let mut app = stocked_app();
        app.select_category("Dairy, Bread & Eggs");
        app.nav_down();
        assert_eq!(app.selected_row, 1);
        app.set_items(vec![item("1", "Milk", "Dairy, Bread & Eggs")]);
        assert_eq!(app.selected_row, 0);
    }

    #[tokio::test]
    async fn test_begin_fetch_bumps_generation() {
        let mut app = test_app();
        let first = app.begin_fetch();
        let second = app.begin_fetch();
        assert!(second > first);
        assert!(app.is_loading);
    }

    #[tokio::test]
    async fn test_cycle_theme_round_trip() {
        let mut app = test_app();
        assert_eq!(app.cycle_theme(), "Light");
        assert_eq!(app.theme_variant, ThemeVariant::Light);
        assert_eq!(app.cycle_theme(), "Dark");
        assert!(app.needs_redraw);
    }
}

//! Modal form state: the add/edit item form and the signup form.
//!
//! Forms hold raw text as typed; `validate` turns that text into a typed
//! request or a [`FormError`] without touching the network.

use crate::api::{InventoryItem, ItemDraft, ItemStatus, SignupRequest};
use crate::util::MAX_INPUT_LENGTH;
use rust_decimal::Decimal;
use secrecy::SecretString;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("{0} must be a whole number of 0 or more")]
    InvalidCount(&'static str),
    #[error("Price must be a number of 0 or more")]
    InvalidPrice,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Email must contain @")]
    InvalidEmail,
}

/// Push `c` onto `buf` unless it is a control char or the buffer is full.
/// Returns false when the character was rejected for length.
fn push_capped(buf: &mut String, c: char) -> bool {
    if c.is_control() {
        return true;
    }
    if buf.chars().count() >= MAX_INPUT_LENGTH {
        return false;
    }
    buf.push(c);
    true
}

fn parse_count(raw: &str, label: &'static str) -> Result<i64, FormError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or(FormError::InvalidCount(label))
}

// ============================================================================
// Item Form
// ============================================================================

/// Whether the item form creates a record or replaces an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Name,
    Category,
    Quantity,
    Price,
    Status,
    MinimumQuantity,
    Image,
}

impl ItemField {
    pub const ALL: [ItemField; 7] = [
        ItemField::Name,
        ItemField::Category,
        ItemField::Quantity,
        ItemField::Price,
        ItemField::Status,
        ItemField::MinimumQuantity,
        ItemField::Image,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ItemField::Name => "Name",
            ItemField::Category => "Category",
            ItemField::Quantity => "Quantity",
            ItemField::Price => "Price",
            ItemField::Status => "Status",
            ItemField::MinimumQuantity => "Minimum quantity",
            ItemField::Image => "Image URL",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemForm {
    pub mode: FormMode,
    pub name: String,
    pub category: String,
    pub quantity: String,
    pub price: String,
    pub status: ItemStatus,
    pub minimum_quantity: String,
    pub image: String,
    pub focus: ItemField,
}

impl ItemForm {
    /// Empty add form, pre-filled with `category` when one is selected.
    pub fn new_add(category: Option<&str>) -> Self {
        Self {
            mode: FormMode::Add,
            name: String::new(),
            category: category.unwrap_or_default().to_string(),
            quantity: String::new(),
            price: String::new(),
            status: ItemStatus::InStock,
            minimum_quantity: "1".to_string(),
            image: String::new(),
            focus: ItemField::Name,
        }
    }

    /// Edit form pre-filled from `item`. A missing minimum quantity shows as 1.
    pub fn new_edit(item: &InventoryItem) -> Self {
        Self {
            mode: FormMode::Edit {
                id: item.id.clone(),
            },
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity.to_string(),
            price: item.price.to_string(),
            status: item.status.clone(),
            minimum_quantity: item.minimum_quantity.unwrap_or(1).to_string(),
            image: item.image.clone().unwrap_or_default(),
            focus: ItemField::Name,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Edit { id } => Some(id),
            FormMode::Add => None,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() {
            "Edit Inventory Item"
        } else {
            "Add New Inventory Item"
        }
    }

    /// Submit button label; switches to a progress label while a call is in flight.
    pub fn submit_label(&self, submitting: bool) -> &'static str {
        match (self.is_edit(), submitting) {
            (false, false) => "Add Item",
            (false, true) => "Adding...",
            (true, false) => "Save Changes",
            (true, true) => "Updating...",
        }
    }

    pub fn focus_next(&mut self) {
        let idx = (self.focus.index() + 1) % ItemField::ALL.len();
        self.focus = ItemField::ALL[idx];
    }

    pub fn focus_prev(&mut self) {
        let len = ItemField::ALL.len();
        let idx = (self.focus.index() + len - 1) % len;
        self.focus = ItemField::ALL[idx];
    }

    /// Text buffer behind the focused field; `None` for the status selector.
    fn focused_buffer(&mut self) -> Option<&mut String> {
        match self.focus {
            ItemField::Name => Some(&mut self.name),
            ItemField::Category => Some(&mut self.category),
            ItemField::Quantity => Some(&mut self.quantity),
            ItemField::Price => Some(&mut self.price),
            ItemField::MinimumQuantity => Some(&mut self.minimum_quantity),
            ItemField::Image => Some(&mut self.image),
            ItemField::Status => None,
        }
    }

    /// Type a character into the focused field. Space on the status field
    /// cycles it. Returns false when the field is at its length cap.
    pub fn input_char(&mut self, c: char) -> bool {
        if self.focus == ItemField::Status {
            if c == ' ' {
                self.cycle_status(true);
            }
            return true;
        }
        match self.focused_buffer() {
            Some(buf) => push_capped(buf, c),
            None => true,
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = self.focused_buffer() {
            buf.pop();
        }
    }

    pub fn cycle_status(&mut self, forward: bool) {
        self.status = if forward {
            self.status.next()
        } else {
            self.status.prev()
        };
    }

    /// Display value for a field.
    pub fn value(&self, field: ItemField) -> &str {
        match field {
            ItemField::Name => &self.name,
            ItemField::Category => &self.category,
            ItemField::Quantity => &self.quantity,
            ItemField::Price => &self.price,
            ItemField::Status => self.status.as_str(),
            ItemField::MinimumQuantity => &self.minimum_quantity,
            ItemField::Image => &self.image,
        }
    }

    /// Check every field and build the request payload.
    pub fn validate(&self) -> Result<ItemDraft, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Required("Name"));
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(FormError::Required("Category"));
        }
        if self.quantity.trim().is_empty() {
            return Err(FormError::Required("Quantity"));
        }
        let quantity = parse_count(&self.quantity, "Quantity")?;

        if self.price.trim().is_empty() {
            return Err(FormError::Required("Price"));
        }
        let price = Decimal::from_str(self.price.trim())
            .ok()
            .filter(|p| !p.is_sign_negative())
            .ok_or(FormError::InvalidPrice)?;

        let minimum_quantity = match self.minimum_quantity.trim() {
            "" => None,
            raw => Some(parse_count(raw, "Minimum quantity")?),
        };
        let image = Some(self.image.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(ItemDraft {
            name: name.to_string(),
            category: category.to_string(),
            quantity,
            price,
            status: self.status.clone(),
            image,
            minimum_quantity,
        })
    }
}

// ============================================================================
// Signup Form
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Staff,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Staff => "Staff",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Role::Staff => Role::Manager,
            Role::Manager => Role::Admin,
            Role::Admin => Role::Staff,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Role::Staff => Role::Admin,
            Role::Manager => Role::Staff,
            Role::Admin => Role::Manager,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignupField {
    #[default]
    Name,
    Email,
    Password,
    PasswordConfirm,
    CompanyName,
    Role,
}

impl SignupField {
    pub const ALL: [SignupField; 6] = [
        SignupField::Name,
        SignupField::Email,
        SignupField::Password,
        SignupField::PasswordConfirm,
        SignupField::CompanyName,
        SignupField::Role,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SignupField::Name => "Full name",
            SignupField::Email => "Email",
            SignupField::Password => "Password",
            SignupField::PasswordConfirm => "Confirm password",
            SignupField::CompanyName => "Company name",
            SignupField::Role => "Role",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, SignupField::Password | SignupField::PasswordConfirm)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// SEC: Debug is implemented by hand so passwords never reach logs.
#[derive(Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub company_name: String,
    pub role: Role,
    pub focus: SignupField,
}

impl std::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirm", &"[REDACTED]")
            .field("company_name", &self.company_name)
            .field("role", &self.role)
            .field("focus", &self.focus)
            .finish()
    }
}

impl SignupForm {
    pub fn focus_next(&mut self) {
        let idx = (self.focus.index() + 1) % SignupField::ALL.len();
        self.focus = SignupField::ALL[idx];
    }

    pub fn focus_prev(&mut self) {
        let len = SignupField::ALL.len();
        let idx = (self.focus.index() + len - 1) % len;
        self.focus = SignupField::ALL[idx];
    }

    fn focused_buffer(&mut self) -> Option<&mut String> {
        match self.focus {
            SignupField::Name => Some(&mut self.name),
            SignupField::Email => Some(&mut self.email),
            SignupField::Password => Some(&mut self.password),
            SignupField::PasswordConfirm => Some(&mut self.password_confirm),
            SignupField::CompanyName => Some(&mut self.company_name),
            SignupField::Role => None,
        }
    }

    /// Same contract as [`ItemForm::input_char`]; space cycles the role.
    pub fn input_char(&mut self, c: char) -> bool {
        if self.focus == SignupField::Role {
            if c == ' ' {
                self.role = self.role.next();
            }
            return true;
        }
        match self.focused_buffer() {
            Some(buf) => push_capped(buf, c),
            None => true,
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = self.focused_buffer() {
            buf.pop();
        }
    }

    pub fn cycle_role(&mut self, forward: bool) {
        self.role = if forward {
            self.role.next()
        } else {
            self.role.prev()
        };
    }

    /// Value as rendered: secret fields are masked one `*` per character.
    pub fn display_value(&self, field: SignupField) -> String {
        let raw = match field {
            SignupField::Name => &self.name,
            SignupField::Email => &self.email,
            SignupField::Password => &self.password,
            SignupField::PasswordConfirm => &self.password_confirm,
            SignupField::CompanyName => &self.company_name,
            SignupField::Role => return self.role.as_str().to_string(),
        };
        if field.is_secret() {
            "*".repeat(raw.chars().count())
        } else {
            raw.clone()
        }
    }

    /// Password match is checked first, before any other field.
    pub fn validate(&self) -> Result<SignupRequest, FormError> {
        if self.password != self.password_confirm {
            return Err(FormError::PasswordMismatch);
        }
        if self.name.trim().is_empty() {
            return Err(FormError::Required("Name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::Required("Email"));
        }
        if !email.contains('@') {
            return Err(FormError::InvalidEmail);
        }
        if self.password.is_empty() {
            return Err(FormError::Required("Password"));
        }

        Ok(SignupRequest {
            name: self.name.trim().to_string(),
            email: email.to_string(),
            password: SecretString::from(self.password.clone()),
            password_confirm: SecretString::from(self.password_confirm.clone()),
            company_name: self.company_name.trim().to_string(),
            role: self.role.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled_add_form() -> ItemForm {
        let mut form = ItemForm::new_add(Some("Pet Care"));
        form.name = "Dog food".into();
        form.quantity = "4".into();
        form.price = "799.00".into();
        form
    }

    #[test]
    fn add_form_prefills_selected_category() {
        let form = ItemForm::new_add(Some("Pet Care"));
        assert_eq!(form.category, "Pet Care");
        assert_eq!(form.status, ItemStatus::InStock);
        assert_eq!(form.title(), "Add New Inventory Item");
        assert!(ItemForm::new_add(None).category.is_empty());
    }

    #[test]
    fn edit_form_defaults_minimum_quantity_to_one() {
        let item = InventoryItem {
            id: "9".into(),
            name: "Soap".into(),
            category: "Personal Care".into(),
            quantity: 7,
            price: Decimal::new(4500, 2),
            status: ItemStatus::LowStock,
            image: None,
            minimum_quantity: None,
        };
        let form = ItemForm::new_edit(&item);
        assert_eq!(form.minimum_quantity, "1");
        assert_eq!(form.price, "45.00");
        assert_eq!(form.editing_id(), Some("9"));
        assert_eq!(form.title(), "Edit Inventory Item");
        assert_eq!(form.submit_label(false), "Save Changes");
        assert_eq!(form.submit_label(true), "Updating...");
    }

    #[test]
    fn validate_builds_draft() {
        let draft = filled_add_form().validate().unwrap();
        assert_eq!(draft.name, "Dog food");
        assert_eq!(draft.quantity, 4);
        assert_eq!(draft.price, Decimal::new(79900, 2));
        assert_eq!(draft.minimum_quantity, Some(1));
        assert_eq!(draft.image, None);
    }

    #[test]
    fn validate_rejects_bad_fields() {
        let mut form = filled_add_form();
        form.name = "   ".into();
        assert_eq!(form.validate(), Err(FormError::Required("Name")));

        let mut form = filled_add_form();
        form.quantity = "-1".into();
        assert_eq!(form.validate(), Err(FormError::InvalidCount("Quantity")));

        let mut form = filled_add_form();
        form.quantity = "2.5".into();
        assert_eq!(form.validate(), Err(FormError::InvalidCount("Quantity")));

        let mut form = filled_add_form();
        form.price = "abc".into();
        assert_eq!(form.validate(), Err(FormError::InvalidPrice));

        let mut form = filled_add_form();
        form.price = "-3".into();
        assert_eq!(form.validate(), Err(FormError::InvalidPrice));

        let mut form = filled_add_form();
        form.minimum_quantity = String::new();
        assert_eq!(form.validate().unwrap().minimum_quantity, None);
    }

    #[test]
    fn focus_wraps_both_ways() {
        let mut form = ItemForm::new_add(None);
        form.focus_prev();
        assert_eq!(form.focus, ItemField::Image);
        form.focus_next();
        assert_eq!(form.focus, ItemField::Name);
    }

    #[test]
    fn typing_respects_focus_and_cap() {
        let mut form = ItemForm::new_add(None);
        for c in "Tea".chars() {
            assert!(form.input_char(c));
        }
        assert_eq!(form.name, "Tea");
        form.backspace();
        assert_eq!(form.name, "Te");

        form.focus = ItemField::Status;
        form.input_char(' ');
        assert_eq!(form.status, ItemStatus::LowStock);
        form.input_char('x');
        assert_eq!(form.status, ItemStatus::LowStock);

        form.focus = ItemField::Image;
        form.image = "x".repeat(MAX_INPUT_LENGTH);
        assert!(!form.input_char('y'));
        assert_eq!(form.image.len(), MAX_INPUT_LENGTH);
    }

    fn filled_signup() -> SignupForm {
        SignupForm {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            password: "hunter22".into(),
            password_confirm: "hunter22".into(),
            company_name: "Acme".into(),
            ..SignupForm::default()
        }
    }

    #[test]
    fn signup_password_mismatch_checked_first() {
        let mut form = SignupForm {
            password: "a".into(),
            password_confirm: "b".into(),
            ..SignupForm::default()
        };
        assert_eq!(form.validate().unwrap_err(), FormError::PasswordMismatch);
        form.password_confirm = "a".into();
        assert_eq!(form.validate().unwrap_err(), FormError::Required("Name"));
    }

    #[test]
    fn signup_validates_email_and_defaults_role() {
        let mut form = filled_signup();
        let req = form.validate().unwrap();
        assert_eq!(req.role, "Staff");
        assert_eq!(req.company_name, "Acme");
        assert_eq!(secrecy::ExposeSecret::expose_secret(&req.password), "hunter22");
        assert!(!format!("{:?}", req).contains("hunter22"));

        form.email = "asha.example.com".into();
        assert_eq!(form.validate().unwrap_err(), FormError::InvalidEmail);
    }

    #[test]
    fn signup_masks_passwords() {
        let form = filled_signup();
        assert_eq!(form.display_value(SignupField::Password), "********");
        assert_eq!(form.display_value(SignupField::Email), "asha@example.com");
        assert!(!format!("{:?}", form).contains("hunter22"));
    }

    #[test]
    fn role_cycles() {
        let mut form = SignupForm::default();
        form.cycle_role(true);
        assert_eq!(form.role, Role::Manager);
        form.cycle_role(false);
        form.cycle_role(false);
        assert_eq!(form.role, Role::Admin);
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::session::UserId;

/// A persisted job listing.
pub type Listing = models::listing::Model;

/// Form fields accepted from listing submissions. Anything else in the
/// request body (including `user_id`) is never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Title,
    Description,
    Salary,
    Tags,
    Company,
    Address,
    City,
    State,
    Phone,
    Email,
    Requirements,
    Benefits,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Title,
        Field::Description,
        Field::Salary,
        Field::Tags,
        Field::Company,
        Field::Address,
        Field::City,
        Field::State,
        Field::Phone,
        Field::Email,
        Field::Requirements,
        Field::Benefits,
    ];

    pub const REQUIRED: [Field; 6] = [
        Field::Title,
        Field::Description,
        Field::Salary,
        Field::Email,
        Field::City,
        Field::State,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Salary => "salary",
            Field::Tags => "tags",
            Field::Company => "company",
            Field::Address => "address",
            Field::City => "city",
            Field::State => "state",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Requirements => "requirements",
            Field::Benefits => "benefits",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn is_required(self) -> bool {
        Field::REQUIRED.contains(&self)
    }

    /// `"<Field> is required"` with the field name capitalised.
    pub fn required_message(self) -> String {
        let name = self.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} is required", first.to_ascii_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trims surrounding whitespace and drops control characters other than
/// newlines and tabs. HTML escaping happens at render time.
pub fn sanitize(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect();
    kept.trim().to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Submitted listing form. `None` means the field was not part of the
/// submission; `Some("")` means it was submitted empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ListingForm {
    #[validate(required(message = "Title is required"), length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(required(message = "Description is required"), length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(required(message = "Salary is required"), length(min = 1, message = "Salary is required"))]
    pub salary: Option<String>,
    pub tags: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    #[validate(required(message = "City is required"), length(min = 1, message = "City is required"))]
    pub city: Option<String>,
    #[validate(required(message = "State is required"), length(min = 1, message = "State is required"))]
    pub state: Option<String>,
    pub phone: Option<String>,
    #[validate(required(message = "Email is required"), length(min = 1, message = "Email is required"))]
    pub email: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
}

impl ListingForm {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Salary => &self.salary,
            Field::Tags => &self.tags,
            Field::Company => &self.company,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::Phone => &self.phone,
            Field::Email => &self.email,
            Field::Requirements => &self.requirements,
            Field::Benefits => &self.benefits,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Salary => &mut self.salary,
            Field::Tags => &mut self.tags,
            Field::Company => &mut self.company,
            Field::Address => &mut self.address,
            Field::City => &mut self.city,
            Field::State => &mut self.state,
            Field::Phone => &mut self.phone,
            Field::Email => &mut self.email,
            Field::Requirements => &mut self.requirements,
            Field::Benefits => &mut self.benefits,
        }
    }

    pub fn sanitized(mut self) -> Self {
        for field in Field::ALL {
            let slot = self.slot_mut(field);
            if let Some(value) = slot.take() {
                *slot = Some(sanitize(&value));
            }
        }
        self
    }

    /// Validates every required field, collecting all failures.
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(FieldErrors::from)
    }
}

/// Validation failures keyed by field, one message each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> Vec<Field> {
        self.0.keys().copied().collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.values().cloned().collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut map = BTreeMap::new();
        for (name, list) in errors.field_errors() {
            let Some(field) = Field::from_name(&name) else { continue };
            let message = list
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| field.required_message());
            map.insert(field, message);
        }
        FieldErrors(map)
    }
}

/// A validated listing ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub salary: String,
    pub tags: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub phone: Option<String>,
    pub email: String,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
}

impl NewListing {
    /// Sanitizes and validates `form`; the owner always comes from `user_id`.
    pub fn from_form(user_id: UserId, form: ListingForm) -> Result<Self, FieldErrors> {
        let form = form.sanitized();
        form.check()?;
        let required = |v: Option<String>| v.unwrap_or_default();
        Ok(NewListing {
            user_id,
            title: required(form.title),
            description: required(form.description),
            salary: required(form.salary),
            tags: non_empty(form.tags),
            company: non_empty(form.company),
            address: non_empty(form.address),
            city: required(form.city),
            state: required(form.state),
            phone: non_empty(form.phone),
            email: required(form.email),
            requirements: non_empty(form.requirements),
            benefits: non_empty(form.benefits),
        })
    }
}

/// Column changes for an update. Required columns are always part of a
/// valid submission. Optional columns: `None` leaves the column untouched,
/// `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingChanges {
    pub title: String,
    pub description: String,
    pub salary: String,
    pub tags: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub city: String,
    pub state: String,
    pub phone: Option<Option<String>>,
    pub email: String,
    pub requirements: Option<Option<String>>,
    pub benefits: Option<Option<String>>,
}

impl ListingChanges {
    pub fn from_form(form: ListingForm) -> Result<Self, FieldErrors> {
        let form = form.sanitized();
        form.check()?;
        let required = |v: Option<String>| v.unwrap_or_default();
        let optional = |v: Option<String>| v.map(|s| non_empty(Some(s)));
        Ok(ListingChanges {
            title: required(form.title),
            description: required(form.description),
            salary: required(form.salary),
            tags: optional(form.tags),
            company: optional(form.company),
            address: optional(form.address),
            city: required(form.city),
            state: required(form.state),
            phone: optional(form.phone),
            email: required(form.email),
            requirements: optional(form.requirements),
            benefits: optional(form.benefits),
        })
    }

    /// Columns this change writes, in allow-list order.
    pub fn fields(&self) -> Vec<Field> {
        let optional = [
            (Field::Tags, self.tags.is_some()),
            (Field::Company, self.company.is_some()),
            (Field::Address, self.address.is_some()),
            (Field::Phone, self.phone.is_some()),
            (Field::Requirements, self.requirements.is_some()),
            (Field::Benefits, self.benefits.is_some()),
        ];
        Field::ALL
            .into_iter()
            .filter(|f| f.is_required() || optional.iter().any(|(o, present)| o == f && *present))
            .collect()
    }

    pub fn apply_to(self, listing: &mut Listing) {
        listing.title = self.title;
        listing.description = self.description;
        listing.salary = self.salary;
        listing.city = self.city;
        listing.state = self.state;
        listing.email = self.email;
        let patch = |slot: &mut Option<String>, change: Option<Option<String>>| {
            if let Some(value) = change {
                *slot = value;
            }
        };
        patch(&mut listing.tags, self.tags);
        patch(&mut listing.company, self.company);
        patch(&mut listing.address, self.address);
        patch(&mut listing.phone, self.phone);
        patch(&mut listing.requirements, self.requirements);
        patch(&mut listing.benefits, self.benefits);
    }
}

/// Trimmed search terms; an empty term matches every listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: String,
    pub location: String,
}

impl SearchQuery {
    pub fn new(keywords: &str, location: &str) -> Self {
        Self { keywords: keywords.trim().to_string(), location: location.trim().to_string() }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        let contains = |hay: Option<&str>, needle: &str| {
            hay.map(|h| h.to_lowercase().contains(&needle.to_lowercase())).unwrap_or(false)
        };
        let keyword_hit = [
            Some(listing.title.as_str()),
            Some(listing.description.as_str()),
            listing.tags.as_deref(),
            listing.company.as_deref(),
        ]
        .into_iter()
        .any(|h| contains(h, &self.keywords));
        let location_hit = [Some(listing.city.as_str()), Some(listing.state.as_str())]
            .into_iter()
            .any(|h| contains(h, &self.location));
        keyword_hit && location_hit
    }
}

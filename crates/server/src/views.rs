//! HTML pages. Values are escaped by askama at render time.

use askama::Template;

use service::listings::domain::{Field, FieldErrors, Listing, ListingForm};
use service::listings::session::{Flash, FlashKind};
use service::listings::View;

pub struct FlashView {
    pub class: &'static str,
    pub message: String,
}

impl From<&Flash> for FlashView {
    fn from(flash: &Flash) -> Self {
        let class = match flash.kind {
            FlashKind::Success => "flash success",
            FlashKind::Error => "flash error",
        };
        FlashView { class, message: flash.message.clone() }
    }
}

/// One input on the create/edit form.
pub struct FieldView {
    pub name: &'static str,
    pub label: String,
    pub value: String,
    pub error: Option<String>,
    pub required: bool,
    pub multiline: bool,
}

/// A labelled value on the detail page.
pub struct Detail {
    pub label: String,
    pub value: String,
}

fn label(field: Field) -> String {
    let name = field.name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

fn form_fields(value_of: impl Fn(Field) -> String, errors: &FieldErrors) -> Vec<FieldView> {
    Field::ALL
        .into_iter()
        .map(|field| FieldView {
            name: field.name(),
            label: label(field),
            value: value_of(field),
            error: errors.get(field).map(str::to_string),
            required: field.is_required(),
            multiline: matches!(field, Field::Description | Field::Requirements | Field::Benefits),
        })
        .collect()
}

fn listing_value(listing: &Listing, field: Field) -> Option<&str> {
    match field {
        Field::Title => Some(&listing.title),
        Field::Description => Some(&listing.description),
        Field::Salary => Some(&listing.salary),
        Field::Tags => listing.tags.as_deref(),
        Field::Company => listing.company.as_deref(),
        Field::Address => listing.address.as_deref(),
        Field::City => Some(&listing.city),
        Field::State => Some(&listing.state),
        Field::Phone => listing.phone.as_deref(),
        Field::Email => Some(&listing.email),
        Field::Requirements => listing.requirements.as_deref(),
        Field::Benefits => listing.benefits.as_deref(),
    }
}

#[derive(Template)]
#[template(path = "listings/index.html")]
pub struct IndexPage {
    pub flashes: Vec<FlashView>,
    pub listings: Vec<Listing>,
    pub keywords: String,
    pub location: String,
}

#[derive(Template)]
#[template(path = "listings/show.html")]
pub struct ShowPage {
    pub flashes: Vec<FlashView>,
    pub listing: Listing,
    pub details: Vec<Detail>,
    pub is_owner: bool,
}

#[derive(Template)]
#[template(path = "listings/create.html")]
pub struct CreatePage {
    pub flashes: Vec<FlashView>,
    pub errors: Vec<String>,
    pub fields: Vec<FieldView>,
}

#[derive(Template)]
#[template(path = "listings/edit.html")]
pub struct EditPage {
    pub flashes: Vec<FlashView>,
    pub id: i32,
    pub errors: Vec<String>,
    pub fields: Vec<FieldView>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub flashes: Vec<FlashView>,
    pub status: u16,
    pub message: String,
}

/// Render a controller view with the flashes it consumed.
pub fn render(view: View, flashes: &[Flash]) -> Result<String, askama::Error> {
    let flashes: Vec<FlashView> = flashes.iter().map(FlashView::from).collect();
    match view {
        View::Index { listings, keywords, location } => IndexPage { flashes, listings, keywords, location }.render(),
        View::Show { listing, is_owner } => {
            let details = [Field::Company, Field::Tags, Field::Address, Field::Phone, Field::Requirements, Field::Benefits]
                .into_iter()
                .filter_map(|f| listing_value(&listing, f).map(|v| Detail { label: label(f), value: v.to_string() }))
                .collect();
            ShowPage { flashes, listing, details, is_owner }.render()
        }
        View::Create { listing, errors } => {
            let fields = form_fields(|f| create_value(&listing, f), &errors);
            CreatePage { flashes, errors: errors.messages(), fields }.render()
        }
        View::Edit { listing, errors } => {
            let fields = form_fields(|f| listing_value(&listing, f).unwrap_or_default().to_string(), &errors);
            EditPage { flashes, id: listing.id, errors: errors.messages(), fields }.render()
        }
    }
}

fn create_value(form: &ListingForm, field: Field) -> String {
    form.get(field).unwrap_or_default().to_string()
}

pub fn error_page(status: u16, message: &str, flashes: &[Flash]) -> Result<String, askama::Error> {
    ErrorPage { flashes: flashes.iter().map(FlashView::from).collect(), status, message: message.to_string() }.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        Listing {
            id: 7,
            user_id: 1,
            title: "<script>alert(1)</script>".into(),
            description: "Build APIs".into(),
            salary: "90000".into(),
            tags: None,
            company: Some("Acme".into()),
            address: None,
            city: "Austin".into(),
            state: "TX".into(),
            phone: None,
            email: "a@b.com".into(),
            requirements: None,
            benefits: None,
            created_at: chrono::Utc::now().into(),
        }
    }

    #[test]
    fn show_page_escapes_stored_text() {
        let html = render(View::Show { listing: listing(), is_owner: false }, &[]).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("Acme"));
        assert!(!html.contains("/listings/7/edit"));
    }

    #[test]
    fn owner_sees_edit_and_delete_controls() {
        let html = render(View::Show { listing: listing(), is_owner: true }, &[]).unwrap();
        assert!(html.contains("/listings/7/edit"));
        assert!(html.contains("/listings/7/delete"));
    }

    #[test]
    fn create_page_shows_errors_and_attempted_values() {
        let mut form = ListingForm::default();
        form.set(Field::City, "Austin");
        let errors = form.check().unwrap_err();
        let flash = Flash { kind: FlashKind::Error, message: "careful".into() };
        let html = render(View::Create { listing: form, errors }, &[flash]).unwrap();
        assert!(html.contains("Title is required"));
        assert!(html.contains(r#"value="Austin""#));
        assert!(html.contains("careful"));
    }

    #[test]
    fn index_page_refills_search_inputs() {
        let view = View::Index { listings: vec![listing()], keywords: r#"say "hi""#.into(), location: "TX".into() };
        let html = render(view, &[]).unwrap();
        assert!(html.contains(r#"value="TX""#));
        assert!(!html.contains(r#"value="say "hi"""#));
        assert!(html.contains("value=\"say &"));
    }
}

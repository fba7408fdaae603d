use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::authorization::is_owner;
use super::domain::{FieldErrors, Listing, ListingChanges, ListingForm, NewListing, SearchQuery};
use super::repository::ListingRepository;
use super::session::{FlashKind, Session};
use crate::errors::ServiceError;

pub const LISTING_NOT_FOUND: &str = "Listing not found";
pub const LISTING_CREATED: &str = "Listing created successfully";
pub const LISTING_UPDATED: &str = "Listing updated successfully";
pub const LISTING_DELETED: &str = "Listing deleted successfully";
pub const NOT_AUTHORIZED_DELETE: &str = "You are not authorized to delete this listing";
pub const NOT_AUTHORIZED_UPDATE: &str = "You are not authorized to update this listing";
pub const LOGIN_REQUIRED: &str = "You must be logged in to post a listing";

pub const INDEX_PATH: &str = "/listings";

pub fn listing_path(id: i32) -> String {
    format!("{INDEX_PATH}/{id}")
}

/// Pages the controller can ask the web layer to render.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Index { listings: Vec<Listing>, keywords: String, location: String },
    Show { listing: Listing, is_owner: bool },
    /// Blank on first display; holds the attempted values after a failed submit.
    Create { listing: ListingForm, errors: FieldErrors },
    Edit { listing: Listing, errors: FieldErrors },
}

/// Result of a controller action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Render(View),
    Redirect(String),
    NotFound(String),
}

impl Outcome {
    fn not_found() -> Self {
        Outcome::NotFound(LISTING_NOT_FOUND.to_string())
    }
}

/// Listing actions, independent of the web framework. Recoverable
/// conditions (missing record, bad input, wrong owner) come back as an
/// `Outcome`; only storage failures are `Err`.
pub struct ListingController<R: ListingRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: ListingRepository + ?Sized> Clone for ListingController<R> {
    fn clone(&self) -> Self {
        Self { repo: Arc::clone(&self.repo) }
    }
}

impl<R: ListingRepository + ?Sized> ListingController<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// All listings, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Outcome, ServiceError> {
        let listings = self.repo.list_recent().await?;
        Ok(Outcome::Render(View::Index { listings, keywords: String::new(), location: String::new() }))
    }

    pub fn new_form(&self) -> Outcome {
        Outcome::Render(View::Create { listing: ListingForm::default(), errors: FieldErrors::default() })
    }

    #[instrument(skip(self, session))]
    pub async fn get(&self, session: &Session, id: i32) -> Result<Outcome, ServiceError> {
        let Some(listing) = self.repo.find(id).await? else {
            return Ok(Outcome::not_found());
        };
        let is_owner = is_owner(session, listing.user_id);
        Ok(Outcome::Render(View::Show { listing, is_owner }))
    }

    /// Creates a listing owned by the session user.
    ///
    /// # Examples
    /// ```
    /// use service::listings::controller::{ListingController, Outcome};
    /// use service::listings::domain::ListingForm;
    /// use service::listings::repository::mock::MockListingRepository;
    /// use service::listings::session::{Session, UserId};
    /// use std::sync::Arc;
    /// let ctl = ListingController::new(Arc::new(MockListingRepository::default()));
    /// let mut session = Session::for_user(UserId(1));
    /// let form = ListingForm {
    ///     title: Some("Backend Dev".into()),
    ///     description: Some("Build APIs".into()),
    ///     salary: Some("90000".into()),
    ///     email: Some("a@b.com".into()),
    ///     city: Some("Austin".into()),
    ///     state: Some("TX".into()),
    ///     ..ListingForm::default()
    /// };
    /// let outcome = tokio_test::block_on(ctl.create(&mut session, form)).unwrap();
    /// assert_eq!(outcome, Outcome::Redirect("/listings".into()));
    /// ```
    #[instrument(skip(self, session, form))]
    pub async fn create(&self, session: &mut Session, form: ListingForm) -> Result<Outcome, ServiceError> {
        let Some(user) = session.current_user() else {
            warn!("anonymous listing submission");
            session.set_flash(FlashKind::Error, LOGIN_REQUIRED);
            return Ok(Outcome::Redirect(INDEX_PATH.to_string()));
        };

        let form = form.sanitized();
        let new = match NewListing::from_form(user, form.clone()) {
            Ok(new) => new,
            Err(errors) => {
                info!(user_id = %user, invalid_fields = errors.len(), "listing_rejected");
                return Ok(Outcome::Render(View::Create { listing: form, errors }));
            }
        };

        let created = self.repo.insert(new).await?;
        info!(listing_id = created.id, user_id = %user, "listing_created");
        session.set_flash(FlashKind::Success, LISTING_CREATED);
        Ok(Outcome::Redirect(INDEX_PATH.to_string()))
    }

    #[instrument(skip(self, session))]
    pub async fn delete(&self, session: &mut Session, id: i32) -> Result<Outcome, ServiceError> {
        let Some(listing) = self.repo.find(id).await? else {
            return Ok(Outcome::not_found());
        };
        if !is_owner(session, listing.user_id) {
            session.set_flash(FlashKind::Error, NOT_AUTHORIZED_DELETE);
            return Ok(Outcome::Redirect(listing_path(id)));
        }

        if !self.repo.delete(id).await? {
            return Ok(Outcome::not_found());
        }
        info!(listing_id = id, "listing_deleted");
        session.set_flash(FlashKind::Success, LISTING_DELETED);
        Ok(Outcome::Redirect(INDEX_PATH.to_string()))
    }

    #[instrument(skip(self, session))]
    pub async fn edit_form(&self, session: &mut Session, id: i32) -> Result<Outcome, ServiceError> {
        let Some(listing) = self.repo.find(id).await? else {
            return Ok(Outcome::not_found());
        };
        if !is_owner(session, listing.user_id) {
            session.set_flash(FlashKind::Error, NOT_AUTHORIZED_UPDATE);
            return Ok(Outcome::Redirect(listing_path(id)));
        }
        Ok(Outcome::Render(View::Edit { listing, errors: FieldErrors::default() }))
    }

    /// Writes exactly the submitted fields. A failed validation re-renders
    /// the edit page with the stored listing, not the submitted values.
    #[instrument(skip(self, session, form))]
    pub async fn update(&self, session: &mut Session, id: i32, form: ListingForm) -> Result<Outcome, ServiceError> {
        let Some(listing) = self.repo.find(id).await? else {
            return Ok(Outcome::not_found());
        };
        if !is_owner(session, listing.user_id) {
            session.set_flash(FlashKind::Error, NOT_AUTHORIZED_UPDATE);
            return Ok(Outcome::Redirect(listing_path(id)));
        }

        let changes = match ListingChanges::from_form(form) {
            Ok(changes) => changes,
            Err(errors) => {
                info!(listing_id = id, invalid_fields = errors.len(), "listing_update_rejected");
                return Ok(Outcome::Render(View::Edit { listing, errors }));
            }
        };

        match self.repo.update(id, changes).await {
            Ok(()) => {}
            Err(ServiceError::NotFound(_)) => return Ok(Outcome::not_found()),
            Err(e) => return Err(e),
        }
        info!(listing_id = id, "listing_updated");
        session.set_flash(FlashKind::Success, LISTING_UPDATED);
        Ok(Outcome::Redirect(listing_path(id)))
    }

    #[instrument(skip(self))]
    pub async fn search(&self, keywords: &str, location: &str) -> Result<Outcome, ServiceError> {
        let query = SearchQuery::new(keywords, location);
        let listings = self.repo.search(&query).await?;
        info!(results = listings.len(), "listing_search");
        Ok(Outcome::Render(View::Index { listings, keywords: query.keywords, location: query.location }))
    }
}

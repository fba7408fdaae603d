use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use service::listings::controller::LISTING_NOT_FOUND;
use service::listings::domain::ListingForm;
use service::listings::session::Session;
use service::listings::Outcome;

use crate::errors::AppError;
use crate::session::{clear_flashes, store_flashes, CurrentSession};
use crate::state::ServerState;
use crate::views;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub location: String,
}

/// Translate a controller outcome into a response. Redirects carry the
/// session's flashes forward; rendered pages consume them.
fn respond(outcome: Outcome, mut session: Session, jar: CookieJar) -> Result<Response, AppError> {
    match outcome {
        Outcome::Redirect(to) => {
            let jar = store_flashes(jar, session.flashes());
            Ok((jar, Redirect::to(&to)).into_response())
        }
        Outcome::Render(view) => {
            let html = views::render(view, &session.take_flashes())?;
            Ok((clear_flashes(jar), Html(html)).into_response())
        }
        Outcome::NotFound(message) => not_found(&message, &mut session, jar),
    }
}

fn not_found(message: &str, session: &mut Session, jar: CookieJar) -> Result<Response, AppError> {
    let html = views::error_page(StatusCode::NOT_FOUND.as_u16(), message, &session.take_flashes())?;
    Ok((StatusCode::NOT_FOUND, clear_flashes(jar), Html(html)).into_response())
}

/// Numeric listing id from the path.
fn parse_id(raw: &str) -> Option<i32> {
    raw.parse::<i32>().ok()
}

pub async fn index(
    State(state): State<ServerState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let outcome = state.listings.list().await?;
    respond(outcome, session, jar)
}

pub async fn create_form(
    State(state): State<ServerState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
) -> Result<Response, AppError> {
    respond(state.listings.new_form(), session, jar)
}

pub async fn store(
    State(state): State<ServerState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    Form(form): Form<ListingForm>,
) -> Result<Response, AppError> {
    let outcome = state.listings.create(&mut session, form).await?;
    respond(outcome, session, jar)
}

pub async fn show(
    State(state): State<ServerState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&id) else {
        return not_found(LISTING_NOT_FOUND, &mut session, jar);
    };
    let outcome = state.listings.get(&session, id).await?;
    respond(outcome, session, jar)
}

pub async fn edit_form(
    State(state): State<ServerState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&id) else {
        return not_found(LISTING_NOT_FOUND, &mut session, jar);
    };
    let outcome = state.listings.edit_form(&mut session, id).await?;
    respond(outcome, session, jar)
}

pub async fn update(
    State(state): State<ServerState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<ListingForm>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&id) else {
        return not_found(LISTING_NOT_FOUND, &mut session, jar);
    };
    let outcome = state.listings.update(&mut session, id, form).await?;
    respond(outcome, session, jar)
}

pub async fn destroy(
    State(state): State<ServerState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(id) = parse_id(&id) else {
        return not_found(LISTING_NOT_FOUND, &mut session, jar);
    };
    let outcome = state.listings.delete(&mut session, id).await?;
    respond(outcome, session, jar)
}

pub async fn search(
    State(state): State<ServerState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let outcome = state.listings.search(&params.keywords, &params.location).await?;
    respond(outcome, session, jar)
}

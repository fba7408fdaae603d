use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::{DatabaseConnection, EntityTrait};
use service::listings::session::UserId;
use tower::ServiceExt;

use jsonwebtoken::{encode, EncodingKey, Header};
use server::auth::{Claims, ServerAuthConfig, AUTH_COOKIE};
use server::routes;
use server::state::ServerState;

struct TestApp {
    router: Router,
    db: DatabaseConnection,
    auth: ServerAuthConfig,
}

impl TestApp {
    async fn new() -> anyhow::Result<Self> {
        let db = models::db::connect_in_memory().await?;
        migration::Migrator::up(&db, None).await?;
        let auth = ServerAuthConfig { jwt_secret: "test-secret".into() };
        let router = routes::build_router(ServerState::new(db.clone(), auth.clone()));
        Ok(Self { router, db, auth })
    }

    fn login_cookie(&self, user: i32) -> anyhow::Result<String> {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize;
        let claims = Claims { sub: "tester@example.com".into(), uid: UserId(user).to_string(), exp };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(self.auth.jwt_secret.as_bytes()))?;
        Ok(format!("{AUTH_COOKIE}={token}"))
    }

    async fn send(&self, method: &str, uri: &str, cookie: Option<&str>, form: Option<&str>) -> anyhow::Result<Response<Body>> {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                req = req.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_string())
            }
            None => Body::empty(),
        };
        Ok(self.router.clone().oneshot(req.body(body)?).await?)
    }
}

const BACKEND_DEV: &str =
    "title=Backend+Dev&description=Build+APIs&salary=90000&email=a%40b.com&city=Austin&state=TX&tags=&user_id=99";

fn location(resp: &Response<Body>) -> Option<&str> {
    resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

/// `name=value` pairs from every Set-Cookie header.
fn set_cookies(resp: &Response<Body>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::to_string)
        .collect()
}

async fn body_text(resp: Response<Body>) -> anyhow::Result<String> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn health_and_root_redirect() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let resp = app.send("GET", "/health", None, None).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await?, r#"{"status":"ok"}"#);

    let resp = app.send("GET", "/", None, None).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/listings"));
    Ok(())
}

#[tokio::test]
async fn create_flashes_success_on_next_page() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let login = app.login_cookie(1)?;

    let resp = app.send("POST", "/listings", Some(&login), Some(BACKEND_DEV)).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/listings"));
    let flash = set_cookies(&resp).into_iter().find(|c| c.starts_with("flash=")).expect("flash cookie");

    let stored = models::listing::Entity::find().all(&app.db).await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_id, 1);
    assert_eq!(stored[0].tags, None);

    let cookies = format!("{login}; {flash}");
    let resp = app.send("GET", "/listings", Some(&cookies), None).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(set_cookies(&resp).iter().any(|c| c.starts_with("flash=")), "flash cookie cleared");
    let html = body_text(resp).await?;
    assert!(html.contains("Listing created successfully"));
    assert!(html.contains("Backend Dev"));
    Ok(())
}

#[tokio::test]
async fn anonymous_create_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let resp = app.send("POST", "/listings", None, Some(BACKEND_DEV)).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let flash = set_cookies(&resp).into_iter().find(|c| c.starts_with("flash=")).expect("flash cookie");

    let resp = app.send("GET", "/listings", Some(&flash), None).await?;
    let html = body_text(resp).await?;
    assert!(html.contains("You must be logged in to post a listing"));
    assert!(models::listing::Entity::find().all(&app.db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn invalid_create_rerenders_form() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let login = app.login_cookie(1)?;
    let form = BACKEND_DEV.replace("title=Backend+Dev", "title=");

    let resp = app.send("POST", "/listings", Some(&login), Some(&form)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await?;
    assert!(html.contains("Title is required"));
    assert!(html.contains(r#"value="Austin""#));
    assert!(models::listing::Entity::find().all(&app.db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn owner_controls_and_non_owner_delete() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.login_cookie(1)?;
    let stranger = app.login_cookie(2)?;
    app.send("POST", "/listings", Some(&owner), Some(BACKEND_DEV)).await?;

    let html = body_text(app.send("GET", "/listings/1", Some(&owner), None).await?).await?;
    assert!(html.contains("/listings/1/edit"));
    let html = body_text(app.send("GET", "/listings/1", Some(&stranger), None).await?).await?;
    assert!(!html.contains("/listings/1/edit"));

    let resp = app.send("POST", "/listings/1/delete", Some(&stranger), None).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/listings/1"));
    assert!(models::listing::Entity::find_by_id(1).one(&app.db).await?.is_some());

    let resp = app.send("DELETE", "/listings/1", Some(&owner), None).await?;
    assert_eq!(location(&resp), Some("/listings"));
    assert!(models::listing::Entity::find_by_id(1).one(&app.db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn owner_update_and_edit_guard() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = app.login_cookie(1)?;
    let stranger = app.login_cookie(2)?;
    app.send("POST", "/listings", Some(&owner), Some(BACKEND_DEV)).await?;

    let resp = app.send("GET", "/listings/1/edit", Some(&stranger), None).await?;
    assert_eq!(location(&resp), Some("/listings/1"));
    let resp = app.send("GET", "/listings/1/edit", Some(&owner), None).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await?.contains(r#"value="Backend Dev""#));

    let form = BACKEND_DEV.replace("title=Backend+Dev", "title=Senior+Backend+Dev");
    let resp = app.send("PUT", "/listings/1", Some(&owner), Some(&form)).await?;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/listings/1"));
    let stored = models::listing::Entity::find_by_id(1).one(&app.db).await?.expect("listing");
    assert_eq!(stored.title, "Senior Backend Dev");
    assert_eq!(stored.user_id, 1);

    let bad = BACKEND_DEV.replace("email=a%40b.com", "email=");
    let resp = app.send("POST", "/listings/1/edit", Some(&owner), Some(&bad)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await?;
    assert!(html.contains("Email is required"));
    assert!(html.contains(r#"value="a@b.com""#));
    Ok(())
}

#[tokio::test]
async fn missing_and_malformed_ids_are_not_found() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let resp = app.send("GET", "/listings/999", None, None).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await?.contains("Listing not found"));

    let resp = app.send("GET", "/listings/abc", None, None).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn search_echoes_terms() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let login = app.login_cookie(1)?;
    app.send("POST", "/listings", Some(&login), Some(BACKEND_DEV)).await?;

    let html = body_text(app.send("GET", "/listings/search?keywords=BACKEND&location=tx", None, None).await?).await?;
    assert!(html.contains("Backend Dev"));
    assert!(html.contains(r#"name="keywords" placeholder="Keywords" value="BACKEND""#));
    assert!(html.contains(r#"name="location" placeholder="City or state" value="tx""#));

    let html = body_text(app.send("GET", "/listings/search?keywords=golang", None, None).await?).await?;
    assert!(html.contains("No listings found"));
    assert!(html.contains(r#"value="golang""#));
    assert!(html.contains(r#"placeholder="City or state" value="""#));
    Ok(())
}

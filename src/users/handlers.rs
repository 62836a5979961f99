use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument, warn};

use crate::{
    auth::AuthUser,
    error::ApiError,
    state::AppState,
    users::{
        dto::{LoginResponse, PublicUser, SignUpResponse, UserPayload, UsersResponse},
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(login))
        .route("/users", get(list_users))
}

fn parse(body: Result<Json<UserPayload>, JsonRejection>) -> Result<UserPayload, ApiError> {
    body.map(|Json(p)| p).map_err(|e| {
        warn!(error = %e, "malformed request body");
        ApiError::Parse(e.body_text())
    })
}

#[instrument(skip(state, body))]
pub async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    let payload = parse(body)?;
    let user = services::sign_up(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            status: "success",
            message: "Registered successfully",
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let payload = parse(body)?;
    let token = services::login(&state, payload).await?;
    Ok(Json(LoginResponse {
        status: "success",
        message: "logged in",
        token,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UsersResponse>, ApiError> {
    let users = services::list_users(&state).await?;
    debug!(user_id, count = users.len(), "listed users");
    Ok(Json(UsersResponse {
        status: "success",
        message: "users",
        users: users.into_iter().map(PublicUser::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::users::repo::memory::MemoryUserRepository;

    fn app() -> (Router, Arc<MemoryUserRepository>) {
        let repo = Arc::new(MemoryUserRepository::default());
        let app = user_routes().with_state(AppState::fake(repo.clone()));
        (app, repo)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        post_raw(uri, body.to_string())
    }

    fn post_raw(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    fn grace() -> Value {
        json!({
            "email": "grace@example.com",
            "firstname": "Grace",
            "lastname": "Hopper",
            "password": "cobol-1959",
            "profileimage": "grace.png"
        })
    }

    #[tokio::test]
    async fn sign_up_then_login() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json("/signup", grace())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Registered successfully");
        assert_eq!(body["user"]["email"], "grace@example.com");
        assert_eq!(body["user"]["profileimage"], "grace.png");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("password_hash").is_none());

        let (status, body) = send(
            &app,
            post_json("/login", json!({"email": "grace@example.com", "password": "cobol-1959"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "logged in");
        assert!(!body["token"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_sign_up_is_rejected() {
        let (app, repo) = app();
        send(&app, post_json("/signup", grace())).await;

        let mut again = grace();
        again["email"] = json!("  GRACE@example.com ");
        let (status, body) = send(&app, post_json("/signup", again)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["message"], "User already registered, please login");
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn empty_sign_up_reports_first_field() {
        let (app, repo) = app();
        let (status, body) = send(
            &app,
            post_json(
                "/signup",
                json!({"email": "", "firstname": " ", "lastname": "", "password": ""}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "FirstName is required"}));
        assert_eq!(repo.len(), 0);
    }

    #[tokio::test]
    async fn invalid_email_on_sign_up() {
        let (app, _) = app();
        let mut p = grace();
        p["email"] = json!("grace-at-example");
        let (status, body) = send(&app, post_json("/signup", p)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid Email");
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (app, _) = app();
        for uri in ["/signup", "/login"] {
            let (status, body) = send(&app, post_raw(uri, "{not json".into())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().unwrap().starts_with("Invalid request"));
        }
    }

    #[tokio::test]
    async fn login_requires_email_then_password() {
        let (app, _) = app();
        let (status, body) = send(&app, post_json("/login", json!({"password": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Email is required");

        let (_, body) = send(&app, post_json("/login", json!({"email": "a@b.co"}))).await;
        assert_eq!(body["error"], "Password is required");
    }

    #[tokio::test]
    async fn login_unknown_email_asks_to_sign_up() {
        let (app, _) = app();
        let (status, body) = send(
            &app,
            post_json("/login", json!({"email": "nobody@example.com", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "failed");
        assert_eq!(body["message"], "Login failed, please signup");
    }

    #[tokio::test]
    async fn login_wrong_password_is_forbidden() {
        let (app, _) = app();
        send(&app, post_json("/signup", grace())).await;
        let (status, body) = send(
            &app,
            post_json("/login", json!({"email": "grace@example.com", "password": "fortran"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            json!({"status": "failed", "message": "Login failed, please try again"})
        );
    }

    #[tokio::test]
    async fn listing_requires_a_valid_token() {
        let (app, _) = app();
        send(&app, post_json("/signup", grace())).await;

        let anonymous = Request::builder()
            .uri("/users")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, anonymous).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing Authorization header");

        let forged = Request::builder()
            .uri("/users")
            .header(header::AUTHORIZATION, "Bearer not.a.token")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, forged).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, login) = send(
            &app,
            post_json("/login", json!({"email": "grace@example.com", "password": "cobol-1959"})),
        )
        .await;
        let token = login["token"].as_str().unwrap();
        let authed = Request::builder()
            .uri("/users")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, authed).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["users"].as_array().unwrap().len(), 1);
        assert_eq!(body["users"][0]["firstname"], "Grace");
        assert!(body["users"][0].get("password_hash").is_none());
    }
}

//! Handlers for the account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | Body: [`RegisterForm`]; returns 201 + session token |
//! | `POST` | `/auth/sign-in` | `Authorization: Basic email:password`; returns session token |
//! | `POST` | `/auth/sign-out` | Ends the presented session |
//! | `GET`  | `/me` | The caller's session and profile |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use showcase_core::{
  accounts::{self, IssuedSession, RegisterForm},
  blob::BlobStore,
  session::Session,
  store::PortalStore,
};

use crate::{
  AppState,
  auth::{RequireUser, basic_credentials},
  error::ApiError,
};

/// `POST /auth/register`
pub async fn register<S, B>(
  State(state): State<AppState<S, B>>,
  Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let issued = accounts::register(state.store.as_ref(), &state.settings.accounts, form).await?;
  Ok((StatusCode::CREATED, Json(issued)))
}

/// `POST /auth/sign-in`
pub async fn sign_in<S, B>(
  State(state): State<AppState<S, B>>,
  headers: HeaderMap,
) -> Result<Json<IssuedSession>, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  let (email, password) = basic_credentials(&headers)?;
  let issued =
    accounts::sign_in(state.store.as_ref(), &state.settings.accounts, &email, &password).await?;
  Ok(Json(issued))
}

/// `POST /auth/sign-out`
pub async fn sign_out<S, B>(
  State(state): State<AppState<S, B>>,
  RequireUser(session): RequireUser,
) -> Result<StatusCode, ApiError>
where
  S: PortalStore,
  B: BlobStore,
{
  accounts::sign_out(state.store.as_ref(), &session).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /me`
pub async fn me(RequireUser(session): RequireUser) -> Json<Session> { Json(session) }

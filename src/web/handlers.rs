use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{error, instrument, warn};

use crate::{
    state::AppState,
    users::{dto::CreateUserRequest, repo_types::User, services},
};

use super::templates;

#[derive(Debug, Deserialize)]
pub struct LookupForm {
    #[serde(default)]
    pub input_id: Option<String>,
}

pub fn form_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/submit", post(submit))
        .route("/get-data", get(lookup_form).post(lookup))
        .route("/users", get(users_list))
        .route("/delete/:id", get(confirm_delete).post(delete))
}

fn failure<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {e}"))
}

fn user_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, (StatusCode, String)> {
    path.map(|Path(id)| id).map_err(|e| {
        warn!(error = %e, "unparseable user id");
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    })
}

pub async fn index() -> Html<String> {
    Html(templates::index_page())
}

#[instrument(skip(state, form))]
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<CreateUserRequest>,
) -> Result<Response, (StatusCode, String)> {
    let submission = match form.validate() {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "form submission incomplete");
            return Ok(Redirect::to("/").into_response());
        }
    };

    let latest = services::submit_user(&state.db, submission)
        .await
        .map_err(|e| {
            error!(error = %e, "adding user failed");
            failure(e)
        })?;

    Ok(Html(templates::submitted_page(latest.as_ref())).into_response())
}

pub async fn lookup_form() -> Html<String> {
    Html(templates::lookup_page())
}

#[instrument(skip(state))]
pub async fn lookup(
    State(state): State<AppState>,
    Form(form): Form<LookupForm>,
) -> Result<Html<String>, (StatusCode, String)> {
    let input_id = match form.input_id.filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => return Ok(Html(templates::lookup_page())),
    };

    let user = match input_id.trim().parse::<i64>() {
        Ok(id) => User::find_by_id(&state.db, id).await.map_err(|e| {
            error!(error = %e, id, "lookup failed");
            failure(e)
        })?,
        Err(_) => None,
    };

    Ok(Html(templates::data_page(&input_id, user.as_ref())))
}

pub async fn users_list() -> Html<String> {
    Html(templates::users_page())
}

pub async fn confirm_delete(
    path: Result<Path<i64>, PathRejection>,
) -> Result<Html<String>, (StatusCode, String)> {
    let id = user_id(path)?;
    Ok(Html(templates::delete_page(id)))
}

#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Redirect, (StatusCode, String)> {
    let id = user_id(path)?;
    User::delete_by_id(&state.db, id).await.map_err(|e| {
        error!(error = %e, id, "delete failed");
        failure(e)
    })?;
    Ok(Redirect::to("/users"))
}

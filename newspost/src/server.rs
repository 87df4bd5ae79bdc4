use std::sync::Arc;

use anyhow::{anyhow, Result};
use rocket::figment::Figment;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, post, routes, Build, Request, Rocket, State};
use serde::{Deserialize, Serialize};

use crate::generator::{GeneratedPost, PostGenerator};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<PostGenerator>,
}

/// Request body for `/generate-post`.
#[derive(Debug, Deserialize)]
pub struct TopicRequest {
    pub topic: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub status: String,
}

/// Error body shared by handlers and catchers.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = Custom<Json<ErrorResponse>>;

fn api_error(status: Status, detail: impl Into<String>) -> ApiError {
    Custom(
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

#[post("/generate-post", data = "<body>")]
async fn generate_post(
    state: &State<AppState>,
    body: Json<TopicRequest>,
) -> Result<Json<GeneratedPost>, ApiError> {
    let topic = body.into_inner().topic;
    if topic.is_empty() {
        return Err(api_error(Status::UnprocessableEntity, "topic must not be empty"));
    }

    tracing::info!(topic = %topic, "generating post");
    match state.generator.generate_post(&topic).await {
        Ok(post) => Ok(Json(post)),
        Err(e) => {
            tracing::error!(stage = %e.stage(), error = %e, "post generation failed");
            Err(api_error(Status::InternalServerError, e.to_string()))
        }
    }
}

/// Liveness only; never touches the providers.
#[get("/heartbeat")]
async fn heartbeat() -> Json<HeartbeatResponse> {
    Json(HeartbeatResponse {
        status: "OK".to_string(),
    })
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> ApiError {
    api_error(status, status.reason().unwrap_or("Unknown Error"))
}

/// Assemble the Rocket instance without launching it (tests use this with a local client).
pub fn build_rocket(figment: Figment, state: AppState) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![generate_post, heartbeat])
        .register("/", catchers![default_catcher])
}

/// Build and launch the Rocket server on `bind:port`.
///
/// This function blocks until the Rocket server shuts down.
pub async fn launch_rocket(bind: &str, port: u16, state: AppState) -> Result<()> {
    let fig = rocket::Config::figment()
        .merge(("address", bind.to_string()))
        .merge(("port", port));

    tracing::info!(%bind, port, "Starting Rocket HTTP server");
    build_rocket(fig, state)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}

mod support;

use std::sync::Arc;

use newspost::generator::GeneratedPost;
use newspost::server::{build_rocket, AppState, ErrorResponse, HeartbeatResponse};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use support::{generator, ScriptedLlm, StaticNews};

async fn client(news: StaticNews, llm: ScriptedLlm) -> Client {
    let state = AppState {
        generator: Arc::new(generator(Arc::new(news), Arc::new(llm))),
    };
    Client::tracked(build_rocket(rocket::Config::figment(), state))
        .await
        .expect("valid rocket instance")
}

#[rocket::async_test]
async fn heartbeat_ignores_provider_health() {
    let client = client(
        StaticNews::failing(500, "down"),
        ScriptedLlm::new(|_, _| Err(anyhow::anyhow!("down"))),
    )
    .await;

    let response = client.get("/heartbeat").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    let body: HeartbeatResponse = response.into_json().await.expect("json body");
    assert_eq!(body.status, "OK");
}

#[rocket::async_test]
async fn generate_post_returns_all_three_fields() {
    let client = client(
        StaticNews::with_titles(&["EV sales surge", "New battery tech announced"]),
        ScriptedLlm::fixed(&["<stub-title>", "<stub-meta>", "<stub-body>"]),
    )
    .await;

    let response = client
        .post("/generate-post")
        .header(ContentType::JSON)
        .body(r#"{"topic": "electric vehicles"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let post: GeneratedPost = response.into_json().await.expect("json body");
    assert_eq!(
        post,
        GeneratedPost {
            title: "<stub-title>".to_string(),
            meta_description: "<stub-meta>".to_string(),
            post_content: "<stub-body>".to_string(),
        }
    );
}

#[rocket::async_test]
async fn stage_failure_is_a_500_with_detail() {
    let client = client(
        StaticNews::with_titles(&["headline"]),
        ScriptedLlm::new(|i, _| match i {
            0 => Ok("Title".to_string()),
            _ => Err(anyhow::anyhow!("model overloaded")),
        }),
    )
    .await;

    let response = client
        .post("/generate-post")
        .header(ContentType::JSON)
        .body(r#"{"topic": "anything"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: ErrorResponse = response.into_json().await.expect("json body");
    assert!(body.detail.contains("meta-description"));
    assert!(body.detail.contains("model overloaded"));
}

#[rocket::async_test]
async fn news_failure_is_a_500_with_upstream_text() {
    let client = client(StaticNews::failing(429, "quota exceeded"), ScriptedLlm::echo()).await;

    let response = client
        .post("/generate-post")
        .header(ContentType::JSON)
        .body(r#"{"topic": "anything"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::InternalServerError);
    let body: ErrorResponse = response.into_json().await.expect("json body");
    assert!(body.detail.contains("news"));
    assert!(body.detail.contains("quota exceeded"));
}

#[rocket::async_test]
async fn empty_topic_is_rejected() {
    let client = client(StaticNews::with_titles(&[]), ScriptedLlm::echo()).await;

    let response = client
        .post("/generate-post")
        .header(ContentType::JSON)
        .body(r#"{"topic": ""}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: ErrorResponse = response.into_json().await.expect("json body");
    assert_eq!(body.detail, "topic must not be empty");
}

#[rocket::async_test]
async fn missing_topic_field_gets_json_error() {
    let client = client(StaticNews::with_titles(&[]), ScriptedLlm::echo()).await;

    let response = client
        .post("/generate-post")
        .header(ContentType::JSON)
        .body(r#"{"subject": "rust"}"#)
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::UnprocessableEntity);
    assert_eq!(response.content_type(), Some(ContentType::JSON));
}

#[rocket::async_test]
async fn unknown_route_is_json_404() {
    let client = client(StaticNews::with_titles(&[]), ScriptedLlm::echo()).await;

    let response = client.get("/nope").dispatch().await;

    assert_eq!(response.status(), Status::NotFound);
    let body: ErrorResponse = response.into_json().await.expect("json body");
    assert_eq!(body.detail, "Not Found");
}

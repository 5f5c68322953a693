use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use survey_ai::survey::{
    survey_router, InMemoryResponseStore, ResponseStore, ScoreValidation, SurveyService, Variant,
};
use tower::ServiceExt;

fn router() -> (axum::Router, Arc<InMemoryResponseStore>) {
    let store = Arc::new(InMemoryResponseStore::default());
    let service = SurveyService::new(store.clone(), ScoreValidation::Lenient);
    (survey_router(Arc::new(service)), store)
}

async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    (status, serde_json::from_slice(&body).expect("json payload"))
}

async fn request_type(router: &axum::Router, token: Option<&str>) -> Value {
    let uri = match token {
        Some(token) => format!("/api/questionnaire-type?token={token}"),
        None => "/api/questionnaire-type".to_string(),
    };
    let (status, payload) = send(router, Request::get(uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    payload
}

async fn submit(router: &axum::Router, variant: &Value, token: &Value, ai: [u8; 5]) -> Value {
    let entry = |i: usize| json!({ "aiScore": ai[i], "legitimacyScore": 5 });
    let body = json!({
        "type": variant,
        "token": token,
        "language": "en",
        "answers": {
            "email1": entry(0),
            "email2": entry(1),
            "email3": entry(2),
            "email4": entry(3),
            "email5": entry(4),
        },
    });
    let request = Request::post("/api/submit-questionnaire")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let (status, payload) = send(router, request).await;
    assert_eq!(status, StatusCode::OK, "submit failed: {payload}");
    payload
}

#[tokio::test]
async fn participant_completes_and_returns() {
    let (router, store) = router();

    let assigned = request_type(&router, None).await;
    assert_eq!(assigned["type"], json!(0));
    let token = assigned["token"].clone();

    let scores = submit(&router, &assigned["type"], &token, [10, 10, 0, 0, 0]).await;
    assert_eq!(scores["aiScore"], json!(0.0));
    assert_eq!(scores["legitimacyScore"], json!(5.0));
    assert_eq!(scores["avgScore"], json!(2.5));

    let returning = request_type(&router, token.as_str()).await;
    assert_eq!(returning["type"], json!(-1));
    assert_eq!(returning["token"], token);
    assert_eq!(returning["aiScore"], scores["aiScore"]);
    assert_eq!(returning["avgScore"], scores["avgScore"]);
    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn completed_participants_keep_variants_balanced() {
    let (router, store) = router();

    for round in 0..6 {
        let assigned = request_type(&router, None).await;
        let expected = if round % 2 == 0 { 0 } else { 1 };
        assert_eq!(assigned["type"], json!(expected), "round {round}");
        submit(&router, &assigned["type"], &assigned["token"], [5; 5]).await;
    }

    assert_eq!(store.count_by_variant(Variant::Zero).await.unwrap(), 3);
    assert_eq!(store.count_by_variant(Variant::One).await.unwrap(), 3);
}

#[tokio::test]
async fn abandoned_assignments_do_not_shift_balance() {
    let (router, _store) = router();

    let first = request_type(&router, None).await;
    let second = request_type(&router, None).await;

    assert_eq!(first["type"], json!(0));
    assert_eq!(second["type"], json!(0));
    assert_ne!(first["token"], second["token"]);
}

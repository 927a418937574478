mod common;

use axum::http::StatusCode;
use common::{create_meal, register_and_login, test_app, TestRequest};
use serde_json::json;

#[tokio::test]
async fn favourites_scenario_over_http() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "fan@example.com").await;
    let soup = create_meal(&app, &token, "Soup").await;
    let stew = create_meal(&app, &token, "Stew").await;

    let listed = TestRequest::get(&format!("/user/favourites/{user_id}")).send(&app).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.json(), json!([]));

    let added = TestRequest::post(&format!("/user/favourites/{user_id}/add?meal_id={soup}"))
        .send(&app)
        .await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.json(), json!({ "message": "Meal added to favourites" }));

    let again = TestRequest::post(&format!("/user/favourites/{user_id}/add?meal_id={soup}"))
        .send(&app)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let listed = TestRequest::get(&format!("/user/favourites/{user_id}")).send(&app).await;
    assert_eq!(listed.json(), json!(["Soup"]));

    let not_there = TestRequest::delete(&format!("/user/favourites/{user_id}/remove?meal_id={stew}"))
        .send(&app)
        .await;
    assert_eq!(not_there.status, StatusCode::NOT_FOUND);

    let removed = TestRequest::delete(&format!("/user/favourites/{user_id}/remove?meal_id={soup}"))
        .send(&app)
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let listed = TestRequest::get(&format!("/user/favourites/{user_id}")).send(&app).await;
    assert_eq!(listed.json(), json!([]));
}

#[tokio::test]
async fn adding_unknown_meal_is_not_found() {
    let app = test_app();
    let (user_id, _) = register_and_login(&app, "fan@example.com").await;
    let response = TestRequest::post(&format!("/user/favourites/{user_id}/add?meal_id=404"))
        .send(&app)
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.json()["error"].is_string());
}

#[tokio::test]
async fn unknown_user_has_empty_favourites() {
    let app = test_app();
    let response = TestRequest::get("/user/favourites/7d3c8d4e-5a61-4f0b-9a52-2f7c1a9d6b10")
        .send(&app)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn malformed_user_id_is_bad_request() {
    let app = test_app();
    let response = TestRequest::get("/user/favourites/not-a-uuid").send(&app).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleted_meal_leaves_favourites() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "fan@example.com").await;
    let soup = create_meal(&app, &token, "Soup").await;
    let stew = create_meal(&app, &token, "Stew").await;
    for id in [soup, stew] {
        let added = TestRequest::post(&format!("/user/favourites/{user_id}/add?meal_id={id}"))
            .send(&app)
            .await;
        assert_eq!(added.status, StatusCode::CREATED);
    }

    let deleted = TestRequest::delete(&format!("/meal/{soup}")).bearer(&token).send(&app).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let listed = TestRequest::get(&format!("/user/favourites/{user_id}")).send(&app).await;
    assert_eq!(listed.json(), json!(["Stew"]));
}

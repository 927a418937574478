mod common;

use axum::http::StatusCode;
use common::{create_meal, meal_body, register_and_login, test_app, TestRequest};
use serde_json::{json, Value};
use std::collections::HashSet;

fn names(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|meal| meal["strMeal"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn create_requires_bearer_token() {
    let app = test_app();
    let response = TestRequest::post("/meal/create").json(&meal_body("Soup")).send(&app).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = TestRequest::post("/meal/create")
        .bearer("not.a.jwt")
        .json(&meal_body("Soup"))
        .send(&app)
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_meal_is_owned_and_readable() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "chef@example.com").await;
    let id = create_meal(&app, &token, "Pea Soup").await;

    let fetched = TestRequest::get(&format!("/meal/{id}")).send(&app).await;
    assert_eq!(fetched.status, StatusCode::OK);
    let meal = fetched.json();
    assert_eq!(meal["strMeal"], "Pea Soup");
    assert_eq!(meal["user_id"], user_id.as_str());
    assert_eq!(meal["ingredients"], json!(["Water", "Salt"]));

    let missing = TestRequest::get("/meal/9999").send(&app).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mismatched_measures_are_rejected() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "chef@example.com").await;
    let mut body = meal_body("Soup");
    body["measures"] = json!(["1 l"]);
    let response = TestRequest::post("/meal/create").bearer(&token).json(&body).send(&app).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_owner_may_update_or_delete() {
    let app = test_app();
    let (_, owner) = register_and_login(&app, "owner@example.com").await;
    let (_, other) = register_and_login(&app, "other@example.com").await;
    let id = create_meal(&app, &owner, "Soup").await;

    let hijack = TestRequest::put(&format!("/meal/{id}"))
        .bearer(&other)
        .json(&meal_body("Not Soup"))
        .send(&app)
        .await;
    assert_eq!(hijack.status, StatusCode::FORBIDDEN);

    let delete = TestRequest::delete(&format!("/meal/{id}")).bearer(&other).send(&app).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let update = TestRequest::put(&format!("/meal/{id}"))
        .bearer(&owner)
        .json(&meal_body("Better Soup"))
        .send(&app)
        .await;
    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(update.json()["strMeal"], "Better Soup");

    let delete = TestRequest::delete(&format!("/meal/{id}")).bearer(&owner).send(&app).await;
    assert_eq!(delete.status, StatusCode::NO_CONTENT);
    let gone = TestRequest::delete(&format!("/meal/{id}")).bearer(&owner).send(&app).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lookup_filters() {
    let app = test_app();
    let (user_id, token) = register_and_login(&app, "chef@example.com").await;
    create_meal(&app, &token, "Tomato Soup").await;
    create_meal(&app, &token, "Beef Stew").await;

    let mut curry = meal_body("Chicken Curry");
    curry["strCategory"] = json!("Chicken");
    curry["strArea"] = json!("Indian");
    curry["ingredients"] = json!(["Chicken", "Salt"]);
    let created = TestRequest::post("/meal/create").bearer(&token).json(&curry).send(&app).await;
    assert_eq!(created.status, StatusCode::CREATED);

    let all = TestRequest::get("/meal/all").send(&app).await;
    assert_eq!(names(&all.json()), vec!["Tomato Soup", "Beef Stew", "Chicken Curry"]);

    let by_name = TestRequest::get("/meal/name/SOUP").send(&app).await;
    assert_eq!(names(&by_name.json()), vec!["Tomato Soup"]);

    let by_category = TestRequest::get("/meal/category/soup").send(&app).await;
    assert_eq!(names(&by_category.json()), vec!["Beef Stew", "Tomato Soup"]);

    let by_area = TestRequest::get("/meal/area/indian").send(&app).await;
    assert_eq!(names(&by_area.json()), vec!["Chicken Curry"]);

    let by_ingredient = TestRequest::get("/meal/ingredient/Chicken").send(&app).await;
    assert_eq!(names(&by_ingredient.json()), vec!["Chicken Curry"]);

    let by_user = TestRequest::get(&format!("/meal/user/{user_id}")).send(&app).await;
    assert_eq!(names(&by_user.json()).len(), 3);
}

#[tokio::test]
async fn recommendations_default_to_three_distinct_meals() {
    let app = test_app();
    let (_, token) = register_and_login(&app, "chef@example.com").await;
    for name in ["A", "B", "C", "D", "E"] {
        create_meal(&app, &token, name).await;
    }

    let response = TestRequest::get("/meal/recommendations").send(&app).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    let picked: HashSet<String> = names(&body).into_iter().collect();
    assert_eq!(picked.len(), 3);
    assert!(body[0].get("id").is_none());

    let capped = TestRequest::get("/meal/recommendations?n=10").send(&app).await;
    assert_eq!(names(&capped.json()).len(), 5);

    let negative = TestRequest::get("/meal/recommendations?n=-1").send(&app).await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert!(negative.json()["error"].is_string());
}

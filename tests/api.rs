use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use kitchkatch::{
    build_app, AppConfig, AppState, MemoryStore, Record, Resource, Store, StoreError,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None).expect("default config")
}

fn app() -> Router {
    build_app(AppState::new(Arc::new(MemoryStore::new()), test_config()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, json)
}

async fn create_category(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "Dairy", "description": "Milk and cheese" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn product_lifecycle() {
    let app = app();
    let category_id = create_category(&app).await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Test Product", "categoryId": category_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Test Product");
    assert_eq!(created["categoryId"], category_id.as_str());
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());

    let (status, list) = send(&app, Method::GET, "/api/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id.as_str());

    let (status, fetched) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{id}"),
        Some(json!({ "name": "Updated Product" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Updated Product");
    assert_eq!(updated["categoryId"], category_id.as_str());

    let (status, body) = send(&app, Method::DELETE, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Item not found" }));
}

#[tokio::test]
async fn every_resource_lists_an_empty_array() {
    let app = app();
    for resource in Resource::ALL {
        let (status, body) = send(&app, Method::GET, &format!("/api/{}", resource.path()), None).await;
        assert_eq!(status, StatusCode::OK, "{resource}");
        assert_eq!(body, json!([]), "{resource}");
    }
}

#[tokio::test]
async fn unknown_id_reads_as_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/products/non-existent-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Item not found" }));
}

#[tokio::test]
async fn unknown_id_on_update_and_delete_is_a_server_error() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/households/missing",
        Some(json!({ "name": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to update item" }));

    let (status, body) = send(&app, Method::DELETE, "/api/households/missing", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to delete item" }));
}

#[tokio::test]
async fn create_without_required_field_fails() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/products", Some(json!({ "name": "Orphan" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to create item" }));
}

#[tokio::test]
async fn create_with_dangling_reference_fails() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Milk", "categoryId": "no-such-category" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to create item" }));
}

#[tokio::test]
async fn create_without_json_content_type_sees_no_fields() {
    let app = app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/households")
        .body(Body::from(r#"{"name":"Home"}"#))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Failed to create item" }));
}

#[tokio::test]
async fn malformed_json_falls_through_to_fallback() {
    let app = app();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/households")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "error", "message": "Something went wrong!" }));
}

async fn send_raw(app: &Router, method: Method, uri: &str, content_type: &str, raw: &'static str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(raw))
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn empty_json_body_carries_no_fields() {
    let app = app();
    let (_, household) = send(&app, Method::POST, "/api/households", Some(json!({ "name": "Home" }))).await;
    let id = household["id"].as_str().unwrap();

    let (status, body) = send_raw(&app, Method::PUT, &format!("/api/households/{id}"), "application/json", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Home");

    let (status, body) = send_raw(&app, Method::POST, "/api/households", "application/json", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to create item" }));
}

#[tokio::test]
async fn fetched_record_can_be_put_back() {
    let app = app();
    let category_id = create_category(&app).await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Cheddar", "categoryId": category_id })),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (_, mut fetched) = send(&app, Method::GET, &format!("/api/products/{id}"), None).await;
    fetched["brand"] = json!("Farmhouse");
    let (status, updated) = send(&app, Method::PUT, &format!("/api/products/{id}"), Some(fetched)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["brand"], "Farmhouse");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/products/{id}"),
        Some(json!({ "id": "another-id", "name": "Gouda" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to update item" }));
}

#[tokio::test]
async fn referenced_rows_cannot_be_deleted() {
    let app = app();
    let category_id = create_category(&app).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Butter", "categoryId": category_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/categories/{category_id}"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to delete item" }));
}

#[tokio::test]
async fn meal_plan_recipe_enforces_day_and_meal_enums() {
    let app = app();
    let (_, household) = send(&app, Method::POST, "/api/households", Some(json!({ "name": "Home" }))).await;
    let (status, plan) = send(
        &app,
        Method::POST,
        "/api/meal-plans",
        Some(json!({
            "name": "Week 1",
            "startDate": "2024-01-01T00:00:00.000Z",
            "endDate": "2024-01-07T00:00:00.000Z",
            "householdId": household["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, recipe) = send(
        &app,
        Method::POST,
        "/api/recipes",
        Some(json!({
            "name": "Pancakes",
            "instructions": "Mix and fry",
            "prepTime": 10,
            "cookTime": 15,
            "servings": 4,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let entry = |day: &str| {
        json!({
            "mealPlanId": plan["id"],
            "recipeId": recipe["id"],
            "dayOfWeek": day,
            "mealType": "BREAKFAST",
        })
    };
    let (status, created) = send(&app, Method::POST, "/api/meal-plan-recipes", Some(entry("MONDAY"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["dayOfWeek"], "MONDAY");
    assert_eq!(created["notes"], Value::Null);

    let (status, _) = send(&app, Method::POST, "/api/meal-plan-recipes", Some(entry("FUNDAY"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn shopping_list_item_is_unchecked_by_default() {
    let app = app();
    let category_id = create_category(&app).await;
    let (_, product) = send(
        &app,
        Method::POST,
        "/api/products",
        Some(json!({ "name": "Eggs", "categoryId": category_id })),
    )
    .await;
    let (_, household) = send(&app, Method::POST, "/api/households", Some(json!({ "name": "Home" }))).await;
    let (_, list) = send(
        &app,
        Method::POST,
        "/api/shopping-lists",
        Some(json!({ "name": "Weekly", "householdId": household["id"] })),
    )
    .await;

    let (status, item) = send(
        &app,
        Method::POST,
        "/api/shopping-list-items",
        Some(json!({
            "shoppingListId": list["id"],
            "productId": product["id"],
            "quantity": 12,
            "unit": "pcs",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["isChecked"], false);

    let (status, item) = send(
        &app,
        Method::PUT,
        &format!("/api/shopping-list-items/{}", item["id"].as_str().unwrap()),
        Some(json!({ "isChecked": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["isChecked"], true);
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/unknown-things", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn docs_are_served() {
    let app = app();
    let (status, html) = send(&app, Method::GET, "/docs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.as_str().unwrap().contains("swagger-ui"));

    let (status, doc) = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Kitch-Katch API");
    assert_eq!(doc["servers"][0]["url"], "http://localhost:3000");
    assert!(doc["paths"]["/api/products/{id}"]["delete"].is_object());
}

#[tokio::test]
async fn health_and_readiness() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "database": "ok" }));
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = app();
    let req = Request::builder()
        .uri("/api/households")
        .header(header::ORIGIN, "https://example.com")
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

/// Store whose every call fails, as an unreachable database would.
struct BrokenStore;

fn broken(resource: Resource) -> StoreError {
    StoreError::InvalidPayload { resource }
}

#[async_trait]
impl Store for BrokenStore {
    async fn find_all(&self, resource: Resource) -> Result<Vec<Record>, StoreError> {
        Err(broken(resource))
    }
    async fn find_by_id(&self, resource: Resource, _id: &str) -> Result<Option<Record>, StoreError> {
        Err(broken(resource))
    }
    async fn insert(&self, resource: Resource, _payload: Value) -> Result<Record, StoreError> {
        Err(broken(resource))
    }
    async fn update(&self, resource: Resource, _id: &str, _payload: Value) -> Result<Record, StoreError> {
        Err(broken(resource))
    }
    async fn delete(&self, resource: Resource, _id: &str) -> Result<(), StoreError> {
        Err(broken(resource))
    }
    async fn ping(&self) -> Result<(), StoreError> {
        Err(broken(Resource::Household))
    }
}

#[tokio::test]
async fn storage_failures_map_to_operation_messages() {
    let app = build_app(AppState::new(Arc::new(BrokenStore), test_config()));

    let (status, body) = send(&app, Method::GET, "/api/recipes", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch items" }));

    let (status, body) = send(&app, Method::GET, "/api/recipes/abc", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch item" }));

    let (status, body) = send(&app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "status": "degraded", "database": "unavailable" }));
}

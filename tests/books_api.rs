use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookstore_db::Database;
use bookstore_kernel::{settings::Settings, InitCtx};
use serde_json::{json, Value};
use tower::ServiceExt;

const ISBN: &str = "0691161518";

fn power_up() -> Value {
    json!({
        "isbn": ISBN,
        "amazon_url": "http://a.co/eobPtX2",
        "author": "Matthew Lane",
        "language": "english",
        "pages": 264,
        "publisher": "Princeton University Press",
        "title": "Power-Up: Unlocking the Hidden Mathematics in Video Games",
        "year": 2017
    })
}

fn spanish_edition() -> Value {
    json!({
        "amazon_url": "http://a.co/eobPtX4",
        "author": "Jane Doe",
        "language": "spanish",
        "pages": 350,
        "publisher": "Updated Publisher",
        "title": "Updated Book",
        "year": 2021
    })
}

/// Full router over a fresh in-memory store seeded with `power_up()`.
async fn app() -> Router {
    let settings = Settings::default();
    let db = Database::connect("sqlite::memory:", 1).await.unwrap();
    let registry = bookstore_app::registry();
    registry.apply_migrations(&db).await.unwrap();

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    let router = bookstore_http::build_router(&registry, &ctx);

    let (status, _) = send(&router, Method::POST, "/books", Some(power_up())).await;
    assert_eq!(status, StatusCode::CREATED);
    router
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn lists_books() {
    let router = app().await;

    let (status, body) = send(&router, Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["books"][0]["isbn"], ISBN);
}

#[tokio::test]
async fn gets_book_by_isbn() {
    let router = app().await;

    let (status, body) = send(&router, Method::GET, "/books/0691161518", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"], power_up());
}

#[tokio::test]
async fn unknown_isbn_is_404() {
    let router = app().await;

    let (status, body) = send(&router, Method::GET, "/books/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);
    assert_eq!(body["error"]["message"], "There is no book with an isbn '999'");

    let (status, _) = send(&router, Method::PUT, "/books/999", Some(spanish_edition())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::DELETE, "/books/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn creates_book() {
    let router = app().await;
    let new_book = json!({
        "isbn": "1234567890",
        "amazon_url": "http://a.co/eobPtX3",
        "author": "John Doe",
        "language": "english",
        "pages": 300,
        "publisher": "Example Publisher",
        "title": "Example Book",
        "year": 2020
    });

    let (status, body) = send(&router, Method::POST, "/books", Some(new_book.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"], new_book);

    let (_, body) = send(&router, Method::GET, "/books/1234567890", None).await;
    assert_eq!(body["book"], new_book);
}

#[tokio::test]
async fn empty_create_payload_is_400() {
    let router = app().await;

    let (status, body) = send(&router, Method::POST, "/books", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 8);

    let (_, body) = send(&router, Method::GET, "/books", None).await;
    assert_eq!(body["books"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn wrong_typed_pages_is_400() {
    let router = app().await;
    let mut payload = power_up();
    payload["isbn"] = json!("1111111111");
    payload["pages"] = json!("many");

    let (status, body) = send(&router, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["instance.pages is not of a type(s) integer"]));

    let (status, _) = send(&router, Method::GET, "/books/1111111111", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let router = app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"isbn\":"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_isbn_is_500_without_detail() {
    let router = app().await;

    let (status, body) = send(&router, Method::POST, "/books", Some(power_up())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Internal Server Error");
}

#[tokio::test]
async fn updates_book_but_not_isbn() {
    let router = app().await;
    let mut payload = spanish_edition();
    payload["isbn"] = json!("9999999999");

    let (status, body) = send(&router, Method::PUT, "/books/0691161518", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["isbn"], ISBN);
    assert_eq!(body["book"]["author"], "Jane Doe");
    assert_eq!(body["book"]["language"], "spanish");

    let (_, body) = send(&router, Method::GET, "/books/0691161518", None).await;
    assert_eq!(body["book"]["language"], "spanish");

    let (status, _) = send(&router, Method::GET, "/books/9999999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_missing_field_is_400_and_leaves_row() {
    let router = app().await;
    let mut payload = spanish_edition();
    payload.as_object_mut().unwrap().remove("amazon_url");

    let (status, body) = send(&router, Method::PUT, "/books/0691161518", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"], json!(["instance requires property \"amazon_url\""]));

    let (_, body) = send(&router, Method::GET, "/books/0691161518", None).await;
    assert_eq!(body["book"], power_up());
}

#[tokio::test]
async fn deletes_book_once() {
    let router = app().await;

    let (status, body) = send(&router, Method::DELETE, "/books/0691161518", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Book deleted"}));

    let (status, _) = send(&router, Method::GET, "/books/0691161518", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&router, Method::DELETE, "/books/0691161518", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_is_404_json() {
    let router = app().await;

    let (status, body) = send(&router, Method::GET, "/authors", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": {"message": "Not Found", "status": 404}}));
}

#[tokio::test]
async fn serves_health_and_openapi() {
    let router = app().await;

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&router, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/books/{isbn}"].is_object());
}

#[tokio::test]
async fn undecodable_isbn_is_400_json() {
    let router = app().await;

    let (status, body) = send(&router, Method::GET, "/books/%FF", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);

    let (status, body) = send(&router, Method::DELETE, "/books/%FF", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn trailing_slash_collection_path_is_404_json() {
    let router = app().await;

    let (status, body) = send(&router, Method::GET, "/books/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);
}

#[tokio::test]
async fn whole_valued_float_pages_are_stored_as_integers() {
    let router = app().await;
    let mut payload = power_up();
    payload["isbn"] = json!("2222222222");
    payload["pages"] = json!(1.0);

    let (status, body) = send(&router, Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"]["pages"], 1);
}

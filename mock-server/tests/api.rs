use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with, Pet, Store, DEMO_EMAIL, DEMO_PASSWORD};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Router plus the demo account's auth key.
fn app_and_key() -> (Router, String) {
    let store = Store::with_account(DEMO_EMAIL, DEMO_PASSWORD);
    let key = store.accounts[0].key.clone();
    (app_with(store), key)
}

fn authed(method: &str, uri: &str, key: &str) -> http::request::Builder {
    Request::builder().method(method).uri(uri).header("auth_key", key)
}

fn json_request(uri: &str, key: &str, body: &str) -> Request<String> {
    authed("POST", uri, key)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn multipart_request(uri: &str, key: &str, fields: &[(&str, &str)], photo: Option<&[u8]>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--B\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    if let Some(data) = photo {
        body.extend_from_slice(
            b"--B\r\nContent-Disposition: form-data; name=\"pet_photo\"; filename=\"p.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(b"--B--\r\n");
    authed("POST", uri, key)
        .header(http::header::CONTENT_TYPE, "multipart/form-data; boundary=B")
        .body(Body::from(body))
        .unwrap()
}

async fn create_simple(app: &Router, key: &str, name: &str) -> Pet {
    let body = format!(r#"{{"name":"{name}","animal_type":"goose","age":"3"}}"#);
    let resp = app
        .clone()
        .oneshot(json_request("/api/create_pet_simple", key, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await
}

// --- key ---

#[tokio::test]
async fn key_with_valid_credentials() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/key")
                .header("email", DEMO_EMAIL)
                .header("password", DEMO_PASSWORD)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert!(body["key"].is_string());
}

#[tokio::test]
async fn key_with_empty_credentials_is_forbidden() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/key")
                .header("email", "")
                .header("password", "")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let content_type = resp.headers()[http::header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    let body = body_bytes(resp).await;
    assert!(!String::from_utf8_lossy(&body).contains("key"));
}

// --- list ---

#[tokio::test]
async fn list_without_key_is_forbidden() {
    let resp = app()
        .oneshot(Request::builder().uri("/api/pets?filter=").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn list_empty_store() {
    let (app, key) = app_and_key();
    let resp = app
        .oneshot(authed("GET", "/api/pets?filter=", &key).body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["pets"], Value::Array(Vec::new()));
}

#[tokio::test]
async fn list_with_unknown_filter_fails() {
    let (app, key) = app_and_key();
    let resp = app
        .oneshot(authed("GET", "/api/pets?filter=all", &key).body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn my_pets_excludes_other_users() {
    let mut store = Store::with_account(DEMO_EMAIL, DEMO_PASSWORD);
    store.accounts.push(mock_server::Account::new("other@test", "pw"));
    let mine = store.accounts[0].key.clone();
    let theirs = store.accounts[1].key.clone();
    let app = app_with(store);

    create_simple(&app, &theirs, "Stranger").await;
    let own = create_simple(&app, &mine, "Mine").await;

    let resp = app
        .clone()
        .oneshot(authed("GET", "/api/pets?filter=my_pets", &mine).body(String::new()).unwrap())
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    let pets = body["pets"].as_array().unwrap();
    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0]["id"], own.id.as_str());

    let resp = app
        .oneshot(authed("GET", "/api/pets?filter=", &mine).body(String::new()).unwrap())
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["pets"].as_array().unwrap().len(), 2);
}

// --- create ---

#[tokio::test]
async fn create_with_photo() {
    let (app, key) = app_and_key();
    let resp = app
        .oneshot(multipart_request(
            "/api/pets",
            &key,
            &[("name", "Goose"), ("animal_type", "goose"), ("age", "10")],
            Some(b"abc".as_slice()),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let pet: Pet = body_json(resp).await;
    assert_eq!(pet.name, "Goose");
    assert_eq!(pet.age, "10");
    assert_eq!(pet.pet_photo, "data:image/jpeg;base64,YWJj");
}

#[tokio::test]
async fn create_with_photo_requires_photo() {
    let (app, key) = app_and_key();
    let resp = app
        .oneshot(multipart_request(
            "/api/pets",
            &key,
            &[("name", "Goose"), ("animal_type", "goose"), ("age", "10")],
            None,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_simple_rejects_negative_age() {
    let (app, key) = app_and_key();
    let resp = app
        .oneshot(json_request(
            "/api/create_pet_simple",
            &key,
            r#"{"name":"Goose","animal_type":"goose","age":"-5"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_simple_rejects_boolean_fields() {
    let (app, key) = app_and_key();
    let resp = app
        .oneshot(json_request(
            "/api/create_pet_simple",
            &key,
            r#"{"name":false,"animal_type":false,"age":false}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update / photo / delete ---

#[tokio::test]
async fn update_unknown_pet_is_not_found() {
    let (app, key) = app_and_key();
    let resp = app
        .oneshot(
            authed("PUT", "/api/pets/missing", &key)
                .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body("name=Nope".to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn foreign_pet_cannot_be_deleted() {
    let mut store = Store::with_account(DEMO_EMAIL, DEMO_PASSWORD);
    store.accounts.push(mock_server::Account::new("other@test", "pw"));
    let mine = store.accounts[0].key.clone();
    let theirs = store.accounts[1].key.clone();
    let app = app_with(store);
    let pet = create_simple(&app, &theirs, "Stranger").await;

    let resp = app
        .oneshot(
            authed("DELETE", &format!("/api/pets/{}", pet.id), &mine)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn pet_lifecycle() {
    let (app, key) = app_and_key();
    let created = create_simple(&app, &key, "Gavrilych").await;
    assert!(created.pet_photo.is_empty());

    // update: partial, only name
    let resp = app
        .clone()
        .oneshot(
            authed("PUT", &format!("/api/pets/{}", created.id), &key)
                .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body("name=Martin".to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Pet = body_json(resp).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Martin");
    assert_eq!(updated.age, "3"); // unchanged

    // set photo
    let resp = app
        .clone()
        .oneshot(multipart_request(
            &format!("/api/pets/set_photo/{}", created.id),
            &key,
            &[],
            Some(b"xyz".as_slice()),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let with_photo: Pet = body_json(resp).await;
    assert_eq!(with_photo.pet_photo, "data:image/jpeg;base64,eHl6");

    // delete
    let resp = app
        .clone()
        .oneshot(
            authed("DELETE", &format!("/api/pets/{}", created.id), &key)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_bytes(resp).await.is_empty());

    // list after delete: empty
    let resp = app
        .oneshot(authed("GET", "/api/pets?filter=my_pets", &key).body(String::new()).unwrap())
        .await
        .unwrap();
    let body: Value = body_json(resp).await;
    assert_eq!(body["pets"], Value::Array(Vec::new()));
}

//! API integration tests against a running server
//!
//! Start the server with a librarian configured through
//! `LMS_BOOTSTRAP__LIBRARIAN_EMAIL` / `LMS_BOOTSTRAP__LIBRARIAN_PASSWORD`,
//! then run: cargo test --test api_tests -- --ignored

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8000";

fn librarian_credentials() -> (String, String) {
    (
        std::env::var("LMS_BOOTSTRAP__LIBRARIAN_EMAIL")
            .unwrap_or_else(|_| "librarian@example.org".to_string()),
        std::env::var("LMS_BOOTSTRAP__LIBRARIAN_PASSWORD")
            .unwrap_or_else(|_| "change-me".to_string()),
    )
}

/// Suffix keeping emails and ISBNs unique across runs
fn unique() -> String {
    Utc::now().timestamp_nanos_opt().unwrap_or_default().to_string()
}

async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse login response");
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().expect("No token in response").to_string()
}

async fn librarian_token(client: &Client) -> String {
    let (email, password) = librarian_credentials();
    login(client, &email, &password).await
}

/// Register a fresh member and return their token
async fn member_token(client: &Client) -> String {
    let email = format!("member{}@example.org", unique());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "name": "Test Member", "email": email, "password": "secret1" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    login(client, &email, "secret1").await
}

async fn add_book(client: &Client, token: &str, copies: i32) -> Value {
    let response = client
        .post(format!("{}/books/add", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "title": "Integration Book",
            "author": "Test Author",
            "isbn": format!("isbn-{}", unique()),
            "total_copies": copies
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_login_me() {
    let client = Client::new();
    let token = member_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "member");
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_book_lifecycle() {
    let client = Client::new();
    let token = librarian_token(&client).await;

    let book = add_book(&client, &token, 3).await;
    let id = book["id"].as_i64().unwrap();
    assert_eq!(book["available_copies"], 3);

    // Duplicate ISBN
    let response = client
        .post(format!("{}/books/add", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Copy",
            "author": "Someone",
            "isbn": book["isbn"],
            "total_copies": 1
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .put(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(&token)
        .json(&json!({ "total_copies": 5 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total_copies"], 5);
    assert_eq!(body["available_copies"], 5);

    let response = client
        .get(format!("{}/books/?q={}", BASE_URL, book["isbn"].as_str().unwrap()))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"], "Deleted");

    let response = client
        .get(format!("{}/books/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_issue_and_return() {
    let client = Client::new();
    let librarian = librarian_token(&client).await;
    let member = member_token(&client).await;

    let book = add_book(&client, &librarian, 1).await;
    let book_id = book["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/transactions/issue", BASE_URL))
        .bearer_auth(&member)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let issued: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(issued["detail"], "Issued");
    let transaction_id = issued["transaction_id"].as_i64().unwrap();

    // Last copy is gone
    let response = client
        .post(format!("{}/transactions/issue", BASE_URL))
        .bearer_auth(&member)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Outstanding copy blocks deletion
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&librarian)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/transactions/my", BASE_URL))
        .bearer_auth(&member)
        .send()
        .await
        .expect("Failed to send request");
    let mine: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(mine[0]["id"].as_i64(), Some(transaction_id));

    let response = client
        .post(format!("{}/transactions/return", BASE_URL))
        .bearer_auth(&member)
        .json(&json!({ "transaction_id": transaction_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let returned: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(returned["detail"], "Returned");
    assert_eq!(returned["fine"], 0);
    assert!(returned["transaction"]["returned_at"].is_string());

    let response = client
        .post(format!("{}/transactions/return", BASE_URL))
        .bearer_auth(&member)
        .json(&json!({ "transaction_id": transaction_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_issue_unknown_book() {
    let client = Client::new();
    let member = member_token(&client).await;

    let response = client
        .post(format!("{}/transactions/issue", BASE_URL))
        .bearer_auth(&member)
        .json(&json!({ "book_id": i32::MAX }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

async fn issue(client: &Client, token: &str, book_id: i64) -> reqwest::Response {
    client
        .post(format!("{}/transactions/issue", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request")
}

async fn fetch_book(client: &Client, book_id: i64) -> Value {
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
#[ignore]
async fn test_concurrent_issue_takes_last_copy_once() {
    let client = Client::new();
    let librarian = librarian_token(&client).await;
    let first = member_token(&client).await;
    let second = member_token(&client).await;

    let book = add_book(&client, &librarian, 1).await;
    let book_id = book["id"].as_i64().unwrap();

    let (a, b) = tokio::join!(
        issue(&client, &first, book_id),
        issue(&client, &second, book_id)
    );
    let mut statuses = [a.status(), b.status()];
    statuses.sort_by_key(|status| status.as_u16());
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);

    let body = fetch_book(&client, book_id).await;
    assert_eq!(body["available_copies"], 0);
    assert_eq!(body["total_copies"], 1);
}

#[tokio::test]
#[ignore]
async fn test_return_after_shrinking_total_is_capped() {
    let client = Client::new();
    let librarian = librarian_token(&client).await;
    let member = member_token(&client).await;

    let book = add_book(&client, &librarian, 1).await;
    let book_id = book["id"].as_i64().unwrap();

    let response = issue(&client, &member, book_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let issued: Value = response.json().await.expect("Failed to parse response");
    let transaction_id = issued["transaction_id"].as_i64().unwrap();

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&librarian)
        .json(&json!({ "total_copies": 0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("{}/transactions/return", BASE_URL))
        .bearer_auth(&member)
        .json(&json!({ "transaction_id": transaction_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = fetch_book(&client, book_id).await;
    assert_eq!(body["total_copies"], 0);
    assert_eq!(body["available_copies"], 0);
}

#[tokio::test]
#[ignore]
async fn test_deactivated_member_cannot_log_in() {
    let client = Client::new();
    let librarian = librarian_token(&client).await;

    let email = format!("member{}@example.org", unique());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({ "name": "Leaving Member", "email": email, "password": "secret1" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let registered: Value = response.json().await.expect("Failed to parse response");
    let user_id = registered["id"].as_i64().unwrap();

    let response = client
        .patch(format!("{}/users/{}/status", BASE_URL, user_id))
        .bearer_auth(&librarian)
        .json(&json!({ "is_active": false }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["is_active"], false);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

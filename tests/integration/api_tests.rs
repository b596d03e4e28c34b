//! API integration tests
//!
//! These talk to a running server backed by a real database:
//! `cargo test --test api_tests -- --ignored --test-threads=1`

use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

fn client() -> Client {
    // Redirects are part of the contract, so look at them instead of following
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Lowercase letters only, so the result fits title and name patterns
fn unique_word() -> String {
    let mut n = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let mut word = String::new();
    while n > 0 {
        word.push((b'a' + (n % 26) as u8) as char);
        n /= 26;
    }
    word
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

async fn create_book(client: &Client, title: &str, year: i32) -> Value {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": title, "author": "Stanislaw Lem", "year": year }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    find_book(client, title).await.expect("Created book not listed")
}

async fn find_book(client: &Client, title: &str) -> Option<Value> {
    let books: Value = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    books
        .as_array()
        .expect("books is an array")
        .iter()
        .find(|b| b["title"] == title)
        .cloned()
}

async fn create_person(client: &Client, name: &str) -> Value {
    let response = client
        .post(format!("{}/people", BASE_URL))
        .json(&json!({ "name": name, "birth_year": 1990 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let people: Value = client
        .get(format!("{}/people", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    people
        .as_array()
        .expect("people is an array")
        .iter()
        .find(|p| p["name"] == name)
        .cloned()
        .expect("Created person not listed")
}

fn unique_person_name() -> String {
    let word = capitalized(&unique_word());
    format!("Ivanov {} Ivanovich", word)
}

async fn get_json(client: &Client, path: &str) -> Value {
    client
        .get(format!("{}{}", BASE_URL, path))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response")
}

async fn assign(client: &Client, book_id: i64, person_id: i64) {
    let response = client
        .patch(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": person_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = client()
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
async fn test_created_book_is_on_shelf() {
    let client = client();
    let title = format!("Solaris {}", unique_word());

    let book = create_book(&client, &title, 1961).await;

    assert_eq!(book["author"], "Stanislaw Lem");
    assert_eq!(book["year"], 1961);
    assert!(book["holder"].is_null());
    assert!(book["taken_at"].is_null());
    assert_eq!(book["expired"], false);
}

#[tokio::test]
#[ignore]
async fn test_invalid_book_rerenders_form() {
    let client = client();
    let title = format!("Solaris {}", unique_word());

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({ "title": title, "author": "lem", "year": 9999 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["view"], "books/new");
    assert!(body["errors"]["author"].is_array());
    assert!(body["errors"]["year"].is_array());
    assert!(find_book(&client, &title).await.is_none());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_person_is_rejected() {
    let client = client();
    let name = unique_person_name();

    create_person(&client, &name).await;

    let response = client
        .post(format!("{}/people", BASE_URL))
        .json(&json!({ "name": name, "birth_year": 1980 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["view"], "people/new");
    assert!(body["errors"]["name"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_assign_then_release() {
    let client = client();
    let book = create_book(&client, &format!("Solaris {}", unique_word()), 1961).await;
    let person = create_person(&client, &unique_person_name()).await;
    let book_id = book["id"].as_i64().unwrap();
    let person_id = person["id"].as_i64().unwrap();

    let response = client
        .patch(format!("{}/books/{}/assign", BASE_URL, book_id))
        .json(&json!({ "person_id": person_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let details: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(details["holder"]["id"], person_id);
    assert!(details["book"]["taken_at"].is_string());

    let held: Value = client
        .get(format!("{}/people/{}/books", BASE_URL, person_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(held[0]["id"], book_id);
    assert_eq!(held[0]["expired"], false);

    let response = client
        .patch(format!("{}/books/{}/release", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let details: Value = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(details["holder"].is_null());
    assert!(details["book"]["taken_at"].is_null());
    assert!(details["people"].is_array());

    // A second release finds nobody holding the book
    let response = client
        .patch(format!("{}/books/{}/release", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[ignore]
async fn test_editing_a_lent_book_keeps_its_holder() {
    let client = client();
    let book = create_book(&client, &format!("Solaris {}", unique_word()), 1961).await;
    let person = create_person(&client, &unique_person_name()).await;
    let book_id = book["id"].as_i64().unwrap();
    let person_id = person["id"].as_i64().unwrap();

    assign(&client, book_id, person_id).await;
    let before = get_json(&client, &format!("/books/{}", book_id)).await;

    let new_title = format!("Eden {}", unique_word());
    let response = client
        .patch(format!("{}/books/{}", BASE_URL, book_id))
        .json(&json!({ "title": new_title, "author": "Stanislaw Lem", "year": 1959 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let after = get_json(&client, &format!("/books/{}", book_id)).await;
    assert_eq!(after["book"]["title"], new_title.as_str());
    assert_eq!(after["book"]["year"], 1959);
    assert_eq!(after["holder"]["id"], person_id);
    assert!(after["book"]["taken_at"].is_string());
    assert_eq!(after["book"]["taken_at"], before["book"]["taken_at"]);
}

#[tokio::test]
#[ignore]
async fn test_reassign_moves_book_between_holders() {
    let client = client();
    let book = create_book(&client, &format!("Solaris {}", unique_word()), 1961).await;
    let first = create_person(&client, &unique_person_name()).await;
    let second = create_person(&client, &unique_person_name()).await;
    let book_id = book["id"].as_i64().unwrap();
    let first_id = first["id"].as_i64().unwrap();
    let second_id = second["id"].as_i64().unwrap();

    assign(&client, book_id, first_id).await;
    assign(&client, book_id, second_id).await;

    let first_books = get_json(&client, &format!("/people/{}/books", first_id)).await;
    assert_eq!(first_books, json!([]));

    let second_books = get_json(&client, &format!("/people/{}/books", second_id)).await;
    let held = second_books.as_array().expect("books is an array");
    assert_eq!(held.len(), 1);
    assert_eq!(held[0]["id"], book_id);
    assert_eq!(held[0]["holder"]["id"], second_id);
}

#[tokio::test]
#[ignore]
async fn test_updating_a_person_keeps_their_books() {
    let client = client();
    let book = create_book(&client, &format!("Solaris {}", unique_word()), 1961).await;
    let person = create_person(&client, &unique_person_name()).await;
    let book_id = book["id"].as_i64().unwrap();
    let person_id = person["id"].as_i64().unwrap();

    assign(&client, book_id, person_id).await;

    let new_name = format!("Petrov {} Petrovich", capitalized(&unique_word()));
    let response = client
        .patch(format!("{}/people/{}", BASE_URL, person_id))
        .json(&json!({ "name": new_name, "birth_year": 1985 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let details = get_json(&client, &format!("/people/{}", person_id)).await;
    assert_eq!(details["person"]["name"], new_name.as_str());
    assert_eq!(details["person"]["birth_year"], 1985);

    let books = details["books"].as_array().expect("books is an array");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["id"], book_id);
    assert_eq!(books[0]["holder"]["name"], new_name.as_str());
}

#[tokio::test]
#[ignore]
async fn test_deleting_a_person_returns_their_books() {
    let client = client();
    let person = create_person(&client, &unique_person_name()).await;
    let person_id = person["id"].as_i64().unwrap();

    let mut book_ids = Vec::new();
    for _ in 0..2 {
        let book = create_book(&client, &format!("Solaris {}", unique_word()), 1961).await;
        let book_id = book["id"].as_i64().unwrap();
        assign(&client, book_id, person_id).await;
        book_ids.push(book_id);
    }

    let response = client
        .delete(format!("{}/people/{}", BASE_URL, person_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    for book_id in book_ids {
        let details = get_json(&client, &format!("/books/{}", book_id)).await;
        assert!(details["holder"].is_null());
        assert!(details["book"]["taken_at"].is_null());
    }

    let response = client
        .get(format!("{}/people/{}/books", BASE_URL, person_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_search_by_title_prefix() {
    let client = client();
    let word = unique_word();
    let title = format!("Solaris{}", word);
    create_book(&client, &title, 1961).await;

    let body: Value = client
        .post(format!("{}/books/search", BASE_URL))
        .json(&json!({ "title": format!("SOLARIS{}", word.to_uppercase()) }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let found = body["books"].as_array().expect("books is an array");
    assert!(found.iter().any(|b| b["title"] == title.as_str()));

    let empty: Value = client
        .post(format!("{}/books/search", BASE_URL))
        .json(&json!({ "title": "" }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(empty["books"], json!([]));

    let absent: Value = client
        .post(format!("{}/books/search", BASE_URL))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(absent["books"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_pages_slice_the_sorted_listing() {
    let client = client();
    for year in [1990, 1980, 2000, 1970] {
        create_book(&client, &format!("Paged {}", unique_word()), year).await;
    }

    let all: Vec<Value> = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let years: Vec<i64> = all.iter().map(|b| b["year"].as_i64().unwrap()).collect();
    assert!(years.windows(2).all(|w| w[0] <= w[1]));

    let page: Vec<Value> = client
        .get(format!("{}/books?page=1&books_per_page=2", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let expected: Vec<Value> = all.iter().skip(2).take(2).cloned().collect();
    assert_eq!(page, expected);
}

#[tokio::test]
#[ignore]
async fn test_bad_page_size_is_rejected() {
    let response = client()
        .get(format!("{}/books?books_per_page=0", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

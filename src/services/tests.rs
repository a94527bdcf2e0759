use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use proptest::prelude::*;

use super::seed::{ADMIN_ROLE, seed_identity};
use super::*;
use crate::config::{JwtConfig, SeedConfig};
use crate::error::{AppError, AppResult};
use crate::models::{Book, NewAuthor, NewBook, NewReview, RefreshSession};
use crate::repositories::{
    AuthorRepository, BookRepository, CategoryRepository, MemoryStore, PublisherRepository,
    ReviewRepository, Store, UserFilter, UserRepository,
};

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "service-tests-secret-0123456789abcdef0123".to_string(),
        issuer: "libris-rs".to_string(),
        audience: "libris-clients".to_string(),
        access_token_expiration_minutes: 30,
        refresh_token_expiration_hours: 168,
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_catalog_seed().unwrap())
}

fn services(store: Arc<MemoryStore>) -> Services {
    Services::new(store, jwt_config())
}

async fn services_with_identity() -> (Services, Arc<MemoryStore>) {
    let store = seeded_store();
    seed_identity(store.as_ref(), &SeedConfig::default())
        .await
        .unwrap();
    (services(store.clone()), store)
}

fn new_book(author_id: i32, category_id: i32, publisher_id: i32) -> NewBook {
    NewBook {
        title: "Dune".to_string(),
        isbn: "978-0441".to_string(),
        category_id,
        author_id,
        publisher_id,
    }
}

fn new_review(rating: i32, book_id: i32) -> NewReview {
    NewReview {
        reviewer_name: "Ann".to_string(),
        content: "Worth it.".to_string(),
        rating,
        book_id,
    }
}

fn registration(username: &str, email: &str) -> Registration {
    Registration {
        username: username.to_string(),
        email: email.to_string(),
        full_name: "Alice Liddell".to_string(),
        password: "Secret@123".to_string(),
        role: None,
    }
}

fn assert_not_found(result: AppResult<impl std::fmt::Debug>, expected_entity: &str) {
    match result {
        Err(AppError::NotFound { entity, .. }) => assert_eq!(entity, expected_entity),
        other => panic!("Expected NotFound for {expected_entity}, got {:?}", other),
    }
}

fn assert_unauthorized(result: AppResult<TokenPair>, expected: &str) {
    match result {
        Err(AppError::Unauthorized { message }) => assert_eq!(message, expected),
        other => panic!("Expected Unauthorized, got {:?}", other),
    }
}

/// Fails the test if any repository is requested.
struct UntouchableStore;

#[async_trait]
impl Store for UntouchableStore {
    fn books(&self) -> Box<dyn BookRepository> {
        panic!("storage must not be touched")
    }

    fn authors(&self) -> Box<dyn AuthorRepository> {
        panic!("storage must not be touched")
    }

    fn categories(&self) -> Box<dyn CategoryRepository> {
        panic!("storage must not be touched")
    }

    fn publishers(&self) -> Box<dyn PublisherRepository> {
        panic!("storage must not be touched")
    }

    fn reviews(&self) -> Box<dyn ReviewRepository> {
        panic!("storage must not be touched")
    }

    fn users(&self) -> Box<dyn UserRepository> {
        panic!("storage must not be touched")
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "untouchable"
    }
}

#[tokio::test]
async fn test_added_book_can_be_read_back() {
    let services = services(seeded_store());

    let book = services.books.add_book(new_book(2, 2, 2)).await.unwrap();
    let fetched = services.books.get_book_by_id(book.id).await.unwrap();

    assert_eq!(fetched, Some(book));
}

#[tokio::test]
async fn test_add_book_requires_existing_references() {
    let services = services(seeded_store());

    assert_not_found(services.books.add_book(new_book(99, 1, 1)).await, "author");
    assert_not_found(services.books.add_book(new_book(1, 99, 1)).await, "category");
    assert_not_found(services.books.add_book(new_book(1, 1, 99)).await, "publisher");
    assert_eq!(services.books.get_all_books().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_missing_book_is_not_found() {
    let services = services(seeded_store());
    let ghost = Book {
        id: 42,
        title: "Ghost".to_string(),
        isbn: "000".to_string(),
        category_id: 1,
        author_id: 1,
        publisher_id: 1,
    };

    assert_not_found(services.books.update_book(ghost).await, "book");
}

#[tokio::test]
async fn test_update_book_replaces_fields() {
    let services = services(seeded_store());
    let mut book = services.books.get_book_by_id(1).await.unwrap().unwrap();
    book.title = "Harry Potter and the Philosopher's Stone".to_string();
    book.publisher_id = 2;

    services.books.update_book(book.clone()).await.unwrap();

    let details = services.books.get_book_with_details(1).await.unwrap().unwrap();
    assert_eq!(details.book, book);
    assert_eq!(details.publisher.name, "Cambridge");
}

#[tokio::test]
async fn test_delete_nonexistent_rows_is_not_found() {
    let services = services(seeded_store());

    assert_not_found(services.books.delete_book(404).await, "book");
    assert_not_found(services.authors.delete_author(404).await, "author");
    assert_not_found(services.categories.delete_category(404).await, "category");
    assert_not_found(services.publishers.delete_publisher(404).await, "publisher");
    assert_not_found(services.reviews.delete_review(404).await, "review");
}

#[tokio::test]
async fn test_delete_book_cascades_to_reviews() {
    let services = services(seeded_store());
    services.reviews.add_review(new_review(3, 1)).await.unwrap();
    assert_eq!(services.reviews.get_reviews_by_book(1).await.unwrap().len(), 2);

    services.books.delete_book(1).await.unwrap();

    let remaining = services.reviews.get_all_reviews().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining.iter().all(|r| r.review.book_id != 1));
    assert_not_found(services.reviews.get_reviews_by_book(1).await, "book");
}

#[tokio::test]
async fn test_author_with_books_cannot_be_deleted() {
    let services = services(seeded_store());

    match services.authors.delete_author(1).await {
        Err(AppError::Validation { .. }) => {}
        other => panic!("Expected Validation, got {:?}", other),
    }
    assert!(services.authors.get_author_by_id(1).await.unwrap().is_some());

    let lonely = services
        .authors
        .add_author(NewAuthor {
            name: "Ursula K. Le Guin".to_string(),
        })
        .await
        .unwrap();
    services.authors.delete_author(lonely.id).await.unwrap();
}

#[tokio::test]
async fn test_with_books_graphs() {
    let services = services(seeded_store());

    let author = services.authors.get_author_with_books(2).await.unwrap();
    assert_eq!(author.author.name, "Isaac Newton");
    assert_eq!(author.books.len(), 1);
    assert_eq!(author.books[0].category.name, "Science");

    let category = services.categories.get_category_with_books(1).await.unwrap();
    assert_eq!(category.books[0].author.name, "J.K. Rowling");

    let publisher = services.publishers.get_publisher_with_books(2).await.unwrap();
    assert_eq!(publisher.books[0].book.isbn, "987-654321");

    assert_not_found(services.authors.get_author_with_books(9).await, "author");
    assert_not_found(services.categories.get_category_with_books(9).await, "category");
    assert_not_found(services.publishers.get_publisher_with_books(9).await, "publisher");
}

#[tokio::test]
async fn test_average_rating() {
    let services = services(seeded_store());
    services.reviews.add_review(new_review(2, 1)).await.unwrap();

    assert_eq!(services.reviews.get_average_rating_for_book(1).await.unwrap(), 3.5);
    assert_not_found(services.reviews.get_average_rating_for_book(77).await, "book");
}

#[tokio::test]
async fn test_review_for_missing_book_is_not_found() {
    let services = services(seeded_store());
    assert_not_found(services.reviews.add_review(new_review(4, 77)).await, "book");
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_add_review_accepts_exactly_one_to_five(rating in -20i32..=20) {
        if (1..=5).contains(&rating) {
            let services = services(seeded_store());
            let review = block_on(services.reviews.add_review(new_review(rating, 2))).unwrap();
            prop_assert_eq!(review.rating, rating);
        } else {
            let service = ReviewService::new(Arc::new(UntouchableStore));
            let result = block_on(service.add_review(new_review(rating, 2)));
            let is_rating_error =
                matches!(result, Err(AppError::Validation { ref field, .. }) if field == "rating");
            prop_assert!(is_rating_error);
        }
    }
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let (_services, store) = services_with_identity().await;
    seed_identity(store.as_ref(), &SeedConfig::default())
        .await
        .unwrap();

    let users = store.users();
    let admins = users
        .find(&UserFilter::by_email("admin@example.com"))
        .await
        .unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(
        users.roles_for_user(admins[0].id).await.unwrap(),
        vec![ADMIN_ROLE.to_string()]
    );
    assert!(users.role_exists(DEFAULT_ROLE).await.unwrap());
}

#[tokio::test]
async fn test_register_issues_tokens_and_week_long_session() {
    let (services, store) = services_with_identity().await;

    let pair = services
        .auth
        .register(registration("alice", "alice@x.com"))
        .await
        .unwrap();
    assert!(!pair.token.is_empty());
    assert!(!pair.refresh_token.is_empty());

    let claims = services.tokens().validate_token(&pair.token).unwrap();
    assert_eq!(claims.name, "alice");
    assert_eq!(claims.role, vec![DEFAULT_ROLE.to_string()]);

    let user = store
        .users()
        .find(&UserFilter::by_username("alice"))
        .await
        .unwrap()
        .remove(0);
    assert_eq!(user.refresh_token.as_deref(), Some(pair.refresh_token.as_str()));
    let expiry = user.refresh_token_expiry_time.unwrap();
    let remaining = expiry.duration_since(Timestamp::now());
    assert!(remaining > SignedDuration::from_hours(167));
    assert!(remaining <= SignedDuration::from_hours(168));
    assert!(user.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_register_rejects_unknown_role_before_writing() {
    let (services, store) = services_with_identity().await;
    let mut request = registration("bob", "bob@x.com");
    request.role = Some("Librarian".to_string());

    match services.auth.register(request).await {
        Err(AppError::BadRequest { message }) => assert_eq!(message, INVALID_ROLE),
        other => panic!("Expected BadRequest, got {:?}", other),
    }
    assert!(store
        .users()
        .find(&UserFilter::by_username("bob"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_register_rejects_taken_username_and_email() {
    let (services, _) = services_with_identity().await;
    services
        .auth
        .register(registration("alice", "alice@x.com"))
        .await
        .unwrap();

    for request in [
        registration("alice", "other@x.com"),
        registration("other", "alice@x.com"),
    ] {
        match services.auth.register(request).await {
            Err(AppError::BadRequest { message }) => assert!(message.contains("already taken")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_identity_is_case_insensitive() {
    let (services, _) = services_with_identity().await;
    services
        .auth
        .register(registration("alice", "Alice@X.com"))
        .await
        .unwrap();

    let pair = services
        .auth
        .login("alice@x.com", "Secret@123".to_string())
        .await
        .unwrap();
    let claims = services.tokens().validate_token(&pair.token).unwrap();
    assert_eq!(claims.name, "alice");

    for request in [
        registration("ALICE", "someone@x.com"),
        registration("bob", "ALICE@x.COM"),
    ] {
        match services.auth.register(request).await {
            Err(AppError::BadRequest { message }) => assert!(message.contains("already taken")),
            other => panic!("Expected BadRequest, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_login_uses_one_message_for_every_failure() {
    let (services, _) = services_with_identity().await;

    assert_unauthorized(
        services.auth.login("nobody@x.com", "Admin@123".to_string()).await,
        INVALID_CREDENTIALS,
    );
    assert_unauthorized(
        services.auth.login("admin@example.com", "wrong".to_string()).await,
        INVALID_CREDENTIALS,
    );

    let pair = services
        .auth
        .login("admin@example.com", "Admin@123".to_string())
        .await
        .unwrap();
    let claims = services.tokens().validate_token(&pair.token).unwrap();
    assert_eq!(claims.role, vec![ADMIN_ROLE.to_string()]);
}

#[tokio::test]
async fn test_refresh_token_is_single_use() {
    let (services, _) = services_with_identity().await;
    let first = services
        .auth
        .register(registration("alice", "alice@x.com"))
        .await
        .unwrap();

    let second = services
        .auth
        .refresh(&first.refresh_token, None)
        .await
        .unwrap();
    assert_ne!(second.refresh_token, first.refresh_token);

    assert_unauthorized(
        services.auth.refresh(&first.refresh_token, None).await,
        INVALID_REFRESH_TOKEN,
    );
    services
        .auth
        .refresh(&second.refresh_token, Some(second.token.as_str()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_expired_refresh_token_is_rejected_even_when_it_matches() {
    let (services, store) = services_with_identity().await;
    services
        .auth
        .register(registration("alice", "alice@x.com"))
        .await
        .unwrap();
    let users = store.users();
    let user = users
        .find(&UserFilter::by_username("alice"))
        .await
        .unwrap()
        .remove(0);

    let stale = RefreshSession {
        token: "stale-token".to_string(),
        expires_at: Timestamp::now() - SignedDuration::from_secs(1),
    };
    users.set_refresh_session(user.id, &stale).await.unwrap();

    assert_unauthorized(
        services.auth.refresh("stale-token", None).await,
        INVALID_REFRESH_TOKEN,
    );
}

#[tokio::test]
async fn test_refresh_rejects_access_token_of_another_user() {
    let (services, _) = services_with_identity().await;
    let alice = services
        .auth
        .register(registration("alice", "alice@x.com"))
        .await
        .unwrap();
    let admin = services
        .auth
        .login("admin@example.com", "Admin@123".to_string())
        .await
        .unwrap();

    assert_unauthorized(
        services.auth.refresh(&alice.refresh_token, Some(admin.token.as_str())).await,
        INVALID_REFRESH_TOKEN,
    );
    assert_unauthorized(
        services.auth.refresh(&alice.refresh_token, Some("not-a-jwt")).await,
        INVALID_REFRESH_TOKEN,
    );
    // The failed attempts did not consume the token.
    services
        .auth
        .refresh(&alice.refresh_token, Some(alice.token.as_str()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let (services, _) = services_with_identity().await;
    let pair = services
        .auth
        .register(registration("alice", "alice@x.com"))
        .await
        .unwrap();
    let user_id = services
        .tokens()
        .validate_token(&pair.token)
        .unwrap()
        .user_id()
        .unwrap();

    services.auth.logout(user_id).await.unwrap();

    assert_unauthorized(
        services.auth.refresh(&pair.refresh_token, None).await,
        INVALID_REFRESH_TOKEN,
    );
}

#[tokio::test]
async fn test_logout_of_unknown_user_is_unauthorized() {
    let (services, _) = services_with_identity().await;
    match services.auth.logout(9999).await {
        Err(AppError::Unauthorized { message }) => assert_eq!(message, UNKNOWN_USER),
        other => panic!("Expected Unauthorized, got {:?}", other),
    }
}

mod common;

use chrono::Duration;
use common::Fixture;
use rusty_library_circulation::application::{LibraryError, review_service};
use rusty_library_circulation::domain::commands::*;
use rusty_library_circulation::domain::{BookId, DomainEvent, Review, ReviewId};

async fn post(fx: &Fixture, book_id: BookId, rating: u8) -> Result<Review, LibraryError> {
    review_service::post_review(
        &fx.deps,
        PostReview {
            book_id,
            rating,
            comment: Some("Worth reading".to_string()),
        },
    )
    .await
}

#[tokio::test]
async fn test_post_review_success() {
    // Arrange
    let fx = Fixture::new();
    let book_id = fx.add_book("The Fifth Season", 1).await;
    fx.as_member();

    // Act
    let review = post(&fx, book_id, 5).await.unwrap();

    // Assert: 投稿日時は時計の時刻
    assert_eq!(review.book_id, book_id);
    assert_eq!(review.member_id, fx.member_id);
    assert_eq!(review.rating, 5);
    assert_eq!(review.review_date, fx.now());
    assert!(matches!(
        fx.gateway.events().unwrap().last(),
        Some(DomainEvent::ReviewPosted(_))
    ));
}

#[tokio::test]
async fn test_post_review_once_per_book() {
    let fx = Fixture::new();
    let book_id = fx.add_book("The Obelisk Gate", 1).await;
    fx.as_member();
    post(&fx, book_id, 4).await.unwrap();

    let again = post(&fx, book_id, 2).await;

    assert!(matches!(again, Err(LibraryError::Validation(_))));
    let reviews = review_service::list_book_reviews(&fx.deps, book_id)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, 4);
}

#[tokio::test]
async fn test_post_review_rating_out_of_range() {
    let fx = Fixture::new();
    let book_id = fx.add_book("The Stone Sky", 1).await;
    fx.as_member();

    for rating in [0, 6] {
        let result = post(&fx, book_id, rating).await;
        assert!(matches!(result, Err(LibraryError::Validation(_))));
    }
    assert!(
        review_service::list_book_reviews(&fx.deps, book_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_post_review_for_unknown_book_is_not_found() {
    let fx = Fixture::new();
    fx.as_member();

    let result = post(&fx, BookId::new(), 3).await;

    assert!(matches!(result, Err(LibraryError::NotFound(_))));
}

#[tokio::test]
async fn test_rating_is_public_and_rounded() {
    // Arrange: 3人の会員が5, 4, 4をつける
    let fx = Fixture::new();
    let book_id = fx.add_book("The City We Became", 1).await;
    for rating in [5, 4, 4] {
        fx.as_new_member();
        post(&fx, book_id, rating).await.unwrap();
        fx.clock.advance(Duration::minutes(1));
    }

    // Act: 未ログインで読む
    fx.sign_out();
    let rating = review_service::book_rating(&fx.deps, book_id).await.unwrap();
    let reviews = review_service::list_book_reviews(&fx.deps, book_id)
        .await
        .unwrap();

    // Assert: 新しい順
    assert_eq!(rating.review_count, 3);
    assert_eq!(rating.average_rating, 4.3);
    assert_eq!(reviews.len(), 3);
    assert!(reviews[0].review_date > reviews[2].review_date);
}

#[tokio::test]
async fn test_rating_without_reviews_is_zero() {
    let fx = Fixture::new();
    let book_id = fx.add_book("The Killing Moon", 1).await;

    let rating = review_service::book_rating(&fx.deps, book_id).await.unwrap();

    assert_eq!(rating.review_count, 0);
    assert_eq!(rating.average_rating, 0.0);
}

#[tokio::test]
async fn test_list_my_reviews_only_returns_own() {
    // Arrange
    let fx = Fixture::new();
    let first = fx.add_book("The Hundred Thousand Kingdoms", 1).await;
    let second = fx.add_book("The Broken Kingdoms", 1).await;
    fx.as_member();
    post(&fx, first, 5).await.unwrap();
    fx.as_new_member();
    post(&fx, second, 3).await.unwrap();

    // Act
    fx.as_member();
    let mine = review_service::list_my_reviews(&fx.deps).await.unwrap();

    // Assert
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].book_id, first);
}

#[tokio::test]
async fn test_delete_review_only_by_author() {
    // Arrange
    let fx = Fixture::new();
    let book_id = fx.add_book("The Kingdom of Gods", 1).await;
    fx.as_member();
    let review = post(&fx, book_id, 2).await.unwrap();
    let cmd = DeleteReview {
        review_id: review.review_id,
    };

    // Act: 他の会員は削除できず、本人は削除できる
    fx.as_new_member();
    let by_other = review_service::delete_review(&fx.deps, cmd.clone()).await;
    fx.as_member();
    let by_author = review_service::delete_review(&fx.deps, cmd).await;

    // Assert
    assert!(matches!(by_other, Err(LibraryError::Forbidden(_))));
    assert!(by_author.is_ok());
    assert!(
        review_service::list_my_reviews(&fx.deps)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_delete_unknown_review_is_not_found() {
    let fx = Fixture::new();
    fx.as_member();

    let result = review_service::delete_review(
        &fx.deps,
        DeleteReview {
            review_id: ReviewId::new(),
        },
    )
    .await;

    assert!(matches!(result, Err(LibraryError::NotFound(_))));
}

#[tokio::test]
async fn test_review_can_be_posted_again_after_delete() {
    let fx = Fixture::new();
    let book_id = fx.add_book("Dreamblood", 1).await;
    fx.as_member();
    let first = post(&fx, book_id, 1).await.unwrap();
    review_service::delete_review(
        &fx.deps,
        DeleteReview {
            review_id: first.review_id,
        },
    )
    .await
    .unwrap();

    let second = post(&fx, book_id, 4).await.unwrap();

    assert_ne!(second.review_id, first.review_id);
    let rating = review_service::book_rating(&fx.deps, book_id).await.unwrap();
    assert_eq!(rating.review_count, 1);
    assert_eq!(rating.average_rating, 4.0);
}

mod common;

use common::{Fixture, details};
use rusty_library_circulation::application::{
    LibraryError, catalog_service, circulation_service, fine_service, member_service,
    review_service, statistics,
};
use rusty_library_circulation::domain::commands::*;
use rusty_library_circulation::domain::{
    AccountId, Action, BookId, FineId, LoanId, Money, ReservationId, ReviewId, Role, Scope,
    can_perform,
};

#[test]
fn test_member_and_librarian_capabilities_are_disjoint() {
    for action in Action::ALL {
        if action == Action::ViewCatalog {
            continue;
        }
        assert!(
            !(can_perform(Role::Member, action) && can_perform(Role::Librarian, action)),
            "{} is granted to both roles",
            action
        );
    }
}

#[tokio::test]
async fn test_unauthenticated_writes_are_rejected() {
    // Arrange
    let fx = Fixture::new();
    let book_id = fx.add_book("Foundation", 1).await;
    fx.sign_out();

    // Act
    let reserve = circulation_service::reserve_book(&fx.deps, ReserveBook { book_id }).await;
    let create = catalog_service::create_book(
        &fx.deps,
        AddBook {
            details: details("Second Foundation", 1),
        },
    )
    .await;
    let loans = circulation_service::list_loans(&fx.deps, Scope::Mine).await;
    let review = review_service::post_review(
        &fx.deps,
        PostReview {
            book_id,
            rating: 5,
            comment: None,
        },
    )
    .await;

    // Assert
    assert!(matches!(reserve, Err(LibraryError::Unauthenticated)));
    assert!(matches!(create, Err(LibraryError::Unauthenticated)));
    assert!(matches!(loans, Err(LibraryError::Unauthenticated)));
    assert!(matches!(review, Err(LibraryError::Unauthenticated)));
}

#[tokio::test]
async fn test_member_cannot_use_librarian_actions() {
    let fx = Fixture::new();
    fx.as_member();

    let results = [
        catalog_service::create_book(
            &fx.deps,
            AddBook {
                details: details("I, Robot", 1),
            },
        )
        .await
        .map(|_| ()),
        catalog_service::delete_book(
            &fx.deps,
            DeleteBook {
                book_id: BookId::new(),
            },
        )
        .await,
        circulation_service::approve_reservation(
            &fx.deps,
            ApproveReservation {
                reservation_id: ReservationId::new(),
            },
        )
        .await
        .map(|_| ()),
        circulation_service::return_loan(
            &fx.deps,
            ReturnLoan {
                loan_id: LoanId::new(),
            },
        )
        .await
        .map(|_| ()),
        circulation_service::create_loan(
            &fx.deps,
            CreateLoan {
                book_id: BookId::new(),
                borrower_id: fx.member_id,
                loan_days: None,
            },
        )
        .await
        .map(|_| ()),
        fine_service::issue_fine(
            &fx.deps,
            IssueFine {
                loan_id: LoanId::new(),
                amount: Money::from_minor_units(100),
                reason: "Lost".to_string(),
            },
        )
        .await
        .map(|_| ()),
        fine_service::pay_fine(
            &fx.deps,
            PayFine {
                fine_id: FineId::new(),
            },
        )
        .await
        .map(|_| ()),
        circulation_service::list_loans(&fx.deps, Scope::All)
            .await
            .map(|_| ()),
        statistics::librarian_statistics(&fx.deps).await.map(|_| ()),
        member_service::list_accounts(&fx.deps).await.map(|_| ()),
        member_service::delete_account(&fx.deps, AccountId::Member(fx.member_id)).await,
    ];

    // 対象の存在確認より先に権限で拒否される
    for result in results {
        assert!(matches!(result, Err(LibraryError::Forbidden(_))));
    }
}

#[tokio::test]
async fn test_librarian_cannot_use_member_actions() {
    let fx = Fixture::new();
    let book_id = fx.add_book("The Caves of Steel", 1).await;

    let reserve = circulation_service::reserve_book(&fx.deps, ReserveBook { book_id }).await;
    let own_loans = circulation_service::list_loans(&fx.deps, Scope::Mine).await;
    let own_stats = statistics::member_statistics(&fx.deps).await;
    let review = review_service::post_review(
        &fx.deps,
        PostReview {
            book_id,
            rating: 3,
            comment: None,
        },
    )
    .await;
    let remove = review_service::delete_review(
        &fx.deps,
        DeleteReview {
            review_id: ReviewId::new(),
        },
    )
    .await;
    let own_reviews = review_service::list_my_reviews(&fx.deps).await;

    assert!(matches!(reserve, Err(LibraryError::Forbidden(_))));
    assert!(matches!(own_loans, Err(LibraryError::Forbidden(_))));
    assert!(matches!(own_stats, Err(LibraryError::Forbidden(_))));
    assert!(matches!(review, Err(LibraryError::Forbidden(_))));
    assert!(matches!(remove, Err(LibraryError::Forbidden(_))));
    assert!(matches!(own_reviews, Err(LibraryError::Forbidden(_))));
}

#[tokio::test]
async fn test_revoked_credential_is_unauthenticated_at_gateway() {
    // Arrange: セッション上はログイン済みだが、資格情報はリモート側で失効
    let fx = Fixture::new();
    let book_id = fx.add_book("The Naked Sun", 1).await;
    fx.as_member();
    fx.gateway.revoke(fx.member.credential().unwrap()).unwrap();

    // Act
    let result = circulation_service::reserve_book(&fx.deps, ReserveBook { book_id }).await;

    // Assert
    assert!(matches!(result, Err(LibraryError::Unauthenticated)));
    let entry = catalog_service::get_book(&fx.deps, book_id).await.unwrap();
    assert!(entry.available);
}

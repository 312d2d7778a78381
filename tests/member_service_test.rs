mod common;

use common::Fixture;
use rusty_library_circulation::application::{LibraryError, circulation_service, member_service};
use rusty_library_circulation::domain::commands::ReserveBook;
use rusty_library_circulation::domain::{AccountId, MemberId, NewAccount, Role};

fn new_account(email: &str, role: Role) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        password: "secret1".to_string(),
        role,
    }
}

#[tokio::test]
async fn test_list_accounts_and_members() {
    // Arrange
    let fx = Fixture::new();
    fx.new_member();
    fx.as_librarian();

    // Act
    let accounts = member_service::list_accounts(&fx.deps).await.unwrap();
    let members = member_service::list_members(&fx.deps).await.unwrap();

    // Assert: 司書1名と会員2名
    assert_eq!(accounts.len(), 3);
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|a| a.role() == Role::Member));
    assert!(members.iter().any(|a| a.account_id == AccountId::Member(fx.member_id)));
}

#[tokio::test]
async fn test_create_account_with_role() {
    let fx = Fixture::new();
    fx.as_librarian();

    let librarian = member_service::create_account(
        &fx.deps,
        new_account("staff@library.test", Role::Librarian),
    )
    .await
    .unwrap();
    let member = member_service::create_account(
        &fx.deps,
        new_account("patron@library.test", Role::Member),
    )
    .await
    .unwrap();
    // ロール未指定相当は会員になる
    let defaulted = member_service::create_account(
        &fx.deps,
        new_account("guest@library.test", Role::Unauthenticated),
    )
    .await
    .unwrap();

    assert_eq!(librarian.role(), Role::Librarian);
    assert_eq!(member.role(), Role::Member);
    assert_eq!(defaulted.role(), Role::Member);
    assert_eq!(member_service::list_members(&fx.deps).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_create_account_validation() {
    let fx = Fixture::new();
    fx.as_librarian();

    let cases = [
        new_account("", Role::Member),
        new_account("no-at-sign", Role::Member),
        NewAccount {
            password: "abc".to_string(),
            ..new_account("short@library.test", Role::Member)
        },
        // 登録済みのメールアドレス（大文字小文字は区別しない）
        new_account("Member@Library.test", Role::Member),
    ];

    for case in cases {
        let result = member_service::create_account(&fx.deps, case).await;
        assert!(matches!(result, Err(LibraryError::Validation(_))));
    }
    assert_eq!(member_service::list_accounts(&fx.deps).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_member_cannot_manage_accounts() {
    let fx = Fixture::new();
    fx.as_member();

    let list = member_service::list_members(&fx.deps).await;
    let create =
        member_service::create_account(&fx.deps, new_account("x@library.test", Role::Librarian))
            .await;

    assert!(matches!(list, Err(LibraryError::Forbidden(_))));
    assert!(matches!(create, Err(LibraryError::Forbidden(_))));
}

#[tokio::test]
async fn test_delete_account_revokes_access() {
    // Arrange: 会員は削除前なら予約できる
    let fx = Fixture::new();
    let book_id = fx.add_book("Binti", 2).await;
    let member = fx.other_client(fx.member.clone());

    // Act
    member_service::delete_account(&fx.deps, AccountId::Member(fx.member_id))
        .await
        .unwrap();
    let reserve = circulation_service::reserve_book(&member, ReserveBook { book_id }).await;

    // Assert
    assert!(matches!(reserve, Err(LibraryError::Unauthenticated)));
    let members = member_service::list_members(&fx.deps).await.unwrap();
    assert!(members.is_empty());
}

#[tokio::test]
async fn test_delete_own_account_is_rejected() {
    let fx = Fixture::new();
    fx.as_librarian();
    let own = AccountId::Librarian(fx.librarian.staff_id().unwrap());

    let result = member_service::delete_account(&fx.deps, own).await;

    assert!(matches!(result, Err(LibraryError::Validation(_))));
    assert_eq!(member_service::list_accounts(&fx.deps).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_unknown_account_is_not_found() {
    let fx = Fixture::new();
    fx.as_librarian();
    let unknown = AccountId::Member(MemberId::new());

    let result = member_service::delete_account(&fx.deps, unknown).await;

    assert!(matches!(result, Err(LibraryError::NotFound(_))));
}

use crate::domain::{
    Action, Actor, BookId, BookSnapshot, ChangeSet, MemberId, Role, StaffId, can_perform,
};
use crate::ports::{GatewayError, LibraryGateway, RecordFilter};

use super::{LibraryError, Result, ServiceDependencies};

/// 現在の利用者を取得し、操作の権限を確認する
///
/// - 未ログインで閲覧以外を要求 → Unauthenticated
/// - ログイン済みだがロールに無い操作 → Forbidden
pub(super) async fn authorize(deps: &ServiceDependencies, action: Action) -> Result<Actor> {
    let actor = deps.session.current_actor().await;
    check(&actor, action)?;
    Ok(actor)
}

fn check(actor: &Actor, action: Action) -> Result<()> {
    let role = actor.role();
    if can_perform(role, action) {
        return Ok(());
    }

    tracing::warn!(%role, %action, "request denied by policy");
    match role {
        Role::Unauthenticated => Err(LibraryError::Unauthenticated),
        Role::Member | Role::Librarian => Err(LibraryError::Forbidden(format!(
            "{} may not {}",
            role, action
        ))),
    }
}

pub(super) fn staff_id(actor: &Actor) -> Result<StaffId> {
    actor
        .staff_id()
        .ok_or_else(|| LibraryError::Forbidden(format!("{} is not staff", actor.role())))
}

pub(super) fn member_id(actor: &Actor) -> Result<MemberId> {
    actor
        .member_id()
        .ok_or_else(|| LibraryError::Forbidden(format!("{} is not a member", actor.role())))
}

/// 書籍と、その貸出・予約を同時に読み取る
pub(super) async fn load_snapshot(
    gateway: &dyn LibraryGateway,
    book_id: BookId,
) -> Result<BookSnapshot> {
    let (book, loans, reservations) = futures::try_join!(
        gateway.get_book(book_id),
        gateway.list_loans(RecordFilter::Book(book_id)),
        gateway.list_reservations(RecordFilter::Book(book_id)),
    )?;
    let book = book.ok_or_else(|| LibraryError::NotFound(format!("book {}", book_id)))?;

    Ok(BookSnapshot {
        book,
        loans,
        reservations,
    })
}

/// 利用者の資格情報を付けて変更セットをコミットする
pub(super) async fn commit(
    deps: &ServiceDependencies,
    actor: &Actor,
    changes: ChangeSet,
) -> Result<()> {
    let credential = actor.credential().ok_or(LibraryError::Unauthenticated)?;
    let events: Vec<&'static str> = changes.events.iter().map(|e| e.event_type()).collect();

    match deps.gateway.commit(credential, changes).await {
        Ok(()) => {
            tracing::info!(?events, "change set committed");
            Ok(())
        }
        Err(err @ GatewayError::Conflict(_)) => {
            tracing::warn!(error = %err, "change set rejected");
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Credential;

    #[test]
    fn test_unauthenticated_is_not_forbidden() {
        assert!(check(&Actor::Unauthenticated, Action::ViewCatalog).is_ok());
        assert!(matches!(
            check(&Actor::Unauthenticated, Action::ReserveBook),
            Err(LibraryError::Unauthenticated)
        ));
    }

    #[test]
    fn test_wrong_role_is_forbidden() {
        let member = Actor::member(MemberId::new(), Credential::new("m"));
        let librarian = Actor::librarian(StaffId::new(), Credential::new("l"));

        assert!(matches!(
            check(&member, Action::ApproveReservation),
            Err(LibraryError::Forbidden(_))
        ));
        assert!(matches!(
            check(&librarian, Action::ReserveBook),
            Err(LibraryError::Forbidden(_))
        ));
        assert!(check(&librarian, Action::ReturnLoan).is_ok());
    }
}

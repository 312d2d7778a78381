use crate::domain::{Action, LoanStatus, Money, ReservationStatus, lifecycle};
use crate::ports::{FineFilter, RecordFilter};
use serde::{Deserialize, Serialize};

use super::access::{authorize, member_id};
use super::{Result, ServiceDependencies};

/// 司書向けの貸出状況
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarianStatistics {
    pub total_books: usize,
    pub available_books: usize,
    pub total_loans: usize,
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub pending_reservations: usize,
}

/// 会員向けの貸出状況
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberStatistics {
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub pending_reservations: usize,
    /// 未払い罰金の合計
    pub unpaid_fines: Money,
    pub available_books: usize,
}

/// 司書向けの貸出状況を集計する
///
/// ステータスはすべて時計の現在時刻で導出する。
#[tracing::instrument(skip(deps))]
pub async fn librarian_statistics(deps: &ServiceDependencies) -> Result<LibrarianStatistics> {
    authorize(deps, Action::ViewAllLoans).await?;
    let now = deps.clock.now();

    let (books, loans, reservations) = futures::try_join!(
        deps.gateway.list_books(),
        deps.gateway.list_loans(RecordFilter::All),
        deps.gateway.list_reservations(RecordFilter::All),
    )?;

    let available_books = books
        .iter()
        .filter(|book| {
            lifecycle::availability(book, &loans, &reservations, None, now).is_available()
        })
        .count();
    let count_loans = |status: LoanStatus| {
        loans
            .iter()
            .filter(|l| l.status(now) == status)
            .count()
    };

    Ok(LibrarianStatistics {
        total_books: books.len(),
        available_books,
        total_loans: loans.len(),
        active_loans: count_loans(LoanStatus::Active),
        overdue_loans: count_loans(LoanStatus::Overdue),
        pending_reservations: reservations
            .iter()
            .filter(|r| r.status(now) == ReservationStatus::Pending)
            .count(),
    })
}

/// 会員自身の貸出状況を集計する
#[tracing::instrument(skip(deps))]
pub async fn member_statistics(deps: &ServiceDependencies) -> Result<MemberStatistics> {
    let actor = authorize(deps, Action::ViewOwnLoans).await?;
    let member_id = member_id(&actor)?;
    let now = deps.clock.now();

    // 貸出可能数の導出には全員の貸出・予約が必要
    let (books, loans, reservations, fines) = futures::try_join!(
        deps.gateway.list_books(),
        deps.gateway.list_loans(RecordFilter::All),
        deps.gateway.list_reservations(RecordFilter::All),
        deps.gateway.list_fines(FineFilter::Member(member_id)),
    )?;

    let available_books = books
        .iter()
        .filter(|book| {
            lifecycle::availability(book, &loans, &reservations, None, now).is_available()
        })
        .count();
    let own_loans = |status: LoanStatus| {
        loans
            .iter()
            .filter(|l| l.borrower_id == member_id && l.status(now) == status)
            .count()
    };

    Ok(MemberStatistics {
        active_loans: own_loans(LoanStatus::Active),
        overdue_loans: own_loans(LoanStatus::Overdue),
        pending_reservations: reservations
            .iter()
            .filter(|r| r.member_id == member_id && r.status(now) == ReservationStatus::Pending)
            .count(),
        unpaid_fines: fines.iter().filter(|f| !f.is_paid()).map(|f| f.amount).sum(),
        available_books,
    })
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, FineId, LoanId, MemberId, Money, ReservationId, ReviewId, StaffId};

/// イベント：書籍が登録された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAdded {
    pub book_id: BookId,
    pub title: String,
    pub total_copies: u32,
    pub added_by: StaffId,
    pub added_at: DateTime<Utc>,
}

/// イベント：書籍情報が編集された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEdited {
    pub book_id: BookId,
    pub total_copies: u32,
    pub edited_by: StaffId,
    pub edited_at: DateTime<Utc>,
}

/// イベント：書籍が削除された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRemoved {
    pub book_id: BookId,
    pub removed_by: StaffId,
    pub removed_at: DateTime<Utc>,
}

/// イベント：貸出が開始された
///
/// 予約承認から生まれた場合は`reservation_id`を持つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanOpened {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub borrower_id: MemberId,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub opened_by: StaffId,
    pub reservation_id: Option<ReservationId>,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanReturned {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub borrower_id: MemberId,
    pub returned_at: DateTime<Utc>,
    pub was_overdue: bool,
    pub received_by: StaffId,
}

/// イベント：予約が作成された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationPlaced {
    pub reservation_id: ReservationId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub reserved_at: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

/// イベント：予約が承認された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationApproved {
    pub reservation_id: ReservationId,
    pub loan_id: LoanId,
    pub approved_by: StaffId,
    pub approved_at: DateTime<Utc>,
}

/// イベント：罰金が発行された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineIssued {
    pub fine_id: FineId,
    pub loan_id: LoanId,
    pub member_id: MemberId,
    pub amount: Money,
    pub reason: String,
    pub issued_at: DateTime<Utc>,
}

/// イベント：罰金が支払われた
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePaid {
    pub fine_id: FineId,
    pub paid_at: DateTime<Utc>,
    pub recorded_by: StaffId,
}

/// イベント：レビューが投稿された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPosted {
    pub review_id: ReviewId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub rating: u8,
    pub reviewed_at: DateTime<Utc>,
}

/// イベント：レビューが削除された
///
/// 書籍の削除に伴う場合も含む。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRemoved {
    pub review_id: ReviewId,
    pub book_id: BookId,
    pub removed_at: DateTime<Utc>,
}

/// ドメインイベント統合型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    BookAdded(BookAdded),
    BookEdited(BookEdited),
    BookRemoved(BookRemoved),
    LoanOpened(LoanOpened),
    LoanReturned(LoanReturned),
    ReservationPlaced(ReservationPlaced),
    ReservationApproved(ReservationApproved),
    FineIssued(FineIssued),
    FinePaid(FinePaid),
    ReviewPosted(ReviewPosted),
    ReviewRemoved(ReviewRemoved),
}

impl DomainEvent {
    /// イベント種別名
    pub fn event_type(&self) -> &'static str {
        match self {
            DomainEvent::BookAdded(_) => "BookAdded",
            DomainEvent::BookEdited(_) => "BookEdited",
            DomainEvent::BookRemoved(_) => "BookRemoved",
            DomainEvent::LoanOpened(_) => "LoanOpened",
            DomainEvent::LoanReturned(_) => "LoanReturned",
            DomainEvent::ReservationPlaced(_) => "ReservationPlaced",
            DomainEvent::ReservationApproved(_) => "ReservationApproved",
            DomainEvent::FineIssued(_) => "FineIssued",
            DomainEvent::FinePaid(_) => "FinePaid",
            DomainEvent::ReviewPosted(_) => "ReviewPosted",
            DomainEvent::ReviewRemoved(_) => "ReviewRemoved",
        }
    }
}

use serde::{Deserialize, Serialize};

use super::{BookDetails, BookId, FineId, LoanId, MemberId, Money, ReservationId, ReviewId};

// 判定時刻はコマンドに含めない。サービスが時計ポートから取得する。

/// コマンド：書籍を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBook {
    pub details: BookDetails,
}

/// コマンド：書籍情報を編集する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBook {
    pub book_id: BookId,
    pub details: BookDetails,
}

/// コマンド：書籍を削除する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBook {
    pub book_id: BookId,
}

/// コマンド：司書が直接貸し出す
///
/// `loan_days`が`None`の場合は設定の貸出期間を使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLoan {
    pub book_id: BookId,
    pub borrower_id: MemberId,
    pub loan_days: Option<u32>,
}

/// コマンド：返却を記録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
}

/// コマンド：書籍を予約する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveBook {
    pub book_id: BookId,
}

/// コマンド：予約を承認する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveReservation {
    pub reservation_id: ReservationId,
}

/// コマンド：貸出に対して罰金を発行する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFine {
    pub loan_id: LoanId,
    pub amount: Money,
    pub reason: String,
}

/// コマンド：罰金の支払いを記録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayFine {
    pub fine_id: FineId,
}

/// コマンド：書籍にレビューを投稿する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostReview {
    pub book_id: BookId,
    pub rating: u8,
    pub comment: Option<String>,
}

/// コマンド：自分のレビューを削除する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteReview {
    pub review_id: ReviewId,
}

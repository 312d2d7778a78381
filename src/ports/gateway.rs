use crate::domain::{
    Book, BookId, ChangeSet, Credential, Fine, FineId, Loan, LoanId, MemberId, Reservation,
    ReservationId, Review, ReviewId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GatewayError>;

/// リモートゲートウェイの失敗
///
/// 封筒（`GatewayEnvelope`）の失敗種別に、通信自体の失敗を加えたもの。
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Credential missing or rejected")]
    Unauthenticated,

    #[error("Request not permitted: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rejected as invalid: {0}")]
    Validation(String),

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("Transport failure")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl GatewayError {
    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::Transport(message.into().into())
    }
}

/// 貸出・予約一覧の絞り込み条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    Member(MemberId),
    Book(BookId),
}

/// 罰金一覧の絞り込み条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FineFilter {
    All,
    Member(MemberId),
    Loan(LoanId),
}

/// レビュー一覧の絞り込み条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFilter {
    All,
    Book(BookId),
    Member(MemberId),
}

/// リモートゲートウェイポート
///
/// 永続化と通信を抽象化する。コアは契約のみを定義し、保存形式は関知しない。
///
/// 書き込みは`commit`の1つだけ。変更セットの前提条件（バージョン）が
/// すべて一致した場合に限り、書き込みをまとめて適用する。
#[async_trait]
pub trait LibraryGateway: Send + Sync {
    async fn list_books(&self) -> Result<Vec<Book>>;

    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>>;

    async fn list_loans(&self, filter: RecordFilter) -> Result<Vec<Loan>>;

    async fn get_loan(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    async fn list_reservations(&self, filter: RecordFilter) -> Result<Vec<Reservation>>;

    async fn get_reservation(&self, reservation_id: ReservationId)
    -> Result<Option<Reservation>>;

    async fn list_fines(&self, filter: FineFilter) -> Result<Vec<Fine>>;

    async fn get_fine(&self, fine_id: FineId) -> Result<Option<Fine>>;

    /// レビュー一覧（新しい順）
    async fn list_reviews(&self, filter: ReviewFilter) -> Result<Vec<Review>>;

    async fn get_review(&self, review_id: ReviewId) -> Result<Option<Review>>;

    /// 変更セットを原子的に適用する
    ///
    /// - 資格情報が無効 → Unauthenticated
    /// - 資格情報のロールが`changes.action`を実行できない → Forbidden
    /// - 前提条件のバージョン不一致、または対象が存在しない → Conflict
    /// - 失敗時は何も適用しない
    async fn commit(&self, credential: &Credential, changes: ChangeSet) -> Result<()>;
}

/// 失敗の種別（リモート応答の分類）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Authentication,
    Authorization,
    Validation,
    Conflict,
    NotFound,
}

/// リモート応答の統一形式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub failure: Option<FailureKind>,
}

impl<T> GatewayEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            failure: Some(kind),
        }
    }

    /// 応答を結果に変換する
    ///
    /// 成功なのにデータが無い応答、種別の無い失敗応答は通信の失敗として扱う。
    pub fn into_result(self) -> Result<T> {
        let message = self.message.unwrap_or_default();
        if self.success {
            return self
                .data
                .ok_or_else(|| GatewayError::transport("success envelope without data"));
        }

        match self.failure {
            Some(FailureKind::Authentication) => Err(GatewayError::Unauthenticated),
            Some(FailureKind::Authorization) => Err(GatewayError::Forbidden(message)),
            Some(FailureKind::Validation) => Err(GatewayError::Validation(message)),
            Some(FailureKind::Conflict) => Err(GatewayError::Conflict(message)),
            Some(FailureKind::NotFound) => Err(GatewayError::NotFound(message)),
            None => Err(GatewayError::transport(if message.is_empty() {
                "failure envelope without kind".to_string()
            } else {
                message
            })),
        }
    }
}

impl<T> From<&GatewayError> for GatewayEnvelope<T> {
    fn from(err: &GatewayError) -> Self {
        let kind = match err {
            GatewayError::Unauthenticated => FailureKind::Authentication,
            GatewayError::Forbidden(_) => FailureKind::Authorization,
            GatewayError::Validation(_) => FailureKind::Validation,
            GatewayError::Conflict(_) => FailureKind::Conflict,
            GatewayError::NotFound(_) => FailureKind::NotFound,
            GatewayError::Transport(_) => {
                return Self {
                    success: false,
                    data: None,
                    message: Some(err.to_string()),
                    failure: None,
                };
            }
        };
        Self::failed(kind, err.to_string())
    }
}

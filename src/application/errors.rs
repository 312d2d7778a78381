use crate::domain::{
    ApproveReservationError, BookValidationError, CreateLoanError, DeleteBookError, EditBookError,
    IssueFineError, PayFineError, PeriodError, PostReviewError, RegistrationError,
    RemoveReviewError, ReserveBookError, ReturnLoanError,
};
use crate::ports::GatewayError;
use thiserror::Error;

/// アプリケーション層のエラー
///
/// 呼び出し側に返す分類はこの7種類のみ。種類ごとにメッセージが異なる。
#[derive(Debug, Error)]
pub enum LibraryError {
    /// ログインしていない
    #[error("Authentication required")]
    Unauthenticated,

    /// ロールに許可されていない操作
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 対象が存在しない
    #[error("Not found: {0}")]
    NotFound(String),

    /// 現在の状態では許されない遷移（承認済みの再承認、返却済みの再返却など）
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// 貸出可能数の不足、または同時更新との競合
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 入力値の検証エラー
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 通信の失敗（そのまま伝える）
    #[error("Gateway failure")]
    Gateway(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LibraryError>;

impl From<GatewayError> for LibraryError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unauthenticated => LibraryError::Unauthenticated,
            GatewayError::Forbidden(msg) => LibraryError::Forbidden(msg),
            GatewayError::NotFound(msg) => LibraryError::NotFound(msg),
            GatewayError::Validation(msg) => LibraryError::Validation(msg),
            GatewayError::Conflict(msg) => LibraryError::Conflict(msg),
            GatewayError::Transport(source) => LibraryError::Gateway(source),
        }
    }
}

fn period_message(what: &str, err: PeriodError) -> String {
    match err {
        PeriodError::Zero => format!("{} must be at least one day", what),
        PeriodError::TooLong { days, max } => {
            format!("{} of {} days exceeds the maximum of {}", what, days, max)
        }
        PeriodError::OutOfRange => format!("{} ends outside the representable range", what),
    }
}

impl From<BookValidationError> for LibraryError {
    fn from(err: BookValidationError) -> Self {
        let msg = match err {
            BookValidationError::EmptyTitle => "title must not be blank".to_string(),
            BookValidationError::EmptyAuthor => "author must not be blank".to_string(),
            BookValidationError::EmptyGenre => "genre must not be blank".to_string(),
            BookValidationError::YearOutOfRange(year) => {
                format!("year {} is outside 1000..=2100", year)
            }
            BookValidationError::NoCopies => "total copies must be at least 1".to_string(),
        };
        LibraryError::Validation(msg)
    }
}

impl From<EditBookError> for LibraryError {
    fn from(err: EditBookError) -> Self {
        match err {
            EditBookError::Invalid(e) => e.into(),
            EditBookError::CopiesInUse { in_use, requested } => LibraryError::Conflict(format!(
                "{} copies are in use, cannot reduce total to {}",
                in_use, requested
            )),
        }
    }
}

impl From<DeleteBookError> for LibraryError {
    fn from(err: DeleteBookError) -> Self {
        match err {
            DeleteBookError::HasOpenLoans => {
                LibraryError::Conflict("book has loans that are not returned".to_string())
            }
            DeleteBookError::HasPendingReservations => {
                LibraryError::Conflict("book has pending reservations".to_string())
            }
        }
    }
}

impl From<CreateLoanError> for LibraryError {
    fn from(err: CreateLoanError) -> Self {
        match err {
            CreateLoanError::NoCopyAvailable => {
                LibraryError::Conflict("no copy available".to_string())
            }
            CreateLoanError::InvalidLoanPeriod(e) => {
                LibraryError::Validation(period_message("loan period", e))
            }
        }
    }
}

impl From<ReturnLoanError> for LibraryError {
    fn from(err: ReturnLoanError) -> Self {
        match err {
            ReturnLoanError::AlreadyReturned => {
                LibraryError::InvalidTransition("loan is already returned".to_string())
            }
            ReturnLoanError::ReturnedBeforeLoan => {
                LibraryError::Validation("return date precedes loan date".to_string())
            }
            ReturnLoanError::BookMismatch => {
                LibraryError::Conflict("loan does not belong to the book read".to_string())
            }
        }
    }
}

impl From<ReserveBookError> for LibraryError {
    fn from(err: ReserveBookError) -> Self {
        match err {
            ReserveBookError::NoCopyAvailable => {
                LibraryError::Conflict("no copy available".to_string())
            }
            ReserveBookError::AlreadyReserved => LibraryError::Validation(
                "member already has a pending reservation for this book".to_string(),
            ),
            ReserveBookError::InvalidHoldPeriod(e) => {
                LibraryError::Validation(period_message("hold period", e))
            }
        }
    }
}

impl From<ApproveReservationError> for LibraryError {
    fn from(err: ApproveReservationError) -> Self {
        match err {
            ApproveReservationError::AlreadyApproved => {
                LibraryError::InvalidTransition("reservation is already approved".to_string())
            }
            ApproveReservationError::Expired => {
                LibraryError::InvalidTransition("reservation has expired".to_string())
            }
            ApproveReservationError::NoCopyAvailable => {
                LibraryError::Conflict("no copy available".to_string())
            }
            ApproveReservationError::BookMismatch => {
                LibraryError::Conflict("reservation does not belong to the book read".to_string())
            }
            ApproveReservationError::BeforeReservation => {
                LibraryError::Validation("approval time precedes reservation date".to_string())
            }
            ApproveReservationError::InvalidLoanPeriod(e) => {
                LibraryError::Validation(period_message("loan period", e))
            }
        }
    }
}

impl From<IssueFineError> for LibraryError {
    fn from(err: IssueFineError) -> Self {
        match err {
            IssueFineError::ZeroAmount => {
                LibraryError::Validation("fine amount must be greater than zero".to_string())
            }
            IssueFineError::EmptyReason => {
                LibraryError::Validation("fine reason must not be blank".to_string())
            }
            IssueFineError::BeforeLoan => {
                LibraryError::Validation("fine date precedes loan date".to_string())
            }
        }
    }
}

impl From<PayFineError> for LibraryError {
    fn from(err: PayFineError) -> Self {
        match err {
            PayFineError::AlreadyPaid => {
                LibraryError::InvalidTransition("fine is already paid".to_string())
            }
            PayFineError::PaidBeforeIssued => {
                LibraryError::Validation("payment date precedes issue date".to_string())
            }
        }
    }
}

impl From<PostReviewError> for LibraryError {
    fn from(err: PostReviewError) -> Self {
        match err {
            PostReviewError::RatingOutOfRange(rating) => {
                LibraryError::Validation(format!("rating {} is outside 1..=5", rating))
            }
            PostReviewError::AlreadyReviewed => {
                LibraryError::Validation("member has already reviewed this book".to_string())
            }
        }
    }
}

impl From<RemoveReviewError> for LibraryError {
    fn from(err: RemoveReviewError) -> Self {
        match err {
            RemoveReviewError::NotAuthor => {
                LibraryError::Forbidden("only the author may delete a review".to_string())
            }
        }
    }
}

impl From<RegistrationError> for LibraryError {
    fn from(err: RegistrationError) -> Self {
        let msg = match err {
            RegistrationError::MissingField => "all fields are required".to_string(),
            RegistrationError::InvalidEmail => "email address is invalid".to_string(),
            RegistrationError::PasswordMismatch => "passwords do not match".to_string(),
            RegistrationError::PasswordTooShort { min_length } => {
                format!("password must be at least {} characters", min_length)
            }
        };
        LibraryError::Validation(msg)
    }
}

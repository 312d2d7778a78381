/// 期間（日数）のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    /// 0日
    Zero,
    /// 上限を超える
    TooLong { days: u32, max: u32 },
    /// 期限が表現できる日時の範囲を超える
    OutOfRange,
}

/// 書籍情報の検証エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// タイトルが空
    EmptyTitle,
    /// 著者が空
    EmptyAuthor,
    /// ジャンルが空
    EmptyGenre,
    /// 出版年が範囲外（1000〜2100）
    YearOutOfRange(i32),
    /// 蔵書数が0
    NoCopies,
}

/// 書籍編集のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditBookError {
    Invalid(BookValidationError),
    /// 貸出中・取り置き中の冊数より少ない蔵書数にはできない
    CopiesInUse { in_use: u32, requested: u32 },
}

impl From<BookValidationError> for EditBookError {
    fn from(err: BookValidationError) -> Self {
        EditBookError::Invalid(err)
    }
}

/// 書籍削除のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteBookError {
    /// 返却されていない貸出がある
    HasOpenLoans,
    /// 期限内の未承認予約がある
    HasPendingReservations,
}

/// 直接貸出のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateLoanError {
    /// 貸出可能な冊がない
    NoCopyAvailable,
    /// 貸出日数が0、上限超過、または期限が範囲外
    InvalidLoanPeriod(PeriodError),
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnLoanError {
    /// 既に返却済み
    AlreadyReturned,
    /// 返却日時が貸出日時より前
    ReturnedBeforeLoan,
    /// 貸出の書籍と渡された書籍が一致しない
    BookMismatch,
}

/// 予約のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveBookError {
    /// 貸出可能な冊がない
    NoCopyAvailable,
    /// 同じ書籍に対する未承認の予約が既にある
    AlreadyReserved,
    /// 取り置き期間が不正
    InvalidHoldPeriod(PeriodError),
}

/// 予約承認のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproveReservationError {
    /// 既に承認済み
    AlreadyApproved,
    /// 有効期限切れ
    Expired,
    /// 承認直前の再確認で空きが無くなっていた
    NoCopyAvailable,
    /// 予約の書籍と渡された書籍が一致しない
    BookMismatch,
    /// 承認日時が予約日時より前
    BeforeReservation,
    /// 貸出期間が不正
    InvalidLoanPeriod(PeriodError),
}

/// 罰金発行のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueFineError {
    /// 金額が0
    ZeroAmount,
    /// 理由が空
    EmptyReason,
    /// 発行日時が貸出日時より前
    BeforeLoan,
}

/// 罰金支払いのエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayFineError {
    /// 既に支払い済み
    AlreadyPaid,
    /// 支払日時が発行日時より前
    PaidBeforeIssued,
}

/// レビュー投稿のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostReviewError {
    /// 評価が1〜5の範囲外
    RatingOutOfRange(u8),
    /// 同じ書籍を既にレビューしている
    AlreadyReviewed,
}

/// レビュー削除のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveReviewError {
    /// 自分のレビューではない
    NotAuthor,
}

/// 会員登録の検証エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// 未入力の項目がある
    MissingField,
    /// メールアドレスの形式が不正
    InvalidEmail,
    /// 確認用パスワードが一致しない
    PasswordMismatch,
    /// パスワードが短すぎる
    PasswordTooShort { min_length: usize },
}

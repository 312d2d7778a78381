use serde::{Deserialize, Serialize};

use super::Role;

/// 権限判定の対象となる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    ViewCatalog,
    AddBook,
    EditBook,
    DeleteBook,
    ReserveBook,
    ViewOwnLoans,
    ViewOwnReservations,
    ViewOwnFines,
    ViewAllLoans,
    ViewAllReservations,
    ViewAllFines,
    ReturnLoan,
    ApproveReservation,
    ManageMembers,
    CreateLoan,
    IssueFine,
    RecordFinePayment,
    WriteReview,
    ViewOwnReviews,
}

impl Action {
    pub const ALL: [Action; 19] = [
        Action::ViewCatalog,
        Action::AddBook,
        Action::EditBook,
        Action::DeleteBook,
        Action::ReserveBook,
        Action::ViewOwnLoans,
        Action::ViewOwnReservations,
        Action::ViewOwnFines,
        Action::ViewAllLoans,
        Action::ViewAllReservations,
        Action::ViewAllFines,
        Action::ReturnLoan,
        Action::ApproveReservation,
        Action::ManageMembers,
        Action::CreateLoan,
        Action::IssueFine,
        Action::RecordFinePayment,
        Action::WriteReview,
        Action::ViewOwnReviews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewCatalog => "view_catalog",
            Action::AddBook => "add_book",
            Action::EditBook => "edit_book",
            Action::DeleteBook => "delete_book",
            Action::ReserveBook => "reserve_book",
            Action::ViewOwnLoans => "view_own_loans",
            Action::ViewOwnReservations => "view_own_reservations",
            Action::ViewOwnFines => "view_own_fines",
            Action::ViewAllLoans => "view_all_loans",
            Action::ViewAllReservations => "view_all_reservations",
            Action::ViewAllFines => "view_all_fines",
            Action::ReturnLoan => "return_loan",
            Action::ApproveReservation => "approve_reservation",
            Action::ManageMembers => "manage_members",
            Action::CreateLoan => "create_loan",
            Action::IssueFine => "issue_fine",
            Action::RecordFinePayment => "record_fine_payment",
            Action::WriteReview => "write_review",
            Action::ViewOwnReviews => "view_own_reviews",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ロールが操作を実行できるか（純粋関数）
///
/// エンティティの状態には依存しない。会員と司書の操作集合は
/// 閲覧（ViewCatalog）以外で交わらない：司書は予約もレビューもせず、会員は承認しない。
pub fn can_perform(role: Role, action: Action) -> bool {
    match role {
        Role::Unauthenticated => matches!(action, Action::ViewCatalog),
        Role::Member => matches!(
            action,
            Action::ViewCatalog
                | Action::ReserveBook
                | Action::ViewOwnLoans
                | Action::ViewOwnReservations
                | Action::ViewOwnFines
                | Action::WriteReview
                | Action::ViewOwnReviews
        ),
        Role::Librarian => matches!(
            action,
            Action::ViewCatalog
                | Action::AddBook
                | Action::EditBook
                | Action::DeleteBook
                | Action::ViewAllLoans
                | Action::ViewAllReservations
                | Action::ViewAllFines
                | Action::ReturnLoan
                | Action::ApproveReservation
                | Action::ManageMembers
                | Action::CreateLoan
                | Action::IssueFine
                | Action::RecordFinePayment
        ),
    }
}

/// 一覧取得の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 自分の記録のみ
    Mine,
    /// 全員の記録
    All,
}

/// 一覧取得の対象となる記録の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Records {
    Loans,
    Reservations,
    Fines,
}

impl Scope {
    /// 範囲と記録の種類から必要な操作を決める
    pub fn required_action(self, records: Records) -> Action {
        match (self, records) {
            (Scope::Mine, Records::Loans) => Action::ViewOwnLoans,
            (Scope::Mine, Records::Reservations) => Action::ViewOwnReservations,
            (Scope::Mine, Records::Fines) => Action::ViewOwnFines,
            (Scope::All, Records::Loans) => Action::ViewAllLoans,
            (Scope::All, Records::Reservations) => Action::ViewAllReservations,
            (Scope::All, Records::Fines) => Action::ViewAllFines,
        }
    }
}

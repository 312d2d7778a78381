use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, LoanId, LoanOpened, LoanReturned, MemberId, PeriodError, ReservationId,
    ReturnLoanError, StaffId, Version, period_end,
};

/// 既定の貸出期間（日数）
pub const DEFAULT_LOAN_PERIOD_DAYS: u32 = 14;
/// 貸出期間の上限（日数）
pub const MAX_LOAN_PERIOD_DAYS: u32 = 365;

/// 貸出ステータス
///
/// 保存はしない。日時から毎回導出する（`Loan::status`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }

    /// 冊を占有しているか（ActiveまたはOverdue）
    pub fn is_open(&self) -> bool {
        !matches!(self, LoanStatus::Returned)
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// Loan集約 - 1冊の書籍の1回の貸出
///
/// 返却済みの貸出も履歴として残り、削除されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub borrower_id: MemberId,

    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub version: Version,

    // 監査情報
    pub created_by: StaffId,
}

impl Loan {
    /// 日時から導出したステータス
    ///
    /// - 返却日時あり → Returned
    /// - `now > due_date` → Overdue（同時刻は延滞ではない）
    /// - それ以外 → Active
    pub fn status(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.return_date.is_some() {
            LoanStatus::Returned
        } else if now > self.due_date {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }

    /// 返却されていないか
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// 指定時刻に返却した場合の延滞日数
    ///
    /// 1日未満の超過は1日に切り上げる。期限内なら0。
    pub fn days_late(&self, returned_at: DateTime<Utc>) -> u32 {
        if returned_at <= self.due_date {
            return 0;
        }
        let late = returned_at - self.due_date;
        let whole_days = late.num_days();
        let days = if late > Duration::days(whole_days) {
            whole_days.saturating_add(1)
        } else {
            whole_days
        };
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    /// 表示用に導出ステータスを付けたビュー
    pub fn view(&self, now: DateTime<Utc>) -> LoanView {
        LoanView {
            status: self.status(now),
            loan: self.clone(),
        }
    }
}

/// 導出ステータス付きの貸出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanView {
    #[serde(flatten)]
    pub loan: Loan,
    pub status: LoanStatus,
}

/// 純粋関数：貸出を開始する
///
/// ビジネスルール：
/// - 返却期限は貸出日時 + `loan_days`日（1〜`MAX_LOAN_PERIOD_DAYS`日）
/// - 状態はActive
///
/// 貸出可能数の確認は`lifecycle`側で行う。
/// 副作用なし。新しいLoanとイベントを返す。
pub fn open_loan(
    book_id: BookId,
    borrower_id: MemberId,
    loan_date: DateTime<Utc>,
    loan_days: u32,
    staff_id: StaffId,
    reservation_id: Option<ReservationId>,
) -> Result<(Loan, LoanOpened), PeriodError> {
    let loan_id = LoanId::new();
    let due_date = period_end(loan_date, loan_days, MAX_LOAN_PERIOD_DAYS)?;

    let loan = Loan {
        loan_id,
        book_id,
        borrower_id,
        loan_date,
        due_date,
        return_date: None,
        version: Version::initial(),
        created_by: staff_id,
    };

    let event = LoanOpened {
        loan_id,
        book_id,
        borrower_id,
        loan_date,
        due_date,
        opened_by: staff_id,
        reservation_id,
    };

    Ok((loan, event))
}

/// 純粋関数：返却を記録する
///
/// ビジネスルール：
/// - 返却済みの貸出は返却できない
/// - 延滞していても返却は受け付ける（罰金は`fine`側で算定）
///
/// 副作用なし。新しいLoanとイベントを返す。
pub fn return_loan(
    loan: &Loan,
    returned_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<(Loan, LoanReturned), ReturnLoanError> {
    if !loan.is_open() {
        return Err(ReturnLoanError::AlreadyReturned);
    }
    if returned_at < loan.loan_date {
        return Err(ReturnLoanError::ReturnedBeforeLoan);
    }

    let returned = Loan {
        return_date: Some(returned_at),
        version: loan.version.next(),
        ..loan.clone()
    };

    let event = LoanReturned {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        borrower_id: loan.borrower_id,
        returned_at,
        was_overdue: loan.status(returned_at) == LoanStatus::Overdue,
        received_by: staff_id,
    };

    Ok((returned, event))
}

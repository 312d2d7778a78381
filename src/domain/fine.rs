use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    FineId, FineIssued, FinePaid, FineRate, IssueFineError, Loan, LoanId, MemberId, Money,
    PayFineError, StaffId, Version,
};

/// Fine集約 - 貸出に紐づく罰金
///
/// 支払い済みになっても削除されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fine {
    pub fine_id: FineId,
    pub loan_id: LoanId,
    /// 「自分の罰金」の絞り込み用に貸出から写した会員ID
    pub member_id: MemberId,
    pub amount: Money,
    pub reason: String,
    pub issued_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub version: Version,
}

impl Fine {
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }
}

/// 純粋関数：延滞返却の罰金を算定する
///
/// ビジネスルール：
/// - 返却日時が返却期限を過ぎている場合のみ発生
/// - 金額 = 料率 × 延滞日数（端数切り上げ、最低1日）
///
/// 期限内の返却なら`None`。
pub fn assess_overdue_fine(
    loan: &Loan,
    returned_at: DateTime<Utc>,
    rate: FineRate,
) -> Option<(Fine, FineIssued)> {
    let days_late = loan.days_late(returned_at);
    if days_late == 0 {
        return None;
    }

    let reason = format!("Returned {} day(s) late", days_late);
    Some(new_fine(loan, rate.for_days(days_late), reason, returned_at))
}

/// 純粋関数：司書が罰金を発行する
///
/// ビジネスルール：
/// - 金額は0より大きい
/// - 理由は空白のみ不可
/// - 発行日時は貸出日時以降
pub fn issue_fine(
    loan: &Loan,
    amount: Money,
    reason: &str,
    issued_at: DateTime<Utc>,
) -> Result<(Fine, FineIssued), IssueFineError> {
    if amount.is_zero() {
        return Err(IssueFineError::ZeroAmount);
    }
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(IssueFineError::EmptyReason);
    }
    if issued_at < loan.loan_date {
        return Err(IssueFineError::BeforeLoan);
    }
    Ok(new_fine(loan, amount, reason.to_string(), issued_at))
}

fn new_fine(
    loan: &Loan,
    amount: Money,
    reason: String,
    issued_at: DateTime<Utc>,
) -> (Fine, FineIssued) {
    let fine = Fine {
        fine_id: FineId::new(),
        loan_id: loan.loan_id,
        member_id: loan.borrower_id,
        amount,
        reason,
        issued_at,
        paid_at: None,
        version: Version::initial(),
    };

    let event = FineIssued {
        fine_id: fine.fine_id,
        loan_id: fine.loan_id,
        member_id: fine.member_id,
        amount,
        reason: fine.reason.clone(),
        issued_at,
    };

    (fine, event)
}

/// 純粋関数：支払いを記録する
///
/// 支払い済みの罰金には記録できない。支払日時は発行日時以降。
pub fn record_payment(
    fine: &Fine,
    paid_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<(Fine, FinePaid), PayFineError> {
    if fine.is_paid() {
        return Err(PayFineError::AlreadyPaid);
    }
    if paid_at < fine.issued_at {
        return Err(PayFineError::PaidBeforeIssued);
    }

    let paid = Fine {
        paid_at: Some(paid_at),
        version: fine.version.next(),
        ..fine.clone()
    };

    let event = FinePaid {
        fine_id: fine.fine_id,
        paid_at,
        recorded_by: staff_id,
    };

    Ok((paid, event))
}

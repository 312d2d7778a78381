use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ApproveReservationError, BookId, LoanId, MemberId, PeriodError, ReservationApproved,
    ReservationId, ReservationPlaced, StaffId, Version, period_end,
};

/// 既定の取り置き期間（日数）
pub const DEFAULT_RESERVATION_HOLD_DAYS: u32 = 7;
/// 取り置き期間の上限（日数）
pub const MAX_RESERVATION_HOLD_DAYS: u32 = 90;

/// 予約ステータス
///
/// 保存はしない。承認フラグと日時から毎回導出する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// 承認待ち（1冊を仮押さえしている）
    Pending,
    /// 承認済み（終端、貸出が作成済み）
    Approved,
    /// 期限切れ（終端、仮押さえは解放済み）
    Expired,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Approved => "approved",
            ReservationStatus::Expired => "expired",
        }
    }
}

/// Reservation集約 - 会員による貸出の申し込み
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    pub reservation_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub approved: bool,
    pub version: Version,
}

impl Reservation {
    /// 導出ステータス
    ///
    /// - 承認済み → Approved
    /// - `now > expiry_date` → Expired（同時刻は期限内）
    /// - それ以外 → Pending
    pub fn status(&self, now: DateTime<Utc>) -> ReservationStatus {
        if self.approved {
            ReservationStatus::Approved
        } else if now > self.expiry_date {
            ReservationStatus::Expired
        } else {
            ReservationStatus::Pending
        }
    }

    /// 冊を仮押さえしているか
    pub fn holds_copy(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == ReservationStatus::Pending
    }

    pub fn view(&self, now: DateTime<Utc>) -> ReservationView {
        ReservationView {
            status: self.status(now),
            reservation: self.clone(),
        }
    }
}

/// 導出ステータス付きの予約
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationView {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub status: ReservationStatus,
}

/// 純粋関数：予約を作成する
///
/// 有効期限は予約日時 + `hold_days`日（1〜`MAX_RESERVATION_HOLD_DAYS`日）。
/// 副作用なし。新しいReservationとイベントを返す。
pub fn place_reservation(
    book_id: BookId,
    member_id: MemberId,
    reserved_at: DateTime<Utc>,
    hold_days: u32,
) -> Result<(Reservation, ReservationPlaced), PeriodError> {
    let reservation_id = ReservationId::new();
    let expiry_date = period_end(reserved_at, hold_days, MAX_RESERVATION_HOLD_DAYS)?;

    let reservation = Reservation {
        reservation_id,
        book_id,
        member_id,
        reservation_date: reserved_at,
        expiry_date,
        approved: false,
        version: Version::initial(),
    };

    let event = ReservationPlaced {
        reservation_id,
        book_id,
        member_id,
        reserved_at,
        expiry_date,
    };

    Ok((reservation, event))
}

/// 純粋関数：予約を承認済みにする
///
/// ビジネスルール：
/// - Pendingの予約のみ承認できる
/// - Approved → AlreadyApproved、Expired → Expired
/// - 予約日時より前の時刻では承認できない
///
/// 空き冊の再確認と貸出の作成は`lifecycle::approve_reservation`が行う。
pub fn mark_approved(
    reservation: &Reservation,
    loan_id: LoanId,
    approved_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<(Reservation, ReservationApproved), ApproveReservationError> {
    match reservation.status(approved_at) {
        ReservationStatus::Approved => return Err(ApproveReservationError::AlreadyApproved),
        ReservationStatus::Expired => return Err(ApproveReservationError::Expired),
        ReservationStatus::Pending => {}
    }
    if approved_at < reservation.reservation_date {
        return Err(ApproveReservationError::BeforeReservation);
    }

    let approved = Reservation {
        approved: true,
        version: reservation.version.next(),
        ..reservation.clone()
    };

    let event = ReservationApproved {
        reservation_id: reservation.reservation_id,
        loan_id,
        approved_by: staff_id,
        approved_at,
    };

    Ok((approved, event))
}

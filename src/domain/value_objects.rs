use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PeriodError;

/// 集約ID型を定義するマクロ
///
/// どのIDも内部はUUID v4。他の集約へはIDでのみ参照する。
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn value(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// 書籍ID - カタログの集約ID
    BookId
);
entity_id!(
    /// 貸出ID
    LoanId
);
entity_id!(
    /// 予約ID
    ReservationId
);
entity_id!(
    /// 罰金ID
    FineId
);
entity_id!(
    /// レビューID
    ReviewId
);
entity_id!(
    /// 会員ID - 外部のセッション協力者が解決する
    MemberId
);
entity_id!(
    /// 司書ID - 外部のセッション協力者が解決する
    StaffId
);

/// 楽観的同時実行制御のためのバージョン
///
/// 新規作成時は1。状態を変える書き込みのたびに1つ進む。
/// ゲートウェイはコミット時に期待バージョンと一致するかを比較する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    pub fn initial() -> Self {
        Self(1)
    }

    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// 開始日時から`days`日後の期限を求める
///
/// ビジネスルール：
/// - 0日は不可
/// - `max_days`日を超える期間は不可
/// - 期限が表現できる日時の範囲を超える場合は不可（加算でパニックさせない）
pub fn period_end(
    start: DateTime<Utc>,
    days: u32,
    max_days: u32,
) -> Result<DateTime<Utc>, PeriodError> {
    if days == 0 {
        return Err(PeriodError::Zero);
    }
    if days > max_days {
        return Err(PeriodError::TooLong {
            days,
            max: max_days,
        });
    }
    Duration::try_days(i64::from(days))
        .and_then(|length| start.checked_add_signed(length))
        .ok_or(PeriodError::OutOfRange)
}

/// 金額（通貨の最小単位）
///
/// 通貨そのものは設定側の関心事であり、ここでは扱わない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_minor_units(value: u64) -> Self {
        Self(value)
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Money) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

/// 延滞罰金の料率エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FineRateError {
    /// 料率が0
    Zero,
}

impl std::fmt::Display for FineRateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FineRateError::Zero => write!(f, "fine rate must be greater than zero"),
        }
    }
}

/// 延滞1日あたりの罰金額
///
/// 不変条件：0より大きい。延滞返却は必ず正の罰金を生むため、
/// 0の料率は型で作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct FineRate(u64);

impl FineRate {
    /// # エラー
    /// `per_day`が0の場合は`FineRateError::Zero`を返す
    pub fn per_day(per_day: u64) -> Result<Self, FineRateError> {
        if per_day == 0 {
            return Err(FineRateError::Zero);
        }
        Ok(Self(per_day))
    }

    pub fn value(&self) -> Money {
        Money(self.0)
    }

    /// 延滞日数分の罰金額
    pub fn for_days(&self, days: u32) -> Money {
        Money(self.0.saturating_mul(u64::from(days)))
    }
}

impl TryFrom<u64> for FineRate {
    type Error = FineRateError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::per_day(value)
    }
}

impl From<FineRate> for u64 {
    fn from(rate: FineRate) -> Self {
        rate.0
    }
}

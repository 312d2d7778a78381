use chrono::{DateTime, Utc};

/// 時計ポート
///
/// 状態を変える判断はすべてこの時刻で行う。利用者が時刻を指定することはできない。
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

use crate::domain::{
    FineRate,
    loan::{DEFAULT_LOAN_PERIOD_DAYS, MAX_LOAN_PERIOD_DAYS},
    reservation::{DEFAULT_RESERVATION_HOLD_DAYS, MAX_RESERVATION_HOLD_DAYS},
};
use thiserror::Error;

pub const LOAN_PERIOD_DAYS_VAR: &str = "LIBRARY_LOAN_PERIOD_DAYS";
pub const RESERVATION_HOLD_DAYS_VAR: &str = "LIBRARY_RESERVATION_HOLD_DAYS";
pub const FINE_RATE_PER_DAY_VAR: &str = "LIBRARY_FINE_RATE_PER_DAY";
pub const MIN_PASSWORD_LENGTH_VAR: &str = "LIBRARY_MIN_PASSWORD_LENGTH";

/// 会員登録時のパスワード最小文字数（既定値）
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not a valid number: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{name} must be at most {max}")]
    OutOfRange { name: &'static str, max: u32 },
}

/// 貸出業務の設定値
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CirculationConfig {
    pub loan_period_days: u32,
    pub reservation_hold_days: u32,
    /// 延滞1日あたりの罰金（最小通貨単位）
    pub fine_rate: FineRate,
    pub min_password_length: usize,
}

impl CirculationConfig {
    /// 既定の期間で設定を作る。罰金の料率だけは既定値を持たない。
    pub fn with_fine_rate(fine_rate: FineRate) -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
            reservation_hold_days: DEFAULT_RESERVATION_HOLD_DAYS,
            fine_rate,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }

    /// 環境変数から読み込む
    ///
    /// `LIBRARY_FINE_RATE_PER_DAY`は必須。その他は未設定なら既定値。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rate = lookup(FINE_RATE_PER_DAY_VAR).ok_or(ConfigError::Missing(FINE_RATE_PER_DAY_VAR))?;
        let rate: u64 = parse(FINE_RATE_PER_DAY_VAR, &rate)?;
        let fine_rate =
            FineRate::per_day(rate).map_err(|_| ConfigError::Zero(FINE_RATE_PER_DAY_VAR))?;

        let loan_period_days = days_or(
            &lookup,
            LOAN_PERIOD_DAYS_VAR,
            DEFAULT_LOAN_PERIOD_DAYS,
            MAX_LOAN_PERIOD_DAYS,
        )?;
        let reservation_hold_days = days_or(
            &lookup,
            RESERVATION_HOLD_DAYS_VAR,
            DEFAULT_RESERVATION_HOLD_DAYS,
            MAX_RESERVATION_HOLD_DAYS,
        )?;
        let min_password_length = match lookup(MIN_PASSWORD_LENGTH_VAR) {
            Some(value) => parse(MIN_PASSWORD_LENGTH_VAR, &value)?,
            None => DEFAULT_MIN_PASSWORD_LENGTH,
        };

        Ok(Self {
            loan_period_days,
            reservation_hold_days,
            fine_rate,
            min_password_length,
        })
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

/// 日数の設定値。1〜`max`の範囲外はエラー
fn days_or<F>(lookup: &F, name: &'static str, default: u32, max: u32) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    match parse(name, &value)? {
        0 => Err(ConfigError::Zero(name)),
        days if days > max => Err(ConfigError::OutOfRange { name, max }),
        days => Ok(days),
    }
}

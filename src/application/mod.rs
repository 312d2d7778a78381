mod access;
pub mod catalog_service;
pub mod circulation_service;
mod errors;
pub mod fine_service;
pub mod member_service;
pub mod registration;
pub mod review_service;
pub mod statistics;

pub use errors::{LibraryError, Result};

use crate::config::CirculationConfig;
use crate::ports::{Clock, LibraryGateway, MemberDirectory, SessionContext};
use std::sync::Arc;

/// サービスの依存関係
///
/// 振る舞いは持たず、各サービス関数に引数として渡す。
/// 状態を変える判断の時刻は常に`clock`から取る。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub gateway: Arc<dyn LibraryGateway>,
    pub directory: Arc<dyn MemberDirectory>,
    pub session: Arc<dyn SessionContext>,
    pub clock: Arc<dyn Clock>,
    pub config: CirculationConfig,
}

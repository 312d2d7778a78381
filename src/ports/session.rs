use crate::domain::Actor;
use async_trait::async_trait;

/// セッションポート
///
/// 現在の利用者と資格情報を保持する。トークンの発行と寿命は外部が管理する。
#[async_trait]
pub trait SessionContext: Send + Sync {
    /// 現在の利用者（未ログインなら`Actor::Unauthenticated`）
    async fn current_actor(&self) -> Actor;

    /// 登録・ログインで得た操作主体をセッションに保持する
    async fn sign_in(&self, actor: Actor);
}

use crate::domain::{Account, AccountId, Credential, Enrollment, NewAccount, Registration};
use async_trait::async_trait;

use super::gateway::Result;

/// 利用者名簿ポート
///
/// アカウントの登録・作成・削除を外部に委ねる。資格情報の発行も外部が行う。
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// 全アカウント
    async fn list_accounts(&self) -> Result<Vec<Account>>;

    async fn get_account(&self, account_id: AccountId) -> Result<Option<Account>>;

    /// 検証済みの登録内容で会員アカウントを作り、資格情報を発行する
    ///
    /// メールアドレスが既に使われていれば Validation。
    async fn register(&self, registration: Registration) -> Result<Enrollment>;

    /// 司書がアカウントを作成する（ロールは`NewAccount::granted_role`）
    ///
    /// 資格情報のロールがアカウント管理を許されていなければ Forbidden。
    async fn create_account(&self, credential: &Credential, account: NewAccount)
    -> Result<Account>;

    /// 司書がアカウントを削除する。発行済みの資格情報も無効になる
    async fn delete_account(&self, credential: &Credential, account_id: AccountId) -> Result<()>;
}

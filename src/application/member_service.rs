use crate::domain::{Account, AccountId, Action, Actor, NewAccount, Role};

use super::access::authorize;
use super::{LibraryError, Result, ServiceDependencies};

/// 全アカウント一覧（司書のみ）
#[tracing::instrument(skip(deps))]
pub async fn list_accounts(deps: &ServiceDependencies) -> Result<Vec<Account>> {
    authorize(deps, Action::ManageMembers).await?;

    let accounts = deps.directory.list_accounts().await?;
    tracing::debug!(count = accounts.len(), "accounts listed");
    Ok(accounts)
}

/// 会員アカウントのみの一覧（司書のみ）
#[tracing::instrument(skip(deps))]
pub async fn list_members(deps: &ServiceDependencies) -> Result<Vec<Account>> {
    authorize(deps, Action::ManageMembers).await?;

    let mut accounts = deps.directory.list_accounts().await?;
    accounts.retain(|a| a.role() == Role::Member);
    Ok(accounts)
}

/// アカウントを作成する（司書のみ）
///
/// ロールは司書か会員。それ以外の指定は会員として作成する。
#[tracing::instrument(skip(deps, account), fields(email = %account.email))]
pub async fn create_account(deps: &ServiceDependencies, account: NewAccount) -> Result<Account> {
    let actor = authorize(deps, Action::ManageMembers).await?;
    account.validate(deps.config.min_password_length)?;

    let credential = actor.credential().ok_or(LibraryError::Unauthenticated)?;
    let created = deps.directory.create_account(credential, account).await?;

    tracing::info!(account = %created.account_id, "account created");
    Ok(created)
}

/// アカウントを削除する（司書のみ）
///
/// 自分自身のアカウントは削除できない（Validation）。
#[tracing::instrument(skip(deps))]
pub async fn delete_account(deps: &ServiceDependencies, account_id: AccountId) -> Result<()> {
    let actor = authorize(deps, Action::ManageMembers).await?;
    if own_account(&actor) == Some(account_id) {
        return Err(LibraryError::Validation(
            "cannot delete the signed-in account".to_string(),
        ));
    }

    let credential = actor.credential().ok_or(LibraryError::Unauthenticated)?;
    deps.directory.delete_account(credential, account_id).await?;

    tracing::info!(account = %account_id, "account deleted");
    Ok(())
}

fn own_account(actor: &Actor) -> Option<AccountId> {
    match actor {
        Actor::Unauthenticated => None,
        Actor::Member { member_id, .. } => Some(AccountId::Member(*member_id)),
        Actor::Librarian { staff_id, .. } => Some(AccountId::Librarian(*staff_id)),
    }
}

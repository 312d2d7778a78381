use crate::domain::{
    Action, Fine, Records, Scope,
    commands::{IssueFine, PayFine},
    lifecycle,
};
use crate::ports::FineFilter;

use super::access::{authorize, commit, member_id, staff_id};
use super::{LibraryError, Result, ServiceDependencies};

/// 罰金一覧を取得する
///
/// - `Scope::Mine` → 会員自身の罰金（ViewOwnFines）
/// - `Scope::All` → 全罰金（ViewAllFines、司書のみ）
#[tracing::instrument(skip(deps))]
pub async fn list_fines(deps: &ServiceDependencies, scope: Scope) -> Result<Vec<Fine>> {
    let actor = authorize(deps, scope.required_action(Records::Fines)).await?;
    let filter = match scope {
        Scope::Mine => FineFilter::Member(member_id(&actor)?),
        Scope::All => FineFilter::All,
    };

    let fines = deps.gateway.list_fines(filter).await?;
    tracing::debug!(count = fines.len(), "fines listed");
    Ok(fines)
}

/// 罰金の支払いを記録する（司書のみ）
///
/// 支払い済みの罰金に再度記録するとInvalidTransition。
#[tracing::instrument(skip(deps))]
pub async fn pay_fine(deps: &ServiceDependencies, cmd: PayFine) -> Result<Fine> {
    let actor = authorize(deps, Action::RecordFinePayment).await?;
    let staff_id = staff_id(&actor)?;

    let fine = deps
        .gateway
        .get_fine(cmd.fine_id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("fine {}", cmd.fine_id)))?;

    let transition = lifecycle::pay_fine(&fine, deps.clock.now(), staff_id)?;
    commit(deps, &actor, transition.changes).await?;

    Ok(transition.outcome)
}

/// 貸出に対して罰金を発行する（司書のみ）
///
/// ビジネスルール：
/// - 金額は0より大きい
/// - 理由は空白のみ不可
/// - 発行時刻は貸出日時より後
#[tracing::instrument(skip(deps))]
pub async fn issue_fine(deps: &ServiceDependencies, cmd: IssueFine) -> Result<Fine> {
    let actor = authorize(deps, Action::IssueFine).await?;

    let loan = deps
        .gateway
        .get_loan(cmd.loan_id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("loan {}", cmd.loan_id)))?;

    let transition = lifecycle::issue_fine(&loan, cmd.amount, &cmd.reason, deps.clock.now())?;
    commit(deps, &actor, transition.changes).await?;

    Ok(transition.outcome)
}

use crate::domain::{
    AccountId, Action, Actor, LoanView, Records, ReservationView, ReturnOutcome, Scope,
    commands::{ApproveReservation, CreateLoan, ReserveBook, ReturnLoan},
    lifecycle,
};
use crate::ports::RecordFilter;

use super::access::{authorize, commit, load_snapshot, member_id, staff_id};
use super::{LibraryError, Result, ServiceDependencies};

/// 一覧の範囲から絞り込み条件を決める
fn record_filter(actor: &Actor, scope: Scope) -> Result<RecordFilter> {
    match scope {
        Scope::Mine => Ok(RecordFilter::Member(member_id(actor)?)),
        Scope::All => Ok(RecordFilter::All),
    }
}

/// 貸出一覧を取得する
///
/// - `Scope::Mine` → 会員自身の貸出（ViewOwnLoans）
/// - `Scope::All` → 全貸出（ViewAllLoans、司書のみ）
#[tracing::instrument(skip(deps))]
pub async fn list_loans(deps: &ServiceDependencies, scope: Scope) -> Result<Vec<LoanView>> {
    let actor = authorize(deps, scope.required_action(Records::Loans)).await?;
    let filter = record_filter(&actor, scope)?;

    let loans = deps.gateway.list_loans(filter).await?;
    tracing::debug!(count = loans.len(), "loans listed");

    let now = deps.clock.now();
    Ok(loans.iter().map(|loan| loan.view(now)).collect())
}

/// 司書が直接貸し出す
///
/// ビジネスルール：
/// - 借り手が登録済みの会員であること（NotFound）
/// - 判断時点で貸出可能な冊が1冊以上あること
/// - 貸出日数を指定しない場合は設定の貸出期間。上限を超える指定はValidation
#[tracing::instrument(skip(deps))]
pub async fn create_loan(deps: &ServiceDependencies, cmd: CreateLoan) -> Result<LoanView> {
    // 1. 権限確認
    let actor = authorize(deps, Action::CreateLoan).await?;
    let staff_id = staff_id(&actor)?;

    // 2. 借り手と最新のスナップショットを読み取る
    let borrower = AccountId::Member(cmd.borrower_id);
    let (account, snapshot) = futures::try_join!(
        async { deps.directory.get_account(borrower).await.map_err(LibraryError::from) },
        load_snapshot(deps.gateway.as_ref(), cmd.book_id),
    )?;
    if account.is_none() {
        return Err(LibraryError::NotFound(format!("member {}", cmd.borrower_id)));
    }

    // 3. 遷移を検証
    let now = deps.clock.now();
    let loan_days = cmd.loan_days.unwrap_or(deps.config.loan_period_days);
    let transition = lifecycle::create_loan(&snapshot, cmd.borrower_id, now, loan_days, staff_id)?;

    // 4. コミット
    commit(deps, &actor, transition.changes).await?;

    Ok(transition.outcome.view(now))
}

/// 返却を記録する（司書のみ）
///
/// ビジネスルール：
/// - 返却済みの貸出は返却できない（InvalidTransition）
/// - 返却期限を過ぎていれば罰金を1件、返却と同じコミットで発行する
#[tracing::instrument(skip(deps))]
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<ReturnOutcome> {
    // 1. 権限確認
    let actor = authorize(deps, Action::ReturnLoan).await?;
    let staff_id = staff_id(&actor)?;

    // 2. 貸出と書籍を読み取る
    let loan = deps
        .gateway
        .get_loan(cmd.loan_id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("loan {}", cmd.loan_id)))?;
    let book = deps
        .gateway
        .get_book(loan.book_id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("book {}", loan.book_id)))?;

    // 3. 遷移を検証（罰金の算定を含む）
    let transition = lifecycle::return_loan(
        &book,
        &loan,
        deps.clock.now(),
        deps.config.fine_rate,
        staff_id,
    )?;

    // 4. コミット
    commit(deps, &actor, transition.changes).await?;

    if let Some(fine) = &transition.outcome.fine {
        tracing::info!(
            fine_id = %fine.fine_id,
            amount = fine.amount.minor_units(),
            "overdue fine issued"
        );
    }
    Ok(transition.outcome)
}

/// 会員が書籍を予約する
///
/// ビジネスルール：
/// - 判断時点で貸出可能な冊が1冊以上あること（不足はConflict）
/// - 同じ書籍に自分の未承認予約が無いこと（Validation）
///
/// 同時に最後の1冊を予約した場合、ゲートウェイのバージョン確認で一方がConflictになる。
#[tracing::instrument(skip(deps))]
pub async fn reserve_book(deps: &ServiceDependencies, cmd: ReserveBook) -> Result<ReservationView> {
    // 1. 権限確認
    let actor = authorize(deps, Action::ReserveBook).await?;
    let member_id = member_id(&actor)?;

    // 2. 最新のスナップショットを読み取る
    let snapshot = load_snapshot(deps.gateway.as_ref(), cmd.book_id).await?;

    // 3. 遷移を検証
    let now = deps.clock.now();
    let transition = lifecycle::reserve_book(
        &snapshot,
        member_id,
        now,
        deps.config.reservation_hold_days,
    )?;

    // 4. コミット
    commit(deps, &actor, transition.changes).await?;

    Ok(transition.outcome.view(now))
}

/// 予約を承認し、貸出を作成する（司書のみ）
///
/// ビジネスルール：
/// - 承認済み・期限切れの予約は承認できない（InvalidTransition）
/// - コミット直前に空きを再確認する（不足はConflict）
///
/// 予約の承認と貸出の作成は1つのコミットで適用される。
#[tracing::instrument(skip(deps))]
pub async fn approve_reservation(
    deps: &ServiceDependencies,
    cmd: ApproveReservation,
) -> Result<LoanView> {
    // 1. 権限確認
    let actor = authorize(deps, Action::ApproveReservation).await?;
    let staff_id = staff_id(&actor)?;

    // 2. 予約と、その書籍のスナップショットを読み取る
    let reservation = deps
        .gateway
        .get_reservation(cmd.reservation_id)
        .await?
        .ok_or_else(|| {
            LibraryError::NotFound(format!("reservation {}", cmd.reservation_id))
        })?;
    let snapshot = load_snapshot(deps.gateway.as_ref(), reservation.book_id).await?;

    // スナップショット側の方が新しい
    let reservation_id = reservation.reservation_id;
    let reservation = snapshot
        .reservations
        .iter()
        .find(|r| r.reservation_id == reservation_id)
        .cloned()
        .unwrap_or(reservation);

    // 3. 遷移を検証
    let now = deps.clock.now();
    let transition = lifecycle::approve_reservation(
        &snapshot,
        &reservation,
        now,
        deps.config.loan_period_days,
        staff_id,
    )?;

    // 4. コミット
    commit(deps, &actor, transition.changes).await?;

    Ok(transition.outcome.view(now))
}

/// 予約一覧を取得する
///
/// - `Scope::Mine` → 会員自身の予約（ViewOwnReservations）
/// - `Scope::All` → 全予約（ViewAllReservations、司書のみ）
#[tracing::instrument(skip(deps))]
pub async fn list_reservations(
    deps: &ServiceDependencies,
    scope: Scope,
) -> Result<Vec<ReservationView>> {
    let actor = authorize(deps, scope.required_action(Records::Reservations)).await?;
    let filter = record_filter(&actor, scope)?;

    let reservations = deps.gateway.list_reservations(filter).await?;
    tracing::debug!(count = reservations.len(), "reservations listed");

    let now = deps.clock.now();
    Ok(reservations.iter().map(|r| r.view(now)).collect())
}

use crate::domain::{
    Action, BookId, BookSnapshot, CatalogEntry,
    commands::{AddBook, DeleteBook, EditBook},
    lifecycle,
};
use crate::ports::{RecordFilter, ReviewFilter};

use super::access::{authorize, commit, load_snapshot, staff_id};
use super::{LibraryError, Result, ServiceDependencies};

/// 蔵書一覧を取得する
///
/// 検索語はタイトル・著者・ジャンルに対して大文字小文字を区別せず照合する。
/// 貸出可能数は時計の現在時刻での貸出と予約から導出する。
#[tracing::instrument(skip(deps))]
pub async fn list_books(
    deps: &ServiceDependencies,
    search: Option<&str>,
) -> Result<Vec<CatalogEntry>> {
    authorize(deps, Action::ViewCatalog).await?;
    let now = deps.clock.now();

    let (books, loans, reservations) = futures::try_join!(
        deps.gateway.list_books(),
        deps.gateway.list_loans(RecordFilter::All),
        deps.gateway.list_reservations(RecordFilter::All),
    )?;

    let entries: Vec<CatalogEntry> = books
        .into_iter()
        .filter(|book| search.is_none_or(|term| book.matches_search(term)))
        .map(|book| {
            let availability = lifecycle::availability(&book, &loans, &reservations, None, now);
            CatalogEntry::new(book, availability)
        })
        .collect();

    tracing::debug!(count = entries.len(), "catalog listed");
    Ok(entries)
}

/// 書籍を1件取得する
#[tracing::instrument(skip(deps))]
pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<CatalogEntry> {
    authorize(deps, Action::ViewCatalog).await?;

    let snapshot = load_snapshot(deps.gateway.as_ref(), book_id).await?;
    Ok(snapshot.entry(deps.clock.now()))
}

/// 書籍を登録する（司書のみ）
#[tracing::instrument(skip(deps))]
pub async fn create_book(deps: &ServiceDependencies, cmd: AddBook) -> Result<CatalogEntry> {
    // 1. 権限確認
    let actor = authorize(deps, Action::AddBook).await?;
    let staff_id = staff_id(&actor)?;
    let now = deps.clock.now();

    // 2. ドメイン層の純粋関数で検証と作成
    let transition = lifecycle::add_book(cmd.details, now, staff_id)?;

    // 3. コミット
    commit(deps, &actor, transition.changes).await?;

    let snapshot = BookSnapshot {
        book: transition.outcome,
        loans: Vec::new(),
        reservations: Vec::new(),
    };
    Ok(snapshot.entry(now))
}

/// 書籍情報を編集する（司書のみ）
///
/// ビジネスルール：
/// - 入力値が妥当であること
/// - 蔵書数が貸出中・仮押さえ中の冊数を下回らないこと
#[tracing::instrument(skip(deps))]
pub async fn update_book(deps: &ServiceDependencies, cmd: EditBook) -> Result<CatalogEntry> {
    // 1. 権限確認
    let actor = authorize(deps, Action::EditBook).await?;
    let staff_id = staff_id(&actor)?;

    // 2. 最新のスナップショットを読み取る
    let mut snapshot = load_snapshot(deps.gateway.as_ref(), cmd.book_id).await?;
    let now = deps.clock.now();

    // 3. 遷移を検証
    let transition = lifecycle::edit_book(&snapshot, cmd.details, now, staff_id)?;

    // 4. コミット
    commit(deps, &actor, transition.changes).await?;

    snapshot.book = transition.outcome;
    Ok(snapshot.entry(now))
}

/// 書籍を削除する（司書のみ）
///
/// 返却されていない貸出、または期限内の未承認予約があればConflict。
/// 書籍のレビューも同じコミットで削除する。
#[tracing::instrument(skip(deps))]
pub async fn delete_book(deps: &ServiceDependencies, cmd: DeleteBook) -> Result<()> {
    let actor = authorize(deps, Action::DeleteBook).await?;
    let staff_id = staff_id(&actor)?;

    let (snapshot, reviews) = futures::try_join!(
        load_snapshot(deps.gateway.as_ref(), cmd.book_id),
        async {
            deps.gateway
                .list_reviews(ReviewFilter::Book(cmd.book_id))
                .await
                .map_err(LibraryError::from)
        },
    )?;
    let transition = lifecycle::delete_book(&snapshot, &reviews, deps.clock.now(), staff_id)?;

    commit(deps, &actor, transition.changes).await
}

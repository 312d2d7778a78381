use crate::domain::{
    Action, BookId, BookRating, Review,
    commands::{DeleteReview, PostReview},
    lifecycle, review,
};
use crate::ports::ReviewFilter;

use super::access::{authorize, commit, member_id};
use super::{LibraryError, Result, ServiceDependencies};

/// 書籍のレビュー一覧（新しい順、未ログインでも可）
#[tracing::instrument(skip(deps))]
pub async fn list_book_reviews(deps: &ServiceDependencies, book_id: BookId) -> Result<Vec<Review>> {
    authorize(deps, Action::ViewCatalog).await?;

    let reviews = deps.gateway.list_reviews(ReviewFilter::Book(book_id)).await?;
    tracing::debug!(count = reviews.len(), "reviews listed");
    Ok(reviews)
}

/// 書籍の平均評価（小数第1位）とレビュー数
#[tracing::instrument(skip(deps))]
pub async fn book_rating(deps: &ServiceDependencies, book_id: BookId) -> Result<BookRating> {
    authorize(deps, Action::ViewCatalog).await?;

    let reviews = deps.gateway.list_reviews(ReviewFilter::Book(book_id)).await?;
    Ok(review::rating_of(&reviews))
}

/// 会員自身のレビュー一覧
#[tracing::instrument(skip(deps))]
pub async fn list_my_reviews(deps: &ServiceDependencies) -> Result<Vec<Review>> {
    let actor = authorize(deps, Action::ViewOwnReviews).await?;
    let member_id = member_id(&actor)?;

    Ok(deps
        .gateway
        .list_reviews(ReviewFilter::Member(member_id))
        .await?)
}

/// 会員がレビューを投稿する
///
/// ビジネスルール：
/// - 書籍が存在すること（NotFound）
/// - 1人1冊につき1件（Validation）
/// - 評価は1〜5（Validation）
#[tracing::instrument(skip(deps))]
pub async fn post_review(deps: &ServiceDependencies, cmd: PostReview) -> Result<Review> {
    // 1. 権限確認
    let actor = authorize(deps, Action::WriteReview).await?;
    let member_id = member_id(&actor)?;

    // 2. 書籍と既存のレビューを読み取る
    let (book, reviews) = futures::try_join!(
        deps.gateway.get_book(cmd.book_id),
        deps.gateway.list_reviews(ReviewFilter::Book(cmd.book_id)),
    )?;
    let book = book.ok_or_else(|| LibraryError::NotFound(format!("book {}", cmd.book_id)))?;

    // 3. 遷移を検証
    let transition = lifecycle::post_review(
        &book,
        &reviews,
        member_id,
        cmd.rating,
        cmd.comment.as_deref(),
        deps.clock.now(),
    )?;

    // 4. コミット
    commit(deps, &actor, transition.changes).await?;

    Ok(transition.outcome)
}

/// 会員が自分のレビューを削除する
///
/// 他の会員のレビューはForbidden。
#[tracing::instrument(skip(deps))]
pub async fn delete_review(deps: &ServiceDependencies, cmd: DeleteReview) -> Result<()> {
    let actor = authorize(deps, Action::WriteReview).await?;
    let member_id = member_id(&actor)?;

    let review = deps
        .gateway
        .get_review(cmd.review_id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("review {}", cmd.review_id)))?;

    let transition = lifecycle::remove_review(&review, member_id, deps.clock.now())?;
    commit(deps, &actor, transition.changes).await
}

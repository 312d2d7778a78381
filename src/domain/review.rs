use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, MemberId, PostReviewError, ReviewId, ReviewPosted, Version};

/// 評価の下限
pub const MIN_RATING: u8 = 1;
/// 評価の上限
pub const MAX_RATING: u8 = 5;

/// Review集約 - 会員による書籍の評価
///
/// 1人の会員は1冊につき1件だけレビューできる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: ReviewId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    pub rating: u8,
    pub comment: Option<String>,
    pub review_date: DateTime<Utc>,
    pub version: Version,
}

/// 書籍の平均評価
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookRating {
    /// 小数第1位に丸めた平均。レビューが無ければ0.0
    pub average_rating: f64,
    pub review_count: usize,
}

/// レビューの一覧から平均評価を求める（純粋関数）
///
/// 他の書籍のレビューが混ざっていてはいけない。丸めは偶数丸め。
pub fn rating_of(reviews: &[Review]) -> BookRating {
    if reviews.is_empty() {
        return BookRating {
            average_rating: 0.0,
            review_count: 0,
        };
    }

    let total: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
    let average = f64::from(total) / reviews.len() as f64;

    BookRating {
        average_rating: (average * 10.0).round_ties_even() / 10.0,
        review_count: reviews.len(),
    }
}

/// 純粋関数：レビューを作成する
///
/// ビジネスルール：
/// - 評価は1〜5
/// - コメントは前後の空白を除く。空ならコメント無し
///
/// 重複レビューの確認は`lifecycle`側で行う。
pub fn post_review(
    book_id: BookId,
    member_id: MemberId,
    rating: u8,
    comment: Option<&str>,
    reviewed_at: DateTime<Utc>,
) -> Result<(Review, ReviewPosted), PostReviewError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(PostReviewError::RatingOutOfRange(rating));
    }
    let comment = comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let review = Review {
        review_id: ReviewId::new(),
        book_id,
        member_id,
        rating,
        comment,
        review_date: reviewed_at,
        version: Version::initial(),
    };

    let event = ReviewPosted {
        review_id: review.review_id,
        book_id,
        member_id,
        rating,
        reviewed_at,
    };

    Ok((review, event))
}

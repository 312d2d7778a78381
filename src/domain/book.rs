use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookAdded, BookEdited, BookId, BookValidationError, StaffId, Version};

/// 出版年の下限
pub const MIN_PUBLICATION_YEAR: i32 = 1000;
/// 出版年の上限
pub const MAX_PUBLICATION_YEAR: i32 = 2100;

/// 司書が入力する書籍情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub genre: String,
    pub total_copies: u32,
}

impl BookDetails {
    /// 書籍情報を検証する（純粋関数）
    ///
    /// ビジネスルール：
    /// - タイトル・著者・ジャンルは空白のみ不可
    /// - 出版年は1000〜2100
    /// - 蔵書数は1冊以上
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(BookValidationError::EmptyAuthor);
        }
        if self.genre.trim().is_empty() {
            return Err(BookValidationError::EmptyGenre);
        }
        if !(MIN_PUBLICATION_YEAR..=MAX_PUBLICATION_YEAR).contains(&self.year) {
            return Err(BookValidationError::YearOutOfRange(self.year));
        }
        if self.total_copies == 0 {
            return Err(BookValidationError::NoCopies);
        }
        Ok(())
    }

    fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre: self.genre.trim().to_string(),
            ..self
        }
    }
}

/// Book集約 - カタログの1タイトル
///
/// 貸出可能冊数は保存しない。貸出と予約から毎回導出する（`lifecycle::Availability`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    #[serde(flatten)]
    pub details: BookDetails,
    pub version: Version,

    // 監査情報
    pub created_by: StaffId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// 検索語がタイトル・著者・ジャンルのいずれかに含まれるか
    ///
    /// 大文字小文字は区別しない。空の検索語はすべてに一致する。
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.details.title, &self.details.author, &self.details.genre]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// 内容は変えずにバージョンだけ進めた書籍
    ///
    /// 貸出可能数に影響する遷移はすべて書籍のバージョンを進め、
    /// 同じ書籍に対する同時の遷移をゲートウェイで直列化する。
    pub fn bumped(&self) -> Self {
        Self {
            version: self.version.next(),
            ..self.clone()
        }
    }
}

/// 純粋関数：書籍を登録する
///
/// 副作用なし。新しいBookとイベントを返す。
pub fn add_book(
    details: BookDetails,
    added_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<(Book, BookAdded), BookValidationError> {
    details.validate()?;
    let details = details.trimmed();

    let book = Book {
        book_id: BookId::new(),
        details,
        version: Version::initial(),
        created_by: staff_id,
        created_at: added_at,
        updated_at: added_at,
    };

    let event = BookAdded {
        book_id: book.book_id,
        title: book.details.title.clone(),
        total_copies: book.details.total_copies,
        added_by: staff_id,
        added_at,
    };

    Ok((book, event))
}

/// 純粋関数：書籍情報を置き換える
///
/// 使用中冊数との整合性は`lifecycle::edit_book`が確認する。
pub fn edit_book(
    book: &Book,
    details: BookDetails,
    edited_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<(Book, BookEdited), BookValidationError> {
    details.validate()?;

    let edited = Book {
        details: details.trimmed(),
        version: book.version.next(),
        updated_at: edited_at,
        ..book.clone()
    };

    let event = BookEdited {
        book_id: book.book_id,
        total_copies: edited.details.total_copies,
        edited_by: staff_id,
        edited_at,
    };

    Ok((edited, event))
}

//! ライフサイクルエンジン
//!
//! 読み取ったばかりのスナップショットに対して遷移を検証し、新しい状態と
//! 副作用を1つの`ChangeSet`にまとめて返す純粋関数群。永続化は呼び出し側が
//! ゲートウェイの`commit`に一括で渡す。部分的な適用は起こらない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Action, ApproveReservationError, Book, BookDetails, BookId, BookRemoved, BookValidationError,
    ChangeSet, CreateLoanError, DeleteBookError, DomainEvent, EditBookError, EntityRef, Fine,
    FineRate, IssueFineError, Loan, MemberId, Money, PayFineError, PostReviewError, RemoveReviewError,
    Reservation, ReservationId, ReserveBookError, ReturnLoanError, Review, ReviewId, ReviewRemoved,
    StaffId, Write, book, fine, loan, reservation, review,
};

/// 書籍の貸出可能数（導出値）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub total_copies: u32,
    /// ActiveまたはOverdueの貸出数
    pub on_loan: u32,
    /// 期限内の未承認予約による仮押さえ数
    pub held: u32,
}

impl Availability {
    pub fn in_use(&self) -> u32 {
        self.on_loan.saturating_add(self.held)
    }

    pub fn available_copies(&self) -> u32 {
        self.total_copies.saturating_sub(self.in_use())
    }

    pub fn is_available(&self) -> bool {
        self.available_copies() > 0
    }
}

/// 貸出・予約の一覧から書籍の貸出可能数を導出する（純粋関数）
///
/// 他の書籍の記録が混ざっていてもよい。`exclude`で指定した予約の仮押さえは数えない。
pub fn availability(
    book: &Book,
    loans: &[Loan],
    reservations: &[Reservation],
    exclude: Option<ReservationId>,
    now: DateTime<Utc>,
) -> Availability {
    let on_loan = loans
        .iter()
        .filter(|l| l.book_id == book.book_id && l.is_open())
        .count();
    let held = reservations
        .iter()
        .filter(|r| r.book_id == book.book_id && r.holds_copy(now))
        .filter(|r| Some(r.reservation_id) != exclude)
        .count();

    Availability {
        total_copies: book.details.total_copies,
        on_loan: u32::try_from(on_loan).unwrap_or(u32::MAX),
        held: u32::try_from(held).unwrap_or(u32::MAX),
    }
}

/// 貸出可能数付きのカタログ項目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub book: Book,
    pub available_copies: u32,
    pub available: bool,
}

impl CatalogEntry {
    pub fn new(book: Book, availability: Availability) -> Self {
        Self {
            available_copies: availability.available_copies(),
            available: availability.is_available(),
            book,
        }
    }
}

/// 判断の直前に読み取った書籍とその貸出・予約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSnapshot {
    pub book: Book,
    pub loans: Vec<Loan>,
    pub reservations: Vec<Reservation>,
}

impl BookSnapshot {
    pub fn availability(&self, now: DateTime<Utc>) -> Availability {
        availability(&self.book, &self.loans, &self.reservations, None, now)
    }

    pub fn entry(&self, now: DateTime<Utc>) -> CatalogEntry {
        CatalogEntry::new(self.book.clone(), self.availability(now))
    }
}

/// 遷移の結果と、それを永続化するための変更セット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<T> {
    pub outcome: T,
    pub changes: ChangeSet,
}

/// 返却の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnOutcome {
    pub loan: Loan,
    pub fine: Option<Fine>,
}

/// 書籍を登録する
pub fn add_book(
    details: BookDetails,
    added_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<Transition<Book>, BookValidationError> {
    let (book, event) = book::add_book(details, added_at, staff_id)?;

    let changes = ChangeSet::new(Action::AddBook)
        .write(Write::PutBook(book.clone()))
        .event(DomainEvent::BookAdded(event));

    Ok(Transition {
        outcome: book,
        changes,
    })
}

/// 書籍情報を編集する
///
/// 蔵書数は使用中の冊数（貸出中 + 仮押さえ）を下回れない。
pub fn edit_book(
    snapshot: &BookSnapshot,
    details: BookDetails,
    edited_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<Transition<Book>, EditBookError> {
    let in_use = snapshot.availability(edited_at).in_use();
    if details.total_copies < in_use {
        return Err(EditBookError::CopiesInUse {
            in_use,
            requested: details.total_copies,
        });
    }

    let current = &snapshot.book;
    let (edited, event) = book::edit_book(current, details, edited_at, staff_id)?;

    let changes = ChangeSet::new(Action::EditBook)
        .expect(EntityRef::Book(current.book_id), current.version)
        .write(Write::PutBook(edited.clone()))
        .event(DomainEvent::BookEdited(event));

    Ok(Transition {
        outcome: edited,
        changes,
    })
}

/// 書籍を削除する
///
/// 返却されていない貸出、または期限内の未承認予約があれば拒否する。
/// 書籍のレビューは同じ変更セットで削除される。
pub fn delete_book(
    snapshot: &BookSnapshot,
    reviews: &[Review],
    removed_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<Transition<BookId>, DeleteBookError> {
    let availability = snapshot.availability(removed_at);
    if availability.on_loan > 0 {
        return Err(DeleteBookError::HasOpenLoans);
    }
    if availability.held > 0 {
        return Err(DeleteBookError::HasPendingReservations);
    }

    let book = &snapshot.book;
    let mut changes = ChangeSet::new(Action::DeleteBook)
        .expect(EntityRef::Book(book.book_id), book.version)
        .write(Write::RemoveBook(book.book_id))
        .event(DomainEvent::BookRemoved(BookRemoved {
            book_id: book.book_id,
            removed_by: staff_id,
            removed_at,
        }));
    for review in reviews.iter().filter(|r| r.book_id == book.book_id) {
        changes = changes
            .write(Write::RemoveReview(review.review_id))
            .event(DomainEvent::ReviewRemoved(ReviewRemoved {
                review_id: review.review_id,
                book_id: book.book_id,
                removed_at,
            }));
    }

    Ok(Transition {
        outcome: book.book_id,
        changes,
    })
}

/// 司書が直接貸し出す
///
/// 貸出日数は1〜`loan::MAX_LOAN_PERIOD_DAYS`。
pub fn create_loan(
    snapshot: &BookSnapshot,
    borrower_id: MemberId,
    loaned_at: DateTime<Utc>,
    loan_days: u32,
    staff_id: StaffId,
) -> Result<Transition<Loan>, CreateLoanError> {
    let book = &snapshot.book;
    let (loan, event) = loan::open_loan(
        book.book_id,
        borrower_id,
        loaned_at,
        loan_days,
        staff_id,
        None,
    )
    .map_err(CreateLoanError::InvalidLoanPeriod)?;

    if !snapshot.availability(loaned_at).is_available() {
        return Err(CreateLoanError::NoCopyAvailable);
    }

    let changes = ChangeSet::new(Action::CreateLoan)
        .expect(EntityRef::Book(book.book_id), book.version)
        .write(Write::PutBook(book.bumped()))
        .write(Write::PutLoan(loan.clone()))
        .event(DomainEvent::LoanOpened(event));

    Ok(Transition {
        outcome: loan,
        changes,
    })
}

/// 返却を記録する
///
/// 返却期限を過ぎていれば、同じ変更セットで罰金を1件発行する。
pub fn return_loan(
    book: &Book,
    loan: &Loan,
    returned_at: DateTime<Utc>,
    rate: FineRate,
    staff_id: StaffId,
) -> Result<Transition<ReturnOutcome>, ReturnLoanError> {
    if loan.book_id != book.book_id {
        return Err(ReturnLoanError::BookMismatch);
    }

    let (returned, event) = loan::return_loan(loan, returned_at, staff_id)?;
    let assessed = fine::assess_overdue_fine(loan, returned_at, rate);

    let mut changes = ChangeSet::new(Action::ReturnLoan)
        .expect(EntityRef::Book(book.book_id), book.version)
        .expect(EntityRef::Loan(loan.loan_id), loan.version)
        .write(Write::PutBook(book.bumped()))
        .write(Write::PutLoan(returned.clone()))
        .event(DomainEvent::LoanReturned(event));

    let fine = match assessed {
        Some((fine, fine_event)) => {
            changes = changes
                .write(Write::PutFine(fine.clone()))
                .event(DomainEvent::FineIssued(fine_event));
            Some(fine)
        }
        None => None,
    };

    Ok(Transition {
        outcome: ReturnOutcome {
            loan: returned,
            fine,
        },
        changes,
    })
}

/// 会員が書籍を予約する
///
/// ビジネスルール：
/// - 判断時点で貸出可能な冊が1冊以上あること
/// - 同じ書籍に対する自分の未承認予約（期限内）が無いこと
///
/// 予約は承認か期限切れまで1冊を仮押さえする。
pub fn reserve_book(
    snapshot: &BookSnapshot,
    member_id: MemberId,
    reserved_at: DateTime<Utc>,
    hold_days: u32,
) -> Result<Transition<Reservation>, ReserveBookError> {
    let already_reserved = snapshot
        .reservations
        .iter()
        .any(|r| r.member_id == member_id && r.holds_copy(reserved_at));
    if already_reserved {
        return Err(ReserveBookError::AlreadyReserved);
    }
    if !snapshot.availability(reserved_at).is_available() {
        return Err(ReserveBookError::NoCopyAvailable);
    }

    let book = &snapshot.book;
    let (reservation, event) =
        reservation::place_reservation(book.book_id, member_id, reserved_at, hold_days)
            .map_err(ReserveBookError::InvalidHoldPeriod)?;

    let changes = ChangeSet::new(Action::ReserveBook)
        .expect(EntityRef::Book(book.book_id), book.version)
        .write(Write::PutBook(book.bumped()))
        .write(Write::PutReservation(reservation.clone()))
        .event(DomainEvent::ReservationPlaced(event));

    Ok(Transition {
        outcome: reservation,
        changes,
    })
}

/// 予約を承認し、貸出を作成する
///
/// ビジネスルール：
/// - Pendingの予約のみ（Approved/Expiredは不正な遷移）
/// - 承認直前に空きを再確認する。この予約自身の仮押さえは貸出に振り替わる冊として扱い、
///   貸出中と他の仮押さえで全冊が埋まっている場合のみ`NoCopyAvailable`
///
/// 予約の承認・貸出の作成・書籍のバージョン更新は1つの変更セットになる。
pub fn approve_reservation(
    snapshot: &BookSnapshot,
    pending: &Reservation,
    approved_at: DateTime<Utc>,
    loan_days: u32,
    staff_id: StaffId,
) -> Result<Transition<Loan>, ApproveReservationError> {
    let book = &snapshot.book;
    if pending.book_id != book.book_id {
        return Err(ApproveReservationError::BookMismatch);
    }

    let (loan, loan_event) = loan::open_loan(
        book.book_id,
        pending.member_id,
        approved_at,
        loan_days,
        staff_id,
        Some(pending.reservation_id),
    )
    .map_err(ApproveReservationError::InvalidLoanPeriod)?;
    let (approved, approved_event) =
        reservation::mark_approved(pending, loan.loan_id, approved_at, staff_id)?;

    let others = availability(
        book,
        &snapshot.loans,
        &snapshot.reservations,
        Some(pending.reservation_id),
        approved_at,
    );
    if !others.is_available() {
        return Err(ApproveReservationError::NoCopyAvailable);
    }

    let changes = ChangeSet::new(Action::ApproveReservation)
        .expect(EntityRef::Book(book.book_id), book.version)
        .expect(
            EntityRef::Reservation(pending.reservation_id),
            pending.version,
        )
        .write(Write::PutBook(book.bumped()))
        .write(Write::PutReservation(approved))
        .write(Write::PutLoan(loan.clone()))
        .event(DomainEvent::ReservationApproved(approved_event))
        .event(DomainEvent::LoanOpened(loan_event));

    Ok(Transition {
        outcome: loan,
        changes,
    })
}

/// 司書が貸出に対して罰金を発行する
pub fn issue_fine(
    loan: &Loan,
    amount: Money,
    reason: &str,
    issued_at: DateTime<Utc>,
) -> Result<Transition<Fine>, IssueFineError> {
    let (fine, event) = fine::issue_fine(loan, amount, reason, issued_at)?;

    let changes = ChangeSet::new(Action::IssueFine)
        .expect(EntityRef::Loan(loan.loan_id), loan.version)
        .write(Write::PutFine(fine.clone()))
        .event(DomainEvent::FineIssued(event));

    Ok(Transition {
        outcome: fine,
        changes,
    })
}

/// 罰金の支払いを記録する
pub fn pay_fine(
    current: &Fine,
    paid_at: DateTime<Utc>,
    staff_id: StaffId,
) -> Result<Transition<Fine>, PayFineError> {
    let (paid, event) = fine::record_payment(current, paid_at, staff_id)?;

    let changes = ChangeSet::new(Action::RecordFinePayment)
        .expect(EntityRef::Fine(current.fine_id), current.version)
        .write(Write::PutFine(paid.clone()))
        .event(DomainEvent::FinePaid(event));

    Ok(Transition {
        outcome: paid,
        changes,
    })
}

/// 会員が書籍にレビューを投稿する
///
/// `reviews`には少なくともこの書籍の既存レビューが含まれていること。
/// 書籍のバージョンを進めるので、同時の削除や二重投稿はコミット時に衝突する。
pub fn post_review(
    book: &Book,
    reviews: &[Review],
    member_id: MemberId,
    rating: u8,
    comment: Option<&str>,
    reviewed_at: DateTime<Utc>,
) -> Result<Transition<Review>, PostReviewError> {
    let already_reviewed = reviews
        .iter()
        .any(|r| r.book_id == book.book_id && r.member_id == member_id);
    if already_reviewed {
        return Err(PostReviewError::AlreadyReviewed);
    }

    let (review, event) =
        review::post_review(book.book_id, member_id, rating, comment, reviewed_at)?;

    let changes = ChangeSet::new(Action::WriteReview)
        .expect(EntityRef::Book(book.book_id), book.version)
        .write(Write::PutBook(book.bumped()))
        .write(Write::PutReview(review.clone()))
        .event(DomainEvent::ReviewPosted(event));

    Ok(Transition {
        outcome: review,
        changes,
    })
}

/// 会員が自分のレビューを削除する
pub fn remove_review(
    review: &Review,
    member_id: MemberId,
    removed_at: DateTime<Utc>,
) -> Result<Transition<ReviewId>, RemoveReviewError> {
    if review.member_id != member_id {
        return Err(RemoveReviewError::NotAuthor);
    }

    let changes = ChangeSet::new(Action::WriteReview)
        .expect(EntityRef::Review(review.review_id), review.version)
        .write(Write::RemoveReview(review.review_id))
        .event(DomainEvent::ReviewRemoved(ReviewRemoved {
            review_id: review.review_id,
            book_id: review.book_id,
            removed_at,
        }));

    Ok(Transition {
        outcome: review.review_id,
        changes,
    })
}

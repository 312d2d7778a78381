use serde::{Deserialize, Serialize};

use super::{
    Action, Book, BookId, DomainEvent, Fine, FineId, Loan, LoanId, Reservation, ReservationId,
    Review, ReviewId, Version,
};

/// 変更対象エンティティへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum EntityRef {
    Book(BookId),
    Loan(LoanId),
    Reservation(ReservationId),
    Fine(FineId),
    Review(ReviewId),
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Book(id) => write!(f, "book {}", id),
            EntityRef::Loan(id) => write!(f, "loan {}", id),
            EntityRef::Reservation(id) => write!(f, "reservation {}", id),
            EntityRef::Fine(id) => write!(f, "fine {}", id),
            EntityRef::Review(id) => write!(f, "review {}", id),
        }
    }
}

/// コミットの前提条件：エンティティが読み取り時のバージョンのままであること
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    pub entity: EntityRef,
    pub version: Version,
}

/// 書き込み内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "entity")]
pub enum Write {
    PutBook(Book),
    RemoveBook(BookId),
    PutLoan(Loan),
    PutReservation(Reservation),
    PutFine(Fine),
    PutReview(Review),
    RemoveReview(ReviewId),
}

/// 1つの遷移を表す原子的な変更セット
///
/// ゲートウェイはすべての前提条件が成り立つ場合に限り、すべての書き込みを
/// まとめて適用する。1つでも外れた場合は何も適用しない。
///
/// `action`は遷移を引き起こした操作。ゲートウェイは資格情報のロールで
/// この操作を改めて権限判定する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub action: Action,
    pub expected: Vec<Expectation>,
    pub writes: Vec<Write>,
    pub events: Vec<DomainEvent>,
}

impl ChangeSet {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            expected: Vec::new(),
            writes: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn expect(mut self, entity: EntityRef, version: Version) -> Self {
        self.expected.push(Expectation { entity, version });
        self
    }

    pub fn write(mut self, write: Write) -> Self {
        self.writes.push(write);
        self
    }

    pub fn event(mut self, event: DomainEvent) -> Self {
        self.events.push(event);
        self
    }
}

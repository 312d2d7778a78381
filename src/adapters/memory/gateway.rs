use crate::domain::{
    Account, AccountId, Action, Book, BookId, ChangeSet, Credential, DomainEvent, EntityRef,
    Enrollment, Fine, FineId, Loan, LoanId, MemberId, NewAccount, Registration, Reservation,
    ReservationId, Review, ReviewId, Role, StaffId, Version, Write, can_perform,
};
use crate::ports::directory::MemberDirectory as MemberDirectoryTrait;
use crate::ports::gateway::{
    FineFilter, GatewayError, LibraryGateway as LibraryGatewayTrait, RecordFilter, Result,
    ReviewFilter,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct Store {
    books: HashMap<BookId, Book>,
    loans: HashMap<LoanId, Loan>,
    reservations: HashMap<ReservationId, Reservation>,
    fines: HashMap<FineId, Fine>,
    reviews: HashMap<ReviewId, Review>,
    accounts: HashMap<AccountId, Account>,
    credentials: HashMap<String, AccountId>,
    events: Vec<DomainEvent>,
}

impl Store {
    fn version_of(&self, entity: EntityRef) -> Option<Version> {
        match entity {
            EntityRef::Book(id) => self.books.get(&id).map(|b| b.version),
            EntityRef::Loan(id) => self.loans.get(&id).map(|l| l.version),
            EntityRef::Reservation(id) => self.reservations.get(&id).map(|r| r.version),
            EntityRef::Fine(id) => self.fines.get(&id).map(|f| f.version),
            EntityRef::Review(id) => self.reviews.get(&id).map(|r| r.version),
        }
    }

    fn apply(&mut self, write: Write) {
        match write {
            Write::PutBook(book) => {
                self.books.insert(book.book_id, book);
            }
            Write::RemoveBook(book_id) => {
                self.books.remove(&book_id);
            }
            Write::PutLoan(loan) => {
                self.loans.insert(loan.loan_id, loan);
            }
            Write::PutReservation(reservation) => {
                self.reservations.insert(reservation.reservation_id, reservation);
            }
            Write::PutFine(fine) => {
                self.fines.insert(fine.fine_id, fine);
            }
            Write::PutReview(review) => {
                self.reviews.insert(review.review_id, review);
            }
            Write::RemoveReview(review_id) => {
                self.reviews.remove(&review_id);
            }
        }
    }

    /// Role behind a credential. Blank, unknown and revoked tokens are rejected
    fn role_of(&self, credential: &Credential) -> Result<Role> {
        let token = credential.expose().trim();
        if token.is_empty() {
            return Err(GatewayError::Unauthenticated);
        }
        self.credentials
            .get(token)
            .and_then(|id| self.accounts.get(id))
            .map(Account::role)
            .ok_or(GatewayError::Unauthenticated)
    }

    fn authorize(&self, credential: &Credential, action: Action) -> Result<()> {
        let role = self.role_of(credential)?;
        if !can_perform(role, action) {
            return Err(GatewayError::Forbidden(format!(
                "{} cannot {}",
                role, action
            )));
        }
        Ok(())
    }

    fn email_taken(&self, email: &str) -> bool {
        self.accounts
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(email))
    }

    fn insert_account(&mut self, email: &str, role: Role) -> Result<Account> {
        let email = email.trim();
        if self.email_taken(email) {
            return Err(GatewayError::Validation(
                "email is already registered".to_string(),
            ));
        }
        let account_id = match role {
            Role::Librarian => AccountId::Librarian(StaffId::new()),
            Role::Member | Role::Unauthenticated => AccountId::Member(MemberId::new()),
        };
        let account = Account {
            account_id,
            email: email.to_string(),
        };
        self.accounts.insert(account_id, account.clone());
        Ok(account)
    }

    fn issue_credential(&mut self, account: &Account) -> Credential {
        let token = format!("{}-{}", account.role(), Uuid::new_v4());
        self.credentials.insert(token.clone(), account.account_id);
        Credential::new(token)
    }
}

/// In-process implementation of LibraryGateway and MemberDirectory
///
/// Keeps every entity behind a single mutex so that `commit` can check the
/// caller's role and all expected versions and apply all writes under one
/// lock. Committed events are kept in order and can be inspected with
/// `events()`.
pub struct Gateway {
    store: Mutex<Store>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(Store::default()),
        }
    }

    /// Create an account with the given role and issue it a credential
    ///
    /// Seeding helper for demos and tests. Unlike `create_account` it needs
    /// no librarian credential.
    pub fn enroll(&self, email: &str, role: Role) -> Result<Enrollment> {
        let mut store = self.lock()?;
        let account = store.insert_account(email, role)?;
        let credential = store.issue_credential(&account);
        Ok(Enrollment {
            account,
            credential,
        })
    }

    /// Reject any further request carrying this credential
    pub fn revoke(&self, credential: &Credential) -> Result<()> {
        self.lock()?.credentials.remove(credential.expose().trim());
        Ok(())
    }

    /// Events of every committed change set, oldest first
    pub fn events(&self) -> Result<Vec<DomainEvent>> {
        Ok(self.lock()?.events.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| GatewayError::transport("in-memory store lock poisoned"))
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_record(filter: RecordFilter, book_id: BookId, member_id: MemberId) -> bool {
    match filter {
        RecordFilter::All => true,
        RecordFilter::Member(id) => id == member_id,
        RecordFilter::Book(id) => id == book_id,
    }
}

#[async_trait]
impl LibraryGatewayTrait for Gateway {
    /// Books ordered by title
    async fn list_books(&self) -> Result<Vec<Book>> {
        let store = self.lock()?;
        let mut books: Vec<Book> = store.books.values().cloned().collect();
        books.sort_by(|a, b| a.details.title.cmp(&b.details.title));
        Ok(books)
    }

    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.lock()?.books.get(&book_id).cloned())
    }

    /// Loans ordered by loan date
    async fn list_loans(&self, filter: RecordFilter) -> Result<Vec<Loan>> {
        let store = self.lock()?;
        let mut loans: Vec<Loan> = store
            .loans
            .values()
            .filter(|l| matches_record(filter, l.book_id, l.borrower_id))
            .cloned()
            .collect();
        loans.sort_by_key(|l| l.loan_date);
        Ok(loans)
    }

    async fn get_loan(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        Ok(self.lock()?.loans.get(&loan_id).cloned())
    }

    /// Reservations ordered by reservation date
    async fn list_reservations(&self, filter: RecordFilter) -> Result<Vec<Reservation>> {
        let store = self.lock()?;
        let mut reservations: Vec<Reservation> = store
            .reservations
            .values()
            .filter(|r| matches_record(filter, r.book_id, r.member_id))
            .cloned()
            .collect();
        reservations.sort_by_key(|r| r.reservation_date);
        Ok(reservations)
    }

    async fn get_reservation(
        &self,
        reservation_id: ReservationId,
    ) -> Result<Option<Reservation>> {
        Ok(self.lock()?.reservations.get(&reservation_id).cloned())
    }

    /// Fines ordered by issue date
    async fn list_fines(&self, filter: FineFilter) -> Result<Vec<Fine>> {
        let store = self.lock()?;
        let mut fines: Vec<Fine> = store
            .fines
            .values()
            .filter(|f| match filter {
                FineFilter::All => true,
                FineFilter::Member(id) => f.member_id == id,
                FineFilter::Loan(id) => f.loan_id == id,
            })
            .cloned()
            .collect();
        fines.sort_by_key(|f| f.issued_at);
        Ok(fines)
    }

    async fn get_fine(&self, fine_id: FineId) -> Result<Option<Fine>> {
        Ok(self.lock()?.fines.get(&fine_id).cloned())
    }

    /// Reviews ordered newest first
    async fn list_reviews(&self, filter: ReviewFilter) -> Result<Vec<Review>> {
        let store = self.lock()?;
        let mut reviews: Vec<Review> = store
            .reviews
            .values()
            .filter(|r| match filter {
                ReviewFilter::All => true,
                ReviewFilter::Book(id) => r.book_id == id,
                ReviewFilter::Member(id) => r.member_id == id,
            })
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.review_date.cmp(&a.review_date));
        Ok(reviews)
    }

    async fn get_review(&self, review_id: ReviewId) -> Result<Option<Review>> {
        Ok(self.lock()?.reviews.get(&review_id).cloned())
    }

    /// Role check, then compare-and-swap over every expected version, then
    /// apply all writes
    async fn commit(&self, credential: &Credential, changes: ChangeSet) -> Result<()> {
        let mut store = self.lock()?;
        store.authorize(credential, changes.action)?;

        for expectation in &changes.expected {
            match store.version_of(expectation.entity) {
                None => {
                    return Err(GatewayError::Conflict(format!(
                        "{} no longer exists",
                        expectation.entity
                    )));
                }
                Some(current) if current != expectation.version => {
                    return Err(GatewayError::Conflict(format!(
                        "{} is at {}, expected {}",
                        expectation.entity, current, expectation.version
                    )));
                }
                Some(_) => {}
            }
        }

        for write in changes.writes {
            store.apply(write);
        }
        store.events.extend(changes.events);
        Ok(())
    }
}

#[async_trait]
impl MemberDirectoryTrait for Gateway {
    /// Accounts ordered by email
    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let store = self.lock()?;
        let mut accounts: Vec<Account> = store.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(accounts)
    }

    async fn get_account(&self, account_id: AccountId) -> Result<Option<Account>> {
        Ok(self.lock()?.accounts.get(&account_id).cloned())
    }

    async fn register(&self, registration: Registration) -> Result<Enrollment> {
        self.enroll(&registration.email, Role::Member)
    }

    async fn create_account(
        &self,
        credential: &Credential,
        account: NewAccount,
    ) -> Result<Account> {
        let mut store = self.lock()?;
        store.authorize(credential, Action::ManageMembers)?;
        store.insert_account(&account.email, account.granted_role())
    }

    async fn delete_account(&self, credential: &Credential, account_id: AccountId) -> Result<()> {
        let mut store = self.lock()?;
        store.authorize(credential, Action::ManageMembers)?;
        if store.accounts.remove(&account_id).is_none() {
            return Err(GatewayError::NotFound(format!("{}", account_id)));
        }
        store.credentials.retain(|_, id| *id != account_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookDetails, lifecycle};
    use chrono::Utc;

    fn librarian(gateway: &Gateway) -> Enrollment {
        gateway
            .enroll("librarian@library.test", Role::Librarian)
            .unwrap()
    }

    fn new_book(staff_id: StaffId) -> Book {
        let details = BookDetails {
            title: "Na Drini ćuprija".to_string(),
            author: "Ivo Andrić".to_string(),
            year: 1945,
            genre: "Novel".to_string(),
            total_copies: 1,
        };
        lifecycle::add_book(details, Utc::now(), staff_id)
            .unwrap()
            .outcome
    }

    fn put(book: &Book) -> ChangeSet {
        ChangeSet::new(Action::AddBook).write(Write::PutBook(book.clone()))
    }

    fn staff_id(enrollment: &Enrollment) -> StaffId {
        enrollment.actor().staff_id().unwrap()
    }

    #[tokio::test]
    async fn test_commit_applies_writes_and_records_events() {
        let gateway = Gateway::new();
        let librarian = librarian(&gateway);
        let transition =
            lifecycle::add_book(new_book(staff_id(&librarian)).details, Utc::now(), staff_id(&librarian))
                .unwrap();
        let book_id = transition.outcome.book_id;

        gateway
            .commit(&librarian.credential, transition.changes)
            .await
            .unwrap();

        assert!(gateway.get_book(book_id).await.unwrap().is_some());
        let events = gateway.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "BookAdded");
    }

    #[tokio::test]
    async fn test_stale_version_is_conflict_and_nothing_applied() {
        let gateway = Gateway::new();
        let librarian = librarian(&gateway);
        let credential = &librarian.credential;
        let book = new_book(staff_id(&librarian));
        gateway.commit(credential, put(&book)).await.unwrap();

        // 1回目の更新でバージョンが進む
        let first = ChangeSet::new(Action::EditBook)
            .expect(EntityRef::Book(book.book_id), book.version)
            .write(Write::PutBook(book.bumped()));
        gateway.commit(credential, first).await.unwrap();

        let mut renamed = book.bumped();
        renamed.details.title = "Stale".to_string();
        let stale = ChangeSet::new(Action::EditBook)
            .expect(EntityRef::Book(book.book_id), book.version)
            .write(Write::PutBook(renamed));

        let result = gateway.commit(credential, stale).await;
        assert!(matches!(result, Err(GatewayError::Conflict(_))));

        let stored = gateway.get_book(book.book_id).await.unwrap().unwrap();
        assert_eq!(stored.details.title, book.details.title);
        assert_eq!(stored.version, book.version.next());
    }

    #[tokio::test]
    async fn test_missing_expected_entity_is_conflict() {
        let gateway = Gateway::new();
        let librarian = librarian(&gateway);
        let changes = ChangeSet::new(Action::ReturnLoan)
            .expect(EntityRef::Loan(LoanId::new()), Version::initial());

        let result = gateway.commit(&librarian.credential, changes).await;
        assert!(matches!(result, Err(GatewayError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_blank_unknown_or_revoked_credential_is_unauthenticated() {
        let gateway = Gateway::new();
        let librarian = librarian(&gateway);
        let book = new_book(staff_id(&librarian));

        for credential in [Credential::new("  "), Credential::new("forged-token")] {
            let result = gateway.commit(&credential, put(&book)).await;
            assert!(matches!(result, Err(GatewayError::Unauthenticated)));
        }

        gateway.revoke(&librarian.credential).unwrap();
        let result = gateway.commit(&librarian.credential, put(&book)).await;
        assert!(matches!(result, Err(GatewayError::Unauthenticated)));
        assert!(gateway.list_books().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_checks_role_against_action() {
        let gateway = Gateway::new();
        let librarian = librarian(&gateway);
        let member = gateway.enroll("member@library.test", Role::Member).unwrap();
        let book = new_book(staff_id(&librarian));

        let result = gateway.commit(&member.credential, put(&book)).await;

        assert!(matches!(result, Err(GatewayError::Forbidden(_))));
        assert!(gateway.list_books().await.unwrap().is_empty());
        assert!(gateway.events().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_enroll_rejects_duplicate_email_case_insensitively() {
        let gateway = Gateway::new();
        gateway.enroll("Ana@Library.test", Role::Member).unwrap();

        let result = gateway.enroll("ana@library.test ", Role::Member);
        assert!(matches!(result, Err(GatewayError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_account_revokes_its_credentials() {
        let gateway = Gateway::new();
        let librarian = librarian(&gateway);
        let member = gateway.enroll("member@library.test", Role::Member).unwrap();

        gateway
            .delete_account(&librarian.credential, member.account.account_id)
            .await
            .unwrap();

        let changes = ChangeSet::new(Action::ReserveBook);
        let result = gateway.commit(&member.credential, changes).await;
        assert!(matches!(result, Err(GatewayError::Unauthenticated)));

        let again = gateway
            .delete_account(&librarian.credential, member.account.account_id)
            .await;
        assert!(matches!(again, Err(GatewayError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_member_cannot_manage_accounts() {
        let gateway = Gateway::new();
        let member = gateway.enroll("member@library.test", Role::Member).unwrap();
        let account = NewAccount {
            email: "new@library.test".to_string(),
            password: "secret1".to_string(),
            role: Role::Librarian,
        };

        let result = gateway.create_account(&member.credential, account).await;
        assert!(matches!(result, Err(GatewayError::Forbidden(_))));
        assert_eq!(gateway.list_accounts().await.unwrap().len(), 1);
    }
}

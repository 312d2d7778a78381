#![allow(dead_code)]

use chrono::{DateTime, Utc};
use rusty_library_circulation::adapters::{
    memory::Gateway,
    mock::{Clock, Session},
};
use rusty_library_circulation::application::{ServiceDependencies, catalog_service};
use rusty_library_circulation::config::CirculationConfig;
use rusty_library_circulation::domain::commands::AddBook;
use rusty_library_circulation::domain::{Actor, BookDetails, BookId, FineRate, MemberId, Role};
use rusty_library_circulation::ports::Clock as _;
use std::sync::Arc;
use uuid::Uuid;

/// 延滞1日あたりの罰金（テスト用）
pub const FINE_RATE_PER_DAY: u64 = 100;

/// テスト用のtracingを初期化（複数回呼んでもよい）
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_circulation=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn config() -> CirculationConfig {
    CirculationConfig::with_fine_rate(FineRate::per_day(FINE_RATE_PER_DAY).unwrap())
}

pub fn details(title: &str, total_copies: u32) -> BookDetails {
    BookDetails {
        title: title.to_string(),
        author: "Ursula K. Le Guin".to_string(),
        year: 1969,
        genre: "Science Fiction".to_string(),
        total_copies,
    }
}

/// インメモリのゲートウェイ、モックセッション、止まった時計で組み立てた依存関係
pub struct Fixture {
    pub deps: ServiceDependencies,
    pub gateway: Arc<Gateway>,
    pub session: Arc<Session>,
    pub clock: Arc<Clock>,
    pub librarian: Actor,
    pub member: Actor,
    pub member_id: MemberId,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();

        let gateway = Arc::new(Gateway::new());
        let session = Arc::new(Session::new());
        let clock = Arc::new(Clock::new());

        let librarian = gateway
            .enroll("librarian@library.test", Role::Librarian)
            .unwrap()
            .actor();
        let member = gateway
            .enroll("member@library.test", Role::Member)
            .unwrap()
            .actor();
        let member_id = member.member_id().unwrap();

        Self {
            deps: ServiceDependencies {
                gateway: gateway.clone(),
                directory: gateway.clone(),
                session: session.clone(),
                clock: clock.clone(),
                config: config(),
            },
            gateway,
            session,
            clock,
            librarian,
            member,
            member_id,
        }
    }

    /// 同じゲートウェイと時計を共有する、別セッションの依存関係
    pub fn other_client(&self, actor: Actor) -> ServiceDependencies {
        ServiceDependencies {
            gateway: self.gateway.clone(),
            directory: self.gateway.clone(),
            session: Arc::new(Session::with_actor(actor)),
            clock: self.clock.clone(),
            config: config(),
        }
    }

    /// 新しい会員を登録する（ログインはしない）
    pub fn new_member(&self) -> Actor {
        self.gateway
            .enroll(&format!("{}@library.test", Uuid::new_v4()), Role::Member)
            .unwrap()
            .actor()
    }

    /// 時計の現在時刻
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn as_librarian(&self) {
        self.session.set_actor(self.librarian.clone());
    }

    pub fn as_member(&self) {
        self.session.set_actor(self.member.clone());
    }

    /// 別の会員としてログインし、その会員IDを返す
    pub fn as_new_member(&self) -> MemberId {
        let actor = self.new_member();
        let member_id = actor.member_id().unwrap();
        self.session.set_actor(actor);
        member_id
    }

    pub fn sign_out(&self) {
        self.session.sign_out();
    }

    /// 司書として書籍を登録する
    pub async fn add_book(&self, title: &str, total_copies: u32) -> BookId {
        self.as_librarian();
        catalog_service::create_book(
            &self.deps,
            AddBook {
                details: details(title, total_copies),
            },
        )
        .await
        .unwrap()
        .book
        .book_id
    }
}

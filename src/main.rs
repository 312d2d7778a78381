use chrono::Duration;
use rusty_library_circulation::{
    adapters::{
        memory::Gateway as MemoryGateway,
        mock::{Clock as MockClock, Session as MockSession},
    },
    application::{
        ServiceDependencies, catalog_service, circulation_service, fine_service, registration,
        review_service, statistics,
    },
    config::CirculationConfig,
    domain::{
        BookDetails, Registration, Role, Scope,
        commands::{AddBook, ApproveReservation, PayFine, PostReview, ReserveBook, ReturnLoan},
    },
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rusty_library_circulation=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CirculationConfig::from_env()?;
    tracing::info!(
        loan_period_days = config.loan_period_days,
        reservation_hold_days = config.reservation_hold_days,
        fine_rate = config.fine_rate.value().minor_units(),
        "configuration loaded"
    );

    // Initialize adapters
    // 延滞を再現するため、時計はモックを使って進める
    let gateway = Arc::new(MemoryGateway::new());
    let session = Arc::new(MockSession::new());
    let clock = Arc::new(MockClock::new());
    let deps = ServiceDependencies {
        gateway: gateway.clone(),
        directory: gateway.clone(),
        session: session.clone(),
        clock: clock.clone(),
        config,
    };

    let librarian = gateway
        .enroll("librarian@library.example", Role::Librarian)?
        .actor();

    // 会員登録（登録した会員としてログインする）
    let member = registration::register(
        &deps,
        Registration {
            email: "member@library.example".to_string(),
            password: "demo-password".to_string(),
            confirm_password: "demo-password".to_string(),
        },
    )
    .await?;

    // 司書が書籍を登録
    session.set_actor(librarian.clone());
    let entry = catalog_service::create_book(
        &deps,
        AddBook {
            details: BookDetails {
                title: "The Name of the Rose".to_string(),
                author: "Umberto Eco".to_string(),
                year: 1980,
                genre: "Mystery".to_string(),
                total_copies: 1,
            },
        },
    )
    .await?;
    let book_id = entry.book.book_id;

    // 会員が予約
    session.set_actor(member.clone());
    let reservation = circulation_service::reserve_book(&deps, ReserveBook { book_id }).await?;

    // 1時間後に司書が承認（貸出を作成）
    clock.advance(Duration::hours(1));
    session.set_actor(librarian.clone());
    let loan = circulation_service::approve_reservation(
        &deps,
        ApproveReservation {
            reservation_id: reservation.reservation.reservation_id,
        },
    )
    .await?;

    // 返却期限を3日過ぎて返却
    clock.set(loan.loan.due_date + Duration::days(3));
    let outcome = circulation_service::return_loan(
        &deps,
        ReturnLoan {
            loan_id: loan.loan.loan_id,
        },
    )
    .await?;

    if let Some(fine) = outcome.fine {
        fine_service::pay_fine(
            &deps,
            PayFine {
                fine_id: fine.fine_id,
            },
        )
        .await?;
    }

    let summary = statistics::librarian_statistics(&deps).await?;
    tracing::info!(?summary, "librarian statistics");

    // 会員がレビューを投稿
    session.set_actor(member);
    review_service::post_review(
        &deps,
        PostReview {
            book_id,
            rating: 5,
            comment: Some("Worth the late fee".to_string()),
        },
    )
    .await?;
    let rating = review_service::book_rating(&deps, book_id).await?;

    let fines = fine_service::list_fines(&deps, Scope::Mine).await?;
    let loans = circulation_service::list_loans(&deps, Scope::Mine).await?;
    tracing::info!(
        loans = loans.len(),
        fines = fines.len(),
        average_rating = rating.average_rating,
        events = gateway.events()?.len(),
        "demo finished"
    );

    Ok(())
}

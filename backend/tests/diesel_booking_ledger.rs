//! Integration tests for the Diesel ledger, registry and reporting adapters.
//!
//! Each test runs against its own embedded PostgreSQL database cloned from a
//! migrated template.

mod embedded_postgres;

use chrono::{DateTime, Duration, TimeZone, Utc};
use futures::future::join_all;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

use kunda_backend::domain::ports::{
    BookingLedger, BookingLedgerError, RegistryRepository, ReportingRepository, TransitionRequest,
};
use kunda_backend::domain::{
    AdminAction, BookingCode, BookingError, BookingStatus, BootstrapReport, BootstrapSeed,
    KundaNumber, NewUser, PasswordDigest, RebookingPolicy, RegistrationCode, ReservationRequest,
    User,
};
use kunda_backend::outbound::persistence::{
    DbPool, DieselBookingLedger, DieselRegistryRepository, DieselReportingRepository, PoolConfig,
};

use embedded_postgres::{
    handle_cluster_setup_failure, provision_template_database, shared_cluster_handle,
};

struct TestContext {
    runtime: Runtime,
    registry: DieselRegistryRepository,
    ledger: DieselBookingLedger,
    reporting: DieselReportingRepository,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let temp_db = provision_template_database(cluster)?;
    let database_url = temp_db.url().to_string();

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        registry: DieselRegistryRepository::new(pool.clone()),
        ledger: DieselBookingLedger::new(pool.clone()),
        reporting: DieselReportingRepository::new(pool),
        _database: temp_db,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
        + Duration::minutes(minutes)
}

fn seed() -> BootstrapSeed {
    BootstrapSeed {
        admin_username: "admin".to_owned(),
        admin_password: PasswordDigest::of("admin"),
    }
}

fn number(raw: i64) -> KundaNumber {
    KundaNumber::new(raw).expect("kunda number")
}

fn booking_code(n: u32) -> BookingCode {
    BookingCode::from_suffix(&format!("{n:08}")).expect("booking code")
}

async fn register(registry: &DieselRegistryRepository, phone: &str, minute: i64) -> User {
    let user = NewUser::try_from_parts("Asha", phone, "asha@example.com", 3).expect("user");
    let suffix = phone.get(2..).expect("ten digit phone");
    let code = RegistrationCode::from_suffix(suffix).expect("registration code");
    registry
        .insert_user(&user, &code, at(minute))
        .await
        .expect("insert user")
}

fn reservation(user: &User, kunda: i64, code: u32, policy: RebookingPolicy) -> ReservationRequest {
    ReservationRequest {
        user_id: user.id,
        kunda_number: number(kunda),
        booking_code: booking_code(code),
        booked_at: at(i64::from(code)),
        policy,
    }
}

fn reject(code: u32) -> TransitionRequest {
    TransitionRequest {
        booking_code: booking_code(code),
        action: AdminAction::Reject,
        notes: None,
        at: at(500),
    }
}

#[rstest]
fn bootstrap_twice_creates_nothing_new(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: bootstrap_twice_creates_nothing_new skipped");
        return;
    };

    context.runtime.block_on(async {
        let first = context.registry.bootstrap(&seed()).await.expect("first run");
        assert_eq!(first.kundas_created, 100);
        assert!(first.admin_seeded);

        let second = context.registry.bootstrap(&seed()).await.expect("second run");
        assert_eq!(second, BootstrapReport::default());

        let kundas = context.registry.list_kundas().await.expect("kundas");
        assert_eq!(kundas.len(), 100);
        assert!(kundas.iter().all(|listing| listing.kunda.is_available()));
    });
}

#[rstest]
fn concurrent_reservations_for_one_kunda_grant_exactly_one(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!(
            "SKIP-TEST-CLUSTER: concurrent_reservations_for_one_kunda_grant_exactly_one skipped"
        );
        return;
    };

    context.runtime.block_on(async {
        context.registry.bootstrap(&seed()).await.expect("bootstrap");
        let mut users = Vec::new();
        for n in 0..8_i64 {
            users.push(register(&context.registry, &format!("90000000{n:02}"), n).await);
        }

        let tasks = users.iter().zip(1_u32..).map(|(user, code)| {
            let ledger = context.ledger.clone();
            let request = reservation(user, 9, code, RebookingPolicy::OneAttempt);
            tokio::spawn(async move { ledger.reserve(&request).await })
        });
        let results: Vec<_> = join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.expect("task completed"))
            .collect();

        let granted: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(granted.len(), 1, "exactly one reservation wins");
        let refused = BookingLedgerError::rejected(BookingError::slot_unavailable(9));
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|err| *err == refused)
        );

        let listing = context
            .registry
            .find_kunda(number(9))
            .await
            .expect("lookup")
            .expect("kunda exists");
        let winner = granted.first().expect("one winner");
        assert_eq!(listing.kunda.booked_by(), Some(winner.user.id));
    });
}

#[rstest]
fn rejected_kunda_is_rebookable_under_one_active(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: rejected_kunda_is_rebookable_under_one_active skipped");
        return;
    };

    context.runtime.block_on(async {
        context.registry.bootstrap(&seed()).await.expect("bootstrap");
        let asha = register(&context.registry, "9876543210", 0).await;
        let ravi = register(&context.registry, "9123456780", 1).await;
        context
            .ledger
            .reserve(&reservation(&asha, 4, 1, RebookingPolicy::OneActive))
            .await
            .expect("booked");

        let outcome = context.ledger.transition(&reject(1)).await.expect("rejected");
        assert_eq!(outcome.status, BookingStatus::Rejected);
        assert!(outcome.kunda_released);

        let rebooked = context
            .ledger
            .reserve(&reservation(&ravi, 4, 2, RebookingPolicy::OneActive))
            .await
            .expect("kunda 4 free again");
        assert_eq!(rebooked.kunda_number, number(4));
        context
            .ledger
            .reserve(&reservation(&asha, 5, 3, RebookingPolicy::OneActive))
            .await
            .expect("asha rebooks elsewhere");

        let err = context
            .ledger
            .reserve(&reservation(&asha, 6, 4, RebookingPolicy::OneActive))
            .await
            .expect_err("asha holds kunda 5");
        assert_eq!(
            err,
            BookingLedgerError::rejected(BookingError::user_already_booked(asha.id.get()))
        );
    });
}

#[rstest]
fn rejection_still_blocks_the_user_under_one_attempt(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: rejection_still_blocks_the_user_under_one_attempt skipped");
        return;
    };

    context.runtime.block_on(async {
        context.registry.bootstrap(&seed()).await.expect("bootstrap");
        let asha = register(&context.registry, "9876543210", 0).await;
        context
            .ledger
            .reserve(&reservation(&asha, 4, 1, RebookingPolicy::OneAttempt))
            .await
            .expect("booked");
        context.ledger.transition(&reject(1)).await.expect("rejected");

        let err = context
            .ledger
            .reserve(&reservation(&asha, 5, 2, RebookingPolicy::OneAttempt))
            .await
            .expect_err("one attempt only");
        assert_eq!(
            err,
            BookingLedgerError::rejected(BookingError::user_already_booked(asha.id.get()))
        );
        let kunda = context
            .registry
            .find_kunda(number(5))
            .await
            .expect("lookup")
            .expect("kunda exists");
        assert!(kunda.kunda.is_available());
    });
}

#[rstest]
fn stats_partition_the_kundas(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: stats_partition_the_kundas skipped");
        return;
    };

    context.runtime.block_on(async {
        context.registry.bootstrap(&seed()).await.expect("bootstrap");
        let asha = register(&context.registry, "9876543210", 0).await;
        let ravi = register(&context.registry, "9123456780", 1).await;
        let meera = register(&context.registry, "9000000001", 2).await;
        for (user, kunda, code) in [(&asha, 1, 10), (&ravi, 2, 20), (&meera, 3, 30)] {
            context
                .ledger
                .reserve(&reservation(user, kunda, code, RebookingPolicy::OneAttempt))
                .await
                .expect("booked");
        }
        context.ledger.transition(&reject(20)).await.expect("rejected");
        let approve = TransitionRequest {
            action: AdminAction::Approve,
            ..reject(30)
        };
        context.ledger.transition(&approve).await.expect("approved");

        let stats = context.reporting.stats().await.expect("stats");
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_bookings, 3);
        assert_eq!(stats.pending_bookings, 1);
        assert_eq!(stats.approved_bookings, 1);
        assert_eq!(stats.rejected_bookings, 1);
        assert_eq!(stats.booked_kundas, 2);
        assert_eq!(stats.available_kundas, 98);
        assert_eq!(stats.available_kundas + stats.booked_kundas, stats.total_kundas);
        assert_eq!(stats.total_kundas, 100);
    });
}

//! Contention on a single kunda across worker threads.

#[expect(dead_code, reason = "HTTP helpers are unused by allocator-level tests")]
mod support;

use futures::future::join_all;
use rstest::rstest;

use kunda_backend::domain::{
    AdminAuthMode, BookingError, KundaNumber, KundaStatus, NewUser, RebookingPolicy,
};

use support::memory_state;

const CONTENDERS: usize = 32;

fn attendee(index: usize) -> NewUser {
    let phone = format!("9{index:09}");
    NewUser::try_from_parts(
        &format!("Attendee {index}"),
        &phone,
        &format!("attendee{index}@example.com"),
        2,
    )
    .expect("valid attendee")
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exactly_one_user_wins_a_contested_kunda() {
    let state = memory_state(AdminAuthMode::SharedSecret, RebookingPolicy::OneAttempt).await;
    let mut users = Vec::with_capacity(CONTENDERS);
    for index in 0..CONTENDERS {
        users.push(state.registry.register(&attendee(index)).await.expect("register"));
    }
    let kunda = KundaNumber::new(42).expect("kunda 42");

    let attempts = users.iter().map(|user| {
        let allocator = state.allocator.clone();
        let user_id = user.id;
        tokio::spawn(async move { allocator.request_booking(user_id, kunda).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completed"))
        .collect();

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results.iter().all(|result| matches!(
        result,
        Ok(_) | Err(BookingError::SlotUnavailable { .. })
    )));

    let listing = state.registry.kunda_by_number(kunda).await.expect("listing");
    assert_eq!(listing.kunda.status(), KundaStatus::Booked);
    let winner = results.iter().find_map(|result| result.as_ref().ok()).expect("winner");
    assert_eq!(listing.kunda.booked_by(), Some(winner.booking.user_id));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_user_racing_for_many_kundas_gets_one() {
    let state = memory_state(AdminAuthMode::SharedSecret, RebookingPolicy::OneAttempt).await;
    let user = state.registry.register(&attendee(7)).await.expect("register");

    let attempts = (1..=CONTENDERS).map(|number| {
        let allocator = state.allocator.clone();
        let user_id = user.id;
        tokio::spawn(async move {
            let kunda = KundaNumber::new(i64::try_from(number).expect("small"))
                .expect("kunda in range");
            allocator.request_booking(user_id, kunda).await
        })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completed"))
        .collect();

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results.iter().all(|result| matches!(
        result,
        Ok(_) | Err(BookingError::UserAlreadyBooked { .. })
    )));

    let stats = state.reporting.public_stats().await.expect("stats");
    assert_eq!(stats.available_kundas, 99);
}

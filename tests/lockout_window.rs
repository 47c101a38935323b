use komerco::{AccountService, Error, LogMailer, MemoryAccountStore, ServiceConfig};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::time::{Duration, advance};

fn guard() -> AccountService {
    AccountService::new(
        Arc::new(MemoryAccountStore::new()),
        Arc::new(LogMailer),
        &SecretString::from("lockout-secret".to_string()),
        ServiceConfig::new("https://shop.example.com".to_string()),
    )
}

fn retry_after(result: Result<(), Error>) -> u64 {
    match result {
        Err(Error::LockedOut {
            retry_after_seconds,
        }) => retry_after_seconds,
        other => panic!("expected a lockout, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn fifth_failure_locks_the_address_and_the_window_counts_down() {
    let service = guard();

    // No such account: every attempt resolves to the underlying failure.
    for _ in 0..4 {
        assert!(matches!(
            service.request_password_reset("ghost@example.com").await,
            Err(Error::AccountNotFound)
        ));
    }

    let fifth = service.request_password_reset("ghost@example.com").await;
    assert_eq!(retry_after(fifth), 900);

    advance(Duration::from_secs(60)).await;
    let sixth = service.request_password_reset("ghost@example.com").await;
    assert_eq!(retry_after(sixth), 840);

    // Once the window elapses the slate is clean: attempts re-evaluate
    // normally and the count restarts from zero.
    advance(Duration::from_secs(841)).await;
    for _ in 0..4 {
        assert!(matches!(
            service.request_password_reset("ghost@example.com").await,
            Err(Error::AccountNotFound)
        ));
    }
    let rearmed = service.request_password_reset("ghost@example.com").await;
    assert_eq!(retry_after(rearmed), 900);
}

#[tokio::test(start_paused = true)]
async fn lockout_keys_are_independent() {
    let service = guard();

    for _ in 0..4 {
        let _ = service.request_password_reset("ghost@example.com").await;
    }
    retry_after(service.request_password_reset("ghost@example.com").await);

    // A different address is unaffected by the locked one.
    assert!(matches!(
        service.request_password_reset("other@example.com").await,
        Err(Error::AccountNotFound)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_failures_arm_the_lockout_exactly_once() {
    let service = Arc::new(guard());

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.request_password_reset("ghost@example.com").await
        }));
    }

    let mut not_found = 0;
    let mut locked_out = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Err(Error::AccountNotFound) => not_found += 1,
            Err(Error::LockedOut { .. }) => locked_out += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    // The read-check-increment sequence is atomic per key: four attempts see
    // the underlying failure, the fifth arms the lockout, and every later
    // attempt observes it. No interleaving may admit a sixth failure.
    assert_eq!(not_found, 4);
    assert_eq!(locked_out, 16);
}

use ldlmt_core::{AdmissionGate, GateError};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

async fn explode() {
    panic!("protected work failed");
}

#[tokio::test(start_paused = true)]
async fn test_pools_never_exceed_their_size() {
    let gate = Arc::new(AdmissionGate::new(10, 4, Duration::from_millis(30)));
    let running_weight = Arc::new(AtomicU32::new(0));
    let peak_weight = Arc::new(AtomicU32::new(0));

    let mut handles = Vec::new();
    for i in 0..40u32 {
        let gate = gate.clone();
        let running_weight = running_weight.clone();
        let peak_weight = peak_weight.clone();
        let weight = i % 4 + 1;

        handles.push(tokio::spawn(async move {
            sleep(Duration::from_millis(u64::from(i % 7))).await;
            let outcome = gate
                .run(weight, || async {
                    let now = running_weight.fetch_add(weight, Ordering::SeqCst) + weight;
                    peak_weight.fetch_max(now, Ordering::SeqCst);
                    assert!(gate.capacity().held() <= 10);
                    assert!(gate.waiters().held() <= 4);
                    sleep(Duration::from_millis(5)).await;
                    running_weight.fetch_sub(weight, Ordering::SeqCst);
                })
                .await;
            assert!(gate.waiters().held() <= 4);
            outcome
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            admitted += 1;
        }
    }

    assert!(admitted > 0, "some requests should have been admitted");
    assert!(peak_weight.load(Ordering::SeqCst) <= 10);
    assert_eq!(gate.capacity().available(), 10);
    assert_eq!(gate.waiters().available(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_no_leak_on_any_outcome() {
    let gate = Arc::new(AdmissionGate::new(3, 1, Duration::from_millis(20)));

    // admitted, work succeeds
    gate.run(2, || async {}).await.unwrap();

    // admitted, work returns an error
    let failed: Result<Result<(), &str>, GateError> = gate.run(3, || async { Err("nope") }).await;
    assert_eq!(failed, Ok(Err("nope")));

    // timeout: weight larger than the whole pool
    let timed_out = gate.run(4, || async {}).await;
    assert!(matches!(timed_out, Err(GateError::CapacityTimeout { .. })));

    // queue full: the only waiter slot is taken by a blocked attempt
    let blocker = gate.admit(3).await.unwrap();
    let queued = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.admit(1).await.map(|_| ()) })
    };
    tokio::task::yield_now().await;
    assert_eq!(gate.waiters().held(), 1);
    let rejected = gate.run(1, || async {}).await;
    assert_eq!(rejected, Err(GateError::QueueFull { max_waiters: 1 }));
    assert!(queued.await.unwrap().is_err());
    drop(blocker);

    // admitted, work panics
    let panicked = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.run(3, explode).await })
    };
    let join_err = panicked.await.unwrap_err();
    assert!(join_err.is_panic());

    assert_eq!(gate.capacity().available(), 3);
    assert_eq!(gate.waiters().available(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_request_releases_capacity() {
    let gate = AdmissionGate::new(5, 5, Duration::from_millis(10));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        gate.run(5, || sleep(Duration::from_secs(60))),
    )
    .await;

    assert!(abandoned.is_err(), "caller should have given up first");
    assert_eq!(gate.capacity().available(), 5);
    assert_eq!(gate.waiters().available(), 5);
}

#[tokio::test]
async fn test_zero_waiters_rejects_everything() {
    let gate = AdmissionGate::new(100, 0, Duration::from_millis(100));
    let calls = AtomicUsize::new(0);

    for _ in 0..10 {
        let result = gate
            .run(1, || async {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert_eq!(result, Err(GateError::QueueFull { max_waiters: 0 }));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(gate.capacity().available(), 100);
}

#[tokio::test(start_paused = true)]
async fn test_zero_capacity_rejects_after_timeout() {
    let gate = AdmissionGate::new(0, 1, Duration::from_millis(20));
    let calls = AtomicUsize::new(0);

    for weight in [1, 2, 7] {
        let start = Instant::now();
        let result = gate
            .run(weight, || async {
                calls.fetch_add(1, Ordering::SeqCst);
            })
            .await;
        assert!(matches!(result, Err(GateError::CapacityTimeout { .. })));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(gate.waiters().available(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_boundary_with_capacity_held() {
    let gate = Arc::new(AdmissionGate::new(1, 5, Duration::from_millis(50)));

    let long_running = {
        let gate = gate.clone();
        tokio::spawn(async move { gate.run(1, || sleep(Duration::from_millis(500))).await })
    };
    tokio::task::yield_now().await;
    assert_eq!(gate.capacity().held(), 1);

    let start = Instant::now();
    let result = gate.run(1, || async {}).await;
    let waited = start.elapsed();

    assert_eq!(
        result,
        Err(GateError::CapacityTimeout {
            weight: 1,
            max_wait: Duration::from_millis(50)
        })
    );
    assert!(waited >= Duration::from_millis(50), "rejected early: {:?}", waited);
    assert!(waited < Duration::from_millis(100), "rejected late: {:?}", waited);

    long_running.await.unwrap().unwrap();
    assert_eq!(gate.capacity().available(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_independent_weights() {
    let gate = Arc::new(AdmissionGate::new(10, 5, Duration::from_millis(30)));

    let first = gate.admit(4).await.unwrap();
    let second = gate.admit(4).await.unwrap();
    assert_eq!(gate.capacity().held(), 8);

    // Only 2 units left: a third request of 4 waits, then gives up
    let third = gate.admit(4).await;
    assert!(matches!(third, Err(GateError::CapacityTimeout { weight: 4, .. })));

    // With a release inside the wait window the third request gets through
    let releaser = tokio::spawn(async move {
        sleep(Duration::from_millis(10)).await;
        drop(first);
    });
    let start = Instant::now();
    let third = gate.admit(4).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(10));
    assert_eq!(gate.capacity().held(), 8);

    releaser.await.unwrap();
    drop(second);
    drop(third);
    assert_eq!(gate.capacity().available(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_waiter_released_when_work_starts() {
    let gate = Arc::new(AdmissionGate::new(1, 1, Duration::from_millis(100)));

    let blocker = gate.admit(1).await.unwrap();
    let waiting = {
        let gate = gate.clone();
        tokio::spawn(async move {
            gate.run(1, || async {
                // This request is running now, so the waiter slot must be free again.
                assert_eq!(gate.waiters().held(), 0);
                sleep(Duration::from_millis(50)).await;
            })
            .await
        })
    };
    tokio::task::yield_now().await;
    assert_eq!(gate.waiters().held(), 1);

    sleep(Duration::from_millis(10)).await;
    drop(blocker);
    sleep(Duration::from_millis(1)).await;

    // The waiting request is running: a new caller can queue behind it.
    assert_eq!(gate.waiters().held(), 0);
    let queued = gate.run(1, || async {}).await;
    assert!(queued.is_ok());

    waiting.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_wakes_waiting_requests() {
    let gate = Arc::new(AdmissionGate::new(1, 3, Duration::from_secs(30)));
    let blocker = gate.admit(1).await.unwrap();

    let waiting = {
        let gate = gate.clone();
        tokio::spawn(async move {
            let start = Instant::now();
            let result = gate.admit(1).await.map(|_| ());
            (result, start.elapsed())
        })
    };
    tokio::task::yield_now().await;

    gate.shutdown();
    let (result, waited) = waiting.await.unwrap();

    assert!(matches!(result, Err(GateError::CapacityTimeout { .. })));
    assert!(waited < Duration::from_secs(30));
    assert_eq!(gate.waiters().available(), 3);

    // Admitted work is unaffected by shutdown
    assert_eq!(blocker.weight(), 1);
    drop(blocker);
    assert_eq!(gate.capacity().available(), 1);
}

// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Integration tests for `Coalescer::work()`.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::{StreamExt, future::join_all, stream::FuturesUnordered};
use herdflight::Coalescer;

/// Counts how often a simulated backend was queried.
#[derive(Default)]
struct Backend {
    queries: AtomicUsize,
}

impl Backend {
    async fn score(&self, name: &str, latency: Duration) -> String {
        self.queries.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(latency).await;
        format!("score:{name}")
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

fn never_finishes() -> std::future::Pending<String> {
    std::future::pending()
}

#[tokio::test]
async fn single_caller_gets_its_own_output() {
    let backend = Backend::default();
    let flight = Coalescer::new();

    let value = flight.work("Tom", || backend.score("Tom", Duration::from_millis(5))).await;

    assert_eq!(value, "score:Tom");
    assert_eq!(backend.queries(), 1);
    assert_eq!(flight.in_flight(), 0);
}

#[tokio::test]
async fn overlapping_callers_share_one_execution() {
    let backend = Backend::default();
    let flight = Coalescer::new();

    let callers: FuturesUnordered<_> = (0..25)
        .map(|_| flight.work("Tom", || backend.score("Tom", Duration::from_millis(50))))
        .collect();
    let values: Vec<String> = callers.collect().await;

    assert_eq!(values.len(), 25);
    assert!(values.iter().all(|v| v == "score:Tom"));
    assert_eq!(backend.queries(), 1);
}

#[tokio::test]
async fn followers_awaited_one_by_one_still_share() {
    let backend = Backend::default();
    let flight = Coalescer::new();

    let pending: Vec<_> = (0..10)
        .map(|_| flight.work("Jack", || backend.score("Jack", Duration::from_millis(50))))
        .collect();

    for fut in pending {
        assert_eq!(fut.await, "score:Jack");
    }
    assert_eq!(backend.queries(), 1);
}

#[tokio::test]
async fn finished_work_is_not_remembered() {
    let backend = Backend::default();
    let flight = Coalescer::new();

    for round in 1..=3 {
        let value = flight.work("Sam", || backend.score("Sam", Duration::ZERO)).await;
        assert_eq!(value, "score:Sam");
        assert_eq!(backend.queries(), round);
    }
    assert_eq!(flight.in_flight(), 0);
}

#[tokio::test]
async fn keys_do_not_block_each_other() {
    let backend = Backend::default();
    let flight = Coalescer::new();
    let names = ["Tom", "Jack", "Sam", "Ann", "Bob"];

    let values = join_all(
        names
            .iter()
            .map(|name| flight.work(*name, || backend.score(name, Duration::from_millis(20)))),
    )
    .await;

    assert_eq!(values, names.iter().map(|n| format!("score:{n}")).collect::<Vec<_>>());
    assert_eq!(backend.queries(), names.len());
}

#[tokio::test]
async fn failures_reach_every_overlapping_caller() {
    let attempts = AtomicUsize::default();
    let flight: Coalescer<&str, Result<String, String>> = Coalescer::new();

    let outcomes = join_all((0..8).map(|_| {
        flight.work("Tom", || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Err("Tom not exist".to_string())
        })
    }))
    .await;

    assert!(outcomes.iter().all(|o| o.as_deref().map_err(String::as_str) == Err("Tom not exist")));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    let retry = flight.work("Tom", || async { Ok("630".to_string()) }).await;
    assert_eq!(retry.as_deref(), Ok("630"));
}

#[tokio::test]
async fn struct_keys_are_supported() {
    #[derive(Clone, PartialEq, Eq, Hash)]
    struct GroupKey {
        group: &'static str,
        key: &'static str,
    }

    let flight = Coalescer::new();
    let key = GroupKey { group: "scores", key: "Tom" };
    assert_eq!((key.group, key.key), ("scores", "Tom"));

    let a = flight.work(key.clone(), || async { 630 });
    let b = flight.work(key, || async { 0 });

    assert_eq!(tokio::join!(a, b), (630, 630));
}

#[tokio::test]
async fn follower_joined_in_time_never_runs_its_closure() {
    let flight = Coalescer::new();

    let leader = flight.work("Tom".to_string(), || async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        "630".to_string()
    });
    let follower = flight.work("Tom".to_string(), never_finishes);

    assert_eq!(leader.await, "630");
    // The follower registered before completion, so it sees the leader's output even when
    // polled long after the record was retired.
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(follower.await, "630");
}

#[tokio::test]
async fn dropped_leader_hands_over_to_the_next_caller() {
    let flight = Coalescer::new();

    let abandoned = flight.work("Tom".to_string(), never_finishes);
    tokio::time::timeout(Duration::from_millis(10), abandoned)
        .await
        .expect_err("abandoned work never finishes");

    let value = flight.work("Tom".to_string(), || async { "630".to_string() }).await;
    assert_eq!(value, "630");
    assert_eq!(flight.in_flight(), 0);
}

#[tokio::test]
async fn cancelled_callers_leave_nothing_pending() {
    let flight: Coalescer<String, String> = Coalescer::new();

    for i in 0..50 {
        let call = flight.work(format!("key-{i}"), never_finishes);
        tokio::time::timeout(Duration::from_millis(1), call)
            .await
            .expect_err("work never finishes");
    }

    assert_eq!(flight.in_flight(), 0);
}

#[tokio::test]
async fn cancelled_leader_keeps_the_record_for_waiting_followers() {
    let flight = Coalescer::new();

    let leader = flight.work("Tom".to_string(), never_finishes);
    let follower = flight.work("Tom".to_string(), || async { "630".to_string() });
    tokio::time::timeout(Duration::from_millis(5), leader)
        .await
        .expect_err("leader never finishes");

    assert_eq!(flight.in_flight(), 1);
    assert_eq!(follower.await, "630");
    assert_eq!(flight.in_flight(), 0);
}

#[tokio::test]
async fn live_leader_wins_over_a_stuck_follower() {
    let flight = Coalescer::new();
    let started = tokio::time::Instant::now();

    let leader = flight.work("Tom".to_string(), || async {
        tokio::time::sleep(Duration::from_millis(150)).await;
        "630".to_string()
    });
    let follower = flight.work("Tom".to_string(), never_finishes);

    assert_eq!(tokio::join!(leader, follower), ("630".to_string(), "630".to_string()));
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn panicking_leader_hands_over_to_a_follower() {
    let follower_runs = AtomicUsize::default();
    let flight: Arc<Coalescer<String, String>> = Arc::new(Coalescer::new());

    let leader = {
        let flight = Arc::clone(&flight);
        tokio::spawn(async move {
            flight
                .work("Tom".to_string(), || async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    panic!("backend crashed");
                    #[expect(unreachable_code, reason = "gives the block its String type")]
                    String::new()
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    let follower = flight.work("Tom".to_string(), || async {
        follower_runs.fetch_add(1, Ordering::SeqCst);
        "630".to_string()
    });

    leader.await.expect_err("leader task should panic");
    assert_eq!(follower.await, "630");
    assert_eq!(follower_runs.load(Ordering::SeqCst), 1);
    assert_eq!(flight.in_flight(), 0);
}

#[tokio::test]
async fn in_flight_tracks_pending_keys() {
    let flight: Coalescer<&str, u32> = Coalescer::new();
    assert_eq!(format!("{flight:?}"), "Coalescer { in_flight: 0 }");

    let tom = flight.work("Tom", || async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        630
    });
    let jack = flight.work("Jack", || async { 589 });
    assert_eq!(flight.in_flight(), 2);

    assert_eq!(tokio::join!(tom, jack), (630, 589));
    assert_eq!(flight.in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn spawned_tasks_share_one_execution() {
    let backend = Arc::new(Backend::default());
    let flight: Arc<Coalescer<String, String>> = Arc::new(Coalescer::new());

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let flight = Arc::clone(&flight);
            let backend = Arc::clone(&backend);
            tokio::spawn(async move {
                flight
                    .work("Tom".to_string(), || async move {
                        backend.score("Tom", Duration::from_millis(100)).await
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.expect("task panicked"), "score:Tom");
    }
    assert_eq!(backend.queries(), 1);
}

// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Shows a burst of identical requests collapsing into one backend call.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use herdflight::Coalescer;

#[tokio::main]
async fn main() {
    let group = Arc::new(Coalescer::<String, String>::new());
    let executions = Arc::new(AtomicUsize::new(0));

    println!("Starting 5 overlapping requests for scores:Tom...\n");

    let mut handles = Vec::new();
    for i in 1..=5 {
        let group = Arc::clone(&group);
        let counter = Arc::clone(&executions);
        handles.push(tokio::spawn(async move {
            let start = tokio::time::Instant::now();
            let result = group
                .work("scores:Tom".to_string(), || async {
                    let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    println!("  [Request {i}] leading, querying the slow database (execution #{count})");
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "630".to_string()
                })
                .await;
            println!("  [Request {i}] got {result} after {:?}", start.elapsed());
        }));

        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    for handle in handles {
        handle.await.expect("Task panicked");
    }

    let total = executions.load(Ordering::SeqCst);
    println!("\nDatabase queried {total} time(s) for 5 requests.");
}

// Copyright (c) The Herdcache Project Authors.
// Licensed under the MIT License.

//! Serves a "scores" group from a slow backing source and shows a burst of
//! concurrent readers sharing a single load.

use std::time::Duration;

use futures::future::join_all;
use herdcache::testing::MockLoader;
use herdcache::{Error, GroupRegistry};
use tick::Clock;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let clock = Clock::new_tokio();
    let registry = GroupRegistry::new(clock.clone());

    let db = MockLoader::with_data([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
        .with_latency(clock, Duration::from_millis(200));
    let scores = registry.create("scores", 2 << 10, db.clone())?;

    println!("100 concurrent readers ask for Tom...");
    let results = join_all((0..100).map(|_| scores.get("Tom"))).await;
    let ok = results.iter().filter(|r| r.is_ok()).count();
    println!("  {ok} readers got a value, the database was queried {} time(s)", db.call_count());

    let value = scores.get("Tom").await?;
    println!("Tom = {value} (served from the local store)");

    match scores.get("Alice").await {
        Ok(value) => println!("Alice = {value}"),
        Err(e) => println!("Alice failed: {e}"),
    }

    println!("{:#?}", scores.stats());
    Ok(())
}

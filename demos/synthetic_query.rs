//! Generates a larger synthetic network and times a single query against it,
//! independent of the criterion benchmark harness (spec's test-tooling
//! expectations call out a runnable demo alongside the benches).

use std::time::Instant;

use dev_utils::{build_synthetic_scenario, GenerationConfig};
use raptor::{query, DEFAULT_MAX_ROUNDS};

fn main() {
    let config = GenerationConfig {
        num_stops: 5_000,
        num_routes: 600,
        ..GenerationConfig::default()
    };
    let scenario = build_synthetic_scenario(&config, 1234);
    scenario.network.log_stats();

    let start = Instant::now();
    let result = query(
        &scenario.network,
        &scenario.origin,
        &scenario.destination,
        scenario.departure,
        DEFAULT_MAX_ROUNDS,
    );
    let elapsed = start.elapsed();

    match result {
        Ok(Some(journey)) => {
            println!("query took {elapsed:?}");
            print!("{journey}");
        }
        Ok(None) => println!("query took {elapsed:?}; no journey found"),
        Err(e) => println!("query error: {e}"),
    }
}

use dev_utils::{build_synthetic_scenario, GenerationConfig};
use raptor::{query, DEFAULT_MAX_ROUNDS};

fn main() {
    let scenario = build_synthetic_scenario(&GenerationConfig::default(), 7);
    scenario.network.log_stats();

    match query(
        &scenario.network,
        &scenario.origin,
        &scenario.destination,
        scenario.departure,
        DEFAULT_MAX_ROUNDS,
    ) {
        Ok(Some(journey)) => print!("{journey}"),
        Ok(None) => println!("No journey found."),
        Err(e) => println!("Query error: {e}"),
    }
}

use std::io::{stdout, Write};

use dev_utils::{build_synthetic_network, GenerationConfig};
use raptor::{query, utils, Network, DEFAULT_MAX_ROUNDS};

fn get_stop_from_user(network: &Network, prompt: &str) -> Result<String, std::io::Error> {
    loop {
        print!("Where are you {prompt} (e.g. stop-0)? ");
        stdout().flush()?;
        let mut stop_id = String::new();
        std::io::stdin().read_line(&mut stop_id)?;
        let stop_id = stop_id.trim().to_string();
        if network.stop_idx(&stop_id).is_some() {
            return Ok(stop_id);
        }
        println!("Stop not found. Please try again.");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = fastrand::Rng::with_seed(0);
    let network = build_synthetic_network(&GenerationConfig::default(), &mut rng);
    network.log_stats();
    println!();

    loop {
        let start = get_stop_from_user(&network, "starting")?;
        let start_time = loop {
            let mut time_str = String::new();
            print!("What time are you starting? (HH:MM): ");
            stdout().flush()?;
            std::io::stdin().read_line(&mut time_str)?;
            let mut time_str = time_str.trim_end().to_string();
            time_str += ":00";
            match utils::parse_time(&time_str) {
                Ok(time) => break time,
                Err(e) => println!("Invalid time format: {e}. Please try again."),
            }
        };
        let end = get_stop_from_user(&network, "going")?;

        println!();
        println!("Start: {start} at time {}", utils::format_time(start_time));
        println!("End: {end}");
        println!();

        let num_iterations = 10;
        let query_start = std::time::Instant::now();
        let mut result = None;
        for _ in 0..num_iterations {
            result = Some(query(&network, &start, &end, start_time, DEFAULT_MAX_ROUNDS)?);
        }
        println!("Query took {:?}", query_start.elapsed() / num_iterations);
        match result.flatten() {
            Some(journey) => print!("{journey}"),
            None => println!("No journey found."),
        }

        break;
    }

    Ok(())
}

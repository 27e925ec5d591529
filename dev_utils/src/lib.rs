//! Synthetic network generation shared by the benches and demos: a randomly
//! generated but internally consistent timetable, built through the same
//! [`raptor::NetworkBuilder`] validation path real data goes through.

use raptor::{Network, NetworkBuilder, RouteRecord, StopRecord, Timestamp, TripRecord};

pub struct GenerationConfig {
    pub num_stops: usize,
    pub num_routes: usize,
    pub min_stops_per_route: usize,
    pub max_stops_per_route: usize,
    pub trips_per_route: usize,
    pub headway: Timestamp,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            num_stops: 500,
            num_routes: 60,
            min_stops_per_route: 4,
            max_stops_per_route: 20,
            trips_per_route: 40,
            headway: 600, // 10 minutes
        }
    }
}

/// Builds a synthetic network from `config` using `rng`. Each route walks a
/// random, distinct sequence of stops with random 1-5 minute hop times; each
/// trip on a route repeats that sequence at a fixed headway starting from
/// service-start (00:00:00), so [`NetworkBuilder`]'s monotonic-departure and
/// no-repeated-stop invariants hold by construction.
pub fn build_synthetic_network(config: &GenerationConfig, rng: &mut fastrand::Rng) -> Network {
    let stops: Vec<StopRecord> = (0..config.num_stops)
        .map(|i| StopRecord {
            id: format!("stop-{i}"),
            name: format!("Stop {i}"),
            location: None,
        })
        .collect();

    let mut routes = Vec::with_capacity(config.num_routes);
    let mut trips = Vec::new();

    for route_idx in 0..config.num_routes {
        let route_id = format!("route-{route_idx}");
        let stops_on_route =
            rng.usize(config.min_stops_per_route..=config.max_stops_per_route).min(config.num_stops);

        let mut available: Vec<usize> = (0..config.num_stops).collect();
        rng.shuffle(&mut available);
        let chosen: Vec<usize> = available.into_iter().take(stops_on_route).collect();

        let hop_times: Vec<u32> = (1..chosen.len()).map(|_| rng.u32(60..=300)).collect();

        routes.push(RouteRecord {
            id: route_id.clone(),
            name: format!("Route {route_idx}"),
            stops: chosen.iter().map(|&s| format!("stop-{s}")).collect(),
        });

        for trip_idx in 0..config.trips_per_route {
            let base = trip_idx as u32 * config.headway;
            let mut offset = base;
            let mut stop_times = Vec::with_capacity(chosen.len());
            stop_times.push((offset, offset));
            for &hop in &hop_times {
                offset += hop;
                let arrival = offset;
                let departure = arrival + 30; // fixed dwell
                stop_times.push((arrival, departure));
                offset = departure;
            }
            trips.push(TripRecord {
                id: format!("{route_id}-trip-{trip_idx}"),
                route_id: route_id.clone(),
                headsign: None,
                stop_times,
            });
        }
    }

    NetworkBuilder::build(stops, routes, trips)
        .expect("synthetic generator must produce a network satisfying every builder invariant")
}

/// A network plus a representative origin/destination/departure-time query
/// for benches and demos to reuse.
pub struct SyntheticScenario {
    pub network: Network,
    pub origin: String,
    pub destination: String,
    pub departure: Timestamp,
}

pub fn build_synthetic_scenario(config: &GenerationConfig, seed: u64) -> SyntheticScenario {
    let mut rng = fastrand::Rng::with_seed(seed);
    let network = build_synthetic_network(config, &mut rng);
    let origin = rng.usize(0..config.num_stops);
    let mut destination = rng.usize(0..config.num_stops);
    while destination == origin {
        destination = rng.usize(0..config.num_stops);
    }
    SyntheticScenario {
        origin: format!("stop-{origin}"),
        destination: format!("stop-{destination}"),
        departure: 8 * 3600,
        network,
    }
}

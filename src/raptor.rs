//! The round scanner and query orchestrator.

use crate::journey::{Boarding, Journey, Label};
use crate::network::{GlobalTripIndex, Network, RouteIdx, StopIdx, Timestamp, TripOrder};

/// Number of rounds run when a caller doesn't specify one: up to 4
/// transfers.
pub const DEFAULT_MAX_ROUNDS: usize = 5;

#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("unknown stop: {0}")]
    UnknownStop(String),
    #[error("invalid query input: {0}")]
    InputDomain(String),
}

/// Earliest-trip finder: the lowest trip order `t < upper_bound` of `route`
/// whose departure at `stop_order` is >= `ready_time`. Trips are packed
/// sorted ascending by departure (see [`crate::network::NetworkBuilder`]), so
/// this is a binary search rather than a linear scan. `upper_bound` lets the
/// round scanner restrict the search to trips earlier than the one currently
/// boarded, which is what realizes the boarding swap below.
fn earliest_trip_before(
    network: &Network,
    route: RouteIdx,
    stop_order: usize,
    ready_time: Timestamp,
    upper_bound: usize,
) -> Option<TripOrder> {
    let mut lo = 0usize;
    let mut hi = upper_bound;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let departure = network.stop_time_at(route, mid, stop_order).departure;
        if departure < ready_time {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    (lo < upper_bound).then_some(lo as TripOrder)
}

/// One route scan: walk `route`'s stops from its earliest marked stop,
/// propagating arrivals from the currently-boarded trip and swapping to an
/// earlier trip whenever one becomes catchable.
fn scan_route(
    network: &Network,
    route: RouteIdx,
    earliest_stop_order: usize,
    round: u16,
    prev_arrival: &[Timestamp],
    tau_star: &mut [Label],
    marked: &mut [bool],
    destination: StopIdx,
) {
    let route_stops = network.route_stops(route);
    let num_trips = network.route(route).num_trips();

    let mut boarding: Option<Boarding> = None;
    // Exclusive upper bound for the earliest-trip search: starts unrestricted,
    // then tightens to the currently boarded trip's order, since a swap can
    // only ever move to an earlier trip within one route scan.
    let mut boarded_trip_order = num_trips;

    for stop_order in earliest_stop_order..route_stops.len() {
        let stop = route_stops[stop_order];

        // Propagate using whatever trip we boarded upstream, before
        // considering whether to (re)board here: a stop can only improve
        // via the trip already in hand, not one we might swap to here.
        if let Some(current) = &boarding {
            let arrival = network
                .stop_time_at(route, current.trip.trip_order as usize, stop_order)
                .arrival;
            let best_at_destination = tau_star[destination as usize].arrival;
            if arrival < tau_star[stop as usize].arrival.min(best_at_destination) {
                tau_star[stop as usize] = Label {
                    arrival,
                    boarding: Some(current.clone()),
                    round,
                };
                marked[stop as usize] = true;
            }
        }

        let ready_time = prev_arrival[stop as usize];
        if ready_time == Timestamp::MAX {
            continue; // unreachable using one fewer leg; nothing to board with here
        }
        if let Some(found) =
            earliest_trip_before(network, route, stop_order, ready_time, boarded_trip_order)
        {
            let departure = network.stop_time_at(route, found as usize, stop_order).departure;
            boarding = Some(Boarding {
                boarded_stop: stop,
                boarded_stop_order: stop_order as u32,
                boarded_time: departure,
                trip: GlobalTripIndex {
                    route_idx: route,
                    trip_order: found,
                },
            });
            boarded_trip_order = found as usize;
        }
    }
}

/// The round scanner: runs up to `max_rounds` rounds of label relaxation and
/// returns the best-ever label per stop.
fn run_rounds(
    network: &Network,
    origin: StopIdx,
    departure: Timestamp,
    destination: StopIdx,
    max_rounds: usize,
) -> Vec<Label> {
    let num_stops = network.num_stops();
    let mut tau_star = vec![Label::default(); num_stops];
    tau_star[origin as usize] = Label {
        arrival: departure,
        boarding: None,
        round: 0,
    };

    let mut marked = vec![false; num_stops];
    marked[origin as usize] = true;

    let mut earliest_stop_for_route: Vec<Option<usize>> = vec![None; network.num_routes()];

    for round in 1..=max_rounds {
        if !marked.iter().any(|&m| m) {
            break; // nothing improved last round; nothing left to propagate
        }

        // Best arrival using at most `round - 1` legs, frozen for the
        // duration of this round. `tau_star` itself keeps mutating as this
        // round's scan runs, so boarding decisions must read this snapshot,
        // not `tau_star` directly.
        let prev_arrival: Vec<Timestamp> = tau_star.iter().map(|l| l.arrival).collect();

        earliest_stop_for_route.iter_mut().for_each(|slot| *slot = None);
        for stop in (0..num_stops).filter(|&s| marked[s]) {
            for &route in network.routes_serving(stop as StopIdx) {
                let stop_order = network
                    .route_stops(route)
                    .iter()
                    .position(|&s| s as usize == stop)
                    .expect("marked stop must be on every route that serves it");
                let slot = &mut earliest_stop_for_route[route as usize];
                if slot.map_or(true, |current| stop_order < current) {
                    *slot = Some(stop_order);
                }
            }
        }
        marked.iter_mut().for_each(|m| *m = false);

        for (route, earliest_order) in earliest_stop_for_route
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.map(|o| (i as RouteIdx, o)))
        {
            scan_route(
                network,
                route,
                earliest_order,
                round as u16,
                &prev_arrival,
                &mut tau_star,
                &mut marked,
                destination,
            );
        }
    }

    tau_star
}

/// Query orchestrator: the public entry point.
///
/// `origin`/`destination` are stop identifiers. Returns `Ok(None)` if no
/// journey exists within `max_rounds`, `Err` for an unknown stop or invalid
/// input domain.
pub fn query<'a>(
    network: &'a Network,
    origin: &str,
    destination: &str,
    departure: Timestamp,
    max_rounds: usize,
) -> Result<Option<Journey<'a>>, QueryError> {
    let origin_idx = network
        .stop_idx(origin)
        .ok_or_else(|| QueryError::UnknownStop(origin.to_string()))?;
    let destination_idx = network
        .stop_idx(destination)
        .ok_or_else(|| QueryError::UnknownStop(destination.to_string()))?;
    if max_rounds < 1 {
        return Err(QueryError::InputDomain(format!(
            "max_rounds must be >= 1, got {max_rounds}"
        )));
    }

    if origin_idx == destination_idx {
        return Ok(Some(Journey::same_stop(network, origin_idx, departure)));
    }

    let tau_star = run_rounds(network, origin_idx, departure, destination_idx, max_rounds);
    Ok(Journey::reconstruct(
        &tau_star,
        network,
        origin_idx,
        destination_idx,
        departure,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NetworkBuilder, RouteRecord, StopRecord, TripRecord};

    fn stop(id: &str) -> StopRecord {
        StopRecord {
            id: id.into(),
            name: id.into(),
            location: None,
        }
    }

    fn route(id: &str, stops: &[&str]) -> RouteRecord {
        RouteRecord {
            id: id.into(),
            name: id.into(),
            stops: stops.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn trip(id: &str, route_id: &str, stop_times: &[(Timestamp, Timestamp)]) -> TripRecord {
        TripRecord {
            id: id.into(),
            route_id: route_id.into(),
            headsign: None,
            stop_times: stop_times.to_vec(),
        }
    }

    // Scenario A — single leg.
    #[test]
    fn scenario_a_single_leg() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B")],
            vec![route("R1", &["A", "B"])],
            vec![trip("T1", "R1", &[(28800, 28800), (29400, 29400)])],
        )
        .unwrap();

        let journey = query(&network, "A", "B", 28800, DEFAULT_MAX_ROUNDS)
            .unwrap()
            .expect("journey expected");
        assert_eq!(journey.legs.len(), 1);
        assert_eq!(journey.arrival, 29400);
        assert_eq!(journey.legs[0].from_stop, network.stop_idx("A").unwrap());
        assert_eq!(journey.legs[0].to_stop, network.stop_idx("B").unwrap());
    }

    // Scenario B — one transfer.
    #[test]
    fn scenario_b_one_transfer() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B"), stop("C"), stop("D")],
            vec![route("R1", &["A", "B", "C"]), route("R2", &["B", "D"])],
            vec![
                trip(
                    "T1",
                    "R1",
                    &[(28800, 28800), (29000, 29400), (30000, 30000)],
                ),
                trip("T2", "R2", &[(29700, 29700), (30300, 30300)]),
            ],
        )
        .unwrap();

        let journey = query(&network, "A", "D", 28800, DEFAULT_MAX_ROUNDS)
            .unwrap()
            .expect("journey expected");
        assert_eq!(journey.legs.len(), 2);
        assert_eq!(journey.arrival, 30300);
        assert_eq!(journey.num_transfers(), 1);
        assert_eq!(journey.legs[0].to_stop, network.stop_idx("B").unwrap());
        assert_eq!(journey.legs[1].from_stop, network.stop_idx("B").unwrap());
    }

    // Scenario C — wait dominates: the only onward trip departs much later,
    // but it must still be chosen since it is the only option.
    #[test]
    fn scenario_c_wait_dominates() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B"), stop("C"), stop("D")],
            vec![route("R1", &["A", "B", "C"]), route("R2", &["B", "D"])],
            vec![
                trip(
                    "T1",
                    "R1",
                    &[(28800, 28800), (29000, 29400), (30000, 30000)],
                ),
                trip("T2", "R2", &[(35000, 35000), (35600, 35600)]),
            ],
        )
        .unwrap();

        let journey = query(&network, "A", "D", 28800, DEFAULT_MAX_ROUNDS)
            .unwrap()
            .expect("journey expected");
        assert_eq!(journey.arrival, 35600);
    }

    // Scenario D — no journey.
    #[test]
    fn scenario_d_no_journey() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B"), stop("D")],
            vec![route("R1", &["A", "B"])],
            vec![trip("T1", "R1", &[(28800, 28800), (29400, 29400)])],
        )
        .unwrap();

        let journey = query(&network, "A", "D", 28800, DEFAULT_MAX_ROUNDS).unwrap();
        assert!(journey.is_none());
    }

    // Scenario E — early termination matches the result of running with a
    // much larger round budget.
    #[test]
    fn scenario_e_early_termination_matches_unbounded() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B"), stop("C"), stop("D")],
            vec![route("R1", &["A", "B", "C"]), route("R2", &["B", "D"])],
            vec![
                trip(
                    "T1",
                    "R1",
                    &[(28800, 28800), (29000, 29400), (30000, 30000)],
                ),
                trip("T2", "R2", &[(29700, 29700), (30300, 30300)]),
            ],
        )
        .unwrap();

        let small = query(&network, "A", "D", 28800, 2).unwrap().unwrap();
        let large = query(&network, "A", "D", 28800, 50).unwrap().unwrap();
        assert_eq!(small.arrival, large.arrival);
        assert_eq!(small.legs.len(), large.legs.len());
    }

    // Scenario F — boarding swap: boarding from the origin stop itself must
    // pick the trip that is actually catchable there, not whichever trip a
    // scan starting further upstream happened to board.
    #[test]
    fn scenario_f_boarding_swap() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B"), stop("C")],
            vec![route("R1", &["A", "B", "C"])],
            vec![
                trip(
                    "T1_early",
                    "R1",
                    &[(28000, 28000), (28600, 28600), (29200, 29200)],
                ),
                trip(
                    "T1_late",
                    "R1",
                    &[(28800, 28800), (29400, 29400), (30000, 30000)],
                ),
            ],
        )
        .unwrap();

        let from_a = query(&network, "A", "C", 28500, DEFAULT_MAX_ROUNDS)
            .unwrap()
            .unwrap();
        assert_eq!(from_a.arrival, 30000); // only T1_late is catchable at A by 28500

        let from_b = query(&network, "B", "C", 28500, DEFAULT_MAX_ROUNDS)
            .unwrap()
            .unwrap();
        assert_eq!(from_b.arrival, 29200); // T1_early is still catchable at B
    }

    #[test]
    fn same_stop_shortcut() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B")],
            vec![route("R1", &["A", "B"])],
            vec![trip("T1", "R1", &[(28800, 28800), (29400, 29400)])],
        )
        .unwrap();

        let journey = query(&network, "A", "A", 1000, DEFAULT_MAX_ROUNDS)
            .unwrap()
            .unwrap();
        assert!(journey.legs.is_empty());
        assert_eq!(journey.arrival, 1000);
        assert_eq!(journey.departure, 1000);
    }

    #[test]
    fn unknown_stop_is_reported() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B")],
            vec![route("R1", &["A", "B"])],
            vec![trip("T1", "R1", &[(0, 0), (600, 600)])],
        )
        .unwrap();

        let err = query(&network, "A", "nonexistent", 0, DEFAULT_MAX_ROUNDS).unwrap_err();
        assert!(matches!(err, QueryError::UnknownStop(_)));
    }

    #[test]
    fn max_rounds_below_one_is_rejected() {
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B")],
            vec![route("R1", &["A", "B"])],
            vec![trip("T1", "R1", &[(0, 0), (600, 600)])],
        )
        .unwrap();

        let err = query(&network, "A", "B", 0, 0).unwrap_err();
        assert!(matches!(err, QueryError::InputDomain(_)));
    }

    #[test]
    fn monotonic_in_max_rounds() {
        // Three legs are required to get from A to D; increasing max_rounds
        // should never produce a worse (or missing) arrival.
        let network = NetworkBuilder::build(
            vec![stop("A"), stop("B"), stop("C"), stop("D")],
            vec![
                route("R1", &["A", "B"]),
                route("R2", &["B", "C"]),
                route("R3", &["C", "D"]),
            ],
            vec![
                trip("T1", "R1", &[(0, 0), (600, 600)]),
                trip("T2", "R2", &[(700, 700), (1300, 1300)]),
                trip("T3", "R3", &[(1400, 1400), (2000, 2000)]),
            ],
        )
        .unwrap();

        let mut last_arrival = None;
        for max_rounds in 1..=4 {
            let result = query(&network, "A", "D", 0, max_rounds).unwrap();
            if let Some(journey) = result {
                if let Some(prev) = last_arrival {
                    assert!(journey.arrival <= prev);
                }
                last_arrival = Some(journey.arrival);
            }
        }
        assert_eq!(last_arrival, Some(2000));
    }
}

//! Journey legs, the result type, and the reconstructor that turns
//! round-indexed labels into a chronological leg sequence (spec §4.4).

use crate::network::{GlobalTripIndex, Network, RouteIdx, StopIdx, Timestamp};
use crate::utils;
use std::fmt::Display;

/// Where and when the current trip (if any) was boarded, for one round's
/// label at one stop.
#[derive(Clone)]
pub(crate) struct Boarding {
    pub boarded_stop: StopIdx,
    pub boarded_stop_order: u32,
    pub boarded_time: Timestamp,
    pub trip: GlobalTripIndex,
}

/// The best-known arrival at a stop using at most `round` vehicle legs
/// (spec §3 `Label`). `round` is carried on the label itself — rather than
/// keeping a full `labels[k]` table per round — so a single best-so-far
/// table can support both the tie-break in §4.4 and the strictly-decreasing
/// assertion in reconstruction (spec §9 Open Question 2).
#[derive(Clone)]
pub(crate) struct Label {
    pub arrival: Timestamp,
    pub boarding: Option<Boarding>,
    pub round: u16,
}

impl Default for Label {
    fn default() -> Self {
        Label {
            arrival: Timestamp::MAX,
            boarding: None,
            round: 0,
        }
    }
}

/// One vehicle leg of a journey: board `trip` at `from_stop`, ride to
/// `to_stop`.
pub struct Leg {
    pub from_stop: StopIdx,
    pub from_stop_order: u32,
    pub departure: Timestamp,
    pub to_stop: StopIdx,
    pub to_stop_order: u32,
    pub arrival: Timestamp,
    pub trip: GlobalTripIndex,
}

/// A complete origin-to-destination result (spec §3 `Journey`).
pub struct Journey<'a> {
    pub origin: StopIdx,
    pub destination: StopIdx,
    pub departure: Timestamp,
    pub arrival: Timestamp,
    pub legs: Vec<Leg>,
    network: &'a Network,
}

impl<'a> Journey<'a> {
    /// Zero-leg journey for the `origin == destination` shortcut (spec §4.4).
    pub(crate) fn same_stop(network: &'a Network, stop: StopIdx, at: Timestamp) -> Self {
        Journey {
            origin: stop,
            destination: stop,
            departure: at,
            arrival: at,
            legs: Vec::new(),
            network,
        }
    }

    pub fn num_transfers(&self) -> usize {
        self.legs.len().saturating_sub(1)
    }

    fn route_stop_order(network: &Network, route: RouteIdx, from_order: usize, stop: StopIdx) -> u32 {
        network.route_stops(route)[from_order..]
            .iter()
            .position(|&s| s == stop)
            .map(|offset| (from_order + offset) as u32)
            .expect("arrival stop not found on its own trip's route — network corruption")
    }

    /// Walks `tau_star`'s back-pointers from `destination` to `origin`,
    /// reversing the leg list into chronological order. Returns `None` if
    /// the destination was never reached. Panics on a label whose `boarding`
    /// is missing above round 0 — a corrupted network or scanner, per spec
    /// §4.4/§7 `InvariantViolation`.
    pub(crate) fn reconstruct(
        tau_star: &[Label],
        network: &'a Network,
        origin: StopIdx,
        destination: StopIdx,
        departure: Timestamp,
    ) -> Option<Self> {
        if tau_star[destination as usize].boarding.is_none() {
            return None;
        }

        let mut legs = Vec::new();
        let mut current_stop = destination;
        let mut next_round = u16::MAX;

        loop {
            if current_stop == origin {
                break;
            }
            let label = &tau_star[current_stop as usize];
            let boarding = label.boarding.as_ref().unwrap_or_else(|| {
                panic!(
                    "reconstruction invariant violated: stop {} has no boarding at round {} \
                     but is not the origin",
                    current_stop, label.round
                )
            });
            assert!(
                label.round < next_round,
                "reconstruction invariant violated: round did not strictly decrease walking back \
                 through stop {current_stop} (label round {}, previous leg's round {next_round})",
                label.round
            );
            next_round = label.round;

            let route = boarding.trip.route_idx;
            let to_stop_order = Self::route_stop_order(
                network,
                route,
                boarding.boarded_stop_order as usize,
                current_stop,
            );

            legs.push(Leg {
                from_stop: boarding.boarded_stop,
                from_stop_order: boarding.boarded_stop_order,
                departure: boarding.boarded_time,
                to_stop: current_stop,
                to_stop_order,
                arrival: label.arrival,
                trip: boarding.trip,
            });

            current_stop = boarding.boarded_stop;
        }

        legs.reverse();

        Some(Journey {
            origin,
            destination,
            departure,
            arrival: tau_star[destination as usize].arrival,
            legs,
            network,
        })
    }
}

impl Display for Journey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.legs.is_empty() {
            return writeln!(f, "no journey found");
        }
        for leg in &self.legs {
            let route = &self.network.route(leg.trip.route_idx);
            writeln!(
                f,
                "board {} at {} ({}), arrive {} at {}",
                self.network.stop(leg.from_stop).name,
                utils::format_time(leg.departure),
                route.name,
                self.network.stop(leg.to_stop).name,
                utils::format_time(leg.arrival),
            )?;
        }
        Ok(())
    }
}

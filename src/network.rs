//! The timetable network: dense, array-backed value objects for stops,
//! routes and trips, plus the builder that packs validated input records
//! into that layout.
//!
//! Routes and trips are not individually heap-allocated: a route is a span
//! into `route_stops`/`stop_times`, and a trip is a further sub-span of a
//! route's stop-times range. All cross-references are dense `u32` indices;
//! string identifiers are retained on `Stop`/`Route` only for display and
//! lookup.

use std::collections::HashMap;
use std::ops::Range;

/// Seconds since the service day's 00:00:00. Values >= 86400 encode trips
/// that cross midnight within a single service day; comparisons are plain
/// integer ordering, no wraparound.
pub type Timestamp = u32;

/// Dense index of a [`Stop`] within a [`Network`].
pub type StopIdx = u32;

/// Dense index of a [`Route`] within a [`Network`].
pub type RouteIdx = u32;

/// Position of a trip within its route's trip list (trips are packed sorted
/// ascending by departure at the route's first stop).
pub type TripOrder = u32;

/// Identifies one scheduled run: which route, and which position within
/// that route's (departure-sorted) trip list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlobalTripIndex {
    pub route_idx: RouteIdx,
    pub trip_order: TripOrder,
}

/// Optional stop location. Storage only — the core has no foot-transfer or
/// distance geometry (out of scope; see spec Non-goals).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A scheduled arrival/departure pair at one stop on one trip.
#[derive(Debug, Clone, Copy)]
pub struct StopTime {
    pub arrival: Timestamp,
    pub departure: Timestamp,
}

#[derive(Debug)]
pub struct Stop {
    pub id: Box<str>,
    pub name: Box<str>,
    pub location: Option<Coordinates>,
    routes_idx: usize,
    num_routes: usize,
}

impl Stop {
    /// Routes serving this stop, in deterministic first-encounter order,
    /// de-duplicated.
    pub fn routes<'a>(&self, stop_routes: &'a [RouteIdx]) -> &'a [RouteIdx] {
        &stop_routes[self.routes_idx..self.routes_idx + self.num_routes]
    }
}

pub struct Route {
    pub id: Box<str>,
    pub name: Box<str>,
    num_stops: usize,
    num_trips: usize,
    route_stops_idx: usize,
    stop_times_idx: usize,
    trip_ids: Vec<Box<str>>,
    headsigns: Vec<Option<Box<str>>>,
}

impl Route {
    pub fn num_stops(&self) -> usize {
        self.num_stops
    }

    pub fn num_trips(&self) -> usize {
        self.num_trips
    }

    /// This route's stops, in timetable order.
    pub fn stops<'a>(&self, route_stops: &'a [StopIdx]) -> &'a [StopIdx] {
        &route_stops[self.route_stops_idx..self.route_stops_idx + self.num_stops]
    }

    /// Index of `stop` within this route's stop sequence, if it appears.
    pub fn stop_order_of(&self, route_stops: &[StopIdx], stop: StopIdx) -> Option<usize> {
        self.stops(route_stops).iter().position(|&s| s == stop)
    }

    fn trip_range(&self, trip_order: usize) -> Range<usize> {
        let start = self.stop_times_idx + trip_order * self.num_stops;
        start..start + self.num_stops
    }

    /// The stop-time row for one trip, aligned to this route's stop order.
    pub fn trip<'a>(&self, trip_order: usize, stop_times: &'a [StopTime]) -> &'a [StopTime] {
        &stop_times[self.trip_range(trip_order)]
    }

    pub fn trip_id(&self, trip_order: usize) -> &str {
        &self.trip_ids[trip_order]
    }

    pub fn headsign(&self, trip_order: usize) -> Option<&str> {
        self.headsigns[trip_order].as_deref()
    }
}

/// An immutable, indexed timetable. Built once by [`NetworkBuilder::build`],
/// then safe to query concurrently from any number of threads (no interior
/// mutability, no locks).
pub struct Network {
    pub(crate) stops: Vec<Stop>,
    pub(crate) routes: Vec<Route>,
    stop_index: HashMap<Box<str>, StopIdx>,
    pub(crate) route_stops: Vec<StopIdx>,
    pub(crate) stop_times: Vec<StopTime>,
    stop_routes: Vec<RouteIdx>,
}

impl Network {
    pub fn num_stops(&self) -> usize {
        self.stops.len()
    }

    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn stop(&self, idx: StopIdx) -> &Stop {
        &self.stops[idx as usize]
    }

    pub fn route(&self, idx: RouteIdx) -> &Route {
        &self.routes[idx as usize]
    }

    /// Resolves a stop's stable identifier to its dense index.
    pub fn stop_idx(&self, id: &str) -> Option<StopIdx> {
        self.stop_index.get(id).copied()
    }

    pub fn routes_serving(&self, stop: StopIdx) -> &[RouteIdx] {
        self.stops[stop as usize].routes(&self.stop_routes)
    }

    pub fn route_stops(&self, route: RouteIdx) -> &[StopIdx] {
        self.routes[route as usize].stops(&self.route_stops)
    }

    pub fn trip(&self, route: RouteIdx, trip_order: TripOrder) -> &[StopTime] {
        self.routes[route as usize].trip(trip_order as usize, &self.stop_times)
    }

    pub(crate) fn stop_time_at(&self, route: RouteIdx, trip_order: usize, stop_order: usize) -> StopTime {
        self.routes[route as usize].trip(trip_order, &self.stop_times)[stop_order]
    }

    pub fn log_stats(&self) {
        log::info!(
            "network has {} stops, {} routes, {} trips",
            self.stops.len(),
            self.routes.len(),
            self.routes.iter().map(|r| r.num_trips).sum::<usize>(),
        );
    }
}

/// One stop in the in-bound network description.
pub struct StopRecord {
    pub id: String,
    pub name: String,
    pub location: Option<Coordinates>,
}

/// One route in the in-bound network description: an identifier, display
/// name, and the ordered stop-id sequence it serves.
pub struct RouteRecord {
    pub id: String,
    pub name: String,
    pub stops: Vec<String>,
}

/// One scheduled trip on a route. `stop_times` must align 1:1 with the
/// owning [`RouteRecord`]'s `stops`.
pub struct TripRecord {
    pub id: String,
    pub route_id: String,
    pub headsign: Option<String>,
    pub stop_times: Vec<(Timestamp, Timestamp)>,
}

#[derive(thiserror::Error, Debug)]
pub enum NetworkError {
    #[error("duplicate stop id: {0}")]
    DuplicateStopId(String),
    #[error("duplicate route id: {0}")]
    DuplicateRouteId(String),
    #[error("route {route} has {n} stop(s), at least 2 are required")]
    RouteTooShort { route: String, n: usize },
    #[error("route {route} repeats stop {stop}")]
    RepeatedStopInRoute { route: String, stop: String },
    #[error("route {route} references unknown stop {stop}")]
    UnknownStopInRoute { route: String, stop: String },
    #[error("trip {trip} references unknown route {route}")]
    UnknownRouteForTrip { trip: String, route: String },
    #[error("trip {trip} has {got} stop-time(s), route {route} has {expected} stop(s)")]
    StopTimeCountMismatch {
        trip: String,
        route: String,
        expected: usize,
        got: usize,
    },
    #[error("trip {trip}: arrival ({arrival}) after departure ({departure}) at stop order {stop_order}")]
    ArrivalAfterDeparture {
        trip: String,
        stop_order: usize,
        arrival: Timestamp,
        departure: Timestamp,
    },
    #[error("trip {trip}: departure at stop order {stop_order} ({departure}) precedes departure at stop order {prev_stop_order} ({prev_departure})")]
    NonMonotonicStopTime {
        trip: String,
        prev_stop_order: usize,
        prev_departure: Timestamp,
        stop_order: usize,
        departure: Timestamp,
    },
}

/// Packs validated [`StopRecord`]/[`RouteRecord`]/[`TripRecord`] input into a
/// dense [`Network`]. It enforces every structural invariant the core
/// elsewhere is free to assume.
pub struct NetworkBuilder;

impl NetworkBuilder {
    pub fn build(
        stops: Vec<StopRecord>,
        routes: Vec<RouteRecord>,
        trips: Vec<TripRecord>,
    ) -> Result<Network, NetworkError> {
        let mut stop_index: HashMap<Box<str>, StopIdx> = HashMap::with_capacity(stops.len());
        let mut built_stops = Vec::with_capacity(stops.len());
        for stop in stops {
            let id: Box<str> = stop.id.into_boxed_str();
            if stop_index.contains_key(&id) {
                return Err(NetworkError::DuplicateStopId(id.into_string()));
            }
            stop_index.insert(id.clone(), built_stops.len() as StopIdx);
            built_stops.push(Stop {
                id,
                name: stop.name.into_boxed_str(),
                location: stop.location,
                routes_idx: 0,
                num_routes: 0,
            });
        }

        let mut route_index: HashMap<Box<str>, RouteIdx> = HashMap::with_capacity(routes.len());
        let mut route_stop_idxs: Vec<Vec<StopIdx>> = Vec::with_capacity(routes.len());
        let mut built_routes = Vec::with_capacity(routes.len());
        let mut route_stops = Vec::new();

        for route in &routes {
            let id: Box<str> = route.id.as_str().into();
            if route_index.contains_key(&id) {
                return Err(NetworkError::DuplicateRouteId(route.id.clone()));
            }
            if route.stops.len() < 2 {
                return Err(NetworkError::RouteTooShort {
                    route: route.id.clone(),
                    n: route.stops.len(),
                });
            }

            let mut resolved = Vec::with_capacity(route.stops.len());
            let mut seen = std::collections::HashSet::with_capacity(route.stops.len());
            for stop_id in &route.stops {
                let idx = stop_index.get(stop_id.as_str()).copied().ok_or_else(|| {
                    NetworkError::UnknownStopInRoute {
                        route: route.id.clone(),
                        stop: stop_id.clone(),
                    }
                })?;
                if !seen.insert(idx) {
                    return Err(NetworkError::RepeatedStopInRoute {
                        route: route.id.clone(),
                        stop: stop_id.clone(),
                    });
                }
                resolved.push(idx);
            }

            let route_idx = built_routes.len() as RouteIdx;
            route_index.insert(id.clone(), route_idx);
            route_stop_idxs.push(resolved.clone());

            route_stops.extend_from_slice(&resolved);
            built_routes.push(Route {
                id,
                name: route.name.as_str().into(),
                num_stops: resolved.len(),
                num_trips: 0,
                route_stops_idx: route_stops.len() - resolved.len(),
                stop_times_idx: 0, // filled in once trips are packed below.
                trip_ids: Vec::new(),
                headsigns: Vec::new(),
            });
        }

        // Group trips by route, validating shape before sorting/packing.
        let mut trips_by_route: Vec<Vec<&TripRecord>> = vec![Vec::new(); built_routes.len()];
        for trip in &trips {
            let route_idx = *route_index.get(trip.route_id.as_str()).ok_or_else(|| {
                NetworkError::UnknownRouteForTrip {
                    trip: trip.id.clone(),
                    route: trip.route_id.clone(),
                }
            })?;
            let route = &built_routes[route_idx as usize];
            if trip.stop_times.len() != route.num_stops {
                return Err(NetworkError::StopTimeCountMismatch {
                    trip: trip.id.clone(),
                    route: trip.route_id.clone(),
                    expected: route.num_stops,
                    got: trip.stop_times.len(),
                });
            }
            let mut prev_departure = None;
            for (stop_order, &(arrival, departure)) in trip.stop_times.iter().enumerate() {
                if arrival > departure {
                    return Err(NetworkError::ArrivalAfterDeparture {
                        trip: trip.id.clone(),
                        stop_order,
                        arrival,
                        departure,
                    });
                }
                if let Some((prev_order, prev_dep)) = prev_departure {
                    if departure < prev_dep {
                        return Err(NetworkError::NonMonotonicStopTime {
                            trip: trip.id.clone(),
                            prev_stop_order: prev_order,
                            prev_departure: prev_dep,
                            stop_order,
                            departure,
                        });
                    }
                }
                prev_departure = Some((stop_order, departure));
            }
            trips_by_route[route_idx as usize].push(trip);
        }

        let mut stop_times = Vec::new();
        for (route_idx, route_trips) in trips_by_route.iter_mut().enumerate() {
            // Sort ascending by departure at the first stop: the earliest-trip
            // finder's binary search, and the round scanner's "trip index only
            // decreases within a round" optimization, both assume this order
            // (and that trips on a route never overtake one another).
            route_trips.sort_unstable_by_key(|t| t.stop_times[0].1);

            let route = &mut built_routes[route_idx];
            route.stop_times_idx = stop_times.len();
            route.num_trips = route_trips.len();
            route.trip_ids = route_trips.iter().map(|t| t.id.as_str().into()).collect();
            route.headsigns = route_trips
                .iter()
                .map(|t| t.headsign.as_deref().map(Into::into))
                .collect();

            for trip in route_trips.iter() {
                for &(arrival, departure) in &trip.stop_times {
                    stop_times.push(StopTime { arrival, departure });
                }
            }
        }

        // Index routes_at_stop in route-processing order, de-duplicated
        // in deterministic, route-processing order.
        let mut stop_routes_map: Vec<Vec<RouteIdx>> = vec![Vec::new(); built_stops.len()];
        for (route_idx, stops_on_route) in route_stop_idxs.iter().enumerate() {
            for &stop in stops_on_route {
                let served = &mut stop_routes_map[stop as usize];
                if !served.contains(&(route_idx as RouteIdx)) {
                    served.push(route_idx as RouteIdx);
                }
            }
        }
        let mut stop_routes = Vec::new();
        for (stop_idx, stop) in built_stops.iter_mut().enumerate() {
            stop.routes_idx = stop_routes.len();
            stop_routes.extend_from_slice(&stop_routes_map[stop_idx]);
            stop.num_routes = stop_routes.len() - stop.routes_idx;
        }

        log::debug!(
            "built network: {} stops, {} routes, {} trips",
            built_stops.len(),
            built_routes.len(),
            trips.len(),
        );

        Ok(Network {
            stops: built_stops,
            routes: built_routes,
            stop_index,
            route_stops,
            stop_times,
            stop_routes,
        })
    }
}

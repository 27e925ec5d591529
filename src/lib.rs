pub mod network;

pub use network::{Network, NetworkBuilder, NetworkError, RouteRecord, StopRecord, Timestamp, TripRecord};

pub mod journey;

pub use journey::{Journey, Leg};

pub mod raptor;

pub use raptor::{query, QueryError, DEFAULT_MAX_ROUNDS};

pub mod utils;

//! Simulation helpers: random walks and recorded sensor sessions.

mod session;
mod waypoints;

pub use session::{read_samples, ReplayRecord, SessionReplay, WalkInput};
pub use waypoints::{random_point_near, random_waypoints};

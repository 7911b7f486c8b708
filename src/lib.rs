//! trip-planner core
//!
//! Assigns stops to days within a daily time window and reorders a day's
//! stops to cut travel time, keeping the first and last stop fixed.

pub mod traits;
pub mod error;
pub mod matrix;
pub mod window;
pub mod blocks;
pub mod optimizer;
pub mod scheduler;
pub mod day;
pub mod timeline;
pub mod osrm;
pub mod haversine;

pub use error::{PlannerError, Result};
pub use matrix::TravelTimeMatrix;
pub use traits::{Stop, StopKind, TravelMode, TravelTimeProvider};
pub use window::DayWindow;

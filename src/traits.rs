//! Core domain traits for the trip planner.
//!
//! The planner never owns stops. Callers implement [`Stop`] for their own
//! place model and hand out borrowed slices.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matrix::TravelTimeMatrix;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash + Debug {}

impl<T> Id for T where T: Clone + Eq + Hash + Debug {}

/// A point of interest that can be placed in an itinerary.
pub trait Stop {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    fn kind(&self) -> StopKind;

    /// Location coordinates (lat, lng).
    fn location(&self) -> (f64, f64);

    /// Estimated visit duration in minutes. Hotels are treated as zero
    /// regardless of what this returns.
    fn visit_minutes(&self) -> f64;
}

/// What kind of place a stop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopKind {
    Hotel,
    Attraction,
    Airport,
}

impl StopKind {
    pub fn is_hotel(self) -> bool {
        matches!(self, StopKind::Hotel)
    }
}

/// How the traveller reaches a stop. Stored per destination: the mode at
/// position `i` of a day describes the leg `i - 1 -> i`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Cycling,
    Transit,
    Flight,
}

/// Provides a travel-time matrix (seconds) for a set of locations.
///
/// The matrix is indexed by the provided location order.
pub trait TravelTimeProvider {
    fn durations_for(&self, locations: &[(f64, f64)]) -> Result<TravelTimeMatrix>;
}

impl<T: Stop + ?Sized> Stop for &T {
    type Id = T::Id;

    fn id(&self) -> &Self::Id {
        (**self).id()
    }

    fn kind(&self) -> StopKind {
        (**self).kind()
    }

    fn location(&self) -> (f64, f64) {
        (**self).location()
    }

    fn visit_minutes(&self) -> f64 {
        (**self).visit_minutes()
    }
}

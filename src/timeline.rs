//! Leg durations and clock times for a stored day.
//!
//! Flight hops get an estimated duration instead of a road duration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::haversine::distance_km;
use crate::matrix::TravelTimeMatrix;
use crate::traits::{Stop, StopKind, TravelMode};
use crate::window::DayWindow;

const FLIGHT_CRUISE_KMH: f64 = 750.0;
/// Taxi, boarding and landing.
const FLIGHT_OVERHEAD_MIN: f64 = 25.0;
const FLIGHT_MIN_MIN: f64 = 10.0;

/// Rough flight duration for a great-circle distance in meters.
pub fn estimate_flight_minutes(distance_m: f64) -> f64 {
    let cruise = distance_m.max(0.0) / 1000.0 / FLIGHT_CRUISE_KMH * 60.0;
    (cruise + FLIGHT_OVERHEAD_MIN).round().max(FLIGHT_MIN_MIN)
}

/// Minutes for the leg `from -> to` travelled by `mode`.
///
/// Airport to airport by flight uses the flight estimate; everything else
/// takes the routed duration, which may be unknown.
pub fn leg_minutes<S: Stop>(from: &S, to: &S, mode: TravelMode, routed_minutes: Option<f64>) -> Option<f64> {
    if from.kind() == StopKind::Airport && to.kind() == StopKind::Airport && mode == TravelMode::Flight {
        let meters = distance_km(from.location(), to.location()) * 1000.0;
        return Some(estimate_flight_minutes(meters));
    }
    routed_minutes
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry<I> {
    pub stop_id: I,
    /// Minutes since midnight.
    pub arrive_abs: f64,
    pub depart_abs: f64,
    pub travel_min: f64,
    /// Arrival or departure falls after the window's end.
    pub overflow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTimeline<I> {
    pub start_abs: u32,
    pub end_abs: u32,
    pub entries: Vec<TimelineEntry<I>>,
}

impl<I> DayTimeline<I> {
    pub fn overflows(&self) -> bool {
        self.entries.iter().any(|e| e.overflow)
    }
}

/// Clock times for a day in its stored order, starting at `window.start`.
///
/// Unknown legs count as zero minutes, so times may run early.
pub fn day_timeline<S: Stop>(
    stops: &[S],
    modes: &[TravelMode],
    matrix: &TravelTimeMatrix,
    window: &DayWindow,
) -> Result<DayTimeline<S::Id>> {
    matrix.ensure_len(stops.len())?;

    let end = f64::from(window.end);
    let mut clock = f64::from(window.start);
    let mut entries = Vec::with_capacity(stops.len());

    for (i, stop) in stops.iter().enumerate() {
        let visit = if stop.kind().is_hotel() {
            0.0
        } else {
            stop.visit_minutes().max(0.0)
        };

        let travel = if i == 0 {
            0.0
        } else {
            let mode = modes.get(i).copied().unwrap_or_default();
            leg_minutes(&stops[i - 1], stop, mode, matrix.minutes(i - 1, i)).unwrap_or(0.0)
        };

        let arrive = clock + travel;
        let depart = arrive + visit;
        entries.push(TimelineEntry {
            stop_id: stop.id().clone(),
            arrive_abs: arrive,
            depart_abs: depart,
            travel_min: travel,
            overflow: arrive > end || depart > end,
        });
        clock = depart;
    }

    Ok(DayTimeline {
        start_abs: window.start,
        end_abs: window.end,
        entries,
    })
}

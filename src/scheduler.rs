//! Day scheduler: packs an ordered queue of stops into successive days.
//!
//! Stops are consumed in the order given. Each day starts at the previous
//! day's end hotel and accepts queue heads while the visit plus a return to
//! the nearest hotel still fits the window. Reordering within a day is the
//! optimizer's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PlannerError, Result};
use crate::matrix::{TravelTimeMatrix, UNREACHABLE_PENALTY};
use crate::traits::{Stop, StopKind};
use crate::window::DayWindow;

/// One stop within one day. Offsets are minutes since the day's start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryStep<I> {
    pub stop_id: I,
    pub kind: StopKind,
    pub travel_min_from_prev: f64,
    pub arrive_min: f64,
    pub depart_min: f64,
    pub visit_min: f64,
    /// False when the matrix had no duration for the leg into this stop.
    pub reachable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay<I> {
    /// 1-based day number.
    pub day: usize,
    pub steps: Vec<ItineraryStep<I>>,
    pub start_hotel_id: I,
    pub end_hotel_id: I,
    pub travel_min_total: f64,
    pub visit_min_total: f64,
    pub total_min: f64,
    /// A stop was forced into this day even though it did not fit.
    pub overflow: bool,
    /// Legs with no known duration, counted as zero minutes.
    pub unreachable_legs: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryPlan<I> {
    pub days: Vec<ItineraryDay<I>>,
    /// Full drawing path, hotels repeated only across day boundaries.
    pub path_stop_ids: Vec<I>,
    /// For each leg `path[i] -> path[i + 1]`, the index into `days`.
    pub leg_days: Vec<usize>,
    /// Non-hotel stops in visiting order, for numbering.
    pub activity_order_ids: Vec<I>,
}

impl<I> ItineraryPlan<I> {
    pub fn empty() -> Self {
        Self {
            days: Vec::new(),
            path_stop_ids: Vec::new(),
            leg_days: Vec::new(),
            activity_order_ids: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Where a single day is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayState {
    AcceptingStops,
    ClosingDay,
    Done,
}

/// Travel between two stops as the scheduler sees it.
#[derive(Debug, Clone, Copy)]
struct Leg {
    minutes: Option<f64>,
}

impl Leg {
    /// Cost for fit decisions; unreachable legs never fit on their own.
    fn budget(self) -> f64 {
        self.minutes.unwrap_or(UNREACHABLE_PENALTY)
    }

    /// Minutes that actually move the clock.
    fn elapsed(self) -> f64 {
        self.minutes.unwrap_or(0.0)
    }
}

struct Context<'a> {
    matrix: &'a TravelTimeMatrix,
    hotels: Vec<usize>,
}

impl Context<'_> {
    fn leg(&self, from: usize, to: usize) -> Leg {
        Leg {
            minutes: self.matrix.minutes(from, to),
        }
    }

    /// Closest hotel by travel time. Ties go to the hotel listed later;
    /// if nothing is reachable the first hotel is returned.
    fn nearest_hotel(&self, from: usize) -> (usize, Leg) {
        let mut best = (self.hotels[0], Leg { minutes: None });
        for &hotel in &self.hotels {
            let leg = self.leg(from, hotel);
            if let Some(minutes) = leg.minutes {
                if best.1.minutes.is_none_or(|current| minutes <= current) {
                    best = (hotel, leg);
                }
            }
        }
        best
    }
}

/// Accumulates one day's steps and totals.
struct DayBuilder<I> {
    day: usize,
    start_hotel: usize,
    position: usize,
    elapsed: f64,
    steps: Vec<ItineraryStep<I>>,
    travel_total: f64,
    visit_total: f64,
    overflow: bool,
    unreachable_legs: usize,
}

impl<I: Clone> DayBuilder<I> {
    fn open(day: usize, hotel: usize, hotel_id: I) -> Self {
        Self {
            day,
            start_hotel: hotel,
            position: hotel,
            elapsed: 0.0,
            steps: vec![ItineraryStep {
                stop_id: hotel_id,
                kind: StopKind::Hotel,
                travel_min_from_prev: 0.0,
                arrive_min: 0.0,
                depart_min: 0.0,
                visit_min: 0.0,
                reachable: true,
            }],
            travel_total: 0.0,
            visit_total: 0.0,
            overflow: false,
            unreachable_legs: 0,
        }
    }

    fn has_visits(&self) -> bool {
        self.steps.len() > 1
    }

    fn push(&mut self, index: usize, id: I, kind: StopKind, leg: Leg, visit: f64) {
        let travel = leg.elapsed();
        if leg.minutes.is_none() {
            self.unreachable_legs += 1;
        }

        self.elapsed += travel;
        self.travel_total += travel;
        let arrive = self.elapsed;
        self.elapsed += visit;
        self.visit_total += visit;

        self.steps.push(ItineraryStep {
            stop_id: id,
            kind,
            travel_min_from_prev: travel,
            arrive_min: arrive,
            depart_min: self.elapsed,
            visit_min: visit,
            reachable: leg.minutes.is_some(),
        });
        self.position = index;
    }

    fn finish(self, start_hotel_id: I, end_hotel_id: I) -> ItineraryDay<I> {
        ItineraryDay {
            day: self.day,
            steps: self.steps,
            start_hotel_id,
            end_hotel_id,
            travel_min_total: self.travel_total,
            visit_min_total: self.visit_total,
            total_min: self.travel_total + self.visit_total,
            overflow: self.overflow,
            unreachable_legs: self.unreachable_legs,
        }
    }
}

/// Drawing path shared across days.
struct PathTrace<I> {
    stop_ids: Vec<I>,
    leg_days: Vec<usize>,
}

impl<I: Clone + PartialEq> PathTrace<I> {
    /// Append `id`, skipping a consecutive repeat.
    fn visit(&mut self, id: &I, day_index: usize) {
        match self.stop_ids.last() {
            None => self.stop_ids.push(id.clone()),
            Some(last) if last == id => {}
            Some(_) => {
                self.stop_ids.push(id.clone());
                self.leg_days.push(day_index);
            }
        }
    }
}

/// Assign `stops` to days within `window`.
///
/// `matrix` holds travel seconds indexed by the position of each stop in
/// `stops`. Without any hotel the plan is empty.
pub fn schedule<S: Stop>(
    stops: &[S],
    window: &DayWindow,
    matrix: &TravelTimeMatrix,
) -> Result<ItineraryPlan<S::Id>> {
    matrix.ensure_len(stops.len())?;

    let mut seen = HashSet::with_capacity(stops.len());
    for stop in stops {
        if !seen.insert(stop.id()) {
            return Err(PlannerError::DuplicateStop(format!("{:?}", stop.id())));
        }
    }

    let (hotels, queue): (Vec<usize>, Vec<usize>) =
        (0..stops.len()).partition(|&i| stops[i].kind().is_hotel());
    if hotels.is_empty() {
        warn!(stops = stops.len(), "no hotel to anchor days, returning empty plan");
        return Ok(ItineraryPlan::empty());
    }

    let ctx = Context { matrix, hotels };
    let budget = window.length();
    let max_days = (queue.len() + 2).max(1);

    let mut days = Vec::new();
    let mut trace = PathTrace {
        stop_ids: Vec::new(),
        leg_days: Vec::new(),
    };
    let mut activity_order_ids = Vec::with_capacity(queue.len());
    let mut cursor = 0;
    let mut current_hotel = ctx.hotels[0];

    for day in 1..=max_days {
        let day_index = day - 1;
        let mut builder = DayBuilder::open(day, current_hotel, stops[current_hotel].id().clone());
        trace.visit(stops[current_hotel].id(), day_index);

        let mut state = DayState::AcceptingStops;
        let mut end_hotel = current_hotel;

        while state != DayState::Done {
            state = match state {
                DayState::AcceptingStops => match queue.get(cursor) {
                    None => DayState::ClosingDay,
                    Some(&candidate) => {
                        let stop = &stops[candidate];
                        let travel = ctx.leg(builder.position, candidate);
                        let visit = stop.visit_minutes().max(0.0);
                        let (_, back) = ctx.nearest_hotel(candidate);
                        let would_use = builder.elapsed + travel.budget() + visit + back.budget();

                        if would_use <= budget || !builder.has_visits() {
                            let forced = would_use > budget;
                            if forced {
                                debug!(day, would_use, budget, "forcing stop that does not fit");
                                builder.overflow = true;
                            }
                            builder.push(candidate, stop.id().clone(), stop.kind(), travel, visit);
                            trace.visit(stop.id(), day_index);
                            activity_order_ids.push(stop.id().clone());
                            cursor += 1;

                            if forced { DayState::ClosingDay } else { DayState::AcceptingStops }
                        } else {
                            DayState::ClosingDay
                        }
                    }
                },
                DayState::ClosingDay => {
                    let (hotel, leg) = ctx.nearest_hotel(builder.position);
                    if hotel != builder.position || !builder.has_visits() {
                        builder.push(hotel, stops[hotel].id().clone(), StopKind::Hotel, leg, 0.0);
                        trace.visit(stops[hotel].id(), day_index);
                    }
                    end_hotel = hotel;
                    DayState::Done
                }
                DayState::Done => DayState::Done,
            };
        }

        debug!(
            day,
            steps = builder.steps.len(),
            travel_min = builder.travel_total,
            visit_min = builder.visit_total,
            overflow = builder.overflow,
            "day closed"
        );

        let start_hotel_id = stops[builder.start_hotel].id().clone();
        days.push(builder.finish(start_hotel_id, stops[end_hotel].id().clone()));
        current_hotel = end_hotel;

        if cursor >= queue.len() {
            break;
        }
    }

    if cursor < queue.len() {
        warn!(remaining = queue.len() - cursor, "day cap reached with stops left");
    }

    Ok(ItineraryPlan {
        days,
        path_stop_ids: trace.stop_ids,
        leg_days: trace.leg_days,
        activity_order_ids,
    })
}

//! Test fixtures for trip-planner.
//!
//! Provides:
//! - A builder-style `TestStop` implementing `Stop`
//! - Matrix helpers for hand-built scenarios
//! - Real Lisbon area places (see `lisbon_places`)

#![allow(dead_code)]

pub mod lisbon_places;

use trip_planner::{Stop, StopKind, TravelTimeMatrix};

#[derive(Clone, Debug)]
pub struct TestStop {
    pub id: String,
    pub kind: StopKind,
    pub location: (f64, f64),
    pub visit_min: f64,
}

impl TestStop {
    fn new(id: &str, kind: StopKind, visit_min: f64) -> Self {
        Self {
            id: id.to_string(),
            kind,
            location: (0.0, 0.0),
            visit_min,
        }
    }

    pub fn hotel(id: &str) -> Self {
        Self::new(id, StopKind::Hotel, 0.0)
    }

    pub fn attraction(id: &str, visit_min: f64) -> Self {
        Self::new(id, StopKind::Attraction, visit_min)
    }

    pub fn airport(id: &str) -> Self {
        Self::new(id, StopKind::Airport, 60.0)
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.location = (lat, lng);
        self
    }
}

impl Stop for TestStop {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn kind(&self) -> StopKind {
        self.kind
    }

    fn location(&self) -> (f64, f64) {
        self.location
    }

    fn visit_minutes(&self) -> f64 {
        self.visit_min
    }
}

/// Stops on a line; travel takes one minute per unit of distance.
pub fn line_matrix(positions: &[f64]) -> TravelTimeMatrix {
    TravelTimeMatrix::from_rows(
        positions
            .iter()
            .map(|a| positions.iter().map(|b| (a - b).abs() * 60.0).collect())
            .collect(),
    )
    .expect("square matrix")
}

pub fn ids<S: Stop<Id = String>>(stops: &[S]) -> Vec<String> {
    stops.iter().map(|s| s.id().clone()).collect()
}

//! Lisbon area places for realistic trip fixtures.
//!
//! Coordinates are approximate (OpenStreetMap), good enough for
//! great-circle travel estimates.

use super::TestStop;

/// A named place with coordinates.
#[derive(Debug, Clone)]
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub const HOTELS: &[Place] = &[
    Place::new("Hotel Avenida Palace", 38.7147, -9.1417),
    Place::new("Pestana Palace", 38.7061, -9.1857),
    Place::new("Tivoli Palacio de Seteais", 38.7963, -9.3950),
];

pub const SIGHTS: &[Place] = &[
    Place::new("Castelo de Sao Jorge", 38.7139, -9.1335),
    Place::new("Se de Lisboa", 38.7098, -9.1365),
    Place::new("Praca do Comercio", 38.7075, -9.1364),
    Place::new("Mosteiro dos Jeronimos", 38.6979, -9.2068),
    Place::new("Torre de Belem", 38.6916, -9.2160),
    Place::new("Oceanario de Lisboa", 38.7635, -9.0937),
    Place::new("Palacio da Pena", 38.7876, -9.3906),
    Place::new("Quinta da Regaleira", 38.7963, -9.3960),
    Place::new("Cabo da Roca", 38.7804, -9.4989),
    Place::new("Museu Calouste Gulbenkian", 38.7372, -9.1545),
];

pub const AIRPORTS: &[Place] = &[
    Place::new("Lisbon Humberto Delgado", 38.7742, -9.1342),
    Place::new("Porto Francisco Sa Carneiro", 41.2481, -8.6814),
];

/// Every hotel and sight as stops, hotels first. Sights take 90 minutes.
pub fn trip() -> Vec<TestStop> {
    let hotels = HOTELS.iter().map(|p| TestStop::hotel(p.name).at(p.lat, p.lng));
    let sights = SIGHTS.iter().map(|p| TestStop::attraction(p.name, 90.0).at(p.lat, p.lng));
    hotels.chain(sights).collect()
}

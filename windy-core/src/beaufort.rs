//! Human-readable wind descriptions: compass points and the Beaufort scale.

use std::collections::HashMap;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Upper bound (exclusive, m/s) of forces 0..=11; anything faster is force 12.
const BEAUFORT_LIMITS: [(f64, &str); 12] = [
    (0.3, "Calm"),
    (1.6, "Light Air"),
    (3.4, "Light Breeze"),
    (5.5, "Gentle Breeze"),
    (8.0, "Moderate Breeze"),
    (10.8, "Fresh Breeze"),
    (13.9, "Strong Breeze"),
    (17.2, "Near Gale"),
    (20.8, "Gale"),
    (24.5, "Strong Gale"),
    (28.5, "Storm"),
    (32.7, "Violent Storm"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beaufort {
    pub force: u8,
    pub description: &'static str,
}

/// 16-point compass name for a direction in degrees. Any real value is accepted.
pub fn cardinal_direction(degrees: f64) -> &'static str {
    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / 22.5).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Beaufort force for a wind speed in m/s.
pub fn beaufort(speed_mps: f64) -> Beaufort {
    BEAUFORT_LIMITS
        .iter()
        .zip(0u8..)
        .find(|((limit, _), _)| speed_mps < *limit)
        .map(|(&(_, description), force)| Beaufort { force, description })
        .unwrap_or(Beaufort { force: 12, description: "Hurricane" })
}

/// Memo for the lookups above. The caller owns it and decides how long it lives.
#[derive(Debug, Default)]
pub struct WindLabelCache {
    directions: HashMap<u64, &'static str>,
    scales: HashMap<u64, Beaufort>,
}

impl WindLabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cardinal_direction(&mut self, degrees: f64) -> &'static str {
        let key = degrees.to_bits();
        if let Some(&label) = self.directions.get(&key) {
            return label;
        }
        let label = cardinal_direction(degrees);
        self.directions.insert(key, label);
        label
    }

    pub fn beaufort(&mut self, speed_mps: f64) -> Beaufort {
        *self.scales.entry(speed_mps.to_bits()).or_insert_with(|| beaufort(speed_mps))
    }

    pub fn len(&self) -> usize {
        self.directions.len() + self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.directions.clear();
        self.scales.clear();
    }
}

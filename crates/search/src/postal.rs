use foundation::math::{GeoCoordinate, haversine_miles};

/// Postal-code to coordinate table, scanned linearly.
///
/// Entry order is the table's load order and is part of the contract:
/// nearest-code resolution keeps the first-encountered minimum, so a
/// given table always resolves the same code for the same target.
#[derive(Debug, Clone, Default)]
pub struct PostalTable {
    entries: Vec<(String, GeoCoordinate)>,
}

impl PostalTable {
    pub fn new(entries: Vec<(String, GeoCoordinate)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<GeoCoordinate> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, coord)| *coord)
    }

    /// The code whose coordinate is closest to `target`; strict-less
    /// comparison keeps the first minimum encountered.
    pub fn nearest(&self, target: GeoCoordinate) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (code, coord) in &self.entries {
            let distance = haversine_miles(target, *coord);
            if best.map(|(_, d)| distance < d).unwrap_or(true) {
                best = Some((code, distance));
            }
        }
        best.map(|(code, _)| code)
    }
}

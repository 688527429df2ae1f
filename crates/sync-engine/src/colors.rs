//! Per-owner display colors.
//!
//! Events from different users are visually disambiguated by owner color.
//! The mapping is append-only for the lifetime of the session: an owner
//! keeps their color even after all their events are deleted, so the view
//! stays stable across churn. Colors come from a seeded generator so tests
//! are reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Fixed saturation for generated colors (high-contrast palette strategy).
const SATURATION: f64 = 0.65;
/// Fixed value (brightness) for generated colors.
const VALUE: f64 = 0.80;

/// Append-only mapping from owner id to a `#RRGGBB` display color.
pub struct OwnerColors {
    assigned: HashMap<String, String>,
    rng: StdRng,
}

impl OwnerColors {
    /// Create a map with a process-random seed.
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a map with a fixed seed (reproducible color sequences).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            assigned: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Color for an owner, generating and recording one on first sight.
    ///
    /// Repeat calls return the identical value, regardless of what other
    /// owners were added in between.
    pub fn color_for(&mut self, owner_id: &str) -> String {
        if let Some(color) = self.assigned.get(owner_id) {
            return color.clone();
        }

        // Random hue, fixed saturation/value: keeps generated colors
        // saturated and legible against a white event background.
        let hue = self.rng.gen_range(0.0..360.0);
        let color = hsv_to_hex(hue, SATURATION, VALUE);
        self.assigned.insert(owner_id.to_string(), color.clone());
        color
    }

    /// Number of owners that have been assigned a color.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    /// Returns true if no owner has been assigned a color yet.
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

impl Default for OwnerColors {
    fn default() -> Self {
        Self::new()
    }
}

fn hsv_to_hex(hue: f64, saturation: f64, value: f64) -> String {
    let c = value * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - c;

    let (r, g, b) = match hue as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    format!(
        "#{:02X}{:02X}{:02X}",
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8
    )
}

//! Runner athletic profile.

use super::AthleteProfile;

/// Athletic profile for running activities.
///
/// Based on typical recreational to competitive runner performance:
/// - Base pace: ~5:00/km (3.5 m/s)
/// - Uphill: ~15% slower per 1% grade
/// - Downhill: ~8% faster per 1% grade (limited by safety)
/// - Heart rate: 55 bpm resting, 190 max, ~75% of reserve on the flat
#[derive(Debug, Clone)]
pub struct RunnerProfile {
    /// Base speed in m/s on flat terrain.
    base_speed: f64,
    /// Performance variance (coefficient of variation).
    variance: f64,
    resting_hr: u32,
    max_hr: u32,
}

impl Default for RunnerProfile {
    fn default() -> Self {
        Self {
            base_speed: 3.5, // ~5:00/km
            variance: 0.08,
            resting_hr: 55,
            max_hr: 190,
        }
    }
}

impl RunnerProfile {
    /// Creates a new runner profile with specified base pace.
    ///
    /// # Arguments
    /// * `pace_min_per_km` - Base pace in minutes per kilometer (e.g., 5.0 for 5:00/km)
    pub fn with_pace(pace_min_per_km: f64) -> Self {
        let base_speed = 1000.0 / (pace_min_per_km * 60.0);
        Self {
            base_speed,
            ..Default::default()
        }
    }

    /// Creates a recreational runner profile (~6:00/km base pace).
    pub fn recreational() -> Self {
        Self::with_pace(6.0)
    }

    /// Removes day-to-day variance so every flat stretch runs at base pace.
    pub fn steady(mut self) -> Self {
        self.variance = 0.0;
        self
    }
}

impl AthleteProfile for RunnerProfile {
    fn base_speed_mps(&self) -> f64 {
        self.base_speed
    }

    fn grade_factor(&self, grade: f64) -> f64 {
        if grade >= 0.0 {
            let factor = 1.0 - (grade * 15.0);
            factor.max(0.2) // Minimum 20% of base speed on steep climbs
        } else {
            let factor = 1.0 - (grade * 8.0); // Note: grade is negative, so this adds
            factor.min(1.5)
        }
    }

    fn variance(&self) -> f64 {
        self.variance
    }

    fn heart_rate_range(&self) -> (u32, u32) {
        (self.resting_hr, self.max_hr)
    }

    fn base_intensity(&self) -> f64 {
        0.75
    }
}

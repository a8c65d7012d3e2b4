//! Hiker athletic profile.

use super::AthleteProfile;

/// Athletic profile for hiking activities.
///
/// - Base speed: ~5.5 km/h (1.5 m/s) on flat terrain
/// - Uphill: ~12% slower per 1% grade
/// - Downhill: ~5% faster per 1% grade (conservative due to terrain)
#[derive(Debug, Clone)]
pub struct HikerProfile {
    base_speed: f64,
    variance: f64,
}

impl Default for HikerProfile {
    fn default() -> Self {
        Self {
            base_speed: 1.5, // ~5.5 km/h
            variance: 0.12,
        }
    }
}

impl HikerProfile {
    /// Creates a new hiker profile with specified base speed in km/h.
    pub fn with_speed(speed_kmh: f64) -> Self {
        Self {
            base_speed: speed_kmh / 3.6,
            ..Default::default()
        }
    }
}

impl AthleteProfile for HikerProfile {
    fn base_speed_mps(&self) -> f64 {
        self.base_speed
    }

    fn grade_factor(&self, grade: f64) -> f64 {
        if grade >= 0.0 {
            (1.0 - grade * 12.0).max(0.15)
        } else {
            (1.0 - grade * 5.0).min(1.3)
        }
    }

    fn variance(&self) -> f64 {
        self.variance
    }

    fn heart_rate_range(&self) -> (u32, u32) {
        (60, 180)
    }

    fn base_intensity(&self) -> f64 {
        0.45
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_speed() {
        let profile = HikerProfile::with_speed(3.6);
        assert!((profile.base_speed_mps() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_steep_climb_floor() {
        assert_eq!(HikerProfile::default().grade_factor(0.5), 0.15);
    }
}

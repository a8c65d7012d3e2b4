//! Athletic performance profiles.
//!
//! Profiles define realistic speeds, grade factors and heart-rate response
//! for different activity types. They are used by track generators to
//! produce realistic timestamps and sensor readings.

mod hiker;
mod runner;

pub use hiker::HikerProfile;
pub use runner::RunnerProfile;

/// Trait for athletic performance profiles.
///
/// Implementations should provide:
/// - Base speed on flat terrain
/// - Grade factor (speed multiplier based on slope)
/// - Day-to-day variance
/// - Resting and maximum heart rate
pub trait AthleteProfile: Send + Sync {
    /// Base speed on flat terrain in meters per second.
    fn base_speed_mps(&self) -> f64;

    /// Speed multiplier for a given grade (expressed as a fraction, e.g., 0.05 = 5% grade).
    ///
    /// Returns a value between 0 and 2+:
    /// - < 1.0 means slower than base (uphill)
    /// - > 1.0 means faster than base (downhill)
    fn grade_factor(&self, grade: f64) -> f64;

    /// Day-to-day performance variance as a coefficient of variation (0.0 - 1.0).
    fn variance(&self) -> f64;

    /// Resting and maximum heart rate in beats per minute.
    fn heart_rate_range(&self) -> (u32, u32);

    /// Fraction of heart-rate reserve used on flat terrain.
    fn base_intensity(&self) -> f64;

    /// Heart rate while moving on the given grade.
    ///
    /// Climbing raises intensity roughly four points of reserve per percent
    /// of grade; descending lowers it at half that rate.
    fn heart_rate_at_grade(&self, grade: f64) -> u32 {
        let (resting, max) = self.heart_rate_range();
        let slope = if grade >= 0.0 { 4.0 } else { 2.0 };
        let intensity = (self.base_intensity() + grade * slope).clamp(0.3, 0.97);
        let reserve = f64::from(max.saturating_sub(resting));
        resting + (reserve * intensity).round() as u32
    }
}

/// Speed in m/s for a grade, after applying a sampled variance factor.
pub fn speed_at_grade(profile: &dyn AthleteProfile, grade: f64, variance_factor: f64) -> f64 {
    let target = profile.base_speed_mps() * profile.grade_factor(grade);

    (target * variance_factor).max(0.5) // Minimum 0.5 m/s to avoid division issues
}

/// Samples a variance factor from normal distribution.
/// Returns a multiplier around 1.0.
pub fn sample_variance(profile: &dyn AthleteProfile, rng: &mut impl rand::Rng) -> f64 {
    use rand_distr::{Distribution, Normal};

    let std_dev = profile.variance();
    match Normal::new(1.0, std_dev) {
        Ok(normal) if std_dev > 0.0 => {
            let sample: f64 = normal.sample(rng);
            sample.clamp(0.7, 1.4)
        }
        _ => 1.0,
    }
}

//! Observation discretization
//!
//! Maps the game's continuous features onto a small categorical state. The
//! cut points are finer near zero, where the bird is close to a pipe edge and
//! small differences decide between a pass and a collision.

use crate::{
    Result,
    app::DiscretizerConfig,
    types::{DiscreteState, RawObservation},
};

/// Index of the first threshold `value` is strictly below, or the number of
/// thresholds when it is below none of them.
///
/// A value equal to a threshold lands in the higher bucket. NaN compares
/// false against everything and therefore lands in the top bucket.
pub fn bucket(value: f64, thresholds: &[f64]) -> usize {
    thresholds
        .iter()
        .position(|&threshold| value < threshold)
        .unwrap_or(thresholds.len())
}

/// Pure mapping from [`RawObservation`] to [`DiscreteState`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateDiscretizer {
    config: DiscretizerConfig,
}

impl StateDiscretizer {
    /// Create a discretizer after validating the thresholds.
    pub fn new(config: DiscretizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Discretize a raw observation.
    pub fn discretize(&self, raw: &RawObservation) -> DiscreteState {
        DiscreteState {
            height: bucket(raw.vertical_offset(), &self.config.height_thresholds),
            distance: bucket(raw.horizontal_distance(), &self.config.distance_thresholds),
            velocity: bucket(raw.velocity(), &self.config.velocity_thresholds),
        }
    }

    /// Number of categories per feature as `(height, distance, velocity)`.
    pub fn bucket_counts(&self) -> (usize, usize, usize) {
        (
            self.config.height_thresholds.len() + 1,
            self.config.distance_thresholds.len() + 1,
            self.config.velocity_thresholds.len() + 1,
        )
    }

    pub fn config(&self) -> &DiscretizerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(offset: f64, distance: f64, velocity: f64) -> RawObservation {
        RawObservation {
            player_y: offset,
            player_vel: velocity,
            next_pipe_top_y: 0.0,
            next_pipe_dist_to_player: distance,
        }
    }

    fn velocity_category(discretizer: &StateDiscretizer, velocity: f64) -> usize {
        discretizer
            .discretize(&observation(100.0, 100.0, velocity))
            .velocity
    }

    #[test]
    fn test_velocity_boundaries_are_strict() {
        let discretizer = StateDiscretizer::default();
        assert_eq!(velocity_category(&discretizer, -15.0), 1);
        assert_eq!(velocity_category(&discretizer, -15.0001), 0);
        assert_eq!(velocity_category(&discretizer, 0.0), 4);
        assert_eq!(velocity_category(&discretizer, 4.999), 4);
        assert_eq!(velocity_category(&discretizer, 5.0), 5);
    }

    #[test]
    fn test_velocity_is_monotone_with_six_categories() {
        let discretizer = StateDiscretizer::default();
        let mut previous = 0;
        let mut seen = std::collections::BTreeSet::new();
        for step in -400..=400 {
            let category = velocity_category(&discretizer, step as f64 * 0.1);
            assert!(category >= previous);
            previous = category;
            seen.insert(category);
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_height_and_distance_buckets() {
        let discretizer = StateDiscretizer::default();
        let cases = [
            (-40.0, 0),
            (7.9, 0),
            (8.0, 1),
            (19.0, 1),
            (20.0, 2),
            (124.0, 3),
            (249.9, 4),
            (250.0, 5),
            (1.0e9, 5),
        ];
        for (value, expected) in cases {
            let state = discretizer.discretize(&observation(value, value, 0.0));
            assert_eq!(state.height, expected, "height for {value}");
            assert_eq!(state.distance, expected, "distance for {value}");
        }
    }

    #[test]
    fn test_vertical_offset_uses_gap_top() {
        let discretizer = StateDiscretizer::default();
        let raw = RawObservation {
            player_y: 260.0,
            player_vel: 0.0,
            next_pipe_top_y: 250.0,
            next_pipe_dist_to_player: 300.0,
        };
        let state = discretizer.discretize(&raw);
        assert_eq!(state.height, 1);
        assert_eq!(state.distance, 5);
    }

    #[test]
    fn test_nan_lands_in_top_bucket() {
        assert_eq!(bucket(f64::NAN, &[1.0, 2.0]), 2);
    }

    #[test]
    fn test_discretize_is_idempotent() {
        let discretizer = StateDiscretizer::default();
        let raw = observation(33.0, 140.0, -7.5);
        assert_eq!(discretizer.discretize(&raw), discretizer.discretize(&raw));
    }

    #[test]
    fn test_custom_thresholds_change_bucket_count() {
        let config = DiscretizerConfig {
            height_thresholds: vec![0.0],
            distance_thresholds: vec![10.0, 20.0],
            velocity_thresholds: vec![0.0, 1.0, 2.0],
        };
        let discretizer = StateDiscretizer::new(config).unwrap();
        assert_eq!(discretizer.bucket_counts(), (2, 3, 4));
    }
}

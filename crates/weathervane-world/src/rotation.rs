//! The rotating weather schedule: one weather per band.
//!
//! Each [`rotate`](RotationSchedule::rotate) moves the last entry to the
//! front, so weather travels from the top of the map to the bottom one band
//! per rotation, forming a wave across the world.

use std::collections::VecDeque;

use weathervane_types::Weather;

use crate::error::WorldError;

/// An ordered, cyclically rotatable sequence of weathers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSchedule {
    /// Weather per band, band 0 first.
    slots: VecDeque<Weather>,

    /// Rotations applied since the last replace, modulo the length.
    phase: usize,
}

impl RotationSchedule {
    /// Create a schedule from a non-empty sequence.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyRotation`] for an empty sequence.
    pub fn new(sequence: Vec<Weather>) -> Result<Self, WorldError> {
        if sequence.is_empty() {
            return Err(WorldError::EmptyRotation);
        }
        Ok(Self {
            slots: VecDeque::from(sequence),
            phase: 0,
        })
    }

    /// Move the last weather to the front.
    pub fn rotate(&mut self) {
        self.slots.rotate_right(1);
        self.phase = self.phase.saturating_add(1).checked_rem(self.slots.len()).unwrap_or(0);
    }

    /// Apply `k` rotations; equivalent to a right-rotation by `k mod len`.
    pub fn rotate_by(&mut self, k: usize) {
        let steps = k.checked_rem(self.slots.len()).unwrap_or(0);
        for _ in 0..steps {
            self.rotate();
        }
    }

    /// Weather currently assigned to `index`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::IndexOutOfRange`] when `index >= len`.
    pub fn weather_for_band(&self, index: usize) -> Result<Weather, WorldError> {
        self.slots
            .get(index)
            .copied()
            .ok_or(WorldError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            })
    }

    /// Swap in a whole new sequence, resetting the rotation phase.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyRotation`] for an empty sequence; the
    /// current schedule is left untouched.
    pub fn replace(&mut self, sequence: Vec<Weather>) -> Result<(), WorldError> {
        *self = Self::new(sequence)?;
        Ok(())
    }

    /// Number of slots. Never changes except through [`replace`](Self::replace).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`; a schedule cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Rotations since the last replace, modulo the length.
    pub const fn phase(&self) -> usize {
        self.phase
    }

    /// The current assignment, band 0 first.
    pub fn to_vec(&self) -> Vec<Weather> {
        self.slots.iter().copied().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    fn sample() -> Vec<Weather> {
        vec![
            Weather::ExtraSunny,
            Weather::Clear,
            Weather::Clouds,
            Weather::Overcast,
            Weather::Rain,
        ]
    }

    #[test]
    fn rotate_moves_last_to_front() {
        let mut schedule = RotationSchedule::new(sample()).unwrap();
        schedule.rotate();
        assert_eq!(
            schedule.to_vec(),
            vec![
                Weather::Rain,
                Weather::ExtraSunny,
                Weather::Clear,
                Weather::Clouds,
                Weather::Overcast,
            ]
        );
        assert_eq!(schedule.phase(), 1);
    }

    #[test]
    fn k_rotations_equal_right_rotation_by_k_mod_len() {
        let original = sample();
        for k in 0..17 {
            let mut schedule = RotationSchedule::new(original.clone()).unwrap();
            for _ in 0..k {
                schedule.rotate();
            }
            let mut expected = VecDeque::from(original.clone());
            expected.rotate_right(k % original.len());
            assert_eq!(schedule.to_vec(), Vec::from(expected), "k = {k}");

            let mut batched = RotationSchedule::new(original.clone()).unwrap();
            batched.rotate_by(k);
            assert_eq!(batched.to_vec(), schedule.to_vec());
        }
    }

    #[test]
    fn len_rotations_restore_the_original() {
        let mut schedule = RotationSchedule::new(sample()).unwrap();
        for _ in 0..sample().len() {
            schedule.rotate();
        }
        assert_eq!(schedule.to_vec(), sample());
        assert_eq!(schedule.phase(), 0);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let schedule = RotationSchedule::new(sample()).unwrap();
        assert_eq!(schedule.weather_for_band(4).unwrap(), Weather::Rain);
        assert_eq!(
            schedule.weather_for_band(5),
            Err(WorldError::IndexOutOfRange { index: 5, len: 5 })
        );
    }

    #[test]
    fn replace_resets_phase() {
        let mut schedule = RotationSchedule::new(sample()).unwrap();
        schedule.rotate();
        schedule.rotate();
        schedule.replace(vec![Weather::Snow, Weather::Xmas]).unwrap();
        assert_eq!(schedule.phase(), 0);
        assert_eq!(schedule.to_vec(), vec![Weather::Snow, Weather::Xmas]);
    }

    #[test]
    fn empty_replace_keeps_current_schedule() {
        let mut schedule = RotationSchedule::new(sample()).unwrap();
        assert_eq!(schedule.replace(Vec::new()), Err(WorldError::EmptyRotation));
        assert_eq!(schedule.to_vec(), sample());
    }
}

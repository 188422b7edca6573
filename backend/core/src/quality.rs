//! Quality schedule for successive degradation passes.
//!
//! Coarse steps of 10 while the image still looks acceptable, then single
//! steps through the low range: 50, 40, 30, 20, 10, 9, ..., 1.

/// Starting quality for every new candidate.
pub const BASELINE_QUALITY: u8 = 50;

/// Lowest quality the encoder is ever asked for.
pub const MIN_QUALITY: u8 = 1;

/// Below or at this value the schedule moves one step at a time.
const FINE_STEP_THRESHOLD: u8 = 10;
const COARSE_STEP: u8 = 10;

/// Result of asking the schedule for the next quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextQuality {
    Next(u8),
    Exhausted,
}

/// Compute the quality to use for the next pass after `current`.
pub fn next_quality(current: u8) -> NextQuality {
    if current <= MIN_QUALITY {
        NextQuality::Exhausted
    } else if current <= FINE_STEP_THRESHOLD {
        NextQuality::Next(current - 1)
    } else {
        NextQuality::Next(current.saturating_sub(COARSE_STEP).max(MIN_QUALITY))
    }
}

/// Iterator over every quality the schedule visits after `start`.
#[derive(Debug, Clone)]
pub struct QualitySchedule {
    current: u8,
}

impl QualitySchedule {
    pub fn starting_at(start: u8) -> Self {
        Self { current: start }
    }
}

impl Iterator for QualitySchedule {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        match next_quality(self.current) {
            NextQuality::Next(q) => {
                self.current = q;
                Some(q)
            }
            NextQuality::Exhausted => None,
        }
    }
}

use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::time::{Duration, Instant};
use strum::{Display as StrumDisplay, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, DeserializeFromStr, EnumString, StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[strum(serialize = "linear")]
    Linear,
    #[strum(serialize = "cubic-out", serialize = "ease-out")]
    CubicOut,
}

impl Easing {
    /// Map normalized time to progress. Both curves are monotone, which keeps
    /// per-slice progress non-decreasing while animating.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    pub easing: Easing,
    pub duration: Duration,
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self {
            easing: Easing::CubicOut,
            duration: Duration::from_millis(280),
        }
    }
}

/// One progress value per slice, staggered by a fixed start delay per index.
///
/// Delays only stagger start times; once started, slices ease independently
/// and concurrently. The state is created on open and dropped on close, so a
/// reopened menu always starts from a fresh schedule.
#[derive(Debug, Clone)]
pub struct AnimationState {
    started_at: Instant,
    delay_step: Duration,
    spec: AnimationSpec,
    progress: Vec<f64>,
    animating: bool,
}

impl AnimationState {
    /// Every slice fully shown, nothing scheduled. Used when animation is
    /// disabled.
    pub fn snapped(slice_count: usize) -> Self {
        Self {
            started_at: Instant::now(),
            delay_step: Duration::ZERO,
            spec: AnimationSpec::default(),
            progress: vec![1.0; slice_count],
            animating: false,
        }
    }

    pub fn staggered(
        slice_count: usize,
        delay_step: Duration,
        spec: AnimationSpec,
        now: Instant,
    ) -> Self {
        Self {
            started_at: now,
            delay_step,
            spec,
            progress: vec![0.0; slice_count],
            animating: true,
        }
    }

    /// Advance every slice to `now`. Returns whether anything is still
    /// animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.animating {
            return false;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        let mut all_done = true;
        for (index, progress) in self.progress.iter_mut().enumerate() {
            let start = self.delay_step * index as u32;
            let value = if elapsed < start {
                0.0
            } else {
                let t = (elapsed - start).as_secs_f64() / self.spec.duration.as_secs_f64();
                self.spec.easing.apply(t)
            };
            // never regress, even if the clock does
            *progress = progress.max(value);
            if *progress < 1.0 {
                all_done = false;
            }
        }
        if all_done {
            self.animating = false;
        }
        self.animating
    }

    pub fn progress(&self, index: usize) -> f64 {
        self.progress.get(index).copied().unwrap_or(0.0)
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }
}

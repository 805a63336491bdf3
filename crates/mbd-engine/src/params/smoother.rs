// SPDX-License-Identifier: LGPL-3.0-or-later

//! Per-parameter value smoothing in the normalized 0..1 domain.

/// How a parameter's value moves when its target changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingPolicy {
    /// Jump immediately. Used for discrete values (mute, choices) that
    /// are handled by other means than a ramp.
    None,
    /// Fixed additive step per sample.
    Linear,
    /// Fixed per-sample ratio, so gain-like values change at a constant
    /// perceived rate.
    Multiplicative,
}

/// Values at or below this never enter multiplicative stepping: a true
/// zero is a fixed point the ramp could never escape.
const MULT_FLOOR: f32 = 1e-4;

/// Ramps a normalized value toward a target.
///
/// The smoother counts down a fixed number of samples per ramp and lands
/// exactly on the target at the end, so convergence takes
/// `ramp_seconds * sample_rate` samples, no more.
#[derive(Debug, Clone)]
pub struct Smoother {
    policy: SmoothingPolicy,
    ramp_seconds: f32,
    ramp_samples: u32,
    current: f32,
    target: f32,
    step: f32,
    countdown: u32,
}

impl Smoother {
    pub fn new(policy: SmoothingPolicy, ramp_seconds: f32) -> Self {
        Self {
            policy,
            ramp_seconds,
            ramp_samples: 1,
            current: 0.0,
            target: 0.0,
            step: 0.0,
            countdown: 0,
        }
    }

    pub fn policy(&self) -> SmoothingPolicy {
        self.policy
    }

    /// Fix the ramp length for the given sample rate. Cancels any ramp
    /// in progress by snapping to the target.
    pub fn prepare(&mut self, sample_rate: f32) {
        self.ramp_samples = ((self.ramp_seconds * sample_rate).round() as u32).max(1);
        self.snap_to_target();
    }

    fn sanitize(&self, value: f32) -> f32 {
        match self.policy {
            SmoothingPolicy::Multiplicative => value.max(MULT_FLOOR),
            _ => value,
        }
    }

    /// Set current and target to the same value with no ramp.
    pub fn set_current_and_target(&mut self, value: f32) {
        let v = self.sanitize(value);
        self.current = v;
        self.target = v;
        self.countdown = 0;
    }

    fn snap_to_target(&mut self) {
        self.current = self.target;
        self.countdown = 0;
    }

    /// Begin a ramp toward `value`.
    pub fn set_target(&mut self, value: f32) {
        let value = self.sanitize(value);
        if self.policy == SmoothingPolicy::None {
            self.set_current_and_target(value);
            return;
        }
        if value == self.current {
            self.target = value;
            self.countdown = 0;
            return;
        }
        self.target = value;
        self.countdown = self.ramp_samples;
        self.step = match self.policy {
            SmoothingPolicy::None => 0.0,
            SmoothingPolicy::Linear => (self.target - self.current) / self.ramp_samples as f32,
            SmoothingPolicy::Multiplicative => {
                (self.target / self.current).powf(1.0 / self.ramp_samples as f32)
            }
        };
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }
        self.countdown -= 1;
        if self.countdown == 0 {
            self.current = self.target;
        } else {
            match self.policy {
                SmoothingPolicy::None => self.current = self.target,
                SmoothingPolicy::Linear => self.current += self.step,
                SmoothingPolicy::Multiplicative => self.current *= self.step,
            }
        }
        self.current
    }

    /// Advance `n` samples at once and return the final value.
    pub fn skip(&mut self, n: u32) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }
        if n >= self.countdown {
            self.snap_to_target();
            return self.target;
        }
        match self.policy {
            SmoothingPolicy::None => self.current = self.target,
            SmoothingPolicy::Linear => self.current += self.step * n as f32,
            SmoothingPolicy::Multiplicative => self.current *= self.step.powi(n as i32),
        }
        self.countdown -= n;
        self.current
    }

    /// The value as of the last advance, without consuming a ramp step.
    pub fn current(&self) -> f32 {
        if self.countdown == 0 {
            self.target
        } else {
            self.current
        }
    }

    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }
}

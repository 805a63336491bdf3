// SPDX-License-Identifier: LGPL-3.0-or-later

//! The audio-thread side of the parameter path.
//!
//! A [`SmoothingEngine`] binds registry controls into handles, pulls the
//! atomic cells once per block in [`snapshot_all`](SmoothingEngine::snapshot_all)
//! and hands the processing code denormalized, per-sample-smoothed values
//! through [`next`](SmoothingEngine::next) / [`skip`](SmoothingEngine::skip).
//!
//! Smoothing runs in the normalized 0..1 domain so ramp speed is uniform
//! across skewed and linear ranges alike; denormalization happens on the
//! way out.

use std::sync::Arc;

use crate::params::range::ValueRange;
use crate::params::registry::{ControlId, ParamRegistry};
use crate::params::smoother::{Smoother, SmoothingPolicy};

/// Raw-value change below this does not re-target the smoother.
const RAW_EPSILON: f32 = 1e-6;

/// Opaque handle to a bound parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamHandle(usize);

#[derive(Debug)]
struct Binding {
    id: ControlId,
    range: ValueRange,
    smoother: Smoother,
    last_raw: f32,
}

/// Owns one smoother per bound control.
///
/// Lives on the audio thread; the only cross-thread traffic is the
/// atomic loads inside `snapshot_all`.
#[derive(Debug)]
pub struct SmoothingEngine {
    registry: Arc<ParamRegistry>,
    bindings: Vec<Binding>,
}

impl SmoothingEngine {
    pub fn new(registry: Arc<ParamRegistry>) -> Self {
        Self {
            registry,
            bindings: Vec::new(),
        }
    }

    /// Bind a control for smoothed access.
    ///
    /// Policy and ramp come from the control's registry definition. The
    /// smoother starts synced to the currently published raw value.
    pub fn bind(&mut self, id: ControlId) -> ParamHandle {
        let def = *self.registry.def(id);
        let mut smoother = Smoother::new(def.policy, def.ramp_seconds);
        let raw = self.registry.get(id);
        smoother.set_current_and_target(def.range.normalize(raw));

        self.bindings.push(Binding {
            id,
            range: def.range,
            smoother,
            last_raw: raw,
        });
        ParamHandle(self.bindings.len() - 1)
    }

    /// Fix ramp lengths for the sample rate and sync every smoother to
    /// the published raw values. Call before processing starts.
    pub fn prepare(&mut self, sample_rate: f32) {
        for b in self.bindings.iter_mut() {
            b.smoother.prepare(sample_rate);
            let raw = self.registry.get(b.id);
            b.last_raw = raw;
            b.smoother.set_current_and_target(b.range.normalize(raw));
        }
    }

    /// Drop any ramp in progress and snap to the published values.
    pub fn reset(&mut self) {
        for b in self.bindings.iter_mut() {
            let raw = self.registry.get(b.id);
            b.last_raw = raw;
            b.smoother.set_current_and_target(b.range.normalize(raw));
        }
    }

    /// Pull every bound control's atomic cell, once per block.
    ///
    /// A raw value that moved by more than a negligible epsilon becomes
    /// the smoother's new target. Writes that landed between two
    /// snapshots coalesce to the latest value.
    pub fn snapshot_all(&mut self) {
        for b in self.bindings.iter_mut() {
            let raw = self.registry.get(b.id);
            if (raw - b.last_raw).abs() > RAW_EPSILON {
                b.last_raw = raw;
                b.smoother.set_target(b.range.normalize(raw));
            }
        }
    }

    /// Advance one sample and return the denormalized value.
    #[inline]
    pub fn next(&mut self, handle: ParamHandle) -> f32 {
        let b = &mut self.bindings[handle.0];
        b.range.denormalize(b.smoother.next())
    }

    /// Advance `n` samples at once and return the final denormalized value.
    pub fn skip(&mut self, handle: ParamHandle, n: u32) -> f32 {
        let b = &mut self.bindings[handle.0];
        b.range.denormalize(b.smoother.skip(n))
    }

    /// The current denormalized value, without consuming a ramp step.
    pub fn current(&self, handle: ParamHandle) -> f32 {
        let b = &self.bindings[handle.0];
        b.range.denormalize(b.smoother.current())
    }

    /// Read a toggle control as a boolean.
    pub fn current_bool(&self, handle: ParamHandle) -> bool {
        self.current(handle) > 0.5
    }

    /// The normalized smoothed value, for controls (like the band bypass
    /// fraction) that are consumed in 0..1 directly.
    pub fn current_normalized(&self, handle: ParamHandle) -> f32 {
        self.bindings[handle.0].smoother.current()
    }

    /// Advance the normalized value by `n` samples.
    pub fn skip_normalized(&mut self, handle: ParamHandle, n: u32) -> f32 {
        self.bindings[handle.0].smoother.skip(n)
    }

    pub fn is_smoothing(&self, handle: ParamHandle) -> bool {
        self.bindings[handle.0].smoother.is_smoothing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::registry::ParamRegistry;

    const SR: f32 = 48000.0;

    fn engine_with(ids: &[ControlId]) -> (Arc<ParamRegistry>, SmoothingEngine, Vec<ParamHandle>) {
        let reg = Arc::new(ParamRegistry::default_layout());
        let mut eng = SmoothingEngine::new(reg.clone());
        let handles = ids.iter().map(|&id| eng.bind(id)).collect();
        eng.prepare(SR);
        (reg, eng, handles)
    }

    #[test]
    fn bound_handle_starts_at_published_value() {
        let (_, eng, h) = engine_with(&[ControlId::LowMidFreq]);
        assert!((eng.current(h[0]) - 400.0).abs() < 0.5);
    }

    #[test]
    fn next_converges_within_ramp_duration() {
        let (reg, mut eng, h) = engine_with(&[ControlId::MidThreshold]);
        let h = h[0];

        reg.set(ControlId::MidThreshold, -24.0);
        eng.snapshot_all();

        let ramp_samples = (reg.def(ControlId::MidThreshold).ramp_seconds * SR) as usize;
        let mut v = 0.0;
        for _ in 0..ramp_samples + 1 {
            v = eng.next(h);
        }
        assert!(
            (v - -24.0).abs() < 1e-3,
            "threshold should converge to -24 within the ramp, got {v}"
        );
    }

    #[test]
    fn unsmoothed_control_jumps_at_snapshot() {
        let (reg, mut eng, h) = engine_with(&[ControlId::LowMute]);
        let h = h[0];
        assert!(!eng.current_bool(h));

        reg.set_bool(ControlId::LowMute, true);
        // Not visible until the block-boundary snapshot
        assert!(!eng.current_bool(h));
        eng.snapshot_all();
        assert!(eng.current_bool(h));
    }

    #[test]
    fn current_does_not_consume_ramp_steps() {
        let (reg, mut eng, h) = engine_with(&[ControlId::HighAttack]);
        let h = h[0];

        reg.set(ControlId::HighAttack, 100.0);
        eng.snapshot_all();

        let a = eng.current(h);
        let b = eng.current(h);
        assert_eq!(a, b, "current() must not advance the smoother");

        let stepped = eng.next(h);
        assert!(stepped != a || (stepped - 100.0).abs() < 1e-3);
    }

    #[test]
    fn writes_between_snapshots_coalesce() {
        let (reg, mut eng, h) = engine_with(&[ControlId::LowRelease]);
        let h = h[0];

        reg.set(ControlId::LowRelease, 10.0);
        reg.set(ControlId::LowRelease, 400.0);
        eng.snapshot_all();
        let v = eng.skip(h, 10 * SR as u32);
        assert!(
            (v - 400.0).abs() < 0.5,
            "only the latest write should survive, got {v}"
        );
    }

    #[test]
    fn skewed_range_ramps_in_normalized_domain() {
        let (reg, mut eng, h) = engine_with(&[ControlId::MidHighFreq]);
        let h = h[0];

        reg.set(ControlId::MidHighFreq, 20000.0);
        eng.snapshot_all();

        // Halfway through the ramp, the normalized value is halfway, which
        // for the skewed range is far below the arithmetic midpoint in Hz.
        let ramp_samples = (reg.def(ControlId::MidHighFreq).ramp_seconds * SR) as u32;
        let v = eng.skip(h, ramp_samples / 2);
        assert!(
            v < 11_000.0,
            "skewed ramp midpoint should lag the Hz midpoint, got {v}"
        );
        let end = eng.skip(h, ramp_samples);
        assert!((end - 20000.0).abs() < 1.0);
    }

    #[test]
    fn reset_snaps_ramps_to_published_value() {
        let (reg, mut eng, h) = engine_with(&[ControlId::LowRatio]);
        let h = h[0];

        reg.set(ControlId::LowRatio, 20.0);
        eng.snapshot_all();
        eng.next(h);
        assert!(eng.is_smoothing(h));

        eng.reset();
        assert!(!eng.is_smoothing(h));
        assert!((eng.current(h) - 20.0).abs() < 0.05);
    }
}

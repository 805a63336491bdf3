// SPDX-License-Identifier: LGPL-3.0-or-later

//! The control-facing parameter registry.
//!
//! Each parameter is one lock-free atomic cell. The control path writes
//! with [`ParamRegistry::set`] at any time; the audio thread reads every
//! cell exactly once per block during
//! [`SmoothingEngine::snapshot_all`](crate::params::engine::SmoothingEngine::snapshot_all).
//! Two writes between consecutive snapshots coalesce to the latest value.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::params::range::ValueRange;
use crate::params::smoother::SmoothingPolicy;

/// An `f32` stored in an `AtomicU32` via bit transmutation.
///
/// Relaxed ordering is enough: each cell is single-writer/single-reader
/// and carries an independent value, no cross-cell ordering is needed.
#[derive(Debug)]
pub struct AtomicF32 {
    inner: AtomicU32,
}

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self {
            inner: AtomicU32::new(u32::from_ne_bytes(value.to_ne_bytes())),
        }
    }

    pub fn store(&self, value: f32) {
        self.inner
            .store(u32::from_ne_bytes(value.to_ne_bytes()), Ordering::Relaxed);
    }

    pub fn load(&self) -> f32 {
        f32::from_ne_bytes(self.inner.load(Ordering::Relaxed).to_ne_bytes())
    }
}

/// Identity of every engine control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ControlId {
    /// Top-level dry/wet bypass for the whole stage.
    Bypass,
    /// Split frequency between the low and mid bands (Hz).
    LowMidFreq,
    /// Split frequency between the mid and high bands (Hz).
    MidHighFreq,

    LowMute,
    LowBypass,
    LowThreshold,
    LowAttack,
    LowRelease,
    LowRatio,
    LowGain,

    MidMute,
    MidBypass,
    MidThreshold,
    MidAttack,
    MidRelease,
    MidRatio,
    MidGain,

    HighMute,
    HighBypass,
    HighThreshold,
    HighAttack,
    HighRelease,
    HighRatio,
    HighGain,
}

impl ControlId {
    pub const COUNT: usize = 24;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The per-band control set, in registry order.
#[derive(Debug, Clone, Copy)]
pub struct BandControls {
    pub mute: ControlId,
    pub bypass: ControlId,
    pub threshold: ControlId,
    pub attack: ControlId,
    pub release: ControlId,
    pub ratio: ControlId,
    pub gain: ControlId,
}

/// Controls for band `band` (0 = low, 1 = mid, 2 = high).
pub fn band_controls(band: usize) -> BandControls {
    use ControlId::*;
    match band {
        0 => BandControls {
            mute: LowMute,
            bypass: LowBypass,
            threshold: LowThreshold,
            attack: LowAttack,
            release: LowRelease,
            ratio: LowRatio,
            gain: LowGain,
        },
        1 => BandControls {
            mute: MidMute,
            bypass: MidBypass,
            threshold: MidThreshold,
            attack: MidAttack,
            release: MidRelease,
            ratio: MidRatio,
            gain: MidGain,
        },
        _ => BandControls {
            mute: HighMute,
            bypass: HighBypass,
            threshold: HighThreshold,
            attack: HighAttack,
            release: HighRelease,
            ratio: HighRatio,
            gain: HighGain,
        },
    }
}

/// Value type of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Stored as 0.0 / 1.0.
    Bool,
    Float,
}

/// Immutable description of one control: range, default, smoothing.
#[derive(Debug, Clone, Copy)]
pub struct ParamDef {
    pub id: ControlId,
    pub name: &'static str,
    pub kind: ParamKind,
    pub range: ValueRange,
    pub default: f32,
    pub policy: SmoothingPolicy,
    /// Ramp length in seconds for the smoothed policies.
    pub ramp_seconds: f32,
}

/// Skew used for frequency ranges so the low decades get most of the
/// normalized travel.
const FREQ_SKEW: f32 = 0.198_893_84;

/// Ramp for toggles that must not pop.
const TOGGLE_RAMP: f32 = 0.01;

/// Ramp for continuous controls.
const VALUE_RAMP: f32 = 0.05;

fn float_def(
    id: ControlId,
    name: &'static str,
    range: ValueRange,
    default: f32,
    policy: SmoothingPolicy,
) -> ParamDef {
    ParamDef {
        id,
        name,
        kind: ParamKind::Float,
        range,
        default,
        policy,
        ramp_seconds: VALUE_RAMP,
    }
}

fn toggle_def(
    id: ControlId,
    name: &'static str,
    policy: SmoothingPolicy,
    ramp_seconds: f32,
) -> ParamDef {
    ParamDef {
        id,
        name,
        kind: ParamKind::Bool,
        range: ValueRange::toggle(),
        default: 0.0,
        policy,
        ramp_seconds,
    }
}

const BAND_NAMES: [[&str; 7]; 3] = [
    [
        "low_mute",
        "low_bypass",
        "low_threshold",
        "low_attack",
        "low_release",
        "low_ratio",
        "low_gain",
    ],
    [
        "mid_mute",
        "mid_bypass",
        "mid_threshold",
        "mid_attack",
        "mid_release",
        "mid_ratio",
        "mid_gain",
    ],
    [
        "high_mute",
        "high_bypass",
        "high_threshold",
        "high_attack",
        "high_release",
        "high_ratio",
        "high_gain",
    ],
];

fn band_defs(band: usize, defs: &mut Vec<ParamDef>) {
    use SmoothingPolicy::*;
    let c = band_controls(band);
    let names = BAND_NAMES[band];

    // Mute replaces the output wholesale, so it is deliberately not ramped.
    defs.push(toggle_def(c.mute, names[0], None, 0.0));
    defs.push(toggle_def(c.bypass, names[1], Linear, TOGGLE_RAMP));
    defs.push(float_def(
        c.threshold,
        names[2],
        ValueRange::new(-60.0, 24.0).with_interval(1.0),
        0.0,
        Linear,
    ));
    defs.push(float_def(c.attack, names[3], ValueRange::new(5.0, 500.0), 50.0, Linear));
    defs.push(float_def(c.release, names[4], ValueRange::new(5.0, 500.0), 250.0, Linear));
    defs.push(float_def(
        c.ratio,
        names[5],
        ValueRange::new(1.0, 100.0).with_interval(0.1).with_skew(0.4),
        1.0,
        Linear,
    ));
    defs.push(float_def(
        c.gain,
        names[6],
        ValueRange::new(-24.0, 24.0).with_interval(0.01),
        0.0,
        Multiplicative,
    ));
}

/// Parameter store shared between the control and audio threads.
///
/// The registry is immutable after construction apart from the atomic
/// cells, so it can sit behind an `Arc` with the control side calling
/// [`set`](ParamRegistry::set) and the audio side snapshotting.
#[derive(Debug)]
pub struct ParamRegistry {
    defs: Vec<ParamDef>,
    cells: Vec<AtomicF32>,
}

impl ParamRegistry {
    /// Build a registry from explicit definitions, seeded with defaults.
    ///
    /// Definitions must be listed in `ControlId` order, one per control.
    pub fn new(defs: Vec<ParamDef>) -> Self {
        debug_assert_eq!(defs.len(), ControlId::COUNT);
        debug_assert!(defs.iter().enumerate().all(|(i, d)| d.id.index() == i));
        let cells = defs.iter().map(|d| AtomicF32::new(d.default)).collect();
        Self { defs, cells }
    }

    /// The standard 3-band layout.
    pub fn default_layout() -> Self {
        use SmoothingPolicy::*;
        let mut defs = Vec::with_capacity(ControlId::COUNT);

        // The crossfade in the orchestrator does its own ramp.
        defs.push(toggle_def(ControlId::Bypass, "bypass", None, 0.0));
        defs.push(float_def(
            ControlId::LowMidFreq,
            "low_mid_freq",
            ValueRange::new(20.0, 999.0).with_skew(FREQ_SKEW),
            400.0,
            Linear,
        ));
        defs.push(float_def(
            ControlId::MidHighFreq,
            "mid_high_freq",
            ValueRange::new(1000.0, 20000.0).with_skew(FREQ_SKEW),
            2000.0,
            Linear,
        ));
        for band in 0..3 {
            band_defs(band, &mut defs);
        }

        Self::new(defs)
    }

    pub fn def(&self, id: ControlId) -> &ParamDef {
        &self.defs[id.index()]
    }

    pub fn defs(&self) -> &[ParamDef] {
        &self.defs
    }

    /// Write a raw value from the control path. Clamped and snapped to
    /// the declared range before it is published.
    pub fn set(&self, id: ControlId, value: f32) {
        let v = self.defs[id.index()].range.snap(value);
        self.cells[id.index()].store(v);
    }

    /// Convenience for boolean controls.
    pub fn set_bool(&self, id: ControlId, value: bool) {
        self.set(id, if value { 1.0 } else { 0.0 });
    }

    /// Read the last published raw value.
    pub fn get(&self, id: ControlId) -> f32 {
        self.cells[id.index()].load()
    }
}

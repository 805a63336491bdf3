// SPDX-License-Identifier: LGPL-3.0-or-later

//! The band orchestrator: crossover network + per-band compressors.
//!
//! Per block: snapshot parameters, split each channel into bands, run
//! each band's compressor, sum bands back, crossfade with the dry signal
//! if the top-level bypass is ramping. All buffers are allocated in
//! [`prepare`](MultibandDynamics::prepare); the processing path does no
//! allocation and takes no locks.

use std::sync::Arc;

use mbd_dsp::crossover::CrossoverNetwork;
use mbd_dsp::dynamics::compressor::Compressor;
use mbd_dsp::units::db_to_gain;

use crate::bypass::Bypass;
use crate::error::PrepareError;
use crate::params::engine::{ParamHandle, SmoothingEngine};
use crate::params::registry::{band_controls, ControlId, ParamRegistry};

/// Number of frequency bands in the processing topology.
pub const NUM_BANDS: usize = 3;

/// Upper bound on channels accepted by `prepare`.
pub const MAX_CHANNELS: usize = 8;

/// Ramp time for the top-level dry/wet crossfade.
const BYPASS_RAMP_SECONDS: f32 = 0.01;

#[derive(Debug, Clone, Copy)]
struct BandHandles {
    mute: ParamHandle,
    bypass: ParamHandle,
    threshold: ParamHandle,
    attack: ParamHandle,
    release: ParamHandle,
    ratio: ParamHandle,
    gain: ParamHandle,
}

#[derive(Debug, Clone, Copy)]
struct Handles {
    bypass: ParamHandle,
    low_mid_freq: ParamHandle,
    mid_high_freq: ParamHandle,
    bands: [BandHandles; NUM_BANDS],
}

/// Parameter values for one band, resolved once per block so every
/// channel sees identical settings and smoothers advance exactly
/// `block_len` samples regardless of channel count.
///
/// Bypass and makeup gain keep their block-start and block-end values so
/// the band loop can interpolate them per sample; a ramp shorter than
/// one block must still spread over its full length, not land as one
/// step at the block boundary.
#[derive(Debug, Clone, Copy)]
struct BandBlock {
    mute: bool,
    threshold: f32,
    attack: f32,
    release: f32,
    ratio: f32,
    bypass_start: f32,
    bypass_end: f32,
    gain_start: f32,
    gain_end: f32,
}

impl BandBlock {
    fn effective_ratio(&self, bypass_amount: f32) -> f32 {
        (self.ratio * (1.0 - bypass_amount)).max(1.0)
    }
}

#[derive(Debug)]
struct ChannelState {
    network: CrossoverNetwork,
    compressors: [Compressor; NUM_BANDS],
}

impl ChannelState {
    fn new(sample_rate: f32) -> Self {
        let mut compressors = [Compressor::new(), Compressor::new(), Compressor::new()];
        for c in compressors.iter_mut() {
            c.set_sample_rate(sample_rate);
        }
        Self {
            network: CrossoverNetwork::new(NUM_BANDS, sample_rate),
            compressors,
        }
    }

    fn clear(&mut self) {
        self.network.clear();
        for c in self.compressors.iter_mut() {
            c.clear();
        }
    }
}

/// The complete multiband dynamics stage.
///
/// Construction binds every control; [`prepare`](Self::prepare) sizes
/// the scratch buffers and must run before the first
/// [`process`](Self::process) call.
#[derive(Debug)]
pub struct MultibandDynamics {
    params: Arc<ParamRegistry>,
    engine: SmoothingEngine,
    handles: Handles,
    bypass: Bypass,
    channels: Vec<ChannelState>,
    band_bufs: [Vec<f32>; NUM_BANDS],
    dry_buf: Vec<f32>,
    sample_rate: f32,
    max_block: usize,
    prepared: bool,
}

impl MultibandDynamics {
    pub fn new(params: Arc<ParamRegistry>) -> Self {
        let mut engine = SmoothingEngine::new(params.clone());

        let bands = [0, 1, 2].map(|band| {
            let c = band_controls(band);
            BandHandles {
                mute: engine.bind(c.mute),
                bypass: engine.bind(c.bypass),
                threshold: engine.bind(c.threshold),
                attack: engine.bind(c.attack),
                release: engine.bind(c.release),
                ratio: engine.bind(c.ratio),
                gain: engine.bind(c.gain),
            }
        });
        let handles = Handles {
            bypass: engine.bind(ControlId::Bypass),
            low_mid_freq: engine.bind(ControlId::LowMidFreq),
            mid_high_freq: engine.bind(ControlId::MidHighFreq),
            bands,
        };

        Self {
            params,
            engine,
            handles,
            bypass: Bypass::new(),
            channels: Vec::new(),
            band_bufs: [Vec::new(), Vec::new(), Vec::new()],
            dry_buf: Vec::new(),
            sample_rate: 0.0,
            max_block: 0,
            prepared: false,
        }
    }

    /// The shared registry, for handing to the control side.
    pub fn params(&self) -> Arc<ParamRegistry> {
        self.params.clone()
    }

    /// Allocate and configure for a stream format. Must precede any
    /// [`process`](Self::process) call; may be called again on format
    /// changes.
    pub fn prepare(
        &mut self,
        sample_rate: f32,
        max_block: usize,
        num_channels: usize,
    ) -> Result<(), PrepareError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(PrepareError::InvalidSampleRate(sample_rate));
        }
        if max_block == 0 {
            return Err(PrepareError::InvalidBlockSize);
        }
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            return Err(PrepareError::InvalidChannelCount {
                got: num_channels,
                max: MAX_CHANNELS,
            });
        }

        self.sample_rate = sample_rate;
        self.max_block = max_block;

        self.engine.prepare(sample_rate);
        self.bypass.init(sample_rate, BYPASS_RAMP_SECONDS);
        self.bypass
            .set_bypass(self.engine.current_bool(self.handles.bypass));
        self.bypass.reset();

        self.channels = (0..num_channels)
            .map(|_| ChannelState::new(sample_rate))
            .collect();
        for buf in self.band_bufs.iter_mut() {
            buf.clear();
            buf.resize(max_block, 0.0);
        }
        self.dry_buf.clear();
        self.dry_buf.resize(max_block, 0.0);
        self.prepared = true;

        log::debug!(
            "prepared multiband dynamics: {sample_rate} Hz, {max_block} max samples, {num_channels} channels"
        );
        Ok(())
    }

    /// Clear all filter, envelope, smoother and crossfade memory.
    /// Parameter values are untouched.
    pub fn reset(&mut self) {
        for ch in self.channels.iter_mut() {
            ch.clear();
        }
        self.engine.reset();
        self.bypass
            .set_bypass(self.engine.current_bool(self.handles.bypass));
        self.bypass.reset();
    }

    /// Drop processing buffers. `prepare` must run again before use.
    pub fn release_resources(&mut self) {
        self.channels.clear();
        for buf in self.band_bufs.iter_mut() {
            buf.clear();
        }
        self.dry_buf.clear();
        self.prepared = false;
        log::debug!("released multiband dynamics resources");
    }

    /// Block delay contributed by this stage. The filters smear the
    /// impulse response but introduce no bulk delay.
    pub fn latency(&self) -> usize {
        0
    }

    /// Sample rate set by the last successful `prepare`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn resolve_band(&mut self, band: usize, block_len: u32) -> BandBlock {
        let h = self.handles.bands[band];
        let bypass_start = self.engine.current_normalized(h.bypass);
        let gain_start = db_to_gain(self.engine.current(h.gain));
        BandBlock {
            mute: self.engine.current_bool(h.mute),
            threshold: self.engine.skip(h.threshold, block_len),
            attack: self.engine.skip(h.attack, block_len),
            release: self.engine.skip(h.release, block_len),
            ratio: self.engine.skip(h.ratio, block_len),
            bypass_start,
            bypass_end: self.engine.skip_normalized(h.bypass, block_len),
            gain_start,
            gain_end: db_to_gain(self.engine.skip(h.gain, block_len)),
        }
    }

    /// Process one multi-channel block in place.
    ///
    /// `block` must hold one slice per prepared channel, all the same
    /// length, no longer than the prepared maximum block size.
    pub fn process(&mut self, block: &mut [&mut [f32]]) {
        debug_assert!(self.prepared, "process called before prepare");
        debug_assert_eq!(block.len(), self.channels.len());
        debug_assert!(
            block.iter().all(|ch| ch.len() <= self.max_block),
            "block longer than the prepared maximum"
        );

        let block_len = match block.first() {
            Some(ch) => ch.len().min(self.max_block),
            None => return,
        };
        if block_len == 0 {
            return;
        }

        self.engine.snapshot_all();
        self.bypass
            .set_bypass(self.engine.current_bool(self.handles.bypass));

        // Fully bypassed: identity, skip the band split entirely.
        if self.bypass.on() {
            return;
        }

        let n = block_len as u32;
        let f1 = self.engine.skip(self.handles.low_mid_freq, n);
        let f2 = self.engine.skip(self.handles.mid_high_freq, n);
        let bands = [
            self.resolve_band(0, n),
            self.resolve_band(1, n),
            self.resolve_band(2, n),
        ];

        let crossfading = !self.bypass.off();
        let mut bypass_after = self.bypass.clone();

        for (ch_idx, data) in block.iter_mut().enumerate() {
            let data = &mut data[..block_len];
            if crossfading {
                self.dry_buf[..block_len].copy_from_slice(data);
            }

            let ch = &mut self.channels[ch_idx];
            ch.network.set_frequencies(&[f1, f2]);

            for band in 0..NUM_BANDS {
                let buf = &mut self.band_bufs[band][..block_len];
                let settings = &bands[band];
                if settings.mute {
                    buf.fill(0.0);
                    continue;
                }
                ch.network.process_band(band, data, buf);

                let comp = &mut ch.compressors[band];
                comp.set_threshold(settings.threshold)
                    .set_attack(settings.attack)
                    .set_release(settings.release);

                let inv_len = 1.0 / block_len as f32;
                if (settings.bypass_end - settings.bypass_start).abs() > 1e-6 {
                    // Bypass is mid-ramp: relax the ratio toward 1 sample
                    // by sample so the gain stays continuous.
                    for (i, s) in buf.iter_mut().enumerate() {
                        let frac = (i + 1) as f32 * inv_len;
                        let amount = settings.bypass_start
                            + (settings.bypass_end - settings.bypass_start) * frac;
                        comp.set_ratio(settings.effective_ratio(amount));
                        comp.update_settings();
                        *s = comp.process_single(*s);
                    }
                } else {
                    comp.set_ratio(settings.effective_ratio(settings.bypass_end));
                    comp.process_inplace(buf);
                }

                if settings.gain_start != settings.gain_end {
                    for (i, s) in buf.iter_mut().enumerate() {
                        let frac = (i + 1) as f32 * inv_len;
                        *s *= settings.gain_start
                            + (settings.gain_end - settings.gain_start) * frac;
                    }
                } else if settings.gain_end != 1.0 {
                    for s in buf.iter_mut() {
                        *s *= settings.gain_end;
                    }
                }
            }

            for (i, s) in data.iter_mut().enumerate() {
                *s = self.band_bufs[0][i] + self.band_bufs[1][i] + self.band_bufs[2][i];
            }

            if crossfading {
                // Each channel must see the same fade curve, so the fade
                // state advances on a copy and is committed once.
                let mut fade = self.bypass.clone();
                fade.process(data, &self.dry_buf[..block_len]);
                bypass_after = fade;
            }
        }

        self.bypass = bypass_after;
    }
}

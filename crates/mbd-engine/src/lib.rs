// SPDX-License-Identifier: LGPL-3.0-or-later

//! # mbd-engine
//!
//! The multiband dynamics engine: splits a stream into 2 or 3
//! phase-coherent bands, compresses each band independently, and sums
//! them back, with every control change smoothed so automation never
//! clicks.
//!
//! The engine side of the crate is organized around three pieces:
//!
//! - [`params`]: the parameter registry (control-thread writes through
//!   lock-free atomic cells) and the smoothing engine that turns those
//!   writes into per-sample ramps on the audio thread
//! - [`bypass`]: the top-level dry/wet crossfade
//! - [`multiband`]: the orchestrator that owns the crossover network and
//!   per-band compressors and exposes `prepare`/`process`/`reset`
//!
//! ```no_run
//! use std::sync::Arc;
//! use mbd_engine::multiband::MultibandDynamics;
//! use mbd_engine::params::registry::{ControlId, ParamRegistry};
//!
//! let params = Arc::new(ParamRegistry::default_layout());
//! let mut engine = MultibandDynamics::new(params.clone());
//! engine.prepare(48000.0, 512, 2).unwrap();
//!
//! // Control thread
//! params.set(ControlId::LowThreshold, -20.0);
//!
//! // Audio thread
//! let mut left = vec![0.0f32; 512];
//! let mut right = vec![0.0f32; 512];
//! engine.process(&mut [left.as_mut_slice(), right.as_mut_slice()]);
//! ```

pub mod bypass;
pub mod error;
pub mod multiband;
pub mod params;

// SPDX-License-Identifier: LGPL-3.0-or-later

//! # mbd-dsp
//!
//! DSP building blocks for the multiband dynamics engine:
//!
//! - **Filters**: RBJ biquad coefficient calculation and a stateful
//!   [`Filter`](filters::filter::Filter) with click-free coefficient updates
//! - **Crossover**: phase-coherent Linkwitz-Riley band splitting
//!   ([`crossover::CrossoverNetwork`])
//! - **Dynamics**: feed-forward compressor with independent
//!   attack/release ballistics ([`dynamics::compressor::Compressor`])
//! - **Units**: dB/gain and time/sample conversions
//!
//! Everything in this crate is audio-thread-private state: no locks, no
//! allocation after construction, no error paths inside processing.

pub mod consts;
pub mod crossover;
pub mod dynamics;
pub mod filters;
pub mod units;

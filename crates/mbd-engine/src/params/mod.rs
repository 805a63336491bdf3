// SPDX-License-Identifier: LGPL-3.0-or-later

//! Parameter transport and smoothing.
//!
//! Control-side writes land in lock-free atomic cells owned by the
//! [`registry`]; the audio thread pulls them once per block through the
//! [`engine`], which ramps each value per sample according to its
//! declared [`smoother`] policy. Ranges with perceptual skew live in
//! [`range`].

pub mod engine;
pub mod range;
pub mod registry;
pub mod smoother;

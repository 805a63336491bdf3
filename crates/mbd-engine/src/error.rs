// SPDX-License-Identifier: LGPL-3.0-or-later

//! Engine error types.
//!
//! Errors exist only on the configuration path (`prepare`). The audio
//! callback itself never fails: bad values are clamped at the point of
//! use and a block always runs to completion.

use thiserror::Error;

/// Errors returned by [`MultibandDynamics::prepare`](crate::multiband::MultibandDynamics::prepare).
#[derive(Debug, Error, PartialEq)]
pub enum PrepareError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("maximum block size must be non-zero")]
    InvalidBlockSize,

    #[error("channel count {got} outside supported range 1..={max}")]
    InvalidChannelCount { got: usize, max: usize },
}

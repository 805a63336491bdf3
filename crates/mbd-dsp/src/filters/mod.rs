// SPDX-License-Identifier: LGPL-3.0-or-later

//! Biquad filters: coefficient calculation and stateful processing.

pub mod coeffs;
pub mod filter;

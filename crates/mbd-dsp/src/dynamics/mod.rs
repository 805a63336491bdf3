// SPDX-License-Identifier: LGPL-3.0-or-later

//! Dynamics processors.

pub mod compressor;

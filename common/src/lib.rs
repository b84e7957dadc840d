//! Shared building blocks for `lanprobe`.
//!
//! * **[`network`]**: target parsing, address ranges, MAC handling, vendor tables
//!   and the per-host scan record.
//! * **[`config`]**: scan tuning knobs and output settings.

pub mod config;
pub mod network;

//! The host discovery and fingerprinting engine behind `lanprobe`.
//!
//! A scan walks each address through the same pipeline:
//! [`probe`] (is anything there) → [`neighbor`] (which MAC answers for it) →
//! reverse DNS and [`enrich`] (what does it call itself) → [`classify`]
//! (what kind of device is it). [`scanner`] runs that pipeline for many
//! addresses at once under a fixed concurrency limit.

pub mod classify;
pub mod enrich;
pub mod neighbor;
pub mod network;
pub mod probe;
pub mod scanner;
pub mod system;
pub mod vendors;

//! Records the availability of an HTTP endpoint while a deployment rolls out.
//!
//! A [`prober::Prober`] probes the endpoint at a fixed interval, either for a fixed
//! duration or while a director task is active, and writes one CSV row per probe.
//! Afterwards [`annotate::annotate`] merges deployment event timestamps into that log.

pub mod annotate;
pub mod config;
pub mod director;
pub mod duration;
pub mod error;
pub mod http_probe;
pub mod prober;
pub mod recorder;

pub use error::{Error, Result};

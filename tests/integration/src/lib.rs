//! Integration tests for the Chainsign signing service
//!
//! This test suite validates:
//! - The documented two-transaction chain scenario for both key families
//! - Gapless counters under concurrent signing on one device
//! - Single-winner device creation under contention
//! - Detection of tampered or reordered chains

pub mod test_utils;

#[cfg(test)]
mod chain_scenario_tests;

#[cfg(test)]
mod concurrency_tests;

#[cfg(test)]
mod tamper_detection_tests;

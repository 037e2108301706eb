//! Board-agnostic core logic for the Trundle motor driver firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (channel pins, power latch, display sink)
//! - Stepper ramp engine (per-channel step-period convergence)
//! - Battery supervisor (sampling, classification, shutdown sequencing)
//! - Persisted calibration with range-checked defaults
//! - Pending-job bitset shared between timer and main-loop contexts

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod jobs;
pub mod motion;
pub mod power;
pub mod traits;

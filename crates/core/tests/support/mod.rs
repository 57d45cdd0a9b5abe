//! Shared test helpers for `devportal-core` integration tests.
//!
//! These helpers provide fixtures and an in-memory management client so the
//! façade tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod fixtures;
pub mod management;

//! Crate-level test harness.

pub(crate) mod support;

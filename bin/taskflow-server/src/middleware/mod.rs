//! HTTP middleware stack.

pub mod cors;
pub mod envelope;
pub mod trace;

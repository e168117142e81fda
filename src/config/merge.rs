//! Config composition: defaults first, then each source in precedence order.

pub mod merge_policy;
pub mod service;

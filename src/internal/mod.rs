//! Internal implementation details.

pub(crate) mod circular;

pub(crate) use circular::{Frame, ThreadDepth, DEFAULT_MAX_DEPTH};

//! Input profiling before analysis.

mod depth;

pub use depth::{profile_depth, DepthProfile, ReplicateId};

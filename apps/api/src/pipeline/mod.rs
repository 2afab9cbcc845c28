pub mod scoring;
pub mod stats;
pub mod transitions;
pub mod workflow;

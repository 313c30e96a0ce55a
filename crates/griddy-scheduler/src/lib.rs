//! # griddy-scheduler: scheduling loop (C9), built on griddy-core's
//! rolling metrics windows (C10)

mod scheduler;

pub use griddy_core::Metrics;
pub use scheduler::{run_scheduler, SchedulerContext};

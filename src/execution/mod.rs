//! Remote execution: drives a published place through an Open Cloud Luau
//! task and reports the outcome.

pub mod logs;
pub mod run;
pub mod sink;

pub use run::{CloudExecution, ExecutionOptions};
pub use sink::ConsoleSink;

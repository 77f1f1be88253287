//! Workflow (methodology) graph and the derivation of step activity from running tools.
//!
//! A step is in progress while at least one of its tools is active. Each step keeps a
//! single activity record for the lifetime of the analysis; when a finished step is
//! picked up again, the finished interval moves to the record's history.
pub mod activity_tracker;
pub mod parser;
pub mod pipeline_manager;
pub mod progress;

pub use activity_tracker::{ActivityInterval, NodeActivity, WorkflowTracker};
pub use parser::workflow::{WorkflowEdge, WorkflowNode};
pub use pipeline_manager::WorkflowGraph;
pub use progress::{ProgressRow, StepChange, StepStatus, Suggestion};

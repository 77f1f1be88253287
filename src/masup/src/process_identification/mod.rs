pub mod target_pipeline;
pub mod target_process;

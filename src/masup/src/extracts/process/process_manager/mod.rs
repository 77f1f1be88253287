pub mod executables;
pub mod handlers;
pub mod manager;
pub mod matcher;
pub mod recorder;
pub mod state;
pub mod system_refresher;

pub use manager::Analysis;

pub mod snapshot;

pub use snapshot::AnalysisSnapshot;

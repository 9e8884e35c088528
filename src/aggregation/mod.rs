pub mod composite;
pub mod config;
pub mod smoothing;

pub use composite::{compute_composites, Composites};
pub use config::AffectConfig;
pub use smoothing::{apply_calibration, compute_snapshot, compute_snapshot_with, AggregationMode};

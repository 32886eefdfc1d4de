//! Level-of-detail and viewport visibility.
//!
//! Maps a continuous camera position to the discrete tile grid: tier
//! selection with hysteresis, visible tile enumeration, resident-set
//! reconciliation, and the debounced pass runner that ties them to the
//! cache.

mod enumerate;
mod lod;
mod pass;
mod reconcile;
mod types;

pub use enumerate::{enumerate, enumerate_viewport};
pub use lod::{
    select_level, LevelGate, LevelGateConfig, DETAILED_THRESHOLD, HYSTERESIS_MARGIN,
    ULTRA_THRESHOLD,
};
pub use pass::{PassConfig, PassStats, PassStatsSnapshot, RenderSink, VisibilityRunner};
pub use reconcile::{reconcile, ViewDelta};
pub use types::ViewportState;

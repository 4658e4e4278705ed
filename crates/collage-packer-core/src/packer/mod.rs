//! Free-space bookkeeping and the placement engine.

pub mod engine;
pub mod partition;
pub mod region;

pub use engine::{PlacementEngine, Stage};
pub use partition::{AreaOrder, PartitionSet};
pub use region::Region;

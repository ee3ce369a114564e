//! Topology resolution and flow-path assignment.

pub mod assign;
pub mod cycle;
pub mod direction;
pub mod index;
pub mod resolve;

pub use assign::{assign_links, LinkFlows, SegmentReport};
pub use cycle::{run_cycle, RESOLVED_FILE_VERSION};
pub use direction::classify_direction;
pub use index::{TopologyEdge, TopologyIndex, TopologyNode};
pub use resolve::{resolve_path, resolve_step, traversable, unresolved_count};

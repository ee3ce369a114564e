use crate::index::TopologyIndex;
use flowpath_model::{FlowRecord, PathStepRecord, ResolvedHop};

/// Resolve one path step to a hop address. Switch identifiers go through the
/// index and yield the switch's primary address; packed addresses decode
/// directly. Failure is per-step and never aborts the surrounding path.
pub fn resolve_step(step: &PathStepRecord, index: &TopologyIndex) -> ResolvedHop {
    if flowpath_addr::is_switch_id(step.node) {
        match index.node_by_switch_id(step.node) {
            Some(node) => hop(node.primary_ip.clone(), step),
            None => hop(String::new(), step),
        }
    } else {
        hop(flowpath_addr::decode(step.node), step)
    }
}

/// Resolve every step of a flow's path, in order, keeping unresolved steps
/// so callers can report them.
pub fn resolve_path(flow: &FlowRecord, index: &TopologyIndex) -> Vec<ResolvedHop> {
    flow.path
        .iter()
        .map(|step| resolve_step(step, index))
        .collect()
}

/// The filtered hop sequence that segment computation consumes.
pub fn traversable(hops: &[ResolvedHop]) -> Vec<&ResolvedHop> {
    hops.iter().filter(|hop| hop.resolved).collect()
}

pub fn unresolved_count(hops: &[ResolvedHop]) -> u32 {
    hops.iter().filter(|hop| !hop.resolved).count() as u32
}

fn hop(ip: String, step: &PathStepRecord) -> ResolvedHop {
    // the null address means "no usable hop" regardless of how we got it
    let resolved = !ip.is_empty() && ip != flowpath_addr::NULL_ADDR;
    ResolvedHop {
        ip,
        step: step.clone(),
        resolved,
    }
}

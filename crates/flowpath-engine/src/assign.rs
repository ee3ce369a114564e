use crate::index::TopologyIndex;
use flowpath_model::{LinkAssignment, ResolvedHop};
use std::collections::BTreeSet;

/// Per-cycle flow membership for every edge in the index. A fresh table is
/// created each refresh cycle, so membership can never leak across cycles.
#[derive(Debug)]
pub struct LinkFlows {
    per_edge: Vec<BTreeSet<usize>>,
}

impl LinkFlows {
    pub fn new(index: &TopologyIndex) -> Self {
        Self {
            per_edge: vec![BTreeSet::new(); index.edges().len()],
        }
    }

    /// Drop a flow from every edge before reassigning it within a cycle.
    pub fn clear_flow(&mut self, flow: usize) {
        for flows in &mut self.per_edge {
            flows.remove(&flow);
        }
    }

    pub fn flows(&self, edge: usize) -> &BTreeSet<usize> {
        &self.per_edge[edge]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentReport {
    pub links: Vec<LinkAssignment>,
    pub matched_segments: u32,
    pub total_segments: u32,
}

impl SegmentReport {
    pub fn coverage(&self) -> f64 {
        if self.total_segments == 0 {
            0.0
        } else {
            f64::from(self.matched_segments) / f64::from(self.total_segments)
        }
    }
}

/// Map every consecutive pair of traversable hops to a topology link. A pair
/// with no matching link counts as a gap and the remaining pairs are still
/// processed. Membership is a set, so re-running for the same flow never
/// double-counts it on an edge.
pub fn assign_links(
    flow: usize,
    hops: &[&ResolvedHop],
    index: &TopologyIndex,
    membership: &mut LinkFlows,
) -> SegmentReport {
    let mut links = Vec::new();
    let mut matched_segments = 0;
    let total_segments = hops.len().saturating_sub(1) as u32;

    for pair in hops.windows(2) {
        let (from, to) = (&pair[0].ip, &pair[1].ip);
        if let Some((edge, direction)) = index.edge_between(from, to) {
            membership.per_edge[edge].insert(flow);
            links.push(LinkAssignment {
                edge,
                from_ip: from.clone(),
                to_ip: to.clone(),
                direction,
            });
            matched_segments += 1;
        }
    }

    SegmentReport {
        links,
        matched_segments,
        total_segments,
    }
}

use crate::assign::{assign_links, LinkFlows};
use crate::direction::classify_direction;
use crate::index::TopologyIndex;
use crate::resolve::{resolve_path, traversable, unresolved_count};
use flowpath_model::{
    CycleSummary, EdgeView, FlowRecord, FlowView, NodeView, ResolvedFile, TopologySnapshot,
};

pub const RESOLVED_FILE_VERSION: u32 = 1;

/// One full refresh cycle: build the index, resolve and assign every flow,
/// and produce the output the rendering collaborator consumes. Flow ids are
/// positions in the flow snapshot.
pub fn run_cycle(topology: &TopologySnapshot, flows: &[FlowRecord]) -> ResolvedFile {
    let index = TopologyIndex::build(topology);
    let mut membership = LinkFlows::new(&index);

    let mut flow_views = Vec::with_capacity(flows.len());
    let mut matched_segments = 0u32;
    let mut total_segments = 0u32;
    let mut unresolved_steps = 0u32;

    for (id, flow) in flows.iter().enumerate() {
        let hops = resolve_path(flow, &index);
        let unresolved = unresolved_count(&hops);
        let usable = traversable(&hops);

        let src_ip = flowpath_addr::decode(u64::from(flow.src_ip));
        let dst_ip = flowpath_addr::decode(u64::from(flow.dst_ip));
        let verdict = classify_direction(&src_ip, &dst_ip, &usable);
        let report = assign_links(id, &usable, &index, &mut membership);

        matched_segments += report.matched_segments;
        total_segments += report.total_segments;
        unresolved_steps += unresolved;

        flow_views.push(FlowView {
            id,
            src_ip,
            dst_ip,
            src_port: flow.src_port,
            dst_port: flow.dst_port,
            protocol_id: flow.protocol_id,
            unresolved_steps: unresolved,
            verdict,
            matched_segments: report.matched_segments,
            total_segments: report.total_segments,
            coverage: report.coverage(),
            links: report.links,
            hops,
        });
    }

    let nodes = index
        .nodes()
        .iter()
        .map(|node| NodeView {
            ip: node.primary_ip.clone(),
            name: node.name.clone(),
            kind: node.kind,
            switch_id: node.switch_id,
            ips: node.ips.clone(),
            is_up: node.is_up,
            is_enabled: node.is_enabled,
        })
        .collect();

    let edges = index
        .edges()
        .iter()
        .enumerate()
        .map(|(slot, edge)| EdgeView {
            src_ips: edge.src_ips.iter().cloned().collect(),
            dst_ips: edge.dst_ips.iter().cloned().collect(),
            flows: membership.flows(slot).iter().copied().collect(),
        })
        .collect();

    let coverage = if total_segments == 0 {
        0.0
    } else {
        f64::from(matched_segments) / f64::from(total_segments)
    };

    ResolvedFile {
        version: RESOLVED_FILE_VERSION,
        nodes,
        edges,
        flows: flow_views,
        summary: CycleSummary {
            flows: flows.len() as u32,
            matched_segments,
            total_segments,
            coverage,
            unresolved_steps,
            duplicate_ips: index.duplicate_ips(),
        },
    }
}

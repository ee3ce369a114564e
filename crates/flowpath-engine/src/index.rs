use flowpath_model::{LinkDirection, NodeKind, TopologySnapshot};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyNode {
    pub switch_id: u64,
    pub primary_ip: String,
    pub ips: Vec<String>,
    pub name: String,
    pub kind: NodeKind,
    pub is_up: bool,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyEdge {
    pub src_ips: BTreeSet<String>,
    pub dst_ips: BTreeSet<String>,
}

/// Lookup structures for one topology snapshot. Built once per snapshot,
/// read-only afterwards; the next snapshot gets a fresh index.
#[derive(Debug)]
pub struct TopologyIndex {
    nodes: Vec<TopologyNode>,
    edges: Vec<TopologyEdge>,
    by_switch: HashMap<u64, usize>,
    by_ip: HashMap<String, usize>,
    links: HashMap<(String, String), usize>,
    duplicate_ips: u32,
}

impl TopologyIndex {
    pub fn build(snapshot: &TopologySnapshot) -> Self {
        let mut nodes = Vec::with_capacity(snapshot.nodes.len());
        let mut by_switch = HashMap::new();
        let mut by_ip: HashMap<String, usize> = HashMap::new();
        let mut duplicate_ips = 0;

        for record in &snapshot.nodes {
            let ips: Vec<String> = record
                .ip
                .iter()
                .map(|&packed| flowpath_addr::decode(u64::from(packed)))
                .collect();
            let primary_ip = ips
                .first()
                .cloned()
                .unwrap_or_else(|| flowpath_addr::NULL_ADDR.to_string());
            let kind = if record.vertex_type == 0 {
                NodeKind::Switch
            } else {
                NodeKind::Host
            };

            let slot = nodes.len();
            if record.switch_id != 0 {
                by_switch.insert(record.switch_id, slot);
            }
            for ip in &ips {
                // last registration wins; duplicates are surfaced as a count
                if by_ip.insert(ip.clone(), slot).is_some() {
                    duplicate_ips += 1;
                }
            }

            nodes.push(TopologyNode {
                switch_id: record.switch_id,
                primary_ip,
                ips,
                name: record.device_name.clone(),
                kind,
                is_up: record.is_up,
                is_enabled: record.is_enabled,
            });
        }

        let mut edges = Vec::with_capacity(snapshot.edges.len());
        let mut links = HashMap::new();

        for record in &snapshot.edges {
            let src_ips: BTreeSet<String> = record
                .src_ip
                .iter()
                .map(|&packed| flowpath_addr::decode(u64::from(packed)))
                .collect();
            let dst_ips: BTreeSet<String> = record
                .dst_ip
                .iter()
                .map(|&packed| flowpath_addr::decode(u64::from(packed)))
                .collect();

            let slot = edges.len();
            for src in &src_ips {
                for dst in &dst_ips {
                    links.insert((src.clone(), dst.clone()), slot);
                }
            }
            edges.push(TopologyEdge { src_ips, dst_ips });
        }

        Self {
            nodes,
            edges,
            by_switch,
            by_ip,
            links,
            duplicate_ips,
        }
    }

    pub fn node_by_switch_id(&self, id: u64) -> Option<&TopologyNode> {
        self.by_switch.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn node_by_ip(&self, ip: &str) -> Option<&TopologyNode> {
        self.by_ip.get(ip).map(|&slot| &self.nodes[slot])
    }

    /// Look up the link between two hop addresses, trying `(a, b)` first and
    /// the reverse orientation second.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<(usize, LinkDirection)> {
        if let Some(&slot) = self.links.get(&(a.to_string(), b.to_string())) {
            return Some((slot, LinkDirection::Forward));
        }
        self.links
            .get(&(b.to_string(), a.to_string()))
            .map(|&slot| (slot, LinkDirection::Backward))
    }

    pub fn nodes(&self) -> &[TopologyNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TopologyEdge] {
        &self.edges
    }

    /// IP registrations that overwrote an earlier node in this snapshot.
    pub fn duplicate_ips(&self) -> u32 {
        self.duplicate_ips
    }
}

//! Shared data structures for flowpath.
//!
//! Wire records mirror the monitoring API's field shapes (camelCase JSON);
//! the resolved output file is flowpath's own versioned format.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopologySnapshot {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Packed little-endian IPv4 addresses; a multi-homed host carries several.
    pub ip: Vec<u32>,
    pub device_name: String,
    /// 0 = switch, 1 = host.
    pub vertex_type: u32,
    /// 0 means the node is not a switch.
    pub switch_id: u64,
    pub is_up: bool,
    pub is_enabled: bool,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub device_layer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub src_ip: Vec<u32>,
    pub dst_ip: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    pub src_ip: u32,
    pub dst_ip: u32,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol_id: u8,
    pub path: Vec<PathStepRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PathStepRecord {
    /// Switch identifier when above the 32-bit range, packed IPv4 otherwise.
    pub node: u64,
    pub interface_id: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Switch,
    Host,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DirectionVerdict {
    Matched,
    Reversed,
    Inconsistent,
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedHop {
    /// Empty when the step could not be resolved.
    pub ip: String,
    pub step: PathStepRecord,
    pub resolved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkAssignment {
    /// Index into the resolved file's edge table.
    pub edge: usize,
    pub from_ip: String,
    pub to_ip: String,
    pub direction: LinkDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedFile {
    pub version: u32,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub flows: Vec<FlowView>,
    pub summary: CycleSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeView {
    pub ip: String,
    pub name: String,
    pub kind: NodeKind,
    pub switch_id: u64,
    pub ips: Vec<String>,
    pub is_up: bool,
    pub is_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeView {
    pub src_ips: Vec<String>,
    pub dst_ips: Vec<String>,
    /// Flows assigned to this link in the current cycle.
    pub flows: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowView {
    pub id: usize,
    pub src_ip: String,
    pub dst_ip: String,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol_id: u8,
    pub hops: Vec<ResolvedHop>,
    pub unresolved_steps: u32,
    pub verdict: DirectionVerdict,
    pub links: Vec<LinkAssignment>,
    pub matched_segments: u32,
    pub total_segments: u32,
    pub coverage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleSummary {
    pub flows: u32,
    pub matched_segments: u32,
    pub total_segments: u32,
    pub coverage: f64,
    pub unresolved_steps: u32,
    pub duplicate_ips: u32,
}

use flowpath_engine::run_cycle;
use flowpath_model::{
    DirectionVerdict, EdgeRecord, FlowRecord, LinkDirection, NodeKind, NodeRecord, PathStepRecord,
    TopologySnapshot,
};

const SW1: u64 = 4294967297;
const SW2: u64 = 4294967298;

fn packed(ip: &str) -> u32 {
    flowpath_addr::encode(ip).unwrap()
}

#[test]
fn cycle_over_fixture_snapshots() {
    let topology: TopologySnapshot =
        serde_json::from_str(include_str!("fixtures/topology_small.json")).unwrap();
    let flows: Vec<FlowRecord> =
        serde_json::from_str(include_str!("fixtures/flows_small.json")).unwrap();

    let resolved = run_cycle(&topology, &flows);

    assert_eq!(resolved.version, 1);
    assert_eq!(resolved.nodes.len(), 4);
    assert_eq!(resolved.edges.len(), 3);
    assert_eq!(resolved.flows.len(), 2);

    let sw1 = resolved
        .nodes
        .iter()
        .find(|node| node.name == "core-sw1")
        .unwrap();
    assert_eq!(sw1.kind, NodeKind::Switch);
    assert_eq!(sw1.ip, "10.0.0.1");

    // forward flow: host-a -> sw1 -> sw2 -> host-b
    let forward = &resolved.flows[0];
    assert_eq!(forward.src_ip, "192.168.1.10");
    assert_eq!(forward.dst_ip, "192.168.1.20");
    assert_eq!(forward.verdict, DirectionVerdict::Matched);
    assert_eq!(forward.matched_segments, 3);
    assert_eq!(forward.total_segments, 3);
    assert!((forward.coverage - 1.0).abs() < 1e-9);
    let forward_ips: Vec<&str> = forward.hops.iter().map(|hop| hop.ip.as_str()).collect();
    assert_eq!(
        forward_ips,
        ["192.168.1.10", "10.0.0.1", "10.0.0.2", "192.168.1.20"]
    );
    assert!(forward
        .links
        .iter()
        .all(|link| link.direction == LinkDirection::Forward));

    // return flow traverses the same links backwards and is still Matched
    // against its own declared endpoints
    let back = &resolved.flows[1];
    assert_eq!(back.verdict, DirectionVerdict::Matched);
    assert_eq!(back.matched_segments, 3);
    assert!(back
        .links
        .iter()
        .all(|link| link.direction == LinkDirection::Backward));

    // both flows are members of every link
    for edge in &resolved.edges {
        assert_eq!(edge.flows, vec![0, 1]);
    }

    assert_eq!(resolved.summary.flows, 2);
    assert_eq!(resolved.summary.matched_segments, 6);
    assert_eq!(resolved.summary.total_segments, 6);
    assert!((resolved.summary.coverage - 1.0).abs() < 1e-9);
    assert_eq!(resolved.summary.unresolved_steps, 0);
    assert_eq!(resolved.summary.duplicate_ips, 0);
}

#[test]
fn aggregate_coverage_sums_across_flows() {
    let topology = TopologySnapshot {
        nodes: vec![
            NodeRecord {
                ip: vec![packed("192.168.1.10")],
                device_name: "host-a".to_string(),
                vertex_type: 1,
                switch_id: 0,
                is_up: true,
                is_enabled: true,
                mac: String::new(),
                brand_name: String::new(),
                device_layer: String::new(),
            },
            NodeRecord {
                ip: vec![packed("10.0.0.1")],
                device_name: "core-sw1".to_string(),
                vertex_type: 0,
                switch_id: SW1,
                is_up: true,
                is_enabled: true,
                mac: String::new(),
                brand_name: String::new(),
                device_layer: String::new(),
            },
            NodeRecord {
                ip: vec![packed("10.0.0.2")],
                device_name: "core-sw2".to_string(),
                vertex_type: 0,
                switch_id: SW2,
                is_up: true,
                is_enabled: true,
                mac: String::new(),
                brand_name: String::new(),
                device_layer: String::new(),
            },
        ],
        // only host-a <-> sw1 is known; sw1 <-> sw2 is missing
        edges: vec![EdgeRecord {
            src_ip: vec![packed("192.168.1.10")],
            dst_ip: vec![packed("10.0.0.1")],
        }],
    };

    let path = |nodes: &[u64]| -> Vec<PathStepRecord> {
        nodes
            .iter()
            .map(|&node| PathStepRecord {
                node,
                interface_id: 0,
            })
            .collect()
    };

    let flows = vec![
        // 1 of 2 segments matched
        FlowRecord {
            src_ip: packed("192.168.1.10"),
            dst_ip: packed("10.0.0.2"),
            src_port: 5000,
            dst_port: 53,
            protocol_id: 17,
            path: path(&[u64::from(packed("192.168.1.10")), SW1, SW2]),
        },
        // 1 of 1 segments matched
        FlowRecord {
            src_ip: packed("192.168.1.10"),
            dst_ip: packed("10.0.0.1"),
            src_port: 5001,
            dst_port: 53,
            protocol_id: 17,
            path: path(&[u64::from(packed("192.168.1.10")), SW1]),
        },
    ];

    let resolved = run_cycle(&topology, &flows);

    assert_eq!(resolved.flows[0].matched_segments, 1);
    assert_eq!(resolved.flows[0].total_segments, 2);
    assert_eq!(resolved.flows[1].matched_segments, 1);
    assert_eq!(resolved.flows[1].total_segments, 1);

    assert_eq!(resolved.summary.matched_segments, 2);
    assert_eq!(resolved.summary.total_segments, 3);
    assert!((resolved.summary.coverage - 2.0 / 3.0).abs() < 1e-9);

    // the single known link carries both flows
    assert_eq!(resolved.edges[0].flows, vec![0, 1]);
}

#[test]
fn flow_with_no_usable_hops_reports_empty() {
    let topology = TopologySnapshot {
        nodes: Vec::new(),
        edges: Vec::new(),
    };
    let flows = vec![FlowRecord {
        src_ip: packed("192.168.1.10"),
        dst_ip: packed("192.168.1.20"),
        src_port: 1234,
        dst_port: 80,
        protocol_id: 6,
        path: vec![PathStepRecord {
            node: SW1, // unknown switch, nothing resolves
            interface_id: 0,
        }],
    }];

    let resolved = run_cycle(&topology, &flows);
    let view = &resolved.flows[0];

    assert_eq!(view.verdict, DirectionVerdict::Empty);
    assert_eq!(view.unresolved_steps, 1);
    assert_eq!(view.total_segments, 0);
    assert_eq!(view.coverage, 0.0);
    assert_eq!(resolved.summary.coverage, 0.0);
}

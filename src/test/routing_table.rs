use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::error::SimError;
use crate::net::{SwitchId, hop_distances, validate_routing_tables};
use crate::sim::{HopDelaySpec, TopologySpec};
use crate::topo::{TopoOpts, Topology};

fn build(spec: TopologySpec) -> Topology {
    let opts = TopoOpts {
        tor_link_gbps: 10,
        network_link_gbps: 10,
        hop_delay: HopDelaySpec::Fixed { ns: 1000 },
    };
    Topology::build(&spec, &opts, &mut StdRng::seed_from_u64(0)).expect("build topology")
}

#[test]
fn hop_distances_on_line() {
    let topo = build(TopologySpec::Line { num_switches: 5 });
    let dist = hop_distances(topo.switches(), SwitchId(1));
    assert_eq!(dist, vec![Some(1), Some(0), Some(1), Some(2), Some(3)]);
}

#[test]
#[should_panic]
fn hop_distances_from_unknown_switch_panics() {
    let topo = build(TopologySpec::Simple);
    let _ = hop_distances(topo.switches(), SwitchId(3));
}

#[test]
fn hop_distances_on_fat_tree() {
    let topo = build(TopologySpec::FatTree { k: 4 });
    let ft = topo.fat_tree().unwrap();
    let dist = hop_distances(topo.switches(), ft.tor(0, 0));

    assert_eq!(dist[ft.tor(0, 0).0], Some(0));
    assert_eq!(dist[ft.agg(0, 1).0], Some(1));
    assert_eq!(dist[ft.tor(0, 1).0], Some(2));
    assert_eq!(dist[ft.core(1, 0).0], Some(2));
    assert_eq!(dist[ft.agg(3, 0).0], Some(3));
    assert_eq!(dist[ft.tor(3, 1).0], Some(4));
    assert!(dist.iter().all(|d| d.is_some()));
}

#[test]
fn built_topologies_pass_validation() {
    for spec in [
        TopologySpec::Simple,
        TopologySpec::Line { num_switches: 7 },
        TopologySpec::FatTree { k: 4 },
    ] {
        let topo = build(spec);
        validate_routing_tables(topo.switches()).unwrap();
    }
}

#[test]
fn validation_rejects_missing_entry() {
    let mut topo = build(TopologySpec::Line { num_switches: 4 });
    topo.switch_mut(SwitchId(1))
        .unwrap()
        .routing_table
        .remove(&SwitchId(3));

    let err = validate_routing_tables(topo.switches()).unwrap_err();
    assert!(matches!(err, SimError::Config(ref msg) if msg.contains("no routing entry")));
}

#[test]
fn validation_rejects_non_neighbor_next_hop() {
    let mut topo = build(TopologySpec::Line { num_switches: 4 });
    // s0 和 s3 不相邻
    topo.switch_mut(SwitchId(0))
        .unwrap()
        .routing_table
        .insert(SwitchId(2), SwitchId(3));

    let err = validate_routing_tables(topo.switches()).unwrap_err();
    assert!(matches!(err, SimError::Config(ref msg) if msg.contains("not a neighbor")));
}

#[test]
fn validation_rejects_self_entry() {
    let mut topo = build(TopologySpec::Simple);
    topo.switch_mut(SwitchId(2))
        .unwrap()
        .routing_table
        .insert(SwitchId(2), SwitchId(0));

    let err = validate_routing_tables(topo.switches()).unwrap_err();
    assert!(matches!(err, SimError::Config(ref msg) if msg.contains("itself")));
}

#[test]
fn route_path_detects_loops() {
    let mut topo = build(TopologySpec::Line { num_switches: 4 });
    // s1 把去 s3 的包送回 s0，s0 又送往 s1
    topo.switch_mut(SwitchId(1))
        .unwrap()
        .routing_table
        .insert(SwitchId(3), SwitchId(0));

    let err = topo.route_path(SwitchId(0), SwitchId(3)).unwrap_err();
    assert!(matches!(err, SimError::Config(ref msg) if msg.contains("routing loop")));
}

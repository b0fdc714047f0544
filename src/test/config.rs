use crate::error::SimError;
use crate::sim::{
    HopDelaySpec, SimConfig, SimTime, TopologySpec, TrafficPattern, TrafficSpec, TriggerSpec,
};

#[test]
fn empty_object_gives_defaults() {
    let cfg = SimConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg.time_increment(), SimTime(100));
    assert_eq!(cfg.total_time(), SimTime::from_millis(10));
    assert_eq!(cfg.seed, 0);
    assert_eq!(cfg.topology, TopologySpec::Line { num_switches: 5 });
    assert_eq!(cfg.tor_link_gbps, 10);
    assert_eq!(cfg.network_link_gbps, 10);
    assert_eq!(
        cfg.hop_delay,
        HopDelaySpec::Range {
            min_ns: 950,
            max_ns: 1050
        }
    );
    assert_eq!(cfg.traffic, TrafficSpec::default());
    assert_eq!(cfg.traffic.pattern, TrafficPattern::SimpleTopo);
    assert_eq!(cfg.traffic.pkt_bytes, 101);
    assert!(cfg.triggers.is_none());
}

#[test]
fn parses_fat_tree_with_triggers() {
    let raw = r#"{
        "time_increment_ns": 50,
        "total_time_ns": 2000000,
        "seed": 11,
        "topology": { "kind": "fat_tree", "k": 4 },
        "tor_link_gbps": 25,
        "network_link_gbps": 100,
        "hop_delay": { "kind": "fixed", "ns": 500 },
        "traffic": { "pattern": "all_to_all", "load_percent": 40 },
        "triggers": { "interval_ns": 100000, "count": 3 }
    }"#;
    let cfg = SimConfig::from_json_str(raw).unwrap();

    assert_eq!(cfg.time_increment_ns, 50);
    assert_eq!(cfg.seed, 11);
    assert_eq!(cfg.topology, TopologySpec::FatTree { k: 4 });
    assert_eq!(cfg.tor_link_gbps, 25);
    assert_eq!(cfg.network_link_gbps, 100);
    assert_eq!(cfg.hop_delay, HopDelaySpec::Fixed { ns: 500 });
    assert_eq!(cfg.traffic.pattern, TrafficPattern::AllToAll);
    assert_eq!(cfg.traffic.pkt_bytes, 101);
    assert_eq!(cfg.traffic.load_percent, 40);
    assert_eq!(
        cfg.triggers,
        Some(TriggerSpec {
            initial_delay_ns: 1_500_000,
            interval_ns: 100_000,
            count: 3,
            pkt_bytes: 60,
        })
    );
}

#[test]
fn parses_simple_topology() {
    let cfg = SimConfig::from_json_str(r#"{ "topology": { "kind": "simple" } }"#).unwrap();
    assert_eq!(cfg.topology, TopologySpec::Simple);
}

#[test]
fn unknown_topology_kind_is_a_parse_error() {
    let err = SimConfig::from_json_str(r#"{ "topology": { "kind": "torus" } }"#).unwrap_err();
    assert!(matches!(err, SimError::Json(_)));
    assert!(err.to_string().contains("unknown variant"), "{err}");
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = SimConfig::from_json_str("{ \"seed\": ").unwrap_err();
    assert!(matches!(err, SimError::Json(_)));
}

#[test]
fn validation_rejects_bad_values() {
    let cases = [
        r#"{ "time_increment_ns": 0 }"#,
        r#"{ "tor_link_gbps": 0 }"#,
        r#"{ "hop_delay": { "kind": "range", "min_ns": 10, "max_ns": 5 } }"#,
        r#"{ "traffic": { "pkt_bytes": 0 } }"#,
        r#"{ "traffic": { "load_percent": 0 } }"#,
        r#"{ "traffic": { "load_percent": 101 } }"#,
        r#"{ "triggers": { "interval_ns": 0, "count": 2 } }"#,
        r#"{ "triggers": { "interval_ns": 10, "count": 1, "pkt_bytes": 0 } }"#,
    ];
    for raw in cases {
        let err = SimConfig::from_json_str(raw).unwrap_err();
        assert!(matches!(err, SimError::Config(_)), "{raw}: {err:?}");
    }
}

#[test]
fn single_trigger_may_have_zero_interval() {
    let cfg =
        SimConfig::from_json_str(r#"{ "triggers": { "interval_ns": 0, "count": 1 } }"#).unwrap();
    assert_eq!(cfg.triggers.map(|t| t.count), Some(1));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let err = SimConfig::from_path(std::path::Path::new("/nonexistent/syndb-sim.json")).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}

#[test]
fn config_round_trips_through_json() {
    let cfg = SimConfig {
        topology: TopologySpec::FatTree { k: 6 },
        ..SimConfig::default()
    };
    let raw = serde_json::to_string(&cfg).unwrap();
    assert!(raw.contains(r#""kind":"fat_tree""#), "{raw}");
    let back = SimConfig::from_json_str(&raw).unwrap();
    assert_eq!(back.topology, cfg.topology);
}

use std::collections::HashSet;

use crate::net::{HopRecord, HostId, NormalPacket, PacketRef, SwitchId, TriggerPacket};
use crate::sim::SimTime;

#[test]
fn trigger_fan_out_targets_every_other_switch_once() {
    let pkts = TriggerPacket::fan_out(7, SwitchId(2), 5, 60);
    assert_eq!(pkts.len(), 4);

    let targets: HashSet<SwitchId> = pkts.iter().map(|p| p.dst_switch).collect();
    assert_eq!(
        targets,
        HashSet::from([SwitchId(0), SwitchId(1), SwitchId(3), SwitchId(4)])
    );
    assert!(pkts.iter().all(|p| p.trigger_id == 7));
    assert!(pkts.iter().all(|p| p.origin_switch == SwitchId(2)));
    assert!(pkts.iter().all(|p| p.size_bytes == 60));
}

#[test]
fn trigger_fan_out_on_single_switch_is_empty() {
    assert!(TriggerPacket::fan_out(0, SwitchId(0), 1, 60).is_empty());
}

#[test]
fn normal_packet_latency_and_path() {
    let mut pkt = NormalPacket::new(3, HostId(0), HostId(1), 101, SimTime(100));
    assert!(!pkt.is_delivered());
    assert_eq!(pkt.latency(), None);

    pkt.trace.push(HopRecord {
        switch: SwitchId(0),
        rx_time: SimTime(181),
    });
    pkt.trace.push(HopRecord {
        switch: SwitchId(1),
        rx_time: SimTime(1262),
    });
    pkt.end_time = Some(SimTime(2343));

    assert!(pkt.is_delivered());
    assert_eq!(pkt.latency(), Some(SimTime(2243)));
    assert_eq!(pkt.path(), vec![SwitchId(0), SwitchId(1)]);
}

#[test]
fn packet_ref_display_names_kind_and_id() {
    assert_eq!(PacketRef::Normal(12).to_string(), "normal#12");
    assert_eq!(PacketRef::Trigger(4).to_string(), "trigger#4");
}

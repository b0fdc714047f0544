//! 周期触发策略
//!
//! 首次触发在 `initial_delay`，之后每隔 `interval` 一次，共 `count` 次；
//! 触发源交换机按 id 轮转。

use tracing::debug;

use super::TriggerPolicy;
use crate::net::{SwitchId, TriggerId, TriggerPacket};
use crate::sim::{SimTime, TriggerSpec};
use crate::topo::Topology;

#[derive(Debug, Clone)]
pub struct PeriodicTriggers {
    next_at: SimTime,
    interval: SimTime,
    remaining: u32,
    next_origin: usize,
    next_trigger_id: TriggerId,
    pkt_bytes: u32,
}

impl PeriodicTriggers {
    pub fn new(spec: &TriggerSpec) -> Self {
        Self {
            next_at: SimTime(spec.initial_delay_ns),
            interval: SimTime(spec.interval_ns),
            remaining: spec.count,
            next_origin: 0,
            next_trigger_id: 0,
            pkt_bytes: spec.pkt_bytes,
        }
    }
}

impl TriggerPolicy for PeriodicTriggers {
    fn poll(&mut self, now: SimTime, topo: &Topology) -> Vec<TriggerPacket> {
        let n = topo.num_switches();
        let mut out = Vec::new();
        while self.remaining > 0 && self.next_at <= now && n > 0 {
            let origin = SwitchId(self.next_origin % n);
            let trigger_id = self.next_trigger_id;
            debug!(trigger_id, origin = %origin, at = ?self.next_at, "trigger fired");

            out.extend(TriggerPacket::fan_out(trigger_id, origin, n, self.pkt_bytes));

            self.next_origin += 1;
            self.next_trigger_id += 1;
            self.remaining -= 1;
            self.next_at += self.interval;
        }
        out
    }
}

//! 连续发包策略
//!
//! 每台主机按固定包长连续发送，发送间隔按 ToR 链路速率和负载百分比折算。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{PacketRequest, TrafficDecision, TrafficPolicy};
use crate::error::Result;
use crate::net::{Host, HostId};
use crate::sim::{SimTime, TrafficPattern, TrafficSpec};
use crate::topo::Topology;

#[derive(Debug, Clone)]
pub struct ContinuousTraffic {
    spec: TrafficSpec,
    rng: StdRng,
}

impl ContinuousTraffic {
    pub fn new(spec: TrafficSpec, seed: u64) -> Self {
        Self {
            spec,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick_dst(&mut self, src: HostId, num_hosts: usize) -> Option<HostId> {
        match self.spec.pattern {
            TrafficPattern::Idle => None,
            TrafficPattern::SimpleTopo => {
                let partner = src.0 ^ 1;
                (partner < num_hosts).then_some(HostId(partner))
            }
            TrafficPattern::AllToAll => {
                if num_hosts < 2 {
                    return None;
                }
                // 从除自己以外的 n-1 台主机中均匀抽取
                let r = self.rng.random_range(0..num_hosts - 1);
                Some(HostId(if r >= src.0 { r + 1 } else { r }))
            }
        }
    }
}

impl TrafficPolicy for ContinuousTraffic {
    fn on_host(&mut self, host: &Host, now: SimTime, topo: &Topology) -> Result<TrafficDecision> {
        let Some(dst_host) = self.pick_dst(host.id, topo.num_hosts()) else {
            return Ok(TrafficDecision::idle());
        };

        let size_bytes = self.spec.pkt_bytes;
        let line_rate_gap = topo.host_link(host.id)?.serialization_delay(size_bytes);
        // 负载 100% 时背靠背发送
        let gap = (line_rate_gap.0 * 100).div_ceil(u64::from(self.spec.load_percent));

        // 从本次的计划发送时刻起算，发送节奏不随 tick 漂移
        let scheduled = host.next_send_time.min(now);
        Ok(TrafficDecision {
            packet: Some(PacketRequest {
                dst_host,
                size_bytes,
            }),
            next_send_time: scheduled + SimTime(gap.max(1)),
        })
    }
}

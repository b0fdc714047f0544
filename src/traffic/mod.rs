//! 流量与触发策略
//!
//! 仿真核心不决定何时发包、发给谁、多大，也不决定何时触发；
//! 这些由外部策略通过下面两个 trait 提供。附带两个可直接使用的实现。

mod continuous;
mod trigger;

pub use continuous::ContinuousTraffic;
pub use trigger::PeriodicTriggers;

use crate::error::Result;
use crate::net::{Host, HostId, TriggerPacket};
use crate::sim::SimTime;
use crate::topo::Topology;

/// 主机要发出的一个包
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketRequest {
    pub dst_host: HostId,
    pub size_bytes: u32,
}

/// 流量策略对一台主机的一次决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficDecision {
    pub packet: Option<PacketRequest>,
    /// 主机下一次被询问的时刻；`SimTime::NEVER` 表示不再发包
    pub next_send_time: SimTime,
}

impl TrafficDecision {
    pub fn idle() -> Self {
        Self {
            packet: None,
            next_send_time: SimTime::NEVER,
        }
    }
}

/// 流量生成策略：每个 tick 对 `next_send_time <= now` 的主机调用，
/// 直到其 `next_send_time` 越过 `now`。包在 `host.next_send_time` 注入。
pub trait TrafficPolicy {
    fn on_host(&mut self, host: &Host, now: SimTime, topo: &Topology) -> Result<TrafficDecision>;
}

/// 触发生成策略：每个 tick 调用一次，返回本 tick 产生的触发包（按目标交换机单播扇出）
pub trait TriggerPolicy {
    fn poll(&mut self, now: SimTime, topo: &Topology) -> Vec<TriggerPacket>;
}

/// 不产生任何流量
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTraffic;

impl TrafficPolicy for NoTraffic {
    fn on_host(&mut self, _host: &Host, _now: SimTime, _topo: &Topology) -> Result<TrafficDecision> {
        Ok(TrafficDecision::idle())
    }
}

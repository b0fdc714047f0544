//! 在途数据包事件
//!
//! `PktEvent` 表示一个数据包当前所处的位置：刚离开哪个交换机、正在去哪个交换机、
//! 何时可在下一跳被处理。事件在两跳之间不做任何事，只保存 `pkt_forward_time`，
//! 直到某个 tick 的扫描发现时间已到。

use crate::error::{Result, SimError};
use crate::net::{NextHop, NormalPacket, SwitchId, TriggerPacket};
use crate::sim::SimTime;
use crate::topo::Topology;

/// 事件携带的数据包
#[derive(Debug, Clone)]
pub enum EventPacket {
    Normal(NormalPacket),
    Trigger(TriggerPacket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Normal,
    Trigger,
}

/// 一次推进的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// 已转发，事件更新为下一跳
    Forwarded,
    /// 已到达终点（普通包到达目的主机，触发包到达目标交换机）
    Arrived,
}

#[derive(Debug, Clone)]
pub struct PktEvent {
    pub pkt: EventPacket,
    pub curr_switch: Option<SwitchId>,
    /// 普通包为 None 表示下一跳是目的主机
    pub next_switch: Option<SwitchId>,
    pub pkt_forward_time: SimTime,
}

impl PktEvent {
    /// 主机刚发出的普通包，`arrive` 为到达 ToR 的时刻
    pub fn normal(pkt: NormalPacket, tor: SwitchId, arrive: SimTime) -> Self {
        Self {
            pkt: EventPacket::Normal(pkt),
            curr_switch: None,
            next_switch: Some(tor),
            pkt_forward_time: arrive,
        }
    }

    /// 触发包从 origin 交换机出发
    pub fn trigger(pkt: TriggerPacket, at: SimTime) -> Self {
        let origin = pkt.origin_switch;
        Self {
            pkt: EventPacket::Trigger(pkt),
            curr_switch: None,
            next_switch: Some(origin),
            pkt_forward_time: at,
        }
    }

    pub fn kind(&self) -> PacketKind {
        match self.pkt {
            EventPacket::Normal(_) => PacketKind::Normal,
            EventPacket::Trigger(_) => PacketKind::Trigger,
        }
    }

    /// 在 `pkt_forward_time` 处理本事件：到达终点，或在 `next_switch` 上路由并原地更新。
    pub fn advance(&mut self, topo: &mut Topology) -> Result<EventStatus> {
        let time = self.pkt_forward_time;

        let (at, next, next_forward_time) = match &mut self.pkt {
            EventPacket::Normal(pkt) => {
                let Some(at) = self.next_switch else {
                    return Ok(EventStatus::Arrived);
                };
                let dst_switch = topo.get_tor_id(pkt.dst_host)?;

                topo.switch_mut(at)?.receive_normal(pkt, time);
                let decision = topo.route_normal(at, pkt, time)?;

                let next = match decision.next_hop {
                    NextHop::Host(host) => {
                        if at != dst_switch || host != pkt.dst_host {
                            return Err(SimError::HostHopBeforeDestination {
                                switch: at,
                                pkt: pkt.id,
                            });
                        }
                        None
                    }
                    NextHop::Switch(next) => Some(next),
                };
                (at, next, decision.next_forward_time)
            }
            EventPacket::Trigger(pkt) => {
                let routed_to_host = |switch| SimError::TriggerRoutedToHost {
                    switch,
                    trigger: pkt.trigger_id,
                    dst: pkt.dst_switch,
                };
                let at = self
                    .next_switch
                    .ok_or_else(|| routed_to_host(self.curr_switch.unwrap_or(pkt.origin_switch)))?;

                if at == pkt.dst_switch {
                    topo.switch_mut(at)?.receive_trigger(pkt, time);
                    return Ok(EventStatus::Arrived);
                }

                let decision = topo.route_trigger(at, pkt, time)?;
                let NextHop::Switch(next) = decision.next_hop else {
                    return Err(routed_to_host(at));
                };
                (at, Some(next), decision.next_forward_time)
            }
        };

        assert!(
            next_forward_time > time,
            "forward time must advance at {at}: {time:?} -> {next_forward_time:?}"
        );
        self.curr_switch = Some(at);
        self.next_switch = next;
        self.pkt_forward_time = next_forward_time;
        Ok(EventStatus::Forwarded)
    }
}

//! 节点类型
//!
//! 主机与交换机。交换机持有邻居表和预先计算好的单播路由表，
//! 路由决策时在下一跳链路上预约传输，得出下一跳的收包时刻。

use std::collections::HashMap;

use super::id::{HostId, LinkId, SwitchId};
use super::link::{Endpoint, Link};
use super::packet::{HopRecord, NormalPacket, PacketRef, TriggerPacket};
use crate::error::{Result, SimError};
use crate::sim::SimTime;
use tracing::trace;

/// 主机节点
#[derive(Debug, Clone)]
pub struct Host {
    pub id: HostId,
    /// 下一次允许发包的时刻；`SimTime::NEVER` 表示不再发包
    pub next_send_time: SimTime,
}

impl Host {
    /// 创建新主机
    pub fn new(id: HostId) -> Self {
        Self {
            id,
            next_send_time: SimTime::ZERO,
        }
    }
}

/// 交换机在拓扑中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchKind {
    Tor,
    Aggregation,
    Core,
    /// line 拓扑中间不挂主机的交换机，以及 simple 拓扑的 spine
    Transit,
}

/// 下一跳
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextHop {
    Host(HostId),
    Switch(SwitchId),
}

/// 一次路由决策的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision {
    pub next_hop: NextHop,
    pub next_link: LinkId,
    /// 数据包在下一跳可被处理的时刻（hop delay + FIFO 排队 + 序列化之后）
    pub next_forward_time: SimTime,
}

/// 交换机节点
#[derive(Debug, Clone)]
pub struct Switch {
    pub id: SwitchId,
    pub kind: SwitchKind,
    pub hop_delay: SimTime,
    pub neighbor_switch_table: HashMap<SwitchId, LinkId>,
    pub neighbor_host_table: HashMap<HostId, LinkId>,
    /// 目的交换机 -> 下一跳交换机；不含自身
    pub routing_table: HashMap<SwitchId, SwitchId>,
    pub rx_normal_pkts: u64,
    pub rx_trigger_pkts: u64,
}

impl Switch {
    /// 创建新交换机
    pub fn new(id: SwitchId, kind: SwitchKind, hop_delay: SimTime) -> Self {
        Self {
            id,
            kind,
            hop_delay,
            neighbor_switch_table: HashMap::new(),
            neighbor_host_table: HashMap::new(),
            routing_table: HashMap::new(),
            rx_normal_pkts: 0,
            rx_trigger_pkts: 0,
        }
    }

    /// 普通包到达：追加 INT 逐跳记录
    pub fn receive_normal(&mut self, pkt: &mut NormalPacket, time: SimTime) {
        self.rx_normal_pkts += 1;
        pkt.trace.push(HopRecord {
            switch: self.id,
            rx_time: time,
        });
        trace!(switch = %self.id, pkt_id = pkt.id, rx_time = ?time, "normal pkt rx");
    }

    /// 触发包到达目标交换机
    pub fn receive_trigger(&mut self, pkt: &TriggerPacket, time: SimTime) {
        self.rx_trigger_pkts += 1;
        trace!(
            switch = %self.id,
            trigger_id = pkt.trigger_id,
            origin = %pkt.origin_switch,
            rx_time = ?time,
            "trigger pkt rx"
        );
    }

    /// 路由普通包。`dst_switch` 为目的主机所在的 ToR。
    ///
    /// 本交换机就是 `dst_switch` 时下一跳为目的主机，否则查路由表。
    pub fn route_normal(
        &self,
        pkt: &NormalPacket,
        dst_switch: SwitchId,
        time: SimTime,
        links: &mut [Link],
    ) -> Result<RouteDecision> {
        if dst_switch == self.id {
            let link = *self
                .neighbor_host_table
                .get(&pkt.dst_host)
                .ok_or(SimError::UnknownHost(pkt.dst_host))?;
            let next_forward_time = self.transmit(link, time, pkt.size_bytes, links);
            return Ok(RouteDecision {
                next_hop: NextHop::Host(pkt.dst_host),
                next_link: link,
                next_forward_time,
            });
        }
        self.route_to_dst_switch(
            dst_switch,
            PacketRef::Normal(pkt.id),
            pkt.size_bytes,
            time,
            links,
        )
    }

    /// 路由触发包，按其 `dst_switch` 查路由表
    pub fn route_trigger(
        &self,
        pkt: &TriggerPacket,
        time: SimTime,
        links: &mut [Link],
    ) -> Result<RouteDecision> {
        self.route_to_dst_switch(
            pkt.dst_switch,
            PacketRef::Trigger(pkt.trigger_id),
            pkt.size_bytes,
            time,
            links,
        )
    }

    fn route_to_dst_switch(
        &self,
        dst_switch: SwitchId,
        pkt: PacketRef,
        size_bytes: u32,
        time: SimTime,
        links: &mut [Link],
    ) -> Result<RouteDecision> {
        let missing = || SimError::MissingRoute {
            switch: self.id,
            dst: dst_switch,
            pkt,
        };
        let next = *self.routing_table.get(&dst_switch).ok_or_else(missing)?;
        let link = *self.neighbor_switch_table.get(&next).ok_or_else(missing)?;
        let next_forward_time = self.transmit(link, time, size_bytes, links);
        Ok(RouteDecision {
            next_hop: NextHop::Switch(next),
            next_link: link,
            next_forward_time,
        })
    }

    /// 经过 hop delay 后在出链路上排队并序列化
    fn transmit(&self, link: LinkId, time: SimTime, size_bytes: u32, links: &mut [Link]) -> SimTime {
        let ready = time + self.hop_delay;
        links[link.0].book(Endpoint::Switch(self.id), ready, size_bytes)
    }
}

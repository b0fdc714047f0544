//! 数据包类型
//!
//! 普通数据包（带 INT 逐跳记录）与触发包（每个目标交换机一个单播副本）。

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::id::{HostId, PacketId, SwitchId, TriggerId};
use crate::sim::SimTime;

/// INT 逐跳记录：数据包在某交换机的入口时刻
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HopRecord {
    pub switch: SwitchId,
    pub rx_time: SimTime,
}

/// 普通数据包
#[derive(Debug, Clone, Serialize)]
pub struct NormalPacket {
    pub id: PacketId,
    pub src_host: HostId,
    pub dst_host: HostId,
    pub size_bytes: u32,
    pub start_time: SimTime,
    /// 送达目的主机的时刻；运行结束时仍在途则为 None
    pub end_time: Option<SimTime>,
    pub trace: Vec<HopRecord>,
}

impl NormalPacket {
    pub fn new(
        id: PacketId,
        src_host: HostId,
        dst_host: HostId,
        size_bytes: u32,
        start_time: SimTime,
    ) -> Self {
        Self {
            id,
            src_host,
            dst_host,
            size_bytes,
            start_time,
            end_time: None,
            trace: Vec::new(),
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.end_time.is_some()
    }

    /// 端到端时延（仅已送达的包）
    pub fn latency(&self) -> Option<SimTime> {
        self.end_time.map(|end| end - self.start_time)
    }

    /// 经过的交换机序列
    pub fn path(&self) -> Vec<SwitchId> {
        self.trace.iter().map(|h| h.switch).collect()
    }
}

/// 触发包：一次触发在 origin 交换机发往 `dst_switch` 的单播副本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPacket {
    pub trigger_id: TriggerId,
    pub origin_switch: SwitchId,
    pub dst_switch: SwitchId,
    pub size_bytes: u32,
}

impl TriggerPacket {
    /// 为一次触发生成扇出：除 origin 外每个交换机一个副本
    pub fn fan_out(
        trigger_id: TriggerId,
        origin_switch: SwitchId,
        num_switches: usize,
        size_bytes: u32,
    ) -> Vec<TriggerPacket> {
        (0..num_switches)
            .map(SwitchId)
            .filter(|s| *s != origin_switch)
            .map(|dst_switch| TriggerPacket {
                trigger_id,
                origin_switch,
                dst_switch,
                size_bytes,
            })
            .collect()
    }
}

/// 一次触发的到达记录
#[derive(Debug, Clone, Serialize)]
pub struct TriggerRecord {
    pub trigger_id: TriggerId,
    pub origin_switch: SwitchId,
    pub origin_time: SimTime,
    pub arrivals: BTreeMap<SwitchId, SimTime>,
}

impl TriggerRecord {
    pub fn new(trigger_id: TriggerId, origin_switch: SwitchId, origin_time: SimTime) -> Self {
        Self {
            trigger_id,
            origin_switch,
            origin_time,
            arrivals: BTreeMap::new(),
        }
    }
}

/// 错误信息里引用的数据包
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketRef {
    Normal(PacketId),
    Trigger(TriggerId),
}

impl fmt::Display for PacketRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketRef::Normal(id) => write!(f, "normal#{id}"),
            PacketRef::Trigger(id) => write!(f, "trigger#{id}"),
        }
    }
}

//! 链路类型
//!
//! 全双工链路：每个发送方向各有一个 FIFO 空闲水位线（`next_idle_time`）。
//! 同一方向上的传输按预约顺序串行化，互不重叠。

use super::id::{HostId, LinkId, SwitchId};
use crate::sim::SimTime;

/// 链路端点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Host(HostId),
    Switch(SwitchId),
}

/// 网络链路
#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    /// 链路速率，Gbps（即 bits/ns）
    pub speed_gbps: u64,
    pub ends: [Endpoint; 2],
    /// `next_idle_time[i]`：从 `ends[i]` 发出方向的下一个空闲时刻
    next_idle_time: [SimTime; 2],
}

/// 计算 `size_bytes` 在 `speed_gbps` 链路上的序列化时延：ceil(bits / (bits/ns))。
pub fn serialization_delay(size_bytes: u32, speed_gbps: u64) -> SimTime {
    assert!(speed_gbps > 0, "link speed must be positive");
    let bits = u64::from(size_bytes) * 8;
    SimTime(bits.div_ceil(speed_gbps))
}

impl Link {
    /// 创建新链路
    pub fn new(id: LinkId, a: Endpoint, b: Endpoint, speed_gbps: u64) -> Self {
        Self {
            id,
            speed_gbps,
            ends: [a, b],
            next_idle_time: [SimTime::ZERO; 2],
        }
    }

    /// 发送方向下标；`from` 不是本链路端点时返回 None
    fn direction(&self, from: Endpoint) -> Option<usize> {
        self.ends.iter().position(|e| *e == from)
    }

    /// 链路另一端
    pub fn peer(&self, from: Endpoint) -> Option<Endpoint> {
        self.direction(from).map(|dir| self.ends[1 - dir])
    }

    /// 从 `from` 发出方向的空闲水位线
    pub fn next_idle_time(&self, from: Endpoint) -> Option<SimTime> {
        self.direction(from).map(|dir| self.next_idle_time[dir])
    }

    pub fn serialization_delay(&self, size_bytes: u32) -> SimTime {
        serialization_delay(size_bytes, self.speed_gbps)
    }

    /// 预约一次从 `from` 发出的传输。
    ///
    /// 最早在 `ready_time` 开始；若链路忙则排在当前水位线之后（FIFO）。
    /// 返回序列化结束时刻，即下一跳收到数据包的时刻。
    ///
    /// # Panics
    ///
    /// `from` 不是本链路端点，或水位线会倒退时 panic（属于程序错误）。
    pub fn book(&mut self, from: Endpoint, ready_time: SimTime, size_bytes: u32) -> SimTime {
        let dir = self
            .direction(from)
            .unwrap_or_else(|| panic!("{from:?} is not an endpoint of link {:?}", self.id));
        let idle = self.next_idle_time[dir];
        let start = ready_time.max(idle);
        let finish = start + self.serialization_delay(size_bytes);
        assert!(
            finish >= idle,
            "link {:?} idle time would regress: {idle:?} -> {finish:?}",
            self.id
        );
        self.next_idle_time[dir] = finish;
        finish
    }
}

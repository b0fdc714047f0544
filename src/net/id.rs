//! 标识符类型
//!
//! 拓扑 arena 中交换机、主机和链路的稠密索引，以及数据包/触发器编号。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 交换机标识符（`Topology::switches` 的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SwitchId(pub usize);

/// 主机标识符（`Topology::hosts` 的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HostId(pub usize);

/// 链路标识符（`Topology::links` 的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub usize);

pub type PacketId = u64;
pub type TriggerId = u32;

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

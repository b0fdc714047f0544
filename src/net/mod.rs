//! 网络模型模块
//!
//! 此模块包含网络模型的基础组件：标识符、链路、数据包、主机和交换机。

// 子模块声明
mod id;
mod link;
mod node;
mod packet;
mod routing;
mod stats;

// 重新导出公共接口
pub use id::{HostId, LinkId, PacketId, SwitchId, TriggerId};
pub use link::{Endpoint, Link, serialization_delay};
pub use node::{Host, NextHop, RouteDecision, Switch, SwitchKind};
pub use packet::{HopRecord, NormalPacket, PacketRef, TriggerPacket, TriggerRecord};
pub use routing::hop_distances;
pub(crate) use routing::validate_routing_tables;
pub use stats::Stats;

//! 统计信息
//!
//! 仿真运行期间的计数器。

use serde::Serialize;

/// 仿真统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub injected_pkts: u64,
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    /// 运行结束时仍在途、以不完整记录导出的包
    pub flushed_pkts: u64,
    pub triggers_sent: u64,
    pub trigger_pkts_delivered: u64,
    pub triggers_completed: u64,
    pub triggers_incomplete: u64,
}

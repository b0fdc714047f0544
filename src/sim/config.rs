//! 仿真配置
//!
//! 运行参数在构造仿真时一次性给定，之后只读。JSON 格式，
//! 未给出的字段取与 line 拓扑 10ms 实验一致的默认值。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::time::SimTime;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_time_increment_ns")]
    pub time_increment_ns: u64,
    #[serde(default = "default_total_time_ns")]
    pub total_time_ns: u64,
    /// 随机数种子（hop delay 抽样、随机目的主机）
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub topology: TopologySpec,
    #[serde(default = "default_link_gbps")]
    pub tor_link_gbps: u64,
    #[serde(default = "default_link_gbps")]
    pub network_link_gbps: u64,
    #[serde(default)]
    pub hop_delay: HopDelaySpec,
    #[serde(default)]
    pub traffic: TrafficSpec,
    #[serde(default)]
    pub triggers: Option<TriggerSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySpec {
    /// s0, s1 两个 ToR 经 spine s2 相连，各挂一台主机
    Simple,
    /// N 个交换机串成一条链，两端各挂一台主机
    Line { num_switches: usize },
    /// k 叉 fat-tree
    FatTree { k: usize },
}

impl Default for TopologySpec {
    fn default() -> Self {
        TopologySpec::Line { num_switches: 5 }
    }
}

/// 交换机 hop delay：固定值，或在构造时从 [min, max] 均匀抽样
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HopDelaySpec {
    Fixed { ns: u64 },
    Range { min_ns: u64, max_ns: u64 },
}

impl Default for HopDelaySpec {
    fn default() -> Self {
        HopDelaySpec::Range {
            min_ns: 950,
            max_ns: 1050,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficPattern {
    /// 主机两两配对互发（h0<->h1, h2<->h3, ...）
    SimpleTopo,
    /// 每个包的目的主机从其它主机中均匀抽取
    AllToAll,
    /// 不产生普通流量
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSpec {
    #[serde(default = "default_traffic_pattern")]
    pub pattern: TrafficPattern,
    #[serde(default = "default_pkt_bytes")]
    pub pkt_bytes: u32,
    /// 相对 ToR 链路速率的发送负载（1..=100）
    #[serde(default = "default_load_percent")]
    pub load_percent: u8,
}

impl Default for TrafficSpec {
    fn default() -> Self {
        Self {
            pattern: default_traffic_pattern(),
            pkt_bytes: default_pkt_bytes(),
            load_percent: default_load_percent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSpec {
    #[serde(default = "default_trigger_initial_delay_ns")]
    pub initial_delay_ns: u64,
    pub interval_ns: u64,
    pub count: u32,
    #[serde(default = "default_trigger_pkt_bytes")]
    pub pkt_bytes: u32,
}

fn default_time_increment_ns() -> u64 {
    100
}

fn default_total_time_ns() -> u64 {
    10_000_000
}

fn default_link_gbps() -> u64 {
    10
}

fn default_traffic_pattern() -> TrafficPattern {
    TrafficPattern::SimpleTopo
}

fn default_pkt_bytes() -> u32 {
    101
}

fn default_load_percent() -> u8 {
    100
}

fn default_trigger_initial_delay_ns() -> u64 {
    1_500_000
}

fn default_trigger_pkt_bytes() -> u32 {
    60
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_increment_ns: default_time_increment_ns(),
            total_time_ns: default_total_time_ns(),
            seed: 0,
            topology: TopologySpec::default(),
            tor_link_gbps: default_link_gbps(),
            network_link_gbps: default_link_gbps(),
            hop_delay: HopDelaySpec::default(),
            traffic: TrafficSpec::default(),
            triggers: None,
        }
    }
}

impl SimConfig {
    /// 解析并校验 JSON 配置
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let cfg: SimConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn time_increment(&self) -> SimTime {
        SimTime(self.time_increment_ns)
    }

    pub fn total_time(&self) -> SimTime {
        SimTime(self.total_time_ns)
    }

    /// 拓扑参数之外的运行参数检查；拓扑参数在构建拓扑时检查
    pub fn validate(&self) -> Result<()> {
        if self.time_increment_ns == 0 {
            return Err(SimError::Config("time_increment_ns must be > 0".into()));
        }
        if self.tor_link_gbps == 0 || self.network_link_gbps == 0 {
            return Err(SimError::Config("link speed must be > 0 Gbps".into()));
        }
        if let HopDelaySpec::Range { min_ns, max_ns } = self.hop_delay {
            if min_ns > max_ns {
                return Err(SimError::Config(format!(
                    "hop delay range is empty: [{min_ns}, {max_ns}]"
                )));
            }
        }
        if self.traffic.pkt_bytes == 0 {
            return Err(SimError::Config("traffic.pkt_bytes must be > 0".into()));
        }
        if !(1..=100).contains(&self.traffic.load_percent) {
            return Err(SimError::Config(format!(
                "traffic.load_percent must be in 1..=100, got {}",
                self.traffic.load_percent
            )));
        }
        if let Some(t) = &self.triggers {
            if t.pkt_bytes == 0 {
                return Err(SimError::Config("triggers.pkt_bytes must be > 0".into()));
            }
            if t.count > 1 && t.interval_ns == 0 {
                return Err(SimError::Config(
                    "triggers.interval_ns must be > 0 when count > 1".into(),
                ));
            }
        }
        Ok(())
    }
}

//! 仿真核心模块
//!
//! 此模块包含时间步进仿真的核心组件：仿真时间、配置、在途事件和仿真主循环。

// 子模块声明
mod config;
mod event;
mod simulation;
mod time;

// 重新导出公共接口
pub use config::{HopDelaySpec, SimConfig, TopologySpec, TrafficPattern, TrafficSpec, TriggerSpec};
pub use event::{EventPacket, EventStatus, PacketKind, PktEvent};
pub use simulation::{RunSummary, Simulation};
#[cfg(test)]
pub(crate) use simulation::remove_marked;
pub use time::SimTime;

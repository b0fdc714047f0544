//! 错误类型
//!
//! 仿真中所有可检测到的不一致都视为不可恢复：向上返回给运行驱动，由其终止运行。

use thiserror::Error;

use crate::net::{HostId, PacketId, PacketRef, SwitchId, TriggerId};

#[derive(Debug, Error)]
pub enum SimError {
    /// 配置错误（在仿真开始前即终止）
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unknown switch {0:?}")]
    UnknownSwitch(SwitchId),

    #[error("unknown host {0:?}")]
    UnknownHost(HostId),

    #[error("switch {switch:?} has no route to {dst:?} (packet {pkt})")]
    MissingRoute {
        switch: SwitchId,
        dst: SwitchId,
        pkt: PacketRef,
    },

    #[error("switch {switch:?} routed packet {pkt} to a host before reaching its destination switch")]
    HostHopBeforeDestination { switch: SwitchId, pkt: PacketId },

    #[error("switch {switch:?} routed trigger {trigger} (dst {dst:?}) to a host")]
    TriggerRoutedToHost {
        switch: SwitchId,
        trigger: TriggerId,
        dst: SwitchId,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

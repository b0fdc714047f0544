//! 数据包导出
//!
//! 仿真把送达（或运行结束时强制导出）的普通包、以及收齐的触发记录交给 `PacketSink`，
//! sink 取得最终所有权。

mod file;

pub use file::FileSink;

use crate::net::{NormalPacket, TriggerRecord};

pub trait PacketSink {
    /// 普通包：`end_time` 为 None 表示运行结束时仍在途
    fn dump_packet(&mut self, pkt: NormalPacket);
    fn dump_trigger(&mut self, record: TriggerRecord);
}

/// 把所有导出内容留在内存里
#[derive(Debug, Default)]
pub struct MemorySink {
    pub packets: Vec<NormalPacket>,
    pub triggers: Vec<TriggerRecord>,
}

impl MemorySink {
    pub fn delivered(&self) -> impl Iterator<Item = &NormalPacket> {
        self.packets.iter().filter(|p| p.is_delivered())
    }

    pub fn flushed(&self) -> impl Iterator<Item = &NormalPacket> {
        self.packets.iter().filter(|p| !p.is_delivered())
    }
}

impl PacketSink for MemorySink {
    fn dump_packet(&mut self, pkt: NormalPacket) {
        self.packets.push(pkt);
    }

    fn dump_trigger(&mut self, record: TriggerRecord) {
        self.triggers.push(record);
    }
}

//! 文件导出
//!
//! 输出离线分析工具使用的文本格式（字段以 tab 分隔）：
//! - `{prefix}switch_{id}.txt`：`ingress_time  packet_id`，按入口时刻排序
//! - `{prefix}sourceDestination.txt`：`packet_id  src_host  dst_host`，按包 id 排序
//! - `{prefix}trigger.txt`：每次触发一行 `trigger_id  origin_time  origin_switch`，
//!   随后是其它每个交换机一行 `switch_id  arrival_time`
//!
//! 同一交换机的入口记录可能来自不同时刻送达的包，因此先缓存，`finish` 时排序写出。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::PacketSink;
use crate::error::Result;
use crate::net::{HostId, NormalPacket, PacketId, TriggerRecord};
use crate::sim::SimTime;

#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
    /// 按交换机 id 索引的 (ingress_time, packet_id)
    ingress: Vec<Vec<(SimTime, PacketId)>>,
    src_dst: Vec<(PacketId, HostId, HostId)>,
    triggers: Vec<TriggerRecord>,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, num_switches: usize) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            ingress: vec![Vec::new(); num_switches],
            src_dst: Vec::new(),
            triggers: Vec::new(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, name))
    }

    /// 排序并写出全部文件
    pub fn finish(mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        for (switch, records) in self.ingress.iter_mut().enumerate() {
            records.sort_unstable();
            let path = self.dir.join(format!("{}switch_{switch}.txt", self.prefix));
            let mut w = BufWriter::new(File::create(&path)?);
            for (t, pkt_id) in records.iter() {
                writeln!(w, "{}\t{pkt_id}", t.0)?;
            }
            w.flush()?;
        }

        self.src_dst.sort_unstable_by_key(|(id, _, _)| *id);
        let mut w = BufWriter::new(File::create(self.path("sourceDestination.txt"))?);
        for (id, src, dst) in &self.src_dst {
            writeln!(w, "{id}\t{}\t{}", src.0, dst.0)?;
        }
        w.flush()?;

        self.triggers.sort_by_key(|r| r.trigger_id);
        let mut w = BufWriter::new(File::create(self.path("trigger.txt"))?);
        for r in &self.triggers {
            writeln!(w, "{}\t{}\t{}", r.trigger_id, r.origin_time.0, r.origin_switch.0)?;
            for (switch, t) in &r.arrivals {
                writeln!(w, "{}\t{}", switch.0, t.0)?;
            }
        }
        w.flush()?;

        info!(
            dir = %self.dir.display(),
            packets = self.src_dst.len(),
            triggers = self.triggers.len(),
            "dump files written"
        );
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PacketSink for FileSink {
    fn dump_packet(&mut self, pkt: NormalPacket) {
        for hop in &pkt.trace {
            if let Some(records) = self.ingress.get_mut(hop.switch.0) {
                records.push((hop.rx_time, pkt.id));
            }
        }
        self.src_dst.push((pkt.id, pkt.src_host, pkt.dst_host));
    }

    fn dump_trigger(&mut self, record: TriggerRecord) {
        self.triggers.push(record);
    }
}

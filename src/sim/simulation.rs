//! 时间步进仿真
//!
//! `Simulation` 持有拓扑、两个事件列表（普通包、触发包）以及外部策略，
//! 以固定步长推进时间。每个 tick：
//! 1. 触发策略产生新的触发包
//! 2. 到期的主机向流量策略要包并注入
//! 3. 扫描普通包事件列表，再扫描触发包事件列表
//! 4. `curr_time += time_increment`
//!
//! 扫描时到达终点的事件只做标记，扫描结束后再统一删除，
//! 保证 tick 开始时已存在的事件在本 tick 内恰好被访问一次。

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::config::SimConfig;
use super::event::{EventPacket, EventStatus, PacketKind, PktEvent};
use super::time::SimTime;
use crate::dump::PacketSink;
use crate::error::{Result, SimError};
use crate::net::{HostId, NormalPacket, PacketId, Stats, TriggerId, TriggerPacket, TriggerRecord};
use crate::topo::Topology;
use crate::traffic::{
    ContinuousTraffic, NoTraffic, PacketRequest, PeriodicTriggers, TrafficPolicy, TriggerPolicy,
};

/// 尚未收齐的触发记录
#[derive(Debug)]
struct PendingTrigger {
    record: TriggerRecord,
    expected: usize,
}

/// 一次运行的摘要
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub end_time: SimTime,
    pub num_switches: usize,
    pub num_hosts: usize,
    pub stats: Stats,
}

pub struct Simulation {
    curr_time: SimTime,
    time_increment: SimTime,
    total_time: SimTime,
    topo: Topology,
    normal_events: Vec<PktEvent>,
    trigger_events: Vec<PktEvent>,
    traffic: Box<dyn TrafficPolicy>,
    triggers: Option<Box<dyn TriggerPolicy>>,
    pending_triggers: BTreeMap<TriggerId, PendingTrigger>,
    next_pkt_id: PacketId,
    stats: Stats,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("curr_time", &self.curr_time)
            .field("time_increment", &self.time_increment)
            .field("total_time", &self.total_time)
            .field("num_switches", &self.topo.num_switches())
            .field("num_hosts", &self.topo.num_hosts())
            .field("normal_events", &self.normal_events.len())
            .field("trigger_events", &self.trigger_events.len())
            .field("pending_triggers", &self.pending_triggers.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// 按配置构建拓扑和自带的流量/触发策略
    pub fn from_config(cfg: &SimConfig) -> Result<Self> {
        let traffic = ContinuousTraffic::new(cfg.traffic, cfg.seed.wrapping_add(1));
        let triggers = cfg
            .triggers
            .as_ref()
            .map(|t| Box::new(PeriodicTriggers::new(t)) as Box<dyn TriggerPolicy>);
        Self::new(cfg, Box::new(traffic), triggers)
    }

    /// 按配置构建拓扑，使用给定的外部策略
    pub fn new(
        cfg: &SimConfig,
        traffic: Box<dyn TrafficPolicy>,
        triggers: Option<Box<dyn TriggerPolicy>>,
    ) -> Result<Self> {
        cfg.validate()?;
        let topo = Topology::from_config(cfg)?;
        Self::with_topology(topo, cfg.time_increment(), cfg.total_time(), traffic, triggers)
    }

    /// 使用已构建好的拓扑
    pub fn with_topology(
        topo: Topology,
        time_increment: SimTime,
        total_time: SimTime,
        traffic: Box<dyn TrafficPolicy>,
        triggers: Option<Box<dyn TriggerPolicy>>,
    ) -> Result<Self> {
        if time_increment == SimTime::ZERO {
            return Err(SimError::Config("time increment must be > 0".into()));
        }
        Ok(Self {
            curr_time: SimTime::ZERO,
            time_increment,
            total_time,
            topo,
            normal_events: Vec::new(),
            trigger_events: Vec::new(),
            traffic,
            triggers,
            pending_triggers: BTreeMap::new(),
            next_pkt_id: 0,
            stats: Stats::default(),
        })
    }

    /// 只有拓扑、没有任何流量的仿真
    pub fn idle(topo: Topology, time_increment: SimTime, total_time: SimTime) -> Result<Self> {
        Self::with_topology(topo, time_increment, total_time, Box::new(NoTraffic), None)
    }

    pub fn curr_time(&self) -> SimTime {
        self.curr_time
    }

    pub fn topology(&self) -> &Topology {
        &self.topo
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn normal_events(&self) -> &[PktEvent] {
        &self.normal_events
    }

    pub fn trigger_events(&self) -> &[PktEvent] {
        &self.trigger_events
    }

    /// 运行到 `total_time`，然后导出仍在途的普通包
    #[tracing::instrument(skip(self, sink), fields(total_time = ?self.total_time, time_increment = ?self.time_increment))]
    pub fn run(&mut self, sink: &mut dyn PacketSink) -> Result<RunSummary> {
        info!(
            switches = self.topo.num_switches(),
            hosts = self.topo.num_hosts(),
            "simulation started"
        );

        while self.curr_time < self.total_time {
            self.tick(sink)?;
        }

        self.flush_remaining_normal_pkts(sink);
        self.drop_pending_triggers();

        let summary = self.summary();
        info!(
            end_time = ?summary.end_time,
            injected = summary.stats.injected_pkts,
            delivered = summary.stats.delivered_pkts,
            flushed = summary.stats.flushed_pkts,
            triggers_completed = summary.stats.triggers_completed,
            "simulation finished"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            end_time: self.curr_time,
            num_switches: self.topo.num_switches(),
            num_hosts: self.topo.num_hosts(),
            stats: self.stats.clone(),
        }
    }

    /// 推进一个 tick
    pub fn tick(&mut self, sink: &mut dyn PacketSink) -> Result<()> {
        trace!(now = ?self.curr_time, "tick");
        self.process_trigger_generation();
        self.process_hosts()?;
        self.process_normal_pkt_events(sink)?;
        self.process_trigger_pkt_events(sink)?;
        self.curr_time += self.time_increment;
        Ok(())
    }

    /// 向触发策略要本 tick 的触发包，并为每次触发建立到达记录
    pub fn process_trigger_generation(&mut self) {
        let now = self.curr_time;
        let Some(policy) = self.triggers.as_mut() else {
            return;
        };

        for pkt in policy.poll(now, &self.topo) {
            self.add_trigger_pkt(pkt, now);
        }
    }

    /// 在 `at` 时刻从 origin 交换机发出一个触发包
    pub fn add_trigger_pkt(&mut self, pkt: TriggerPacket, at: SimTime) {
        if !self.pending_triggers.contains_key(&pkt.trigger_id) {
            self.stats.triggers_sent += 1;
            debug!(trigger_id = pkt.trigger_id, origin = %pkt.origin_switch, at = ?at, "new trigger");
        }
        let pending = self
            .pending_triggers
            .entry(pkt.trigger_id)
            .or_insert_with(|| PendingTrigger {
                record: TriggerRecord::new(pkt.trigger_id, pkt.origin_switch, at),
                expected: 0,
            });
        pending.expected += 1;
        self.trigger_events.push(PktEvent::trigger(pkt, at));
    }

    /// 询问所有到期主机，注入新包。
    ///
    /// 发送计划早于当前时刻的主机在本 tick 内被连续询问，直到计划追上当前时刻，
    /// 每个包都在其计划发送时刻注入，发送速率不受 tick 步长限制。
    /// 策略给出的下一次发送时刻没有后移时，余下的发送留到下一个 tick。
    pub fn process_hosts(&mut self) -> Result<()> {
        let now = self.curr_time;
        for idx in 0..self.topo.num_hosts() {
            let host_id = HostId(idx);
            loop {
                let host = &self.topo.hosts()[idx];
                let send_at = host.next_send_time;
                if send_at > now {
                    break;
                }

                let decision = self.traffic.on_host(host, now, &self.topo)?;
                self.topo.host_mut(host_id)?.next_send_time = decision.next_send_time;

                if let Some(req) = decision.packet {
                    self.inject(host_id, req, send_at)?;
                }
                if decision.next_send_time <= send_at {
                    break;
                }
            }
        }
        Ok(())
    }

    fn inject(&mut self, src: HostId, req: PacketRequest, at: SimTime) -> Result<()> {
        if req.size_bytes == 0 {
            return Err(SimError::Config(format!(
                "traffic policy requested an empty packet from {src}"
            )));
        }
        // 目的主机必须存在
        self.topo.get_tor_id(req.dst_host)?;

        let id = self.next_pkt_id;
        self.next_pkt_id += 1;

        let pkt = NormalPacket::new(id, src, req.dst_host, req.size_bytes, at);
        let (tor, arrive) = self.topo.inject_from_host(src, at, req.size_bytes)?;
        trace!(pkt_id = id, src = %src, dst = %req.dst_host, at = ?at, tor = %tor, arrive = ?arrive, "pkt injected");

        self.normal_events.push(PktEvent::normal(pkt, tor, arrive));
        self.stats.injected_pkts += 1;
        Ok(())
    }

    pub fn process_normal_pkt_events(&mut self, sink: &mut dyn PacketSink) -> Result<()> {
        self.process_pkt_events(PacketKind::Normal, sink)
    }

    pub fn process_trigger_pkt_events(&mut self, sink: &mut dyn PacketSink) -> Result<()> {
        self.process_pkt_events(PacketKind::Trigger, sink)
    }

    /// 对一个事件列表做一次完整扫描；到达终点的事件在扫描结束后删除
    fn process_pkt_events(&mut self, kind: PacketKind, sink: &mut dyn PacketSink) -> Result<()> {
        let now = self.curr_time;
        let Simulation {
            normal_events,
            trigger_events,
            topo,
            ..
        } = &mut *self;
        let events = match kind {
            PacketKind::Normal => normal_events,
            PacketKind::Trigger => trigger_events,
        };

        let mut to_delete = Vec::new();
        for (idx, ev) in events.iter_mut().enumerate() {
            if ev.pkt_forward_time > now {
                continue;
            }
            if ev.advance(topo)? == EventStatus::Arrived {
                to_delete.push(idx);
            }
        }

        if !to_delete.is_empty() {
            debug!(kind = ?kind, now = ?now, count = to_delete.len(), "deleting completed events");
        }
        for ev in remove_marked(events, &to_delete) {
            self.complete(ev, sink);
        }
        Ok(())
    }

    fn complete(&mut self, ev: PktEvent, sink: &mut dyn PacketSink) {
        let at = ev.pkt_forward_time;
        match ev.pkt {
            EventPacket::Normal(mut pkt) => {
                pkt.end_time = Some(at);
                self.stats.delivered_pkts += 1;
                self.stats.delivered_bytes += u64::from(pkt.size_bytes);
                trace!(pkt_id = pkt.id, end_time = ?at, "pkt delivered");
                sink.dump_packet(pkt);
            }
            EventPacket::Trigger(pkt) => self.record_trigger_arrival(pkt, at, sink),
        }
    }

    fn record_trigger_arrival(&mut self, pkt: TriggerPacket, at: SimTime, sink: &mut dyn PacketSink) {
        self.stats.trigger_pkts_delivered += 1;
        let Some(pending) = self.pending_triggers.get_mut(&pkt.trigger_id) else {
            warn!(trigger_id = pkt.trigger_id, "arrival for unknown trigger");
            return;
        };
        pending.record.arrivals.insert(pkt.dst_switch, at);

        if pending.record.arrivals.len() == pending.expected {
            if let Some(done) = self.pending_triggers.remove(&pkt.trigger_id) {
                debug!(trigger_id = pkt.trigger_id, "trigger complete");
                self.stats.triggers_completed += 1;
                sink.dump_trigger(done.record);
            }
        }
    }

    /// 运行结束：仍在途的普通包以不完整记录导出（`end_time` 为 None），每个恰好一次
    pub fn flush_remaining_normal_pkts(&mut self, sink: &mut dyn PacketSink) {
        let remaining = self.normal_events.len();
        for ev in self.normal_events.drain(..) {
            if let EventPacket::Normal(pkt) = ev.pkt {
                self.stats.flushed_pkts += 1;
                sink.dump_packet(pkt);
            }
        }
        if remaining > 0 {
            info!(count = remaining, "flushed in-flight packets");
        }
    }

    /// 未收齐的触发不导出（离线分析要求每次触发都有 N-1 个到达记录）
    fn drop_pending_triggers(&mut self) {
        self.trigger_events.clear();
        for (id, pending) in std::mem::take(&mut self.pending_triggers) {
            warn!(
                trigger_id = id,
                arrived = pending.record.arrivals.len(),
                expected = pending.expected,
                "trigger incomplete at end of run"
            );
            self.stats.triggers_incomplete += 1;
        }
    }
}

/// 删除 `marked`（升序下标）对应的事件并按原顺序返回它们；其余事件保持相对顺序
pub(crate) fn remove_marked(events: &mut Vec<PktEvent>, marked: &[usize]) -> Vec<PktEvent> {
    if marked.is_empty() {
        return Vec::new();
    }
    let mut removed = Vec::with_capacity(marked.len());
    let mut marks = marked.iter().copied().peekable();
    let old = std::mem::take(events);
    events.reserve(old.len() - marked.len());
    for (idx, ev) in old.into_iter().enumerate() {
        if marks.peek() == Some(&idx) {
            marks.next();
            removed.push(ev);
        } else {
            events.push(ev);
        }
    }
    removed
}

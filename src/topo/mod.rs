//! 拓扑
//!
//! `Topology` 是交换机、链路、主机的唯一所有者（arena），
//! 所有交叉引用（邻居表、路由表、事件中的 curr/next switch）都是整数下标。
//! 拓扑在仿真开始时构建一次，之后只有链路水位线、交换机计数器、主机发送时刻会变化。

pub mod fat_tree;
pub mod line;
pub mod simple;

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{Result, SimError};
use crate::net::{
    Endpoint, Host, HostId, Link, LinkId, NormalPacket, RouteDecision, Switch, SwitchId,
    SwitchKind, TriggerPacket, validate_routing_tables,
};
use crate::sim::{HopDelaySpec, SimConfig, SimTime, TopologySpec};

pub use fat_tree::{FatTreeLayout, FatTreePos};

/// 构建拓扑所需的链路/交换机参数
#[derive(Debug, Clone, Copy)]
pub struct TopoOpts {
    pub tor_link_gbps: u64,
    pub network_link_gbps: u64,
    pub hop_delay: HopDelaySpec,
}

impl TopoOpts {
    pub fn from_config(cfg: &SimConfig) -> Self {
        Self {
            tor_link_gbps: cfg.tor_link_gbps,
            network_link_gbps: cfg.network_link_gbps,
            hop_delay: cfg.hop_delay,
        }
    }

    /// 为一个新交换机确定 hop delay
    pub(crate) fn sample_hop_delay(&self, rng: &mut StdRng) -> SimTime {
        match self.hop_delay {
            HopDelaySpec::Fixed { ns } => SimTime(ns),
            HopDelaySpec::Range { min_ns, max_ns } => SimTime(rng.random_range(min_ns..=max_ns)),
        }
    }
}

/// 网络拓扑
#[derive(Debug, Clone)]
pub struct Topology {
    spec: TopologySpec,
    switches: Vec<Switch>,
    links: Vec<Link>,
    hosts: Vec<Host>,
    host_to_tor: HashMap<HostId, SwitchId>,
    fat_tree: Option<FatTreeLayout>,
}

impl Topology {
    /// 按配置构建拓扑；hop delay 抽样使用 `cfg.seed`
    pub fn from_config(cfg: &SimConfig) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        Self::build(&cfg.topology, &TopoOpts::from_config(cfg), &mut rng)
    }

    /// 构建指定拓扑族并填写路由表
    #[tracing::instrument(skip(opts, rng))]
    pub fn build(spec: &TopologySpec, opts: &TopoOpts, rng: &mut StdRng) -> Result<Self> {
        if opts.tor_link_gbps == 0 || opts.network_link_gbps == 0 {
            return Err(SimError::Config("link speed must be > 0 Gbps".into()));
        }

        let mut topo = Topology {
            spec: spec.clone(),
            switches: Vec::new(),
            links: Vec::new(),
            hosts: Vec::new(),
            host_to_tor: HashMap::new(),
            fat_tree: None,
        };

        match *spec {
            TopologySpec::Simple => simple::build_simple(&mut topo, opts, rng),
            TopologySpec::Line { num_switches } => {
                line::build_line(&mut topo, num_switches, opts, rng)?
            }
            TopologySpec::FatTree { k } => {
                let layout = fat_tree::build_fat_tree(&mut topo, k, opts, rng)?;
                topo.fat_tree = Some(layout);
            }
        }

        validate_routing_tables(&topo.switches)?;

        info!(
            switches = topo.switches.len(),
            hosts = topo.hosts.len(),
            links = topo.links.len(),
            "topology built"
        );
        Ok(topo)
    }

    pub(crate) fn create_switch(&mut self, kind: SwitchKind, hop_delay: SimTime) -> SwitchId {
        let id = SwitchId(self.switches.len());
        self.switches.push(Switch::new(id, kind, hop_delay));
        id
    }

    pub(crate) fn create_host(&mut self) -> HostId {
        let id = HostId(self.hosts.len());
        self.hosts.push(Host::new(id));
        id
    }

    fn create_link(&mut self, a: Endpoint, b: Endpoint, speed_gbps: u64) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link::new(id, a, b, speed_gbps));
        id
    }

    /// 主机挂到 ToR 上
    pub(crate) fn add_host_to_tor(&mut self, host: HostId, tor: SwitchId, speed_gbps: u64) {
        let link = self.create_link(Endpoint::Host(host), Endpoint::Switch(tor), speed_gbps);
        self.switches[tor.0].neighbor_host_table.insert(host, link);
        self.host_to_tor.insert(host, tor);
        debug!(host = %host, tor = %tor, link = link.0, "host attached");
    }

    pub(crate) fn connect_switches(&mut self, a: SwitchId, b: SwitchId, speed_gbps: u64) {
        let link = self.create_link(Endpoint::Switch(a), Endpoint::Switch(b), speed_gbps);
        self.switches[a.0].neighbor_switch_table.insert(b, link);
        self.switches[b.0].neighbor_switch_table.insert(a, link);
    }

    /// 用拓扑族的下一跳规则填写所有交换机的路由表
    pub(crate) fn fill_routing_tables<F>(&mut self, next_hop: F)
    where
        F: Fn(SwitchId, SwitchId) -> SwitchId,
    {
        let n = self.switches.len();
        for from in (0..n).map(SwitchId) {
            let table: HashMap<SwitchId, SwitchId> = (0..n)
                .map(SwitchId)
                .filter(|dst| *dst != from)
                .map(|dst| (dst, next_hop(from, dst)))
                .collect();
            self.switches[from.0].routing_table = table;
        }
    }

    pub fn spec(&self) -> &TopologySpec {
        &self.spec
    }

    pub fn fat_tree(&self) -> Option<&FatTreeLayout> {
        self.fat_tree.as_ref()
    }

    pub fn num_switches(&self) -> usize {
        self.switches.len()
    }

    pub fn num_hosts(&self) -> usize {
        self.hosts.len()
    }

    pub fn switches(&self) -> &[Switch] {
        &self.switches
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn get_tor_id(&self, host: HostId) -> Result<SwitchId> {
        self.host_to_tor
            .get(&host)
            .copied()
            .ok_or(SimError::UnknownHost(host))
    }

    pub fn get_switch_by_id(&self, id: SwitchId) -> Result<&Switch> {
        self.switches.get(id.0).ok_or(SimError::UnknownSwitch(id))
    }

    pub fn switch_mut(&mut self, id: SwitchId) -> Result<&mut Switch> {
        self.switches.get_mut(id.0).ok_or(SimError::UnknownSwitch(id))
    }

    pub fn host_mut(&mut self, id: HostId) -> Result<&mut Host> {
        self.hosts.get_mut(id.0).ok_or(SimError::UnknownHost(id))
    }

    /// 主机与其 ToR 之间的链路
    pub fn host_link(&self, host: HostId) -> Result<&Link> {
        let tor = self.get_tor_id(host)?;
        let link = self.switches[tor.0]
            .neighbor_host_table
            .get(&host)
            .ok_or(SimError::UnknownHost(host))?;
        Ok(&self.links[link.0])
    }

    /// 主机在 `time` 把包发上 ToR 链路；返回 (ToR, 到达 ToR 的时刻)
    pub fn inject_from_host(
        &mut self,
        host: HostId,
        time: SimTime,
        size_bytes: u32,
    ) -> Result<(SwitchId, SimTime)> {
        let tor = self.get_tor_id(host)?;
        let link = *self.switches[tor.0]
            .neighbor_host_table
            .get(&host)
            .ok_or(SimError::UnknownHost(host))?;
        let arrive = self.links[link.0].book(Endpoint::Host(host), time, size_bytes);
        Ok((tor, arrive))
    }

    /// 在交换机 `at` 上路由普通包
    pub fn route_normal(
        &mut self,
        at: SwitchId,
        pkt: &NormalPacket,
        time: SimTime,
    ) -> Result<RouteDecision> {
        let dst_switch = self.get_tor_id(pkt.dst_host)?;
        let Topology {
            switches, links, ..
        } = &mut *self;
        let sw = switches.get(at.0).ok_or(SimError::UnknownSwitch(at))?;
        sw.route_normal(pkt, dst_switch, time, links)
    }

    /// 在交换机 `at` 上路由触发包
    pub fn route_trigger(
        &mut self,
        at: SwitchId,
        pkt: &TriggerPacket,
        time: SimTime,
    ) -> Result<RouteDecision> {
        let Topology {
            switches, links, ..
        } = &mut *self;
        let sw = switches.get(at.0).ok_or(SimError::UnknownSwitch(at))?;
        sw.route_trigger(pkt, time, links)
    }

    /// 沿路由表从 `from` 走到 `dst`，返回经过的交换机序列（含两端）。
    ///
    /// 不预约链路。路由表出现环路时返回错误。
    pub fn route_path(&self, from: SwitchId, dst: SwitchId) -> Result<Vec<SwitchId>> {
        self.get_switch_by_id(from)?;
        self.get_switch_by_id(dst)?;

        let mut path = vec![from];
        let mut at = from;
        while at != dst {
            let next = *self.switches[at.0].routing_table.get(&dst).ok_or_else(|| {
                SimError::Config(format!("switch {at} has no routing entry for {dst}"))
            })?;
            if path.contains(&next) {
                return Err(SimError::Config(format!(
                    "routing loop from {from} to {dst}: {path:?} -> {next}"
                )));
            }
            path.push(next);
            at = next;
        }
        Ok(path)
    }
}

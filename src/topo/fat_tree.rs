//! Fat-tree 拓扑构建
//!
//! k 个 pod，每个 pod 有 k/2 个 ToR 和 k/2 个汇聚交换机；(k/2)^2 个核心交换机，
//! 每个 ToR 挂 k/2 台主机。汇聚交换机 `a` 只连核心组 `a`。
//!
//! 路由是确定性的上行/下行路由：先爬到与目的地共享的汇聚平面/核心组，再下行。
//! 任意两个交换机之间只有一条无环路径，跨 pod 的 ToR 间路径恰好经过一个核心。

use rand::rngs::StdRng;

use super::{TopoOpts, Topology};
use crate::error::{Result, SimError};
use crate::net::{HostId, SwitchId, SwitchKind};

/// 交换机在 fat-tree 中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatTreePos {
    Tor { pod: usize, idx: usize },
    Agg { pod: usize, idx: usize },
    Core { group: usize, idx: usize },
}

#[derive(Debug, Clone)]
pub struct FatTreeLayout {
    pub k: usize,
    pub hosts: Vec<HostId>,
    pub tor_switches: Vec<SwitchId>,
    pub agg_switches: Vec<SwitchId>,
    pub core_switches: Vec<SwitchId>,
    /// 按交换机 id 索引
    positions: Vec<FatTreePos>,
}

impl FatTreeLayout {
    fn half(&self) -> usize {
        self.k / 2
    }

    pub fn host(&self, pod: usize, tor: usize, host: usize) -> HostId {
        let half = self.half();
        let idx = (pod * half + tor) * half + host;
        self.hosts[idx]
    }

    pub fn tor(&self, pod: usize, tor: usize) -> SwitchId {
        let half = self.half();
        let idx = pod * half + tor;
        self.tor_switches[idx]
    }

    pub fn agg(&self, pod: usize, agg: usize) -> SwitchId {
        let half = self.half();
        let idx = pod * half + agg;
        self.agg_switches[idx]
    }

    pub fn core(&self, group: usize, index: usize) -> SwitchId {
        let half = self.half();
        let idx = group * half + index;
        self.core_switches[idx]
    }

    pub fn position(&self, id: SwitchId) -> Option<FatTreePos> {
        self.positions.get(id.0).copied()
    }

    pub fn is_core(&self, id: SwitchId) -> bool {
        matches!(self.position(id), Some(FatTreePos::Core { .. }))
    }

    fn pos(&self, id: SwitchId) -> FatTreePos {
        self.positions[id.0]
    }

    /// 从 `from` 去往 `dst` 的下一跳（`from != dst`）
    pub fn next_hop(&self, from: SwitchId, dst: SwitchId) -> SwitchId {
        use FatTreePos::*;

        let half = self.half();
        match (self.pos(from), self.pos(dst)) {
            // ToR：同 pod 的汇聚直达，其余都先上到目的所在的汇聚平面
            (Tor { pod, .. }, Tor { idx: de, .. }) => self.agg(pod, de % half),
            (Tor { pod, .. }, Agg { pod: dp, idx: da }) => {
                if dp == pod {
                    dst
                } else {
                    self.agg(pod, da)
                }
            }
            (Tor { pod, .. }, Core { group, .. }) => self.agg(pod, group),

            (Agg { pod, idx: a }, Tor { pod: dp, idx: de }) => {
                if dp == pod {
                    dst
                } else {
                    self.core(a, (dp + de) % half)
                }
            }
            (Agg { pod, idx: a }, Agg { pod: dp, idx: da }) => {
                if da == a {
                    self.core(a, dp % half)
                } else {
                    // 换平面：经本 pod 的 ToR 下去再上来
                    self.tor(pod, da % half)
                }
            }
            (Agg { pod, idx: a }, Core { group, .. }) => {
                if group == a {
                    dst
                } else {
                    self.tor(pod, group % half)
                }
            }

            (Core { group, .. }, Tor { pod: dp, .. }) => self.agg(dp, group),
            (Core { group, .. }, Agg { pod: dp, idx: da }) => {
                if da == group {
                    dst
                } else {
                    self.agg(dp, group)
                }
            }
            (Core { group, .. }, Core { .. }) => self.agg(0, group),
        }
    }
}

pub fn build_fat_tree(
    topo: &mut Topology,
    k: usize,
    opts: &TopoOpts,
    rng: &mut StdRng,
) -> Result<FatTreeLayout> {
    if k < 2 || k % 2 != 0 {
        return Err(SimError::Config(format!(
            "fat-tree k must be even and >= 2, got {k}"
        )));
    }

    let half = k / 2;
    let mut positions = Vec::with_capacity(half * half + k * k);

    let mut core_switches = Vec::with_capacity(half * half);
    for group in 0..half {
        for idx in 0..half {
            core_switches.push(topo.create_switch(SwitchKind::Core, opts.sample_hop_delay(rng)));
            positions.push(FatTreePos::Core { group, idx });
        }
    }

    let mut hosts = Vec::with_capacity(k * half * half);
    let mut tor_switches = Vec::with_capacity(k * half);
    let mut agg_switches = Vec::with_capacity(k * half);

    for pod in 0..k {
        for idx in 0..half {
            tor_switches.push(topo.create_switch(SwitchKind::Tor, opts.sample_hop_delay(rng)));
            positions.push(FatTreePos::Tor { pod, idx });
        }
        for idx in 0..half {
            agg_switches.push(
                topo.create_switch(SwitchKind::Aggregation, opts.sample_hop_delay(rng)),
            );
            positions.push(FatTreePos::Agg { pod, idx });
        }
    }

    for pod in 0..k {
        for tor in 0..half {
            let tor_id = tor_switches[pod * half + tor];
            for _ in 0..half {
                let host_id = topo.create_host();
                topo.add_host_to_tor(host_id, tor_id, opts.tor_link_gbps);
                hosts.push(host_id);
            }
            for agg in 0..half {
                let agg_id = agg_switches[pod * half + agg];
                topo.connect_switches(tor_id, agg_id, opts.network_link_gbps);
            }
        }
    }

    for pod in 0..k {
        for agg in 0..half {
            let agg_id = agg_switches[pod * half + agg];
            for index in 0..half {
                let core_id = core_switches[agg * half + index];
                topo.connect_switches(agg_id, core_id, opts.network_link_gbps);
            }
        }
    }

    let layout = FatTreeLayout {
        k,
        hosts,
        tor_switches,
        agg_switches,
        core_switches,
        positions,
    };
    topo.fill_routing_tables(|from, dst| layout.next_hop(from, dst));

    Ok(layout)
}

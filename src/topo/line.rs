//! Line 拓扑构建
//!
//! 拓扑结构：h0 <-> s0 <-> s1 <-> ... <-> s(N-1) <-> h1

use rand::rngs::StdRng;

use super::{TopoOpts, Topology};
use crate::error::{Result, SimError};
use crate::net::{SwitchId, SwitchKind};

/// 构建 N 个交换机的链；N = 1 时两台主机都挂在 s0 上
pub fn build_line(
    topo: &mut Topology,
    num_switches: usize,
    opts: &TopoOpts,
    rng: &mut StdRng,
) -> Result<()> {
    if num_switches == 0 {
        return Err(SimError::Config(
            "line topology needs at least one switch".into(),
        ));
    }

    let last = num_switches - 1;
    let switches: Vec<SwitchId> = (0..num_switches)
        .map(|i| {
            let kind = if i == 0 || i == last {
                SwitchKind::Tor
            } else {
                SwitchKind::Transit
            };
            topo.create_switch(kind, opts.sample_hop_delay(rng))
        })
        .collect();

    for pair in switches.windows(2) {
        topo.connect_switches(pair[0], pair[1], opts.network_link_gbps);
    }

    let h0 = topo.create_host();
    let h1 = topo.create_host();
    topo.add_host_to_tor(h0, switches[0], opts.tor_link_gbps);
    topo.add_host_to_tor(h1, switches[last], opts.tor_link_gbps);

    // 链上唯一路径：朝目的方向走一步
    topo.fill_routing_tables(|from, dst| {
        if dst.0 > from.0 {
            SwitchId(from.0 + 1)
        } else {
            SwitchId(from.0 - 1)
        }
    });
    Ok(())
}

//! Simple 拓扑构建
//!
//! ```text
//!            s2
//!         /      \
//!        s0       s1
//!        |        |
//!        h0       h1
//! ```

use rand::rngs::StdRng;

use super::{TopoOpts, Topology};
use crate::net::SwitchKind;

/// 构建 simple 拓扑：两个 ToR 经一个 spine 相连
pub fn build_simple(topo: &mut Topology, opts: &TopoOpts, rng: &mut StdRng) {
    let s0 = topo.create_switch(SwitchKind::Tor, opts.sample_hop_delay(rng));
    let s1 = topo.create_switch(SwitchKind::Tor, opts.sample_hop_delay(rng));
    let spine = topo.create_switch(SwitchKind::Transit, opts.sample_hop_delay(rng));

    // s0 <-> s2 <-> s1
    topo.connect_switches(s0, spine, opts.network_link_gbps);
    topo.connect_switches(s1, spine, opts.network_link_gbps);

    let h0 = topo.create_host();
    let h1 = topo.create_host();
    topo.add_host_to_tor(h0, s0, opts.tor_link_gbps);
    topo.add_host_to_tor(h1, s1, opts.tor_link_gbps);

    // spine 直达任意 ToR；ToR 之间一律经 spine
    topo.fill_routing_tables(|from, dst| if from == spine { dst } else { spine });
}

//! 路由表辅助
//!
//! 路由表本身由各拓扑按确定性规则填写（见 `crate::topo`）。
//! 本模块提供与拓扑族无关的检查：
//! - 交换机图上的 BFS 跳数距离（用于验证路由是最短路径、估计触发包时延下界）
//! - 路由表完整性检查：每个条目都指向邻居，且不含自身条目

use std::collections::VecDeque;

use super::id::SwitchId;
use super::node::Switch;
use crate::error::{Result, SimError};

/// 从 `from` 出发在交换机图上做 BFS，返回到每个交换机的最少跳数。
///
/// # Panics
///
/// `from` 不是 `switches` 的下标时 panic；调用方应先用 `Topology::get_switch_by_id` 确认。
pub fn hop_distances(switches: &[Switch], from: SwitchId) -> Vec<Option<usize>> {
    let mut dist: Vec<Option<usize>> = vec![None; switches.len()];
    let mut q: VecDeque<SwitchId> = VecDeque::new();

    dist[from.0] = Some(0);
    q.push_back(from);

    while let Some(v) = q.pop_front() {
        let dv = dist[v.0].unwrap_or(0);
        // 邻居按 id 排序，保证遍历顺序稳定
        let mut nbrs: Vec<SwitchId> = switches[v.0].neighbor_switch_table.keys().copied().collect();
        nbrs.sort();
        for n in nbrs {
            if dist[n.0].is_none() {
                dist[n.0] = Some(dv + 1);
                q.push_back(n);
            }
        }
    }

    dist
}

/// 检查所有交换机的路由表：每个其它交换机恰好一个条目，下一跳必须是邻居。
pub(crate) fn validate_routing_tables(switches: &[Switch]) -> Result<()> {
    for sw in switches {
        if sw.routing_table.contains_key(&sw.id) {
            return Err(SimError::Config(format!(
                "switch {} has a routing entry for itself",
                sw.id
            )));
        }
        for dst in switches.iter().map(|s| s.id).filter(|d| *d != sw.id) {
            let next = sw.routing_table.get(&dst).ok_or_else(|| {
                SimError::Config(format!("switch {} has no routing entry for {dst}", sw.id))
            })?;
            if !sw.neighbor_switch_table.contains_key(next) {
                return Err(SimError::Config(format!(
                    "switch {} routes {dst} via {next}, which is not a neighbor",
                    sw.id
                )));
            }
        }
    }
    Ok(())
}

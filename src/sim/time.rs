//! 仿真时间类型
//!
//! 定义仿真时间及其单位转换。

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// 仿真时间（纳秒）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    /// 永不到达的时刻（例如不再发包的主机）
    pub const NEVER: SimTime = SimTime(u64::MAX);

    pub fn from_nanos(ns: u64) -> SimTime {
        SimTime(ns)
    }
    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000_000_000))
    }

    pub fn as_nanos(self) -> u64 {
        self.0
    }
}

/// `NEVER` 吸收任何加数；其余情况溢出即 panic（时间计算错误属于程序错误）。
impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        if self == SimTime::NEVER || rhs == SimTime::NEVER {
            return SimTime::NEVER;
        }
        match self.0.checked_add(rhs.0) {
            Some(ns) => SimTime(ns),
            None => panic!("sim time overflow: {self:?} + {rhs:?}"),
        }
    }
}

impl AddAssign for SimTime {
    fn add_assign(&mut self, rhs: SimTime) {
        *self = *self + rhs;
    }
}

/// 时间差不会为负；`rhs > self` 时 panic
impl Sub for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: SimTime) -> SimTime {
        match self.0.checked_sub(rhs.0) {
            Some(ns) => SimTime(ns),
            None => panic!("sim time would go negative: {self:?} - {rhs:?}"),
        }
    }
}

// ==========================================
// 服务监控看板 - 子节点权重
// ==========================================
// 权重挂在父子边上 (子节点 → 父节点)
// - 0: 排除,不参与占比计算
// - ESSENTIAL: 关键子项,其严重级别作为聚合结果下限
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 子节点权重 (非负实数)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(f64);

impl Weight {
    /// 排除
    pub const ZERO: Weight = Weight(0.0);
    /// 单位权重
    pub const UNIT: Weight = Weight(1.0);
    /// 关键子项哨兵值
    pub const ESSENTIAL: Weight = Weight(10.0);

    /// 构造权重,负数、NaN 与无穷大归一化为 0
    pub fn new(value: f64) -> Self {
        if !value.is_finite() || value < 0.0 {
            Weight::ZERO
        } else {
            Weight(value)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_excluded(self) -> bool {
        self.0 == 0.0
    }

    pub fn is_essential(self) -> bool {
        self.0 == Weight::ESSENTIAL.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::UNIT
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Weight::new(value)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_essential() {
            write!(f, "ESSENTIAL")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

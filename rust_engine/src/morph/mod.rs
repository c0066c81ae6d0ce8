//! Morph 变形系统
//!
//! Morph 目标以相对基础几何体的增量存储。着色器按固定槽位
//! `0..NUM_MORPH_TARGETS` 读取目标，目标数超过槽位数时每帧按权重
//! 选出权重最大的若干个目标。

use std::borrow::Cow;

mod manager;
mod morph;

pub use manager::MorphManager;
pub use morph::MorphTarget;

/// 着色器同时支持的最大活动 Morph 目标数
pub const NUM_MORPH_TARGETS: usize = 8;

/// 槽位 slot 的位置增量属性名
pub fn morph_position_name(slot: usize) -> String {
    format!("MorphPosition{}", slot)
}

/// 槽位 slot 的法线增量属性名
pub fn morph_normal_name(slot: usize) -> String {
    format!("MorphNormal{}", slot)
}

/// 槽位 slot 的切线增量属性名
pub fn morph_tangent_name(slot: usize) -> String {
    format!("MorphTangent{}", slot)
}

/// 本帧活动的 Morph 目标（目标索引与权重，按槽位顺序）
///
/// 目标数不超过槽位数时直接借用管理器的数据。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActiveSet<'a> {
    pub indices: Cow<'a, [usize]>,
    pub weights: Cow<'a, [f32]>,
}

impl ActiveSet<'_> {
    /// 转为不借用管理器的副本
    pub fn into_owned(self) -> ActiveSet<'static> {
        ActiveSet {
            indices: Cow::Owned(self.indices.into_owned()),
            weights: Cow::Owned(self.weights.into_owned()),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// 遍历 (目标索引, 权重)
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices.iter().copied().zip(self.weights.iter().copied())
    }
}

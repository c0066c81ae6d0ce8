//! Morph 管理器

use std::borrow::Cow;

use crate::config::get_config;
use crate::model::Geometry;
use crate::shader::{ParamValue, ParameterSink, MORPH_TARGETS_DEFINE, MORPH_TARGET_INFLUENCES};
use crate::{DeformError, Result};

use super::{ActiveSet, MorphTarget, NUM_MORPH_TARGETS};

/// 目标数不超过槽位数时的活动索引，槽位与插入顺序一致
const IDENTITY_SLOTS: [usize; NUM_MORPH_TARGETS] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Morph 管理器：基础几何体 + 增量目标 + 每个目标的权重
///
/// `weights` 与 `targets` 始终等长且按相同顺序索引。
#[derive(Clone, Debug)]
pub struct MorphManager {
    base_geometry: Geometry,
    targets: Vec<MorphTarget>,
    weights: Vec<f32>,
}

impl MorphManager {
    pub fn new(mut base_geometry: Geometry) -> Self {
        base_geometry.set_shader_define(MORPH_TARGETS_DEFINE, &NUM_MORPH_TARGETS.to_string());
        Self {
            base_geometry,
            targets: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn base_geometry(&self) -> &Geometry {
        &self.base_geometry
    }

    /// 可变基础几何体
    ///
    /// 已添加目标的增量基于添加时的位置，修改顶点位置不会更新增量。
    pub fn base_geometry_mut(&mut self) -> &mut Geometry {
        &mut self.base_geometry
    }

    /// 获取 Morph 目标数量
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn targets(&self) -> &[MorphTarget] {
        &self.targets
    }

    pub fn get_target(&self, index: usize) -> Option<&MorphTarget> {
        self.targets.get(index)
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// 添加绝对坐标的 Morph 目标，内部转换为增量
    ///
    /// 整批先校验再提交，失败时不修改管理器。
    pub fn add_morph_targets(&mut self, targets: Vec<Geometry>) -> Result<()> {
        self.add_absolute_targets(targets, get_config().validate_morph_targets)
    }

    fn add_absolute_targets(&mut self, targets: Vec<Geometry>, validate: bool) -> Result<()> {
        if validate {
            for target in &targets {
                MorphTarget::validate(&self.base_geometry, target)?;
            }
        }

        let mut converted = Vec::with_capacity(targets.len());
        for target in targets {
            // 已整批校验
            converted.push(MorphTarget::from_absolute(&self.base_geometry, target, false)?);
        }
        self.push_targets(converted);
        Ok(())
    }

    /// 添加已经是增量的 Morph 目标
    pub fn add_morph_target_deltas(&mut self, deltas: Vec<Geometry>) -> Result<()> {
        if get_config().validate_morph_targets {
            for delta in &deltas {
                if delta.vertex_count() != self.base_geometry.vertex_count() {
                    return Err(DeformError::VertexCountMismatch {
                        base: self.base_geometry.vertex_count(),
                        target: delta.vertex_count(),
                    });
                }
            }
        }

        self.push_targets(deltas.into_iter().map(MorphTarget::from_deltas).collect());
        Ok(())
    }

    fn push_targets(&mut self, targets: Vec<MorphTarget>) {
        let added = targets.len();
        self.weights.extend(std::iter::repeat(0.0).take(added));
        self.targets.extend(targets);

        log::debug!("添加 {} 个 Morph 目标，共 {} 个", added, self.targets.len());

        // 目标数不超过槽位数时全部直接发送，槽位与插入顺序一致
        let count = self.targets.len();
        if count <= NUM_MORPH_TARGETS {
            self.update_target_attributes(&IDENTITY_SLOTS[..count]);
        }
    }

    /// 替换全部权重，长度必须与目标数一致
    pub fn set_weights(&mut self, weights: Vec<f32>) -> Result<()> {
        if weights.len() != self.weights.len() {
            return Err(DeformError::WeightCountMismatch {
                expected: self.weights.len(),
                actual: weights.len(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    /// 设置单个目标的权重
    pub fn set_weight(&mut self, index: usize, weight: f32) -> Result<()> {
        let slot = self
            .weights
            .get_mut(index)
            .ok_or(DeformError::MorphIndexOutOfRange(index))?;
        *slot = weight;
        Ok(())
    }

    /// 重置所有权重
    pub fn reset_all_weights(&mut self) {
        self.weights.iter_mut().for_each(|w| *w = 0.0);
    }

    /// 选出本帧活动目标
    ///
    /// 目标数不超过槽位数时按插入顺序借用全部目标和权重，不分配；
    /// 否则按权重降序返回前 `NUM_MORPH_TARGETS` 个，权重相同时保持插入顺序。
    pub fn active_morph_targets(&self) -> ActiveSet<'_> {
        let count = self.targets.len();
        if count <= NUM_MORPH_TARGETS {
            return ActiveSet {
                indices: Cow::Borrowed(&IDENTITY_SLOTS[..count]),
                weights: Cow::Borrowed(&self.weights),
            };
        }

        let order = rank_by_weight(&self.weights, NUM_MORPH_TARGETS);
        let weights = order.iter().map(|&i| self.weights[i]).collect();
        ActiveSet {
            indices: Cow::Owned(order),
            weights: Cow::Owned(weights),
        }
    }

    /// 按顺序把目标的属性名绑定到槽位 0..n
    pub fn update_target_attributes(&mut self, indices: &[usize]) {
        for (slot, &index) in indices.iter().enumerate() {
            if let Some(target) = self.targets.get_mut(index) {
                target.set_slot(slot);
            }
        }
    }

    /// 为基础几何体和所有目标设置索引缓冲区
    pub fn set_indices(&mut self, indices: Vec<u32>) {
        for target in &mut self.targets {
            target.set_indices(indices.clone());
        }
        self.base_geometry.set_indices(indices);
    }

    /// CPU 侧计算变形后的几何体
    ///
    /// 尚未实现：返回基础几何体的副本，权重被忽略。
    pub fn compute_morphed(&self, _weights: &[f32]) -> Geometry {
        self.base_geometry.clone()
    }

    /// 绘制前调用：传输基础几何体和活动目标，上传权重
    pub fn render_setup(&mut self, sink: &mut dyn ParameterSink) {
        self.base_geometry.render_setup(sink);

        // 目标数超过槽位数时槽位取决于权重排名，每帧重新绑定
        if self.targets.len() > NUM_MORPH_TARGETS {
            let active = self.active_morph_targets().into_owned();
            self.update_target_attributes(&active.indices);
            self.upload_active(sink, &active);
        } else {
            self.upload_active(sink, &self.active_morph_targets());
        }
    }

    fn upload_active(&self, sink: &mut dyn ParameterSink, active: &ActiveSet) {
        if active.is_empty() {
            return;
        }

        for &index in active.indices.iter() {
            self.targets[index].geometry().render_setup(sink);
        }

        if get_config().debug_log {
            log::trace!("Morph 活动目标: {:?} 权重: {:?}", active.indices, active.weights);
        }
        sink.set_parameter(MORPH_TARGET_INFLUENCES, ParamValue::Floats(&active.weights[..]));
    }
}

/// 排序用的权重：0.0 与 -0.0 视为相等，NaN 排在最后
fn rank_key(weight: f32) -> f32 {
    if weight.is_nan() {
        f32::NEG_INFINITY
    } else if weight == 0.0 {
        0.0
    } else {
        weight
    }
}

/// 按权重降序排列的前 limit 个索引，权重相同时索引小的在前
fn rank_by_weight(weights: &[f32], limit: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    // sort_by 是稳定排序
    order.sort_by(|&a, &b| rank_key(weights[b]).total_cmp(&rank_key(weights[a])));
    order.truncate(limit);
    order
}

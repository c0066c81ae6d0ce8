//! 蒙皮网格

use glam::{Mat4, Vec4};
use std::rc::Rc;

use crate::config::get_config;
use crate::model::{Mesh, RenderInfo};
use crate::node::NodeTransforms;
use crate::raycast::{Intersect, Raycaster};
use crate::shader::{ParamValue, ParameterSink, BIND_MATRIX, BIND_MATRIX_INVERSE, BONE_MATRICES};
use crate::skeleton::SharedSkeleton;
use crate::{DeformError, Result};

use super::{compute_skinning, SkinningInput, SkinningOutput};

/// 蒙皮网格：网格 + 共享骨架 + 绑定矩阵
#[derive(Clone, Debug)]
pub struct SkinnedMesh {
    pub mesh: Mesh,
    skeleton: Option<SharedSkeleton>,
    bind_matrix: Mat4,
    bind_matrix_inverse: Mat4,
}

impl SkinnedMesh {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            skeleton: None,
            bind_matrix: Mat4::IDENTITY,
            bind_matrix_inverse: Mat4::IDENTITY,
        }
    }

    /// 绑定骨架，记录网格当前世界矩阵作为绑定矩阵
    pub fn bind<N>(&mut self, skeleton: SharedSkeleton, nodes: &N)
    where
        N: NodeTransforms + ?Sized,
    {
        self.bind_matrix = nodes.world_matrix(self.mesh.node);
        self.bind_matrix_inverse = self.bind_matrix.inverse();

        match skeleton.try_borrow() {
            Ok(s) => log::debug!(
                "网格 {} 绑定骨架 {}（{} 根骨骼）",
                self.mesh.name,
                s.name,
                s.bone_count()
            ),
            Err(_) => log::debug!("网格 {} 绑定骨架（骨架正在使用中）", self.mesh.name),
        }
        self.skeleton = Some(skeleton);
    }

    pub fn skeleton(&self) -> Option<&SharedSkeleton> {
        self.skeleton.as_ref()
    }

    pub fn bind_matrix(&self) -> Mat4 {
        self.bind_matrix
    }

    pub fn bind_matrix_inverse(&self) -> Mat4 {
        self.bind_matrix_inverse
    }

    /// 用网格当前世界矩阵重新计算绑定逆矩阵（绑定矩阵不变）
    pub fn refresh_bind_inverse<N>(&mut self, nodes: &N)
    where
        N: NodeTransforms + ?Sized,
    {
        self.bind_matrix_inverse = nodes.world_matrix(self.mesh.node).inverse();
    }

    /// 骨骼数量，未绑定骨架时为 0
    pub fn max_bones(&self) -> Result<usize> {
        match &self.skeleton {
            Some(shared) => shared
                .try_borrow()
                .map(|s| s.bone_count())
                .map_err(|_| DeformError::SkeletonBusy),
            None => Ok(0),
        }
    }

    /// 把节点树恢复到骨架的绑定姿态
    pub fn pose<N>(&self, nodes: &mut N) -> Result<()>
    where
        N: NodeTransforms + ?Sized,
    {
        let skeleton = self.skeleton.as_ref().ok_or(DeformError::SkeletonNotBound)?;
        let skeleton = skeleton.try_borrow().map_err(|_| DeformError::SkeletonBusy)?;
        skeleton.pose(nodes);
        Ok(())
    }

    /// 绘制前调用：上传模型矩阵、更新骨架并上传蒙皮参数
    pub fn render_setup<N>(
        &mut self,
        sink: &mut dyn ParameterSink,
        nodes: &N,
        rinfo: &RenderInfo,
    ) -> Result<()>
    where
        N: NodeTransforms + ?Sized,
    {
        let shared = self.skeleton.as_ref().ok_or(DeformError::SkeletonNotBound)?;
        let mut skeleton = shared.try_borrow_mut().map_err(|_| DeformError::SkeletonBusy)?;

        self.mesh.render_setup(sink, nodes, rinfo);

        skeleton.update(nodes);
        if get_config().debug_log {
            log::trace!("网格 {} 上传 {} 个骨骼矩阵", self.mesh.name, skeleton.bone_count());
        }

        sink.set_parameter(BIND_MATRIX, ParamValue::Mat4(&[self.bind_matrix]));
        sink.set_parameter(BIND_MATRIX_INVERSE, ParamValue::Mat4(&[self.bind_matrix_inverse]));
        sink.set_parameter(BONE_MATRICES, ParamValue::Mat4(skeleton.bone_matrices()));
        Ok(())
    }

    /// 归一化蒙皮权重，使每个顶点的权重之和为 1
    pub fn normalize_skin_weights(&mut self) -> Result<()> {
        let name = self.mesh.name.clone();
        let weights = self
            .mesh
            .geometry_mut()
            .skin_weights
            .as_mut()
            .ok_or(DeformError::MissingSkinData(name))?;

        for w in weights.iter_mut() {
            *w = normalize_skin_weight(*w);
        }
        Ok(())
    }

    /// 用骨架当前的蒙皮矩阵在 CPU 上计算蒙皮后的顶点（模型空间）
    ///
    /// 不会更新骨架，需要先调用 render_setup 或 `Skeleton::update`。
    pub fn compute_skinned(&self) -> Result<SkinningOutput> {
        let shared = self.skeleton.as_ref().ok_or(DeformError::SkeletonNotBound)?;
        let skeleton = shared.try_borrow().map_err(|_| DeformError::SkeletonBusy)?;

        let geometry = self.mesh.geometry();
        let vertex_count = geometry.vertex_count();
        let (Some(skin_indices), Some(skin_weights)) = (&geometry.skin_indices, &geometry.skin_weights)
        else {
            return Err(DeformError::MissingSkinData(self.mesh.name.clone()));
        };
        if skin_indices.len() != vertex_count || skin_weights.len() != vertex_count {
            return Err(DeformError::MissingSkinData(format!(
                "{}: {} vertices, {} skin indices, {} skin weights",
                self.mesh.name,
                vertex_count,
                skin_indices.len(),
                skin_weights.len()
            )));
        }

        Ok(compute_skinning(&SkinningInput {
            positions: &geometry.positions,
            normals: geometry.normals.as_deref(),
            skin_indices,
            skin_weights,
            bone_matrices: skeleton.bone_matrices(),
            bind_matrix: self.bind_matrix,
            bind_matrix_inverse: self.bind_matrix_inverse,
        }))
    }

    /// 射线拾取（使用未变形的基础几何体）
    pub fn raycast<N>(&self, raycaster: &Raycaster, nodes: &N, intersects: &mut Vec<Intersect>)
    where
        N: NodeTransforms + ?Sized,
    {
        self.mesh.raycast(raycaster, nodes, intersects);
    }

    /// 是否与另一个蒙皮网格共享同一骨架
    pub fn shares_skeleton_with(&self, other: &SkinnedMesh) -> bool {
        match (&self.skeleton, &other.skeleton) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// 归一化单个顶点的权重：L1 范数为 0 时全部交给第一根骨骼
pub fn normalize_skin_weight(weights: Vec4) -> Vec4 {
    let length = weights.abs().element_sum();
    if length == 0.0 {
        Vec4::new(1.0, 0.0, 0.0, 0.0)
    } else {
        weights * (1.0 / length)
    }
}

//! 骨架

use glam::Mat4;
use std::cell::RefCell;
use std::rc::Rc;

use crate::node::{NodeId, NodeTransforms};
use crate::{DeformError, Result};

use super::SharedSkeleton;

/// 骨架
///
/// `bones`、`bone_inverses`、`bone_matrices` 三者始终等长。
#[derive(Debug)]
pub struct Skeleton {
    pub name: String,
    pub root: Option<NodeId>,
    bones: Vec<NodeId>,
    // 逆绑定矩阵
    bone_inverses: Vec<Mat4>,
    // 蒙皮矩阵 = 当前世界变换 * 逆绑定矩阵
    bone_matrices: Vec<Mat4>,
}

impl Skeleton {
    /// 创建骨架，骨骼数与逆绑定矩阵数不一致时失败
    pub fn new(
        name: &str,
        root: Option<NodeId>,
        bones: Vec<NodeId>,
        bone_inverses: Vec<Mat4>,
    ) -> Result<Self> {
        if bones.len() != bone_inverses.len() {
            return Err(DeformError::BoneCountMismatch {
                bones: bones.len(),
                inverses: bone_inverses.len(),
            });
        }

        log::debug!("创建骨架 {}: {} 根骨骼", name, bones.len());

        let bone_matrices = vec![Mat4::ZERO; bones.len()];
        Ok(Self {
            name: name.to_string(),
            root,
            bones,
            bone_inverses,
            bone_matrices,
        })
    }

    /// 包装为可共享的骨架
    pub fn into_shared(self) -> SharedSkeleton {
        Rc::new(RefCell::new(self))
    }

    /// 获取骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> &[NodeId] {
        &self.bones
    }

    pub fn bone_inverses(&self) -> &[Mat4] {
        &self.bone_inverses
    }

    /// 获取蒙皮矩阵数组
    pub fn bone_matrices(&self) -> &[Mat4] {
        &self.bone_matrices
    }

    /// 重新计算蒙皮矩阵：世界矩阵 * 逆绑定矩阵
    ///
    /// 不会自动跟随节点变换，每帧在节点树更新完成后调用。
    pub fn update<N>(&mut self, nodes: &N)
    where
        N: NodeTransforms + ?Sized,
    {
        for ((matrix, &bone), inverse) in self
            .bone_matrices
            .iter_mut()
            .zip(&self.bones)
            .zip(&self.bone_inverses)
        {
            *matrix = nodes.world_matrix(bone) * *inverse;
        }
    }

    /// 把节点树恢复到绑定姿态
    ///
    /// 第一遍设置所有骨骼的世界矩阵，第二遍才能从父骨骼的世界矩阵
    /// 反推本地矩阵。
    pub fn pose<N>(&self, nodes: &mut N)
    where
        N: NodeTransforms + ?Sized,
    {
        for (&bone, inverse) in self.bones.iter().zip(&self.bone_inverses) {
            nodes.set_world_matrix(bone, inverse.inverse());
        }

        for &bone in &self.bones {
            let world = nodes.world_matrix(bone);
            // local = inverse(parent_global) * global
            let local = match nodes.parent(bone) {
                Some(parent) if nodes.is_bone(parent) => nodes.world_matrix(parent).inverse() * world,
                _ => world,
            };
            nodes.set_local_matrix(bone, local);
            nodes.mark_dirty(bone);
        }

        log::debug!("骨架 {} 恢复绑定姿态", self.name);
    }
}

/// 克隆共享骨骼引用与逆绑定矩阵，蒙皮矩阵重新置零
impl Clone for Skeleton {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            root: self.root,
            bones: self.bones.clone(),
            bone_inverses: self.bone_inverses.clone(),
            bone_matrices: vec![Mat4::ZERO; self.bones.len()],
        }
    }
}

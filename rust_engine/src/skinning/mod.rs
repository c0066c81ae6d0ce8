//! 蒙皮网格与顶点蒙皮计算

mod skinned_mesh;
mod skinning;

pub use skinned_mesh::{normalize_skin_weight, SkinnedMesh};
pub use skinning::compute_skinning;

use glam::{Mat4, UVec4, Vec3, Vec4};

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 原始顶点位置（模型空间）
    pub positions: &'a [Vec3],
    /// 原始顶点法线
    pub normals: Option<&'a [Vec3]>,
    /// 每顶点 4 个骨骼索引
    pub skin_indices: &'a [UVec4],
    /// 每顶点 4 个骨骼权重
    pub skin_weights: &'a [Vec4],
    /// 骨骼变换矩阵（已乘以逆绑定矩阵）
    pub bone_matrices: &'a [Mat4],
    pub bind_matrix: Mat4,
    pub bind_matrix_inverse: Mat4,
}

/// 蒙皮输出数据
#[derive(Clone, Debug, Default)]
pub struct SkinningOutput {
    /// 变换后的顶点位置（模型空间）
    pub positions: Vec<Vec3>,
    /// 变换后的顶点法线，输入没有法线时为 None
    pub normals: Option<Vec<Vec3>>,
}

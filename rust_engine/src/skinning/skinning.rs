//! 顶点蒙皮计算

use glam::{Mat4, UVec4, Vec3, Vec4};
use rayon::prelude::*;

use crate::config::get_config;
use super::{SkinningInput, SkinningOutput};

/// 计算蒙皮，顶点数达到配置阈值时使用 rayon 并行
pub fn compute_skinning(input: &SkinningInput) -> SkinningOutput {
    let vertex_count = input.positions.len();
    let parallel = vertex_count >= get_config().parallel_skinning_threshold;

    let skin_vertex = |i: usize| {
        compute_single_vertex(
            input.positions[i],
            input.normals.and_then(|n| n.get(i).copied()),
            input.skin_indices.get(i).copied().unwrap_or(UVec4::ZERO),
            input.skin_weights.get(i).copied().unwrap_or(Vec4::ZERO),
            input,
        )
    };

    let results: Vec<(Vec3, Option<Vec3>)> = if parallel {
        (0..vertex_count).into_par_iter().map(skin_vertex).collect()
    } else {
        (0..vertex_count).map(skin_vertex).collect()
    };

    let (positions, normals): (Vec<Vec3>, Vec<Option<Vec3>>) = results.into_iter().unzip();
    SkinningOutput {
        positions,
        normals: input
            .normals
            .map(|_| normals.into_iter().map(|n| n.unwrap_or(Vec3::ZERO)).collect()),
    }
}

/// 计算单个顶点的蒙皮
///
/// p' = bindInverse * Σ(wᵢ * boneᵢ) * bind * p
fn compute_single_vertex(
    position: Vec3,
    normal: Option<Vec3>,
    indices: UVec4,
    weights: Vec4,
    input: &SkinningInput,
) -> (Vec3, Option<Vec3>) {
    let mut skin = Mat4::ZERO;
    for i in 0..4 {
        let w = weights[i];
        if w == 0.0 {
            continue;
        }
        skin += get_matrix(input.bone_matrices, indices[i]) * w;
    }

    let m = input.bind_matrix_inverse * skin * input.bind_matrix;
    let pos = m.transform_point3(position);
    let norm = normal.map(|n| m.transform_vector3(n).normalize_or_zero());
    (pos, norm)
}

fn get_matrix(matrices: &[Mat4], index: u32) -> Mat4 {
    matrices.get(index as usize).copied().unwrap_or(Mat4::IDENTITY)
}

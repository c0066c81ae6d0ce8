//! Mesh Deform - 网格变形运行时
//!
//! 渲染器 CPU 侧的蒙皮与 Morph 支持层：
//! - Morph 目标的增量编码与按权重选取活动目标
//! - 骨架（Skeleton）骨骼矩阵计算与绑定姿态恢复
//! - 蒙皮网格的着色器参数上传
//! - 蒙皮/Morph 网格的射线拾取

pub mod config;
pub mod math;
pub mod model;
pub mod morph;
pub mod node;
pub mod raycast;
pub mod shader;
pub mod skeleton;
pub mod skinning;

pub use config::DeformConfig;
pub use math::{Aabb, Ray, Sphere};
pub use model::{Geometry, Material, Mesh, RenderInfo, Side, SubMesh};
pub use morph::{ActiveSet, MorphManager, MorphTarget, NUM_MORPH_TARGETS};
pub use node::{NodeId, NodeKind, NodeTransforms, NodeTree};
pub use raycast::{Intersect, Raycaster};
pub use shader::{ParamValue, ParameterRecorder, ParameterSink};
pub use skeleton::{SharedSkeleton, Skeleton};
pub use skinning::{compute_skinning, SkinnedMesh};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeformError {
    #[error("weight count mismatch: expected {expected}, got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("bone count mismatch: {bones} bones, {inverses} inverse bind matrices")]
    BoneCountMismatch { bones: usize, inverses: usize },

    #[error("vertex count mismatch: base has {base}, morph target has {target}")]
    VertexCountMismatch { base: usize, target: usize },

    #[error("morph target has normals but base geometry has none")]
    MissingBaseNormals,

    #[error("morph target index out of range: {0}")]
    MorphIndexOutOfRange(usize),

    #[error("skinned mesh has no bound skeleton")]
    SkeletonNotBound,

    #[error("skeleton is already borrowed")]
    SkeletonBusy,

    #[error("geometry is missing skin data: {0}")]
    MissingSkinData(String),
}

pub type Result<T> = std::result::Result<T, DeformError>;

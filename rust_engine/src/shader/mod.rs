//! 着色器参数接口
//!
//! 变形层只负责提供排布正确的矩阵/浮点数组，
//! uniform 位置缓存与缓冲区上传由实现 `ParameterSink` 的图形层负责。

mod recorder;

pub use recorder::{ParameterRecorder, RecordedParam};

use glam::{Mat3, Mat4, Vec3};

// ========== uniform 名称 ==========
pub const MODEL_VIEW_MATRIX: &str = "ModelViewMatrix";
pub const MVP_MATRIX: &str = "MVP";
pub const NORMAL_MATRIX: &str = "NormalMatrix";
pub const BIND_MATRIX: &str = "BindMatrix";
pub const BIND_MATRIX_INVERSE: &str = "BindMatrixInverse";
pub const BONE_MATRICES: &str = "BoneMatrices";
pub const MORPH_TARGET_INFLUENCES: &str = "morphTargetInfluences";

// ========== 顶点属性名称 ==========
pub const VERTEX_POSITION: &str = "VertexPosition";
pub const VERTEX_NORMAL: &str = "VertexNormal";
pub const VERTEX_TANGENT: &str = "VertexTangent";

/// 着色器宏：最大活动 Morph 目标数
pub const MORPH_TARGETS_DEFINE: &str = "MORPHTARGETS";

/// 参数值（数组长度即上传个数）
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue<'a> {
    Mat3(&'a [Mat3]),
    Mat4(&'a [Mat4]),
    Floats(&'a [f32]),
}

impl ParamValue<'_> {
    /// 元素个数
    pub fn count(&self) -> usize {
        match self {
            ParamValue::Mat3(v) => v.len(),
            ParamValue::Mat4(v) => v.len(),
            ParamValue::Floats(v) => v.len(),
        }
    }
}

/// 着色器参数接收者
pub trait ParameterSink {
    /// 设置命名 uniform
    fn set_parameter(&mut self, name: &str, value: ParamValue<'_>);

    /// 传输命名顶点属性缓冲区，默认忽略
    fn set_attribute(&mut self, _name: &str, _data: &[Vec3]) {}
}

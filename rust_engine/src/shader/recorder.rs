//! 记录型参数接收者（调试与测试用）

use glam::{Mat3, Mat4, Vec3};
use std::collections::HashMap;

use super::{ParamValue, ParameterSink};

/// 记录下来的参数值
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedParam {
    Mat3(Vec<Mat3>),
    Mat4(Vec<Mat4>),
    Floats(Vec<f32>),
}

/// 保存最近一次上传的参数和属性
#[derive(Clone, Debug, Default)]
pub struct ParameterRecorder {
    params: HashMap<String, RecordedParam>,
    attributes: HashMap<String, Vec<Vec3>>,
    /// 参数上传次数
    pub upload_count: usize,
}

impl ParameterRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&RecordedParam> {
        self.params.get(name)
    }

    pub fn mat4s(&self, name: &str) -> Option<&[Mat4]> {
        match self.params.get(name)? {
            RecordedParam::Mat4(v) => Some(v),
            _ => None,
        }
    }

    pub fn mat3s(&self, name: &str) -> Option<&[Mat3]> {
        match self.params.get(name)? {
            RecordedParam::Mat3(v) => Some(v),
            _ => None,
        }
    }

    pub fn floats(&self, name: &str) -> Option<&[f32]> {
        match self.params.get(name)? {
            RecordedParam::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&[Vec3]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.params.clear();
        self.attributes.clear();
        self.upload_count = 0;
    }
}

impl ParameterSink for ParameterRecorder {
    fn set_parameter(&mut self, name: &str, value: ParamValue<'_>) {
        let recorded = match value {
            ParamValue::Mat3(v) => RecordedParam::Mat3(v.to_vec()),
            ParamValue::Mat4(v) => RecordedParam::Mat4(v.to_vec()),
            ParamValue::Floats(v) => RecordedParam::Floats(v.to_vec()),
        };
        self.params.insert(name.to_string(), recorded);
        self.upload_count += 1;
    }

    fn set_attribute(&mut self, name: &str, data: &[Vec3]) {
        self.attributes.insert(name.to_string(), data.to_vec());
    }
}

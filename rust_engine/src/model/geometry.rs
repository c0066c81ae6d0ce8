//! 几何体定义

use glam::{UVec4, Vec3, Vec4};
use std::collections::HashMap;

use crate::math::{Aabb, Sphere};
use crate::shader::{ParameterSink, VERTEX_NORMAL, VERTEX_POSITION, VERTEX_TANGENT};

/// 顶点属性在着色器中的名称
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeNames {
    pub position: String,
    pub normal: String,
    pub tangent: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            position: VERTEX_POSITION.to_string(),
            normal: VERTEX_NORMAL.to_string(),
            tangent: VERTEX_TANGENT.to_string(),
        }
    }
}

/// 几何体
///
/// 顶点属性按顶点索引平行存储；可选的索引缓冲区每 3 个索引组成一个三角形，
/// 没有索引缓冲区时每 3 个连续顶点组成一个三角形。
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub tangents: Option<Vec<Vec3>>,
    /// 每顶点 4 个骨骼权重
    pub skin_weights: Option<Vec<Vec4>>,
    /// 每顶点 4 个骨骼索引
    pub skin_indices: Option<Vec<UVec4>>,
    pub indices: Option<Vec<u32>>,
    pub attribute_names: AttributeNames,
    pub shader_defines: HashMap<String, String>,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_tangents(mut self, tangents: Vec<Vec3>) -> Self {
        self.tangents = Some(tangents);
        self
    }

    pub fn with_skin(mut self, indices: Vec<UVec4>, weights: Vec<Vec4>) -> Self {
        self.skin_indices = Some(indices);
        self.skin_weights = Some(weights);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn set_indices(&mut self, indices: Vec<u32>) {
        self.indices = Some(indices);
    }

    /// 设置着色器宏
    pub fn set_shader_define(&mut self, name: &str, value: &str) {
        self.shader_defines.insert(name.to_string(), value.to_string());
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::from_points(&self.positions)
    }

    /// 三角形数量
    pub fn face_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// 获取第 index 个三角形的三个顶点，索引越界时返回 None
    pub fn face(&self, index: usize) -> Option<[Vec3; 3]> {
        let start = index.checked_mul(3)?;
        match &self.indices {
            Some(indices) => {
                let tri = indices.get(start..start + 3)?;
                Some([
                    *self.positions.get(tri[0] as usize)?,
                    *self.positions.get(tri[1] as usize)?,
                    *self.positions.get(tri[2] as usize)?,
                ])
            }
            None => {
                let tri = self.positions.get(start..start + 3)?;
                Some([tri[0], tri[1], tri[2]])
            }
        }
    }

    /// 按顺序遍历所有有效三角形：(三角形索引, 顶点)
    pub fn faces(&self) -> impl Iterator<Item = (usize, [Vec3; 3])> + '_ {
        (0..self.face_count()).filter_map(move |i| self.face(i).map(|f| (i, f)))
    }

    /// 传输顶点属性缓冲区
    pub fn render_setup(&self, sink: &mut dyn ParameterSink) {
        sink.set_attribute(&self.attribute_names.position, &self.positions);
        if let Some(normals) = &self.normals {
            sink.set_attribute(&self.attribute_names.normal, normals);
        }
        if let Some(tangents) = &self.tangents {
            sink.set_attribute(&self.attribute_names.tangent, tangents);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        Geometry::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ])
        .with_indices(vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_indexed_faces() {
        let geometry = quad();
        assert_eq!(geometry.face_count(), 2);
        let faces: Vec<_> = geometry.faces().collect();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[1].0, 1);
        assert_eq!(faces[1].1[2], Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_sequential_faces() {
        let geometry = Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z]);
        assert_eq!(geometry.face_count(), 1);
        assert_eq!(geometry.face(0), Some([Vec3::ZERO, Vec3::X, Vec3::Y]));
        assert_eq!(geometry.face(1), None);
    }

    #[test]
    fn test_out_of_range_index_skipped() {
        let geometry = Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
            .with_indices(vec![0, 1, 7, 0, 1, 2]);
        let faces: Vec<_> = geometry.faces().map(|(i, _)| i).collect();
        assert_eq!(faces, vec![1]);
    }

    #[test]
    fn test_default_attribute_names() {
        let geometry = quad();
        assert_eq!(geometry.attribute_names.position, "VertexPosition");
        assert_eq!(geometry.attribute_names.normal, "VertexNormal");
        assert_eq!(geometry.attribute_names.tangent, "VertexTangent");
    }

    #[test]
    fn test_bounds() {
        let geometry = quad();
        let aabb = geometry.bounding_box();
        assert_eq!(aabb.min, Vec3::ZERO);
        assert_eq!(aabb.max, Vec3::new(1.0, 1.0, 0.0));
        let sphere = geometry.bounding_sphere();
        assert!(sphere.center.abs_diff_eq(Vec3::new(0.5, 0.5, 0.0), 1e-6));
    }
}

//! 网格

use glam::{Mat3, Mat4};

use crate::morph::MorphManager;
use crate::node::{NodeId, NodeTransforms};
use crate::shader::{ParamValue, ParameterSink, MODEL_VIEW_MATRIX, MVP_MATRIX, NORMAL_MATRIX};

use super::{Geometry, Material, SubMesh};

/// 没有子网格覆盖的三角形使用的材质
static DEFAULT_MATERIAL: Material = Material {
    name: String::new(),
    side: super::Side::Front,
};

/// 渲染时的相机信息
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderInfo {
    pub view_matrix: Mat4,
    pub projection_matrix: Mat4,
}

impl Default for RenderInfo {
    fn default() -> Self {
        Self {
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        }
    }
}

/// 网格几何体：普通几何体或带 Morph 目标的几何体
#[derive(Clone, Debug)]
pub enum MeshGeometry {
    Plain(Geometry),
    Morph(MorphManager),
}

/// 网格：节点 + 几何体 + 材质分组
#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    /// 网格在节点树中的节点，世界矩阵由节点树维护
    pub node: NodeId,
    geometry: MeshGeometry,
    pub materials: Vec<Material>,
    pub submeshes: Vec<SubMesh>,
}

impl Mesh {
    pub fn new(name: &str, node: NodeId, geometry: Geometry) -> Self {
        Self {
            name: name.to_string(),
            node,
            geometry: MeshGeometry::Plain(geometry),
            materials: Vec::new(),
            submeshes: Vec::new(),
        }
    }

    /// 创建带 Morph 目标的网格
    pub fn with_morph(name: &str, node: NodeId, morph: MorphManager) -> Self {
        Self {
            name: name.to_string(),
            node,
            geometry: MeshGeometry::Morph(morph),
            materials: Vec::new(),
            submeshes: Vec::new(),
        }
    }

    /// 添加覆盖整个网格的材质
    pub fn with_material(mut self, material: Material) -> Self {
        self.add_material(material, 0, 0);
        self
    }

    /// 为索引区间 [begin, begin + count) 添加材质，count 为 0 表示到末尾
    pub fn add_material(&mut self, material: Material, begin_index: u32, index_count: u32) {
        let material_id = self.materials.len();
        self.materials.push(material);
        self.submeshes.push(SubMesh::new(begin_index, index_count, material_id));
    }

    /// 基础几何体（Morph 网格返回其基础几何体）
    pub fn geometry(&self) -> &Geometry {
        match &self.geometry {
            MeshGeometry::Plain(geometry) => geometry,
            MeshGeometry::Morph(morph) => morph.base_geometry(),
        }
    }

    pub fn geometry_mut(&mut self) -> &mut Geometry {
        match &mut self.geometry {
            MeshGeometry::Plain(geometry) => geometry,
            MeshGeometry::Morph(morph) => morph.base_geometry_mut(),
        }
    }

    pub fn morph(&self) -> Option<&MorphManager> {
        match &self.geometry {
            MeshGeometry::Morph(morph) => Some(morph),
            MeshGeometry::Plain(_) => None,
        }
    }

    pub fn morph_mut(&mut self) -> Option<&mut MorphManager> {
        match &mut self.geometry {
            MeshGeometry::Morph(morph) => Some(morph),
            MeshGeometry::Plain(_) => None,
        }
    }

    /// 第 face 个三角形使用的材质
    pub fn material_for_face(&self, face: usize) -> &Material {
        let first_index = face as u64 * 3;
        self.submeshes
            .iter()
            .find(|s| s.contains(first_index))
            .and_then(|s| self.materials.get(s.material_id))
            .unwrap_or(&DEFAULT_MATERIAL)
    }

    /// 绘制前上传模型矩阵，然后准备几何体
    pub fn render_setup<N>(&mut self, sink: &mut dyn ParameterSink, nodes: &N, rinfo: &RenderInfo)
    where
        N: NodeTransforms + ?Sized,
    {
        let world = nodes.world_matrix(self.node);
        let model_view = rinfo.view_matrix * world;
        let mvp = rinfo.projection_matrix * model_view;
        let normal_matrix = Mat3::from_mat4(model_view).inverse().transpose();

        sink.set_parameter(MODEL_VIEW_MATRIX, ParamValue::Mat4(&[model_view]));
        sink.set_parameter(MVP_MATRIX, ParamValue::Mat4(&[mvp]));
        sink.set_parameter(NORMAL_MATRIX, ParamValue::Mat3(&[normal_matrix]));

        match &mut self.geometry {
            MeshGeometry::Plain(geometry) => geometry.render_setup(sink),
            MeshGeometry::Morph(morph) => morph.render_setup(sink),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Side;
    use crate::node::{NodeKind, NodeTree};
    use crate::shader::ParameterRecorder;
    use glam::Vec3;

    fn two_triangles() -> Geometry {
        Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z])
            .with_indices(vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_material_for_face() {
        let mut mesh = Mesh::new("mesh", NodeId(0), two_triangles());
        mesh.add_material(Material::new("front", Side::Front), 0, 3);
        mesh.add_material(Material::new("back", Side::Back), 3, 3);
        assert_eq!(mesh.material_for_face(0).name, "front");
        assert_eq!(mesh.material_for_face(1).side, Side::Back);
    }

    #[test]
    fn test_material_fallback() {
        let mesh = Mesh::new("mesh", NodeId(0), two_triangles());
        assert_eq!(mesh.material_for_face(0).side, Side::Front);
    }

    #[test]
    fn test_render_setup_uploads_model_matrices() {
        let mut tree = NodeTree::new();
        let node = tree.add_node("mesh", NodeKind::Mesh, None);
        tree.set_local_matrix(node, Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));
        tree.update_world_matrices();

        let mut mesh = Mesh::new("mesh", node, two_triangles());
        let rinfo = RenderInfo {
            view_matrix: Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            projection_matrix: Mat4::from_scale(Vec3::splat(2.0)),
        };
        let mut sink = ParameterRecorder::new();
        mesh.render_setup(&mut sink, &tree, &rinfo);

        let mv = sink.mat4s(MODEL_VIEW_MATRIX).unwrap()[0];
        assert!(mv.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(1.0, 0.0, -5.0), 1e-6));
        let mvp = sink.mat4s(MVP_MATRIX).unwrap()[0];
        assert!(mvp.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(2.0, 0.0, -10.0), 1e-6));
        let nm = sink.mat3s(NORMAL_MATRIX).unwrap()[0];
        assert!(nm.abs_diff_eq(Mat3::IDENTITY, 1e-6));
        assert_eq!(sink.attribute("VertexPosition").map(|p| p.len()), Some(4));
    }
}

//! 网格射线求交

use crate::config::get_config;
use crate::model::{Mesh, Side};
use crate::node::NodeTransforms;

use super::{Intersect, Raycaster};

impl Mesh {
    /// 射线与网格三角形求交，命中结果按三角形顺序追加到 intersects
    ///
    /// 先用世界空间包围球剔除，再把射线变换到模型空间用包围盒剔除，
    /// 最后逐个三角形按材质的剔除方式求交。
    pub fn raycast<N>(&self, raycaster: &Raycaster, nodes: &N, intersects: &mut Vec<Intersect>)
    where
        N: NodeTransforms + ?Sized,
    {
        let geometry = self.geometry();
        let world = nodes.world_matrix(self.node);

        let sphere = geometry.bounding_sphere().transformed(&world);
        if !raycaster.ray.intersects_sphere(&sphere) {
            return;
        }

        // 变换射线比变换所有顶点便宜
        let ray = raycaster.ray.transformed(&world.inverse());
        if !ray.intersects_box(&geometry.bounding_box()) {
            return;
        }

        let epsilon = get_config().triangle_epsilon;
        for (face, [a, b, c]) in geometry.faces() {
            let hit = match self.material_for_face(face).side {
                Side::Back => ray.intersect_triangle(c, b, a, true, epsilon),
                Side::Front => ray.intersect_triangle(a, b, c, true, epsilon),
                Side::Double => ray.intersect_triangle(a, b, c, false, epsilon),
            };
            let Some(point) = hit else {
                continue;
            };

            let point = world.transform_point3(point);
            let distance = raycaster.ray.origin.distance(point);
            if distance < raycaster.near || distance > raycaster.far {
                continue;
            }

            intersects.push(Intersect {
                distance,
                point,
                face_index: face as u32,
                object: self.node,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Geometry, Material};
    use crate::morph::MorphManager;
    use crate::node::{NodeId, NodeKind, NodeTree};
    use glam::{Mat4, Vec3};

    /// 在 z = 0 平面上逆时针（+Z 为正面）的三角形，节点平移到 z = -10
    fn setup(side: Side) -> (NodeTree, Mesh) {
        let mut tree = NodeTree::new();
        let node = tree.add_node("tri", NodeKind::Mesh, None);
        tree.set_local_matrix(node, Mat4::from_translation(Vec3::new(0.0, 0.0, -10.0)));
        tree.update_world_matrices();

        let geometry = Geometry::new(vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]);
        let mesh = Mesh::new("tri", node, geometry).with_material(Material::new("m", side));
        (tree, mesh)
    }

    #[test]
    fn test_front_side_hit() {
        let (tree, mesh) = setup(Side::Front);
        let raycaster = Raycaster::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut hits = Vec::new();
        mesh.raycast(&raycaster, &tree, &mut hits);

        assert_eq!(hits.len(), 1);
        assert!((hits[0].distance - 10.0).abs() < 1e-5);
        assert!(hits[0].point.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-5));
        assert_eq!(hits[0].face_index, 0);
        assert_eq!(hits[0].object, mesh.node);
    }

    #[test]
    fn test_back_side_culls_front_facing_triangle() {
        let (tree, mesh) = setup(Side::Back);
        let raycaster = Raycaster::new(Vec3::ZERO, Vec3::NEG_Z);
        let mut hits = Vec::new();
        mesh.raycast(&raycaster, &tree, &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_back_side_hit_from_behind() {
        let (tree, mesh) = setup(Side::Back);
        let raycaster = Raycaster::new(Vec3::new(0.0, 0.0, -20.0), Vec3::Z);
        let mut hits = Vec::new();
        mesh.raycast(&raycaster, &tree, &mut hits);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_double_side_hits_both_ways() {
        let (tree, mesh) = setup(Side::Double);
        let mut hits = Vec::new();
        mesh.raycast(&Raycaster::new(Vec3::ZERO, Vec3::NEG_Z), &tree, &mut hits);
        mesh.raycast(&Raycaster::new(Vec3::new(0.0, 0.0, -20.0), Vec3::Z), &tree, &mut hits);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_miss_bounding_sphere() {
        let (tree, mesh) = setup(Side::Double);
        let raycaster = Raycaster::new(Vec3::new(50.0, 0.0, 0.0), Vec3::NEG_Z);
        let mut hits = Vec::new();
        mesh.raycast(&raycaster, &tree, &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_distance_bounds() {
        let (tree, mesh) = setup(Side::Front);
        let mut hits = Vec::new();
        mesh.raycast(&Raycaster::new(Vec3::ZERO, Vec3::NEG_Z).with_bounds(0.0, 5.0), &tree, &mut hits);
        mesh.raycast(&Raycaster::new(Vec3::ZERO, Vec3::NEG_Z).with_bounds(11.0, 20.0), &tree, &mut hits);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_intersect_meshes_sorted() {
        let (mut tree, near_mesh) = setup(Side::Front);
        let far_node = tree.add_node("far", NodeKind::Mesh, None);
        tree.set_local_matrix(far_node, Mat4::from_translation(Vec3::new(0.0, 0.0, -30.0)));
        tree.update_world_matrices();
        let mut far_mesh = near_mesh.clone();
        far_mesh.node = far_node;

        let raycaster = Raycaster::new(Vec3::ZERO, Vec3::NEG_Z);
        let hits = raycaster.intersect_meshes([&far_mesh, &near_mesh], &tree);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object, near_mesh.node);
        assert!((hits[1].distance - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_morph_mesh_uses_base_geometry() {
        let (tree, mesh) = setup(Side::Front);
        let morph = MorphManager::new(mesh.geometry().clone());
        let morph_mesh = Mesh::with_morph("morph", mesh.node, morph);
        let mut hits = Vec::new();
        morph_mesh.raycast(&Raycaster::new(Vec3::ZERO, Vec3::NEG_Z), &tree, &mut hits);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].object, NodeId(0));
    }
}

//! 射线拾取

mod mesh;

use glam::Vec3;

use crate::config::get_config;
use crate::math::Ray;
use crate::model::Mesh;
use crate::node::{NodeId, NodeTransforms};

/// 射线拾取器：世界空间射线 + 有效距离区间
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Raycaster {
    pub ray: Ray,
    pub near: f32,
    pub far: f32,
}

impl Raycaster {
    /// 使用配置中的默认距离区间
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let config = get_config();
        Self {
            ray: Ray::new(origin, direction),
            near: config.raycast_near,
            far: config.raycast_far,
        }
    }

    pub fn with_bounds(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// 与多个网格求交，结果按距离从近到远排序
    pub fn intersect_meshes<'a, N, I>(&self, meshes: I, nodes: &N) -> Vec<Intersect>
    where
        N: NodeTransforms + ?Sized,
        I: IntoIterator<Item = &'a Mesh>,
    {
        let mut intersects = Vec::new();
        for mesh in meshes {
            mesh.raycast(self, nodes, &mut intersects);
        }
        intersects.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        intersects
    }
}

/// 交点
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersect {
    /// 射线起点到交点的世界空间距离
    pub distance: f32,
    /// 世界空间交点
    pub point: Vec3,
    /// 三角形索引
    pub face_index: u32,
    /// 命中网格的节点
    pub object: NodeId,
}

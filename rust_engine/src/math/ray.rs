//! 射线

use glam::{Mat4, Vec3};

use super::{Aabb, Sphere};

/// 射线（方向为单位向量）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// 射线上参数 t 处的点
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// 用矩阵变换射线，方向重新归一化
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let origin = matrix.transform_point3(self.origin);
        let tip = matrix.transform_point3(self.origin + self.direction);
        Self::new(origin, tip - origin)
    }

    /// 点到射线的距离（点在射线起点之后时取到起点的距离）
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        let along = (point - self.origin).dot(self.direction);
        if along < 0.0 {
            return self.origin.distance(point);
        }
        self.at(along).distance(point)
    }

    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.distance_to_point(sphere.center) <= sphere.radius
    }

    /// Slab 法检测射线与包围盒相交
    pub fn intersects_box(&self, aabb: &Aabb) -> bool {
        if aabb.is_empty() {
            return false;
        }

        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.direction[axis];
            let (min, max) = (aabb.min[axis], aabb.max[axis]);

            if dir == 0.0 {
                // 与该轴平行：起点必须落在 slab 内
                if origin < min || origin > max {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let t1 = (min - origin) * inv;
            let t2 = (max - origin) * inv;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        t_enter <= t_exit && t_exit >= 0.0
    }

    /// 射线与三角形求交，返回交点
    ///
    /// 三角形按 (a, b, c) 逆时针为正面。`cull_back` 为 true 时
    /// 从背面射入的射线视为未命中。
    pub fn intersect_triangle(
        &self,
        a: Vec3,
        b: Vec3,
        c: Vec3,
        cull_back: bool,
        epsilon: f32,
    ) -> Option<Vec3> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2);

        let mut d_dot_n = self.direction.dot(normal);
        let sign = if d_dot_n > epsilon {
            if cull_back {
                return None;
            }
            1.0
        } else if d_dot_n < -epsilon {
            d_dot_n = -d_dot_n;
            -1.0
        } else {
            return None;
        };

        let diff = self.origin - a;
        let b1 = sign * self.direction.dot(diff.cross(edge2));
        if b1 < 0.0 {
            return None;
        }
        let b2 = sign * self.direction.dot(edge1.cross(diff));
        if b2 < 0.0 || b1 + b2 > d_dot_n {
            return None;
        }

        let q_dot_n = -sign * diff.dot(normal);
        if q_dot_n < 0.0 {
            return None;
        }

        Some(self.at(q_dot_n / d_dot_n))
    }
}

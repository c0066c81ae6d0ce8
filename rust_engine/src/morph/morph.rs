//! Morph 目标定义

use glam::Vec3;

use crate::model::Geometry;
use crate::{DeformError, Result};

use super::{morph_normal_name, morph_position_name, morph_tangent_name};

/// Morph 目标：保存相对基础几何体增量的几何体
///
/// 位置和法线缓冲区中只存放增量，不再保存绝对值。
#[derive(Clone, Debug)]
pub struct MorphTarget {
    geometry: Geometry,
}

impl MorphTarget {
    /// 由绝对坐标几何体计算增量：target[i] -= base[i]
    ///
    /// 切线不计算增量。`validate` 为 false 时不检查顶点数与法线，
    /// 不匹配的输入产生无意义的增量。
    pub fn from_absolute(base: &Geometry, mut target: Geometry, validate: bool) -> Result<Self> {
        if validate {
            Self::validate(base, &target)?;
        }

        for (vertex, base_vertex) in target.positions.iter_mut().zip(&base.positions) {
            *vertex -= *base_vertex;
        }

        // 目标有法线时默认基础几何体也有法线
        if let (Some(normals), Some(base_normals)) = (target.normals.as_mut(), base.normals.as_ref()) {
            for (normal, base_normal) in normals.iter_mut().zip(base_normals) {
                *normal -= *base_normal;
            }
        }

        Ok(Self { geometry: target })
    }

    /// 直接使用已经是增量的几何体
    pub fn from_deltas(geometry: Geometry) -> Self {
        Self { geometry }
    }

    /// 检查目标与基础几何体是否匹配
    pub fn validate(base: &Geometry, target: &Geometry) -> Result<()> {
        if target.vertex_count() != base.vertex_count() {
            return Err(DeformError::VertexCountMismatch {
                base: base.vertex_count(),
                target: target.vertex_count(),
            });
        }
        if let Some(normals) = &target.normals {
            let Some(base_normals) = &base.normals else {
                return Err(DeformError::MissingBaseNormals);
            };
            if normals.len() != base_normals.len() {
                return Err(DeformError::VertexCountMismatch {
                    base: base_normals.len(),
                    target: normals.len(),
                });
            }
        }
        Ok(())
    }

    /// 增量几何体
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn position_deltas(&self) -> &[Vec3] {
        &self.geometry.positions
    }

    pub fn normal_deltas(&self) -> Option<&[Vec3]> {
        self.geometry.normals.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    pub(super) fn set_indices(&mut self, indices: Vec<u32>) {
        self.geometry.set_indices(indices);
    }

    /// 把属性名绑定到着色器槽位
    pub fn set_slot(&mut self, slot: usize) {
        let names = &mut self.geometry.attribute_names;
        names.position = morph_position_name(slot);
        names.normal = morph_normal_name(slot);
        names.tangent = morph_tangent_name(slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Geometry {
        Geometry::new(vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)])
            .with_normals(vec![Vec3::Z; 3])
    }

    #[test]
    fn test_position_deltas() {
        let base = base();
        let target_positions = vec![Vec3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 2.0, 0.0), Vec3::new(-1.0, 1.0, 3.0)];
        let target = Geometry::new(target_positions.clone());
        let morph = MorphTarget::from_absolute(&base, target, true).unwrap();

        for i in 0..3 {
            assert_eq!(morph.position_deltas()[i], target_positions[i] - base.positions[i]);
            let rebuilt = base.positions[i] + morph.position_deltas()[i];
            assert!(rebuilt.abs_diff_eq(target_positions[i], 1e-6));
        }
        assert!(morph.normal_deltas().is_none());
    }

    #[test]
    fn test_normal_deltas() {
        let base = base();
        let target = Geometry::new(base.positions.clone()).with_normals(vec![Vec3::Y; 3]);
        let morph = MorphTarget::from_absolute(&base, target, true).unwrap();
        let normals = morph.normal_deltas().unwrap();
        assert!(normals.iter().all(|n| *n == Vec3::Y - Vec3::Z));
        assert!(morph.position_deltas().iter().all(|p| *p == Vec3::ZERO));
    }

    #[test]
    fn test_tangents_untouched() {
        let base = base().with_tangents(vec![Vec3::X; 3]);
        let target = Geometry::new(base.positions.clone()).with_tangents(vec![Vec3::Y; 3]);
        let morph = MorphTarget::from_absolute(&base, target, true).unwrap();
        assert_eq!(morph.geometry().tangents.as_deref(), Some(&[Vec3::Y; 3][..]));
    }

    #[test]
    fn test_vertex_count_mismatch() {
        let target = Geometry::new(vec![Vec3::ZERO; 2]);
        let err = MorphTarget::from_absolute(&base(), target, true).unwrap_err();
        assert_eq!(err, DeformError::VertexCountMismatch { base: 3, target: 2 });
    }

    #[test]
    fn test_missing_base_normals() {
        let base = Geometry::new(vec![Vec3::ZERO; 3]);
        let target = Geometry::new(vec![Vec3::ZERO; 3]).with_normals(vec![Vec3::Z; 3]);
        let err = MorphTarget::from_absolute(&base, target, true).unwrap_err();
        assert_eq!(err, DeformError::MissingBaseNormals);
    }

    #[test]
    fn test_set_slot() {
        let mut morph = MorphTarget::from_deltas(Geometry::new(vec![Vec3::ZERO; 3]));
        morph.set_slot(5);
        let names = &morph.geometry().attribute_names;
        assert_eq!(names.position, "MorphPosition5");
        assert_eq!(names.normal, "MorphNormal5");
        assert_eq!(names.tangent, "MorphTangent5");
    }
}

//! 变形运行时配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// 运行时配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct DeformConfig {
    // ========== Morph ==========
    /// 添加 Morph 目标时校验顶点数与法线是否和基础几何体匹配，默认 true
    /// 关闭后不匹配的目标会产生无意义的增量
    pub validate_morph_targets: bool,

    // ========== 射线拾取 ==========
    /// 新建 Raycaster 的近距离，默认 0.0
    pub raycast_near: f32,
    /// 新建 Raycaster 的远距离，默认无穷远
    pub raycast_far: f32,
    /// 射线与三角形平行判定阈值，默认 1e-8
    pub triangle_epsilon: f32,

    // ========== CPU 蒙皮 ==========
    /// 顶点数达到此值时使用 rayon 并行蒙皮，默认 4096
    pub parallel_skinning_threshold: usize,

    // ========== 调试 ==========
    /// 是否输出每帧调试日志
    pub debug_log: bool,
}

impl Default for DeformConfig {
    fn default() -> Self {
        Self {
            validate_morph_targets: true,
            raycast_near: 0.0,
            raycast_far: f32::INFINITY,
            triangle_epsilon: 1e-8,
            parallel_skinning_threshold: 4096,
            debug_log: false,
        }
    }
}

/// 全局配置实例
static DEFORM_CONFIG: Lazy<RwLock<DeformConfig>> = Lazy::new(|| {
    RwLock::new(DeformConfig::default())
});

/// 获取当前配置（只读）
pub fn get_config() -> DeformConfig {
    DEFORM_CONFIG
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// 手动设置配置（用于运行时调试）
pub fn set_config(config: DeformConfig) {
    *DEFORM_CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = config;
}

/// 重置为默认配置
pub fn reset_config() {
    set_config(DeformConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DeformConfig::default();
        assert!(config.validate_morph_targets);
        assert_eq!(config.raycast_near, 0.0);
        assert!(config.raycast_far.is_infinite());
        assert!(!config.debug_log);
    }
}

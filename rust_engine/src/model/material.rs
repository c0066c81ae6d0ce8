//! 材质定义

/// 面剔除方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Side {
    /// 只渲染正面（逆时针）
    #[default]
    Front,
    /// 只渲染背面
    Back,
    /// 双面渲染
    Double,
}

/// 材质
///
/// 变形层只关心面剔除方式，着色属性由渲染层管理。
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub side: Side,
}

impl Material {
    pub fn new(name: &str, side: Side) -> Self {
        Self {
            name: name.to_string(),
            side,
        }
    }

    /// 是否双面渲染
    pub fn is_double_sided(&self) -> bool {
        self.side == Side::Double
    }
}

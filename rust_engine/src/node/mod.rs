//! 节点变换接口与节点树
//!
//! 骨架只持有节点引用（`NodeId`），变换数据由实现 `NodeTransforms`
//! 的外部场景系统维护。`NodeTree` 是一个自带的实现。

mod tree;

pub use tree::{Node, NodeTree};

use glam::Mat4;

/// 节点句柄（节点树中的索引）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 节点类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NodeKind {
    #[default]
    Group,
    Bone,
    Mesh,
}

/// 节点变换提供者
///
/// 读取世界矩阵、写入本地/世界矩阵并标记脏节点，
/// 由实现方在之后的更新中重新计算子孙节点。
pub trait NodeTransforms {
    /// 节点当前的世界矩阵
    fn world_matrix(&self, node: NodeId) -> Mat4;

    /// 设置节点本地矩阵（相对父节点）
    fn set_local_matrix(&mut self, node: NodeId, matrix: Mat4);

    /// 直接设置节点世界矩阵
    fn set_world_matrix(&mut self, node: NodeId, matrix: Mat4);

    /// 标记节点变换已修改
    fn mark_dirty(&mut self, node: NodeId);

    /// 父节点
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// 节点是否为骨骼
    fn is_bone(&self, node: NodeId) -> bool;
}

//! 节点树

use glam::Mat4;
use std::collections::HashMap;

use super::{NodeId, NodeKind, NodeTransforms};

/// 场景节点
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,

    // 变换结果
    pub local_transform: Mat4,
    pub global_transform: Mat4,

    /// 本地变换已修改，子孙节点的世界矩阵需要重新计算
    pub dirty: bool,
}

impl Node {
    pub fn new(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            parent: None,
            children: Vec::new(),
            local_transform: Mat4::IDENTITY,
            global_transform: Mat4::IDENTITY,
            dirty: true,
        }
    }
}

/// 节点树（按索引存储的节点集合）
#[derive(Clone, Debug, Default)]
pub struct NodeTree {
    nodes: Vec<Node>,
    name_to_index: HashMap<String, usize>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加节点，父节点必须已存在
    pub fn add_node(&mut self, name: &str, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new(name.to_string(), kind);
        node.parent = parent.filter(|p| p.0 < self.nodes.len());
        if let Some(p) = node.parent {
            self.nodes[p.0].children.push(id);
        }
        self.name_to_index.insert(node.name.clone(), id.0);
        self.nodes.push(node);
        id
    }

    /// 通过名称查找节点
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.name_to_index.get(name).copied().map(NodeId)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// 获取本地变换
    pub fn local_matrix(&self, id: NodeId) -> Mat4 {
        self.nodes.get(id.0).map(|n| n.local_transform).unwrap_or(Mat4::IDENTITY)
    }

    /// 从根节点向下更新所有脏节点及其子孙的世界矩阵
    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(usize, Mat4, bool)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| (i, Mat4::IDENTITY, false))
            .collect();

        while let Some((index, parent_global, parent_changed)) = stack.pop() {
            let node = &mut self.nodes[index];
            let changed = parent_changed || node.dirty;
            if changed {
                node.global_transform = parent_global * node.local_transform;
                node.dirty = false;
            }
            let global = node.global_transform;
            for &child in &node.children {
                stack.push((child.0, global, changed));
            }
        }
    }
}

impl NodeTransforms for NodeTree {
    fn world_matrix(&self, node: NodeId) -> Mat4 {
        self.nodes.get(node.0).map(|n| n.global_transform).unwrap_or(Mat4::IDENTITY)
    }

    fn set_local_matrix(&mut self, node: NodeId, matrix: Mat4) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.local_transform = matrix;
            n.dirty = true;
        }
    }

    fn set_world_matrix(&mut self, node: NodeId, matrix: Mat4) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.global_transform = matrix;
        }
    }

    fn mark_dirty(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.dirty = true;
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn is_bone(&self, node: NodeId) -> bool {
        self.nodes
            .get(node.0)
            .map(|n| n.kind == NodeKind::Bone)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_update_world_matrices() {
        let mut tree = NodeTree::new();
        let root = tree.add_node("root", NodeKind::Group, None);
        let child = tree.add_node("child", NodeKind::Bone, Some(root));

        tree.set_local_matrix(root, Mat4::from_translation(Vec3::X));
        tree.set_local_matrix(child, Mat4::from_translation(Vec3::Y));
        tree.update_world_matrices();

        let world = tree.world_matrix(child);
        assert!(world.transform_point3(Vec3::ZERO).abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-6));
        assert!(!tree.get_node(child).unwrap().dirty);
    }

    #[test]
    fn test_dirty_parent_propagates() {
        let mut tree = NodeTree::new();
        let root = tree.add_node("root", NodeKind::Group, None);
        let child = tree.add_node("child", NodeKind::Group, Some(root));
        tree.update_world_matrices();

        tree.set_local_matrix(root, Mat4::from_translation(Vec3::Z));
        tree.update_world_matrices();
        assert!(tree
            .world_matrix(child)
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_parent_and_kind_queries() {
        let mut tree = NodeTree::new();
        let root = tree.add_node("root", NodeKind::Group, None);
        let bone = tree.add_node("bone", NodeKind::Bone, Some(root));
        assert_eq!(tree.parent(bone), Some(root));
        assert_eq!(tree.parent(root), None);
        assert!(tree.is_bone(bone));
        assert!(!tree.is_bone(root));
        assert_eq!(tree.find_node_by_name("bone"), Some(bone));
    }
}

//! 骨架系统
//!
//! 骨架引用节点树中的骨骼节点，保存每根骨骼的逆绑定矩阵，
//! 并在每帧计算蒙皮用的骨骼矩阵。

mod skeleton;

pub use skeleton::Skeleton;

use std::cell::RefCell;
use std::rc::Rc;

/// 多个蒙皮网格共享的骨架
///
/// 每个网格的 render_setup 都会调用一次 `Skeleton::update`，
/// 结果只依赖当前世界矩阵，重复计算是安全的。
pub type SharedSkeleton = Rc<RefCell<Skeleton>>;

//! 射线与包围体
//!
//! 矩阵与向量运算直接使用 glam，这里只补充 glam 没有的几何体。

mod bounds;
mod ray;

pub use bounds::{Aabb, Sphere};
pub use ray::Ray;

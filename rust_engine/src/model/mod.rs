//! 网格模型：几何体、材质与子网格

mod geometry;
mod material;
mod mesh;
mod submesh;

pub use geometry::{AttributeNames, Geometry};
pub use material::{Material, Side};
pub use mesh::{Mesh, MeshGeometry, RenderInfo};
pub use submesh::SubMesh;

//! 子网格定义

/// 子网格：索引缓冲区中使用同一材质的区间
///
/// `index_count == 0` 表示从 `begin_index` 一直到末尾。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubMesh {
    pub begin_index: u32,
    pub index_count: u32,
    pub material_id: usize,
}

impl SubMesh {
    pub fn new(begin_index: u32, index_count: u32, material_id: usize) -> Self {
        Self { begin_index, index_count, material_id }
    }

    /// 索引是否落在该子网格内
    pub fn contains(&self, index: u64) -> bool {
        let begin = u64::from(self.begin_index);
        if index < begin {
            return false;
        }
        self.index_count == 0 || index < begin + u64::from(self.index_count)
    }
}

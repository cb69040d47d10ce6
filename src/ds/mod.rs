pub mod hierarchy_index;

pub use hierarchy_index::HierarchyIndex;

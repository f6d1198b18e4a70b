//! 存储层
//!
//! 每种学习材料一个槽位，摘要槽位附带每节插图的状态

pub mod artifact_store;
pub mod illustration;

pub use artifact_store::{ArtifactStore, ArtifactView};
pub use illustration::{IllustrationBoard, IllustrationStatus};

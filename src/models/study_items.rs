use serde::{Deserialize, Serialize};

/// 术语表条目（保持返回顺序，允许重复）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryItem {
    pub term: String,
    pub definition: String,
}

/// 记忆卡片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// 思维导图节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindmapNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MindmapNode>,
}

impl MindmapNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<MindmapNode>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    /// 树的深度，单个根节点为 1
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(MindmapNode::depth).max().unwrap_or(0)
    }

    /// 节点总数
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(MindmapNode::node_count).sum::<usize>()
    }

    /// 是否存在名称为空的节点
    pub fn has_blank_name(&self) -> bool {
        self.name.trim().is_empty() || self.children.iter().any(MindmapNode::has_blank_name)
    }
}

use std::collections::BTreeMap;

use serde::Serialize;

/// 单节插图的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "image", rename_all = "snake_case")]
pub enum IllustrationStatus {
    Pending,
    Ready(String),
    Failed,
    /// 生成服务没有返回图片
    NoImage,
}

impl IllustrationStatus {
    pub fn is_settled(&self) -> bool {
        !matches!(self, IllustrationStatus::Pending)
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            IllustrationStatus::Ready(reference) => Some(reference),
            _ => None,
        }
    }
}

/// 插图状态表
///
/// 以章节下标为键。每次生成摘要都会开启新的一轮，
/// 旧一轮任务晚到的结果因轮次不匹配被丢弃。
#[derive(Debug, Clone, Default)]
pub struct IllustrationBoard {
    round: u64,
    statuses: BTreeMap<usize, IllustrationStatus>,
}

impl IllustrationBoard {
    pub fn round(&self) -> u64 {
        self.round
    }

    /// 清空状态并作废进行中的一轮
    pub fn reset(&mut self) {
        self.round += 1;
        self.statuses.clear();
    }

    /// 开启新一轮，所有章节置为 `Pending`，返回轮次
    pub fn start_round(&mut self, section_count: usize) -> u64 {
        self.reset();
        self.statuses = (0..section_count)
            .map(|index| (index, IllustrationStatus::Pending))
            .collect();
        self.round
    }

    /// 写入某节的结果
    ///
    /// 只接受当前轮次、仍处于 `Pending` 的下标；返回是否写入
    pub fn record(&mut self, round: u64, index: usize, status: IllustrationStatus) -> bool {
        if round != self.round {
            return false;
        }
        match self.statuses.get_mut(&index) {
            Some(slot) if !slot.is_settled() => {
                *slot = status;
                true
            }
            _ => false,
        }
    }

    pub fn status(&self, index: usize) -> Option<&IllustrationStatus> {
        self.statuses.get(&index)
    }

    pub fn statuses(&self) -> &BTreeMap<usize, IllustrationStatus> {
        &self.statuses
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.statuses.values().filter(|s| !s.is_settled()).count()
    }

    pub fn is_settled(&self) -> bool {
        self.pending_count() == 0
    }
}

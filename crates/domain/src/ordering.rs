//! 看板排序引擎的移动规划
//!
//! 每个 (board_id, status) 分区内的 position 必须构成 0..n-1 的稠密序列。
//! 移动一个任务时需要对被挤占的兄弟任务做区间平移，这里把判定逻辑收敛成
//! 纯函数，两种数据库后端执行同一份计划，避免 SQL 方言各自实现一遍判定。

use crate::entities::TaskStatus;

/// 移动的执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// 目标槽位即当前槽位，无需任何写入
    NoOp,
    /// 同列向尾部移动: (当前, 目标] 区间内兄弟任务 position - 1
    TowardEnd,
    /// 同列向头部移动: [目标, 当前) 区间内兄弟任务 position + 1
    TowardStart,
    /// 跨列移动: 源列 position > 当前 的兄弟 -1，目标列 position >= 目标 的兄弟 +1
    CrossColumn,
}

/// 钳位后的移动计划
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedMove {
    pub status: TaskStatus,
    pub position: i64,
    pub kind: MoveKind,
}

/// 计算一次显式移动的执行计划
///
/// `dest_partition_len` 是目标分区当前的任务数，同列移动时包含被移动任务
/// 自身。请求的目标序号超出合法区间时钳位到分区末尾: 同列最大合法序号为
/// n-1，跨列允许追加到末尾即 n。负数序号由调用方在校验阶段拒绝。
pub fn plan_move(
    current_status: TaskStatus,
    current_position: i64,
    new_status: TaskStatus,
    requested_position: i64,
    dest_partition_len: i64,
) -> PlannedMove {
    let same_column = new_status == current_status;
    let max_rank = if same_column {
        (dest_partition_len - 1).max(0)
    } else {
        dest_partition_len.max(0)
    };
    let position = requested_position.clamp(0, max_rank);

    let kind = if same_column {
        if position == current_position {
            MoveKind::NoOp
        } else if position > current_position {
            MoveKind::TowardEnd
        } else {
            MoveKind::TowardStart
        }
    } else {
        MoveKind::CrossColumn
    };

    PlannedMove {
        status: new_status,
        position,
        kind,
    }
}

/// 校验一个分区的 position 集合是否恰好为 0..n-1
pub fn is_dense_range(positions: &[i64]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(rank, pos)| *pos == rank as i64)
}

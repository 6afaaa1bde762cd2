use validator::ValidationError;

/// 验证任务标题格式
pub fn validate_task_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::new("任务标题不能为空"));
    }

    if title.len() > 255 {
        return Err(ValidationError::new("任务标题长度不能超过255个字符"));
    }

    if title.starts_with(' ') || title.ends_with(' ') {
        return Err(ValidationError::new("任务标题不能以空格开头或结尾"));
    }

    Ok(())
}

/// 验证任务负责人标识
pub fn validate_assigned_to(assigned_to: &str) -> Result<(), ValidationError> {
    if assigned_to.trim().is_empty() {
        return Err(ValidationError::new("负责人不能为空字符串"));
    }

    if assigned_to.len() > 255 {
        return Err(ValidationError::new("负责人长度不能超过255个字符"));
    }

    Ok(())
}

/// 验证移动操作的目标序号，负数直接拒绝，过大的值由排序引擎收敛到列尾
pub fn validate_move_position(position: i64) -> Result<(), ValidationError> {
    if position < 0 {
        return Err(ValidationError::new("newPosition 不能为负数"));
    }

    Ok(())
}

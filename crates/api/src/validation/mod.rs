//! 请求参数校验
//!
//! 与请求体反序列化解耦的字段级校验，校验失败统一映射为 400。

pub mod board;
pub mod task;

use validator::ValidationError;

pub const MAX_TAG_COUNT: usize = 20;
pub const MAX_TAG_LENGTH: usize = 50;

/// 验证标签列表，看板和任务共用同一套约束
pub fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAG_COUNT {
        return Err(ValidationError::new("标签数量不能超过20个"));
    }

    for tag in tags {
        if tag.trim().is_empty() {
            return Err(ValidationError::new("标签不能为空"));
        }
        if tag.len() > MAX_TAG_LENGTH {
            return Err(ValidationError::new("单个标签长度不能超过50个字符"));
        }
    }

    Ok(())
}

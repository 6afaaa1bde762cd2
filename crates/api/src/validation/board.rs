use validator::ValidationError;

/// 验证看板名称格式
pub fn validate_board_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("看板名称不能为空"));
    }

    if name.len() > 255 {
        return Err(ValidationError::new("看板名称长度不能超过255个字符"));
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return Err(ValidationError::new("看板名称不能以空格开头或结尾"));
    }

    Ok(())
}

/// 验证看板颜色标记，接受十六进制色值或颜色别名
pub fn validate_board_color(color: &str) -> Result<(), ValidationError> {
    if color.trim().is_empty() {
        return Err(ValidationError::new("颜色标记不能为空字符串"));
    }

    if color.len() > 32 {
        return Err(ValidationError::new("颜色标记长度不能超过32个字符"));
    }

    if !color
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '#' || c == '-' || c == '_')
    {
        return Err(ValidationError::new(
            "颜色标记只能包含字母、数字、井号、下划线和连字符",
        ));
    }

    Ok(())
}

//! 自定义请求提取器

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// 包装 `axum::Json`，把请求体反序列化失败统一归入 400 参数错误
///
/// 默认的 Json 提取器对无法反序列化的请求体返回 422，
/// 与错误分类约定不符：非法枚举值、格式错误的JSON都属于参数验证失败。
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection_message(&rejection))),
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(err) => format!("请求体字段不合法: {err}"),
        JsonRejection::JsonSyntaxError(err) => format!("请求体不是合法的JSON: {err}"),
        JsonRejection::MissingJsonContentType(_) => {
            "请求缺少 Content-Type: application/json".to_string()
        }
        _ => "请求体解析失败".to_string(),
    }
}

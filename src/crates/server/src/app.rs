use crate::AppState;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::error::{InternalError, JsonPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{web, App, Error, HttpRequest, HttpResponse};
use log::warn;
use serde::Serialize;
use std::fmt::{Debug, Display};

/// 请求体大小上限（JSON 与表单相同）
pub const BODY_LIMIT: usize = 100 * 1024;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn reject<E>(err: E, status: StatusCode, req: &HttpRequest) -> Error
where
    E: Debug + Display + 'static,
{
    warn!("rejected body for {} {}: {}", req.method(), req.path(), err);
    let response = HttpResponse::build(status).json(ErrorResponse {
        error: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}

/// JSON 请求体解析配置
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(BODY_LIMIT)
        .error_handler(|err, req| {
            let status = match &err {
                JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                    StatusCode::PAYLOAD_TOO_LARGE
                }
                JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::BAD_REQUEST,
            };
            reject(err, status, req)
        })
}

/// URL 编码表单解析配置
///
/// 只支持扁平的键值对，`user[email]=x` 这样的键按字面保留，不会展开成嵌套对象。
pub fn form_config() -> web::FormConfig {
    web::FormConfig::default()
        .limit(BODY_LIMIT)
        .error_handler(|err, req| {
            let status = match &err {
                UrlencodedError::Overflow { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                UrlencodedError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::BAD_REQUEST,
            };
            reject(err, status, req)
        })
}

/// 构建应用外壳
///
/// 注册共享状态、JSON/表单解析配置和访问日志，不包含任何路由；
/// 调用方在返回的 `App` 上继续 `.service(...)` / `.route(...)`。
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(json_config())
        .app_data(form_config())
        .wrap(Logger::default())
}

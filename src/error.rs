use serde::{Deserialize, Serialize};

use clinic_console_shared::ValidationError;

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 视图层据此区分 "重试" / "无权限" / "未找到" 等不同展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorStatus {
    /// 401: 凭据错误，或令牌缺失/过期
    Authentication,
    /// 403: 角色无权访问
    Authorization,
    /// 404: 资源未找到
    NotFound,
    /// 提交前的必填字段校验失败
    Validation,
    /// 其他非 2xx 响应
    Server,
    /// 传输层失败（无响应）
    Network,
    /// 2xx 响应但响应体无法解析
    MalformedResponse,
}

impl ErrorStatus {
    /// Maps a non-2xx HTTP status onto the taxonomy.
    pub fn from_http(status: u16) -> Self {
        match status {
            401 => ErrorStatus::Authentication,
            403 => ErrorStatus::Authorization,
            404 => ErrorStatus::NotFound,
            _ => ErrorStatus::Server,
        }
    }

    /// HTTP status the error corresponds to, when it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ErrorStatus::Authentication => Some(401),
            ErrorStatus::Authorization => Some(403),
            ErrorStatus::NotFound => Some(404),
            ErrorStatus::Validation
            | ErrorStatus::Server
            | ErrorStatus::Network
            | ErrorStatus::MalformedResponse => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorStatus::Authentication => "AUTHENTICATION_FAILED",
            ErrorStatus::Authorization => "FORBIDDEN",
            ErrorStatus::NotFound => "RESOURCE_NOT_FOUND",
            ErrorStatus::Validation => "INVALID_INPUT",
            ErrorStatus::Server => "SERVER_ERROR",
            ErrorStatus::Network => "NETWORK_ERROR",
            ErrorStatus::MalformedResponse => "MALFORMED_RESPONSE",
        }
    }

    /// 只有网络错误值得提示用户重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorStatus::Network)
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "gateway.list_clinics"
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// Console domain error: a status, a user-facing message and an
/// operation trace.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{}] {message}", .status.error_code())]
pub struct ConsoleError {
    pub status: ErrorStatus,
    pub message: String,
    spans: Vec<ErrorSpan>,
}

impl ConsoleError {
    pub fn new(status: ErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Authentication, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Authorization, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Validation, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Server, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::Network, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorStatus::MalformedResponse, message)
    }

    // --- Context builders ---

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    pub fn is_retryable(&self) -> bool {
        self.status.is_retryable()
    }

    /// 渲染操作追踪，如 `gateway.dispatch(GET /clinic) -> gateway.list_clinics`
    pub fn trace(&self) -> String {
        self.spans
            .iter()
            .map(|span| match &span.detail {
                Some(detail) => format!("{}({})", span.operation, detail),
                None => span.operation.clone(),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<ValidationError> for ConsoleError {
    fn from(e: ValidationError) -> Self {
        ConsoleError::validation(e.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        ConsoleError::malformed(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_statuses_map_to_distinct_categories() {
        assert_eq!(ErrorStatus::from_http(401), ErrorStatus::Authentication);
        assert_eq!(ErrorStatus::from_http(403), ErrorStatus::Authorization);
        assert_eq!(ErrorStatus::from_http(404), ErrorStatus::NotFound);
        assert_eq!(ErrorStatus::from_http(500), ErrorStatus::Server);
        assert_eq!(ErrorStatus::from_http(422), ErrorStatus::Server);
    }

    #[test]
    fn only_network_errors_are_retryable() {
        assert!(ConsoleError::network("offline").is_retryable());
        assert!(!ConsoleError::server("boom").is_retryable());
        assert!(!ConsoleError::malformed("bad json").is_retryable());
    }

    #[test]
    fn display_and_trace() {
        let err = ConsoleError::not_found("no such clinic")
            .in_op_with("gateway.dispatch", "PUT /clinic/9")
            .in_op("gateway.update_clinic");

        assert_eq!(err.to_string(), "[RESOURCE_NOT_FOUND] no such clinic");
        assert_eq!(
            err.trace(),
            "gateway.dispatch(PUT /clinic/9) -> gateway.update_clinic"
        );
        assert_eq!(err.status.status_code(), Some(404));
    }

    #[test]
    fn validation_errors_convert() {
        let payload = clinic_console_shared::CreateAdminPayload::default();
        let err: ConsoleError = payload.validate().unwrap_err().into();
        assert_eq!(err.status, ErrorStatus::Validation);
        assert!(err.message().contains("username"));
    }
}

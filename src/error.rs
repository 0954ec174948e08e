use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// PDF 文档错误（DocumentFormatError）
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 门户（CAS / Intracursus）访问错误
    #[error("门户错误: {0}")]
    Portal(#[from] PortalError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// PDF 文档错误
///
/// 调用方应把这类错误当作"成绩单不可用"处理，返回占位结果
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 不是合法的 PDF
    #[error("无法解析 PDF: {source}")]
    InvalidPdf {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// PDF 没有任何页面
    #[error("PDF 不包含任何页面")]
    NoPages,
    /// 解析库在畸形文档上 panic
    #[error("PDF 解析过程崩溃（文档格式异常）")]
    ExtractorPanicked,
}

/// 门户访问错误
#[derive(Debug, Error)]
pub enum PortalError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        source: reqwest::Error,
    },
    /// 服务器返回非成功状态码
    #[error("请求 {endpoint} 返回状态码 {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 登录页面中找不到 execution 字段
    #[error("登录页面缺少 execution 字段")]
    MissingExecutionToken,
    /// 未知的学期
    #[error("未知的学期: {semester}")]
    UnknownSemester { semester: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 缺少必需的配置项
    #[error("缺少配置项 {key}（可通过环境变量 {env_var} 设置）")]
    Missing { key: String, env_var: String },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|u| u.to_string())
            .unwrap_or_default();
        AppError::Portal(PortalError::RequestFailed {
            endpoint,
            source: err,
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建 PDF 解析失败错误
    pub fn invalid_pdf(reason: impl std::fmt::Display) -> Self {
        AppError::Document(DocumentError::InvalidPdf {
            source: reason.to_string().into(),
        })
    }

    /// 创建请求失败错误
    pub fn request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Portal(PortalError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 是否为文档格式错误（成绩单不可用）
    pub fn is_document_error(&self) -> bool {
        matches!(self, AppError::Document(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

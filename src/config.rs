use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CAS 登录入口（Intracursus）
    pub cas_entry_url: String,
    /// CAS 服务器地址
    pub login_base_url: String,
    /// 登录表单路径（含 service 参数）
    pub login_route: String,
    /// 成绩单下载地址
    pub download_url: String,
    /// 缺勤系统入口，访问后才能打开缺勤页面
    pub absences_entry_url: String,
    /// 缺勤页面（经 CAS 跳转）
    pub absences_url: String,
    /// 头像地址前缀，拼接首页上头像图片的相对路径
    pub avatar_base_url: String,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 成绩单缓存有效期（秒）
    pub cache_ttl_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 账号 ---
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cas_entry_url: "https://intracursus.unice.fr/ic/dlogin/cas.php".to_string(),
            login_base_url: "https://login.univ-cotedazur.fr".to_string(),
            login_route:
                "/login?service=https%3A%2F%2Fintracursus.unice.fr%2Fic%2Fdlogin%2Fcas.php"
                    .to_string(),
            download_url: "https://intracursus.unice.fr/ic/etudiant/ic-notes-presences.php"
                .to_string(),
            absences_entry_url: "https://iut-gpu-personnels.unice.fr/sat/index.php".to_string(),
            absences_url: "https://login.univ-cotedazur.fr/login?service=\
                           https%3A%2F%2Fiut-gpu-personnels.unice.fr%2Fmobile%2Findex.php%3Faim%3Dconsultabs"
                .to_string(),
            avatar_base_url: "https://login.univ-cotedazur.fr/login?service=\
                              https%3A%2F%2Fintracursus.unice.fr%2Fic%2Fetudiant/"
                .to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36"
                .to_string(),
            request_timeout_secs: 20,
            cache_ttl_secs: 15 * 60,
            verbose_logging: false,
            username: None,
            password: None,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置或无法解析的项使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            cas_entry_url: std::env::var("CAS_ENTRY_URL").unwrap_or(default.cas_entry_url),
            login_base_url: std::env::var("LOGIN_BASE_URL").unwrap_or(default.login_base_url),
            login_route: std::env::var("LOGIN_ROUTE").unwrap_or(default.login_route),
            download_url: std::env::var("DOWNLOAD_URL").unwrap_or(default.download_url),
            absences_entry_url: std::env::var("ABSENCES_ENTRY_URL").unwrap_or(default.absences_entry_url),
            absences_url: std::env::var("ABSENCES_URL").unwrap_or(default.absences_url),
            avatar_base_url: std::env::var("AVATAR_BASE_URL").unwrap_or(default.avatar_base_url),
            user_agent: std::env::var("USER_AGENT").unwrap_or(default.user_agent),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            cache_ttl_secs: std::env::var("CACHE_TTL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.cache_ttl_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            username: std::env::var("INTRA_USERNAME").ok().or(default.username),
            password: std::env::var("INTRA_PASSWORD").ok().or(default.password),
        }
    }

    /// 从 TOML 文件加载配置，缺失的键使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::File(FileError::TomlParseFailed { source, .. }) => {
                AppError::File(FileError::TomlParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// 获取登录凭据
    pub fn credentials(&self) -> AppResult<(&str, &str)> {
        let username = self.username.as_deref().ok_or_else(|| ConfigError::Missing {
            key: "username".to_string(),
            env_var: "INTRA_USERNAME".to_string(),
        })?;
        let password = self.password.as_deref().ok_or_else(|| ConfigError::Missing {
            key: "password".to_string(),
            env_var: "INTRA_PASSWORD".to_string(),
        })?;
        Ok((username, password))
    }

    /// CAS 登录表单的完整地址
    pub fn login_url(&self) -> String {
        format!("{}{}", self.login_base_url, self.login_route)
    }

    /// CAS 登出地址
    pub fn logout_url(&self) -> String {
        format!("{}/logout", self.login_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_partial_config_keeps_defaults() {
        let config = Config::from_toml_str("cache_ttl_secs = 60\nusername = \"demo\"\n").unwrap();
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.username.as_deref(), Some("demo"));
        assert_eq!(config.request_timeout_secs, 20);
        assert!(config.login_url().starts_with("https://login.univ-cotedazur.fr/login?service="));
        assert!(config.absences_url.ends_with("index.php%3Faim%3Dconsultabs"));
        assert!(config.avatar_base_url.ends_with("%2Fic%2Fetudiant/"));
    }

    #[test]
    fn test_invalid_toml_is_file_error() {
        let err = Config::from_toml_str("cache_ttl_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, AppError::File(FileError::TomlParseFailed { .. })));
    }

    #[test]
    fn test_missing_credentials() {
        let config = Config::default();
        let err = config.credentials().unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Missing { .. })));
    }
}

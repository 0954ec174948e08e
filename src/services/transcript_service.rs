//! 成绩单服务 - 业务能力层
//!
//! 位于解析器之前：下载 → 解析 → 缓存，并在失败时返回占位结果

use crate::config::Config;
use crate::error::{AppResult, DocumentError};
use crate::models::transcript::ParsedTranscript;
use crate::parser;
use crate::services::transcript_cache::TranscriptCache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// 成绩单 PDF 的来源
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// 下载指定学期的成绩单
    async fn fetch_pdf(&self, semester: &str) -> AppResult<Vec<u8>>;
}

/// PDF 解析函数
pub type ParseFn = fn(&[u8]) -> AppResult<ParsedTranscript>;

/// 成绩单服务
///
/// 职责：
/// - 按 (用户, 学期) 缓存解析结果
/// - 同一用户的请求串行执行，避免重复下载
/// - 下载或解析失败时返回 [`ParsedTranscript::unavailable`]
pub struct TranscriptService {
    cache: Mutex<TranscriptCache>,
    user_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    parse: ParseFn,
}

impl TranscriptService {
    /// 创建新的成绩单服务
    pub fn new(config: &Config) -> Self {
        Self::with_parser(
            Duration::from_secs(config.cache_ttl_secs),
            parser::parse_transcript,
        )
    }

    /// 使用自定义解析函数创建
    pub fn with_parser(ttl: Duration, parse: ParseFn) -> Self {
        Self {
            cache: Mutex::new(TranscriptCache::new(ttl)),
            user_locks: Mutex::new(HashMap::new()),
            parse,
        }
    }

    /// 获取成绩单，失败时返回占位结果
    ///
    /// # 参数
    /// - `source`: PDF 来源
    /// - `user`: 用户标识
    /// - `semester`: 学期
    pub async fn transcript<S>(&self, source: &S, user: &str, semester: &str) -> ParsedTranscript
    where
        S: TranscriptSource + ?Sized,
    {
        match self.try_transcript(source, user, semester).await {
            Ok(transcript) => transcript,
            Err(e) => {
                warn!("⚠️ [{} / {}] 成绩单不可用: {}", user, semester, e);
                ParsedTranscript::unavailable()
            }
        }
    }

    /// 获取成绩单，错误原样返回
    pub async fn try_transcript<S>(
        &self,
        source: &S,
        user: &str,
        semester: &str,
    ) -> AppResult<ParsedTranscript>
    where
        S: TranscriptSource + ?Sized,
    {
        let user_lock = self.user_lock(user).await;
        let _guard = user_lock.lock().await;

        if let Some(cached) = self.cache.lock().await.get(user, semester) {
            debug!("[{} / {}] 命中缓存", user, semester);
            return Ok(cached);
        }

        let pdf = source.fetch_pdf(semester).await?;
        let parse = self.parse;
        let transcript = tokio::task::spawn_blocking(move || parse(&pdf))
            .await
            .map_err(|_| DocumentError::ExtractorPanicked)??;

        info!(
            "✓ [{} / {}] 解析完成: {} 个科目",
            user,
            semester,
            transcript.grades.len()
        );
        self.cache
            .lock()
            .await
            .insert(user, semester, transcript.clone());
        Ok(transcript)
    }

    /// 清除某个用户的缓存
    pub async fn invalidate_user(&self, user: &str) {
        self.cache.lock().await.invalidate_user(user);
    }

    /// 取出用户锁，顺便移除没有任何请求持有的锁
    async fn user_lock(&self, user: &str) -> Arc<Mutex<()>> {
        let mut locks = self.user_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(user.to_string()).or_default().clone()
    }
}

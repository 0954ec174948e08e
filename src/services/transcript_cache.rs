//! 成绩单缓存 - 按 (用户, 学期) 缓存解析结果，过期后失效

use crate::models::transcript::ParsedTranscript;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    transcript: ParsedTranscript,
}

/// 成绩单缓存
///
/// 本身不加锁，由 `TranscriptService` 负责同步
#[derive(Debug)]
pub struct TranscriptCache {
    ttl: Duration,
    entries: HashMap<(String, String), CacheEntry>,
}

impl TranscriptCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// 读取未过期的缓存，过期条目会被移除
    pub fn get(&mut self, user: &str, semester: &str) -> Option<ParsedTranscript> {
        let key = (user.to_string(), semester.to_string());
        match self.entries.get(&key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.transcript.clone()),
            Some(_) => {
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// 写入缓存，同时清掉所有已过期的条目
    pub fn insert(&mut self, user: &str, semester: &str, transcript: ParsedTranscript) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        self.entries.insert(
            (user.to_string(), semester.to_string()),
            CacheEntry {
                stored_at: Instant::now(),
                transcript,
            },
        );
    }

    /// 清除某个用户的全部缓存（例如登出时）
    pub fn invalidate_user(&mut self, user: &str) {
        self.entries.retain(|(u, _), _| u != user);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

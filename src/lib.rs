//! # Unice Transcript
//!
//! Intracursus（蔚蓝海岸大学）成绩单 PDF 解析
//!
//! ## 架构设计
//!
//! ### ① 解析层（Parser）
//! - `parser/` - 无状态的解析流水线，输入 PDF 字节，输出 `ParsedTranscript`
//! - `text_extractor` → `segmenter` → (`header` | `tokenizer` → `normalizer`) → 组装
//!
//! ### ② 数据模型（Models）
//! - `models/transcript` - 科目、成绩、页首字段及其 JSON 格式
//! - `models/absence` - 缺勤 / 迟到 / 排除记录
//!
//! ### ③ 外部协作（Clients）
//! - `IntraClient` - CAS 登录、学期列表、姓名与头像、缺勤记录、成绩单下载
//!
//! ### ④ 业务能力层（Services）
//! - `TranscriptService` - 缓存、同一用户串行、失败时返回占位结果
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod parser;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::IntraClient;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AbsenceReport, GradeToken, ParsedTranscript, Subject};
pub use parser::parse_transcript;
pub use services::{TranscriptService, TranscriptSource};

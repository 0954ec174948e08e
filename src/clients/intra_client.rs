/// Intracursus 门户客户端
///
/// 封装 CAS 登录、学期列表、学生姓名、头像、缺勤记录和成绩单下载
use crate::config::Config;
use crate::error::{AppError, AppResult, PortalError};
use crate::models::absence::{AbsenceRecord, AbsenceReport};
use crate::services::transcript_service::TranscriptSource;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::cookie::Jar;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 演示账号，不访问门户
const DEMO_CREDENTIAL: &str = "demo";
/// 学生姓名缺失时的默认值
const DEFAULT_STUDENT_NAME: &str = "Étudiant";
const CURRENT_SEMESTER_PREFIX: &str = "Relevé des notes et absences de ";
/// 头像图片路径中的关键字
const AVATAR_MARKER: &str = "etudiant";
/// 某一类记录为空时页面显示的文字
const NO_RECORDS: &str = "Aucun enseignement";
/// 缺勤页面上三个小节的标题关键字
const ABSENCES_SECTION: &str = "par les absences";
const LATES_SECTION: &str = "par les retards";
const EXCLUSIONS_SECTION: &str = "par les exclusions";
/// 第 0 张表是页面布局，每个非空小节占两张表（明细 + 合计）
const FIRST_RECORD_TABLE: usize = 1;
const TABLES_PER_SECTION: usize = 2;
/// 每行记录的列数：日期、时间、类型、课程、老师、是否请假、原因
const RECORD_COLUMNS: usize = 7;

static STUDENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Notes et absences de ([^(]*)").unwrap());

/// 学期列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Semesters {
    /// 当前学期
    pub current: Option<String>,
    /// 其他学期：(名称, 表单 id)
    pub others: Vec<(String, String)>,
}

impl Semesters {
    /// 所有学期名称，当前学期在前
    pub fn names(&self) -> Vec<String> {
        self.current
            .iter()
            .cloned()
            .chain(self.others.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    /// 查找其他学期的表单 id
    pub fn id_of(&self, name: &str) -> Option<&str> {
        self.others
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| id.as_str())
    }
}

/// Intracursus 门户客户端
pub struct IntraClient {
    config: Config,
    /// 跟随重定向的客户端
    http: Client,
    /// 不跟随重定向，用于提交登录表单
    no_redirect: Client,
    semesters: Semesters,
    demo: bool,
}

impl IntraClient {
    /// 创建新的门户客户端，两个 HTTP 客户端共享同一个 cookie jar
    pub fn new(config: &Config) -> AppResult<Self> {
        let jar = Arc::new(Jar::default());
        let build = |policy: Policy| {
            Client::builder()
                .cookie_provider(jar.clone())
                .user_agent(config.user_agent.clone())
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .redirect(policy)
                .build()
        };

        Ok(Self {
            config: config.clone(),
            http: build(Policy::limited(10))?,
            no_redirect: build(Policy::none())?,
            semesters: Semesters::default(),
            demo: false,
        })
    }

    /// 是否为演示账号
    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// 当前学期（需先调用 [`IntraClient::semesters`]）
    pub fn current_semester(&self) -> Option<&str> {
        self.semesters.current.as_deref()
    }

    /// 通过 CAS 登录
    ///
    /// # 返回
    /// 用户名或密码错误时返回 `Ok(false)`
    pub async fn login(&mut self, username: &str, password: &str) -> AppResult<bool> {
        if username == DEMO_CREDENTIAL && password == DEMO_CREDENTIAL {
            info!("🎭 演示账号登录");
            self.demo = true;
            return Ok(true);
        }

        let html = self.get_text(&self.config.cas_entry_url).await?;
        let execution = parse_execution_token(&html).ok_or(PortalError::MissingExecutionToken)?;

        let login_url = self.config.login_url();
        let form = [
            ("username", username),
            ("password", password),
            ("execution", execution.as_str()),
            ("_eventId", "submit"),
            ("submit", "SE CONNECTER"),
        ];
        let resp = self
            .no_redirect
            .post(&login_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&login_url, e))?;

        // 凭据错误时 CAS 不会重定向
        let Some(location) = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
        else {
            warn!("⚠️ 登录失败: {}", username);
            return Ok(false);
        };

        debug!("CAS 重定向到: {}", location);
        self.get_text(&location).await?;
        info!("✓ 登录成功: {}", username);
        Ok(true)
    }

    /// 登出
    pub async fn logout(&self) -> AppResult<()> {
        if self.demo {
            return Ok(());
        }
        self.get_text(&self.config.logout_url()).await?;
        Ok(())
    }

    /// 获取可用的学期列表
    pub async fn semesters(&mut self) -> AppResult<Vec<String>> {
        if self.demo {
            return Ok(Vec::new());
        }
        let html = self.get_text(&self.config.cas_entry_url).await?;
        self.semesters = parse_semesters(&html);
        debug!("学期列表: {:?}", self.semesters);
        Ok(self.semesters.names())
    }

    /// 获取学生姓名
    pub async fn student_name(&self) -> AppResult<String> {
        if self.demo {
            return Ok(DEFAULT_STUDENT_NAME.to_string());
        }
        let html = self.get_text(&self.config.cas_entry_url).await?;
        Ok(parse_student_name(&html))
    }

    /// 下载学生头像
    ///
    /// # 返回
    /// 首页没有头像或下载失败时返回 `Ok(None)`
    pub async fn avatar(&self) -> AppResult<Option<Vec<u8>>> {
        if self.demo {
            return Ok(None);
        }
        let html = self.get_text(&self.config.cas_entry_url).await?;
        let Some(src) = parse_avatar_src(&html) else {
            debug!("首页没有头像");
            return Ok(None);
        };

        let url = format!("{}{}", self.config.avatar_base_url, src);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;
        if resp.status() != reqwest::StatusCode::OK {
            warn!("⚠️ 头像下载失败: {}", resp.status());
            return Ok(None);
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AppError::request_failed(&url, e))?;
        Ok(Some(bytes.to_vec()))
    }

    /// 获取缺勤、迟到和排除记录
    pub async fn absences(&self) -> AppResult<AbsenceReport> {
        if self.demo {
            return Ok(AbsenceReport::default());
        }
        // 先访问缺勤系统入口建立会话
        self.get_text(&self.config.absences_entry_url).await?;
        let html = self.get_text(&self.config.absences_url).await?;
        let report = parse_absences(&html);
        info!(
            "📋 缺勤记录: {} 条缺勤, {} 条迟到, {} 条排除",
            report.absences.len(),
            report.lates.len(),
            report.exclusions.len()
        );
        Ok(report)
    }

    /// 下载指定学期的成绩单 PDF
    pub async fn semester_pdf(&self, semester: &str) -> AppResult<Vec<u8>> {
        let form: Vec<(&str, String)> = if self.current_semester() == Some(semester) {
            vec![(
                "telrelevepresences",
                format!("Télécharger le relevé des notes et absences de {}", semester),
            )]
        } else {
            let id = self
                .semesters
                .id_of(semester)
                .ok_or_else(|| PortalError::UnknownSemester {
                    semester: semester.to_string(),
                })?;
            vec![
                ("idautreinscription", id.to_string()),
                (
                    "telreleveanterieur",
                    "Télécharger le relevé du parcours sélectionné".to_string(),
                ),
            ]
        };

        let url = &self.config.download_url;
        info!("📥 正在下载成绩单: {}", semester);
        let resp = self
            .http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;
        let resp = check_status(url, resp)?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;
        debug!("成绩单大小: {} 字节", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn get_text(&self, url: &str) -> AppResult<String> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;
        let resp = check_status(url, resp)?;
        resp.text()
            .await
            .map_err(|e| AppError::request_failed(url, e))
    }
}

#[async_trait]
impl TranscriptSource for IntraClient {
    async fn fetch_pdf(&self, semester: &str) -> AppResult<Vec<u8>> {
        self.semester_pdf(semester).await
    }
}

fn check_status(url: &str, resp: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(PortalError::BadStatus {
            endpoint: url.to_string(),
            status: status.as_u16(),
        }
        .into())
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// 登录表单中的 execution 隐藏字段
pub fn parse_execution_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&selector(r#"input[type="hidden"][name="execution"]"#))
        .find_map(|input| input.value().attr("value"))
        .map(str::to_string)
}

/// 从 Intracursus 首页解析学期列表
pub fn parse_semesters(html: &str) -> Semesters {
    let document = Html::parse_document(html);

    // 当前学期可能不存在
    let current = document
        .select(&selector("b"))
        .map(|b| b.text().collect::<String>())
        .find_map(|text| {
            text.trim()
                .strip_prefix(CURRENT_SEMESTER_PREFIX)
                .and_then(|rest| rest.split_whitespace().next())
                .map(str::to_string)
        });

    let others = document
        .select(&selector("select#idautreinscription option"))
        .filter_map(|option| {
            let id = option.value().attr("value")?.to_string();
            let label = option.text().collect::<String>();
            let name = label.split_whitespace().next()?.to_string();
            Some((name, id))
        })
        .collect();

    Semesters { current, others }
}

/// 从 Intracursus 首页解析学生姓名
pub fn parse_student_name(html: &str) -> String {
    let document = Html::parse_document(html);
    let raw = document
        .root_element()
        .text()
        .find_map(|text| {
            STUDENT_NAME
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
        .unwrap_or_default();

    if raw.is_empty() {
        return DEFAULT_STUDENT_NAME.to_string();
    }

    // 名字太长时只保留第一个词
    let name = if raw.chars().count() > 20 {
        raw.split_whitespace().next().unwrap_or_default()
    } else {
        raw.as_str()
    };
    title_case(name)
}

/// 首页上头像图片的地址（第一个路径包含 `etudiant` 的 `img`）
pub fn parse_avatar_src(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&selector("img"))
        .filter_map(|img| img.value().attr("src"))
        .find(|src| src.contains(AVATAR_MARKER))
        .map(str::to_string)
}

/// 解析缺勤页面
///
/// 页面依次有三个小节，每节以包含关键字的 `<p>` 开头；
/// 标题后第二个元素包含 `Aucun enseignement` 时该节为空且不占表格。
pub fn parse_absences(html: &str) -> AbsenceReport {
    let document = Html::parse_document(html);
    let elements: Vec<ElementRef<'_>> = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .collect();
    let tables: Vec<ElementRef<'_>> = document.select(&selector("table")).collect();

    let mut next_table = FIRST_RECORD_TABLE;
    let mut section = |marker: &str| -> Vec<AbsenceRecord> {
        let Some(title) = elements.iter().position(|el| {
            el.value().name() == "p" && el.text().collect::<String>().contains(marker)
        }) else {
            debug!("缺勤页面缺少小节: {}", marker);
            return Vec::new();
        };

        let is_empty = elements
            .get(title + 2)
            .map_or(true, |el| el.html().contains(NO_RECORDS));
        if is_empty {
            return Vec::new();
        }

        let table = tables.get(next_table).copied();
        next_table += TABLES_PER_SECTION;
        table.map(parse_record_table).unwrap_or_default()
    };

    AbsenceReport {
        absences: section(ABSENCES_SECTION),
        lates: section(LATES_SECTION),
        exclusions: section(EXCLUSIONS_SECTION),
    }
}

/// 解析一张记录表，跳过表头行
fn parse_record_table(table: ElementRef<'_>) -> Vec<AbsenceRecord> {
    let cell = selector("td");
    table
        .select(&selector("tr"))
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .collect();
            if cells.len() < RECORD_COLUMNS {
                debug!("跳过列数不足的行: {:?}", cells);
                return None;
            }
            Some(AbsenceRecord {
                date: cells[0].clone(),
                hour: cells[1].clone(),
                kind: cells[2].clone(),
                class: cells[3].split_whitespace().collect::<Vec<_>>().join(" "),
                teacher: cells[4].clone(),
                justified: cells[5] == "Oui",
                reason: cells[6].clone(),
            })
        })
        .collect()
}

/// 每个单词首字母大写，其余小写
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

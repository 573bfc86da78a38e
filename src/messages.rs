//! 前后端消息类型
//!
//! Outgoing `Command`s and incoming `BackendEvent`s, one payload shape per method.
//! Method names are the wire strings shared with the native backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::DEFAULT_FILE_FORMAT;

// ============================================================
// 方法名
// ============================================================

/// Methods sent from the UI to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandMethod {
    GetRandomWord,
    SubmitAnswer,
    ShowAnswer,
    LoadWordsFile,
    /// Reserved: not part of the backend's recognized set yet.
    LoadWordsContent,
    SaveSettings,
    ExportWrongWords,
    ResetProgress,
    GetStats,
    GetAllWords,
    SaveAppSettings,
}

impl CommandMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            CommandMethod::GetRandomWord => "getRandomWord",
            CommandMethod::SubmitAnswer => "submitAnswer",
            CommandMethod::ShowAnswer => "showAnswer",
            CommandMethod::LoadWordsFile => "loadWordsFile",
            CommandMethod::LoadWordsContent => "loadWordsContent",
            CommandMethod::SaveSettings => "saveSettings",
            CommandMethod::ExportWrongWords => "exportWrongWords",
            CommandMethod::ResetProgress => "resetProgress",
            CommandMethod::GetStats => "getStats",
            CommandMethod::GetAllWords => "getAllWords",
            CommandMethod::SaveAppSettings => "saveAppSettings",
        }
    }

    pub const fn is_reserved(self) -> bool {
        matches!(self, CommandMethod::LoadWordsContent)
    }
}

impl fmt::Display for CommandMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Methods delivered from the backend to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventMethod {
    WordLoaded,
    AnswerResult,
    AnswerShown,
    WordsLoaded,
    StatsUpdated,
    AllWords,
    ProgressReset,
    Error,
}

impl EventMethod {
    pub const ALL: [EventMethod; 8] = [
        EventMethod::WordLoaded,
        EventMethod::AnswerResult,
        EventMethod::AnswerShown,
        EventMethod::WordsLoaded,
        EventMethod::StatsUpdated,
        EventMethod::AllWords,
        EventMethod::ProgressReset,
        EventMethod::Error,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EventMethod::WordLoaded => "wordLoaded",
            EventMethod::AnswerResult => "answerResult",
            EventMethod::AnswerShown => "answerShown",
            EventMethod::WordsLoaded => "wordsLoaded",
            EventMethod::StatsUpdated => "statsUpdated",
            EventMethod::AllWords => "allWords",
            EventMethod::ProgressReset => "progressReset",
            EventMethod::Error => "error",
        }
    }
}

impl fmt::Display for EventMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// ============================================================
// 数据结构
// ============================================================

/// 单词（由后端持有，前端只保留当前单词）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Word {
    pub word: String,
    pub pos: String,
    pub meaning: String,
    pub example: String,
    pub has_derivatives: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub derivatives: Vec<Word>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    pub correct: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerShown {
    pub correct_answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WordsLoaded {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressReset {
    pub message: String,
}

/// 学习统计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_words: u64,
    pub mastered_words: u64,
    pub wrong_words: u64,
    pub remaining_words: u64,
    pub progress: f64,
}

impl Stats {
    /// Overwrites only the fields present in `update`.
    pub fn merge(&mut self, update: &StatsUpdate) {
        if let Some(v) = update.total_words {
            self.total_words = v;
        }
        if let Some(v) = update.mastered_words {
            self.mastered_words = v;
        }
        if let Some(v) = update.wrong_words {
            self.wrong_words = v;
        }
        if let Some(v) = update.remaining_words {
            self.remaining_words = v;
        }
        if let Some(v) = update.progress {
            self.progress = v;
        }
    }
}

/// Partial statistics as sent by `statsUpdated`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsUpdate {
    pub total_words: Option<u64>,
    pub mastered_words: Option<u64>,
    pub wrong_words: Option<u64>,
    pub remaining_words: Option<u64>,
    pub progress: Option<f64>,
}

/// 后端错误代码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    FileNotFound,
    FileParseError,
    NetworkError,
    Unknown,
}

impl ErrorCode {
    pub const fn code(self) -> u32 {
        match self {
            ErrorCode::FileNotFound => 1001,
            ErrorCode::FileParseError => 1002,
            ErrorCode::NetworkError => 1003,
            ErrorCode::Unknown => 9999,
        }
    }

    pub const fn from_code(code: i64) -> Self {
        match code {
            1001 => ErrorCode::FileNotFound,
            1002 => ErrorCode::FileParseError,
            1003 => ErrorCode::NetworkError,
            _ => ErrorCode::Unknown,
        }
    }
}

/// Domain error reported by the backend, kept for display.
///
/// The backend does not always send a code, and sometimes sends a bare string;
/// both are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawBackendError")]
pub struct BackendError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBackendError {
    Message(String),
    Structured {
        #[serde(default)]
        code: Option<i64>,
        #[serde(default)]
        message: Option<String>,
    },
}

impl From<RawBackendError> for BackendError {
    fn from(raw: RawBackendError) -> Self {
        match raw {
            RawBackendError::Message(message) => BackendError {
                code: ErrorCode::Unknown,
                message,
            },
            RawBackendError::Structured { code, message } => BackendError {
                code: code.map(ErrorCode::from_code).unwrap_or(ErrorCode::Unknown),
                message: message.unwrap_or_default(),
            },
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

// ============================================================
// 请求负载
// ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswer {
    pub answer: String,
    pub current_word: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowAnswer {
    pub current_word: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadWordsFile {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadWordsContent {
    pub filename: String,
    pub content: String,
}

/// Theme snapshot persisted with `saveSettings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    pub dark_mode: bool,
    pub color_theme: String,
    pub pos_color: String,
    pub correct_color: String,
    pub error_color: String,
    pub answer_color: String,
}

/// 应用设置，通过 `saveAppSettings` 整体保存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    // 学习设置
    pub auto_advance: bool,
    pub auto_advance_delay: u64,
    pub case_sensitive: bool,
    pub enable_hints: bool,

    // 界面设置
    pub show_examples: bool,
    pub show_derivatives: bool,
    pub animation_enabled: bool,

    // 文件设置
    pub default_file_format: String,
    pub remember_last_file: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            auto_advance: true,
            auto_advance_delay: 1500,
            case_sensitive: false,
            enable_hints: true,
            show_examples: true,
            show_derivatives: true,
            animation_enabled: true,
            default_file_format: DEFAULT_FILE_FORMAT.to_string(),
            remember_last_file: true,
        }
    }
}

// ============================================================
// Command / BackendEvent
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetRandomWord,
    SubmitAnswer(SubmitAnswer),
    ShowAnswer(ShowAnswer),
    LoadWordsFile(LoadWordsFile),
    LoadWordsContent(LoadWordsContent),
    SaveSettings(ThemeSettings),
    ExportWrongWords,
    ResetProgress,
    GetStats,
    GetAllWords,
    SaveAppSettings(AppSettings),
}

impl Command {
    pub fn method(&self) -> CommandMethod {
        match self {
            Command::GetRandomWord => CommandMethod::GetRandomWord,
            Command::SubmitAnswer(_) => CommandMethod::SubmitAnswer,
            Command::ShowAnswer(_) => CommandMethod::ShowAnswer,
            Command::LoadWordsFile(_) => CommandMethod::LoadWordsFile,
            Command::LoadWordsContent(_) => CommandMethod::LoadWordsContent,
            Command::SaveSettings(_) => CommandMethod::SaveSettings,
            Command::ExportWrongWords => CommandMethod::ExportWrongWords,
            Command::ResetProgress => CommandMethod::ResetProgress,
            Command::GetStats => CommandMethod::GetStats,
            Command::GetAllWords => CommandMethod::GetAllWords,
            Command::SaveAppSettings(_) => CommandMethod::SaveAppSettings,
        }
    }

    /// The `data` half of the envelope; commands without a payload send `{}`.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Command::GetRandomWord
            | Command::ExportWrongWords
            | Command::ResetProgress
            | Command::GetStats
            | Command::GetAllWords => Ok(json!({})),
            Command::SubmitAnswer(p) => serde_json::to_value(p),
            Command::ShowAnswer(p) => serde_json::to_value(p),
            Command::LoadWordsFile(p) => serde_json::to_value(p),
            Command::LoadWordsContent(p) => serde_json::to_value(p),
            Command::SaveSettings(p) => serde_json::to_value(p),
            Command::SaveAppSettings(p) => serde_json::to_value(p),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    WordLoaded(Word),
    AnswerResult(AnswerResult),
    AnswerShown(AnswerShown),
    WordsLoaded(WordsLoaded),
    StatsUpdated(StatsUpdate),
    AllWords(Vec<Word>),
    ProgressReset(ProgressReset),
    Error(BackendError),
}

impl BackendEvent {
    pub fn method(&self) -> EventMethod {
        match self {
            BackendEvent::WordLoaded(_) => EventMethod::WordLoaded,
            BackendEvent::AnswerResult(_) => EventMethod::AnswerResult,
            BackendEvent::AnswerShown(_) => EventMethod::AnswerShown,
            BackendEvent::WordsLoaded(_) => EventMethod::WordsLoaded,
            BackendEvent::StatsUpdated(_) => EventMethod::StatsUpdated,
            BackendEvent::AllWords(_) => EventMethod::AllWords,
            BackendEvent::ProgressReset(_) => EventMethod::ProgressReset,
            BackendEvent::Error(_) => EventMethod::Error,
        }
    }

    /// Builds the typed event for `method` from an already-parsed JSON value.
    ///
    /// `null` is read as an empty object, since several backend events carry
    /// no meaningful payload.
    pub fn from_value(method: EventMethod, data: Value) -> Result<Self, serde_json::Error> {
        let data = if data.is_null() { json!({}) } else { data };
        let event = match method {
            EventMethod::WordLoaded => BackendEvent::WordLoaded(serde_json::from_value(data)?),
            EventMethod::AnswerResult => BackendEvent::AnswerResult(serde_json::from_value(data)?),
            EventMethod::AnswerShown => BackendEvent::AnswerShown(serde_json::from_value(data)?),
            EventMethod::WordsLoaded => BackendEvent::WordsLoaded(serde_json::from_value(data)?),
            EventMethod::StatsUpdated => BackendEvent::StatsUpdated(serde_json::from_value(data)?),
            EventMethod::AllWords => BackendEvent::AllWords(serde_json::from_value(data)?),
            EventMethod::ProgressReset => {
                BackendEvent::ProgressReset(serde_json::from_value(data)?)
            }
            EventMethod::Error => BackendEvent::Error(serde_json::from_value(data)?),
        };
        Ok(event)
    }
}

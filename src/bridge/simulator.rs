// 开发环境模拟后端
// 没有宿主通道时，对三个命令给出固定的延迟响应，
// 响应经由与宿主消息相同的解析路径分发。

use std::sync::Weak;
use std::time::Duration;

use serde_json::json;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::envelope::RawPayload;
use super::registry::HandlerRegistry;
use crate::messages::{Command, EventMethod};

pub const DEFAULT_SIMULATOR_DELAY: Duration = Duration::from_millis(500);

/// The only word the simulator knows.
pub const SAMPLE_WORD: &str = "example";

#[derive(Clone)]
pub struct Simulator {
    registry: Weak<HandlerRegistry>,
    delay: Duration,
}

impl Simulator {
    pub fn new(registry: Weak<HandlerRegistry>, delay: Duration) -> Self {
        Self { registry, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules the canned reply for `command`, if it has one.
    pub fn respond(&self, command: &Command) {
        let method = command.method();
        info!(method = %method, "发送到后端 (模拟)");

        let Some((reply_method, payload)) = canned_reply(command) else {
            debug!(method = %method, "no simulated response");
            return;
        };

        let Ok(handle) = Handle::try_current() else {
            warn!(method = %method, "no async runtime; simulated response dropped");
            return;
        };

        let registry = self.registry.clone();
        let delay = self.delay;
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(registry) = registry.upgrade() {
                registry.dispatch(reply_method.as_str(), RawPayload::Text(payload));
            }
        });
    }
}

/// The reply a real backend would plausibly send, JSON-encoded like host data.
pub fn canned_reply(command: &Command) -> Option<(EventMethod, String)> {
    match command {
        Command::GetRandomWord => {
            let word = json!({
                "word": SAMPLE_WORD,
                "pos": "n.",
                "meaning": "例子，实例",
                "example": "This is an example sentence.",
                "hasDerivatives": false
            });
            Some((EventMethod::WordLoaded, word.to_string()))
        }
        Command::SubmitAnswer(request) => {
            let correct = request.answer.to_lowercase() == SAMPLE_WORD;
            let message = if correct {
                "答案正确！".to_string()
            } else {
                format!("答案错误，正确答案: {SAMPLE_WORD}")
            };
            let result = json!({ "correct": correct, "message": message });
            Some((EventMethod::AnswerResult, result.to_string()))
        }
        Command::GetStats => {
            let stats = json!({
                "totalWords": 100,
                "masteredWords": 25,
                "wrongWords": 5,
                "remainingWords": 75,
                "progress": 0.25
            });
            Some((EventMethod::StatsUpdated, stats.to_string()))
        }
        _ => None,
    }
}

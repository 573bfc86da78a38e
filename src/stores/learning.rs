use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::config;
use crate::messages::{
    AnswerResult, AnswerShown, BackendError, BackendEvent, Command, EventMethod,
    LoadWordsContent, LoadWordsFile, ShowAnswer, Stats, StatsUpdate, SubmitAnswer, Word,
    WordsLoaded,
};

/// Learning phase; input is accepted only in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LearningPhase {
    #[default]
    Idle,
    Loading,
    Answered,
    Reviewing,
    Completed,
}

impl LearningPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            LearningPhase::Idle => "idle",
            LearningPhase::Loading => "loading",
            LearningPhase::Answered => "answered",
            LearningPhase::Reviewing => "reviewing",
            LearningPhase::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackType {
    Correct,
    Incorrect,
    ShowAnswer,
    Hint,
}

impl FeedbackType {
    pub const fn as_str(self) -> &'static str {
        match self {
            FeedbackType::Correct => "correct",
            FeedbackType::Incorrect => "incorrect",
            FeedbackType::ShowAnswer => "show_answer",
            FeedbackType::Hint => "hint",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub kind: FeedbackType,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningSnapshot {
    pub current_word: Option<Word>,
    pub phase: LearningPhase,
    pub user_answer: String,
    pub feedback: Option<Feedback>,
    pub stats: Stats,
    pub all_words: Vec<Word>,
    /// Last `wordsLoaded` acknowledgment.
    pub notice: Option<String>,
    /// Last domain error reported by the backend, shown to the user.
    pub error: Option<BackendError>,
}

impl LearningSnapshot {
    pub fn is_input_enabled(&self) -> bool {
        self.phase == LearningPhase::Idle
    }

    pub fn is_answer_correct(&self) -> bool {
        matches!(
            self.feedback,
            Some(Feedback {
                kind: FeedbackType::Correct,
                ..
            })
        )
    }

    pub fn has_current_word(&self) -> bool {
        self.current_word
            .as_ref()
            .is_some_and(|word| !word.word.is_empty())
    }

    pub fn feedback_type(&self) -> Option<FeedbackType> {
        self.feedback.as_ref().map(|f| f.kind)
    }
}

/// Owns the answer/review cycle for the current word.
///
/// Actions mutate the snapshot and send a command; backend events arrive later
/// through the handlers installed by [`LearningStore::initialize`]. Later events
/// overwrite earlier ones, there is no request correlation.
#[derive(Clone)]
pub struct LearningStore {
    bridge: Bridge,
    state: Arc<watch::Sender<LearningSnapshot>>,
}

impl LearningStore {
    pub fn new(bridge: Bridge) -> Self {
        let (state, _) = watch::channel(LearningSnapshot::default());
        Self {
            bridge,
            state: Arc::new(state),
        }
    }

    /// Installs the backend event handlers and asks for the current statistics.
    pub fn initialize(&self) {
        let store = self.clone();
        self.bridge.on(EventMethod::WordLoaded, move |event| {
            if let BackendEvent::WordLoaded(word) = event {
                store.update_current_word(word);
            }
        });

        let store = self.clone();
        self.bridge.on(EventMethod::AnswerResult, move |event| {
            if let BackendEvent::AnswerResult(result) = event {
                store.update_answer_result(result);
            }
        });

        let store = self.clone();
        self.bridge.on(EventMethod::AnswerShown, move |event| {
            if let BackendEvent::AnswerShown(shown) = event {
                store.update_answer_shown(shown);
            }
        });

        let store = self.clone();
        self.bridge.on(EventMethod::StatsUpdated, move |event| {
            if let BackendEvent::StatsUpdated(update) = event {
                store.update_stats(&update);
            }
        });

        let store = self.clone();
        self.bridge.on(EventMethod::AllWords, move |event| {
            if let BackendEvent::AllWords(words) = event {
                store.update_all_words(words);
            }
        });

        let store = self.clone();
        self.bridge.on(EventMethod::WordsLoaded, move |event| {
            if let BackendEvent::WordsLoaded(loaded) = event {
                store.record_words_loaded(loaded);
            }
        });

        let store = self.clone();
        self.bridge.on(EventMethod::ProgressReset, move |_| {
            store.on_progress_reset();
        });

        let store = self.clone();
        self.bridge.on(EventMethod::Error, move |event| {
            if let BackendEvent::Error(err) = event {
                store.record_error(err);
            }
        });

        self.request_stats();
    }

    pub fn snapshot(&self) -> LearningSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LearningSnapshot> {
        self.state.subscribe()
    }

    pub fn phase(&self) -> LearningPhase {
        self.state.borrow().phase
    }

    pub fn set_user_answer(&self, answer: impl Into<String>) {
        let answer = answer.into();
        self.state.send_modify(|s| s.user_answer = answer);
    }

    // ==================== 动作 ====================

    pub fn load_random_word(&self) {
        self.state.send_modify(|s| {
            s.phase = LearningPhase::Loading;
            s.user_answer.clear();
            s.feedback = None;
        });
        self.bridge.send(Command::GetRandomWord);
    }

    /// Returns false (and sends nothing) for a blank answer or when no word is loaded.
    pub fn submit_answer(&self) -> bool {
        let mut request = None;
        self.state.send_if_modified(|s| {
            let Some(word) = &s.current_word else {
                return false;
            };
            if s.user_answer.trim().is_empty() {
                return false;
            }
            request = Some(SubmitAnswer {
                answer: s.user_answer.clone(),
                current_word: word.word.clone(),
            });
            s.phase = LearningPhase::Answered;
            true
        });

        match request {
            Some(request) => {
                self.bridge.send(Command::SubmitAnswer(request));
                true
            }
            None => false,
        }
    }

    /// Returns false when no word is loaded.
    pub fn show_answer(&self) -> bool {
        let mut current_word = None;
        self.state.send_if_modified(|s| {
            let Some(word) = &s.current_word else {
                return false;
            };
            current_word = Some(word.word.clone());
            s.phase = LearningPhase::Reviewing;
            true
        });

        match current_word {
            Some(current_word) => {
                self.bridge
                    .send(Command::ShowAnswer(ShowAnswer { current_word }));
                true
            }
            None => false,
        }
    }

    pub fn load_words_file(&self, filename: impl Into<String>) {
        let filename = filename.into();
        if !config::is_word_list_file(&filename) {
            warn!(%filename, "unexpected word list extension");
        }
        self.bridge
            .send(Command::LoadWordsFile(LoadWordsFile { filename }));
    }

    /// Sent under the reserved `loadWordsContent` method.
    pub fn load_words_file_content(&self, content: impl Into<String>, filename: impl Into<String>) {
        self.bridge.send(Command::LoadWordsContent(LoadWordsContent {
            filename: filename.into(),
            content: content.into(),
        }));
    }

    pub fn reset_progress(&self) {
        self.bridge.send(Command::ResetProgress);
    }

    pub fn get_all_words(&self) {
        self.bridge.send(Command::GetAllWords);
    }

    pub fn request_stats(&self) {
        self.bridge.send(Command::GetStats);
    }

    pub fn export_wrong_words(&self) {
        self.bridge.send(Command::ExportWrongWords);
    }

    // ==================== 状态更新 ====================

    pub fn update_current_word(&self, word: Word) {
        debug!(word = %word.word, "word loaded");
        self.state.send_modify(|s| {
            s.current_word = Some(word);
            s.phase = LearningPhase::Idle;
            s.user_answer.clear();
            s.feedback = None;
            s.error = None;
        });
    }

    /// Sets feedback only; leaving `Answered` takes an explicit reload.
    pub fn update_answer_result(&self, result: AnswerResult) {
        let kind = if result.correct {
            FeedbackType::Correct
        } else {
            FeedbackType::Incorrect
        };
        self.state.send_modify(|s| {
            s.feedback = Some(Feedback {
                kind,
                message: result.message,
            });
        });
    }

    pub fn update_answer_shown(&self, shown: AnswerShown) {
        self.state.send_modify(|s| {
            s.feedback = Some(Feedback {
                kind: FeedbackType::ShowAnswer,
                message: format!("正确答案: {}", shown.correct_answer),
            });
        });
    }

    pub fn update_stats(&self, update: &StatsUpdate) {
        self.state.send_modify(|s| s.stats.merge(update));
    }

    pub fn update_all_words(&self, words: Vec<Word>) {
        self.state.send_modify(|s| s.all_words = words);
    }

    fn record_words_loaded(&self, loaded: WordsLoaded) {
        info!(count = loaded.count, "word list loaded");
        self.state.send_modify(|s| {
            s.notice = Some(loaded.message);
            s.error = None;
        });
    }

    fn record_error(&self, err: BackendError) {
        warn!(error = %err, "backend reported an error");
        self.state.send_modify(|s| {
            // a failed load must not leave input disabled
            if s.phase == LearningPhase::Loading {
                s.phase = LearningPhase::Idle;
            }
            s.error = Some(err);
        });
    }

    fn on_progress_reset(&self) {
        info!("progress reset by backend");
        self.state.send_modify(|s| s.phase = LearningPhase::Completed);
        self.load_random_word();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{ChannelHost, HostCapabilities, DEFAULT_SIMULATOR_DELAY};
    use crate::messages::ErrorCode;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn hosted_store() -> (LearningStore, Bridge, UnboundedReceiver<String>) {
        let (host, rx) = ChannelHost::new();
        let bridge = Bridge::new(
            HostCapabilities::none().with_webkit(Arc::new(host)),
            DEFAULT_SIMULATOR_DELAY,
        );
        let store = LearningStore::new(bridge.clone());
        (store, bridge, rx)
    }

    fn sent(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
        let mut out = Vec::new();
        while let Ok(text) = rx.try_recv() {
            out.push(serde_json::from_str(&text).unwrap());
        }
        out
    }

    fn cat() -> Value {
        json!({"word": "cat", "pos": "n.", "meaning": "猫"})
    }

    #[test]
    fn test_initialize_registers_handlers_and_requests_stats() {
        let (store, bridge, mut rx) = hosted_store();
        store.initialize();

        for method in EventMethod::ALL {
            assert!(bridge.has_handler(method), "{method}");
        }
        assert_eq!(sent(&mut rx), vec![json!({"method": "getStats", "data": {}})]);
    }

    #[test]
    fn test_load_then_word_loaded_returns_to_idle() {
        let (store, bridge, mut rx) = hosted_store();
        store.initialize();
        sent(&mut rx);

        store.update_answer_result(AnswerResult {
            correct: false,
            message: "old".into(),
        });
        store.load_random_word();
        assert_eq!(store.phase(), LearningPhase::Loading);
        assert!(!store.snapshot().is_input_enabled());
        assert_eq!(sent(&mut rx), vec![json!({"method": "getRandomWord", "data": {}})]);

        bridge.handle_backend_message("wordLoaded", cat());
        let snap = store.snapshot();
        assert_eq!(snap.phase, LearningPhase::Idle);
        assert_eq!(snap.current_word.as_ref().map(|w| w.word.as_str()), Some("cat"));
        assert_eq!(snap.feedback, None);
        assert!(snap.has_current_word());
        assert!(snap.is_input_enabled());
    }

    #[test]
    fn test_blank_answer_is_ignored() {
        let (store, bridge, mut rx) = hosted_store();
        store.initialize();
        bridge.handle_backend_message("wordLoaded", cat());
        sent(&mut rx);

        store.set_user_answer("   ");
        assert!(!store.submit_answer());
        assert_eq!(store.phase(), LearningPhase::Idle);
        assert!(sent(&mut rx).is_empty());
    }

    #[test]
    fn test_submit_without_word_is_ignored() {
        let (store, _bridge, mut rx) = hosted_store();
        store.set_user_answer("cat");
        assert!(!store.submit_answer());
        assert!(!store.show_answer());
        assert_eq!(store.phase(), LearningPhase::Idle);
        assert!(sent(&mut rx).is_empty());
    }

    #[test]
    fn test_answer_result_stays_answered() {
        let (store, bridge, mut rx) = hosted_store();
        store.initialize();
        bridge.handle_backend_message("wordLoaded", cat());
        sent(&mut rx);

        store.set_user_answer("Cat");
        assert!(store.submit_answer());
        assert_eq!(store.phase(), LearningPhase::Answered);
        assert_eq!(
            sent(&mut rx),
            vec![json!({"method": "submitAnswer", "data": {"answer": "Cat", "currentWord": "cat"}})]
        );

        bridge.handle_backend_message("answerResult", r#"{"correct":true,"message":"答案正确！"}"#);
        let snap = store.snapshot();
        assert_eq!(snap.phase, LearningPhase::Answered);
        assert!(snap.is_answer_correct());
        assert_eq!(snap.feedback.unwrap().message, "答案正确！");
    }

    #[test]
    fn test_show_answer() {
        let (store, bridge, mut rx) = hosted_store();
        store.initialize();
        bridge.handle_backend_message("wordLoaded", cat());
        sent(&mut rx);

        assert!(store.show_answer());
        assert_eq!(store.phase(), LearningPhase::Reviewing);
        assert_eq!(
            sent(&mut rx),
            vec![json!({"method": "showAnswer", "data": {"currentWord": "cat"}})]
        );

        bridge.handle_backend_message("answerShown", json!({"correctAnswer": "cat"}));
        let snap = store.snapshot();
        assert_eq!(snap.feedback_type(), Some(FeedbackType::ShowAnswer));
        assert_eq!(snap.feedback.as_ref().unwrap().message, "正确答案: cat");
        assert!(!snap.is_answer_correct());
    }

    #[test]
    fn test_stats_merge_from_events() {
        let (store, bridge, _rx) = hosted_store();
        store.initialize();

        bridge.handle_backend_message("statsUpdated", json!({"totalWords": 40, "progress": 0.5}));
        bridge.handle_backend_message("statsUpdated", json!({"masteredWords": 20}));
        let stats = store.snapshot().stats;
        assert_eq!(stats.total_words, 40);
        assert_eq!(stats.mastered_words, 20);
        assert!((stats.progress - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_progress_reset_reloads() {
        let (store, bridge, mut rx) = hosted_store();
        store.initialize();
        bridge.handle_backend_message("wordLoaded", cat());
        sent(&mut rx);

        bridge.handle_backend_message("progressReset", json!({"message": "进度已重置"}));
        assert_eq!(store.phase(), LearningPhase::Loading);
        assert_eq!(sent(&mut rx), vec![json!({"method": "getRandomWord", "data": {}})]);
    }

    #[test]
    fn test_error_surfaces_and_unblocks_loading() {
        let (store, bridge, _rx) = hosted_store();
        store.initialize();

        store.load_random_word();
        bridge.handle_backend_message("error", r#"{"message":"没有可用单词或所有单词已掌握"}"#);

        let snap = store.snapshot();
        assert_eq!(snap.phase, LearningPhase::Idle);
        let err = snap.error.unwrap();
        assert_eq!(err.code, ErrorCode::Unknown);
        assert_eq!(err.message, "没有可用单词或所有单词已掌握");

        bridge.handle_backend_message("error", json!({"code": 1002, "message": "bad file"}));
        assert_eq!(store.snapshot().error.unwrap().code, ErrorCode::FileParseError);

        bridge.handle_backend_message("wordLoaded", cat());
        assert!(store.snapshot().error.is_none());
    }

    #[test]
    fn test_file_commands() {
        let (store, bridge, mut rx) = hosted_store();
        store.initialize();
        sent(&mut rx);

        store.load_words_file("cet4.wdlst");
        store.load_words_file_content("cat n. 猫", "mine.txt");
        store.get_all_words();
        store.reset_progress();
        store.export_wrong_words();

        let methods: Vec<Value> = sent(&mut rx).into_iter().map(|m| m["method"].clone()).collect();
        assert_eq!(
            methods,
            vec![
                json!("loadWordsFile"),
                json!("loadWordsContent"),
                json!("getAllWords"),
                json!("resetProgress"),
                json!("exportWrongWords"),
            ]
        );

        bridge.handle_backend_message("wordsLoaded", json!({"message": "单词库加载成功", "count": 12}));
        assert_eq!(store.snapshot().notice.as_deref(), Some("单词库加载成功"));

        bridge.handle_backend_message("allWords", json!([{"word": "cat"}, {"word": "dog"}]));
        assert_eq!(store.snapshot().all_words.len(), 2);
    }

    #[test]
    fn test_submit_races_with_word_loaded() {
        let (store, bridge, mut rx) = hosted_store();
        store.initialize();

        for _ in 0..50 {
            bridge.handle_backend_message("wordLoaded", cat());
            store.set_user_answer("cat");
            sent(&mut rx);

            let barrier = std::sync::Barrier::new(2);
            let submitted = std::thread::scope(|scope| {
                let submit = scope.spawn(|| {
                    barrier.wait();
                    store.submit_answer()
                });
                scope.spawn(|| {
                    barrier.wait();
                    bridge.handle_backend_message("wordLoaded", json!({"word": "dog"}));
                });
                submit.join().unwrap()
            });

            // whichever ran first, a submit always carries the word it was checked against
            let messages = sent(&mut rx);
            if submitted {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0]["data"]["answer"], "cat");
            } else {
                assert!(messages.is_empty());
            }
        }
    }

    #[test]
    fn test_has_current_word_needs_text() {
        let mut snap = LearningSnapshot::default();
        assert!(!snap.has_current_word());
        snap.current_word = Some(Word::default());
        assert!(!snap.has_current_word());
    }
}

//! Property tests for inbound message routing.

use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;

use danci_webui::bridge::{Bridge, DispatchOutcome, DEFAULT_SIMULATOR_DELAY};
use danci_webui::messages::EventMethod;

/// A payload every method decodes without complaint.
fn valid_payload(method: EventMethod) -> &'static str {
    match method {
        EventMethod::WordLoaded => r#"{"word":"cat","pos":"n.","meaning":"猫"}"#,
        EventMethod::AnswerResult => r#"{"correct":false,"message":"答案错误"}"#,
        EventMethod::AnswerShown => r#"{"correctAnswer":"cat"}"#,
        EventMethod::WordsLoaded => r#"{"message":"单词库加载成功","count":3}"#,
        EventMethod::StatsUpdated => r#"{"totalWords":3}"#,
        EventMethod::AllWords => r#"[{"word":"cat"}]"#,
        EventMethod::ProgressReset => r#"{"message":"进度已重置"}"#,
        EventMethod::Error => r#""出错了""#,
    }
}

fn arb_method() -> impl Strategy<Value = EventMethod> {
    (0..EventMethod::ALL.len()).prop_map(|i| EventMethod::ALL[i])
}

/// Registers a handler that records `(method, tag)` on every call.
fn tagged(bridge: &Bridge, calls: &Arc<Mutex<Vec<(EventMethod, u8)>>>, method: EventMethod, tag: u8) {
    let calls = Arc::clone(calls);
    bridge.on(method, move |event| calls.lock().push((event.method(), tag)));
}

proptest! {
    /// The most recent registration for a method is the only one invoked.
    #[test]
    fn latest_registration_wins(registrations in prop::collection::vec((arb_method(), any::<u8>()), 1..40)) {
        let bridge = Bridge::simulated(DEFAULT_SIMULATOR_DELAY);
        let calls = Arc::new(Mutex::new(Vec::new()));
        for (method, tag) in &registrations {
            tagged(&bridge, &calls, *method, *tag);
        }

        for method in EventMethod::ALL {
            let expected = registrations.iter().rev().find(|(m, _)| *m == method).map(|(_, t)| *t);
            let outcome = bridge.handle_backend_message(method.as_str(), valid_payload(method));

            let recorded = std::mem::take(&mut *calls.lock());
            match expected {
                Some(tag) => {
                    prop_assert_eq!(outcome, DispatchOutcome::Delivered);
                    prop_assert_eq!(recorded, vec![(method, tag)]);
                }
                None => {
                    prop_assert_eq!(outcome, DispatchOutcome::Unhandled);
                    prop_assert!(recorded.is_empty());
                }
            }
        }
    }

    /// Unknown method names never reach a handler.
    #[test]
    fn unknown_methods_are_dropped(method in "[a-zA-Z_]{0,24}", data in ".{0,64}") {
        prop_assume!(method.parse::<EventMethod>().is_err());

        let bridge = Bridge::simulated(DEFAULT_SIMULATOR_DELAY);
        let calls = Arc::new(Mutex::new(Vec::new()));
        for method in EventMethod::ALL {
            tagged(&bridge, &calls, method, 0);
        }

        let outcome = bridge.handle_backend_message(&method, data);
        prop_assert_eq!(outcome, DispatchOutcome::UnknownMethod);
        prop_assert!(calls.lock().is_empty());
    }

    /// Junk payloads are either decoded and delivered once, or dropped.
    #[test]
    fn junk_payloads_never_panic(method in arb_method(), data in ".{0,64}") {
        let bridge = Bridge::simulated(DEFAULT_SIMULATOR_DELAY);
        let calls = Arc::new(Mutex::new(Vec::new()));
        tagged(&bridge, &calls, method, 1);

        let outcome = bridge.handle_backend_message(method.as_str(), data);
        let delivered = calls.lock().len();
        match outcome {
            DispatchOutcome::Delivered => prop_assert_eq!(delivered, 1),
            DispatchOutcome::DecodeFailed => prop_assert_eq!(delivered, 0),
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }
}

//! Integration tests for [`turn_dispatcher::TurnDispatcher`].
//!
//! Covers: intent reply vs fallback card, defensive `number` entity read, session-start greetings
//! (recipient excluded, order kept), diagnostic echo for other events, and failure semantics
//! (recognition error, transport error, cancellation).

mod common;

use common::{card_name, conversation, test_cards, RecordingTransport, StubRecognizer};
use nlubot_core::{InboundEvent, RecognitionResult, TurnError, NONE_INTENT};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use turn_dispatcher::{DispatcherConfig, TurnDispatcher, TurnRoute, DEFAULT_INTENT_REPLY};

fn dispatcher(recognizer: StubRecognizer, transport: Arc<RecordingTransport>) -> TurnDispatcher {
    TurnDispatcher::new(Arc::new(recognizer), transport, test_cards())
}

/// **Test: End-to-end "what time is it" with a GetTime intent yields exactly "22 Hours".**
#[tokio::test]
async fn test_recognized_intent_sends_fixed_reply() {
    let transport = RecordingTransport::new();
    let recognizer = StubRecognizer::new()
        .with("what time is it", RecognitionResult::with_intent("GetTime", 0.9));
    let dispatcher = dispatcher(recognizer, transport.clone());

    let event = InboundEvent::message(conversation("c1"), "what time is it", "bot");
    let outcome = dispatcher.handle_turn(&event).await.unwrap();

    assert_eq!(outcome.route, TurnRoute::Intent("GetTime".to_string()));
    assert_eq!(outcome.replies_sent, 1);
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].reply.text.as_deref(), Some("22 Hours"));
    assert_eq!(sent[0].reply.text.as_deref(), Some(DEFAULT_INTENT_REPLY));
    assert!(sent[0].reply.attachment.is_none());
    assert_eq!(sent[0].conversation_id, "c1");
}

/// **Test: "None" intent and missing intent both yield exactly one fallback card.**
#[tokio::test]
async fn test_none_or_missing_intent_sends_fallback_card() {
    let transport = RecordingTransport::new();
    let recognizer = StubRecognizer::new()
        .with("blah", RecognitionResult::with_intent(NONE_INTENT, 0.95));
    let dispatcher = dispatcher(recognizer, transport.clone());

    let none = InboundEvent::message(conversation("c1"), "blah", "bot");
    let missing = InboundEvent::message(conversation("c1"), "unknown words", "bot");

    assert_eq!(dispatcher.handle_turn(&none).await.unwrap().route, TurnRoute::Fallback);
    assert_eq!(dispatcher.handle_turn(&missing).await.unwrap().route, TurnRoute::Fallback);

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    for s in &sent {
        assert_eq!(card_name(&s.reply), Some("fallbackCard.json"));
        assert!(s.reply.text.is_none());
    }
}

/// **Test: Missing "number" entity behaves exactly like an empty one.**
#[tokio::test]
async fn test_missing_number_entity_matches_empty_number_entity() {
    let without = RecognitionResult::with_intent("GetTime", 0.8);
    let mut with_empty = without.clone();
    with_empty.entities.insert("number".to_string(), vec![]);
    let mut with_value = without.clone();
    with_value.entities.insert("number".to_string(), vec![json!(42)]);

    let transport = RecordingTransport::new();
    let recognizer = StubRecognizer::new()
        .with("a", without)
        .with("b", with_empty)
        .with("c", with_value);
    let dispatcher = dispatcher(recognizer, transport.clone());

    for text in ["a", "b", "c"] {
        let event = InboundEvent::message(conversation("c1"), text, "bot");
        let outcome = dispatcher.handle_turn(&event).await.unwrap();
        assert_eq!(outcome.route, TurnRoute::Intent("GetTime".to_string()));
    }

    let texts = transport.texts();
    assert_eq!(texts, vec![Some("22 Hours".to_string()); 3]);
}

/// **Test: Blank or absent message text skips recognition and sends the fallback card.**
#[tokio::test]
async fn test_blank_message_sends_fallback_without_recognition() {
    let transport = RecordingTransport::new();
    let recognizer = Arc::new(StubRecognizer::new());
    let dispatcher = TurnDispatcher::new(recognizer.clone(), transport.clone(), test_cards());

    let mut event = InboundEvent::message(conversation("c1"), "   ", "bot");
    dispatcher.handle_turn(&event).await.unwrap();
    event.text = None;
    dispatcher.handle_turn(&event).await.unwrap();

    assert_eq!(recognizer.calls(), 0);
    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|s| card_name(&s.reply) == Some("fallbackCard.json")));
}

/// **Test: A top intent below the configured minimum score is treated as no intent.**
#[tokio::test]
async fn test_low_score_intent_falls_back() {
    let transport = RecordingTransport::new();
    let recognizer = StubRecognizer::new().with("time?", RecognitionResult::with_intent("GetTime", 0.2));
    let dispatcher = dispatcher(recognizer, transport.clone()).with_config(DispatcherConfig {
        intent_reply: "It is late".to_string(),
        min_score: 0.5,
    });

    let event = InboundEvent::message(conversation("c1"), "time?", "bot");
    let outcome = dispatcher.handle_turn(&event).await.unwrap();

    assert_eq!(outcome.route, TurnRoute::Fallback);
    assert_eq!(card_name(&transport.sent()[0].reply), Some("fallbackCard.json"));
}

/// **Test: Configured intent reply text is used.**
#[tokio::test]
async fn test_custom_intent_reply() {
    let transport = RecordingTransport::new();
    let recognizer = StubRecognizer::new().with("time?", RecognitionResult::with_intent("GetTime", 0.9));
    let dispatcher = dispatcher(recognizer, transport.clone()).with_config(DispatcherConfig {
        intent_reply: "It is late".to_string(),
        min_score: 0.0,
    });

    dispatcher
        .handle_turn(&InboundEvent::message(conversation("c1"), "time?", "bot"))
        .await
        .unwrap();

    assert_eq!(transport.texts(), vec![Some("It is late".to_string())]);
}

/// **Test: Session start greets every participant except the recipient, in input order.**
#[tokio::test]
async fn test_session_start_welcomes_each_joined_participant() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(StubRecognizer::new(), transport.clone());

    let event = InboundEvent::session_start(
        conversation("group"),
        vec!["alice".into(), "bot".into(), "bob".into(), "alice".into()],
        "bot",
    );
    let outcome = dispatcher.handle_turn(&event).await.unwrap();

    assert_eq!(outcome.route, TurnRoute::Welcome);
    assert_eq!(outcome.replies_sent, 3);
    let sent = transport.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|s| card_name(&s.reply) == Some("welcomeCard.json")));
}

/// **Test: Session start where only the bot joined sends nothing.**
#[tokio::test]
async fn test_session_start_with_only_recipient_sends_nothing() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(StubRecognizer::new(), transport.clone());

    let event = InboundEvent::session_start(conversation("group"), vec!["bot".into()], "bot");
    let outcome = dispatcher.handle_turn(&event).await.unwrap();

    assert_eq!(outcome.replies_sent, 0);
    assert!(transport.sent().is_empty());
}

/// **Test: Other event kinds get one diagnostic reply whose text is the kind name.**
#[tokio::test]
async fn test_other_event_echoes_kind_name() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(StubRecognizer::new(), transport.clone());

    let event = InboundEvent::other(conversation("c1"), "typing", "bot");
    let outcome = dispatcher.handle_turn(&event).await.unwrap();

    assert_eq!(outcome.route, TurnRoute::Diagnostic);
    assert_eq!(transport.texts(), vec![Some("typing".to_string())]);
}

/// **Test: Recognition failure aborts the turn and sends nothing.**
#[tokio::test]
async fn test_recognition_error_sends_no_reply() {
    let transport = RecordingTransport::new();
    let dispatcher = dispatcher(StubRecognizer::failing(), transport.clone());

    let event = InboundEvent::message(conversation("c1"), "what time is it", "bot");
    let err = dispatcher.handle_turn(&event).await.unwrap_err();

    assert!(matches!(err, TurnError::Recognition(_)));
    assert!(transport.sent().is_empty());
}

/// **Test: Transport failure aborts the turn; later welcomes are not sent.**
#[tokio::test]
async fn test_transport_error_aborts_turn() {
    let transport = RecordingTransport::failing_after(1);
    let dispatcher = dispatcher(StubRecognizer::new(), transport.clone());

    let event = InboundEvent::session_start(
        conversation("group"),
        vec!["alice".into(), "bob".into(), "carol".into()],
        "bot",
    );
    let err = dispatcher.handle_turn(&event).await.unwrap_err();

    assert!(matches!(err, TurnError::Transport(_)));
    assert_eq!(transport.sent().len(), 1);
}

/// **Test: Cancelling while recognition is pending sends nothing.**
#[tokio::test(start_paused = true)]
async fn test_cancel_during_recognition_sends_nothing() {
    let transport = RecordingTransport::new();
    let recognizer = StubRecognizer::new()
        .with("slow", RecognitionResult::with_intent("GetTime", 0.9))
        .with_delay("slow", Duration::from_secs(5));
    let dispatcher = dispatcher(recognizer, transport.clone());

    let event = InboundEvent::message(conversation("c1"), "slow", "bot");
    let err = dispatcher
        .handle_turn_until(&event, tokio::time::sleep(Duration::from_millis(100)))
        .await
        .unwrap_err();

    assert!(matches!(err, TurnError::Cancelled));
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(transport.sent().is_empty());
}

//! Integration tests for the chat/advice loop.

mod common;

use common::{ADVICE_MARKDOWN, ScriptedTransport, analyzed_app, fixture_image, text_field};
use outfit_advisor_api::{ApiError, HttpResponse};
use outfit_advisor_app::{AppError, CHAT_ERROR_PREFIX, MISSING_ADVICE_TEXT};
use outfit_advisor_core::{DEFAULT_CHAT_PROMPT, INITIAL_ADVICE_PROMPT};
use outfit_advisor_ui::{Screen, TranscriptEntry};

#[test]
fn chat_loop_tests_first_message_becomes_style_goal() {
    let transport = ScriptedTransport::new();
    let mut app = analyzed_app(transport.clone());

    transport.push_advice("Loafers would sharpen this.");
    app.submit_chat("date night").expect("chat should run");

    let advice = transport.requests_to("/api/advice");
    let turn = advice.last().expect("chat request");
    assert_eq!(text_field(turn, "user_input").as_deref(), Some(DEFAULT_CHAT_PROMPT));
    assert_eq!(text_field(turn, "style_goals").as_deref(), Some("date night"));
    assert_eq!(text_field(turn, "image_path").as_deref(), Some("uploads/look-1.jpg"));
    assert_eq!(app.session().style_goal, "date night");
    assert_eq!(app.conversation().style_goal(), Some("date night"));

    assert_eq!(
        app.view().transcript.entries(),
        &[
            TranscriptEntry::User("date night".to_string()),
            TranscriptEntry::Advisor("Loafers would sharpen this.".to_string()),
        ]
    );
}

#[test]
fn chat_loop_tests_later_messages_are_forwarded_verbatim() {
    let transport = ScriptedTransport::new();
    let mut app = analyzed_app(transport.clone());
    transport.push_advice("First.");
    transport.push_advice("Yes, a thin brown belt.");
    transport.push_advice("Brown loafers.");

    app.submit_chat("date night").expect("first turn");
    app.submit_chat("  should I add a belt?  ").expect("second turn");
    app.submit_chat("and shoes?").expect("third turn");

    let sent: Vec<(Option<String>, Option<String>)> = transport
        .requests_to("/api/advice")
        .iter()
        .map(|request| (text_field(request, "user_input"), text_field(request, "style_goals")))
        .collect();
    let expected = [
        (INITIAL_ADVICE_PROMPT, "Business Casual"),
        (DEFAULT_CHAT_PROMPT, "date night"),
        ("should I add a belt?", "date night"),
        ("and shoes?", "date night"),
    ];
    assert_eq!(
        sent,
        expected
            .iter()
            .map(|(input, goal)| (Some(input.to_string()), Some(goal.to_string())))
            .collect::<Vec<_>>()
    );
    assert!(
        sent.iter()
            .all(|(input, _)| input.as_deref() != Some("date night")),
        "the style goal is never sent as a question"
    );

    for request in transport.requests_to("/api/advice") {
        assert_eq!(text_field(&request, "image_path").as_deref(), Some("uploads/look-1.jpg"));
        assert_eq!(
            text_field(&request, "description").as_deref(),
            Some("navy coat, white sneakers")
        );
    }

    assert_eq!(
        app.view().transcript.entries(),
        &[
            TranscriptEntry::User("date night".to_string()),
            TranscriptEntry::Advisor("First.".to_string()),
            TranscriptEntry::User("should I add a belt?".to_string()),
            TranscriptEntry::Advisor("Yes, a thin brown belt.".to_string()),
            TranscriptEntry::User("and shoes?".to_string()),
            TranscriptEntry::Advisor("Brown loafers.".to_string()),
        ]
    );
}

#[test]
fn chat_loop_tests_new_photo_restarts_conversation() {
    let transport = ScriptedTransport::new();
    let mut app = analyzed_app(transport.clone());
    transport.push_advice("Go with a blazer.");
    app.submit_chat("date night").expect("first photo chat");

    transport.push_login("server-token-1");
    app.submit_login("ana@example.com").expect("login");
    app.select_occasion("Wedding");
    app.select_image(fixture_image("look-2.jpg"));
    transport.push_analysis("uploads/look-2.jpg");
    transport.push_advice(ADVICE_MARKDOWN);
    app.submit_upload().expect("second upload");

    assert_eq!(app.view().current_screen(), Screen::Feedback);
    assert!(app.view().transcript.entries().is_empty());
    assert_eq!(app.conversation().style_goal(), None);

    transport.push_advice("Linen works.");
    app.submit_chat("beach party").expect("second photo chat");

    let advice = transport.requests_to("/api/advice");
    let turn = advice.last().expect("chat request");
    assert_eq!(text_field(turn, "image_path").as_deref(), Some("uploads/look-2.jpg"));
    assert_eq!(text_field(turn, "user_input").as_deref(), Some(DEFAULT_CHAT_PROMPT));
    assert_eq!(text_field(turn, "style_goals").as_deref(), Some("beach party"));
    assert_eq!(
        app.view().transcript.entries(),
        &[
            TranscriptEntry::User("beach party".to_string()),
            TranscriptEntry::Advisor("Linen works.".to_string()),
        ]
    );
}

#[test]
fn chat_loop_tests_blank_message_sends_nothing() {
    let transport = ScriptedTransport::new();
    let mut app = analyzed_app(transport.clone());
    let before = transport.requests().len();

    app.submit_chat("   ").expect("blank is ignored");

    assert_eq!(transport.requests().len(), before);
    assert!(app.view().transcript.entries().is_empty());
    assert_eq!(app.conversation().style_goal(), None);
}

#[test]
fn chat_loop_tests_requires_completed_analysis() {
    let transport = ScriptedTransport::new();
    let mut app = common::app(transport);

    assert!(matches!(app.submit_chat("hello"), Err(AppError::NoAnalysis)));
}

#[test]
fn chat_loop_tests_failure_replaces_thinking_with_error_entry() {
    let transport = ScriptedTransport::new();
    let mut app = analyzed_app(transport.clone());
    transport.push(
        "/api/advice",
        Ok(HttpResponse {
            status: 500,
            reason: "Internal Server Error".to_string(),
            content_type: None,
            body: String::new(),
        }),
    );

    app.submit_chat("date night").expect("errors stay in the transcript");

    assert!(!app.view().transcript.is_thinking());
    assert_eq!(
        app.view().transcript.entries().last(),
        Some(&TranscriptEntry::Error(format!(
            "{CHAT_ERROR_PREFIX}: API error: 500 Internal Server Error"
        )))
    );
}

#[test]
fn chat_loop_tests_missing_advice_gets_placeholder_reply() {
    let transport = ScriptedTransport::new();
    let mut app = analyzed_app(transport.clone());
    transport.push_json("/api/advice", r#"{"success":true}"#);

    app.submit_chat("date night").expect("chat should run");

    assert_eq!(
        app.view().transcript.entries().last(),
        Some(&TranscriptEntry::Advisor(MISSING_ADVICE_TEXT.to_string()))
    );
}

#[test]
fn chat_loop_tests_pending_turn_shows_thinking() {
    let transport = ScriptedTransport::new();
    let mut app = analyzed_app(transport);

    let call = app
        .begin_chat("date night")
        .expect("chat admitted")
        .expect("call issued");
    assert!(app.view().transcript.is_thinking());

    app.complete(
        call.ticket,
        Err(ApiError::Network("timed out".to_string())),
    );
    assert!(!app.view().transcript.is_thinking());
}

//! Tests image validation limits and session reset semantics.

use outfit_advisor_core::{
    Conversation, ConversationPhase, CoreError, ImageUpload, MAX_IMAGE_BYTES, SessionState, Tone,
};

#[test]
fn session_model_tests_rejects_oversized_image() {
    let result = ImageUpload::new("huge.jpg", "image/jpeg", vec![0; MAX_IMAGE_BYTES + 1]);
    assert!(matches!(
        result,
        Err(CoreError::ImageTooLarge { limit, actual })
            if limit == MAX_IMAGE_BYTES && actual == MAX_IMAGE_BYTES + 1
    ));
}

#[test]
fn session_model_tests_missing_file_reports_path() {
    let error = ImageUpload::from_path("/definitely/not/here.jpg").expect_err("missing file");
    assert!(error.to_string().contains("/definitely/not/here.jpg"));
}

#[test]
fn session_model_tests_debug_hides_image_bytes() {
    let upload = ImageUpload::new("look.jpg", "image/jpeg", vec![42; 16]).expect("upload");
    let debug = format!("{upload:?}");
    assert!(debug.contains("look.jpg"));
    assert!(!debug.contains("42, 42"));
}

#[test]
fn session_model_tests_reset_starts_a_fresh_conversation() {
    let mut session = SessionState::new();
    session.record_analysis("uploads/a.jpg", "wool blazer");
    session.tone = Tone::Direct;

    let mut conversation = Conversation::new();
    conversation.next_turn("job interview").expect("first turn");
    assert!(matches!(conversation.phase(), ConversationPhase::Conversing { .. }));

    session.clear();
    conversation.reset();
    assert!(!session.has_analysis());
    assert_eq!(session.tone, Tone::Gentle);
    assert_eq!(conversation.phase(), &ConversationPhase::AwaitingStyleGoal);
}

//! Tests screen exclusivity and transcript placeholder handling.

use outfit_advisor_ui::{AdvisorView, Screen, ScreenController, TranscriptEntry, UiError};

#[test]
fn screen_controller_tests_show_hides_every_other_screen() {
    let mut screens = ScreenController::new();
    for target in Screen::ALL {
        screens.show(target);
        for (screen, visible) in screens.visibility() {
            assert_eq!(visible, screen == target, "{screen} visibility after showing {target}");
        }
        assert_eq!(screens.current(), target);
    }
}

#[test]
fn screen_controller_tests_unknown_name_is_rejected() {
    let mut screens = ScreenController::new();
    screens.show(Screen::Feedback);

    assert_eq!(
        screens.show_named("settings"),
        Err(UiError::UnknownScreen("settings".to_string()))
    );
    assert!(screens.is_visible(Screen::Feedback));
    assert_eq!(screens.show_named(" Profile "), Ok(Screen::Profile));
}

#[test]
fn screen_controller_tests_thinking_placeholder_is_replaced() {
    let mut view = AdvisorView::new("0.1.0");
    view.transcript.push_user("date night");
    view.transcript.push_thinking();
    assert!(view.transcript.is_thinking());

    assert!(view.transcript.remove_thinking());
    view.transcript.push_advisor("Add a blazer.");
    assert_eq!(
        view.transcript.entries(),
        &[
            TranscriptEntry::User("date night".to_string()),
            TranscriptEntry::Advisor("Add a blazer.".to_string()),
        ]
    );
    assert!(!view.transcript.remove_thinking());
}

#[test]
fn screen_controller_tests_sign_out_updates_auth_bar() {
    let mut view = AdvisorView::new("0.1.0");
    view.set_signed_in("ana@example.com");
    assert!(view.auth.shows_account_actions());
    assert!(!view.auth.shows_login());

    view.set_signed_out();
    assert!(view.auth.shows_login());
    assert!(view.profile.email.is_none());
}

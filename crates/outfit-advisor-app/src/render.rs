//! Plain-text rendering of the view-model for the REPL.

use std::fmt::Write as _;

use outfit_advisor_ui::{
    AdvisorView, EMPTY_HISTORY_TEXT, FeedbackTab, Screen, THINKING_TEXT, TranscriptEntry,
};

/// Renders the visible screen plus the header and login prompt.
pub fn render_view(view: &AdvisorView) -> String {
    let mut out = String::new();
    render_header(view, &mut out);

    match view.current_screen() {
        Screen::Welcome => {
            let _ = writeln!(out, "Welcome! Type `start` to get outfit feedback.");
        }
        Screen::Occasion => render_occasion(view, &mut out),
        Screen::Analysis => {
            let preview = view.preview.as_deref().unwrap_or("(no image)");
            let _ = writeln!(out, "Analyzing {preview}...");
        }
        Screen::Feedback => render_feedback(view, &mut out),
        Screen::Profile => render_profile(view, &mut out),
    }

    if view.login_prompt_visible {
        let _ = writeln!(
            out,
            "\nSign in to keep uploading: `login <email>` (or `dismiss`)."
        );
    }
    out
}

fn render_header(view: &AdvisorView, out: &mut String) {
    let identity = match view.auth.email.as_deref() {
        Some(email) => format!("signed in as {email}"),
        None => "not signed in".to_string(),
    };
    let _ = writeln!(
        out,
        "== outfit-advisor v{} | {} | {} ==",
        view.version,
        view.current_screen().as_str(),
        identity
    );
}

fn render_occasion(view: &AdvisorView, out: &mut String) {
    let occasion = if view.upload_area.occasion.is_empty() {
        "(none)"
    } else {
        view.upload_area.occasion.as_str()
    };
    let file = view.upload_area.selected_file.as_deref().unwrap_or("(none)");
    let _ = writeln!(out, "occasion: {occasion}");
    let _ = writeln!(out, "photo:    {file}");
    if view.upload_area.next_enabled {
        let _ = writeln!(out, "Type `next` to analyze.");
    }
}

fn render_feedback(view: &AdvisorView, out: &mut String) {
    let Some(report) = view.feedback.as_ref() else {
        let _ = writeln!(out, "(no feedback yet)");
        return;
    };

    let _ = writeln!(out, "Score: {}/100", report.score);
    let _ = writeln!(out, "{}", report.quick_take);
    let _ = writeln!(
        out,
        "[{}] tone: {}",
        view.active_tab.as_str(),
        view.tone.as_str()
    );
    match view.active_tab {
        FeedbackTab::Highlights => {
            let _ = writeln!(out, "{}", report.highlights);
        }
        FeedbackTab::ColorAnalysis => {
            let _ = writeln!(out, "{}", report.color_analysis);
        }
        FeedbackTab::Suggestions => {
            for suggestion in &report.suggestions {
                let _ = writeln!(out, "- {suggestion}");
            }
        }
    }

    if !view.transcript.entries().is_empty() {
        let _ = writeln!(out, "--");
    }
    for entry in view.transcript.entries() {
        let _ = match entry {
            TranscriptEntry::User(text) => writeln!(out, "you: {text}"),
            TranscriptEntry::Thinking => writeln!(out, "advisor: {THINKING_TEXT}"),
            TranscriptEntry::Advisor(text) => writeln!(out, "advisor: {text}"),
            TranscriptEntry::Error(text) => writeln!(out, "! {text}"),
        };
    }
}

fn render_profile(view: &AdvisorView, out: &mut String) {
    if let Some(email) = view.profile.email.as_deref() {
        let _ = writeln!(out, "{email}");
    }
    if view.profile.history.is_empty() {
        let _ = writeln!(out, "{EMPTY_HISTORY_TEXT}");
        return;
    }
    for summary in &view.profile.history {
        let _ = writeln!(
            out,
            "- {} {}/100: {}",
            summary.image_reference, summary.rating, summary.quick_take
        );
    }
}

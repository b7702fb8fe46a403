#![warn(missing_docs)]
//! # outfit-advisor-ui
//!
//! ## Purpose
//! Defines the headless view-model for `outfit-advisor`: the screen
//! controller and every piece of state a front end renders.
//!
//! ## Responsibilities
//! - Keep exactly one screen visible at a time.
//! - Hold the feedback panel, chat transcript, upload area, auth bar and
//!   profile history.
//! - Queue user-facing notices (alerts and success messages).
//!
//! ## Data flow
//! Workflow handlers in the app crate mutate [`AdvisorView`]; a front end
//! (the CLI, or any GUI) renders it and drains [`AdvisorView::take_notices`].
//!
//! ## Ownership and lifetimes
//! `AdvisorView` owns all strings so handlers can mutate it without
//! borrowing from responses.
//!
//! ## Error model
//! Only unknown screen or tab names are errors ([`UiError`]); every other
//! invalid combination is prevented by the mutators.
//!
//! ## Security and privacy notes
//! The view never holds tokens or image bytes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use outfit_advisor_advice_contract::AdviceReport;
use outfit_advisor_core::Tone;
use thiserror::Error;

/// Text shown while the advisor is answering.
pub const THINKING_TEXT: &str = "Thinking...";
/// Text shown on an empty profile history.
pub const EMPTY_HISTORY_TEXT: &str = "You haven't analyzed any outfits yet.";

/// Named views of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Screen {
    /// Landing screen.
    Welcome,
    /// Occasion picker and image upload.
    Occasion,
    /// Image preview while analysis runs.
    Analysis,
    /// Rating, sections and chat.
    Feedback,
    /// Signed-in user's history.
    Profile,
}

impl Screen {
    /// Every registered screen.
    pub const ALL: [Screen; 5] = [
        Screen::Welcome,
        Screen::Occasion,
        Screen::Analysis,
        Screen::Feedback,
        Screen::Profile,
    ];

    /// Returns the name used by navigation targets.
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Welcome => "welcome",
            Screen::Occasion => "occasion",
            Screen::Analysis => "analysis",
            Screen::Feedback => "feedback",
            Screen::Profile => "profile",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Screen {
    type Err = UiError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UiError::UnknownScreen(raw.to_string()))
    }
}

/// Visibility map over [`Screen::ALL`] with exactly one visible entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenController {
    visibility: BTreeMap<Screen, bool>,
}

impl ScreenController {
    /// Creates a controller showing [`Screen::Welcome`].
    pub fn new() -> Self {
        let mut controller = Self {
            visibility: Screen::ALL.into_iter().map(|screen| (screen, false)).collect(),
        };
        controller.show(Screen::Welcome);
        controller
    }

    /// Shows `screen` and hides all others.
    pub fn show(&mut self, screen: Screen) {
        for (candidate, visible) in self.visibility.iter_mut() {
            *visible = *candidate == screen;
        }
    }

    /// Shows the screen named `name`.
    ///
    /// # Errors
    /// Returns [`UiError::UnknownScreen`] without changing visibility.
    pub fn show_named(&mut self, name: &str) -> Result<Screen, UiError> {
        let screen = name.parse()?;
        self.show(screen);
        Ok(screen)
    }

    /// Returns `true` when `screen` is visible.
    pub fn is_visible(&self, screen: Screen) -> bool {
        self.visibility.get(&screen).copied().unwrap_or(false)
    }

    /// Returns the visible screen.
    pub fn current(&self) -> Screen {
        self.visibility
            .iter()
            .find_map(|(screen, visible)| visible.then_some(*screen))
            .unwrap_or(Screen::Welcome)
    }

    /// Returns every screen with its visibility.
    pub fn visibility(&self) -> impl Iterator<Item = (Screen, bool)> + '_ {
        self.visibility.iter().map(|(screen, visible)| (*screen, *visible))
    }
}

impl Default for ScreenController {
    fn default() -> Self {
        Self::new()
    }
}

/// Tabs of the feedback panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackTab {
    /// Highlights section.
    #[default]
    Highlights,
    /// Color analysis section.
    ColorAnalysis,
    /// Suggestions list.
    Suggestions,
}

impl FeedbackTab {
    /// Returns the tab id.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackTab::Highlights => "highlights",
            FeedbackTab::ColorAnalysis => "color-analysis",
            FeedbackTab::Suggestions => "suggestions",
        }
    }
}

impl FromStr for FeedbackTab {
    type Err = UiError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "highlights" => Ok(FeedbackTab::Highlights),
            "color-analysis" | "color" | "colors" => Ok(FeedbackTab::ColorAnalysis),
            "suggestions" => Ok(FeedbackTab::Suggestions),
            other => Err(UiError::UnknownTab(other.to_string())),
        }
    }
}

/// Upload picker state on the occasion screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadArea {
    /// Selected occasion, sent as the style goal of the initial advice.
    pub occasion: String,
    /// Name of the picked file.
    pub selected_file: Option<String>,
    /// Whether the "next" action is enabled.
    pub next_enabled: bool,
}

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    /// Message typed by the user.
    User(String),
    /// Transient placeholder while a reply is pending.
    Thinking,
    /// Advisor reply.
    Advisor(String),
    /// Failed turn.
    Error(String),
}

/// Ordered chat transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Appends a user message.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::User(text.into()));
    }

    /// Appends the thinking placeholder.
    pub fn push_thinking(&mut self) {
        self.entries.push(TranscriptEntry::Thinking);
    }

    /// Removes the most recent thinking placeholder, if any.
    pub fn remove_thinking(&mut self) -> bool {
        match self
            .entries
            .iter()
            .rposition(|entry| *entry == TranscriptEntry::Thinking)
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Appends an advisor reply.
    pub fn push_advisor(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::Advisor(text.into()));
    }

    /// Appends an error entry.
    pub fn push_error(&mut self, text: impl Into<String>) {
        self.entries.push(TranscriptEntry::Error(text.into()));
    }

    /// Returns all entries in order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Returns `true` while a placeholder is shown.
    pub fn is_thinking(&self) -> bool {
        self.entries.contains(&TranscriptEntry::Thinking)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Blocking error dialog.
    Alert,
    /// Transient confirmation.
    Success,
    /// Transient information.
    Info,
}

/// User-facing message queued for the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Message text.
    pub text: String,
}

/// Header buttons derived from the signed-in identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthBar {
    /// Signed-in email, `None` when signed out.
    pub email: Option<String>,
}

impl AuthBar {
    /// Returns `true` when someone is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.email.is_some()
    }

    /// Login button is shown only when signed out.
    pub fn shows_login(&self) -> bool {
        !self.is_signed_in()
    }

    /// Logout and profile buttons are shown only when signed in.
    pub fn shows_account_actions(&self) -> bool {
        self.is_signed_in()
    }
}

/// One completed analysis listed on the profile screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSummary {
    /// Server-side image reference.
    pub image_reference: String,
    /// Rating digits.
    pub rating: String,
    /// Quick take text.
    pub quick_take: String,
    /// Completion time in epoch milliseconds.
    pub recorded_at_ms: u64,
}

/// Profile screen content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileView {
    /// Displayed email.
    pub email: Option<String>,
    /// Analyses completed in this session, oldest first.
    pub history: Vec<AnalysisSummary>,
}

/// Aggregate view-model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorView {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    /// Screen visibility.
    pub screens: ScreenController,
    /// Upload picker on the occasion screen.
    pub upload_area: UploadArea,
    /// File name shown on the analysis and feedback screens.
    pub preview: Option<String>,
    /// Parsed advice shown on the feedback screen.
    pub feedback: Option<AdviceReport>,
    /// Active feedback tab.
    pub active_tab: FeedbackTab,
    /// Active tone button.
    pub tone: Tone,
    /// Chat transcript on the feedback screen.
    pub transcript: Transcript,
    /// Whether the login prompt is open.
    pub login_prompt_visible: bool,
    /// Header buttons.
    pub auth: AuthBar,
    /// Profile screen content.
    pub profile: ProfileView,
    notices: Vec<Notice>,
}

impl AdvisorView {
    /// Creates the initial view on the welcome screen.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            screens: ScreenController::new(),
            upload_area: UploadArea::default(),
            preview: None,
            feedback: None,
            active_tab: FeedbackTab::default(),
            tone: Tone::default(),
            transcript: Transcript::default(),
            login_prompt_visible: false,
            auth: AuthBar::default(),
            profile: ProfileView::default(),
            notices: Vec::new(),
        }
    }

    /// Returns the visible screen.
    pub fn current_screen(&self) -> Screen {
        self.screens.current()
    }

    /// Shows `screen` and hides all others.
    pub fn show_screen(&mut self, screen: Screen) {
        self.screens.show(screen);
    }

    /// Records a picked file and enables "next".
    pub fn select_file(&mut self, file_name: impl Into<String>) {
        self.upload_area.selected_file = Some(file_name.into());
        self.upload_area.next_enabled = true;
    }

    /// Sets the occasion picker value.
    pub fn select_occasion(&mut self, occasion: impl Into<String>) {
        self.upload_area.occasion = occasion.into();
    }

    /// Installs a parsed report and resets the tab to highlights.
    pub fn apply_feedback(&mut self, report: AdviceReport) {
        self.feedback = Some(report);
        self.active_tab = FeedbackTab::default();
    }

    /// Activates exactly one feedback tab.
    pub fn select_tab(&mut self, tab: FeedbackTab) {
        self.active_tab = tab;
    }

    /// Activates exactly one tone button.
    pub fn select_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    /// Reflects a signed-in identity in the header and profile.
    pub fn set_signed_in(&mut self, email: impl Into<String>) {
        let email = email.into();
        self.auth.email = Some(email.clone());
        self.profile.email = Some(email);
    }

    /// Reflects a signed-out state.
    pub fn set_signed_out(&mut self) {
        self.auth.email = None;
        self.profile.email = None;
    }

    /// Appends an analysis to the profile history.
    pub fn record_history(&mut self, summary: AnalysisSummary) {
        self.profile.history.push(summary);
    }

    /// Queues a blocking alert.
    pub fn alert(&mut self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Alert, text);
    }

    /// Queues a success message.
    pub fn notify_success(&mut self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Success, text);
    }

    /// Queues an informational message.
    pub fn notify_info(&mut self, text: impl Into<String>) {
        self.push_notice(NoticeKind::Info, text);
    }

    fn push_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notices.push(Notice {
            kind,
            text: text.into(),
        });
    }

    /// Returns queued notices without draining them.
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drains queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Clears everything tied to the current photo. Auth, profile history,
    /// the occasion picker and queued notices survive.
    pub fn reset_for_new_photo(&mut self) {
        self.upload_area = UploadArea {
            occasion: std::mem::take(&mut self.upload_area.occasion),
            ..UploadArea::default()
        };
        self.preview = None;
        self.feedback = None;
        self.active_tab = FeedbackTab::default();
        self.tone = Tone::default();
        self.transcript.clear();
        self.login_prompt_visible = false;
    }
}

/// View-model errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    /// Navigation target is not a registered screen.
    #[error("unknown screen: {0}")]
    UnknownScreen(String),
    /// Tab id is not a feedback tab.
    #[error("unknown tab: {0}")]
    UnknownTab(String),
}

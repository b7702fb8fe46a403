//! Upload workflow, chat loop and identity handlers.

use std::sync::Arc;

use outfit_advisor_advice_contract::{extract_quick_take, extract_rating, render_advice};
use outfit_advisor_api::{AdviceRequest, ApiClient, ApiError, ApiReply, ApiRequest};
use outfit_advisor_auth::{
    AuthClient, ClientStore, GateDecision, IdentityMachine, clear_identity, evaluate_upload_gate,
    persist_identity,
};
use outfit_advisor_core::{
    Conversation, ImageUpload, INITIAL_ADVICE_PROMPT, SessionState, Tone,
};
use outfit_advisor_ui::{AdvisorView, AnalysisSummary, FeedbackTab, Screen};

use crate::guard::{Admission, CallKind, Lane, RequestGuard, RequestTicket};
use crate::{AppError, Clock, redact_sensitive};

/// Alert prefix for analysis failures.
pub const ANALYSIS_ERROR_PREFIX: &str = "Sorry, there was an error analyzing your outfit";
/// Alert prefix for advice failures.
pub const ADVICE_ERROR_PREFIX: &str = "Sorry, there was an error getting fashion advice";
/// Transcript prefix for chat failures.
pub const CHAT_ERROR_PREFIX: &str = "Sorry, there was an error";
/// Notice shown when a different request is already running.
pub const BUSY_NOTICE: &str = "Please wait for the current request to finish.";
/// Notice shown before a deferred upload is resubmitted.
pub const UPLOAD_UNLOCKED_NOTICE: &str = "You can now upload multiple images!";
/// Transcript text when the server sent no advice body.
pub const MISSING_ADVICE_TEXT: &str = "The advisor returned an empty answer.";

/// Notice shown when the signed-in identity lapses.
pub const SESSION_LAPSED_NOTICE: &str = "Your session has expired. Please log in again.";

const LOGIN_SUCCESS_NOTICE: &str = "Successfully logged in!";
const LOGOUT_SUCCESS_NOTICE: &str = "Successfully logged out!";

/// Request admitted by a `begin_*` handler and awaiting its response.
#[derive(Debug, Clone)]
pub struct PendingCall {
    /// Guard ticket to hand back to [`AdvisorApp::complete`].
    pub ticket: RequestTicket,
    /// Request to send.
    pub request: ApiRequest,
}

/// Single-owner application controller.
pub struct AdvisorApp {
    api: ApiClient,
    auth_client: AuthClient,
    store: Box<dyn ClientStore>,
    clock: Arc<dyn Clock>,
    identity: IdentityMachine,
    session: SessionState,
    conversation: Conversation,
    view: AdvisorView,
    guard: RequestGuard,
    pending_upload: Option<ImageUpload>,
}

impl AdvisorApp {
    /// Creates the controller and restores any live identity from `store`.
    pub fn new(
        version: impl Into<String>,
        api: ApiClient,
        auth_client: AuthClient,
        store: Box<dyn ClientStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let identity = IdentityMachine::restore(store.as_ref(), clock.now_ms());
        let mut app = Self {
            api,
            auth_client,
            store,
            clock,
            identity,
            session: SessionState::new(),
            conversation: Conversation::new(),
            view: AdvisorView::new(version),
            guard: RequestGuard::new(),
            pending_upload: None,
        };

        if let Some(token) = app.identity.active(app.clock.now_ms()) {
            tracing::info!("restored identity from client storage");
            app.view.set_signed_in(token.email.clone());
        }
        app
    }

    /// Returns the view-model.
    pub fn view(&self) -> &AdvisorView {
        &self.view
    }

    /// Returns the session state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Returns the conversation state.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the upload waiting for a login, if any.
    pub fn pending_upload(&self) -> Option<&ImageUpload> {
        self.pending_upload.as_ref()
    }

    /// Returns the client store.
    pub fn store(&self) -> &dyn ClientStore {
        self.store.as_ref()
    }

    /// Returns `true` while `lane` has a request in flight.
    pub fn is_busy(&self, lane: Lane) -> bool {
        self.guard.is_busy(lane)
    }

    /// Drains queued notices.
    pub fn take_notices(&mut self) -> Vec<outfit_advisor_ui::Notice> {
        self.view.take_notices()
    }

    fn access_token(&self) -> Option<String> {
        self.identity
            .active(self.clock.now_ms())
            .map(|token| token.access_token.clone())
    }

    /// Re-evaluates identity expiry.
    pub fn tick(&mut self) {
        if self.identity.refresh(self.clock.now_ms()) {
            tracing::info!("identity lapsed");
            self.view.set_signed_out();
            self.view.notify_info(SESSION_LAPSED_NOTICE);
        }
    }

    /// Start button: welcome -> occasion.
    pub fn start(&mut self) {
        self.view.show_screen(Screen::Occasion);
    }

    /// Back buttons: jump to the screen named by `target`.
    ///
    /// # Errors
    /// Returns [`AppError::Ui`] for unknown targets; visibility is unchanged.
    pub fn navigate(&mut self, target: &str) -> Result<Screen, AppError> {
        Ok(self.view.screens.show_named(target)?)
    }

    /// Records the picked image and enables "next".
    pub fn select_image(&mut self, upload: ImageUpload) {
        tracing::debug!(file = %upload.file_name, bytes = upload.len(), "image selected");
        self.view.select_file(upload.file_name.clone());
        self.session.selected_image = Some(upload);
    }

    /// Sets the occasion picker value.
    pub fn select_occasion(&mut self, occasion: &str) {
        self.view.select_occasion(occasion.trim());
    }

    /// Activates a feedback tab.
    ///
    /// # Errors
    /// Returns [`AppError::Ui`] for unknown tab ids.
    pub fn select_tab(&mut self, tab: &str) -> Result<FeedbackTab, AppError> {
        let tab: FeedbackTab = tab.parse()?;
        self.view.select_tab(tab);
        Ok(tab)
    }

    /// Activates a tone button and stores the tone in the session.
    ///
    /// # Errors
    /// Returns [`AppError::Core`] for unknown tone names.
    pub fn select_tone(&mut self, tone: &str) -> Result<Tone, AppError> {
        let tone: Tone = tone.parse()?;
        self.session.tone = tone;
        self.view.select_tone(tone);
        Ok(tone)
    }

    /// Closes the login prompt without logging in.
    pub fn dismiss_login_prompt(&mut self) {
        self.view.login_prompt_visible = false;
    }

    /// Checks the lane and admits `request`, or reports why it cannot run.
    fn admit(&mut self, kind: CallKind, request: ApiRequest) -> Option<PendingCall> {
        let token = self.access_token();
        let fingerprint = self
            .api
            .build_request(&request, token.as_deref())
            .fingerprint();

        match self.guard.check(kind.lane(), &fingerprint) {
            Admission::Free => {}
            Admission::Duplicate => {
                tracing::debug!(?kind, %fingerprint, "ignoring duplicate submission");
                return None;
            }
            Admission::Busy => {
                tracing::debug!(?kind, "lane busy, rejecting submission");
                self.view.notify_info(BUSY_NOTICE);
                return None;
            }
        }

        let ticket = self.guard.admit(kind, fingerprint);
        tracing::info!(?kind, id = ticket.id, fingerprint = %ticket.fingerprint, "request admitted");
        Some(PendingCall { ticket, request })
    }

    /// "Next" on the occasion screen: gate the upload, then start analysis.
    ///
    /// # Returns
    /// - `Ok(None)` when the upload was deferred for a login, or rejected as
    ///   a duplicate/busy submission.
    /// - `Ok(Some(call))` with the analysis request to send.
    ///
    /// # Errors
    /// Returns [`AppError::NoImageSelected`] without a picked image and
    /// [`AppError::Store`] when the upload flag cannot be written.
    pub fn begin_upload(&mut self) -> Result<Option<PendingCall>, AppError> {
        self.tick();
        let image = self
            .session
            .selected_image
            .clone()
            .ok_or(AppError::NoImageSelected)?;

        if self.guard.is_busy(Lane::Upload) {
            let fingerprint = self
                .api
                .build_request(&ApiRequest::Analyze(image.clone()), None)
                .fingerprint();
            if self.guard.check(Lane::Upload, &fingerprint) == Admission::Busy {
                self.view.notify_info(BUSY_NOTICE);
            }
            return Ok(None);
        }

        let now_ms = self.clock.now_ms();
        if evaluate_upload_gate(self.store.as_mut(), now_ms)? == GateDecision::Defer {
            tracing::info!(file = %image.file_name, "upload deferred until login");
            self.defer_upload(image);
            return Ok(None);
        }

        self.session.style_goal = self.view.upload_area.occasion.clone();
        self.view.preview = Some(image.file_name.clone());
        self.view.show_screen(Screen::Analysis);

        Ok(self.admit(CallKind::Analyze, ApiRequest::Analyze(image)))
    }

    fn defer_upload(&mut self, image: ImageUpload) {
        self.pending_upload = Some(image);
        self.view.login_prompt_visible = true;
    }

    /// Chat input: turn the message into an advice request.
    ///
    /// # Returns
    /// `Ok(None)` for blank messages and duplicate/busy submissions.
    ///
    /// # Errors
    /// Returns [`AppError::NoAnalysis`] before any analysis completed.
    pub fn begin_chat(&mut self, message: &str) -> Result<Option<PendingCall>, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(None);
        }
        let Some(image_reference) = self.session.image_reference.clone() else {
            return Err(AppError::NoAnalysis);
        };

        let mut conversation = self.conversation.clone();
        let Some(turn) = conversation.next_turn(message) else {
            return Ok(None);
        };
        let request = ApiRequest::Advice(AdviceRequest {
            image_reference,
            description: self.session.analysis_description.clone(),
            user_input: turn.user_input,
            style_goal: turn.style_goal.clone(),
        });

        let Some(call) = self.admit(CallKind::ChatAdvice, request) else {
            return Ok(None);
        };

        self.conversation = conversation;
        self.session.style_goal = turn.style_goal;
        self.view.transcript.push_user(message);
        self.view.transcript.push_thinking();
        Ok(Some(call))
    }

    /// Applies a response. Returns the follow-up call, if the workflow has
    /// another step.
    ///
    /// Responses whose ticket is no longer in flight (after a reset or
    /// logout) are discarded without touching the view.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<ApiReply, ApiError>,
    ) -> Option<PendingCall> {
        if !self.guard.finish(&ticket) {
            tracing::info!(id = ticket.id, kind = ?ticket.kind, "discarding stale response");
            return None;
        }

        match ticket.kind {
            CallKind::Analyze => {
                let login_required = matches!(result, Err(ApiError::LoginRequired(_)));
                match self.complete_analysis(result) {
                    Some(next) => Some(next),
                    None if login_required => None,
                    None => self.resume_after_upload(),
                }
            }
            CallKind::InitialAdvice => {
                self.complete_initial_advice(result);
                self.resume_after_upload()
            }
            CallKind::ChatAdvice => {
                self.complete_chat(result);
                None
            }
        }
    }

    fn complete_analysis(&mut self, result: Result<ApiReply, ApiError>) -> Option<PendingCall> {
        match result {
            Ok(ApiReply::Analysis(outcome)) => {
                tracing::info!(image = %outcome.image_reference, "analysis complete");
                self.conversation.reset();
                self.view.transcript.clear();
                self.session
                    .record_analysis(outcome.image_reference.clone(), outcome.description.clone());
                let request = ApiRequest::Advice(AdviceRequest {
                    image_reference: outcome.image_reference,
                    description: outcome.description,
                    user_input: INITIAL_ADVICE_PROMPT.to_string(),
                    style_goal: self.session.style_goal.clone(),
                });
                self.admit(CallKind::InitialAdvice, request)
            }
            Ok(ApiReply::Advice(_)) => {
                self.fail_upload_step(
                    ANALYSIS_ERROR_PREFIX,
                    &ApiError::Contract("unexpected advice reply".to_string()),
                );
                None
            }
            Err(ApiError::LoginRequired(message)) => {
                tracing::info!("server requires login before upload");
                if let Some(image) = self.session.selected_image.clone() {
                    self.defer_upload(image);
                }
                self.view.notify_info(message);
                self.view.show_screen(Screen::Occasion);
                None
            }
            Err(error) => {
                self.fail_upload_step(ANALYSIS_ERROR_PREFIX, &error);
                None
            }
        }
    }

    fn complete_initial_advice(&mut self, result: Result<ApiReply, ApiError>) {
        match result {
            Ok(ApiReply::Advice(advice)) => {
                let report = render_advice(advice.as_deref());
                if report.degraded {
                    tracing::warn!("advice body missing, rendering degraded feedback");
                }
                if let (Some(text), Some(image_reference)) =
                    (advice.as_deref(), self.session.image_reference.clone())
                {
                    self.view.record_history(AnalysisSummary {
                        image_reference,
                        rating: extract_rating(text),
                        quick_take: extract_quick_take(text),
                        recorded_at_ms: self.clock.now_ms(),
                    });
                }
                self.session.last_advice = advice;
                self.view.apply_feedback(report);
                self.view.show_screen(Screen::Feedback);
            }
            Ok(ApiReply::Analysis(_)) => self.fail_upload_step(
                ADVICE_ERROR_PREFIX,
                &ApiError::Contract("unexpected analysis reply".to_string()),
            ),
            Err(error) => self.fail_upload_step(ADVICE_ERROR_PREFIX, &error),
        }
    }

    fn fail_upload_step(&mut self, prefix: &str, error: &ApiError) {
        tracing::warn!(error = %redact_sensitive(&error.to_string()), "{prefix}");
        self.view.alert(format!("{prefix}: {error}"));
        self.view.show_screen(Screen::Occasion);
    }

    fn complete_chat(&mut self, result: Result<ApiReply, ApiError>) {
        self.view.transcript.remove_thinking();
        match result {
            Ok(ApiReply::Advice(Some(text))) => {
                self.view.transcript.push_advisor(text.clone());
                self.session.last_advice = Some(text);
            }
            Ok(ApiReply::Advice(None)) => {
                self.view.transcript.push_advisor(MISSING_ADVICE_TEXT);
            }
            Ok(ApiReply::Analysis(_)) => {
                self.view.transcript.push_error(format!(
                    "{CHAT_ERROR_PREFIX}: unexpected analysis reply"
                ));
            }
            Err(error) => {
                tracing::warn!(error = %redact_sensitive(&error.to_string()), "chat turn failed");
                self.view
                    .transcript
                    .push_error(format!("{CHAT_ERROR_PREFIX}: {error}"));
            }
        }
    }

    /// Sends a pending call through the API client.
    ///
    /// # Errors
    /// Returns the normalized [`ApiError`].
    pub fn execute(&self, call: &PendingCall) -> Result<ApiReply, ApiError> {
        let token = self.access_token();
        self.api.dispatch(&call.request, token.as_deref())
    }

    /// Executes `call` and every follow-up step inline.
    pub fn drive(&mut self, call: PendingCall) {
        let mut next = Some(call);
        while let Some(call) = next {
            let result = self.execute(&call);
            next = self.complete(call.ticket, result);
        }
    }

    /// Synchronous "next": gate, analyze, fetch advice, show feedback.
    ///
    /// # Errors
    /// See [`AdvisorApp::begin_upload`].
    pub fn submit_upload(&mut self) -> Result<(), AppError> {
        if let Some(call) = self.begin_upload()? {
            self.drive(call);
        }
        Ok(())
    }

    /// Synchronous chat turn.
    ///
    /// # Errors
    /// See [`AdvisorApp::begin_chat`].
    pub fn submit_chat(&mut self, message: &str) -> Result<(), AppError> {
        if let Some(call) = self.begin_chat(message)? {
            self.drive(call);
        }
        Ok(())
    }

    /// Logs in and returns the resubmitted upload, if one was deferred.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] for invalid emails or failed logins (an
    /// alert is queued as well) and [`AppError::Store`] when the identity
    /// cannot be persisted.
    pub fn login(&mut self, email: &str) -> Result<Option<PendingCall>, AppError> {
        let now_ms = self.clock.now_ms();
        let token = match self.auth_client.login(email, now_ms) {
            Ok(token) => token,
            Err(error) => {
                tracing::warn!(error = %redact_sensitive(&error.to_string()), "login failed");
                self.view.alert(error.to_string());
                return Err(error.into());
            }
        };

        persist_identity(self.store.as_mut(), &token, now_ms)?;
        tracing::info!("logged in");
        self.view.set_signed_in(token.email.clone());
        self.identity.sign_in(token);
        self.view.login_prompt_visible = false;
        self.view.notify_success(LOGIN_SUCCESS_NOTICE);

        self.resume_pending_upload()
    }

    /// Resubmits the deferred upload once signed in and the upload lane is
    /// idle. Otherwise the upload stays stashed.
    fn resume_pending_upload(&mut self) -> Result<Option<PendingCall>, AppError> {
        if self.pending_upload.is_none()
            || self.guard.is_busy(Lane::Upload)
            || self.identity.active(self.clock.now_ms()).is_none()
        {
            return Ok(None);
        }
        let Some(image) = self.pending_upload.take() else {
            return Ok(None);
        };

        tracing::info!(file = %image.file_name, "resubmitting deferred upload");
        self.view.notify_info(UPLOAD_UNLOCKED_NOTICE);
        self.select_image(image.clone());
        let result = self.begin_upload();
        if !matches!(result, Ok(Some(_))) && self.pending_upload.is_none() {
            self.pending_upload = Some(image);
        }
        result
    }

    fn resume_after_upload(&mut self) -> Option<PendingCall> {
        match self.resume_pending_upload() {
            Ok(next) => next,
            Err(error) => {
                tracing::warn!(error = %redact_sensitive(&error.to_string()), "deferred upload not resumed");
                self.view.alert(format!("{ANALYSIS_ERROR_PREFIX}: {error}"));
                None
            }
        }
    }

    /// Logs in and drives any resubmitted upload inline.
    ///
    /// # Errors
    /// See [`AdvisorApp::login`].
    pub fn submit_login(&mut self, email: &str) -> Result<(), AppError> {
        if let Some(call) = self.login(email)? {
            self.drive(call);
        }
        Ok(())
    }

    /// Logs out. The backend is notified best-effort; local identity is
    /// always cleared.
    ///
    /// # Errors
    /// Returns [`AppError::Store`] when client storage cannot be updated.
    pub fn logout(&mut self) -> Result<(), AppError> {
        if let Some(token) = self.identity.sign_out(self.clock.now_ms())
            && let Err(error) = self.auth_client.logout(&token)
        {
            tracing::warn!(error = %redact_sensitive(&error.to_string()), "logout notification failed");
        }

        clear_identity(self.store.as_mut())?;
        self.guard.advance_generation();
        self.view.transcript.remove_thinking();
        self.view.set_signed_out();
        if self.view.screens.is_visible(Screen::Profile) {
            self.view.show_screen(Screen::Welcome);
        }
        self.view.notify_success(LOGOUT_SUCCESS_NOTICE);
        tracing::info!("logged out");
        Ok(())
    }

    /// Profile button: shows history, or the login prompt when signed out.
    pub fn open_profile(&mut self) {
        self.tick();
        if self.view.auth.is_signed_in() {
            self.view.show_screen(Screen::Profile);
        } else {
            self.view.login_prompt_visible = true;
        }
    }

    /// "New photo": clears the session and returns to the occasion screen.
    pub fn reset_and_start_over(&mut self) {
        self.session.clear();
        self.conversation.reset();
        self.pending_upload = None;
        self.guard.advance_generation();
        self.view.reset_for_new_photo();
        self.view.show_screen(Screen::Occasion);
        tracing::info!(generation = self.guard.generation(), "session reset");
    }
}

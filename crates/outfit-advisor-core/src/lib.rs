#![warn(missing_docs)]
//! # outfit-advisor-core
//!
//! ## Purpose
//! Defines the pure session data model shared across the `outfit-advisor`
//! workspace.
//!
//! ## Responsibilities
//! - Represent the selected outfit image as an owned upload.
//! - Hold per-session state (image reference, description, style goal, tone,
//!   last advice) behind an explicit object instead of ambient globals.
//! - Model the two-phase advice conversation (style goal capture, then
//!   verbatim questions).
//!
//! ## Data flow
//! The user selects an [`ImageUpload`] -> the analysis response fills
//! [`SessionState::image_reference`] and [`SessionState::analysis_description`]
//! -> every advice request is assembled from [`SessionState`] plus the turn
//! produced by [`Conversation::next_turn`].
//!
//! ## Ownership and lifetimes
//! Uploads own their bytes (`Vec<u8>`) so a deferred upload can be stashed
//! across a login round trip without borrowing from the picker.
//!
//! ## Error model
//! Reading an image from disk or accepting an empty image returns
//! [`CoreError`].
//!
//! ## Security and privacy notes
//! Image bytes are never logged; only file names and sizes are.
//!
//! ## Example
//! ```rust
//! use outfit_advisor_core::{Conversation, DEFAULT_CHAT_PROMPT};
//!
//! let mut conversation = Conversation::new();
//! let turn = conversation.next_turn("wedding guest").unwrap();
//! assert_eq!(turn.user_input, DEFAULT_CHAT_PROMPT);
//! assert_eq!(turn.style_goal, "wedding guest");
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Question sent in place of the first chat message, which becomes the style
/// goal instead.
pub const DEFAULT_CHAT_PROMPT: &str = "What do you think of this outfit?";

/// Question sent with the initial advice request after an upload.
pub const INITIAL_ADVICE_PROMPT: &str = "rate out of 100 and provide commentary";

/// Largest image accepted for upload (20 MiB).
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Feedback tone selected on the feedback screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Softened feedback.
    #[default]
    Gentle,
    /// Even-handed feedback.
    Balanced,
    /// Blunt feedback.
    Direct,
}

impl Tone {
    /// All tones in button order.
    pub const ALL: [Tone; 3] = [Tone::Gentle, Tone::Balanced, Tone::Direct];

    /// Returns the attribute value used by tone buttons.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Gentle => "gentle",
            Tone::Balanced => "balanced",
            Tone::Direct => "direct",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gentle" => Ok(Tone::Gentle),
            "balanced" => Ok(Tone::Balanced),
            "direct" => Ok(Tone::Direct),
            other => Err(CoreError::UnknownTone(other.to_string())),
        }
    }
}

/// One outfit image selected for analysis.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File name sent with the multipart part.
    pub file_name: String,
    /// MIME type sent with the multipart part.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Constructs a validated upload.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyImage`] for zero-length content and
    /// [`CoreError::ImageTooLarge`] above [`MAX_IMAGE_BYTES`].
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, CoreError> {
        if bytes.is_empty() {
            return Err(CoreError::EmptyImage);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(CoreError::ImageTooLarge {
                limit: MAX_IMAGE_BYTES,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        })
    }

    /// Reads an image from disk, guessing its MIME type from the extension.
    ///
    /// # Errors
    /// Returns [`CoreError::Io`] when the file cannot be read, plus the
    /// validation errors of [`ImageUpload::new`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Self::new(file_name, content_type, bytes)
    }

    /// Returns the byte length of the image.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when the image holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// In-memory state for one advice session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Image picked by the user, not yet necessarily uploaded.
    pub selected_image: Option<ImageUpload>,
    /// Server-side reference returned by the analysis endpoint.
    pub image_reference: Option<String>,
    /// Textual outfit description returned by the analysis endpoint.
    pub analysis_description: String,
    /// Occasion or style goal sent with every advice request.
    pub style_goal: String,
    /// Selected feedback tone.
    pub tone: Tone,
    /// Raw Markdown of the most recent advice.
    pub last_advice: Option<String>,
}

impl SessionState {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful analysis.
    pub fn record_analysis(&mut self, image_reference: impl Into<String>, description: impl Into<String>) {
        self.image_reference = Some(image_reference.into());
        self.analysis_description = description.into();
    }

    /// Returns `true` once an analysis has produced an image reference.
    pub fn has_analysis(&self) -> bool {
        self.image_reference.is_some()
    }

    /// Clears every field back to a fresh session.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Phase of the advice conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationPhase {
    /// No message has been sent yet; the next one is the style goal.
    AwaitingStyleGoal,
    /// The style goal is captured; messages are forwarded verbatim.
    Conversing {
        /// Captured style goal.
        style_goal: String,
    },
}

/// Fields of one advice request produced by a chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// Text sent as `user_input`.
    pub user_input: String,
    /// Text sent as `style_goals`.
    pub style_goal: String,
}

/// Two-state conversation machine driving the chat loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    phase: ConversationPhase,
}

impl Conversation {
    /// Creates a conversation waiting for its style goal.
    pub fn new() -> Self {
        Self {
            phase: ConversationPhase::AwaitingStyleGoal,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> &ConversationPhase {
        &self.phase
    }

    /// Returns the captured style goal, if any.
    pub fn style_goal(&self) -> Option<&str> {
        match &self.phase {
            ConversationPhase::AwaitingStyleGoal => None,
            ConversationPhase::Conversing { style_goal } => Some(style_goal),
        }
    }

    /// Consumes one user message and returns the request fields to send.
    ///
    /// # Returns
    /// - `None` for blank messages; the phase does not change.
    /// - The first non-blank message becomes the style goal and is replaced
    ///   by [`DEFAULT_CHAT_PROMPT`].
    /// - Later messages are forwarded verbatim (trimmed).
    pub fn next_turn(&mut self, message: &str) -> Option<ChatTurn> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }

        match &self.phase {
            ConversationPhase::AwaitingStyleGoal => {
                self.phase = ConversationPhase::Conversing {
                    style_goal: message.to_string(),
                };
                Some(ChatTurn {
                    user_input: DEFAULT_CHAT_PROMPT.to_string(),
                    style_goal: message.to_string(),
                })
            }
            ConversationPhase::Conversing { style_goal } => Some(ChatTurn {
                user_input: message.to_string(),
                style_goal: style_goal.clone(),
            }),
        }
    }

    /// Returns to [`ConversationPhase::AwaitingStyleGoal`].
    pub fn reset(&mut self) {
        self.phase = ConversationPhase::AwaitingStyleGoal;
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Error type for session model validation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Selected image has no content.
    #[error("image is empty")]
    EmptyImage,
    /// Selected image exceeds the upload limit.
    #[error("image too large: limit {limit} bytes, got {actual}")]
    ImageTooLarge {
        /// Maximum accepted byte count.
        limit: usize,
        /// Actual byte count.
        actual: usize,
    },
    /// Image file could not be read.
    #[error("unable to read image '{path}': {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Tone name is not recognized.
    #[error("unknown tone: {0}")]
    UnknownTone(String),
}

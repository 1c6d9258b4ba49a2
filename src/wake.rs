//! Wake word detection on transcripts
//!
//! Works on recognized text rather than audio: a transcript either carries a
//! wake word, optionally followed by the command itself, or is ignored until
//! the assistant is activated.

use std::time::{Duration, Instant};

/// State of the wake word detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Waiting for a wake word
    Idle,
    /// Wake word heard, the next transcript is a command
    Activated,
}

/// Outcome of feeding one transcript to the detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WakeEvent {
    /// No wake word and not activated
    Ignored,
    /// Wake word alone, the command follows separately
    Activated,
    /// A command to process
    Command(String),
}

/// Default time an activation waits for its command
pub const DEFAULT_ACTIVATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Detects wake words in transcripts
#[derive(Debug, Clone)]
pub struct WakeWordDetector {
    /// Normalized wake words, longest first so "hey shadow" wins over "shadow"
    wake_words: Vec<String>,
    /// First configured wake word
    primary: Option<String>,
    state: DetectorState,
    /// When the detector last went `Activated`
    activated_at: Option<Instant>,
    timeout: Duration,
}

impl WakeWordDetector {
    /// Create a new wake word detector
    ///
    /// # Arguments
    ///
    /// * `wake_words` - Phrases that activate the assistant (e.g., "hey shadow")
    #[must_use]
    pub fn new(wake_words: Vec<String>) -> Self {
        let mut normalized: Vec<String> = Vec::with_capacity(wake_words.len());
        for word in wake_words {
            let word = word.trim().to_lowercase();
            if !word.is_empty() && !normalized.contains(&word) {
                normalized.push(word);
            }
        }
        let primary = normalized.first().cloned();
        normalized.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));

        tracing::debug!(wake_words = ?normalized, "wake word detector initialized");

        Self {
            wake_words: normalized,
            primary,
            state: DetectorState::Idle,
            activated_at: None,
            timeout: DEFAULT_ACTIVATION_TIMEOUT,
        }
    }

    /// Set how long an activation waits for its command
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The first wake word contained in `transcript`
    #[must_use]
    pub fn detect(&self, transcript: &str) -> Option<&str> {
        let normalized = transcript.to_lowercase();
        self.wake_words
            .iter()
            .find(|w| normalized.contains(w.as_str()))
            .map(String::as_str)
    }

    /// Remove a leading wake word
    ///
    /// Returns the trimmed command. A wake word later in the sentence is part
    /// of the command, so "tell shadow a joke" comes back whole.
    #[must_use]
    pub fn strip(&self, transcript: &str) -> String {
        let normalized = transcript.to_lowercase();
        // Lowercasing can change byte lengths outside ASCII, so only slice the
        // original when the offsets line up
        let aligned = normalized.len() == transcript.len();
        let source = if aligned { transcript } else { normalized.as_str() };

        let lead = normalized.trim_start_matches(is_separator);
        let offset = normalized.len() - lead.len();

        let rest = self
            .wake_words
            .iter()
            .find(|w| {
                lead.strip_prefix(w.as_str())
                    .is_some_and(|after| !after.starts_with(char::is_alphanumeric))
            })
            .and_then(|w| source.get(offset + w.len()..))
            .unwrap_or(source);

        rest.trim_start_matches(is_separator).trim_end().to_string()
    }

    /// Feed a transcript and advance the detector
    pub fn process(&mut self, transcript: &str) -> WakeEvent {
        self.process_at(transcript, Instant::now())
    }

    /// Feed a transcript heard at `now` and advance the detector
    ///
    /// An activation older than the timeout lapses back to `Idle` before the
    /// transcript is looked at.
    pub fn process_at(&mut self, transcript: &str, now: Instant) -> WakeEvent {
        if self.state == DetectorState::Activated
            && let Some(at) = self.activated_at
            && now.saturating_duration_since(at) > self.timeout
        {
            tracing::debug!(timeout = ?self.timeout, "activation timed out");
            self.reset();
        }

        if let Some(wake_word) = self.detect(transcript) {
            tracing::info!(wake_word, transcript, "wake word detected");
            let command = self.strip(transcript);
            if command.is_empty() {
                self.state = DetectorState::Activated;
                self.activated_at = Some(now);
                return WakeEvent::Activated;
            }
            self.reset();
            return WakeEvent::Command(command);
        }

        match self.state {
            DetectorState::Activated => {
                self.reset();
                WakeEvent::Command(transcript.trim().to_string())
            }
            DetectorState::Idle => {
                tracing::trace!(transcript, "no wake word, ignoring");
                WakeEvent::Ignored
            }
        }
    }

    /// Check if currently activated (wake word was detected)
    #[must_use]
    pub fn is_activated(&self) -> bool {
        self.state == DetectorState::Activated
    }

    /// Reset detector to idle state
    pub const fn reset(&mut self) {
        self.state = DetectorState::Idle;
        self.activated_at = None;
    }

    /// Get current state
    #[must_use]
    pub const fn state(&self) -> DetectorState {
        self.state
    }

    /// Get the configured wake words, longest first
    #[must_use]
    pub fn wake_words(&self) -> &[String] {
        &self.wake_words
    }

    /// The wake word to advertise to the user
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// How long an activation waits for its command
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '.' | '!' | '?' | ':' | ';' | '-')
}

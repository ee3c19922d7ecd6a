//! # Speech collaborators
//!
//! Trait seams for the speech-to-text and text-to-speech providers, plus the
//! transcription retry loop. The engine treats a transcript as an opaque
//! string; everything audio-specific stops at this boundary.
//!
//! Empty and too-short provider output are surfaced as distinct outcomes
//! (`EmptyAudio`, `NoSpeechDetected`) so the caller never feeds garbage into
//! the session engine's windows.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};
use tutor_core::Language;

/// Transcripts shorter than this (after trimming) count as no speech.
const MIN_TRANSCRIPT_CHARS: usize = 2;

/// Errors from the transcription boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscribeError {
    #[error("Audio payload was empty")]
    EmptyAudio,

    #[error("No speech detected in audio")]
    NoSpeechDetected,

    #[error("Transcription attempt timed out")]
    Timeout,

    #[error("Transcription provider error: {0}")]
    Provider(String),
}

/// Errors from the synthesis boundary.
#[derive(Error, Debug)]
pub enum SynthesizeError {
    #[error("Synthesis provider error: {0}")]
    Provider(String),
}

/// Reference to synthesized audio held by the provider (id plus optional URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRef {
    pub id: String,
    pub url: Option<String>,
}

/// Speech-to-text provider seam.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Transcribes one audio payload. Implementations return raw provider
    /// text; emptiness checks happen in [`transcribe_with_retry`].
    async fn transcribe(
        &self,
        audio: &[u8],
        session_id: &str,
        language_hint: Language,
    ) -> Result<String, TranscribeError>;
}

/// Text-to-speech provider seam. Invoked once per accepted reply; stateless
/// from the engine's point of view.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        session_id: &str,
    ) -> Result<AudioRef, SynthesizeError>;
}

/// Retry policy for transcription: bounded attempts with a per-attempt
/// deadline and linear backoff between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(15),
            backoff_step: Duration::from_millis(500),
        }
    }
}

/// Runs transcription with up to `policy.max_attempts` attempts.
///
/// Empty payloads fail immediately with `EmptyAudio`. Empty or too-short
/// transcripts are mapped to `NoSpeechDetected` and retried like provider
/// failures; the delay before attempt n is `backoff_step * n` (linear).
pub async fn transcribe_with_retry(
    provider: &dyn TranscriptionProvider,
    audio: &[u8],
    session_id: &str,
    language_hint: Language,
    policy: &RetryPolicy,
) -> Result<String, TranscribeError> {
    if audio.is_empty() {
        return Err(TranscribeError::EmptyAudio);
    }

    let mut last_error = TranscribeError::NoSpeechDetected;

    for attempt in 1..=policy.max_attempts {
        if attempt > 1 {
            sleep(policy.backoff_step * (attempt - 1)).await;
        }

        let result = timeout(
            policy.attempt_timeout,
            provider.transcribe(audio, session_id, language_hint),
        )
        .await;

        match result {
            Ok(Ok(text)) => {
                let trimmed = text.trim();
                if trimmed.chars().count() < MIN_TRANSCRIPT_CHARS {
                    warn!(session_id, attempt, "transcript empty or too short");
                    last_error = TranscribeError::NoSpeechDetected;
                    continue;
                }
                info!(session_id, attempt, "transcription succeeded");
                return Ok(trimmed.to_string());
            }
            Ok(Err(e)) => {
                warn!(session_id, attempt, error = %e, "transcription attempt failed");
                last_error = e;
            }
            Err(_) => {
                warn!(session_id, attempt, "transcription attempt timed out");
                last_error = TranscribeError::Timeout;
            }
        }
    }

    Err(last_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider scripted to fail a fixed number of times before succeeding.
    struct FlakyProvider {
        failures: u32,
        calls: AtomicU32,
        text: String,
    }

    #[async_trait]
    impl TranscriptionProvider for FlakyProvider {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _session_id: &str,
            _language_hint: Language,
        ) -> Result<String, TranscribeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(TranscribeError::Provider("flaky".into()))
            } else {
                Ok(self.text.clone())
            }
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(1),
            backoff_step: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn empty_audio_fails_without_calling_provider() {
        let provider = FlakyProvider {
            failures: 0,
            calls: AtomicU32::new(0),
            text: "hello".into(),
        };

        let result =
            transcribe_with_retry(&provider, &[], "s1", Language::English, &fast_policy()).await;

        assert_eq!(result, Err(TranscribeError::EmptyAudio));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let provider = FlakyProvider {
            failures: 2,
            calls: AtomicU32::new(0),
            text: "hola como estas".into(),
        };

        let result =
            transcribe_with_retry(&provider, &[1, 2, 3], "s1", Language::Spanish, &fast_policy())
                .await;

        assert_eq!(result.unwrap(), "hola como estas");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_attempts_return_last_error() {
        let provider = FlakyProvider {
            failures: 10,
            calls: AtomicU32::new(0),
            text: "never".into(),
        };

        let result =
            transcribe_with_retry(&provider, &[1], "s1", Language::English, &fast_policy()).await;

        assert_eq!(result, Err(TranscribeError::Provider("flaky".into())));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn short_transcript_maps_to_no_speech() {
        struct ShortProvider;

        #[async_trait]
        impl TranscriptionProvider for ShortProvider {
            async fn transcribe(
                &self,
                _audio: &[u8],
                _session_id: &str,
                _language_hint: Language,
            ) -> Result<String, TranscribeError> {
                Ok(" ".to_string())
            }
        }

        let result =
            transcribe_with_retry(&ShortProvider, &[1], "s1", Language::English, &fast_policy())
                .await;

        assert_eq!(result, Err(TranscribeError::NoSpeechDetected));
    }
}

//! Draft session: generate and regenerate actions over an explicit,
//! caller-owned state record.
//!
//! The record moves from "nothing generated yet" to "response available" on
//! the first successful generation and stays there. Failed actions never
//! touch it.

use tracing::{info, warn};

use crate::client::CompletionClient;
use crate::prompt::{compose, ToneSelection, ValidationError};
use crate::providers::ProviderError;

/// Latest enquiry and response for one user session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Enquiry behind the latest successful generation.
    pub last_enquiry: Option<String>,
    /// Latest draft response.
    pub last_response: Option<String>,
}

impl SessionState {
    /// Whether a draft is available to display.
    pub fn has_response(&self) -> bool {
        self.last_response.is_some()
    }
}

/// Failure of a generate or regenerate action.
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    /// Input rejected locally; no request was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The provider call failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
    /// Regenerate requested before anything was generated.
    #[error("nothing to regenerate yet")]
    NothingToRegenerate,
}

/// Runs draft actions against a completion client.
#[derive(Debug, Clone, Copy)]
pub struct Drafter<'a> {
    client: &'a CompletionClient,
}

impl<'a> Drafter<'a> {
    /// Create a drafter over `client`.
    pub fn new(client: &'a CompletionClient) -> Self {
        Self { client }
    }

    /// Draft a reply to `enquiry` and record it in `state`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::Validation`] without calling the provider when
    /// the enquiry is blank, and [`DraftError::Provider`] when the call fails.
    /// `state` is unchanged on error.
    pub async fn generate(
        &self,
        state: &mut SessionState,
        enquiry: &str,
        tone: &ToneSelection,
    ) -> Result<String, DraftError> {
        let messages = compose(enquiry, tone)?;
        info!(
            tone = tone.label(),
            enquiry_chars = enquiry.chars().count(),
            "generating draft"
        );
        let draft = self
            .client
            .generate(messages)
            .await
            .inspect_err(|e| warn!(error = %e, "draft generation failed"))?;
        state.last_enquiry = Some(enquiry.to_owned());
        state.last_response = Some(draft.clone());
        Ok(draft)
    }

    /// Draft again from the stored enquiry with the currently selected tone.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NothingToRegenerate`] when no enquiry is stored,
    /// or any error [`Drafter::generate`] can return.
    pub async fn regenerate(
        &self,
        state: &mut SessionState,
        tone: &ToneSelection,
    ) -> Result<String, DraftError> {
        let enquiry = state
            .last_enquiry
            .clone()
            .ok_or(DraftError::NothingToRegenerate)?;
        self.generate(state, &enquiry, tone).await
    }
}

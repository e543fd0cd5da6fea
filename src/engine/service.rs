// SPDX-FileCopyrightText: 2026 The pseudoflow contributors
// SPDX-License-Identifier: MIT

//! Boundary contract for the external pseudocode generation service.
//! Request/response, no retry and no streaming; a failure surfaces once and
//! the caller may re-invoke.

use std::future::Future;

/// Typed failure from the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudocodeError {
    /// No API credential is configured.
    AuthMissing,
    /// The request never produced a usable response.
    Transport(String),
    /// The response arrived but did not contain pseudocode text.
    MalformedResponse(String),
}

impl std::fmt::Display for PseudocodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthMissing => write!(f, "no API key configured for pseudocode generation"),
            Self::Transport(detail) => write!(f, "pseudocode request failed: {detail}"),
            Self::MalformedResponse(detail) => {
                write!(f, "pseudocode response was malformed: {detail}")
            }
        }
    }
}

impl std::error::Error for PseudocodeError {}

/// Produces pseudocode for a full source text: plain newline-delimited
/// lines, one logical statement per line, indentation mirroring the source.
pub trait PseudocodeSource {
    fn generate(
        &self,
        source: &str,
    ) -> impl Future<Output = Result<String, PseudocodeError>> + Send;
}

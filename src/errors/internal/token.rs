use thiserror::Error;

/// Classification of a rejected session token. Only used for logging; every
/// class produces the same response at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFailClass {
    /// Not structurally a token, or claims could not be decoded
    Malformed,

    /// Signature does not verify with the configured secret
    BadSignature,

    /// Header algorithm is not the one we sign with
    AlgorithmMismatch,

    /// Current time is at or past `exp`
    Expired,

    /// Current time is before `nbf`
    NotYetValid,

    /// `iss` is not the configured issuer
    IssuerMismatch,

    /// A required claim is absent
    MissingClaim,

    /// Signing or key handling failed on our side
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Session token rejected ({class:?}): {detail}")]
pub struct TokenError {
    pub class: TokenFailClass,
    pub detail: String,
}

impl TokenError {
    pub fn new(class: TokenFailClass, detail: impl Into<String>) -> Self {
        Self { class, detail: detail.into() }
    }

    pub fn from_jwt(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind::*;

        let class = match err.kind() {
            InvalidToken | Base64(_) | Json(_) | Utf8(_) => TokenFailClass::Malformed,
            InvalidSignature => TokenFailClass::BadSignature,
            InvalidAlgorithm | InvalidAlgorithmName | MissingAlgorithm | InvalidKeyFormat => {
                TokenFailClass::AlgorithmMismatch
            }
            ExpiredSignature => TokenFailClass::Expired,
            ImmatureSignature => TokenFailClass::NotYetValid,
            InvalidIssuer => TokenFailClass::IssuerMismatch,
            MissingRequiredClaim(_) => TokenFailClass::MissingClaim,
            _ => TokenFailClass::Internal,
        };

        Self::new(class, err.to_string())
    }
}

//! Error types for the console runtime.

use thiserror::Error;

/// Kind of reference that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A tilemap id.
    Tilemap,
    /// A font id.
    Font,
    /// A player slot id.
    Player,
    /// A sprite table id.
    Sprite,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tilemap => write!(f, "tilemap"),
            Self::Font => write!(f, "font"),
            Self::Player => write!(f, "player"),
            Self::Sprite => write!(f, "sprite"),
        }
    }
}

/// Errors surfaced by console operations.
///
/// Unit-facing draw and query calls never return `UnresolvedReference`; they
/// degrade to a no-op instead. It is only produced by host-side calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsoleError {
    /// An argument is outside the accepted domain.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter.
        name: &'static str,
        /// What the accepted domain is.
        reason: String,
    },
    /// An id does not name a known object.
    #[error("unresolved {kind} reference: {id}")]
    UnresolvedReference {
        /// What kind of object was looked up.
        kind: ReferenceKind,
        /// The raw id.
        id: u32,
    },
}

impl ConsoleError {
    /// Build an `InvalidArgument` error.
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

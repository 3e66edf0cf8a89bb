use std::fmt;

/// Failure to interpret a natural-language time expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The expression did not resolve to a single day + clock-time reading.
    AmbiguousExpression(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::AmbiguousExpression(expr) => {
                write!(f, "ambiguous time expression: {expr:?}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Which capability call a provider error came from.
///
/// Write-phase errors matter to callers: once the create call has been issued,
/// the earlier free-interval computation may already be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOp {
    Read,
    Write,
    Delete,
}

impl fmt::Display for ProviderOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderOp::Read => write!(f, "read"),
            ProviderOp::Write => write!(f, "write"),
            ProviderOp::Delete => write!(f, "delete"),
        }
    }
}

/// Classification of a calendar-provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Worth re-running the whole pipeline (network, 5xx, throttling).
    Transient,
    /// Will not succeed on retry (auth, bad request, missing event).
    Permanent,
    /// The provider rejected a write because the slot was taken concurrently.
    Conflict,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::Transient => write!(f, "transient"),
            ProviderErrorKind::Permanent => write!(f, "permanent"),
            ProviderErrorKind::Conflict => write!(f, "conflict"),
        }
    }
}

/// Error returned by a calendar capability call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub op: ProviderOp,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, op: ProviderOp, message: impl Into<String>) -> Self {
        Self {
            kind,
            op,
            message: message.into(),
        }
    }

    pub fn transient(op: ProviderOp, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transient, op, message)
    }

    pub fn permanent(op: ProviderOp, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Permanent, op, message)
    }

    pub fn conflict(op: ProviderOp, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Conflict, op, message)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "provider error ({} during {}): {}",
            self.kind, self.op, self.message
        )
    }
}

impl std::error::Error for ProviderError {}

/// Unified error type for the coschedule crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A natural-language time expression could not be interpreted.
    Parse(ParseError),
    /// No candidate slot satisfied the duration and working-hours policy.
    NoSlotAvailable,
    /// A calendar capability call failed.
    Provider(ProviderError),
    /// Invalid input provided by the caller (tool arguments, invariant breaches).
    InvalidInput(String),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::Parse(e) => write!(f, "{e}"),
            ScheduleError::NoSlotAvailable => write!(f, "no slot available in the search window"),
            ScheduleError::Provider(e) => write!(f, "{e}"),
            ScheduleError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScheduleError::Parse(e) => Some(e),
            ScheduleError::Provider(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for ScheduleError {
    fn from(e: ParseError) -> Self {
        ScheduleError::Parse(e)
    }
}

impl From<ProviderError> for ScheduleError {
    fn from(e: ProviderError) -> Self {
        ScheduleError::Provider(e)
    }
}

/// Result type alias using [`ScheduleError`].
pub type ScheduleResult<T> = Result<T, ScheduleError>;

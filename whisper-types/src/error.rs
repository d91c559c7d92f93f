use thiserror::Error;

use crate::constants::{NOT_FOUND_CODE, UNAVAILABLE_CODE};

/// Why a forward failed, as seen by the caller of a hop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No registry entry for the recipient at some hop.
    NotFound,
    /// A next hop could not be reached, or the call to it broke.
    Unavailable,
}

impl FailureKind {
    /// The JSON-RPC error code carrying this kind on the wire.
    pub fn code(self) -> i32 {
        match self {
            FailureKind::NotFound => NOT_FOUND_CODE,
            FailureKind::Unavailable => UNAVAILABLE_CODE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NotFound => "not found",
            FailureKind::Unavailable => "unavailable",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors converting wire values into Whisper types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("unknown failure code {code}")]
    UnknownFailureCode { code: i32 },
}

impl TryFrom<i32> for FailureKind {
    type Error = TypesError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            NOT_FOUND_CODE => Ok(FailureKind::NotFound),
            UNAVAILABLE_CODE => Ok(FailureKind::Unavailable),
            other => Err(TypesError::UnknownFailureCode { code: other }),
        }
    }
}

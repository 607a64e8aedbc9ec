use crate::core::ProtocolError;
use std::result;
use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

/// Failures of the context operations. Every variant names the step that
/// failed and keeps the collaborator error that caused it.
#[derive(Debug, Error)]
pub enum Error {
    /// The protocol session could not be started.
    #[error("Unable to initialize Kerberos session: {0}")]
    ProtocolInit(#[source] ProtocolError),

    /// The named (or default) credentials cache could not be resolved.
    #[error("Unable to resolve ccache '{name}': {source}")]
    CacheResolution {
        name: String,
        #[source]
        source: ProtocolError,
    },

    /// Neither the requested principal nor the cache principal could be
    /// obtained.
    #[error("Unable to resolve principal '{name}': {source}")]
    PrincipalResolution {
        name: String,
        #[source]
        source: ProtocolError,
    },

    /// Wrong password, reported apart from the rest of acquisition errors.
    #[error("Password incorrect for '{principal}' while {doing}")]
    Authentication {
        principal: String,
        doing: &'static str,
        #[source]
        source: ProtocolError,
    },

    #[error("{source} while {doing}")]
    Acquisition {
        doing: String,
        #[source]
        source: ProtocolError,
    },

    /// The credentials were obtained but could not be written to the cache.
    #[error("{source} while {doing}")]
    CacheWrite {
        doing: &'static str,
        #[source]
        source: ProtocolError,
    },

    #[error("Unable to decode ticket: {0}")]
    TicketDecode(#[source] ProtocolError),

    #[error("{source} while unparsing {what} name")]
    Unparse {
        what: &'static str,
        #[source]
        source: ProtocolError,
    },

    #[error("{source} while {step}")]
    TokenExchange {
        step: &'static str,
        #[source]
        source: ProtocolError,
    },

    /// The cache cannot be opened for reading. Usually it has never been
    /// initialized, so callers may take it as an empty cache.
    #[error("Ticket cache {cache} unavailable: {source}")]
    CacheUnavailable {
        cache: String,
        #[source]
        source: ProtocolError,
    },

    #[error("{source} while {doing}")]
    CacheIteration {
        doing: &'static str,
        #[source]
        source: ProtocolError,
    },

    #[error("Ticket cache NOT destroyed: {0}")]
    CacheDestroy(#[source] ProtocolError),

    /// The context cache was destroyed; a new context must be opened.
    #[error("No credentials cache open in context")]
    NoCache,
}

impl Error {
    pub fn is_cache_unavailable(&self) -> bool {
        if let Error::CacheUnavailable { .. } = self {
            return true;
        }
        return false;
    }

    pub fn is_authentication_error(&self) -> bool {
        if let Error::Authentication { .. } = self {
            return true;
        }
        return false;
    }

    /// The underlying collaborator error, if any.
    pub fn protocol_error(&self) -> Option<&ProtocolError> {
        match self {
            Error::ProtocolInit(source)
            | Error::TicketDecode(source)
            | Error::CacheDestroy(source) => Some(source),
            Error::CacheResolution { source, .. }
            | Error::PrincipalResolution { source, .. }
            | Error::Authentication { source, .. }
            | Error::Acquisition { source, .. }
            | Error::CacheWrite { source, .. }
            | Error::Unparse { source, .. }
            | Error::TokenExchange { source, .. }
            | Error::CacheUnavailable { source, .. }
            | Error::CacheIteration { source, .. } => Some(source),
            Error::NoCache => None,
        }
    }

    /// Kerberos protocol code of the underlying failure, when there is one.
    pub fn code(&self) -> Option<i32> {
        return self.protocol_error().and_then(|err| err.code());
    }
}

//! Collaborator seams of the context: the protocol session that talks to the
//! KDC and the credentials cache where tickets are kept.

use super::{Principal, TicketCred, TicketCreds};
use chrono::{DateTime, Duration, Utc};
use kerberos_asn1::{KrbError, Ticket};
use kerberos_constants::error_codes;
use log::debug;
use std::io;
use std::result;
use thiserror::Error;

pub type ProtoResult<T> = result::Result<T, ProtocolError>;

/// Errors raised by the protocol session or the credentials cache.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Error code sent back by the KDC in a KRB-ERROR message.
    #[error("{}", kdc_error_message(.0))]
    Kdc(i32),

    /// A message could not be decrypted with the given key.
    #[error("Decrypt integrity check failed")]
    BadIntegrity,

    #[error("No credentials cache found ({0})")]
    NoCacheFile(String),

    #[error("Unknown credential cache type '{0}'")]
    UnknownCacheType(String),

    #[error("Matching credential not found ({0})")]
    NotFound(String),

    #[error("Malformed principal name '{0}'")]
    MalformedPrincipal(String),

    #[error("Cannot read password: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}: {1}")]
    Io(String, #[source] io::Error),

    #[error("{0}")]
    Data(String),

    /// A cache entry that cannot be turned into a credential. The cursor
    /// has already moved past it.
    #[error("Unreadable cache entry: {0}")]
    BadEntry(String),
}

fn kdc_error_message(code: &i32) -> String {
    return format!(
        "KDC error {}: {}",
        code,
        error_codes::error_code_to_string(*code)
    );
}

impl ProtocolError {
    /// Kerberos error code equivalent to this error, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Kdc(code) => Some(*code),
            Self::BadIntegrity => Some(error_codes::KRB_AP_ERR_BAD_INTEGRITY),
            _ => None,
        }
    }

    /// Whether the error means that the password (or the key derived from
    /// it) does not belong to the principal.
    pub fn is_bad_password(&self) -> bool {
        match self.code() {
            Some(error_codes::KDC_ERR_PREAUTH_FAILED)
            | Some(error_codes::KRB_AP_ERR_BAD_INTEGRITY) => true,
            _ => false,
        }
    }

    pub fn is_no_cache_file(&self) -> bool {
        if let Self::NoCacheFile(_) = self {
            return true;
        }
        return false;
    }

    pub fn is_not_found_error(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(_, err) => err.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    pub fn is_data_error(&self) -> bool {
        if let Self::Data(_) = self {
            return true;
        }
        return false;
    }

    pub fn is_bad_entry(&self) -> bool {
        if let Self::BadEntry(_) = self {
            return true;
        }
        return false;
    }
}

impl From<KrbError> for ProtocolError {
    fn from(krb_error: KrbError) -> Self {
        return Self::Kdc(krb_error.error_code);
    }
}

impl From<String> for ProtocolError {
    fn from(error: String) -> Self {
        return Self::Data(error);
    }
}

impl From<&str> for ProtocolError {
    fn from(error: &str) -> Self {
        return Self::Data(error.to_string());
    }
}

impl From<(&str, io::Error)> for ProtocolError {
    fn from((message, error): (&str, io::Error)) -> Self {
        return Self::Io(message.to_string(), error);
    }
}

impl From<(String, io::Error)> for ProtocolError {
    fn from((message, error): (String, io::Error)) -> Self {
        return Self::Io(message, error);
    }
}

/// Optional settings of an initial ticket request. Unset fields keep the
/// defaults of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitCredsOptions {
    pub lifetime: Option<Duration>,
    pub renew_lifetime: Option<Duration>,
    pub start_time: Option<DateTime<Utc>>,
    pub forwardable: Option<bool>,
    pub proxiable: Option<bool>,
}

/// Source of the password used to obtain initial tickets.
pub trait Prompter {
    /// Asks for the secret described by `banner`. `None` means that the
    /// user cancelled the prompt.
    fn prompt_password(&mut self, banner: &str) -> Option<String>;
}

impl<F> Prompter for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn prompt_password(&mut self, banner: &str) -> Option<String> {
        return self(banner);
    }
}

/// Position of a sequential read over a credentials cache.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheCursor {
    position: usize,
}

impl CacheCursor {
    pub fn new() -> Self {
        return Self::default();
    }

    pub fn position(&self) -> usize {
        return self.position;
    }

    pub fn advance(&mut self) {
        self.position += 1;
    }
}

/// A named store of credentials for a single default principal.
pub trait CredentialCache {
    /// Full name of the cache, with its type prefix.
    fn name(&self) -> String;

    /// Default principal of the cache.
    fn principal(&self) -> ProtoResult<Principal>;

    /// Removes every credential and sets the default principal.
    fn initialize(&mut self, principal: &Principal) -> ProtoResult<()>;

    /// Adds a credential, replacing any other for the same client and
    /// server.
    fn store(&mut self, cred: &TicketCred) -> ProtoResult<()>;

    /// Enables (or disables) the exclusive mode, where the cache is kept
    /// open and locked between reads.
    fn set_exclusive(&mut self, exclusive: bool) -> ProtoResult<()>;

    fn start_seq(&mut self) -> ProtoResult<CacheCursor>;

    /// Returns the next credential, or `None` at the end of the cache.
    /// An entry that cannot be read gives `BadEntry` and the following
    /// call continues with the next one.
    fn next_cred(
        &mut self,
        cursor: &mut CacheCursor,
    ) -> ProtoResult<Option<TicketCred>>;

    fn end_seq(&mut self, cursor: CacheCursor) -> ProtoResult<()>;

    /// Removes the cache from its storage.
    fn destroy(&mut self) -> ProtoResult<()>;
}

/// Protocol library state: name handling, cache resolution and the
/// ticket exchanges with the KDC.
pub trait KrbSession {
    fn default_cache_name(&self) -> String;

    fn resolve_cache(&self, name: &str)
        -> ProtoResult<Box<dyn CredentialCache>>;

    fn parse_name(&self, name: &str) -> ProtoResult<Principal>;

    fn unparse_name(&self, principal: &Principal) -> ProtoResult<String>;

    /// Builds the principal of `service` running at `hostname`, resolving
    /// the realm from the host name.
    fn host_based_principal(
        &self,
        service: &str,
        hostname: &str,
    ) -> ProtoResult<Principal>;

    /// Gets initial credentials with a password obtained from `prompter`.
    fn acquire_initial(
        &self,
        client: &Principal,
        service: Option<&str>,
        prompter: &mut dyn Prompter,
        options: &InitCredsOptions,
    ) -> ProtoResult<TicketCred>;

    /// Validates a postdated ticket stored in `cache`.
    fn validate(
        &self,
        cache: &mut dyn CredentialCache,
        client: &Principal,
        service: Option<&str>,
    ) -> ProtoResult<TicketCred>;

    /// Renews a ticket stored in `cache`.
    fn renew(
        &self,
        cache: &mut dyn CredentialCache,
        client: &Principal,
        service: Option<&str>,
    ) -> ProtoResult<TicketCred>;

    /// Gets a ticket for `server`, from `cache` or from the KDC with a
    /// TGT found in `cache`. New tickets are stored in `cache`.
    fn request_credentials(
        &self,
        cache: &mut dyn CredentialCache,
        client: &Principal,
        server: &Principal,
    ) -> ProtoResult<TicketCred>;

    fn decode_ticket(&self, raw: &[u8]) -> ProtoResult<Ticket>;

    fn enctype_name(&self, etype: i32) -> Option<String>;
}

/// Reads every credential of the cache, in order. Unreadable entries are
/// left out.
pub fn read_all(cache: &mut dyn CredentialCache) -> ProtoResult<TicketCreds> {
    let mut creds = TicketCreds::empty();
    let mut cursor = cache.start_seq()?;
    loop {
        match cache.next_cred(&mut cursor) {
            Ok(Some(cred)) => creds.push(cred),
            Ok(None) => break,
            Err(err) if err.is_bad_entry() => {
                debug!("Skipping entry of {}: {}", cache.name(), err)
            }
            Err(err) => return Err(err),
        }
    }
    cache.end_seq(cursor)?;
    return Ok(creds);
}

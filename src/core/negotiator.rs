//! Security context establishment over the tickets of a cache.

use super::principal::Principal;
use super::protocol::{CredentialCache, ProtoResult};
use super::ticket_cred::TicketCreds;
use kerberos_asn1::EncryptionKey;
use std::fmt;

/// Imported target name of a security context, `service@hostname`.
#[derive(Debug, Clone, PartialEq)]
pub struct GssName {
    pub display: String,
    pub principal: Principal,
}

impl GssName {
    pub fn new(display: String, principal: Principal) -> Self {
        return Self { display, principal };
    }
}

impl fmt::Display for GssName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

/// Initiator credential: the cache principal and its tickets.
#[derive(Debug, Clone)]
pub struct GssCredential {
    pub client: Principal,
    pub creds: TicketCreds,
}

impl GssCredential {
    pub fn new(client: Principal, creds: TicketCreds) -> Self {
        return Self { client, creds };
    }
}

/// Initiator side of an established (or in progress) security context.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    pub target: Principal,
    pub session_key: EncryptionKey,
}

/// Builds the initial token of a mutual authentication exchange with
/// confidentiality requested.
pub trait Negotiator {
    /// Imports a host based service name, `service@hostname`.
    fn import_name(&self, target: &str) -> ProtoResult<GssName>;

    fn acquire_credential(
        &self,
        cache: &mut dyn CredentialCache,
    ) -> ProtoResult<GssCredential>;

    /// Returns the context together with the token to send to the target.
    fn init_sec_context(
        &self,
        credential: &GssCredential,
        target: &GssName,
    ) -> ProtoResult<(SecurityContext, Vec<u8>)>;
}

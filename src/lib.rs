//! Kerberos credential cache coordination.
//!
//! `krbcache` acquires, stores, enumerates and renews Kerberos tickets on
//! behalf of a principal. A [`Context`] bundles a protocol session with a
//! resolved credentials cache; ticket acquisition and cache enumeration are
//! operations over that context, and every ticket handed back to the caller
//! is a normalized [`TicketRecord`].
//!
//! ```no_run
//! use krbcache::Context;
//!
//! # fn run() -> krbcache::Result<()> {
//! let mut context = Context::open(None)?;
//! let list = context.list_cache()?;
//! println!("Principal: {}", list.default_principal);
//! for ticket in list.iter() {
//!     println!("{} ({})", ticket.server_name, ticket.flags);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod native;

pub use crate::core::{
    AcquisitionRequest, CacheCursor, Context, CredentialCache,
    DiagnosticSink, ExchangeToken, GssCredential, GssName, InitCredsOptions,
    KinitAction, KrbSession, LogSink, Negotiator, Principal, Prompter,
    ProtocolError, SecurityContext, TicketCred, TicketCreds, TicketList,
    TicketRecord, LEGACY_CACHE_NAME,
};
pub use crate::error::{Error, Result};

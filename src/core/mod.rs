mod acquire;
mod enumerate;

mod context;
pub use context::Context;

mod diagnostics;
pub use diagnostics::{DiagnosticSink, LogSink};

mod legacy;
pub use legacy::LEGACY_CACHE_NAME;

mod negotiator;
pub use negotiator::{GssCredential, GssName, Negotiator, SecurityContext};

mod principal;
pub use principal::{Principal, TGS_NAME};

mod protocol;
pub use protocol::{
    read_all, CacheCursor, CredentialCache, InitCredsOptions, KrbSession,
    ProtoResult, Prompter, ProtocolError,
};

mod record;
pub use record::{
    build_record, decode_token, encode_token, ExchangeToken, TicketList,
    TicketRecord,
};

mod request;
pub use request::{AcquisitionRequest, KinitAction};

pub mod stringifier;

mod ticket_cred;
pub use ticket_cred::{TicketCred, TicketCreds};

#[cfg(test)]
pub(crate) mod mock;

//! Native protocol collaborator: talks to the KDCs directly and keeps the
//! credentials in ccache or KRB-CRED files.

mod cipher;
pub use cipher::{Cipher, DEFAULT_ETYPE};

pub mod communication;

mod config;
pub use config::{parse_duration, Krb5Config, CCACHE_ENVVAR, CONFIG_ENVVAR};

mod cred_format;
pub use cred_format::CredFormat;

pub mod forge;

mod gss;
pub use gss::{unwrap_initial_token, wrap_initial_token, KrbNegotiator};

pub mod requesters;

mod session;
pub use session::NativeSession;

pub mod vault;
pub use vault::FileCCache;

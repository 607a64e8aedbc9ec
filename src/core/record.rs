//! Normalized description of a ticket, as returned to the callers.

use super::principal::Principal;
use super::protocol::{KrbSession, ProtocolError};
use super::stringifier::{etype_label, ticket_flags_to_codes};
use super::ticket_cred::TicketCred;
use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use kerberos_asn1::Ticket;
use std::slice::Iter;

/// Token produced by a security context initiation, together with its
/// base64 form.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeToken {
    token: Vec<u8>,
    encoded: String,
}

impl ExchangeToken {
    pub fn new(token: Vec<u8>) -> Self {
        let encoded = encode_token(&token);
        return Self { token, encoded };
    }

    pub fn token(&self) -> &[u8] {
        return &self.token;
    }

    pub fn len(&self) -> usize {
        return self.token.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.token.is_empty();
    }

    pub fn base64(&self) -> &str {
        return &self.encoded;
    }

    pub fn base64_len(&self) -> usize {
        return self.encoded.len();
    }
}

/// Standard base64 with padding.
pub fn encode_token(token: &[u8]) -> String {
    return STANDARD.encode(token);
}

pub fn decode_token(encoded: &str) -> std::result::Result<Vec<u8>, ProtocolError> {
    return STANDARD.decode(encoded).map_err(|err| {
        ProtocolError::Data(format!("Invalid base64 token: {}", err))
    });
}

#[derive(Debug, Clone)]
pub struct TicketRecord {
    pub client_name: String,
    pub server_name: String,
    pub auth_time: DateTime<Utc>,
    /// Equal to `auth_time` when the ticket has no explicit start time.
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub renew_till: Option<DateTime<Utc>>,
    pub flags: String,
    pub key_enctype: String,
    pub ticket_enctype: String,
    /// DER encoding of the ticket.
    pub data: Vec<u8>,
    pub exchange_token: Option<ExchangeToken>,
    pub credential: TicketCred,
    pub ticket: Ticket,
}

impl TicketRecord {
    pub fn data_size(&self) -> usize {
        return self.data.len();
    }

    /// Key version number of the service key that encrypts the ticket.
    pub fn kvno(&self) -> Option<u32> {
        return self.ticket.enc_part.kvno.map(|kvno| kvno as u32);
    }

    pub fn is_tgt(&self) -> bool {
        return self.credential.is_tgt();
    }

    pub fn attach_exchange_token(&mut self, token: Vec<u8>) {
        self.exchange_token = Some(ExchangeToken::new(token));
    }
}

/// Builds the record of a credential and its decoded ticket.
pub fn build_record(
    session: &dyn KrbSession,
    credential: TicketCred,
    ticket: Ticket,
) -> Result<TicketRecord> {
    let client = credential.client().ok_or_else(|| Error::Unparse {
        what: "client",
        source: ProtocolError::Data("credential without client name".into()),
    })?;
    let client_name = unparse(session, &client, "client")?;
    let server_name = unparse(session, &credential.server(), "server")?;

    let cred_info = &credential.cred_info;
    let auth_time = cred_info
        .authtime
        .as_ref()
        .or(cred_info.starttime.as_ref())
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| {
            Error::TicketDecode(ProtocolError::Data(
                "credential without authentication time".into(),
            ))
        })?;
    let start_time = cred_info
        .starttime
        .as_ref()
        .map(|time| time.with_timezone(&Utc))
        .unwrap_or(auth_time);
    let end_time = credential.end_time().ok_or_else(|| {
        Error::TicketDecode(ProtocolError::Data(
            "credential without end time".into(),
        ))
    })?;
    let renew_till = cred_info
        .renew_till
        .as_ref()
        .map(|time| time.with_timezone(&Utc));

    let key_etype = cred_info.key.keytype;
    let ticket_etype = ticket.enc_part.etype;

    return Ok(TicketRecord {
        client_name,
        server_name,
        auth_time,
        start_time,
        end_time,
        renew_till,
        flags: ticket_flags_to_codes(credential.flags()),
        key_enctype: etype_label(session.enctype_name(key_etype), key_etype),
        ticket_enctype: etype_label(
            session.enctype_name(ticket_etype),
            ticket_etype,
        ),
        data: credential.raw_ticket(),
        exchange_token: None,
        credential,
        ticket,
    });
}

fn unparse(
    session: &dyn KrbSession,
    principal: &Principal,
    what: &'static str,
) -> Result<String> {
    return session
        .unparse_name(principal)
        .map_err(|source| Error::Unparse { what, source });
}

/// Tickets of a cache together with its default principal.
#[derive(Debug, Clone, Default)]
pub struct TicketList {
    pub default_principal: String,
    pub tickets: Vec<TicketRecord>,
}

impl TicketList {
    pub fn new(default_principal: String) -> Self {
        return Self {
            default_principal,
            tickets: Vec::new(),
        };
    }

    pub fn push(&mut self, record: TicketRecord) {
        self.tickets.push(record);
    }

    pub fn iter(&self) -> Iter<TicketRecord> {
        return self.tickets.iter();
    }

    pub fn len(&self) -> usize {
        return self.tickets.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.tickets.is_empty();
    }

    /// Records of ticket granting tickets only.
    pub fn tgts(&self) -> Vec<&TicketRecord> {
        return self.tickets.iter().filter(|t| t.is_tgt()).collect();
    }
}

impl IntoIterator for TicketList {
    type Item = TicketRecord;
    type IntoIter = std::vec::IntoIter<TicketRecord>;

    fn into_iter(self) -> Self::IntoIter {
        return self.tickets.into_iter();
    }
}

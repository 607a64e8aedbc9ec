//! Structs to handle tickets together with their associated KrbCredInfo

use super::principal::Principal;
use super::protocol::ProtocolError;
use chrono::{DateTime, Utc};
use kerberos_asn1::{
    Asn1Object, EncKrbCredPart, EncryptedData, KrbCred, KrbCredInfo, Ticket,
};
use kerberos_constants::etypes::NO_ENCRYPTION;
use kerberos_constants::ticket_flags;
use std::convert::TryFrom;
use std::slice::Iter;

#[derive(Debug, Clone, Default)]
pub struct TicketCreds {
    pub ticket_creds: Vec<TicketCred>,
}

impl TicketCreds {
    pub fn new(ticket_creds: Vec<TicketCred>) -> Self {
        return Self { ticket_creds };
    }

    pub fn empty() -> Self {
        return Self::new(Vec::new());
    }

    pub fn push(&mut self, ticket_info: TicketCred) {
        self.ticket_creds.push(ticket_info);
    }

    pub fn iter(&self) -> Iter<TicketCred> {
        return self.ticket_creds.iter();
    }

    pub fn len(&self) -> usize {
        return self.ticket_creds.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.ticket_creds.is_empty();
    }

    pub fn get(&self, index: usize) -> Option<&TicketCred> {
        return self.ticket_creds.get(index);
    }

    pub fn first(&self) -> Option<&TicketCred> {
        return self.ticket_creds.first();
    }

    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&TicketCred) -> bool,
    {
        self.iter()
            .filter(|tci| predicate(tci))
            .cloned()
            .collect::<Vec<TicketCred>>()
            .into()
    }

    /// Filter tickets of the given client.
    pub fn client(&self, client: &Principal) -> Self {
        self.filter(|tci| match tci.client() {
            Some(pclient) => pclient.same_name(client),
            None => false,
        })
    }

    /// Filter tickets for the given service, realm included.
    pub fn server(&self, server: &Principal) -> Self {
        self.filter(|tci| tci.server().same_name(server))
    }

    /// Filter tickets for flags. All the tickets that includes the flags
    /// provided will match. The tickets can also have additional flags.
    pub fn flags(&self, flags: u32) -> Self {
        self.filter(|tci| (tci.flags() & flags) != 0)
    }

    /// Filter to only returns TGTs.
    pub fn tgt(&self) -> Self {
        self.filter(|tci| tci.is_tgt())
    }

    /// Filter to only returns TGTs for a given realm.
    pub fn tgt_realm(&self, realm: &str) -> Self {
        return self.server(&Principal::krbtgt(realm));
    }

    /// Filter out the tickets expired at `now`.
    pub fn valid_at(&self, now: &DateTime<Utc>) -> Self {
        self.filter(|tci| !tci.is_expired(now))
    }

    /// Adds the ticket, replacing the one with the same client and server
    /// if there is any.
    pub fn replace_or_push(&mut self, ticket_cred: TicketCred) {
        let client = ticket_cred.client();
        let server = ticket_cred.server();
        let position = self.ticket_creds.iter().position(|tci| {
            tci.server().same_name(&server)
                && match (tci.client(), &client) {
                    (Some(a), Some(b)) => a.same_name(b),
                    (None, None) => true,
                    _ => false,
                }
        });

        match position {
            Some(index) => self.ticket_creds[index] = ticket_cred,
            None => self.ticket_creds.push(ticket_cred),
        }
    }
}

impl From<TicketCreds> for KrbCred {
    fn from(creds: TicketCreds) -> Self {
        let mut krb_cred = KrbCred::default();
        let mut tickets = Vec::with_capacity(creds.ticket_creds.len());
        let mut cred_infos = Vec::with_capacity(creds.ticket_creds.len());

        for ticket_cred_info in creds.ticket_creds {
            tickets.push(ticket_cred_info.ticket);
            cred_infos.push(ticket_cred_info.cred_info);
        }

        krb_cred.tickets = tickets;
        let mut cred_part = EncKrbCredPart::default();
        cred_part.ticket_info = cred_infos;
        krb_cred.enc_part =
            EncryptedData::new(NO_ENCRYPTION, None, cred_part.build());
        return krb_cred;
    }
}

/// Convert from Kerberos credentials in plain text, the usual way of storing
/// them in machines. In case the credentials are encrypted this will fail.
impl TryFrom<KrbCred> for TicketCreds {
    type Error = ProtocolError;

    fn try_from(krb_cred: KrbCred) -> Result<Self, ProtocolError> {
        if krb_cred.enc_part.etype != NO_ENCRYPTION {
            return Err(ProtocolError::Data(format!(
                "Unable to decrypt the credentials"
            )));
        }

        let (_, cred_part) = EncKrbCredPart::parse(&krb_cred.enc_part.cipher)
            .map_err(|_| {
            ProtocolError::Data(format!(
                "Error parsing credentials: EncKrbCredPart"
            ))
        })?;

        let tickets = krb_cred.tickets;
        let cred_infos = cred_part.ticket_info;

        return Ok((tickets, cred_infos).into());
    }
}

impl From<(Vec<Ticket>, Vec<KrbCredInfo>)> for TicketCreds {
    fn from((tickets, cred_infos): (Vec<Ticket>, Vec<KrbCredInfo>)) -> Self {
        let mut ticket_cred_infos = Vec::with_capacity(tickets.len());

        for (ticket, cred_info) in
            tickets.into_iter().zip(cred_infos.into_iter())
        {
            ticket_cred_infos.push(TicketCred::new(ticket, cred_info));
        }

        return Self::new(ticket_cred_infos);
    }
}

impl From<Vec<TicketCred>> for TicketCreds {
    fn from(v: Vec<TicketCred>) -> Self {
        return Self::new(v);
    }
}

impl From<TicketCred> for TicketCreds {
    fn from(ticket_info: TicketCred) -> Self {
        return Self::new(vec![ticket_info]);
    }
}

impl IntoIterator for TicketCreds {
    type Item = TicketCred;
    type IntoIter = std::vec::IntoIter<TicketCred>;

    fn into_iter(self) -> Self::IntoIter {
        return self.ticket_creds.into_iter();
    }
}

/// Struct to store a ticket and the related user info, like the session key.
#[derive(Debug, Clone)]
pub struct TicketCred {
    pub ticket: Ticket,
    pub cred_info: KrbCredInfo,
}

impl TicketCred {
    pub fn new(ticket: Ticket, cred_info: KrbCredInfo) -> Self {
        return Self { ticket, cred_info };
    }

    /// Client of the ticket, if the credential info names it.
    pub fn client(&self) -> Option<Principal> {
        let pname = self.cred_info.pname.as_ref()?;
        let prealm = self.cred_info.prealm.as_ref()?;
        return Some(Principal::new(pname.clone(), prealm.clone()));
    }

    /// Service of the ticket. Taken from the credential info, or from the
    /// ticket itself when the info lacks it.
    pub fn server(&self) -> Principal {
        let sname = self
            .cred_info
            .sname
            .clone()
            .unwrap_or_else(|| self.ticket.sname.clone());
        let srealm = self
            .cred_info
            .srealm
            .clone()
            .unwrap_or_else(|| self.ticket.realm.clone());
        return Principal::new(sname, srealm);
    }

    pub fn flags(&self) -> u32 {
        return self
            .cred_info
            .flags
            .as_ref()
            .map(|flags| flags.flags)
            .unwrap_or(0);
    }

    pub fn is_tgt(&self) -> bool {
        return self.server().is_tgs();
    }

    pub fn is_initial(&self) -> bool {
        return (self.flags() & ticket_flags::INITIAL) != 0;
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        return self
            .cred_info
            .endtime
            .as_ref()
            .map(|endtime| endtime.with_timezone(&Utc));
    }

    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        match self.end_time() {
            Some(end_time) => end_time <= *now,
            None => false,
        }
    }

    /// DER encoding of the ticket.
    pub fn raw_ticket(&self) -> Vec<u8> {
        return self.ticket.build();
    }
}

impl From<(Ticket, KrbCredInfo)> for TicketCred {
    fn from((t, kci): (Ticket, KrbCredInfo)) -> Self {
        return Self::new(t, kci);
    }
}

use super::senders::send_recv_as;
use crate::core::{Principal, ProtoResult, TicketCred};
use crate::native::communication::KdcComm;
use crate::native::forge::{
    build_as_req, extract_ticket_cred_from_as_rep, TicketTimes,
};
use crate::native::Cipher;
use log::debug;

/// Uses the client password key to request a TGT, or the ticket of
/// `server` when given.
pub fn request_tgt(
    client: &Principal,
    server: Option<&Principal>,
    cipher: &Cipher,
    times: &TicketTimes,
    kdccomm: &KdcComm,
) -> ProtoResult<TicketCred> {
    let as_req = build_as_req(client, server, cipher, times);
    let as_rep = send_recv_as(kdccomm, &client.realm, &as_req)?;

    let cred = extract_ticket_cred_from_as_rep(as_rep, cipher)?;
    debug!("AS-REP for {} with ticket for {}", client, cred.server());
    return Ok(cred);
}

use super::senders::send_recv_tgs;
use crate::core::{Principal, ProtoResult, ProtocolError, TicketCred};
use crate::native::communication::KdcComm;
use crate::native::forge::{build_tgs_req, extract_ticket_cred_from_tgs_rep};
use crate::native::Cipher;
use log::debug;
use std::convert::TryFrom;

const MAX_REFERRAL_HOPS: usize = 5;

/// Request a TGS for the desired service by handling the possible referral
/// tickets.
pub fn request_regular_tgs(
    client: &Principal,
    server: &Principal,
    tgt: TicketCred,
    kdccomm: &KdcComm,
) -> ProtoResult<TicketCred> {
    let mut tgs = request_tgs(client, &client.realm, server, tgt, 0, kdccomm)?;

    let mut hops = 0;
    while tgs.is_tgt() && !tgs.server().same_name(server) {
        if hops == MAX_REFERRAL_HOPS {
            return Err(ProtocolError::Data(format!(
                "Too many referrals requesting {}",
                server
            )));
        }
        hops += 1;

        let referral_tgt = tgs;
        let referral_realm = referral_tgt
            .server()
            .tgs_realm()
            .ok_or_else(|| {
                ProtocolError::Data(
                    "Unable to get the referral TGT domain".into(),
                )
            })?
            .to_string();

        debug!("{} referral TGT for {}", referral_realm, client);

        tgs = request_tgs(
            client,
            &referral_realm,
            server,
            referral_tgt,
            0,
            kdccomm,
        )?;
    }

    debug!("{} TGS for {}", server, client);
    return Ok(tgs);
}

/// Presents `ticket` to the KDC of `realm` to obtain a ticket for
/// `server`, with `extra_options` added to the request.
pub fn request_tgs(
    client: &Principal,
    realm: &str,
    server: &Principal,
    ticket: TicketCred,
    extra_options: u32,
    kdccomm: &KdcComm,
) -> ProtoResult<TicketCred> {
    let cipher = Cipher::try_from(&ticket.cred_info.key)?;
    let tgs_req = build_tgs_req(
        client,
        realm,
        server,
        ticket.ticket,
        &cipher,
        extra_options,
    );

    let tgs_rep = send_recv_tgs(kdccomm, realm, &tgs_req)?;
    return extract_ticket_cred_from_tgs_rep(tgs_rep, &cipher);
}

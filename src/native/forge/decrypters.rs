use super::krb_cred::new_ticket_cred;
use crate::core::{ProtoResult, ProtocolError, TicketCred};
use crate::native::Cipher;
use kerberos_asn1::{
    AsRep, Asn1Object, EncAsRepPart, EncKdcRepPart, EncTgsRepPart, TgsRep,
};
use kerberos_constants::key_usages;

/// Decrypts the AS-REP enc-part with the key derived from the password.
pub fn extract_ticket_cred_from_as_rep(
    as_rep: AsRep,
    cipher: &Cipher,
) -> ProtoResult<TicketCred> {
    if as_rep.enc_part.etype != cipher.etype() {
        return Err(ProtocolError::Data(format!(
            "Unable to decrypt KDC response AS-REP: mismatch etypes ({} != {})",
            as_rep.enc_part.etype,
            cipher.etype()
        )));
    }

    let raw_enc_part = cipher.decrypt(
        key_usages::KEY_USAGE_AS_REP_ENC_PART,
        &as_rep.enc_part.cipher,
    )?;

    let enc_part = parse_enc_kdc_rep_part(&raw_enc_part, "AS-REP")?;

    return Ok(new_ticket_cred(
        enc_part,
        as_rep.ticket,
        as_rep.crealm,
        as_rep.cname,
    ));
}

/// Decrypts the TGS-REP enc-part with the session key of the presented
/// ticket.
pub fn extract_ticket_cred_from_tgs_rep(
    tgs_rep: TgsRep,
    cipher: &Cipher,
) -> ProtoResult<TicketCred> {
    let raw_enc_part = cipher.decrypt(
        key_usages::KEY_USAGE_TGS_REP_ENC_PART_SESSION_KEY,
        &tgs_rep.enc_part.cipher,
    )?;

    let enc_part = parse_enc_kdc_rep_part(&raw_enc_part, "TGS-REP")?;

    return Ok(new_ticket_cred(
        enc_part,
        tgs_rep.ticket,
        tgs_rep.crealm,
        tgs_rep.cname,
    ));
}

/// Some KDCs tag the AS-REP enc-part as a TGS-REP one, so both are
/// accepted.
fn parse_enc_kdc_rep_part(
    raw: &[u8],
    message: &str,
) -> ProtoResult<EncKdcRepPart> {
    if let Ok((_, enc_part)) = EncAsRepPart::parse(raw) {
        return Ok(enc_part.into());
    }

    let (_, enc_part) = EncTgsRepPart::parse(raw).map_err(|_| {
        ProtocolError::Data(format!("Error decoding {} enc-part", message))
    })?;
    return Ok(enc_part.into());
}

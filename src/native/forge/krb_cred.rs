use crate::core::TicketCred;
use kerberos_asn1::{EncKdcRepPart, KrbCredInfo, PrincipalName, Ticket};

/// Joins the ticket of a KDC reply with its decrypted part.
pub fn new_ticket_cred(
    enc_kdc_rep_part: EncKdcRepPart,
    ticket: Ticket,
    prealm: String,
    pname: PrincipalName,
) -> TicketCred {
    let cred_info = new_krb_cred_info(enc_kdc_rep_part, prealm, pname);
    return TicketCred::new(ticket, cred_info);
}

pub fn new_krb_cred_info(
    enc_kdc_rep_part: EncKdcRepPart,
    prealm: String,
    pname: PrincipalName,
) -> KrbCredInfo {
    return KrbCredInfo {
        key: enc_kdc_rep_part.key,
        prealm: Some(prealm),
        pname: Some(pname),
        flags: Some(enc_kdc_rep_part.flags),
        authtime: Some(enc_kdc_rep_part.authtime),
        starttime: enc_kdc_rep_part.starttime,
        endtime: Some(enc_kdc_rep_part.endtime),
        renew_till: enc_kdc_rep_part.renew_till,
        srealm: Some(enc_kdc_rep_part.srealm),
        sname: Some(enc_kdc_rep_part.sname),
        caddr: enc_kdc_rep_part.caddr,
    };
}

use crate::core::{ProtoResult, ProtocolError};
use crate::native::communication::KdcComm;
use kerberos_asn1::{AsRep, AsReq, Asn1Object, KrbError, TgsRep, TgsReq};
use log::debug;

pub enum Rep {
    AsRep(AsRep),
    TgsRep(TgsRep),
    KrbError(KrbError),
    Raw(Vec<u8>),
}

/// Send an array of bytes, which should be a kerberos request
/// coded in ASN1/DER format and retrieves the response, by parsing
/// it to a known Kerberos response
pub fn send_recv(
    kdccomm: &KdcComm,
    realm: &str,
    raw: &[u8],
) -> ProtoResult<Rep> {
    let raw_rep = kdccomm.send_recv(realm, raw)?;
    return Ok(parse_rep(raw_rep));
}

pub fn parse_rep(raw_rep: Vec<u8>) -> Rep {
    if let Ok((_, krb_error)) = KrbError::parse(&raw_rep) {
        return Rep::KrbError(krb_error);
    }

    if let Ok((_, as_rep)) = AsRep::parse(&raw_rep) {
        return Rep::AsRep(as_rep);
    }

    if let Ok((_, rep)) = TgsRep::parse(&raw_rep) {
        return Rep::TgsRep(rep);
    }

    return Rep::Raw(raw_rep);
}

/// Function to send a TGS-REQ message and receive a TGS-REP
pub fn send_recv_tgs(
    kdccomm: &KdcComm,
    realm: &str,
    req: &TgsReq,
) -> ProtoResult<TgsRep> {
    match send_recv(kdccomm, realm, &req.build())? {
        Rep::KrbError(krb_error) => {
            debug!("KRB-ERROR {} to TGS-REQ", krb_error.error_code);
            return Err(krb_error.into());
        }

        Rep::Raw(_) => {
            return Err(ProtocolError::Data("Error parsing response".into()));
        }

        Rep::AsRep(_) => {
            return Err(ProtocolError::Data(
                "Unexpected: server responded with AS-REP to TGS-REQ".into(),
            ));
        }

        Rep::TgsRep(tgs_rep) => {
            return Ok(tgs_rep);
        }
    }
}

/// Function to send an AS-REQ message and receive an AS-REP
pub fn send_recv_as(
    kdccomm: &KdcComm,
    realm: &str,
    req: &AsReq,
) -> ProtoResult<AsRep> {
    match send_recv(kdccomm, realm, &req.build())? {
        Rep::KrbError(krb_error) => {
            debug!("KRB-ERROR {} to AS-REQ", krb_error.error_code);
            return Err(krb_error.into());
        }

        Rep::Raw(_) => {
            return Err(ProtocolError::Data("Error parsing response".into()));
        }

        Rep::AsRep(as_rep) => {
            return Ok(as_rep);
        }

        Rep::TgsRep(_) => {
            return Err(ProtocolError::Data(
                "Unexpected: server responded with a TGS-REP to an AS-REQ"
                    .into(),
            ));
        }
    }
}

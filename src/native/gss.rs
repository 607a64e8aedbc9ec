//! Initiator side of the Kerberos V5 GSS-API mechanism: the AP-REQ of the
//! first context token, framed as an RFC 2743 initial token.

use crate::core::{
    read_all, CredentialCache, GssCredential, GssName, Negotiator, Principal,
    ProtoResult, ProtocolError, SecurityContext,
};
use crate::native::forge::new_gss_ap_req;
use crate::native::{Cipher, Krb5Config};
use chrono::Utc;
use kerberos_asn1::Asn1Object;
use log::debug;
use std::convert::TryFrom;

/// Tag of an initial context token.
const INITIAL_TOKEN_TAG: u8 = 0x60;

/// DER encoding of the Kerberos V5 mechanism OID, 1.2.840.113554.1.2.2.
const KRB5_MECH_OID: [u8; 11] =
    [0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x12, 0x01, 0x02, 0x02];

const AP_REQ_TOKEN_ID: [u8; 2] = [0x01, 0x00];

pub struct KrbNegotiator {
    config: Krb5Config,
}

impl KrbNegotiator {
    pub fn new(config: Krb5Config) -> Self {
        return Self { config };
    }
}

impl Negotiator for KrbNegotiator {
    fn import_name(&self, target: &str) -> ProtoResult<GssName> {
        let (service, host) = target
            .split_once('@')
            .filter(|(service, host)| !service.is_empty() && !host.is_empty())
            .ok_or_else(|| ProtocolError::MalformedPrincipal(target.into()))?;

        let host = host.trim_end_matches('.').to_lowercase();
        let realm = self.config.host_realm(&host).ok_or_else(|| {
            ProtocolError::Config(format!(
                "Cannot determine realm for host {}",
                host
            ))
        })?;

        let principal = Principal::host_service(service, &host, &realm);
        return Ok(GssName::new(target.to_string(), principal));
    }

    fn acquire_credential(
        &self,
        cache: &mut dyn CredentialCache,
    ) -> ProtoResult<GssCredential> {
        let client = cache.principal()?;
        let creds = read_all(cache)?.client(&client);
        return Ok(GssCredential::new(client, creds));
    }

    fn init_sec_context(
        &self,
        credential: &GssCredential,
        target: &GssName,
    ) -> ProtoResult<(SecurityContext, Vec<u8>)> {
        let now = Utc::now();
        let cred = credential
            .creds
            .server(&target.principal)
            .valid_at(&now)
            .first()
            .cloned()
            .ok_or_else(|| {
                ProtocolError::NotFound(format!(
                    "no ticket for {}",
                    target.principal
                ))
            })?;

        let cipher = Cipher::try_from(&cred.cred_info.key)?;
        let ap_req = new_gss_ap_req(&credential.client, cred.ticket, &cipher);
        let token = wrap_initial_token(&ap_req.build());
        debug!("Initial context token for {}", target);

        let context = SecurityContext {
            target: target.principal.clone(),
            session_key: cred.cred_info.key,
        };
        return Ok((context, token));
    }
}

/// Frames an AP-REQ as an initial context token: tag, length, mechanism
/// OID, token id and the message.
pub fn wrap_initial_token(ap_req: &[u8]) -> Vec<u8> {
    let mut inner = KRB5_MECH_OID.to_vec();
    inner.extend_from_slice(&AP_REQ_TOKEN_ID);
    inner.extend_from_slice(ap_req);

    let mut token = vec![INITIAL_TOKEN_TAG];
    token.append(&mut der_length(inner.len()));
    token.append(&mut inner);
    return token;
}

/// Extracts the AP-REQ from an initial context token.
pub fn unwrap_initial_token(token: &[u8]) -> ProtoResult<&[u8]> {
    let malformed = || ProtocolError::Data("Malformed initial token".into());

    if token.first() != Some(&INITIAL_TOKEN_TAG) {
        return Err(malformed());
    }

    let (length, header) = read_der_length(&token[1..]).ok_or_else(malformed)?;
    let inner = token.get(1 + header..).ok_or_else(malformed)?;
    if inner.len() != length {
        return Err(malformed());
    }

    let prefix_len = KRB5_MECH_OID.len() + AP_REQ_TOKEN_ID.len();
    if inner.len() < prefix_len
        || inner[..KRB5_MECH_OID.len()] != KRB5_MECH_OID
        || inner[KRB5_MECH_OID.len()..prefix_len] != AP_REQ_TOKEN_ID
    {
        return Err(malformed());
    }
    return Ok(&inner[prefix_len..]);
}

fn der_length(length: usize) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }

    let bytes: Vec<u8> = length
        .to_be_bytes()
        .iter()
        .skip_while(|b| **b == 0)
        .cloned()
        .collect();

    let mut encoded = vec![0x80 | bytes.len() as u8];
    encoded.extend(bytes);
    return encoded;
}

/// Returns the length and the number of bytes used to encode it.
fn read_der_length(raw: &[u8]) -> Option<(usize, usize)> {
    let first = *raw.first()?;
    if first < 0x80 {
        return Some((first as usize, 1));
    }

    let count = (first & 0x7f) as usize;
    if count == 0 || count > std::mem::size_of::<usize>() {
        return None;
    }

    let mut length = 0;
    for byte in raw.get(1..1 + count)? {
        length = (length << 8) | *byte as usize;
    }
    return Some((length, 1 + count));
}

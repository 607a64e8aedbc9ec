use super::kdc_req::KdcReqBuilder;
use super::pa_data::{new_pa_data_ap_req, new_pa_data_encrypted_timestamp};
use crate::core::{InitCredsOptions, Principal, ProtoResult, ProtocolError};
use crate::native::Cipher;
use chrono::{DateTime, Utc};
use kerberos_asn1::{AsReq, TgsReq, Ticket};
use kerberos_constants::kdc_options;

/// Times and flags asked for in an initial ticket request.
#[derive(Debug, Clone)]
pub struct TicketTimes {
    pub from: Option<DateTime<Utc>>,
    pub till: DateTime<Utc>,
    pub rtime: Option<DateTime<Utc>>,
    pub kdc_options: u32,
}

impl TicketTimes {
    /// Resolves the request options over the configured defaults. Times
    /// out of the representable range give a data error.
    pub fn resolve(
        options: &InitCredsOptions,
        default_lifetime: chrono::Duration,
        default_renew: Option<chrono::Duration>,
        default_forwardable: bool,
        default_proxiable: bool,
    ) -> ProtoResult<Self> {
        let start = options.start_time.unwrap_or_else(Utc::now);
        let lifetime = options.lifetime.unwrap_or(default_lifetime);
        let renew = options.renew_lifetime.or(default_renew);

        let mut flags = 0;
        if options.forwardable.unwrap_or(default_forwardable) {
            flags |= kdc_options::FORWARDABLE;
        }
        if options.proxiable.unwrap_or(default_proxiable) {
            flags |= kdc_options::PROXIABLE;
        }

        let till = add_lifetime(start, lifetime)?;
        let rtime = match renew {
            Some(renew) => Some(add_lifetime(start, renew)?),
            None => None,
        };

        return Ok(Self {
            from: options.start_time,
            till,
            rtime,
            kdc_options: flags,
        });
    }
}

fn add_lifetime(
    start: DateTime<Utc>,
    lifetime: chrono::Duration,
) -> ProtoResult<DateTime<Utc>> {
    return start.checked_add_signed(lifetime).ok_or_else(|| {
        ProtocolError::Data(format!(
            "Ticket lifetime of {} seconds out of range",
            lifetime.num_seconds()
        ))
    });
}

/// Helper to craft an AS-REQ asking a TGT (or the ticket of `server`)
/// for `client`, pre-authenticated with the password key.
pub fn build_as_req(
    client: &Principal,
    server: Option<&Principal>,
    cipher: &Cipher,
    times: &TicketTimes,
) -> AsReq {
    let padata = new_pa_data_encrypted_timestamp(cipher);
    let mut builder = KdcReqBuilder::new(client.realm.clone())
        .cname(Some(client.name.clone()))
        .push_padata(padata)
        .request_pac()
        .etypes(vec![cipher.etype()])
        .add_kdc_option(times.kdc_options)
        .till(times.till);

    if let Some(server) = server {
        builder = builder.sname(Some(server.name.clone()));
    }
    if let Some(from) = times.from {
        builder = builder.from(from);
    }
    if let Some(rtime) = times.rtime {
        builder = builder.rtime(rtime);
    }

    return builder.build_as_req();
}

/// Helper to craft a TGS-REQ for `server`, sent to the KDC of `realm`,
/// presenting `ticket` sealed with its session key. Validation and renewal
/// pass the ticket to refresh together with its own server and the
/// matching KDC option.
pub fn build_tgs_req(
    client: &Principal,
    realm: &str,
    server: &Principal,
    ticket: Ticket,
    cipher: &Cipher,
    extra_options: u32,
) -> TgsReq {
    let padata = new_pa_data_ap_req(client, ticket, cipher);

    return KdcReqBuilder::new(realm.to_string())
        .sname(Some(server.name.clone()))
        .push_padata(padata)
        .add_kdc_option(extra_options)
        .build_tgs_req();
}

use crate::core::stringifier::etype_name;
use crate::core::{
    read_all, CredentialCache, InitCredsOptions, KrbSession, Principal,
    ProtoResult, Prompter, ProtocolError, TicketCred,
};
use crate::native::communication::KdcComm;
use crate::native::forge::TicketTimes;
use crate::native::requesters::{request_regular_tgs, request_tgs, request_tgt};
use crate::native::vault::{FileCCache, FILE_CACHE_PREFIX};
use crate::native::{Cipher, Krb5Config, DEFAULT_ETYPE};
use chrono::Utc;
use kerberos_asn1::{Asn1Object, Ticket};
use kerberos_constants::kdc_options;
use log::{debug, info};

/// Protocol session that talks directly to the KDCs and keeps the
/// credentials in files.
pub struct NativeSession {
    config: Krb5Config,
    kdccomm: KdcComm,
}

impl NativeSession {
    /// Loads the configuration of the system.
    pub fn init() -> ProtoResult<Self> {
        return Ok(Self::new(Krb5Config::load()?));
    }

    pub fn new(config: Krb5Config) -> Self {
        let kdccomm = KdcComm::new(&config);
        return Self { config, kdccomm };
    }

    pub fn config(&self) -> &Krb5Config {
        return &self.config;
    }

    fn ticket_times(
        &self,
        options: &InitCredsOptions,
    ) -> ProtoResult<TicketTimes> {
        return TicketTimes::resolve(
            options,
            self.config.ticket_lifetime,
            self.config.renew_lifetime,
            self.config.forwardable,
            self.config.proxiable,
        );
    }

    /// Target of a validation or renewal: the given service, else the TGS
    /// of the client realm.
    fn refresh_target(
        &self,
        client: &Principal,
        service: Option<&str>,
    ) -> ProtoResult<Principal> {
        match service {
            Some(service) => return self.parse_name(service),
            None => return Ok(Principal::krbtgt(&client.realm)),
        }
    }

    /// Presents the cached ticket of `client` for the target with the
    /// VALIDATE or RENEW option.
    fn refresh(
        &self,
        cache: &mut dyn CredentialCache,
        client: &Principal,
        service: Option<&str>,
        option: u32,
    ) -> ProtoResult<TicketCred> {
        let target = self.refresh_target(client, service)?;
        let cred = read_all(cache)?
            .client(client)
            .server(&target)
            .first()
            .cloned()
            .ok_or_else(|| {
                ProtocolError::NotFound(format!(
                    "no ticket for {} in {}",
                    target,
                    cache.name()
                ))
            })?;

        return request_tgs(
            client,
            &target.realm,
            &target,
            cred,
            option,
            &self.kdccomm,
        );
    }
}

impl KrbSession for NativeSession {
    fn default_cache_name(&self) -> String {
        return self.config.default_ccache_name();
    }

    fn resolve_cache(
        &self,
        name: &str,
    ) -> ProtoResult<Box<dyn CredentialCache>> {
        if let Some(path) = name.strip_prefix(FILE_CACHE_PREFIX) {
            return Ok(Box::new(FileCCache::new(path.to_string())));
        }

        match cache_type(name) {
            Some(cache_type) => {
                return Err(ProtocolError::UnknownCacheType(
                    cache_type.to_string(),
                ));
            }
            None => return Ok(Box::new(FileCCache::new(name.to_string()))),
        }
    }

    fn parse_name(&self, name: &str) -> ProtoResult<Principal> {
        return Principal::parse(name, self.config.default_realm.as_deref());
    }

    fn unparse_name(&self, principal: &Principal) -> ProtoResult<String> {
        return Ok(principal.to_string());
    }

    fn host_based_principal(
        &self,
        service: &str,
        hostname: &str,
    ) -> ProtoResult<Principal> {
        let host = hostname.trim_end_matches('.').to_lowercase();
        let realm = self.config.host_realm(&host).ok_or_else(|| {
            ProtocolError::Config(format!(
                "Cannot determine realm for host {}",
                host
            ))
        })?;
        return Ok(Principal::host_service(service, &host, &realm));
    }

    fn acquire_initial(
        &self,
        client: &Principal,
        service: Option<&str>,
        prompter: &mut dyn Prompter,
        options: &InitCredsOptions,
    ) -> ProtoResult<TicketCred> {
        let server = match service {
            Some(service) => Some(self.parse_name(service)?),
            None => None,
        };

        let banner = format!("Password for {}", client);
        let password = prompter.prompt_password(&banner).ok_or_else(|| {
            ProtocolError::Prompt(format!("no password for {}", client))
        })?;

        let cipher = Cipher::from_password(&password, client, DEFAULT_ETYPE)?;
        let times = self.ticket_times(options)?;

        info!("Requesting initial ticket for {}", client);
        return request_tgt(
            client,
            server.as_ref(),
            &cipher,
            &times,
            &self.kdccomm,
        );
    }

    fn validate(
        &self,
        cache: &mut dyn CredentialCache,
        client: &Principal,
        service: Option<&str>,
    ) -> ProtoResult<TicketCred> {
        return self.refresh(cache, client, service, kdc_options::VALIDATE);
    }

    fn renew(
        &self,
        cache: &mut dyn CredentialCache,
        client: &Principal,
        service: Option<&str>,
    ) -> ProtoResult<TicketCred> {
        return self.refresh(cache, client, service, kdc_options::RENEW);
    }

    fn request_credentials(
        &self,
        cache: &mut dyn CredentialCache,
        client: &Principal,
        server: &Principal,
    ) -> ProtoResult<TicketCred> {
        let now = Utc::now();
        let creds = read_all(cache)?.client(client).valid_at(&now);

        if let Some(cred) = creds.server(server).first() {
            debug!("Using cached ticket for {}", server);
            return Ok(cred.clone());
        }

        let tgt = creds.tgt_realm(&client.realm).first().cloned().ok_or_else(
            || {
                ProtocolError::NotFound(format!(
                    "no TGT for {} in {}",
                    client.realm,
                    cache.name()
                ))
            },
        )?;

        info!("Requesting ticket for {}", server);
        let cred = request_regular_tgs(client, server, tgt, &self.kdccomm)?;
        cache.store(&cred)?;
        return Ok(cred);
    }

    fn decode_ticket(&self, raw: &[u8]) -> ProtoResult<Ticket> {
        let (_, ticket) = Ticket::parse(raw).map_err(|_| {
            ProtocolError::Data("Error decoding ticket".into())
        })?;
        return Ok(ticket);
    }

    fn enctype_name(&self, etype: i32) -> Option<String> {
        return etype_name(etype).map(|name| name.to_string());
    }
}

/// Type prefix of a `TYPE:residual` cache name. Single letters are taken
/// as drive letters of a path.
fn cache_type(name: &str) -> Option<&str> {
    let (prefix, _) = name.split_once(':')?;
    if prefix.len() < 2 || prefix.contains('/') || prefix.contains('\\') {
        return None;
    }
    return Some(prefix);
}

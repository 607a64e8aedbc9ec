use super::resolver::resolve_kdc_entry;
use super::{new_krb_channel, KrbChannel, TransportProtocol};
use crate::core::{ProtoResult, ProtocolError};
use crate::native::Krb5Config;
use log::{debug, warn};
use std::collections::HashMap;
use std::net::SocketAddr;

/// Finds the KDCs of each realm and delivers messages to them.
#[derive(Debug, Clone)]
pub struct KdcComm {
    kdcs: HashMap<String, Vec<String>>,
    udp_preference_limit: usize,
    dns_lookup_kdc: bool,
}

impl KdcComm {
    pub fn new(config: &Krb5Config) -> Self {
        return Self {
            kdcs: config.realms.clone(),
            udp_preference_limit: config.udp_preference_limit,
            dns_lookup_kdc: config.dns_lookup_kdc,
        };
    }

    /// Messages smaller than the UDP preference limit go over UDP.
    pub fn transport_for(&self, message_len: usize) -> TransportProtocol {
        if message_len < self.udp_preference_limit {
            return TransportProtocol::UDP;
        }
        return TransportProtocol::TCP;
    }

    /// Addresses of the KDCs of `realm`: the configured entries, else the
    /// addresses of the realm name itself when DNS lookups are allowed.
    pub fn kdc_addresses(&self, realm: &str) -> ProtoResult<Vec<SocketAddr>> {
        let entries = match self.kdcs.get(realm) {
            Some(entries) if !entries.is_empty() => entries.clone(),
            _ if self.dns_lookup_kdc => vec![realm.to_lowercase()],
            _ => Vec::new(),
        };

        let mut addresses = Vec::new();
        for entry in entries.iter() {
            match resolve_kdc_entry(entry) {
                Ok(mut resolved) => addresses.append(&mut resolved),
                Err(err) => warn!("Unable to resolve KDC {}: {}", entry, err),
            }
        }

        if addresses.is_empty() {
            return Err(ProtocolError::Config(format!(
                "Cannot find KDC for realm \"{}\"",
                realm
            )));
        }
        return Ok(addresses);
    }

    /// Channel to the first KDC of `realm`.
    pub fn create_channel(
        &self,
        realm: &str,
        message_len: usize,
    ) -> ProtoResult<Box<dyn KrbChannel>> {
        let address = self.kdc_addresses(realm)?[0];
        return Ok(new_krb_channel(address, self.transport_for(message_len)));
    }

    /// Sends `raw` to the KDCs of `realm` in turn until one answers.
    pub fn send_recv(&self, realm: &str, raw: &[u8]) -> ProtoResult<Vec<u8>> {
        let transport = self.transport_for(raw.len());
        let mut last_error = None;

        for address in self.kdc_addresses(realm)? {
            let channel = new_krb_channel(address, transport);
            debug!("Sending {} bytes to {} over {:?}", raw.len(), address, transport);
            match channel.send_recv(raw) {
                Ok(response) => return Ok(response),
                Err(err) => {
                    debug!("KDC {} unreachable: {}", address, err);
                    last_error = Some(err);
                }
            }
        }

        let message = format!("Unable to reach any KDC of {}", realm);
        return Err(match last_error {
            Some(err) => (message, err).into(),
            None => ProtocolError::Config(message),
        });
    }
}

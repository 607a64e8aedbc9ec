use crate::core::{ProtoResult, ProtocolError};
use crate::native::config::KDC_PORT;
use std::net::{IpAddr, SocketAddr};
use trust_dns_resolver::Resolver;

/// Splits a `host[:port]` KDC entry. IPv6 addresses with a port must be
/// written between brackets.
pub fn split_kdc_entry(entry: &str) -> ProtoResult<(String, u16)> {
    if let Ok(address) = entry.parse::<SocketAddr>() {
        return Ok((address.ip().to_string(), address.port()));
    }
    if let Ok(ip) = entry.parse::<IpAddr>() {
        return Ok((ip.to_string(), KDC_PORT));
    }

    let trimmed = entry.trim_start_matches('[').trim_end_matches(']');
    match trimmed.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => {
            let port = port.parse().map_err(|_| {
                ProtocolError::Config(format!("Invalid KDC port in '{}'", entry))
            })?;
            return Ok((host.to_string(), port));
        }
        _ => return Ok((trimmed.to_string(), KDC_PORT)),
    }
}

/// Resolves `host` to its addresses, without DNS when it is already an
/// IP address.
pub fn resolve_host(host: &str) -> ProtoResult<Vec<IpAddr>> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }

    let resolver = Resolver::from_system_conf().map_err(|err| {
        ProtocolError::Io("Unable to load the DNS configuration".into(), err)
    })?;

    let lookup = resolver.lookup_ip(host).map_err(|err| {
        ProtocolError::Data(format!("Unable to resolve '{}': {}", host, err))
    })?;

    return Ok(lookup.iter().collect());
}

/// Addresses of a `host[:port]` KDC entry.
pub fn resolve_kdc_entry(entry: &str) -> ProtoResult<Vec<SocketAddr>> {
    let (host, port) = split_kdc_entry(entry)?;
    return Ok(resolve_host(&host)?
        .into_iter()
        .map(|ip| SocketAddr::new(ip, port))
        .collect());
}

use krbcache::{Context, Result};

pub fn kvno(
    context: &mut Context,
    service: &str,
    host: Option<&str>,
    gss: bool,
) -> Result<()> {
    let record = match host {
        Some(host) if gss => context.get_service_ticket_gss(service, host)?,
        Some(host) => context.get_service_ticket(Some(service), host)?,
        None => context.get_service_ticket(None, service)?,
    };

    match record.kvno() {
        Some(kvno) => println!("{}: kvno = {}", record.server_name, kvno),
        None => println!("{}: kvno unknown", record.server_name),
    }

    if let Some(token) = &record.exchange_token {
        println!("Token ({} bytes): {}", token.len(), token.base64());
    }
    return Ok(());
}

use krbcache::core::stringifier::kerberos_time_to_string;
use krbcache::{Context, Result, TicketRecord};
use log::info;

pub fn list(context: &mut Context, only_tgts: bool, show_token: bool) -> Result<()> {
    let tickets = match context.list_cache() {
        Ok(tickets) => tickets,
        Err(err) if err.is_cache_unavailable() => {
            info!("{}", err);
            if let Some(cache_name) = context.cache_name() {
                println!("Ticket cache: {}", cache_name);
            }
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    if let Some(cache_name) = context.cache_name() {
        println!("Ticket cache: {}", cache_name);
    }
    println!("Default principal: {}", tickets.default_principal);

    for ticket in tickets.iter() {
        if only_tgts && !ticket.is_tgt() {
            continue;
        }
        println!("");
        print_ticket(ticket, show_token);
    }

    return Ok(());
}

fn print_ticket(ticket: &TicketRecord, show_token: bool) {
    for line in ticket_lines(ticket, show_token) {
        println!("{}", line);
    }
}

fn ticket_lines(ticket: &TicketRecord, show_token: bool) -> Vec<String> {
    let mut lines = vec![
        format!("{} => {}", ticket.client_name, ticket.server_name),
        format!("Auth time: {}", kerberos_time_to_string(&ticket.auth_time)),
        format!(
            "Valid starting: {}",
            kerberos_time_to_string(&ticket.start_time)
        ),
        format!("Expires: {}", kerberos_time_to_string(&ticket.end_time)),
    ];

    if let Some(renew_till) = &ticket.renew_till {
        lines.push(format!("Renew until: {}", kerberos_time_to_string(renew_till)));
    }

    lines.push(format!("Flags: {}", ticket.flags));
    lines.push(format!(
        "Etype (skey, tkt): {}, {}",
        ticket.key_enctype, ticket.ticket_enctype
    ));
    lines.push(format!("Ticket size: {}", ticket.data_size()));

    if let Some(kvno) = ticket.kvno() {
        lines.push(format!("Kvno: {}", kvno));
    }

    if show_token {
        lines.push(format!(
            "Ticket: {}",
            krbcache::core::encode_token(&ticket.data)
        ));
    }
    return lines;
}

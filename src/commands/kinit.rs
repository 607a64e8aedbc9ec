use crate::args::kinit::Arguments;
use chrono::Utc;
use krbcache::{AcquisitionRequest, Context, KinitAction, Result};
use log::info;
use std::io::{self, BufRead, Write};

pub fn kinit(context: &mut Context, args: Arguments) -> Result<()> {
    let mut request = AcquisitionRequest::new(args.action);
    request.principal_name = args.principal;
    request.service_name = args.service;
    request.lifetime = args.lifetime;
    request.renew_lifetime = args.renew_lifetime;
    request.start_time = args
        .start_after
        .and_then(|after| Utc::now().checked_add_signed(after));
    request.forwardable = args.forwardable;
    request.proxiable = args.proxiable;

    if args.action == KinitAction::Password {
        request.prompter = Some(Box::new(read_password));
    }

    let record = context.kinit_with_record(&mut request)?;
    info!(
        "{} ticket for {} stored",
        record.server_name, record.client_name
    );
    return Ok(());
}

/// Reads the password from the standard input. The terminal echo is not
/// disabled, so the prompt warns that the input is visible.
fn read_password(banner: &str) -> Option<String> {
    eprint!("{}", password_prompt(banner));
    io::stderr().flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;

    let password = line.trim_end_matches(|c| c == '\r' || c == '\n');
    if password.is_empty() {
        return None;
    }
    return Some(password.to_string());
}

fn password_prompt(banner: &str) -> String {
    return format!("{} (input is echoed): ", banner);
}

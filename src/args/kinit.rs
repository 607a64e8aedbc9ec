use super::validators;
use chrono::Duration;
use clap::{App, Arg, ArgGroup, ArgMatches, SubCommand};
use krbcache::native::parse_duration;
use krbcache::KinitAction;

pub const COMMAND_NAME: &str = "kinit";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Obtain initial tickets and store them in the cache")
        .arg(
            Arg::with_name("principal")
                .takes_value(true)
                .help("Client principal [default: principal of the cache]"),
        )
        .arg(
            Arg::with_name("service")
                .takes_value(true)
                .help("Service of the initial ticket [default: krbtgt]"),
        )
        .arg(
            Arg::with_name("renew")
                .long("renew")
                .short("R")
                .help("Renew the ticket of the cache"),
        )
        .arg(
            Arg::with_name("validate")
                .long("validate")
                .help("Validate the postdated ticket of the cache"),
        )
        .group(
            ArgGroup::with_name("action")
                .args(&["renew", "validate"])
                .multiple(false),
        )
        .arg(
            Arg::with_name("lifetime")
                .long("lifetime")
                .short("l")
                .takes_value(true)
                .help("Ticket lifetime, as 10h, 1d or seconds")
                .validator(validators::is_duration),
        )
        .arg(
            Arg::with_name("renewable-life")
                .long("renewable-life")
                .short("r")
                .takes_value(true)
                .help("Renewable lifetime, as 7d or seconds")
                .validator(validators::is_duration),
        )
        .arg(
            Arg::with_name("start-time")
                .long("start-time")
                .short("s")
                .takes_value(true)
                .help("Postdate the ticket by this duration")
                .validator(validators::is_duration),
        )
        .arg(
            Arg::with_name("forwardable")
                .short("f")
                .help("Request a forwardable ticket"),
        )
        .arg(
            Arg::with_name("not-forwardable")
                .short("F")
                .conflicts_with("forwardable")
                .help("Request a non forwardable ticket"),
        )
        .arg(
            Arg::with_name("proxiable")
                .short("p")
                .help("Request a proxiable ticket"),
        )
        .arg(
            Arg::with_name("not-proxiable")
                .short("P")
                .conflicts_with("proxiable")
                .help("Request a non proxiable ticket"),
        )
}

pub struct Arguments {
    pub action: KinitAction,
    pub principal: Option<String>,
    pub service: Option<String>,
    pub lifetime: Option<Duration>,
    pub renew_lifetime: Option<Duration>,
    pub start_after: Option<Duration>,
    pub forwardable: Option<bool>,
    pub proxiable: Option<bool>,
}

pub struct ArgumentsParser<'a> {
    matches: &'a ArgMatches<'a>,
}

impl<'a> ArgumentsParser<'a> {
    pub fn parse(matches: &'a ArgMatches) -> Arguments {
        let parser = Self { matches: matches };
        return parser._parse();
    }

    fn _parse(&self) -> Arguments {
        return Arguments {
            action: self.parse_action(),
            principal: self.matches.value_of("principal").map(|s| s.into()),
            service: self.matches.value_of("service").map(|s| s.into()),
            lifetime: self.parse_duration("lifetime"),
            renew_lifetime: self.parse_duration("renewable-life"),
            start_after: self.parse_duration("start-time"),
            forwardable: self.parse_switch("forwardable", "not-forwardable"),
            proxiable: self.parse_switch("proxiable", "not-proxiable"),
        };
    }

    fn parse_action(&self) -> KinitAction {
        if self.matches.is_present("renew") {
            return KinitAction::Renew;
        }
        if self.matches.is_present("validate") {
            return KinitAction::Validate;
        }
        return KinitAction::Password;
    }

    fn parse_duration(&self, name: &str) -> Option<Duration> {
        return self.matches.value_of(name).and_then(parse_duration);
    }

    fn parse_switch(&self, on: &str, off: &str) -> Option<bool> {
        if self.matches.is_present(on) {
            return Some(true);
        }
        if self.matches.is_present(off) {
            return Some(false);
        }
        return None;
    }
}

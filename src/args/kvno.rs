use clap::{App, Arg, ArgMatches, SubCommand};

pub const COMMAND_NAME: &str = "kvno";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Get a service ticket and print its key version number")
        .arg(
            Arg::with_name("service")
                .takes_value(true)
                .required(true)
                .help("Service name, or full principal when no host is given"),
        )
        .arg(
            Arg::with_name("host")
                .takes_value(true)
                .help("Host where the service runs"),
        )
        .arg(
            Arg::with_name("gss")
                .long("gss")
                .requires("host")
                .help("Also print the initial GSS-API token as base64"),
        )
}

pub struct Arguments {
    pub service: String,
    pub host: Option<String>,
    pub gss: bool,
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
            service: self.matches.value_of("service").unwrap_or_default().into(),
            host: self.matches.value_of("host").map(|s| s.into()),
            gss: self.matches.is_present("gss"),
        };
    }
}

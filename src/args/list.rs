use clap::{App, Arg, ArgMatches, SubCommand};

pub const COMMAND_NAME: &str = "list";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Describe the tickets stored in the credentials cache")
        .arg(
            Arg::with_name("tgts")
                .long("tgts")
                .short("t")
                .help("Only shows the TGTs"),
        )
        .arg(
            Arg::with_name("token")
                .long("token")
                .help("Shows the raw ticket as base64"),
        )
}

pub struct Arguments {
    pub only_tgts: bool,
    pub show_token: bool,
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
            only_tgts: self.matches.is_present("tgts"),
            show_token: self.matches.is_present("token"),
        };
    }
}

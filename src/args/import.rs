use clap::{App, Arg, ArgMatches, SubCommand};
use krbcache::LEGACY_CACHE_NAME;

pub const COMMAND_NAME: &str = "import";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Copy the tickets of another cache when it holds an initial ticket")
        .arg(
            Arg::with_name("source")
                .long("source")
                .short("s")
                .takes_value(true)
                .help("Cache to import from [default: MSLSA:]"),
        )
}

pub struct Arguments {
    pub source: Option<String>,
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
            source: self
                .matches
                .value_of("source")
                .filter(|source| *source != LEGACY_CACHE_NAME)
                .map(|s| s.into()),
        };
    }
}

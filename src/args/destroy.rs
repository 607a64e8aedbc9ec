use clap::{App, ArgMatches, SubCommand};

pub const COMMAND_NAME: &str = "destroy";

pub fn command() -> App<'static, 'static> {
    SubCommand::with_name(COMMAND_NAME)
        .about("Destroy the credentials cache")
}

pub struct Arguments {}

pub struct ArgumentsParser {}

impl ArgumentsParser {
    pub fn parse(_matches: &ArgMatches) -> Arguments {
        return Arguments {};
    }
}

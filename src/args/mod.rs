pub mod destroy;
pub mod import;
pub mod kinit;
pub mod kvno;
pub mod list;
mod validators;

use clap::{App, AppSettings, Arg, ArgMatches};

pub fn args() -> App<'static, 'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequired)
        .arg(
            Arg::with_name("cache")
                .long("cache")
                .short("c")
                .takes_value(true)
                .global(true)
                .help("Credentials cache, FILE:path or path [default: KRB5CCNAME]"),
        )
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Increase message verbosity"),
        )
        .subcommand(destroy::command())
        .subcommand(import::command())
        .subcommand(kinit::command())
        .subcommand(kvno::command())
        .subcommand(list::command())
}

pub struct Arguments {
    pub cache: Option<String>,
    pub verbosity: usize,
    pub command: Command,
}

pub enum Command {
    Destroy(destroy::Arguments),
    Import(import::Arguments),
    Kinit(kinit::Arguments),
    Kvno(kvno::Arguments),
    List(list::Arguments),
}

pub struct ArgumentsParser {}

impl ArgumentsParser {
    pub fn parse<'a>(matches: &'a ArgMatches) -> Arguments {
        let (command, submatches) = match matches.subcommand() {
            (destroy::COMMAND_NAME, Some(submatches)) => (
                Command::Destroy(destroy::ArgumentsParser::parse(submatches)),
                submatches,
            ),
            (import::COMMAND_NAME, Some(submatches)) => (
                Command::Import(import::ArgumentsParser::parse(submatches)),
                submatches,
            ),
            (kinit::COMMAND_NAME, Some(submatches)) => (
                Command::Kinit(kinit::ArgumentsParser::parse(submatches)),
                submatches,
            ),
            (kvno::COMMAND_NAME, Some(submatches)) => (
                Command::Kvno(kvno::ArgumentsParser::parse(submatches)),
                submatches,
            ),
            (list::COMMAND_NAME, Some(submatches)) => (
                Command::List(list::ArgumentsParser::parse(submatches)),
                submatches,
            ),
            _ => unreachable!("Unknown command"),
        };

        // global arguments are propagated down to the subcommand
        return Arguments {
            cache: submatches.value_of("cache").map(|s| s.into()),
            verbosity: submatches.occurrences_of("verbosity") as usize,
            command,
        };
    }
}

mod args;
mod commands;

use args::{args, Arguments, ArgumentsParser, Command};
use krbcache::{Context, Result};
use log::error;

fn init_log(verbosity: usize) {
    stderrlog::new()
        .module(module_path!())
        .verbosity(verbosity + 1)
        .init()
        .ok();
}

fn main() {
    let args = ArgumentsParser::parse(&args().get_matches());
    init_log(args.verbosity);

    if let Err(error) = main_inner(args) {
        error!("{}", error);
        std::process::exit(1);
    }
}

fn main_inner(args: Arguments) -> Result<()> {
    let mut context = Context::open(args.cache.as_deref())?;
    context.set_verbose(args.verbosity > 0);

    match args.command {
        Command::Destroy(_) => commands::destroy(context),
        Command::Import(import) => commands::import(&mut context, import.source),
        Command::Kinit(kinit) => commands::kinit(&mut context, kinit),
        Command::Kvno(kvno) => commands::kvno(
            &mut context,
            &kvno.service,
            kvno.host.as_deref(),
            kvno.gss,
        ),
        Command::List(list) => {
            commands::list(&mut context, list.only_tgts, list.show_token)
        }
    }
}

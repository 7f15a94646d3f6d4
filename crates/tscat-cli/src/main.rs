#![forbid(unsafe_code)]

//! `tscat`: inspect, check and reformat Qt Linguist `.ts` catalogs.

mod cli;
mod commands;
mod logging;

use std::io::{self, Write};
use std::process;

fn main() {
    let opts = cli::Opts::parse();
    logging::init(opts.log_json);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = match commands::run(&opts, &mut out) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            let _ = out.flush();
            eprintln!("tscat: {err}");
            2
        }
    };
    let _ = out.flush();
    process::exit(code);
}

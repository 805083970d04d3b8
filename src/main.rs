mod classify;
mod cli;
mod config;
mod deadline;
mod enforce;
mod fetch;
mod model;
mod report;
mod run;
mod supportbee;

use std::process;

use clap::Parser;
use jiff::Zoned;

use cli::Cli;
use config::Config;
use deadline::WeekdayCalendar;
use report::ConsoleReporter;
use supportbee::SupportBee;

fn main() {
    let cli = Cli::parse();

    // One "now" per run: every threshold, and therefore every ticket,
    // is judged against the same instant.
    let now = Zoned::now();
    let config = match Config::load(&cli.config_path(), &now, &WeekdayCalendar) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let reporter = ConsoleReporter;
    let client = match SupportBee::new(&config, &reporter) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Label-application failures are reported per ticket and never fail
    // the run; only config and fetch problems reach a non-zero exit.
    if let Err(e) = run::run(&config, &client, &client, &reporter) {
        eprintln!("{e}");
        process::exit(1);
    }
}

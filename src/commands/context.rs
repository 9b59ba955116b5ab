use clap::{ArgMatches, Command};
use cli_table::{format::Justify, print_stdout, Table, WithTitle};

use crate::config::config::Config;

pub(crate) fn command_config() -> Command {
    Command::new("context")
        .about("Print the resolved configuration")
}

#[derive(Table)]
struct ConfigTableItem {
    #[table(title = "Name", justify = "Justify::Right")]
    name: String,
    #[table(title = "Listen")]
    listen: String,
    #[table(title = "Memory hold (s)")]
    memory_hold: u64,
    #[table(title = "Request timeout (s)")]
    request_timeout: u64,
}

pub(crate) fn execute(_args: &ArgMatches, mut configuration: Config) {
    let items = vec![ConfigTableItem {
        name: configuration.name.clone(),
        listen: configuration.get_api_url(),
        memory_hold: configuration.stress.memory_hold_seconds,
        request_timeout: configuration.stress.request_timeout_seconds,
    }];

    if let Err(err) = print_stdout(items.with_title()) {
        eprintln!("Unable to print configuration: {}", err);
    }
}

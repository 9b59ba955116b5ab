use std::process::Command as BaseCommand;
use std::env;
use clap::{Command, Arg};

#[macro_use]
extern crate log;
extern crate env_logger;

mod commands {
  pub(crate) mod context;
  pub(crate) mod load;
  pub(crate) mod server;
}

mod config {
    pub(crate) mod api;
    pub(crate) mod config;
    pub(crate) mod stress;
}

mod api;
mod load;
mod metrics;
mod serializer;
mod stress;

#[tokio::main]
async fn main() {
    env_logger::init();

    let app = Command::new("hpa-stress")
        .version("0.1.0")
        .author("Mlanawo Mbechezi <mlanawo.mbechezi@kemeter.io>")
        .about("Burn CPU and memory on demand to watch an autoscaler react")
        .arg(
            Arg::new("context")
                .required(false)
                .help("Sets the context to use (e.g., development, staging, production)")
                .long("context")
                .short('c')
                .global(true)
        )
        .subcommand(
            commands::context::command_config(),
        )
        .subcommand(
            Command::new("server")
                .about("Run the stress server")
                .args_conflicts_with_subcommands(true)
                .flatten_help(true)
                .subcommand(
                    commands::server::command_config(),
                )
        )
        .subcommand(
            commands::load::command_config(),
        );

    let matches = app.get_matches();
    let context = matches.get_one::<String>("context")
        .map(|s| s.as_str())
        .unwrap_or("default");

    let config = config::config::load_config(context);

    match matches.subcommand() {
        Some(("context", sub_matches)) => {
            commands::context::execute(
                sub_matches,
                config,
            );
        }
        Some(("server", sub_matches)) => {
            let server_command = sub_matches.subcommand().unwrap_or(("start", sub_matches));
            match server_command {
                ("start", sub_matches) => {
                    commands::server::execute(
                        sub_matches,
                        config,
                    ).await
                }
                _ => {}
            }
        }
        Some(("load", sub_matches)) => {
            commands::load::execute(sub_matches).await
        }

        _ => {
            let process_args: Vec<String> = env::args().collect();
            let process_name = process_args[0].as_str().to_owned();

            let help = BaseCommand::new(process_name.as_str())
                .arg("--help")
                .status();

            if let Err(err) = help {
                eprintln!("Failed to print help: {}", err);
            }
        }
    }
}

use clap::{value_parser, Arg, ArgMatches, Command};

use crate::api::server as ApiServer;
use crate::config::config::Config;

pub(crate) fn command_config() -> Command {
    Command::new("start")
        .about("Start the HTTP server")
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .required(false)
                .value_parser(value_parser!(u16))
                .help("Port to listen on, overrides the context configuration")
        )
}

pub(crate) async fn execute(args: &ArgMatches, mut configuration: Config) {
    if let Ok(Some(port)) = args.try_get_one::<u16>("port") {
        configuration.api.port = *port;
    }

    info!("Start server with context {}", configuration.name);

    if let Err(err) = ApiServer::start(configuration).await {
        error!("Server stopped: {}", err);
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_override_is_parsed() {
        let matches = command_config()
            .try_get_matches_from(["start", "--port", "9090"])
            .unwrap();

        assert_eq!(matches.get_one::<u16>("port"), Some(&9090));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let matches = command_config().try_get_matches_from(["start", "-p", "http"]);

        assert!(matches.is_err());
    }
}

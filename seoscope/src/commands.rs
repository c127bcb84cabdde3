use crate::CLAP_STYLING;
use clap::{arg, command};
use seoscope_core::config::{DEFAULT_BIND, DEFAULT_DB_PATH};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("seoscope")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("seoscope")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress non-essential output").required(false))
        .arg(
            arg!(--"db" <PATH>)
                .required(false)
                .global(true)
                .help("Location of the metrics database")
                .env("SEOSCOPE_DB")
                .default_value(DEFAULT_DB_PATH),
        )
        .arg(
            arg!(--"synthetic")
                .required(false)
                .global(true)
                .help("Use deterministic synthetic authority scores instead of Open PageRank")
                .env("SEOSCOPE_SYNTHETIC")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(--"api-key" <KEY>)
                .required(false)
                .global(true)
                .help("Open PageRank API key")
                .env("OPR_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            arg!(--"freshness-days" <DAYS>)
                .required(false)
                .global(true)
                .help("How long a cached authority score stays fresh")
                .value_parser(clap::value_parser!(i64))
                .default_value("7"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .global(true)
                .help("Timeout for each outbound probe and scorer request")
                .value_parser(clap::value_parser!(u64))
                .default_value("10"),
        )
        .arg(
            arg!(--"json-logs")
                .required(false)
                .global(true)
                .help("Emit logs as JSON")
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand_required(true)
        .subcommand(
            command!("serve")
                .about("Serves the metrics API over HTTP")
                .arg(
                    arg!(-b --"bind" <ADDR>)
                        .required(false)
                        .help("Address to listen on")
                        .env("SEOSCOPE_BIND")
                        .default_value(DEFAULT_BIND),
                )
                .arg(
                    arg!(--"allowed-origin" <ORIGIN>)
                        .required(false)
                        .help("CORS origin allowed to call the API (default: any)")
                        .env("ALLOWED_ORIGIN"),
                ),
        )
        .subcommand(
            command!("lookup")
                .about("Resolves metrics for a single domain and prints the report")
                .arg(arg!(<DOMAIN>).help("Domain or URL to look up"))
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the report as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("init")
                .about("Initializes the metrics database on your filesystem")
                .arg(
                    arg!(-f --"force")
                        .help("Drops any existing database at the configured location.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("stats")
                .about("Shows how many domains are cached and which records are stale"),
        )
}

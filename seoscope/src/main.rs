use seoscope::command_argument_builder;
use seoscope::handlers::{
    config_from_matches, handle_init, handle_lookup, handle_serve, handle_stats, init_tracing,
};

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    let result = match chosen_command.subcommand() {
        Some(("serve", primary_command)) => {
            let config = config_from_matches(primary_command);
            init_tracing(config.json_logs);
            handle_serve(config).await
        }
        Some(("lookup", primary_command)) => {
            let config = config_from_matches(primary_command);
            init_tracing(config.json_logs);
            let domain = primary_command
                .get_one::<String>("DOMAIN")
                .map(String::as_str)
                .unwrap_or_default();
            let as_json = primary_command.get_flag("json");
            handle_lookup(config, domain, as_json, quiet).await
        }
        Some(("init", primary_command)) => {
            let config = config_from_matches(primary_command);
            handle_init(&config, primary_command.get_flag("force"))
        }
        Some(("stats", primary_command)) => {
            let config = config_from_matches(primary_command);
            handle_stats(&config).await
        }
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

use std::process::ExitCode;

use clap::{arg, command, crate_name, value_parser, ArgAction, ArgMatches, Command};
use client::{InspectParams, SyncParams};

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = build_cli().get_matches();

    if cli.subcommand_matches(cli::VERSION_SUBCOMMAND).is_some() {
        cli::version::run();
    } else if cli.subcommand_matches(cli::BUGREPORT_SUBCOMMAND).is_some() {
        cli::bugreport::run();
    } else if cli.subcommand_matches(cli::SERVER_SUBCOMMAND).is_some() {
        return cli::server::run().await;
    } else if let Some(matches) = cli.subcommand_matches(cli::INSPECT_SUBCOMMAND) {
        let params = InspectParams {
            uri: uri(matches),
            files: matches
                .get_many::<String>("file")
                .unwrap_or_default()
                .cloned()
                .collect(),
        };
        cli::client::inspect(params).await;
    } else if let Some(matches) = cli.subcommand_matches(cli::VERIFY_SUBCOMMAND) {
        let batch = matches.get_one::<String>("batch").cloned().unwrap_or_default();
        cli::client::verify(&uri(matches), &batch).await;
    } else if let Some(matches) = cli.subcommand_matches(cli::SYNC_SUBCOMMAND) {
        let params = SyncParams {
            uri: uri(matches),
            node_id: matches.get_one::<String>("node").cloned().unwrap_or_default(),
            weights: matches
                .get_many::<f64>("weights")
                .unwrap_or_default()
                .copied()
                .collect(),
        };
        cli::client::sync(params).await;
    }
    ExitCode::SUCCESS
}

fn build_cli() -> Command {
    command!(crate_name!())
        .version(clap::crate_version!())
        .about(clap::crate_description!())
        .subcommand(Command::new(cli::VERSION_SUBCOMMAND).about(cli::VERSION_DESCRIPTION))
        .subcommand(Command::new(cli::BUGREPORT_SUBCOMMAND).about(cli::BUGREPORT_DESCRIPTION))
        .subcommand(Command::new(cli::SERVER_SUBCOMMAND).about(cli::SERVER_DESCRIPTION))
        .subcommand(
            Command::new(cli::INSPECT_SUBCOMMAND)
                .about(cli::INSPECT_DESCRIPTION)
                .arg(uri_arg())
                .arg(
                    arg!(-f --file <FILE>)
                        .required(true)
                        .action(ArgAction::Append)
                        .help("Path to photo to upload, repeat for several photos"),
                ),
        )
        .subcommand(
            Command::new(cli::VERIFY_SUBCOMMAND)
                .about(cli::VERIFY_DESCRIPTION)
                .arg(uri_arg())
                .arg(
                    arg!(-b --batch <BATCH>)
                        .required(true)
                        .help("Batch id from the produce QR code"),
                ),
        )
        .subcommand(
            Command::new(cli::SYNC_SUBCOMMAND)
                .about(cli::SYNC_DESCRIPTION)
                .arg(uri_arg())
                .arg(arg!(-n --node <NODE>).required(true).help("Farm node id"))
                .arg(
                    arg!(-w --weights <WEIGHTS>)
                        .required(true)
                        .num_args(1..)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .help("Local model weights"),
                ),
        )
        .arg_required_else_help(true)
        .disable_version_flag(true)
}

fn uri_arg() -> clap::Arg {
    arg!(-u --uri <URI>)
        .default_value("http://localhost:5000")
        .help("FarmTrust server URI")
}

fn uri(matches: &ArgMatches) -> String {
    matches.get_one::<String>("uri").cloned().unwrap_or_default()
}

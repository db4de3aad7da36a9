use std::error::Error;
use std::path::PathBuf;

use bpaf::Bpaf;
use env_logger::Env;

use crate::config::Config;
use crate::decode::{response, Response};
use crate::encode::{request, Request};

mod capture;
mod config;
mod decode;
mod encode;

#[derive(Clone, Debug, Bpaf)]
#[bpaf(options, version, descr(env!("CARGO_PKG_DESCRIPTION")))]
struct Cli {
    /// Use an alternate config file
    #[bpaf(long, argument("PATH"))]
    config: Option<PathBuf>,
    #[bpaf(external(command))]
    command: Command,
}

#[derive(Clone, Debug, Bpaf)]
enum Command {
    /// Build a request packet and print it as hex
    #[bpaf(command, fallback_to_usage)]
    Encode(#[bpaf(external(request))] Request),
    /// Decode a capture of response packets
    #[bpaf(command, fallback_to_usage)]
    Decode(#[bpaf(external(response))] Response),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = cli().run();
    let config = Config::load_or_create(cli.config.as_deref())?;

    env_logger::Builder::from_env(Env::default().default_filter_or(&config.general.log_level))
        .init();

    match cli.command {
        Command::Encode(request) => encode::run(request, &config),
        Command::Decode(response) => decode::run(response, &config),
    }
}

use clap::{Args, Parser, Subcommand, builder::FalseyValueParser};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process::ExitCode;

use weather_lookup::{Config, WeatherService};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-api", version, about = "Localized weather lookup API")]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true, env = "DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API.
    Serve(ServeArgs),

    /// Look up a single city and print the summary.
    Show {
        /// City name, e.g. "Istanbul".
        city: String,
    },
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "WEATHER_API_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = 5001)]
    pub port: u16,
}

impl ServeArgs {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        init_logging(self.debug);

        // Missing credentials stop the process here, before anything is served.
        let config = Config::from_env()?;
        let service = WeatherService::from_config(&config)?;

        match self.command {
            Command::Serve(args) => {
                server::run(args.address(), service).await;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city } => match service.lookup(Some(&city)).await {
                Ok(weather) => {
                    println!("{}", weather.message);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("[{}] {err}", err.status_code());
                    Ok(ExitCode::FAILURE)
                }
            },
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

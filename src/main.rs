pub use error::Error;
mod command;
mod conf;
mod context;
mod controller;
mod error;
mod isochrone;
mod map;
mod pipeline;
mod view;
use conf::Conf;
use std::{env, str::FromStr};
use strum::EnumString;
use tracing::error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(EnumString)]
#[strum(serialize_all = "kebab-case")]
enum Command {
    Server,
    Export,
}

#[actix_web::main]
async fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().collect();

    let command = match args.get(1) {
        Some(arg) => Command::from_str(arg)
            .map_err(|_| Error::CLI(format!("Unknown command: {arg}")))?,
        None => Command::Server,
    };

    let conf = Conf::from_env().inspect_err(|e| error!("{e}"))?;

    match command {
        Command::Server => command::server::run(conf).await?,
        Command::Export => command::export::run(&args[2..], conf).await?,
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if cfg!(debug_assertions) {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

use std::io;

use color_eyre::Result;
use tracing_subscriber::prelude::*;

use crate::{config::Config, state::State};

#[macro_use]
extern crate tracing;

pub mod builtins;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod parse;
pub mod prelude;
pub mod process;
pub mod state;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    let (writer, _guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &config.log_dir,
        &config.log_file,
    ));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_error::ErrorLayer::default())
        .init();

    color_eyre::install()?;

    debug!(?config, "starting interpreter");

    let stdin = io::stdin();
    let mut state = State::new(&config, stdin.lock(), io::stdout());
    state.run()?;

    Ok(())
}

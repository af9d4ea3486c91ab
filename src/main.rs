use config::Config;
use log::info;
use pipeline::run;

mod compute;
mod config;
mod data;
mod pipeline;
mod plot;
mod read;
mod write;

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .format_timestamp(None)
        .format_target(false)
        .init();
    let config = Config::from_env()?;
    run(&config)?;
    info!("Análise concluída.");
    Ok(())
}

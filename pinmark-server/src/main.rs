#[macro_use]
extern crate tracing;

use clap::Parser;
use pinmark_core::error::PinmarkResult;
use pinmark_core::package_full;

use crate::cli::{AppCli, Command};

mod cli;
mod init;
mod pages;
#[cfg(test)]
mod tests;

fn main() -> PinmarkResult<()> {
    crate::init::logging();
    use tokio::runtime::Builder;
    let runtime = Builder::new_multi_thread()
        .thread_name_fn(|| {
            use std::sync::atomic::{AtomicUsize, Ordering};
            static ATOMIC_ID: AtomicUsize = AtomicUsize::new(0);
            let id = ATOMIC_ID.fetch_add(1, Ordering::SeqCst);
            format!("pinmark-{}", id)
        })
        .enable_all()
        .build()?;

    let cli = AppCli::parse();
    let config = cli.config;
    match cli.command {
        Command::Server(server) => {
            info!("Starting {}", package_full());
            runtime.block_on(async move {
                tokio::spawn(crate::cli::server::server_start(config, !server.no_migrate)).await
            })??;
            runtime.shutdown_timeout(std::time::Duration::from_secs(10));
        }
        Command::Migrate => {
            runtime.block_on(crate::cli::server::run_migrations(&config))?;
        }
    }
    Ok(())
}

use clap::{Args, Parser, Subcommand};

pub mod server;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Bookmark images from anywhere on the web", long_about = None)]
pub struct AppCli {
    #[clap(subcommand)]
    pub command: Command,
    #[clap(flatten)]
    pub config: pinmark_core::config::Configuration,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the bookmarking pages
    Server(ServerCli),
    /// Bring the database schema up to date and exit
    Migrate,
}

#[derive(Args, Debug)]
pub struct ServerCli {
    #[clap(long)]
    /// Don't touch the database schema on startup
    pub no_migrate: bool,
}

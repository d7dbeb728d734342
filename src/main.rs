use clap::Parser;
use pkcs7_gen::{
    cli::{self, commands::Pkcs7Commands},
    error::Result,
};

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Pkcs7Commands,
}

fn main() -> Result<()> {
    // Initialize logging
    pkcs7_gen::init_logging()?;

    // Parse command line arguments
    let cli = Cli::parse();

    let result = cli::handlers::handle_pkcs7_command(cli.command);

    // Format and display any errors
    if let Err(ref e) = result {
        eprintln!("{}", cli::format_error(e));
    }

    result
}

use bioprov::cli::{Cli, CommandHandler, OutputFormat, FORMATTER};
use clap::Parser;
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut handler = match CommandHandler::new() {
        Ok(handler) => handler,
        Err(e) => {
            eprint!("{}", FORMATTER.format_error(&e, OutputFormat::Text));
            process::exit(1);
        }
    };

    if let Err(e) = handler.handle_command(cli.command).await {
        eprint!("{}", FORMATTER.format_error(&e, OutputFormat::Text));
        process::exit(1);
    }
}

use clap::Parser;
use jwt_issuer_cli::Cli;

fn main() {
    let cli = Cli::parse();
    jwt_issuer_cli::init_tracing(cli.verbose);

    if let Err(e) = jwt_issuer_cli::run(cli) {
        eprintln!("Error: {}", e);
        for suggestion in e.suggestions() {
            eprintln!("  hint: {}", suggestion);
        }
        std::process::exit(1);
    }
}

use clap::Parser;

use ipsec_exporter::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = ipsec_exporter::run(cli).await {
        tracing::error!(error = %err, "exporter failed");
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

use brrtbind::cli::{run_cli, Cli};
use brrtbind::logging::init_logging_with_config;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging_with_config(&cli.log_config())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_cli(&cli, &mut out)
}

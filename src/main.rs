use anyhow::Result;
use tracing::info;

use klikschaak_cli::Shell;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    info!("klikschaak starting");
    let mut shell = Shell::new();
    shell.run()?;
    Ok(())
}

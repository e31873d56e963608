use std::io::{self, BufRead, Write};

use anyhow::Context;

use warehouse_core::WarehouseConfig;
use warehouse_sim::{Console, ConsoleError, Flow, Warehouse};

fn main() -> anyhow::Result<()> {
    warehouse_observability::init();

    let config = WarehouseConfig::from_env();
    let warehouse = Warehouse::new(config).context("failed to wire warehouse agents")?;
    let console = Console::new(&warehouse);

    tracing::info!(
        low_stock_threshold = config.low_stock_threshold,
        "warehouse ready; type `help` for commands"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        match console.run_line(&line, &mut stdout) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(ConsoleError::Input(err)) => writeln!(stdout, "error: {err}")?,
            Err(err) => return Err(err).context("command failed"),
        }
        stdout.flush()?;
    }

    Ok(())
}

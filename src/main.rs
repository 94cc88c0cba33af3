/*!
 * MCP - Main Entry Point
 *
 * Launches one process per line of the input file, releases them together,
 * then time-slices them round robin with SIGSTOP/SIGCONT.
 */

use mcp_scheduler::{
    init_tracing, AlarmTicker, CommandSource, McpConfig, ProcessManager, StdoutSink,
};
use tracing::info;

fn usage(cmd_name: &str) {
    println!(
        "Usage:\n\t{} <PATH>\n\n\t<PATH>: path to input file containing commands to be scheduled",
        cmd_name
    );
}

fn main() -> miette::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        usage(args.first().map(String::as_str).unwrap_or("mcp"));
        return Ok(());
    }

    init_tracing();

    let config = McpConfig::from_env()?;
    let source = CommandSource::from_path(&args[1])?;
    info!(path = %args[1], count = source.len(), "Workloads loaded");

    let manager = ProcessManager::from_config(config);
    let mut sink = StdoutSink::new(manager.config().report);
    let workloads = source.into_workloads();

    if workloads.is_empty() {
        info!("No workloads to schedule, exiting");
        return Ok(());
    }

    let mut ticker = AlarmTicker::new()?;
    let summary = manager.run(&workloads, &mut sink, &mut ticker)?;

    for slot in &summary.slots {
        info!(slot = slot.index, pid = slot.pid, state = %slot.state, "Final slot state");
    }
    Ok(())
}

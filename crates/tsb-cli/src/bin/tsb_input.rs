use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tsb_core::{DataRing, DescRing};
use tsb_fabric::{FabricRuntime, InputChannelSender, PatternGenerator, SenderConnection, TS_MAX_UNBOUNDED};
use tsb_fabric_sim::SimFabric;

/// Input-node front-end: produces microslices and streams timeslice
/// components to the configured compute nodes.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct InputArgs {
    /// This input's index in `[0, N)`.
    #[arg(short = 'i', long = "input-index")]
    input_index: u16,

    /// Compute endpoint to stream to; repeat once per compute node.
    #[arg(short = 'O', long = "output", required = true)]
    output: Vec<String>,

    /// Microslices per timeslice core window.
    #[arg(long, default_value_t = 100)]
    timeslice_size: u64,

    /// Extra overlap microslices shared with the following timeslice.
    #[arg(long, default_value_t = 2)]
    overlap_size: u64,

    /// Data ring size exponent; auto-sized from available memory if unset.
    #[arg(long)]
    in_data_buffer_size_exp: Option<u8>,

    /// Descriptor ring size exponent; auto-sized if unset.
    #[arg(long)]
    in_desc_buffer_size_exp: Option<u8>,

    /// Stop after this many timeslices; unbounded (run until abort) if unset.
    #[arg(short = 'n', long = "max-timeslice-number")]
    max_timeslice_number: Option<u64>,

    /// Base TCP port for fabric connection setup (unused by the
    /// in-process simulated fabric; reserved for a real RDMA runtime).
    #[arg(long, default_value_t = 9000)]
    base_port: u16,

    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = InputArgs::parse();
    tsb_cli::logging::init_tracing(&args.log_level, args.log_json);
    let _ = args.base_port;

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: InputArgs) -> Result<()> {
    let abort = tsb_cli::abort::install_abort_handler();

    let data_bits = args
        .in_data_buffer_size_exp
        .unwrap_or_else(|| tsb_cli::config::auto_size_data_bits(1));
    let desc_bits = args
        .in_desc_buffer_size_exp
        .unwrap_or_else(|| tsb_cli::config::auto_size_desc_bits(data_bits, 64));
    info!(data_bits, desc_bits, "resolved input buffer configuration");

    // No real RDMA `FabricRuntime` exists yet (see DESIGN.md); running
    // this binary in isolation demonstrates CLI, config, and scheduler
    // wiring against the deterministic in-process fabric rather than
    // reaching a separately-started `tsb-compute` process.
    let fabric: Arc<dyn FabricRuntime> = Arc::new(SimFabric::new());

    let mut connections = Vec::with_capacity(args.output.len());
    for (j, target) in args.output.iter().enumerate() {
        let compute_index = j as u16;
        fabric.register_rings(
            args.input_index,
            compute_index,
            Arc::new(DataRing::new(data_bits)),
            Arc::new(DescRing::new(desc_bits)),
        );
        let (input_ep, _compute_ep) = fabric
            .connect(args.input_index, compute_index)
            .with_context(|| format!("connecting to compute target '{target}'"))?;
        connections.push(SenderConnection::new(input_ep, compute_index));
    }

    let source = Box::new(PatternGenerator::new(64));
    let max_ts = args.max_timeslice_number.unwrap_or(TS_MAX_UNBOUNDED);
    let sender = InputChannelSender::new(
        args.input_index,
        connections,
        source,
        args.timeslice_size,
        args.overlap_size,
        max_ts,
        abort,
    );

    sender.run().await.context("input channel sender failed")?;
    info!(input_index = args.input_index, "input node finished");
    Ok(())
}

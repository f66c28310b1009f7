use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tsb_compute::{ComputeBuffer, ProcessorSupervisor};
use tsb_core::{BufferConfig, DataRing, DescRing};
use tsb_fabric::{Endpoint, FabricRuntime, ReceiverConnection};
use tsb_fabric_sim::SimFabric;
use tsb_shm::{MessageQueue, ShmSegment, TimesliceCompletion, TimesliceWorkItem};

/// Compute-node front-end: receives timeslice components from every
/// configured input, reassembles completed timeslices, and hands them to
/// supervised processor child processes.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct ComputeArgs {
    /// This compute's index in `[0, M)`.
    #[arg(short = 'o', long = "output-index")]
    output_index: u16,

    /// Input endpoint to receive from; repeat once per input node.
    #[arg(short = 'I', long = "input", required = true)]
    input: Vec<String>,

    /// Per-input data ring size exponent; auto-sized if unset.
    #[arg(long)]
    cn_data_buffer_size_exp: Option<u8>,

    /// Per-input descriptor ring size exponent; auto-sized if unset.
    #[arg(long)]
    cn_desc_buffer_size_exp: Option<u8>,

    /// Executable run per processor instance.
    #[arg(short = 'e', long = "processor-executable")]
    processor_executable: String,

    /// Number of processor instances to spawn.
    #[arg(long, default_value_t = 1)]
    processor_instances: u32,

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
    let args = ComputeArgs::parse();
    tsb_cli::logging::init_tracing(&args.log_level, args.log_json);
    let _ = args.base_port;

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: ComputeArgs) -> Result<()> {
    let num_inputs = args.input.len();
    let data_bits = args
        .cn_data_buffer_size_exp
        .unwrap_or_else(|| tsb_cli::config::auto_size_data_bits(num_inputs));
    let desc_bits = args
        .cn_desc_buffer_size_exp
        .unwrap_or_else(|| tsb_cli::config::auto_size_desc_bits(data_bits, 64));
    let config = BufferConfig::new(data_bits, desc_bits);
    info!(data_bits, desc_bits, num_inputs, "resolved compute buffer configuration");

    let prefix = tsb_cli::random_prefix("tsb");
    let data_segment_name = format!("/{prefix}_data");
    let desc_segment_name = format!("/{prefix}_desc");
    let work_items_name = format!("/{prefix}_work_items");
    let completions_name = format!("/{prefix}_completions");

    // The shared-memory segments a processor maps and the message queues
    // that feed it, sized `num_inputs * per-input size` and named per the
    // spec's memory-layout rule (one segment sliced `[i*size, (i+1)*size)`
    // per input). Per the storage-generic scope limit recorded in
    // DESIGN.md, the rings a real `FabricRuntime` would write into
    // directly are not yet the same allocation as these `MmapMut`-backed
    // segments; unifying the two is the natural next step for a real
    // multi-process deployment.
    let _data_segment = ShmSegment::create(&data_segment_name, num_inputs.max(1) * config.data_capacity() as usize)
        .context("creating data shared-memory segment")?;
    let _desc_segment = ShmSegment::create(
        &desc_segment_name,
        num_inputs.max(1) * config.desc_capacity() as usize * tsb_core::DESC_ENTRY_BYTES as usize,
    )
    .context("creating descriptor shared-memory segment")?;

    let work_items: Arc<MessageQueue<TimesliceWorkItem>> = Arc::new(
        MessageQueue::create(&work_items_name, 1i64 << desc_bits).context("creating work-item queue")?,
    );
    let completions: Arc<MessageQueue<TimesliceCompletion>> = Arc::new(
        MessageQueue::create(&completions_name, 1i64 << desc_bits).context("creating completion queue")?,
    );

    let processors = ProcessorSupervisor::spawn(
        &args.processor_executable,
        args.processor_instances,
        &data_segment_name,
        &desc_segment_name,
        &work_items_name,
        &completions_name,
    )
    .context("spawning processor instances")?;

    // No real RDMA `FabricRuntime` exists yet (see DESIGN.md); this
    // binary run in isolation demonstrates config/shm/processor wiring
    // against the deterministic in-process fabric.
    let fabric: Arc<dyn FabricRuntime> = Arc::new(SimFabric::new());
    let mut receivers = Vec::with_capacity(num_inputs);
    for (i, source) in args.input.iter().enumerate() {
        let input_index = i as u16;
        fabric.register_rings(
            input_index,
            args.output_index,
            Arc::new(DataRing::new(data_bits)),
            Arc::new(DescRing::new(desc_bits)),
        );
        let (_input_ep, compute_ep): (Endpoint, Endpoint) = fabric
            .connect(input_index, args.output_index)
            .with_context(|| format!("connecting to input source '{source}'"))?;
        receivers.push(ReceiverConnection::new(compute_ep, input_index));
    }

    let mut buffer = ComputeBuffer::new(args.output_index, 1, receivers, config);

    let abort = tsb_cli::abort::install_abort_handler();
    let poll_interval = std::time::Duration::from_millis(50);
    while !abort.load(std::sync::atomic::Ordering::Relaxed) {
        for conn in buffer.receivers() {
            let _ = tokio::time::timeout(poll_interval, conn.recv_status()).await;
        }
        buffer.emit_ready_work_items(work_items.as_ref())?;

        let completions = Arc::clone(&completions);
        let drained = tokio::time::timeout(
            poll_interval,
            tokio::task::spawn_blocking(move || completions.recv()),
        )
        .await;
        if let Ok(joined) = drained {
            if let Some(completion) = joined.context("completion recv task panicked")?? {
                buffer.apply_completion(completion);
            }
        }

        if buffer.completely_written() > 0 && buffer.acked() == buffer.completely_written() {
            break;
        }
    }

    work_items.send_shutdown().context("sending work-item shutdown sentinel")?;
    processors.join().await.context("waiting for processors to exit")?;

    drop(_data_segment);
    drop(_desc_segment);
    ShmSegment::unlink(&data_segment_name).context("unlinking data segment")?;
    ShmSegment::unlink(&desc_segment_name).context("unlinking descriptor segment")?;

    info!(output_index = args.output_index, acked = buffer.acked(), "compute node finished");
    Ok(())
}

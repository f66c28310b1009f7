//! End-to-end scenario tests (S1-S6) driving the input scheduler, the
//! simulated fabric, and the compute buffer together.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tsb_compute::{ComputeBuffer, ComputeError, WorkItemSink};
use tsb_core::{BufferConfig, DataRing, DescRing};
use tsb_fabric::{
    Component, FabricError, FabricRuntime, InputChannelSender, MicrosliceSource, PatternGenerator,
    ReceiverConnection, SenderConnection, TS_MAX_UNBOUNDED,
};
use tsb_fabric_sim::SimFabric;
use tsb_shm::{TimesliceCompletion, TimesliceWorkItem};

const DATA_BITS: u8 = 16;
const DESC_BITS: u8 = 8;

/// Registers a `(input, compute)` pair's rings on `fabric` and returns
/// the connected sender/receiver endpoints.
fn connect_pair(
    fabric: &SimFabric,
    input_index: u16,
    compute_index: u16,
    data_bits: u8,
    desc_bits: u8,
) -> Result<(SenderConnection, ReceiverConnection), FabricError> {
    fabric.register_rings(
        input_index,
        compute_index,
        Arc::new(DataRing::new(data_bits)),
        Arc::new(DescRing::new(desc_bits)),
    );
    let (input_ep, compute_ep) = fabric.connect(input_index, compute_index)?;
    Ok((
        SenderConnection::new(input_ep, compute_index),
        ReceiverConnection::new(compute_ep, input_index),
    ))
}

/// Collects emitted work items in order; doubles as the `completions`
/// side's driver by immediately acking everything it receives, since
/// these scenarios only care about delivery and red-lantern progress.
#[derive(Default)]
struct RecordingSink {
    items: Mutex<Vec<TimesliceWorkItem>>,
}

impl WorkItemSink for RecordingSink {
    fn send(&self, item: TimesliceWorkItem) -> Result<(), ComputeError> {
        self.items.lock().unwrap().push(item);
        Ok(())
    }
    fn send_shutdown(&self) -> Result<(), ComputeError> {
        Ok(())
    }
}

/// Drives one compute buffer's receive/emit loop until `target` work
/// items have been emitted, or `max_rounds` polling rounds pass.
///
/// Stands in for the out-of-scope "trivial ack-everything-in-order
/// reference processor": every work item `emit_ready_work_items` posts is
/// immediately completed, since without real completions flowing back
/// through `apply_completion` no input's credit is ever reclaimed and a
/// ring of any realistic size deadlocks under backpressure.
async fn pump_compute(
    buffer: &mut ComputeBuffer,
    sink: &RecordingSink,
    target: u64,
    max_rounds: usize,
) -> u64 {
    let mut emitted = 0;
    for _ in 0..max_rounds {
        for conn in buffer.receivers() {
            let _ = tokio::time::timeout(std::time::Duration::from_millis(20), conn.recv_status()).await;
        }
        // `sink` already holds every item emitted for this buffer across
        // prior calls, in ts_pos order, so its length is the base ts_pos
        // for whatever emit_ready_work_items emits this round.
        let base = sink.items.lock().unwrap().len() as u64;
        let newly_emitted = buffer.emit_ready_work_items(sink).unwrap();
        for i in 0..newly_emitted {
            buffer.apply_completion(TimesliceCompletion { ts_pos: base + i });
        }
        emitted += newly_emitted;
        if emitted >= target {
            break;
        }
        tokio::task::yield_now().await;
    }
    emitted
}

/// S1: smallest non-trivial topology — one input, one compute.
#[tokio::test]
async fn s1_smallest_topology_delivers_every_timeslice() {
    let fabric = SimFabric::default();
    let (sender_conn, receiver_conn) = connect_pair(&fabric, 0, 0, DATA_BITS, DESC_BITS).unwrap();

    let source = Box::new(PatternGenerator::new(32));
    let abort = Arc::new(AtomicBool::new(false));
    let max_ts = 5;
    let sender = InputChannelSender::new(0, vec![sender_conn], source, 4, 1, max_ts, abort);
    let sender_task = tokio::spawn(sender.run());

    let mut buffer = ComputeBuffer::new(0, 1, vec![receiver_conn], BufferConfig::new(DATA_BITS, DESC_BITS));
    let sink = RecordingSink::default();
    let emitted = pump_compute(&mut buffer, &sink, max_ts, 200).await;

    sender_task.await.unwrap().unwrap();
    assert_eq!(emitted, max_ts);
    assert_eq!(sink.items.lock().unwrap().len(), max_ts as usize);
    for (i, item) in sink.items.lock().unwrap().iter().enumerate() {
        assert_eq!(item.ts_pos, i as u64);
    }
}

/// S2: total TS bytes cross the compute data ring boundary, forcing a
/// skip to the wrap point.
#[tokio::test]
async fn s2_wrap_on_data_ring() {
    let small_data_bits = 9; // 512-byte ring, small enough to wrap quickly
    let fabric = SimFabric::default();
    let (sender_conn, receiver_conn) =
        connect_pair(&fabric, 0, 0, small_data_bits, DESC_BITS).unwrap();

    // 100-byte microslices, timeslice_size 2 + overlap 1 => 300 bytes/TS,
    // guaranteeing a wrap well before TS_MAX on a 512-byte ring.
    let source = Box::new(PatternGenerator::new(100));
    let abort = Arc::new(AtomicBool::new(false));
    let max_ts = 6;
    let sender = InputChannelSender::new(0, vec![sender_conn], source, 2, 1, max_ts, abort);
    let sender_task = tokio::spawn(sender.run());

    let mut buffer = ComputeBuffer::new(
        0,
        1,
        vec![receiver_conn],
        BufferConfig::new(small_data_bits, DESC_BITS),
    );
    let sink = RecordingSink::default();
    let emitted = pump_compute(&mut buffer, &sink, max_ts, 400).await;

    sender_task.await.unwrap().unwrap();
    assert_eq!(emitted, max_ts);
}

/// S3: two computes, round-robin assignment by `ts_index mod M`.
#[tokio::test]
async fn s3_two_computes_round_robin() {
    let fabric = SimFabric::default();
    let (sender0, receiver0) = connect_pair(&fabric, 0, 0, DATA_BITS, DESC_BITS).unwrap();
    let (sender1, receiver1) = connect_pair(&fabric, 0, 1, DATA_BITS, DESC_BITS).unwrap();

    let source = Box::new(PatternGenerator::new(16));
    let abort = Arc::new(AtomicBool::new(false));
    let max_ts = 5; // computes get 3 and 2 timeslices respectively
    let sender = InputChannelSender::new(0, vec![sender0, sender1], source, 2, 0, max_ts, abort);
    let sender_task = tokio::spawn(sender.run());

    let mut buffer0 = ComputeBuffer::new(0, 2, vec![receiver0], BufferConfig::new(DATA_BITS, DESC_BITS));
    let mut buffer1 = ComputeBuffer::new(1, 2, vec![receiver1], BufferConfig::new(DATA_BITS, DESC_BITS));
    let sink0 = RecordingSink::default();
    let sink1 = RecordingSink::default();

    for _ in 0..200 {
        pump_compute(&mut buffer0, &sink0, 3, 1).await;
        pump_compute(&mut buffer1, &sink1, 2, 1).await;
        if sink0.items.lock().unwrap().len() == 3 && sink1.items.lock().unwrap().len() == 2 {
            break;
        }
    }

    sender_task.await.unwrap().unwrap();
    assert_eq!(sink0.items.lock().unwrap().len(), 3);
    assert_eq!(sink1.items.lock().unwrap().len(), 2);
}

/// A source that withholds components past `allowed`, simulating a
/// slow input whose descriptor ring simply hasn't filled yet.
struct GatedSource {
    inner: PatternGenerator,
    allowed: Arc<AtomicU64>,
}

impl MicrosliceSource for GatedSource {
    fn next_component(&mut self, ts_index: u64, timeslice_size: u64, overlap_size: u64) -> Option<Component> {
        if ts_index >= self.allowed.load(Ordering::Relaxed) {
            return None;
        }
        self.inner.next_component(ts_index, timeslice_size, overlap_size)
    }
}

/// S4: a slow input gates the red lantern for the whole compute, even
/// though the fast input has raced ahead.
#[tokio::test]
async fn s4_slow_input_gates_red_lantern() {
    let fabric = SimFabric::default();
    let (fast_sender, fast_receiver) = connect_pair(&fabric, 0, 0, DATA_BITS, DESC_BITS).unwrap();
    let (slow_sender, slow_receiver) = connect_pair(&fabric, 1, 0, DATA_BITS, DESC_BITS).unwrap();

    let max_ts = 4;
    let fast_abort = Arc::new(AtomicBool::new(false));
    let fast = InputChannelSender::new(
        0,
        vec![fast_sender],
        Box::new(PatternGenerator::new(16)),
        2,
        0,
        max_ts,
        fast_abort,
    );

    let allowed = Arc::new(AtomicU64::new(0));
    let slow_abort = Arc::new(AtomicBool::new(false));
    let slow = InputChannelSender::new(
        1,
        vec![slow_sender],
        Box::new(GatedSource {
            inner: PatternGenerator::new(16),
            allowed: Arc::clone(&allowed),
        }),
        2,
        0,
        max_ts,
        slow_abort,
    );

    let fast_task = tokio::spawn(fast.run());
    let slow_task = tokio::spawn(slow.run());

    let mut buffer = ComputeBuffer::new(
        0,
        1,
        vec![fast_receiver, slow_receiver],
        BufferConfig::new(DATA_BITS, DESC_BITS),
    );
    let sink = RecordingSink::default();

    // The fast input can race ahead, but nothing should be emitted while
    // the slow one is still gated at 0.
    pump_compute(&mut buffer, &sink, 1, 40).await;
    assert_eq!(sink.items.lock().unwrap().len(), 0, "red lantern must not advance past the slow input");

    allowed.store(max_ts, Ordering::Relaxed);
    let emitted = pump_compute(&mut buffer, &sink, max_ts, 400).await;

    fast_task.await.unwrap().unwrap();
    slow_task.await.unwrap().unwrap();
    assert_eq!(emitted, max_ts);
}

/// S5: cooperative abort finalizes every connection with `final=true`
/// even though the run has no natural end.
#[tokio::test]
async fn s5_cooperative_abort_finalizes_connections() {
    let fabric = SimFabric::default();
    let (sender_conn, mut receiver_conn) = connect_pair(&fabric, 0, 0, DATA_BITS, DESC_BITS).unwrap();

    let source = Box::new(PatternGenerator::new(16));
    let abort = Arc::new(AtomicBool::new(false));
    let sender = InputChannelSender::new(0, vec![sender_conn], source, 2, 0, TS_MAX_UNBOUNDED, Arc::clone(&abort));
    let sender_task = tokio::spawn(sender.run());

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    abort.store(true, Ordering::Relaxed);

    for _ in 0..100 {
        if receiver_conn.recv_status().await.is_err() {
            break;
        }
        if receiver_conn.is_done() {
            break;
        }
    }

    sender_task.await.unwrap().unwrap();
    assert!(receiver_conn.is_done());
}

/// S6: an initial connect rejection is retried with a fresh endpoint.
#[tokio::test]
async fn s6_rejection_is_retried() {
    let fabric = SimFabric::default();
    fabric.fail_next_connect(0, 0, 1);
    fabric.register_rings(0, 0, Arc::new(DataRing::new(DATA_BITS)), Arc::new(DescRing::new(DESC_BITS)));

    let first = fabric.connect(0, 0);
    assert!(matches!(first, Err(FabricError::Rejected(0))));

    let retried = fabric.connect(0, 0);
    assert!(retried.is_ok(), "retry after rejection must succeed once the fault is consumed");
}

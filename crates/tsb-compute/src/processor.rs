use crate::error::ComputeError;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Supervises the configured number of processor child processes backing
/// one compute buffer, each given the shared-memory segment names and
/// message-queue names as arguments.
pub struct ProcessorSupervisor {
    children: Vec<Child>,
}

impl ProcessorSupervisor {
    /// Spawns `instances` copies of `executable`.
    pub fn spawn(
        executable: &str,
        instances: u32,
        data_segment: &str,
        desc_segment: &str,
        work_items_queue: &str,
        completions_queue: &str,
    ) -> Result<Self, ComputeError> {
        let mut children = Vec::with_capacity(instances as usize);
        for i in 0..instances {
            let child = Command::new(executable)
                .arg(data_segment)
                .arg(desc_segment)
                .arg(work_items_queue)
                .arg(completions_queue)
                .kill_on_drop(true)
                .spawn()?;
            info!(executable, instance = i, pid = ?child.id(), "spawned processor");
            children.push(child);
        }
        Ok(Self { children })
    }

    /// Waits for every processor to exit cleanly. Call after the work-item
    /// queue has been sent its shutdown sentinel.
    pub async fn join(mut self) -> Result<(), ComputeError> {
        for child in &mut self.children {
            let status = child.wait().await?;
            if !status.success() {
                warn!(?status, "processor exited with non-zero status");
                return Err(ComputeError::ProcessorExited(status.code()));
            }
        }
        Ok(())
    }
}

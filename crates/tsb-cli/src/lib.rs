//! Shared scaffolding for the `tsb-input` / `tsb-compute` binaries:
//! buffer auto-sizing, tracing setup, and cooperative-abort signal
//! handling. The binaries themselves live under `src/bin/`.

pub mod abort;
pub mod config;
pub mod logging;

/// Generates a shared-memory/message-queue name prefix unique to one
/// compute's run, matching the spec's `<prefix>_<rand>_data` naming.
#[must_use]
pub fn random_prefix(base: &str) -> String {
    use rand::Rng;
    let suffix: u32 = rand::thread_rng().gen();
    format!("{base}_{suffix:08x}")
}

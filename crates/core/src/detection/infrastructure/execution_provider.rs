use ort::execution_providers::ExecutionProviderDispatch;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;

/// Accelerators to try for the current platform; empty means CPU only.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

/// Builder shared by the detector and the embedder: full graph
/// optimisation, one inter-op thread, the machine's cores split across
/// `pool_size` sessions for intra-op work, and the platform accelerator when
/// there is one.
pub fn session_builder(
    pool_size: usize,
) -> Result<SessionBuilder, Box<dyn std::error::Error + Send + Sync>> {
    let builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_inter_threads(1)?
        .with_intra_threads(intra_threads(pool_size))?;

    let providers = preferred_execution_providers();
    if providers.is_empty() {
        return Ok(builder);
    }
    Ok(builder.with_execution_providers(providers)?)
}

fn intra_threads(pool_size: usize) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cores / pool_size.max(1)).max(1)
}

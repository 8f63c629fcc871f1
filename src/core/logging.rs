//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// voxmesh::core::logging::init();
/// log::info!("Outline started");
/// ```
pub fn init() {
    // Binaries and doc tests may both call this; a second init is harmless.
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}

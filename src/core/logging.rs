//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// fastvoxel::core::logging::init();
/// log::info!("Voxelizer ready");
/// ```
pub fn init() {
    let _ = builder().try_init();
}

/// Initialize logging for binaries, with millisecond timestamps
pub fn init_with_timestamps() {
    let _ = builder().format_timestamp_millis().try_init();
}

fn builder() -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
}

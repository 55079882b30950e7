use anyhow::Result;

/// Every user action runs to completion before the next one, so one thread is all we need.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

use anyhow::Result;

/// Installs a `fmt` subscriber with file and line numbers as the global default.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    let subscriber = tracing_subscriber::fmt().with_file(true).with_line_number(true).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

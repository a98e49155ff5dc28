pub mod config;
pub mod delete;
pub mod list;
pub mod run;
pub mod watch;

use crate::CmdivatorContext;
use crate::broadcast::LogNotifier;
use crate::host::LoggingHost;
use crate::service::Cmdivator;
use anyhow::Result;
use std::sync::Arc;

/// A service over the configured roots with the registry already populated
///
/// # Errors
///
/// Returns an error if the scan configuration is invalid
pub fn scanned_service(ctx: &CmdivatorContext) -> Result<Cmdivator> {
    let service = Cmdivator::new(
        ctx.scan_config()?,
        Arc::new(LoggingHost),
        Arc::new(LogNotifier),
    );
    service.refresh();
    Ok(service)
}

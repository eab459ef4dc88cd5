//! Process-wide service, installed once at startup.
//!
//! Libraries should take a `&Service` instead; this exists for entry points that cannot thread
//! one through.

use log::info;
use once_cell::sync::OnceCell;

use crate::service::Service;

static SERVICE: OnceCell<Service> = OnceCell::new();

/// Installs the process-wide service.
///
/// # Errors
/// Gives `service` back if one was already installed.
pub fn install(service: Service) -> Result<&'static Service, Service> {
    let installed = SERVICE.try_insert(service).map_err(|(_, service)| service)?;
    info!("installed service with {} patterns", installed.table().len());
    Ok(installed)
}

/// Returns the installed service, if any.
pub fn service() -> Option<&'static Service> {
    SERVICE.get()
}

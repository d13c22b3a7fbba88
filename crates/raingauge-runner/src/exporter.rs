//! Metrics exporter start-up.

use std::net::SocketAddr;

use crate::error::{RunnerError, RunnerResult};

/// Serve Prometheus metrics on `addr`, if one is configured.
///
/// Without the `prometheus` feature there is no exporter, so a configured
/// address is an invalid setting.
pub fn install_exporter(addr: Option<SocketAddr>) -> RunnerResult<()> {
    let Some(addr) = addr else {
        return Ok(());
    };
    install_prometheus(addr)
}

#[cfg(feature = "prometheus")]
fn install_prometheus(addr: SocketAddr) -> RunnerResult<()> {
    raingauge_metrics::install_prometheus(addr).map_err(|e| RunnerError::Metrics(e.to_string()))?;
    tracing::info!(%addr, "Serving Prometheus metrics");
    Ok(())
}

#[cfg(not(feature = "prometheus"))]
fn install_prometheus(addr: SocketAddr) -> RunnerResult<()> {
    Err(RunnerError::InvalidSetting(format!(
        "metrics address {} given, but this build has no prometheus exporter",
        addr
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_address_is_a_noop() {
        assert!(install_exporter(None).is_ok());
    }

    #[cfg(not(feature = "prometheus"))]
    #[test]
    fn test_address_without_exporter_is_rejected() {
        let err = install_exporter(Some("127.0.0.1:9184".parse().unwrap())).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidSetting(_)));
    }

    #[cfg(feature = "prometheus")]
    #[test]
    fn test_prometheus_exporter_installs() {
        assert!(install_exporter(Some("127.0.0.1:0".parse().unwrap())).is_ok());
    }
}

use metrics_exporter_statsd::{StatsdBuilder, StatsdError};

#[derive(thiserror::Error, Debug)]
pub enum MetricsError {
    #[error("statsd exporter error: {0}")]
    Statsd(#[from] StatsdError),
    #[error("a global metrics recorder is already installed")]
    RecorderInstalled,
}

/// Installs a StatsD recorder as the global metrics sink. All `counter!` /
/// `histogram!` calls are dropped until this runs, so services should call
/// it before serving traffic.
pub fn install_statsd(host: &str, port: u16, prefix: &str) -> Result<(), MetricsError> {
    let recorder = StatsdBuilder::from(host, port)
        .with_queue_size(5000)
        .with_buffer_size(1024)
        .build(Some(prefix))?;

    metrics::set_global_recorder(recorder).map_err(|_| MetricsError::RecorderInstalled)
}

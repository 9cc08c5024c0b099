//! Agent runtime.
//!
//! Owns the pipeline and the shutdown channel, waits for the sink to become
//! reachable, then runs the poll loop, the push listener and the config
//! watcher until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::config_watch::watch_config;
use super::poll::FilePoller;
use super::push;
use crate::core::config_store::ConfigStore;
use crate::core::thermal::Pipeline;
use crate::error::Result;
use crate::integrations::Sink;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the multi-threaded runtime the agent runs on.
pub fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("thermal-hub-worker")
        .build()
}

pub struct Agent {
    pipeline: Arc<Pipeline>,
    store: Arc<ConfigStore>,
    shutdown_tx: broadcast::Sender<()>,
}

impl Agent {
    pub fn new(store: Arc<ConfigStore>, sink: Arc<dyn Sink>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(4);
        Self {
            pipeline: Arc::new(Pipeline::new(sink, Arc::clone(&store))),
            store,
            shutdown_tx,
        }
    }

    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Sender that stops the agent when fired.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Retry the sink connection test until it passes. Returns false if
    /// shutdown was requested first.
    pub async fn wait_for_sink(&self) -> bool {
        let mut shutdown = self.shutdown_tx.subscribe();
        let sink = self.pipeline.sink();

        loop {
            if sink.test_connection().await {
                log::info!("Connected to {}", sink.name());
                return true;
            }

            let retry = self.store.current().monitoring.connect_retry();
            log::warn!(
                "{} not reachable, retrying in {}s",
                sink.name(),
                retry.as_secs()
            );

            tokio::select! {
                _ = tokio::time::sleep(retry) => {}
                _ = shutdown.recv() => return false,
            }
        }
    }

    /// Run until a termination signal or the shutdown handle fires.
    pub async fn run(self) -> Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let signal_tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            let _ = signal_tx.send(());
        });

        log::info!("Starting thermal monitoring");

        if !self.wait_for_sink().await {
            log::info!("Shutdown requested before the sink became reachable");
            self.pipeline.close();
            return Ok(());
        }

        let config = self.store.current();
        let mut tasks: Vec<(&str, JoinHandle<Result<()>>)> = Vec::new();

        if config.monitoring.enable_file_monitor {
            let poller = FilePoller::new(Arc::clone(&self.pipeline));
            let shutdown = self.shutdown_tx.subscribe();
            tasks.push((
                "file monitor",
                tokio::spawn(async move {
                    poller.run(shutdown).await;
                    Ok(())
                }),
            ));
        }

        if config.monitoring.enable_http_server {
            let addr = config.monitoring.listen_addr()?;
            let pipeline = Arc::clone(&self.pipeline);
            let shutdown = self.shutdown_tx.subscribe();
            let stop_all = self.shutdown_tx.clone();
            tasks.push((
                "http server",
                tokio::spawn(async move {
                    let served = push::serve(pipeline, addr, shutdown).await;
                    if let Err(e) = &served {
                        log::error!("HTTP server failed: {}", e);
                        let _ = stop_all.send(());
                    }
                    served
                }),
            ));
        }

        let store = Arc::clone(&self.store);
        let shutdown = self.shutdown_tx.subscribe();
        tasks.push((
            "config watcher",
            tokio::spawn(async move {
                watch_config(store, shutdown).await;
                Ok(())
            }),
        ));

        let _ = shutdown_rx.recv().await;
        log::info!("Shutdown requested, stopping ingestion");
        self.pipeline.close();

        let mut failure = None;
        for (name, handle) in tasks {
            match tokio::time::timeout(DRAIN_TIMEOUT, handle).await {
                Ok(Ok(Ok(()))) => log::debug!("{} stopped", name),
                Ok(Ok(Err(e))) => {
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
                Ok(Err(e)) => log::error!("{} task failed: {}", name, e),
                Err(_) => log::warn!("{} did not stop within {:?}", name, DRAIN_TIMEOUT),
            }
        }

        log::info!("Thermal monitoring stopped");
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Wait for SIGINT or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => log::info!("Received SIGINT"),
        () = terminate => log::info!("Received SIGTERM"),
    }
}

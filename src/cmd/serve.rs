use std::fs::OpenOptions;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli;
use crate::config::{Config, Overrides};
use crate::library::Library;
use crate::server;
use crate::status;

impl cli::Serve {
    pub fn run(self) -> Result<()> {
        self.init_logging()?;

        let config = Config::new(Overrides {
            listen: self.listen,
            dir: self.dir.clone(),
        })?;

        let addr = config.listen_addr()?;
        let library = Arc::new(super::build_library(&config));
        let runtime = Runtime::new()?;

        if !config.animations.dir.is_dir() {
            status::warning!(
                "animation directory {} doesn't exist",
                config.animations.dir.display()
            );
        }

        runtime.block_on(serve(addr, config, library))
    }

    fn init_logging(&self) -> Result<()> {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy();

        if let Some(path) = &self.log_file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow!("cannot open log file {}: {}", path.to_string_lossy(), e))?;

            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_env_filter(filter)
                .with_writer(file)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }

        Ok(())
    }
}

async fn serve(addr: SocketAddr, config: Config, library: Arc<Library>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot listen on {addr}"))?;

    status::info!("Serving animations from {}", config.animations.dir.display());
    status::info!("Listening at http://{}", listener.local_addr()?);
    status::info!("Press <ctrl+c> to stop");

    let shutdown_token = CancellationToken::new();
    let mut server = tokio::spawn(server::serve(listener, library, shutdown_token.clone()));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            debug!("interrupted, shutting down...");
            shutdown_token.cancel();
            server.await??;
        }

        result = &mut server => result??,
    }

    status::info!("Server stopped");

    Ok(())
}

use anyhow::{bail, Result};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli;
use crate::config::{Config, Overrides};
use crate::session::{self, End};

impl cli::Play {
    pub fn run(self) -> Result<()> {
        let config = Config::new(Overrides {
            listen: None,
            dir: self.dir.clone(),
        })?;

        let library = super::build_library(&config);
        let animation = library.get(&self.name)?;

        if animation.is_empty() {
            bail!("animation {} has no frames", self.name);
        }

        let runtime = Runtime::new()?;

        runtime.block_on(async move {
            let token = CancellationToken::new();
            let mut stdout = tokio::io::stdout();

            let interrupt = {
                let token = token.clone();

                tokio::spawn(async move {
                    let _ = tokio::signal::ctrl_c().await;
                    token.cancel();
                })
            };

            // a closed stdout (e.g. piped into head) just ends playback
            if let End::Disconnected(e) = session::stream(&animation, &mut stdout, &token).await {
                debug!("stdout closed: {e}");
            }

            interrupt.abort();
        });

        Ok(())
    }
}

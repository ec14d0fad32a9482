use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::cache::DEFAULT_BUDGET;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_ANIMATIONS_DIR: &str = "anims";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub server: Server,
    pub animations: Animations,
    pub cache: Cache,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub listen: String,
}

#[derive(Debug, Deserialize)]
pub struct Animations {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
    pub budget: usize,
}

/// Values given on the command line, applied on top of everything else.
#[derive(Debug, Default)]
pub struct Overrides {
    pub listen: Option<SocketAddr>,
    pub dir: Option<PathBuf>,
}

impl Config {
    pub fn new(overrides: Overrides) -> Result<Self> {
        let mut config = config::Config::builder()
            .set_default("server.listen", DEFAULT_LISTEN_ADDR)?
            .set_default("animations.dir", DEFAULT_ANIMATIONS_DIR)?
            .set_default("cache.budget", DEFAULT_BUDGET as u64)?;

        if let Ok(home) = home() {
            let user_config_file = home.join("config.toml");

            config = config.add_source(
                config::File::with_name(&user_config_file.to_string_lossy()).required(false),
            );
        }

        config = config.add_source(config::Environment::with_prefix("printnet").separator("_"));

        if let Ok(port) = env::var("PORT") {
            config = config.set_override("server.port", port)?;
        }

        if let Some(addr) = overrides.listen {
            config = config.set_override("server.listen", addr.to_string())?;
        }

        if let Some(dir) = overrides.dir {
            config = config.set_override("animations.dir", dir.to_string_lossy().into_owned())?;
        }

        let built = config.build()?;
        let port = built.get_string("server.port").ok();
        let mut config: Config = built.try_deserialize()?;

        if let (Some(port), None) = (port, overrides.listen) {
            config.server.listen = with_port(&config.server.listen, &port)?;
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.server
            .listen
            .parse()
            .with_context(|| format!("invalid listen address: {}", self.server.listen))
    }
}

fn with_port(addr: &str, port: &str) -> Result<String> {
    let port: u16 = port
        .trim()
        .parse()
        .with_context(|| format!("invalid PORT: {port}"))?;

    let host = match addr.rsplit_once(':') {
        Some((host, _)) => host,
        None => addr,
    };

    Ok(format!("{host}:{port}"))
}

pub fn home() -> Result<PathBuf> {
    env::var("PRINTNET_CONFIG_HOME")
        .map(PathBuf::from)
        .or(env::var("XDG_CONFIG_HOME").map(|home| Path::new(&home).join("printnet")))
        .or(env::var("HOME").map(|home| Path::new(&home).join(".config").join("printnet")))
        .map_err(|_| anyhow!("need $HOME or $XDG_CONFIG_HOME or $PRINTNET_CONFIG_HOME"))
}

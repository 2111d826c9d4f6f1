//! Configuration structs for the flagbind demo application.
//!
//! [`DemoConfig`] nests two sub-configs, so the generated flags show both flat
//! and dotted paths. Every leaf gets one flag and one env var:
//!
//! | Flag                        | Env var                              |
//! |-----------------------------|--------------------------------------|
//! | `--name`                    | `FLAGBIND_DEMO_NAME`                 |
//! | `--verbose`                 | `FLAGBIND_DEMO_VERBOSE`              |
//! | `--timeout`                 | `FLAGBIND_DEMO_TIMEOUT`              |
//! | `--server.host`             | `FLAGBIND_DEMO_SERVER__HOST`         |
//! | `--server.port`             | `FLAGBIND_DEMO_SERVER__PORT`         |
//! | `--server.max-connections`  | `FLAGBIND_DEMO_SERVER__MAX_CONNECTIONS` |
//! | `--server.allowed`          | `FLAGBIND_DEMO_SERVER__ALLOWED`      |
//! | `--display.color`           | `FLAGBIND_DEMO_DISPLAY__COLOR`       |
//! | `--display.format`          | `FLAGBIND_DEMO_DISPLAY__FORMAT`      |

use std::time::Duration;

use flagbind::Schema;
use serde::{Deserialize, Serialize};

/// Root configuration for the demo application.
#[derive(Schema, Serialize, Deserialize, Debug)]
pub struct DemoConfig {
    /// Application name shown in the banner.
    pub name: String,

    #[flag = "; print the resolved configuration banner"]
    pub verbose: bool,

    /// How long to wait for a client, e.g. 30s or 1m.
    pub timeout: Duration,

    pub server: ServerConfig,

    pub display: DisplayConfig,

    /// Bookkeeping the app fills in itself; never a flag.
    #[serde(skip)]
    pub started_by: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            name: "flagbind-demo".into(),
            verbose: false,
            timeout: Duration::from_secs(30),
            server: ServerConfig::default(),
            display: DisplayConfig::default(),
            started_by: String::new(),
        }
    }
}

/// Lives under `server:` in the config file.
#[derive(Schema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Hostname to bind to.
    pub host: String,

    /// Port number.
    pub port: u16,

    /// Maximum number of allowed connections.
    pub max_connections: u32,

    /// Client networks allowed to connect.
    pub allowed: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            max_connections: 100,
            allowed: vec!["127.0.0.0/8".into()],
        }
    }
}

#[derive(Schema, Serialize, Deserialize, Debug)]
pub struct DisplayConfig {
    /// Terminal color: red, green, yellow, blue, magenta, cyan or white.
    pub color: String,

    /// Output format.
    pub format: Format,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: "yellow".into(),
            format: Format::Pretty,
        }
    }
}

#[derive(Schema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Pretty,
    Plain,
}

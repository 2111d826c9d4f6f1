//! # flagbind demo application
//!
//! A sample CLI tool wiring a config struct to flags, env vars and a config
//! file with flagbind. It exists to demonstrate and manually verify the
//! library, not to do anything useful.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example flagbind_demo -- --help
//! cargo run --example flagbind_demo
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature              | How to exercise it                                                        |
//! |----------------------|---------------------------------------------------------------------------|
//! | Defaults             | `cargo run --example flagbind_demo`                                       |
//! | Config file (search) | Create `configs/flagbind-demo.yaml` or `flagbind-demo.toml` in cwd         |
//! | Explicit file        | `cargo run --example flagbind_demo -- --config-file ./my.json`            |
//! | Env var override     | `FLAGBIND_DEMO_DISPLAY__COLOR=red cargo run --example flagbind_demo`      |
//! | List from env        | `FLAGBIND_DEMO_SERVER__ALLOWED=10.0.0.0/8,::1 cargo run --example flagbind_demo` |
//! | Flag override        | `cargo run --example flagbind_demo -- --server.port 9999`                 |
//! | Duration flag        | `cargo run --example flagbind_demo -- --timeout 1m30s`                    |
//! | Bool flag            | `cargo run --example flagbind_demo -- --verbose`                          |
//! | Resolved dump        | `cargo run --example flagbind_demo -- --dump`                             |
//! | Logging              | `RUST_LOG=flagbind=debug cargo run --example flagbind_demo`               |

mod config;

use clap::{Args, Command, FromArgMatches};
use tracing_subscriber::EnvFilter;

use flagbind::{FlagSet, FlagbindError, LoadOptions, Store, bind_env_vars_to_flags, generate_flags, load};

use config::{DemoConfig, Format};

const ENV_PREFIX: &str = "FLAGBIND_DEMO";

/// Options about where the configuration comes from. Everything else is a
/// generated flag.
#[derive(Args, Debug)]
struct SourceArgs {
    /// Load this file instead of searching; format from its extension.
    #[arg(long, default_value = "")]
    config_file: String,

    /// Base name to search for in ./configs and the current directory.
    #[arg(long, default_value = "flagbind-demo")]
    config_name: String,

    /// Format of the searched file (toml, yaml, yml, json). Empty tries all.
    #[arg(long, default_value = "")]
    config_type: String,

    /// Print every resolved setting as TOML instead of the banner.
    #[arg(long)]
    dump: bool,
}

// ---------------------------------------------------------------------------
// ANSI color helpers
// ---------------------------------------------------------------------------

fn ansi_color_code(name: &str) -> &str {
    match name {
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        _ => "\x1b[0m",
    }
}

const RESET: &str = "\x1b[0m";

fn echo_all(config: &DemoConfig) {
    let color = ansi_color_code(&config.display.color);

    if config.verbose {
        println!(
            "{color}[verbose] Resolved configuration for {:?}{RESET}",
            config.name
        );
        println!();
    }

    let entries = [
        ("name", config.name.clone()),
        ("verbose", config.verbose.to_string()),
        ("timeout", humantime::format_duration(config.timeout).to_string()),
        ("server.host", config.server.host.clone()),
        ("server.port", config.server.port.to_string()),
        (
            "server.max-connections",
            config.server.max_connections.to_string(),
        ),
        ("server.allowed", config.server.allowed.join(",")),
        ("display.color", config.display.color.clone()),
        ("display.format", format!("{:?}", config.display.format)),
    ];

    if config.display.format == Format::Plain {
        for (key, value) in &entries {
            println!("{key}={value}");
        }
    } else {
        let max_key_len = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in &entries {
            println!("{color}{key:<max_key_len$}{RESET}  {value}");
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut flags = FlagSet::new();
    let mut store = Store::new();
    generate_flags::<DemoConfig>(&mut flags, &mut store)?;
    store.set_defaults_from(&DemoConfig::default())?;

    // Bind before building the command so --help names each env var.
    bind_env_vars_to_flags(&mut store, &mut flags, ENV_PREFIX);

    let cmd = SourceArgs::augment_args(Command::new("flagbind-demo"));
    let matches = flags.augment(cmd).get_matches();
    let source = SourceArgs::from_arg_matches(&matches)?;
    flags.apply_matches(&matches)?;

    let opts = LoadOptions::new()
        .config_file(&source.config_file)
        .config_name(&source.config_name)
        .config_type(&source.config_type)
        .env_prefix(ENV_PREFIX)
        .auto_bind_env(true);
    match load(&mut store, &mut flags, &opts) {
        Ok(()) => {}
        Err(e @ FlagbindError::ConfigFileNotFound { .. }) => {
            tracing::info!("{e}; continuing with defaults, env vars and flags");
        }
        Err(e) => return Err(e.into()),
    }

    if source.dump {
        print!("{}", toml::to_string_pretty(&store.all_settings()?)?);
        return Ok(());
    }

    let mut config: DemoConfig = store.decode()?;
    config.started_by = std::env::var("USER").unwrap_or_default();
    echo_all(&config);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Failed to load config:\n{e}");
        std::process::exit(1);
    }
}

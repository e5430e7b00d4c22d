//! Long-running modes: logger init, gateway, watch loop.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::Args;
use crate::core;
use crate::core::bus::ConfigBus;
use crate::core::config::Config;
use crate::core::fetch::{HttpTransport, Transport};
use crate::core::gateway::{self, Gateway};
use crate::core::hints::EnvironmentHints;

/// Initialize env_logger at the level chosen by -v/-q; `RUST_LOG` still wins.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .try_init();
}

/// Run the gateway in front of `config.backend_url` until the process is stopped.
pub async fn run_serve(
    config: &Config,
    listen: Option<SocketAddr>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listen = listen.unwrap_or(config.listen);
    let upstream: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.backend_url));
    let env_hints = EnvironmentHints::from_env();
    log::info!(
        "fronting {} (hinted provider: {})",
        config.backend_url,
        env_hints.llm_provider
    );
    let gateway = Arc::new(Gateway::new(upstream, config.timeouts.upstream, env_hints));
    gateway::serve(gateway, listen).await?;
    Ok(())
}

/// Follow the bootstrap state and catalog. Each stdin line publishes a config-changed
/// signal; EOF ends the loop.
pub async fn run_watch(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (sequencer, _) = core::cli::connect(config);
    let bus = ConfigBus::new();
    let _subscription = sequencer.attach(&bus);

    let mut states = sequencer.watch_state();
    let mut catalogs = sequencer.watch_catalog();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Watching {} (press Enter to refresh, Ctrl-D to stop)", config.sync_url);
    bus.publish();

    loop {
        tokio::select! {
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                for line in core::cli::describe_state(&state, &sequencer.catalog()) {
                    println!("{}", line);
                }
                println!();
            }
            changed = catalogs.changed() => {
                if changed.is_err() {
                    break;
                }
                let catalog = catalogs.borrow_and_update().clone();
                println!("Catalog:   {} provider(s): {}", catalog.len(), catalog.ids().join(", "));
                println!();
                core::cli::remember_catalog(&catalog);
            }
            line = lines.next_line() => {
                match line? {
                    Some(_) => bus.publish(),
                    None => break,
                }
            }
        }
    }
    Ok(())
}

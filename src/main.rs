//! jsui-shell binary: wires the store, plugins, and dialogs to the bridge
//! and serves it over the UI process's stdio.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use tracing::info;

use jsui_shell::bridge::{BridgeConnection, CommandRouter};
use jsui_shell::dialogs::NativeDialogs;
use jsui_shell::logging;
use jsui_shell::plugins::{Plugin, PluginRegistry};
use jsui_shell::shell::Shell;
use jsui_shell::store::ConfigStore;

#[derive(Debug, Parser)]
#[command(
    name = "jsui-shell",
    about = "Privileged shell process for the JSUI desktop app"
)]
struct Args {
    /// Command that launches the sandboxed UI process. The bridge is served
    /// over its stdio. Without it, the bridge runs on this process's own
    /// stdin/stdout (embedding and testing mode).
    #[arg(long)]
    ui_cmd: Option<String>,

    /// Arguments for the UI command, repeatable.
    #[arg(long = "ui-arg")]
    ui_args: Vec<String>,

    /// Override the per-user configuration directory.
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Default log filter, e.g. "debug" or "jsui_shell=debug". RUST_LOG
    /// still wins when set.
    #[arg(long)]
    log_filter: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = logging::init(args.log_filter.as_deref());

    // Current-thread runtime plus a LocalSet: command handlers interleave
    // cooperatively at await points, never in parallel.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the shell runtime")?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run(args))
}

async fn run(args: Args) -> Result<()> {
    let store = match &args.config_dir {
        Some(dir) => ConfigStore::new(dir.join("config.json")),
        None => ConfigStore::at_default_location(),
    };
    info!(config = %store.path().display(), "Using config store");
    let store = Arc::new(Mutex::new(store));

    let mut plugins = PluginRegistry::new();
    plugins.register(Plugin::with_default_handlers("scaffold"));

    let connection = BridgeConnection::new();
    let shell = Shell::new(
        store,
        Arc::new(plugins),
        Arc::new(NativeDialogs),
        connection.pusher(),
    );
    let mut router = CommandRouter::new();
    shell.register_channels(&mut router);

    match args.ui_cmd {
        Some(ui_cmd) => {
            info!(command = %ui_cmd, "Launching UI process");
            let mut child = tokio::process::Command::new(&ui_cmd)
                .args(&args.ui_args)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .spawn()
                .with_context(|| format!("failed to launch UI process '{}'", ui_cmd))?;

            let reader = child.stdout.take().context("UI process has no stdout")?;
            let writer = child.stdin.take().context("UI process has no stdin")?;

            connection
                .serve(router, reader, writer)
                .await
                .context("bridge failed")?;

            let status = child.wait().await.context("failed to reap UI process")?;
            info!(%status, "UI process exited");
        }
        None => {
            info!("Serving bridge on stdin/stdout");
            connection
                .serve(router, tokio::io::stdin(), tokio::io::stdout())
                .await
                .context("bridge failed")?;
        }
    }

    Ok(())
}

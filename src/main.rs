//! A dynamic tiling window manager for X11.
//!
//! Arbitrates screen space among top-level windows across a fixed set
//! of virtual desktops, dispatches key and button bindings to internal
//! actions, and publishes a compact status line on stdout for an
//! external panel. Configuration is compile-time; see `config.rs`.

mod config;
mod wm;

use std::io;
use std::process;

use tracing::error;
use tracing_subscriber::EnvFilter;

use wm::WindowManager;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    match args.len() {
        1 => {}
        2 if args[1] == "-v" => {
            println!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            return;
        }
        _ => {
            eprintln!("usage: {} [-v]", args[0]);
            process::exit(2);
        }
    }

    // Logging goes to stderr; stdout carries only the status line.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            error!("fatal: {err:#}");
            eprintln!("{}: {err:#}", env!("CARGO_PKG_NAME"));
            1
        }
    };
    process::exit(code);
}

fn run() -> anyhow::Result<i32> {
    let mut manager = WindowManager::new()?;
    let code = manager.run()?;
    manager.cleanup()?;
    Ok(code)
}

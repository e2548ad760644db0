//! Session Module
//!
//! Child process plumbing: spawning user commands and reaping their
//! exits so zombies do not accumulate.

use std::process::Command;

use anyhow::{bail, Result};
use tracing::error;

/// Install SIGCHLD disposition for automatic reaping and drain any
/// children inherited from a previous life.
pub fn install_sigchld() -> Result<()> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = libc::SIG_IGN;
        sa.sa_flags = libc::SA_NOCLDSTOP | libc::SA_NOCLDWAIT | libc::SA_RESTART;
        libc::sigemptyset(&mut sa.sa_mask);
        if libc::sigaction(libc::SIGCHLD, &sa, std::ptr::null_mut()) == -1 {
            bail!("cannot install SIGCHLD handler");
        }
        while libc::waitpid(-1, std::ptr::null_mut(), libc::WNOHANG) > 0 {}
    }
    Ok(())
}

/// Run a user command in its own session. The X connection socket is
/// close-on-exec, so the child does not inherit it past exec.
pub fn spawn(cmd: &'static [&'static str]) {
    let Some((program, args)) = cmd.split_first() else {
        return;
    };
    let mut command = Command::new(program);
    command.args(args);
    unsafe {
        use std::os::unix::process::CommandExt;
        command.pre_exec(|| {
            libc::setsid();
            Ok(())
        });
    }
    if let Err(err) = command.spawn() {
        error!("spawn {}: {}", program, err);
    }
}

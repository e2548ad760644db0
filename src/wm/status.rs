//! Status Module
//!
//! Publishes one line of desktop state on stdout after every change
//! that could alter it, for an external panel to render. Each desktop
//! contributes a record of ':'-separated values: index, client count,
//! layout mode id, whether it is the current desktop, and whether any
//! of its clients carries the urgent hint. Records are separated by
//! single spaces and the stream is flushed after each line.

use std::io::{self, Write};

use tracing::warn;

use crate::wm::desktop::Desktop;

pub fn format_line(desktops: &[Desktop], current: usize) -> String {
    desktops
        .iter()
        .enumerate()
        .map(|(i, d)| {
            format!(
                "{}:{}:{}:{}:{}",
                i,
                d.clients.len(),
                d.mode.index(),
                u8::from(i == current),
                u8::from(d.has_urgent()),
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn publish(desktops: &[Desktop], current: usize) {
    let mut out = io::stdout();
    if writeln!(out, "{}", format_line(desktops, current)).and_then(|_| out.flush()).is_err() {
        warn!("status consumer went away");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::client::Client;
    use crate::wm::layout::Mode;

    #[test]
    fn test_format_line() {
        let mut desktops = vec![
            Desktop::new(Mode::Tile, 0.52, true),
            Desktop::new(Mode::Monocle, 0.52, true),
            Desktop::new(Mode::Tile, 0.52, true),
        ];
        desktops[0].attach(Client::new(1), true);
        desktops[0].attach(Client::new(2), true);
        let mut urgent = Client::new(3);
        urgent.set_urgent(true);
        desktops[2].attach(urgent, true);

        assert_eq!(format_line(&desktops, 0), "0:2:0:1:0 1:0:1:0:0 2:1:0:0:1");
        assert_eq!(format_line(&desktops, 1), "0:2:0:0:0 1:0:1:1:0 2:1:0:0:1");
    }
}

//! Focus Module
//!
//! Recomputes input focus, border colors and Z-order after any state
//! change. The stacking discipline is a fixed total order of six tiers,
//! top to bottom: the current client when floating or transient, other
//! floating/transient clients, the current client when tiled, the
//! current client when fullscreen, other fullscreen clients, and the
//! remaining tiled clients.

use anyhow::Result;
use tracing::debug;
use x11rb::protocol::xproto::Window;

use crate::config;
use crate::wm::client::Client;
use crate::wm::layout::Mode;
use crate::wm::WindowManager;

/// Stacking tier for one client; lower sorts on top.
fn tier(c: &Client, current: Window) -> u8 {
    let is_current = c.win == current;
    let float_ish = c.is_floating() || c.is_transient();
    if is_current && float_ish {
        0
    } else if !is_current && float_ish && !c.is_fullscreen() {
        1
    } else if is_current && !c.is_fullscreen() {
        2
    } else if is_current {
        3
    } else if c.is_fullscreen() {
        4
    } else {
        5
    }
}

/// Total stacking order for a client list, top to bottom. Clients keep
/// list order within a tier.
pub fn stacking_order(clients: &[Client], current: Window) -> Vec<Window> {
    let mut order: Vec<(u8, Window)> = clients.iter().map(|c| (tier(c, current), c.win)).collect();
    order.sort_by_key(|&(t, _)| t);
    order.into_iter().map(|(_, w)| w).collect()
}

/// A window is borderless when it is alone on its desktop, fullscreen,
/// or tiled under MONOCLE.
pub fn border_width_for(c: &Client, nclients: usize, mode: Mode, border: u32) -> u32 {
    if nclients == 1 || c.is_fullscreen() || (mode == Mode::Monocle && c.is_tileable()) {
        0
    } else {
        border
    }
}

impl WindowManager {
    /// Focus `c` on desktop `d` and reconcile borders, stacking and the
    /// `_NET_ACTIVE_WINDOW` root property.
    ///
    /// `c` may be None, the current client, `prev_focus`, or any list
    /// member; see [`Desktop::refocus`](crate::wm::desktop::Desktop::refocus)
    /// for how the focus references move. X work is only performed when
    /// `d` is the visible desktop, so exactly one client system-wide
    /// carries input focus.
    pub(crate) fn update_current(&mut self, d: usize, c: Option<Window>) -> Result<()> {
        let visible = d == self.current_desktop;
        self.desktops[d].refocus(c);

        if self.desktops[d].clients.is_empty() {
            if visible {
                self.atoms
                    .clear_active_window(&self.display.conn, self.display.root)?;
            }
            return Ok(());
        }
        if !visible {
            return Ok(());
        }

        let dsk = &self.desktops[d];
        let mode = dsk.mode;
        let nclients = dsk.clients.len();
        // refocus() guarantees a current on a non-empty list.
        let Some(current) = dsk.current else {
            return Ok(());
        };
        debug!("focus -> window {:#x} on desktop {}", current, d);

        let order = stacking_order(&dsk.clients, current);
        let borders: Vec<(Window, bool, u32)> = dsk
            .clients
            .iter()
            .map(|cl| {
                (
                    cl.win,
                    cl.win == current,
                    border_width_for(cl, nclients, mode, config::BORDER_WIDTH),
                )
            })
            .collect();

        for (win, focused, width) in borders {
            self.display.set_border(win, focused, width)?;
            if config::CLICK_TO_FOCUS {
                if focused {
                    self.display.release_focus_click(win)?;
                } else {
                    self.display.intercept_focus_click(win)?;
                }
            }
        }
        self.display.restack(&order)?;
        self.display.focus_window(current)?;
        self.atoms
            .set_active_window(&self.display.conn, self.display.root, current)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::client::Client;

    fn client(win: Window, floating: bool, transient: bool, fullscreen: bool) -> Client {
        let mut c = Client::new(win);
        if transient {
            c.set_transient(true);
        }
        if floating {
            c.set_floating(true);
        }
        c.set_fullscreen(fullscreen);
        c
    }

    #[test]
    fn test_stacking_tiers() {
        let clients = vec![
            client(1, false, false, false), // tiled
            client(2, true, false, false),  // floating
            client(3, false, false, true),  // fullscreen
            client(4, false, true, false),  // transient
            client(5, false, false, false), // tiled, current
        ];
        let order = stacking_order(&clients, 5);
        // floats above the tiled current, fullscreen below it, plain
        // tiled windows at the bottom.
        assert_eq!(order, vec![2, 4, 5, 3, 1]);
    }

    #[test]
    fn test_floating_current_on_top() {
        let clients = vec![
            client(1, true, false, false),
            client(2, true, false, false),
            client(3, false, false, false),
        ];
        let order = stacking_order(&clients, 2);
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_fullscreen_current_above_other_fullscreen() {
        let clients = vec![
            client(1, false, false, true),
            client(2, false, false, true),
            client(3, false, false, false),
        ];
        let order = stacking_order(&clients, 2);
        assert_eq!(order, vec![2, 1, 3]);
    }

    #[test]
    fn test_border_width_policy() {
        let tiled = client(1, false, false, false);
        let fullscreen = client(2, false, false, true);
        let floating = client(3, true, false, false);

        // Lone client is always borderless.
        assert_eq!(border_width_for(&tiled, 1, Mode::Tile, 2), 0);
        assert_eq!(border_width_for(&tiled, 3, Mode::Tile, 2), 2);
        assert_eq!(border_width_for(&fullscreen, 3, Mode::Tile, 2), 0);
        // Tiled clients lose borders under monocle, floats keep them.
        assert_eq!(border_width_for(&tiled, 3, Mode::Monocle, 2), 0);
        assert_eq!(border_width_for(&floating, 3, Mode::Monocle, 2), 2);
    }
}

//! EWMH Module
//!
//! The interned ICCCM/EWMH atom table and the root/client property
//! traffic that goes with it.

use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::wrapper::ConnectionExt as _;

/// Holds all interned atoms.
#[derive(Debug, Clone, Copy)]
pub struct Atoms {
    pub wm_protocols: Atom,
    pub wm_delete_window: Atom,
    pub net_supported: Atom,
    pub net_wm_state: Atom,
    pub net_wm_state_fullscreen: Atom,
    pub net_active_window: Atom,
}

impl Atoms {
    /// Intern all required atoms.
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let intern = |name: &str| -> Result<Atom> {
            Ok(conn.intern_atom(false, name.as_bytes())?.reply()?.atom)
        };

        Ok(Self {
            wm_protocols: intern("WM_PROTOCOLS")?,
            wm_delete_window: intern("WM_DELETE_WINDOW")?,
            net_supported: intern("_NET_SUPPORTED")?,
            net_wm_state: intern("_NET_WM_STATE")?,
            net_wm_state_fullscreen: intern("_NET_WM_STATE_FULLSCREEN")?,
            net_active_window: intern("_NET_ACTIVE_WINDOW")?,
        })
    }

    /// Advertise the supported hints via `_NET_SUPPORTED` on the root.
    pub fn advertise<C: Connection>(&self, conn: &C, root: Window) -> Result<()> {
        let supported = [
            self.net_supported,
            self.net_wm_state,
            self.net_wm_state_fullscreen,
            self.net_active_window,
        ];
        conn.change_property32(
            PropMode::REPLACE,
            root,
            self.net_supported,
            AtomEnum::ATOM,
            &supported,
        )?;
        Ok(())
    }

    pub fn set_active_window<C: Connection>(
        &self,
        conn: &C,
        root: Window,
        window: Window,
    ) -> Result<()> {
        conn.change_property32(
            PropMode::REPLACE,
            root,
            self.net_active_window,
            AtomEnum::WINDOW,
            &[window],
        )?;
        Ok(())
    }

    pub fn clear_active_window<C: Connection>(&self, conn: &C, root: Window) -> Result<()> {
        conn.delete_property(root, self.net_active_window)?;
        Ok(())
    }

    /// Rewrite `_NET_WM_STATE` on a client to reflect its fullscreen
    /// state.
    pub fn set_fullscreen_state<C: Connection>(
        &self,
        conn: &C,
        window: Window,
        fullscreen: bool,
    ) -> Result<()> {
        let state: &[Atom] = if fullscreen {
            &[self.net_wm_state_fullscreen]
        } else {
            &[]
        };
        conn.change_property32(PropMode::REPLACE, window, self.net_wm_state, AtomEnum::ATOM, state)?;
        Ok(())
    }

    /// True when the window mapped with `_NET_WM_STATE` already set to
    /// fullscreen.
    pub fn initial_fullscreen<C: Connection>(&self, conn: &C, window: Window) -> bool {
        conn.get_property(false, window, self.net_wm_state, AtomEnum::ATOM, 0, 32)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .and_then(|reply| reply.value32().map(|mut v| v.any(|a| a == self.net_wm_state_fullscreen)))
            .unwrap_or(false)
    }

    /// Ask a window to close itself via WM_DELETE_WINDOW.
    pub fn send_delete<C: Connection>(&self, conn: &C, window: Window) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_: self.wm_protocols,
            data: ClientMessageData::from([self.wm_delete_window, x11rb::CURRENT_TIME, 0, 0, 0]),
        };
        conn.send_event(false, window, EventMask::NO_EVENT, event)?;
        Ok(())
    }
}

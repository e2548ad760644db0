//! Client Module
//!
//! A client wraps one managed top-level window together with the small
//! set of state flags the window manager tracks for it.

use bitflags::bitflags;
use x11rb::protocol::xproto::Window;

bitflags! {
    /// Per-client state flags.
    ///
    /// TRANSIENT implies FLOATING: transient windows are forced floating
    /// when they are adopted and never return to the tiled set, while a
    /// plain floating window can be reset to its tiling position.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ClientFlags: u8 {
        const URGENT     = 1 << 0;
        const TRANSIENT  = 1 << 1;
        const FULLSCREEN = 1 << 2;
        const FLOATING   = 1 << 3;
    }
}

/// One managed window and its state.
#[derive(Debug, Clone)]
pub struct Client {
    pub win: Window,
    pub flags: ClientFlags,
}

impl Client {
    pub fn new(win: Window) -> Self {
        Self {
            win,
            flags: ClientFlags::empty(),
        }
    }

    pub fn is_urgent(&self) -> bool {
        self.flags.contains(ClientFlags::URGENT)
    }

    pub fn is_transient(&self) -> bool {
        self.flags.contains(ClientFlags::TRANSIENT)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.flags.contains(ClientFlags::FULLSCREEN)
    }

    pub fn is_floating(&self) -> bool {
        self.flags.contains(ClientFlags::FLOATING)
    }

    /// Floating, transient or fullscreen clients keep their own geometry
    /// and are skipped by the layout engine.
    pub fn is_tileable(&self) -> bool {
        !self
            .flags
            .intersects(ClientFlags::FULLSCREEN | ClientFlags::TRANSIENT | ClientFlags::FLOATING)
    }

    pub fn set_urgent(&mut self, urgent: bool) {
        self.flags.set(ClientFlags::URGENT, urgent);
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.flags.set(ClientFlags::FULLSCREEN, fullscreen);
    }

    pub fn set_floating(&mut self, floating: bool) {
        // Transients stay floating no matter what.
        if !floating && self.is_transient() {
            return;
        }
        self.flags.set(ClientFlags::FLOATING, floating);
    }

    pub fn set_transient(&mut self, transient: bool) {
        self.flags.set(ClientFlags::TRANSIENT, transient);
        if transient {
            self.flags.insert(ClientFlags::FLOATING);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_forces_floating() {
        let mut c = Client::new(1);
        c.set_transient(true);
        assert!(c.is_floating());

        // A transient cannot be reset to tiling.
        c.set_floating(false);
        assert!(c.is_floating());
        assert!(!c.is_tileable());
    }

    #[test]
    fn test_tileable() {
        let mut c = Client::new(2);
        assert!(c.is_tileable());
        c.set_floating(true);
        assert!(!c.is_tileable());
        c.set_floating(false);
        assert!(c.is_tileable());
        c.set_fullscreen(true);
        assert!(!c.is_tileable());
    }
}

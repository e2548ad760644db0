//! Hints Module
//!
//! Readers for the ICCCM client properties the manager consults:
//! WM_CLASS, WM_TRANSIENT_FOR, the WM_HINTS urgency bit and
//! WM_PROTOCOLS.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;

use crate::wm::ewmh::Atoms;

/// WM_HINTS flag bit for the urgency (attention) hint.
const URGENCY_HINT: u32 = 1 << 8;

/// The (instance, class) pair from WM_CLASS, when set.
pub fn wm_class<C: Connection>(conn: &C, window: Window) -> Option<(String, String)> {
    let reply = conn
        .get_property(false, window, AtomEnum::WM_CLASS, AtomEnum::STRING, 0, 256)
        .ok()?
        .reply()
        .ok()?;
    let mut parts = reply.value.split(|&b| b == 0);
    let instance = String::from_utf8_lossy(parts.next()?).into_owned();
    let class = String::from_utf8_lossy(parts.next().unwrap_or(b"")).into_owned();
    Some((instance, class))
}

/// The window this one is transient for, if any.
pub fn transient_for<C: Connection>(conn: &C, window: Window) -> Option<Window> {
    conn.get_property(false, window, AtomEnum::WM_TRANSIENT_FOR, AtomEnum::WINDOW, 0, 1)
        .ok()?
        .reply()
        .ok()?
        .value32()?
        .next()
        .filter(|&w| w != 0)
}

/// Whether WM_HINTS currently carries the urgency bit.
pub fn is_urgent<C: Connection>(conn: &C, window: Window) -> bool {
    conn.get_property(false, window, AtomEnum::WM_HINTS, AtomEnum::WM_HINTS, 0, 9)
        .ok()
        .and_then(|cookie| cookie.reply().ok())
        .and_then(|reply| reply.value32().and_then(|mut v| v.next()))
        .map_or(false, |flags| flags & URGENCY_HINT != 0)
}

/// Whether the window advertises WM_DELETE_WINDOW in WM_PROTOCOLS.
pub fn supports_delete<C: Connection>(conn: &C, atoms: &Atoms, window: Window) -> bool {
    conn.get_property(false, window, atoms.wm_protocols, AtomEnum::ATOM, 0, 32)
        .ok()
        .and_then(|cookie| cookie.reply().ok())
        .and_then(|reply| reply.value32().map(|mut v| v.any(|a| a == atoms.wm_delete_window)))
        .unwrap_or(false)
}

//! Keyboard Module
//!
//! Key and button grabs, the keycode/keysym mapping, and the lock-key
//! modifier hygiene. NumLock and CapsLock show up in event state masks
//! without meaning anything for bindings, so every binding is grabbed
//! under all four lock combinations and both sides of a comparison are
//! stripped of the lock bits first.

use anyhow::Result;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;

use crate::config;
use crate::wm::layout::Mode;

/// Core modifier masks as they appear in X event state.
pub const MOD_SHIFT: u16 = 1;
pub const MOD_LOCK: u16 = 1 << 1;
pub const MOD_CONTROL: u16 = 1 << 2;
pub const MOD4: u16 = 1 << 6;

/// Keysym values for the compile-time binding table.
pub mod keysyms {
    pub const XK_TAB: u32 = 0xff09;
    pub const XK_RETURN: u32 = 0xff0d;
    pub const XK_LEFT: u32 = 0xff51;
    pub const XK_UP: u32 = 0xff52;
    pub const XK_RIGHT: u32 = 0xff53;
    pub const XK_DOWN: u32 = 0xff54;
    pub const XK_NUM_LOCK: u32 = 0xff7f;
    pub const XK_1: u32 = 0x31;
    pub const XK_2: u32 = 0x32;
    pub const XK_3: u32 = 0x33;
    pub const XK_4: u32 = 0x34;
    pub const XK_B: u32 = 0x62;
    pub const XK_C: u32 = 0x63;
    pub const XK_F: u32 = 0x66;
    pub const XK_G: u32 = 0x67;
    pub const XK_H: u32 = 0x68;
    pub const XK_J: u32 = 0x6a;
    pub const XK_K: u32 = 0x6b;
    pub const XK_L: u32 = 0x6c;
    pub const XK_M: u32 = 0x6d;
    pub const XK_P: u32 = 0x70;
    pub const XK_Q: u32 = 0x71;
    pub const XK_T: u32 = 0x74;
    pub const XK_U: u32 = 0x75;
}

/// What a drag session does with pointer motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    Resize,
}

/// An internal action a key or button binding dispatches to.
#[derive(Debug, Clone, Copy)]
pub enum Action {
    ChangeDesktop(usize),
    LastDesktop,
    RotateDesktop(i32),
    RotateFilled(i32),
    ClientToDesktop(usize),
    NextWin,
    PrevWin,
    MoveUp,
    MoveDown,
    SwapMaster,
    ResizeMaster(i32),
    ResizeStack(i32),
    SwitchMode(Mode),
    TogglePanel,
    FocusUrgent,
    KillClient,
    MoveResize { dx: i32, dy: i32, dw: i32, dh: i32 },
    Drag(DragKind),
    Spawn(&'static [&'static str]),
    Quit(i32),
}

/// One entry of the compile-time key binding table.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    pub mods: u16,
    pub keysym: u32,
    pub action: Action,
}

/// One entry of the compile-time button binding table.
#[derive(Debug, Clone, Copy)]
pub struct ButtonBinding {
    pub mods: u16,
    pub button: u8,
    pub action: Action,
}

/// Strip the lock-key noise bits from an event state mask.
pub fn clean_mask(state: u16, numlock_mask: u16) -> u16 {
    state & !(numlock_mask | MOD_LOCK)
}

/// The four lock-modifier combinations every binding is grabbed under.
fn lock_combos(numlock_mask: u16) -> [u16; 4] {
    [0, MOD_LOCK, numlock_mask, numlock_mask | MOD_LOCK]
}

/// The keyboard mapping snapshot taken at startup: keycode/keysym
/// translation plus the discovered NumLock modifier bit.
pub struct KeyboardMap {
    min_keycode: u8,
    keysyms_per_keycode: usize,
    keysyms: Vec<u32>,
    pub numlock_mask: u16,
}

impl KeyboardMap {
    pub fn new<C: Connection>(conn: &C) -> Result<Self> {
        let setup = conn.setup();
        let (min, max) = (setup.min_keycode, setup.max_keycode);
        let mapping = conn.get_keyboard_mapping(min, max - min + 1)?.reply()?;

        let mut map = Self {
            min_keycode: min,
            keysyms_per_keycode: mapping.keysyms_per_keycode as usize,
            keysyms: mapping.keysyms,
            numlock_mask: 0,
        };

        // Locate the modifier NumLock is mapped to.
        if let Some(code) = map.keycode_for(keysyms::XK_NUM_LOCK) {
            let modmap = conn.get_modifier_mapping()?.reply()?;
            let per = modmap.keycodes_per_modifier() as usize;
            for (i, chunk) in modmap.keycodes.chunks(per).enumerate() {
                if chunk.contains(&code) {
                    map.numlock_mask = 1 << i;
                    break;
                }
            }
        }
        Ok(map)
    }

    /// Unshifted keysym for a keycode.
    pub fn keysym_for(&self, keycode: u8) -> u32 {
        let idx = (keycode.saturating_sub(self.min_keycode)) as usize * self.keysyms_per_keycode;
        self.keysyms.get(idx).copied().unwrap_or(0)
    }

    /// First keycode producing the given keysym on any shift level.
    pub fn keycode_for(&self, keysym: u32) -> Option<u8> {
        self.keysyms
            .chunks(self.keysyms_per_keycode.max(1))
            .position(|chunk| chunk.contains(&keysym))
            .map(|i| self.min_keycode + i as u8)
    }
}

/// Grab every configured key on the root window, under all lock
/// combinations.
pub fn grab_keys<C: Connection>(conn: &C, root: Window, map: &KeyboardMap) -> Result<()> {
    conn.ungrab_key(0u8, root, ModMask::ANY)?;
    for binding in config::KEYS {
        if let Some(code) = map.keycode_for(binding.keysym) {
            for locks in lock_combos(map.numlock_mask) {
                conn.grab_key(
                    true,
                    root,
                    ModMask::from(binding.mods | locks),
                    code,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )?;
            }
        }
    }
    Ok(())
}

/// Grab the configured buttons on one managed client.
pub fn grab_buttons<C: Connection>(conn: &C, window: Window, numlock_mask: u16) -> Result<()> {
    for binding in config::BUTTONS {
        for locks in lock_combos(numlock_mask) {
            conn.grab_button(
                false,
                window,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                ButtonIndex::from(binding.button),
                ModMask::from(binding.mods | locks),
            )?;
        }
    }
    Ok(())
}

/// Find the key binding matching a key press, modulo lock noise.
pub fn match_key(keysym: u32, state: u16, numlock_mask: u16) -> Option<&'static KeyBinding> {
    config::KEYS.iter().find(|b| {
        b.keysym == keysym && clean_mask(b.mods, numlock_mask) == clean_mask(state, numlock_mask)
    })
}

/// Find the button binding matching a button press, modulo lock noise.
pub fn match_button(button: u8, state: u16, numlock_mask: u16) -> Option<&'static ButtonBinding> {
    config::BUTTONS.iter().find(|b| {
        b.button == button && clean_mask(b.mods, numlock_mask) == clean_mask(state, numlock_mask)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMLOCK: u16 = 1 << 4; // Mod2 on most setups

    #[test]
    fn test_clean_mask_strips_lock_noise() {
        let state = MOD4 | MOD_LOCK | NUMLOCK;
        assert_eq!(clean_mask(state, NUMLOCK), MOD4);
        // Real modifiers survive.
        assert_eq!(clean_mask(MOD4 | MOD_SHIFT, NUMLOCK), MOD4 | MOD_SHIFT);
    }

    #[test]
    fn test_match_key_ignores_lock_state() {
        // The table holds MOD4+j for next_win; a press with CapsLock
        // and NumLock active must still match.
        let pressed = MOD4 | MOD_LOCK | NUMLOCK;
        let hit = match_key(keysyms::XK_J, pressed, NUMLOCK);
        assert!(hit.is_some());
        assert!(matches!(hit.unwrap().action, Action::NextWin));

        // A different modifier set must not.
        assert!(match_key(keysyms::XK_J, MOD_CONTROL | MOD_SHIFT, NUMLOCK).is_none());
    }

    #[test]
    fn test_lock_combos() {
        assert_eq!(
            lock_combos(NUMLOCK),
            [0, MOD_LOCK, NUMLOCK, NUMLOCK | MOD_LOCK]
        );
    }
}

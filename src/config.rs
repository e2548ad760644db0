//! Configuration for the window manager.
//!
//! Everything is compile-time: constants, the key and button binding
//! tables, and the app placement rules. Edit and rebuild.

use crate::wm::keyboard::keysyms::*;
use crate::wm::keyboard::{Action, ButtonBinding, DragKind, KeyBinding, MOD4, MOD_CONTROL, MOD_SHIFT};
use crate::wm::layout::Mode;

/// Number of virtual desktops.
pub const DESKTOPS: usize = 4;
/// Desktop selected at startup.
pub const DEFAULT_DESKTOP: usize = 0;
/// Initial layout mode of every desktop.
pub const DEFAULT_MODE: Mode = Mode::Tile;
/// Fraction of the long screen axis given to the master area.
pub const MASTER_SIZE: f32 = 0.52;

/// Height in pixels of the strip reserved for an external panel.
pub const PANEL_HEIGHT: u32 = 18;
/// Panel strip at the top of the screen (false puts it at the bottom).
pub const TOP_PANEL: bool = true;
/// Whether the panel strip is reserved initially.
pub const SHOW_PANEL: bool = true;

/// Window border width in pixels.
pub const BORDER_WIDTH: u32 = 2;
/// Minimum window size a drag-resize may reach.
pub const MINWSZ: u32 = 50;
/// Border color of the focused window (0xRRGGBB).
pub const FOCUS_COLOR: u32 = 0x5e81ac;
/// Border color of unfocused windows (0xRRGGBB).
pub const UNFOCUS_COLOR: u32 = 0x3b4252;

/// Focus follows the mouse into a window.
pub const FOLLOW_MOUSE: bool = false;
/// Clicking an unfocused window focuses it, swallowing the click.
pub const CLICK_TO_FOCUS: bool = true;
/// New clients attach at the tail of the list instead of becoming the
/// new master.
pub const ATTACH_ASIDE: bool = true;
/// Moving a client to another desktop switches there with it.
pub const FOLLOW_WINDOW: bool = false;

/// App placement rules, matched on MapRequest against both the class
/// and the instance component of WM_CLASS (case-sensitive substring;
/// first hit wins). A negative desktop means "wherever we are".
pub struct AppRule {
    pub class: &'static str,
    pub desktop: i32,
    pub follow: bool,
    pub floating: bool,
}

pub static RULES: &[AppRule] = &[
    AppRule { class: "MPlayer", desktop: 3, follow: true, floating: false },
    AppRule { class: "Gimp", desktop: 2, follow: false, floating: true },
];

/// First rule whose pattern occurs in either WM_CLASS component.
pub fn match_rule(instance: &str, class: &str) -> Option<&'static AppRule> {
    RULES
        .iter()
        .find(|r| class.contains(r.class) || instance.contains(r.class))
}

const MOD: u16 = MOD4;
const SHIFT: u16 = MOD_SHIFT;
const CTRL: u16 = MOD_CONTROL;

static TERM_CMD: &[&str] = &["xterm"];
static MENU_CMD: &[&str] = &["dmenu_run"];

pub static KEYS: &[KeyBinding] = &[
    // desktops
    KeyBinding { mods: MOD, keysym: XK_1, action: Action::ChangeDesktop(0) },
    KeyBinding { mods: MOD, keysym: XK_2, action: Action::ChangeDesktop(1) },
    KeyBinding { mods: MOD, keysym: XK_3, action: Action::ChangeDesktop(2) },
    KeyBinding { mods: MOD, keysym: XK_4, action: Action::ChangeDesktop(3) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_1, action: Action::ClientToDesktop(0) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_2, action: Action::ClientToDesktop(1) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_3, action: Action::ClientToDesktop(2) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_4, action: Action::ClientToDesktop(3) },
    KeyBinding { mods: MOD, keysym: XK_TAB, action: Action::LastDesktop },
    KeyBinding { mods: MOD, keysym: XK_RIGHT, action: Action::RotateDesktop(1) },
    KeyBinding { mods: MOD, keysym: XK_LEFT, action: Action::RotateDesktop(-1) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_RIGHT, action: Action::RotateFilled(1) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_LEFT, action: Action::RotateFilled(-1) },
    // client focus and order
    KeyBinding { mods: MOD, keysym: XK_J, action: Action::NextWin },
    KeyBinding { mods: MOD, keysym: XK_K, action: Action::PrevWin },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_J, action: Action::MoveDown },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_K, action: Action::MoveUp },
    KeyBinding { mods: MOD, keysym: XK_RETURN, action: Action::SwapMaster },
    // layout
    KeyBinding { mods: MOD, keysym: XK_H, action: Action::ResizeMaster(-5) },
    KeyBinding { mods: MOD, keysym: XK_L, action: Action::ResizeMaster(5) },
    KeyBinding { mods: MOD, keysym: XK_DOWN, action: Action::ResizeStack(20) },
    KeyBinding { mods: MOD, keysym: XK_UP, action: Action::ResizeStack(-20) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_T, action: Action::SwitchMode(Mode::Tile) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_M, action: Action::SwitchMode(Mode::Monocle) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_B, action: Action::SwitchMode(Mode::Bstack) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_G, action: Action::SwitchMode(Mode::Grid) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_F, action: Action::SwitchMode(Mode::Float) },
    KeyBinding { mods: MOD, keysym: XK_B, action: Action::TogglePanel },
    // keyboard move/resize of the floating window
    KeyBinding { mods: MOD | CTRL, keysym: XK_H, action: Action::MoveResize { dx: -25, dy: 0, dw: 0, dh: 0 } },
    KeyBinding { mods: MOD | CTRL, keysym: XK_L, action: Action::MoveResize { dx: 25, dy: 0, dw: 0, dh: 0 } },
    KeyBinding { mods: MOD | CTRL, keysym: XK_K, action: Action::MoveResize { dx: 0, dy: -25, dw: 0, dh: 0 } },
    KeyBinding { mods: MOD | CTRL, keysym: XK_J, action: Action::MoveResize { dx: 0, dy: 25, dw: 0, dh: 0 } },
    KeyBinding { mods: MOD | CTRL | SHIFT, keysym: XK_H, action: Action::MoveResize { dx: 0, dy: 0, dw: -25, dh: 0 } },
    KeyBinding { mods: MOD | CTRL | SHIFT, keysym: XK_L, action: Action::MoveResize { dx: 0, dy: 0, dw: 25, dh: 0 } },
    KeyBinding { mods: MOD | CTRL | SHIFT, keysym: XK_K, action: Action::MoveResize { dx: 0, dy: 0, dw: 0, dh: -25 } },
    KeyBinding { mods: MOD | CTRL | SHIFT, keysym: XK_J, action: Action::MoveResize { dx: 0, dy: 0, dw: 0, dh: 25 } },
    // misc
    KeyBinding { mods: MOD, keysym: XK_U, action: Action::FocusUrgent },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_C, action: Action::KillClient },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_RETURN, action: Action::Spawn(TERM_CMD) },
    KeyBinding { mods: MOD, keysym: XK_P, action: Action::Spawn(MENU_CMD) },
    KeyBinding { mods: MOD | SHIFT, keysym: XK_Q, action: Action::Quit(0) },
];

pub static BUTTONS: &[ButtonBinding] = &[
    ButtonBinding { mods: MOD, button: 1, action: Action::Drag(DragKind::Move) },
    ButtonBinding { mods: MOD, button: 3, action: Action::Drag(DragKind::Resize) },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_matches_either_class_component() {
        let rule = match_rule("gimp-2.10", "Gimp").unwrap();
        assert_eq!(rule.desktop, 2);
        assert!(rule.floating);

        // Substring match on the instance component alone.
        let rule = match_rule("MPlayer", "mpv-wrapper").unwrap();
        assert_eq!(rule.desktop, 3);

        // Matching is case-sensitive.
        assert!(match_rule("mplayer", "gimp").is_none());
        assert!(match_rule("xterm", "XTerm").is_none());
    }

    #[test]
    fn test_rule_targets_stay_in_range() {
        for rule in RULES {
            assert!(rule.desktop < DESKTOPS as i32);
        }
    }
}

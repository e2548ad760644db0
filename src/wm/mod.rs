//! Window Manager Module
//!
//! The root state machine. One `WindowManager` owns the display
//! connection, the fixed set of virtual desktops, and the event loop.
//! Every event handler mutates the client/desktop model, asks the
//! layout engine to recompute geometry, asks the focus manager to
//! reconcile focus and Z-order, and publishes the status line.
//!
//! The whole manager is strictly single-threaded: the only suspension
//! point is the blocking fetch of the next X event, and every handler
//! runs to completion before the next event is considered.

pub mod client;
pub mod desktop;
pub mod display;
pub mod events;
pub mod ewmh;
pub mod focus;
pub mod hints;
pub mod keyboard;
pub mod layout;
pub mod moveresize;
pub mod session;
pub mod status;

use anyhow::{Context, Result};
use tracing::{info, warn};
use x11rb::protocol::xproto::{ModMask, Window};
use x11rb::protocol::xproto::ConnectionExt as _;

use crate::config;
use crate::wm::desktop::Desktop;
use crate::wm::display::Display;
use crate::wm::ewmh::Atoms;
use crate::wm::keyboard::{Action, KeyboardMap};
use crate::wm::layout::{Area, Geometry, Mode, Params};

pub struct WindowManager {
    pub(crate) display: Display,
    pub(crate) atoms: Atoms,
    pub(crate) keymap: KeyboardMap,
    pub(crate) desktops: Vec<Desktop>,
    pub(crate) current_desktop: usize,
    pub(crate) previous_desktop: usize,
    /// Screen height minus the panel strip.
    usable_height: u32,
    running: bool,
    exit_code: i32,
}

impl WindowManager {
    /// Connect, become the window manager, and set up grabs, atoms and
    /// desktops. Fails fatally when another WM is running or a startup
    /// resource cannot be allocated.
    pub fn new() -> Result<Self> {
        session::install_sigchld()?;
        let display = Display::open()?;
        display.become_wm()?;
        let atoms = Atoms::new(&display.conn).context("cannot intern atoms")?;
        atoms.advertise(&display.conn, display.root)?;
        let keymap = KeyboardMap::new(&display.conn).context("cannot read keyboard mapping")?;
        keyboard::grab_keys(&display.conn, display.root, &keymap)?;

        let usable_height = u32::from(display.height).saturating_sub(config::PANEL_HEIGHT);
        let desktops = (0..config::DESKTOPS)
            .map(|_| Desktop::new(config::DEFAULT_MODE, config::MASTER_SIZE, config::SHOW_PANEL))
            .collect();

        let mut wm = Self {
            display,
            atoms,
            keymap,
            desktops,
            current_desktop: 0,
            previous_desktop: 0,
            usable_height,
            running: false,
            exit_code: 0,
        };
        if config::DEFAULT_DESKTOP != 0 && config::DEFAULT_DESKTOP < config::DESKTOPS {
            wm.change_desktop(config::DEFAULT_DESKTOP)?;
        }
        // Zero out every desktop on the panel side.
        wm.publish_status();
        wm.display.flush()?;
        info!("managing {} desktops", config::DESKTOPS);
        Ok(wm)
    }

    /// The main loop: block on the next event, dispatch, flush. Handler
    /// errors are absorbed here; only losing the connection ends the
    /// loop besides a quit binding.
    pub fn run(&mut self) -> Result<i32> {
        self.running = true;
        while self.running {
            self.display.flush()?;
            let event = self.display.next_event()?;
            if let Err(err) = self.handle_event(event) {
                warn!("event handler failed: {err:#}");
            }
        }
        Ok(self.exit_code)
    }

    /// Release grabs and ask every remaining window to close.
    pub fn cleanup(&mut self) -> Result<()> {
        self.display
            .conn
            .ungrab_key(0u8, self.display.root, ModMask::ANY)?;
        for win in self.display.root_children()? {
            self.atoms.send_delete(&self.display.conn, win)?;
        }
        self.display.flush()?;
        Ok(())
    }

    /// The desktop and list position owning a window. Clients live on
    /// exactly one desktop, not necessarily the current one.
    pub(crate) fn locate(&self, win: Window) -> Option<(usize, usize)> {
        self.desktops
            .iter()
            .enumerate()
            .find_map(|(d, dsk)| dsk.position_of(win).map(|p| (d, p)))
    }

    /// Re-run the layout engine for one desktop. FLOAT and an empty
    /// list are no-ops; a lone client is shown monocle whatever the
    /// mode.
    pub(crate) fn tile(&self, d: usize) -> Result<()> {
        let dsk = &self.desktops[d];
        if dsk.clients.is_empty() || dsk.mode == Mode::Float {
            return Ok(());
        }
        let hh = self.usable_height + if dsk.show_panel { 0 } else { config::PANEL_HEIGHT };
        let cy = if config::TOP_PANEL && dsk.show_panel {
            config::PANEL_HEIGHT as i32
        } else {
            0
        };
        let mode = if dsk.clients.len() == 1 { Mode::Monocle } else { dsk.mode };
        let area = Area {
            ww: u32::from(self.display.width),
            hh,
            cy,
        };
        let params = Params {
            master_size: dsk.master_size,
            growth: dsk.growth,
            border: config::BORDER_WIDTH,
        };
        for (win, geometry) in layout::arrange(mode, &dsk.clients, area, params) {
            self.display.move_resize(win, geometry)?;
        }
        Ok(())
    }

    pub(crate) fn invoke(&mut self, action: Action) -> Result<()> {
        match action {
            Action::ChangeDesktop(i) => self.change_desktop(i),
            Action::LastDesktop => self.change_desktop(self.previous_desktop),
            Action::RotateDesktop(dir) => self.rotate(dir),
            Action::RotateFilled(dir) => self.rotate_filled(dir),
            Action::ClientToDesktop(i) => self.client_to_desktop(i),
            Action::NextWin => self.next_win(),
            Action::PrevWin => self.prev_win(),
            Action::MoveUp => self.move_current_up(),
            Action::MoveDown => self.move_current_down(),
            Action::SwapMaster => self.swap_master(),
            Action::ResizeMaster(step) => self.resize_master(step),
            Action::ResizeStack(px) => self.resize_stack(px),
            Action::SwitchMode(mode) => self.switch_mode(mode),
            Action::TogglePanel => self.toggle_panel(),
            Action::FocusUrgent => self.focus_urgent(),
            Action::KillClient => self.kill_client(),
            Action::MoveResize { dx, dy, dw, dh } => self.keyboard_moveresize(dx, dy, dw, dh),
            Action::Drag(kind) => self.mouse_drag(kind),
            Action::Spawn(cmd) => {
                session::spawn(cmd);
                Ok(())
            }
            Action::Quit(code) => {
                self.exit_code = code;
                self.running = false;
                Ok(())
            }
        }
    }

    /// Switch the visible desktop. To avoid flicker the new desktop's
    /// windows are mapped before the old desktop's are unmapped, the
    /// current windows at the edges of both sequences.
    pub(crate) fn change_desktop(&mut self, target: usize) -> Result<()> {
        if target == self.current_desktop || target >= config::DESKTOPS {
            return Ok(());
        }
        self.previous_desktop = self.current_desktop;

        if let Some(cur) = self.desktops[target].current {
            self.display.map_window(cur)?;
        }
        let incoming: Vec<Window> = self.desktops[target].clients.iter().map(|c| c.win).collect();
        for win in incoming {
            self.display.map_window(win)?;
        }

        let old = self.current_desktop;
        let old_current = self.desktops[old].current;
        let outgoing: Vec<Window> = self.desktops[old].clients.iter().map(|c| c.win).collect();
        for win in outgoing {
            if Some(win) != old_current {
                self.display.unmap_window(win)?;
            }
        }
        if let Some(win) = old_current {
            self.display.unmap_window(win)?;
        }

        self.current_desktop = target;
        self.tile(target)?;
        let cur = self.desktops[target].current;
        self.update_current(target, cur)?;
        self.publish_status();
        Ok(())
    }

    fn rotate(&mut self, dir: i32) -> Result<()> {
        let n = config::DESKTOPS as i32;
        let target = (self.current_desktop as i32 + dir).rem_euclid(n) as usize;
        self.change_desktop(target)
    }

    /// Like rotate, but skip empty desktops.
    fn rotate_filled(&mut self, dir: i32) -> Result<()> {
        let n = config::DESKTOPS as i32;
        let mut step = dir;
        for _ in 0..config::DESKTOPS {
            let target = (self.current_desktop as i32 + step).rem_euclid(n) as usize;
            if !self.desktops[target].clients.is_empty() {
                return self.change_desktop(target);
            }
            step += dir;
        }
        Ok(())
    }

    /// Move the current client to the tail of another desktop's list
    /// and focus it there; focus here falls back to `prev_focus`.
    fn client_to_desktop(&mut self, target: usize) -> Result<()> {
        let cd = self.current_desktop;
        if target == cd || target >= config::DESKTOPS {
            return Ok(());
        }
        let Some(win) = self.desktops[cd].current else {
            return Ok(());
        };
        let Some(moved) = self.desktops[cd].detach(win) else {
            return Ok(());
        };
        self.desktops[target].clients.push(moved);
        self.update_current(target, Some(win))?;

        self.display.unmap_window(win)?;
        self.desktops[cd].current = None;
        let fallback = self.desktops[cd].prev_focus;
        self.update_current(cd, fallback)?;

        if config::FOLLOW_WINDOW {
            self.change_desktop(target)?;
        } else {
            self.tile(cd)?;
        }
        self.publish_status();
        Ok(())
    }

    fn next_win(&mut self) -> Result<()> {
        let d = self.current_desktop;
        if self.desktops[d].clients.len() < 2 {
            return Ok(());
        }
        let Some(cur) = self.desktops[d].current else {
            return Ok(());
        };
        let next = self.desktops[d].next_client_of(cur);
        self.update_current(d, next)
    }

    fn prev_win(&mut self) -> Result<()> {
        let d = self.current_desktop;
        if self.desktops[d].clients.len() < 2 {
            return Ok(());
        }
        let Some(cur) = self.desktops[d].current else {
            return Ok(());
        };
        let prev = self.desktops[d].prev_client_of(cur);
        self.desktops[d].prev_focus = Some(cur);
        self.update_current(d, prev)
    }

    fn move_current_up(&mut self) -> Result<()> {
        let d = self.current_desktop;
        if let Some(cur) = self.desktops[d].current {
            self.desktops[d].move_up(cur);
            self.tile(d)?;
        }
        Ok(())
    }

    fn move_current_down(&mut self) -> Result<()> {
        let d = self.current_desktop;
        if let Some(cur) = self.desktops[d].current {
            self.desktops[d].move_down(cur);
            self.tile(d)?;
        }
        Ok(())
    }

    /// Promote the current client to master; a current master swaps
    /// with the first stack client instead. The head ends up focused.
    fn swap_master(&mut self) -> Result<()> {
        let d = self.current_desktop;
        if self.desktops[d].clients.len() < 2 {
            return Ok(());
        }
        let Some(cur) = self.desktops[d].current else {
            return Ok(());
        };
        self.desktops[d].promote(cur);
        self.tile(d)?;
        let head = self.desktops[d].head();
        self.update_current(d, head)
    }

    /// Grow or shrink the master area by `step` percent. Pushing the
    /// ratio out of (0.05, 0.95) is silently rejected.
    fn resize_master(&mut self, step: i32) -> Result<()> {
        let d = self.current_desktop;
        let size = self.desktops[d].master_size + step as f32 / 100.0;
        if !(0.05..=0.95).contains(&size) {
            return Ok(());
        }
        self.desktops[d].master_size = size;
        self.tile(d)
    }

    /// Grow or shrink the first stack client by a signed pixel amount.
    fn resize_stack(&mut self, px: i32) -> Result<()> {
        let d = self.current_desktop;
        self.desktops[d].growth += px;
        self.tile(d)
    }

    /// Switch the tiling mode. Switching to the mode already in use
    /// resets all floating windows back to the tiled set.
    fn switch_mode(&mut self, mode: Mode) -> Result<()> {
        let d = self.current_desktop;
        if self.desktops[d].mode == mode {
            for c in &mut self.desktops[d].clients {
                c.set_floating(false);
            }
        }
        self.desktops[d].mode = mode;
        self.tile(d)?;
        let cur = self.desktops[d].current;
        self.update_current(d, cur)?;
        self.publish_status();
        Ok(())
    }

    fn toggle_panel(&mut self) -> Result<()> {
        let d = self.current_desktop;
        self.desktops[d].show_panel = !self.desktops[d].show_panel;
        self.tile(d)
    }

    /// Focus the first urgent client, looking at the current desktop
    /// first, then everywhere.
    fn focus_urgent(&mut self) -> Result<()> {
        let cd = self.current_desktop;
        let urgent_on = |dsk: &Desktop| dsk.clients.iter().find(|c| c.is_urgent()).map(|c| c.win);
        if let Some(win) = urgent_on(&self.desktops[cd]) {
            return self.update_current(cd, Some(win));
        }
        for d in 0..config::DESKTOPS {
            if let Some(win) = urgent_on(&self.desktops[d]) {
                self.change_desktop(d)?;
                return self.update_current(d, Some(win));
            }
        }
        Ok(())
    }

    /// Close the current window: politely when it speaks
    /// WM_DELETE_WINDOW, forcibly otherwise.
    fn kill_client(&mut self) -> Result<()> {
        let d = self.current_desktop;
        let Some(win) = self.desktops[d].current else {
            return Ok(());
        };
        if hints::supports_delete(&self.display.conn, &self.atoms, win) {
            self.atoms.send_delete(&self.display.conn, win)?;
        } else {
            self.display.kill(win)?;
        }
        self.remove_client(win)
    }

    /// Flip a client's fullscreen state: rewrite `_NET_WM_STATE`, zero
    /// the border, and cover the whole screen including the panel
    /// strip. Leaving fullscreen restores the border; the next tile()
    /// restores geometry.
    pub(crate) fn set_fullscreen(&mut self, win: Window, fullscreen: bool) -> Result<()> {
        let Some((d, p)) = self.locate(win) else {
            return Ok(());
        };
        if self.desktops[d].clients[p].is_fullscreen() != fullscreen {
            self.desktops[d].clients[p].set_fullscreen(fullscreen);
            self.atoms
                .set_fullscreen_state(&self.display.conn, win, fullscreen)?;
        }
        if fullscreen {
            self.display.move_resize(
                win,
                Geometry {
                    x: 0,
                    y: 0,
                    width: u32::from(self.display.width),
                    height: self.usable_height + config::PANEL_HEIGHT,
                },
            )?;
        }
        self.display
            .set_border_width(win, if fullscreen { 0 } else { config::BORDER_WIDTH })?;
        Ok(())
    }

    /// Drop a client wherever it lives. Focus references are repointed
    /// before the record goes away; the visible desktop is re-tiled.
    pub(crate) fn remove_client(&mut self, win: Window) -> Result<()> {
        let Some((d, _)) = self.locate(win) else {
            return Ok(());
        };
        let dsk = &mut self.desktops[d];
        let was_prev = dsk.prev_focus == Some(win);
        let was_current = dsk.current == Some(win);
        let _ = dsk.detach(win);
        if was_current {
            dsk.current = None;
        }
        if was_prev {
            dsk.prev_focus = match dsk.current {
                Some(cur) => dsk.prev_client_of(cur),
                None => None,
            };
        }
        if was_current || self.desktops[d].clients.len() <= 1 {
            let fallback = self.desktops[d].prev_focus;
            self.update_current(d, fallback)?;
        }
        if d == self.current_desktop {
            self.tile(d)?;
        }
        Ok(())
    }
}

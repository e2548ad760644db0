//! Events Module
//!
//! One handler per X event type. Every handler mutates the
//! client/desktop model, re-tiles, reconciles focus and stacking, and
//! publishes status as needed; nothing escapes a handler as an error.

use anyhow::Result;
use tracing::{debug, warn};
use x11rb::protocol::xproto::*;
use x11rb::protocol::{ErrorKind, Event};
use x11rb::x11_utils::X11Error;

use crate::config;
use crate::wm::client::Client;
use crate::wm::keyboard;
use crate::wm::{hints, status, WindowManager};

/// Event was produced by SendEvent rather than the server.
fn is_synthetic(response_type: u8) -> bool {
    response_type & 0x80 != 0
}

impl WindowManager {
    pub(crate) fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::KeyPress(e) => self.key_press(&e),
            Event::ButtonPress(e) => self.button_press(&e),
            Event::MapRequest(e) => self.map_request(&e),
            Event::DestroyNotify(e) => self.destroy_notify(&e),
            Event::UnmapNotify(e) => self.unmap_notify(&e),
            Event::ConfigureRequest(e) => self.configure_request(&e),
            Event::ClientMessage(e) => self.client_message(&e),
            Event::PropertyNotify(e) => self.property_notify(&e),
            Event::EnterNotify(e) => self.enter_notify(&e),
            Event::FocusIn(e) => self.focus_in(&e),
            Event::Error(e) => {
                self.x_error(&e);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn key_press(&mut self, e: &KeyPressEvent) -> Result<()> {
        let keysym = self.keymap.keysym_for(e.detail);
        let state = u16::from(e.state);
        if let Some(binding) = keyboard::match_key(keysym, state, self.keymap.numlock_mask) {
            debug!("key press keysym {:#x} -> {:?}", keysym, binding.action);
            self.invoke(binding.action)?;
        }
        Ok(())
    }

    fn button_press(&mut self, e: &ButtonPressEvent) -> Result<()> {
        let Some((d, _)) = self.locate(e.event) else {
            return Ok(());
        };
        if d != self.current_desktop {
            return Ok(());
        }
        let is_current = self.desktops[d].current == Some(e.event);
        if config::CLICK_TO_FOCUS && !is_current && e.detail == 1 {
            self.update_current(d, Some(e.event))?;
        }
        let state = u16::from(e.state);
        if let Some(binding) = keyboard::match_button(e.detail, state, self.keymap.numlock_mask) {
            if self.desktops[d].current != Some(e.event) {
                self.update_current(d, Some(e.event))?;
            }
            self.invoke(binding.action)?;
        }
        Ok(())
    }

    /// Adopt a new top-level window: resolve the app rule, attach the
    /// client to its target desktop, pick up transient/fullscreen
    /// state, and show it if its desktop is visible.
    pub(crate) fn map_request(&mut self, e: &MapRequestEvent) -> Result<()> {
        let win = e.window;
        if self.display.is_override_redirect(win) {
            return Ok(());
        }
        if self.locate(win).is_some() {
            return Ok(());
        }

        let mut follow = false;
        let mut floating = false;
        let mut target = self.current_desktop;
        if let Some((instance, class)) = hints::wm_class(&self.display.conn, win) {
            if let Some(rule) = config::match_rule(&instance, &class) {
                follow = rule.follow;
                floating = rule.floating;
                if rule.desktop >= 0 && (rule.desktop as usize) < config::DESKTOPS {
                    target = rule.desktop as usize;
                }
            }
            debug!("map request {:#x} ({}/{}) -> desktop {}", win, instance, class, target);
        }

        let mut client = Client::new(win);
        if hints::transient_for(&self.display.conn, win).is_some() {
            client.set_transient(true);
        }
        if floating {
            client.set_floating(true);
        }
        self.display.adopt_window(win)?;
        self.desktops[target].attach(client, config::ATTACH_ASIDE);
        if self.desktops[target].current.is_none() {
            self.desktops[target].current = Some(win);
        }

        if self.atoms.initial_fullscreen(&self.display.conn, win) {
            self.set_fullscreen(win, true)?;
        }

        if target == self.current_desktop {
            self.tile(target)?;
            self.display.map_window(win)?;
            self.update_current(target, Some(win))?;
        } else if follow {
            self.change_desktop(target)?;
            self.update_current(target, Some(win))?;
        }
        keyboard::grab_buttons(&self.display.conn, win, self.keymap.numlock_mask)?;

        self.publish_status();
        Ok(())
    }

    fn destroy_notify(&mut self, e: &DestroyNotifyEvent) -> Result<()> {
        if self.locate(e.window).is_some() {
            self.remove_client(e.window)?;
        }
        self.publish_status();
        Ok(())
    }

    /// Only a synthetic UnmapNotify means the client asked to go away;
    /// real ones arrive for our own desktop switches.
    fn unmap_notify(&mut self, e: &UnmapNotifyEvent) -> Result<()> {
        if is_synthetic(e.response_type) && self.locate(e.window).is_some() {
            self.remove_client(e.window)?;
        }
        self.publish_status();
        Ok(())
    }

    /// Honor the requested geometry verbatim for anything that is not
    /// fullscreen, then re-tile so tiled windows snap back into place.
    pub(crate) fn configure_request(&mut self, e: &ConfigureRequestEvent) -> Result<()> {
        let fullscreen = self
            .locate(e.window)
            .map(|(d, p)| self.desktops[d].clients[p].is_fullscreen())
            .unwrap_or(false);
        if fullscreen {
            self.set_fullscreen(e.window, true)?;
        } else {
            self.display
                .conn
                .configure_window(e.window, &ConfigureWindowAux::from_configure_request(e))?;
        }
        self.tile(self.current_desktop)?;
        Ok(())
    }

    fn client_message(&mut self, e: &ClientMessageEvent) -> Result<()> {
        let Some((d, p)) = self.locate(e.window) else {
            return Ok(());
        };
        let data = e.data.as_data32();
        if e.type_ == self.atoms.net_wm_state
            && (data[1] == self.atoms.net_wm_state_fullscreen
                || data[2] == self.atoms.net_wm_state_fullscreen)
        {
            let fullscreen = self.desktops[d].clients[p].is_fullscreen();
            let on = data[0] == 1 || (data[0] == 2 && !fullscreen);
            self.set_fullscreen(e.window, on)?;
        } else if e.type_ == self.atoms.net_active_window && d == self.current_desktop {
            self.update_current(d, Some(e.window))?;
        }
        self.tile(self.current_desktop)?;
        Ok(())
    }

    /// WM_HINTS changes feed the urgent flag; a client never marks
    /// itself urgent while it is the focused one.
    fn property_notify(&mut self, e: &PropertyNotifyEvent) -> Result<()> {
        if e.atom != u32::from(AtomEnum::WM_HINTS) {
            return Ok(());
        }
        let Some((d, p)) = self.locate(e.window) else {
            return Ok(());
        };
        let focused = d == self.current_desktop && self.desktops[d].current == Some(e.window);
        let urgent = !focused && hints::is_urgent(&self.display.conn, e.window);
        self.desktops[d].clients[p].set_urgent(urgent);
        self.publish_status();
        Ok(())
    }

    fn enter_notify(&mut self, e: &EnterNotifyEvent) -> Result<()> {
        if !config::FOLLOW_MOUSE
            || e.mode != NotifyMode::NORMAL
            || e.detail == NotifyDetail::INFERIOR
        {
            return Ok(());
        }
        if let Some((d, _)) = self.locate(e.event) {
            if d == self.current_desktop {
                self.update_current(d, Some(e.event))?;
            }
        }
        Ok(())
    }

    /// Some applications call SetInputFocus on themselves; take the
    /// focus straight back.
    fn focus_in(&mut self, e: &FocusInEvent) -> Result<()> {
        let d = self.current_desktop;
        if let Some(current) = self.desktops[d].current {
            if current != e.event {
                self.update_current(d, Some(current))?;
            }
        }
        Ok(())
    }

    /// Races with dying windows produce a predictable set of errors;
    /// those are noise, the follow-up Destroy/UnmapNotify converges the
    /// state. Everything else is logged.
    fn x_error(&self, e: &X11Error) {
        let ignorable = e.error_kind == ErrorKind::Window
            || e.error_kind == ErrorKind::Drawable
            || (e.error_kind == ErrorKind::Match
                && (e.major_opcode == SET_INPUT_FOCUS_REQUEST
                    || e.major_opcode == CONFIGURE_WINDOW_REQUEST))
            || (e.error_kind == ErrorKind::Access
                && (e.major_opcode == GRAB_KEY_REQUEST || e.major_opcode == GRAB_BUTTON_REQUEST));
        if ignorable {
            debug!(
                "ignoring X error {:?} (request {})",
                e.error_kind, e.major_opcode
            );
        } else {
            warn!(
                "X error {:?}: request {}.{}, resource {:#x}",
                e.error_kind, e.major_opcode, e.minor_opcode, e.bad_value
            );
        }
    }

    pub(crate) fn publish_status(&self) {
        status::publish(&self.desktops, self.current_desktop);
    }
}

//! MoveResize Module
//!
//! Interactive move/resize of the current client. The mouse drag is a
//! modal sub-loop: the pointer is grabbed, motion deltas are applied
//! against a geometry snapshot, and MapRequest/ConfigureRequest events
//! arriving mid-drag are forwarded to their regular handlers so new
//! windows still get managed. Everything else is replayed once the
//! button is released.

use anyhow::Result;
use tracing::debug;
use x11rb::protocol::Event;

use crate::config;
use crate::wm::keyboard::DragKind;
use crate::wm::WindowManager;

impl WindowManager {
    /// Run a pointer drag on the current client. A dragged window
    /// leaves fullscreen, becomes floating, and the remaining tiled
    /// windows close the gap underneath it.
    pub(crate) fn mouse_drag(&mut self, kind: DragKind) -> Result<()> {
        let d = self.current_desktop;
        let Some(win) = self.desktops[d].current else {
            return Ok(());
        };
        let Ok(start) = self.display.geometry(win) else {
            return Ok(());
        };
        if !self.display.grab_pointer()? {
            return Ok(());
        }
        if kind == DragKind::Resize {
            // Anchor the deltas at the bottom-right corner.
            self.display
                .warp_pointer(win, start.width as i16, start.height as i16)?;
        }
        let (press_x, press_y) = self.display.pointer_position()?;
        debug!("drag {:?} on {:#x} from ({}, {})", kind, win, press_x, press_y);

        if self.desktops[d].client(win).is_some_and(|c| c.is_fullscreen()) {
            self.set_fullscreen(win, false)?;
        }
        if let Some(client) = self.desktops[d].client_mut(win) {
            client.set_floating(true);
        }
        self.tile(d)?;
        self.update_current(d, Some(win))?;

        let mut deferred = Vec::new();
        loop {
            self.display.flush()?;
            let event = self.display.next_event()?;
            match event {
                Event::MotionNotify(m) => {
                    let dx = i32::from(m.root_x) - i32::from(press_x);
                    let dy = i32::from(m.root_y) - i32::from(press_y);
                    match kind {
                        DragKind::Move => {
                            self.display.move_window(win, start.x + dx, start.y + dy)?;
                        }
                        DragKind::Resize => {
                            let w = start.width as i32 + dx;
                            let h = start.height as i32 + dy;
                            let w = if w > config::MINWSZ as i32 { w as u32 } else { start.width };
                            let h = if h > config::MINWSZ as i32 { h as u32 } else { start.height };
                            self.display.resize_window(win, w, h)?;
                        }
                    }
                }
                Event::ButtonRelease(_) => break,
                Event::ConfigureRequest(e) => self.configure_request(&e)?,
                Event::MapRequest(e) => self.map_request(&e)?,
                other => deferred.push(other),
            }
        }
        self.display.ungrab_pointer()?;

        for event in deferred {
            self.handle_event(event)?;
        }
        Ok(())
    }

    /// Keyboard move/resize: apply a fixed delta to the current client,
    /// forcing it floating first.
    pub(crate) fn keyboard_moveresize(&mut self, dx: i32, dy: i32, dw: i32, dh: i32) -> Result<()> {
        let d = self.current_desktop;
        let Some(win) = self.desktops[d].current else {
            return Ok(());
        };
        let Ok(geom) = self.display.geometry(win) else {
            return Ok(());
        };
        let needs_tile = self.desktops[d].client(win).is_some_and(|c| !c.is_floating());
        if needs_tile {
            if let Some(client) = self.desktops[d].client_mut(win) {
                client.set_floating(true);
            }
            self.tile(d)?;
        }
        let width = (geom.width as i32 + dw).max(config::MINWSZ as i32) as u32;
        let height = (geom.height as i32 + dh).max(config::MINWSZ as i32) as u32;
        self.display.move_window(win, geom.x + dx, geom.y + dy)?;
        self.display.resize_window(win, width, height)?;
        Ok(())
    }
}

//! Display Module
//!
//! The thin facade over the X server. Everything the manager does to a
//! window (geometry, borders, stacking, focus, grabs, map state) goes
//! through here, and events come back out one at a time. The rest of
//! the crate never touches the connection directly except to read
//! properties.

use anyhow::{bail, Context, Result};
use tracing::info;
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::*;
use x11rb::protocol::{ErrorKind, Event};
use x11rb::rust_connection::RustConnection;

use crate::config;
use crate::wm::layout::Geometry;

pub struct Display {
    pub conn: RustConnection,
    pub root: Window,
    pub width: u16,
    pub height: u16,
    focus_pixel: u32,
    unfocus_pixel: u32,
}

impl Display {
    /// Connect to the X server and allocate the two border colors.
    /// Color allocation failure is fatal; it only happens on first
    /// boot.
    pub fn open() -> Result<Self> {
        let (conn, screen_num) =
            x11rb::connect(None).context("cannot open display")?;
        let screen = &conn.setup().roots[screen_num];
        let root = screen.root;
        let width = screen.width_in_pixels;
        let height = screen.height_in_pixels;
        let colormap = screen.default_colormap;
        info!("connected to X screen {} ({}x{})", screen_num, width, height);

        let focus_pixel = alloc_color(&conn, colormap, config::FOCUS_COLOR)
            .context("cannot allocate focused border color")?;
        let unfocus_pixel = alloc_color(&conn, colormap, config::UNFOCUS_COLOR)
            .context("cannot allocate unfocused border color")?;

        Ok(Self {
            conn,
            root,
            width,
            height,
            focus_pixel,
            unfocus_pixel,
        })
    }

    /// Select the window-management event mask on the root. Acquiring
    /// SubstructureRedirect is the act of becoming the WM; only one
    /// client may hold it.
    pub fn become_wm(&self) -> Result<()> {
        let mask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::BUTTON_PRESS
            | EventMask::PROPERTY_CHANGE;
        let result = self
            .conn
            .change_window_attributes(self.root, &ChangeWindowAttributesAux::new().event_mask(mask))?
            .check();
        match result {
            Ok(()) => Ok(()),
            Err(ReplyError::X11Error(ref err)) if err.error_kind == ErrorKind::Access => {
                bail!("another window manager is already running")
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Subscribe to the per-client events the manager reacts to.
    pub fn adopt_window(&self, window: Window) -> Result<()> {
        let mut mask = EventMask::PROPERTY_CHANGE | EventMask::FOCUS_CHANGE;
        if config::FOLLOW_MOUSE {
            mask |= EventMask::ENTER_WINDOW;
        }
        self.conn
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().event_mask(mask))?;
        Ok(())
    }

    pub fn next_event(&self) -> Result<Event> {
        self.conn
            .wait_for_event()
            .context("lost connection to the X server")
    }

    pub fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }

    pub fn map_window(&self, window: Window) -> Result<()> {
        self.conn.map_window(window)?;
        Ok(())
    }

    pub fn unmap_window(&self, window: Window) -> Result<()> {
        self.conn.unmap_window(window)?;
        Ok(())
    }

    pub fn move_resize(&self, window: Window, geometry: Geometry) -> Result<()> {
        self.conn.configure_window(
            window,
            &ConfigureWindowAux::new()
                .x(geometry.x)
                .y(geometry.y)
                .width(geometry.width)
                .height(geometry.height),
        )?;
        Ok(())
    }

    pub fn move_window(&self, window: Window, x: i32, y: i32) -> Result<()> {
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().x(x).y(y))?;
        Ok(())
    }

    pub fn resize_window(&self, window: Window, width: u32, height: u32) -> Result<()> {
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().width(width).height(height))?;
        Ok(())
    }

    pub fn set_border(&self, window: Window, focused: bool, width: u32) -> Result<()> {
        let pixel = if focused {
            self.focus_pixel
        } else {
            self.unfocus_pixel
        };
        self.conn
            .change_window_attributes(window, &ChangeWindowAttributesAux::new().border_pixel(pixel))?;
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().border_width(width))?;
        Ok(())
    }

    pub fn set_border_width(&self, window: Window, width: u32) -> Result<()> {
        self.conn
            .configure_window(window, &ConfigureWindowAux::new().border_width(width))?;
        Ok(())
    }

    /// Realize a top-to-bottom stacking order: each window is stacked
    /// directly below its predecessor.
    pub fn restack(&self, order: &[Window]) -> Result<()> {
        for pair in order.windows(2) {
            self.conn.configure_window(
                pair[1],
                &ConfigureWindowAux::new()
                    .sibling(pair[0])
                    .stack_mode(StackMode::BELOW),
            )?;
        }
        Ok(())
    }

    pub fn focus_window(&self, window: Window) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::POINTER_ROOT, window, x11rb::CURRENT_TIME)?;
        Ok(())
    }

    /// Grab plain Button1 on an unfocused client so a click focuses it
    /// without reaching the application.
    pub fn intercept_focus_click(&self, window: Window) -> Result<()> {
        self.conn.grab_button(
            true,
            window,
            EventMask::BUTTON_PRESS,
            GrabMode::ASYNC,
            GrabMode::ASYNC,
            x11rb::NONE,
            x11rb::NONE,
            ButtonIndex::M1,
            ModMask::from(0u16),
        )?;
        Ok(())
    }

    pub fn release_focus_click(&self, window: Window) -> Result<()> {
        self.conn
            .ungrab_button(ButtonIndex::M1, window, ModMask::from(0u16))?;
        Ok(())
    }

    pub fn grab_pointer(&self) -> Result<bool> {
        let reply = self
            .conn
            .grab_pointer(
                false,
                self.root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                x11rb::CURRENT_TIME,
            )?
            .reply()?;
        Ok(reply.status == GrabStatus::SUCCESS)
    }

    pub fn ungrab_pointer(&self) -> Result<()> {
        self.conn.ungrab_pointer(x11rb::CURRENT_TIME)?;
        Ok(())
    }

    /// Warp the pointer to a position inside the given window.
    pub fn warp_pointer(&self, window: Window, x: i16, y: i16) -> Result<()> {
        self.conn
            .warp_pointer(x11rb::NONE, window, 0, 0, 0, 0, x, y)?;
        Ok(())
    }

    pub fn pointer_position(&self) -> Result<(i16, i16)> {
        let reply = self.conn.query_pointer(self.root)?.reply()?;
        Ok((reply.root_x, reply.root_y))
    }

    pub fn geometry(&self, window: Window) -> Result<Geometry> {
        let reply = self.conn.get_geometry(window)?.reply()?;
        Ok(Geometry {
            x: reply.x as i32,
            y: reply.y as i32,
            width: reply.width as u32,
            height: reply.height as u32,
        })
    }

    pub fn is_override_redirect(&self, window: Window) -> bool {
        self.conn
            .get_window_attributes(window)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map_or(false, |attrs| attrs.override_redirect)
    }

    pub fn root_children(&self) -> Result<Vec<Window>> {
        Ok(self.conn.query_tree(self.root)?.reply()?.children)
    }

    pub fn kill(&self, window: Window) -> Result<()> {
        self.conn.kill_client(window)?;
        Ok(())
    }
}

fn alloc_color(conn: &RustConnection, colormap: Colormap, rgb: u32) -> Result<u32> {
    let r = (((rgb >> 16) & 0xff) * 257) as u16;
    let g = (((rgb >> 8) & 0xff) * 257) as u16;
    let b = ((rgb & 0xff) * 257) as u16;
    Ok(conn.alloc_color(colormap, r, g, b)?.reply()?.pixel)
}

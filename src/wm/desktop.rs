//! Desktop Module
//!
//! One virtual desktop: an ordered client list plus the layout
//! parameters and focus references that belong to it. The list keeps
//! insertion order; index 0 is the head and, in the tiling layouts, the
//! master. `current` and `prev_focus` are non-owning references into
//! the list, repointed before a client is ever dropped.

use x11rb::protocol::xproto::Window;

use crate::wm::client::Client;
use crate::wm::layout::Mode;

#[derive(Debug)]
pub struct Desktop {
    pub mode: Mode,
    pub master_size: f32,
    pub growth: i32,
    pub show_panel: bool,
    pub clients: Vec<Client>,
    pub current: Option<Window>,
    pub prev_focus: Option<Window>,
}

impl Desktop {
    pub fn new(mode: Mode, master_size: f32, show_panel: bool) -> Self {
        Self {
            mode,
            master_size,
            growth: 0,
            show_panel,
            clients: Vec::new(),
            current: None,
            prev_focus: None,
        }
    }

    pub fn head(&self) -> Option<Window> {
        self.clients.first().map(|c| c.win)
    }

    pub fn position_of(&self, win: Window) -> Option<usize> {
        self.clients.iter().position(|c| c.win == win)
    }

    pub fn client(&self, win: Window) -> Option<&Client> {
        self.clients.iter().find(|c| c.win == win)
    }

    pub fn client_mut(&mut self, win: Window) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.win == win)
    }

    pub fn has_urgent(&self) -> bool {
        self.clients.iter().any(|c| c.is_urgent())
    }

    /// Attach a client: at the head by default, at the tail when
    /// `aside` is set.
    pub fn attach(&mut self, client: Client, aside: bool) {
        if aside || self.clients.is_empty() {
            self.clients.push(client);
        } else {
            self.clients.insert(0, client);
        }
    }

    /// Unlink a client from the list, leaving `current`/`prev_focus`
    /// untouched; the caller repoints them.
    pub fn detach(&mut self, win: Window) -> Option<Client> {
        let pos = self.position_of(win)?;
        Some(self.clients.remove(pos))
    }

    /// The client before `win` in list order, wrapping to the tail for
    /// the head. None when the list holds fewer than two clients.
    pub fn prev_client_of(&self, win: Window) -> Option<Window> {
        if self.clients.len() < 2 {
            return None;
        }
        let pos = self.position_of(win)?;
        if pos == 0 {
            self.clients.last().map(|c| c.win)
        } else {
            Some(self.clients[pos - 1].win)
        }
    }

    /// The client after `win`, wrapping to the head at the tail.
    pub fn next_client_of(&self, win: Window) -> Option<Window> {
        if self.clients.len() < 2 {
            return None;
        }
        let pos = self.position_of(win)?;
        Some(self.clients[(pos + 1) % self.clients.len()].win)
    }

    /// Swap `win` with its list-previous; at the head the client wraps
    /// to the tail instead.
    pub fn move_up(&mut self, win: Window) {
        let Some(pos) = self.position_of(win) else {
            return;
        };
        if self.clients.len() < 2 {
            return;
        }
        if pos == 0 {
            let c = self.clients.remove(0);
            self.clients.push(c);
        } else {
            self.clients.swap(pos, pos - 1);
        }
    }

    /// Swap `win` with its list-next; at the tail the client wraps to
    /// the head instead.
    pub fn move_down(&mut self, win: Window) {
        let Some(pos) = self.position_of(win) else {
            return;
        };
        if self.clients.len() < 2 {
            return;
        }
        if pos == self.clients.len() - 1 {
            let c = self.clients.remove(pos);
            self.clients.insert(0, c);
        } else {
            self.clients.swap(pos, pos + 1);
        }
    }

    /// Make `win` the head (master). A head is pushed down one slot so
    /// the operation always changes something on a multi-client list.
    pub fn promote(&mut self, win: Window) {
        let Some(pos) = self.position_of(win) else {
            return;
        };
        if self.clients.len() < 2 {
            return;
        }
        if pos == 0 {
            self.move_down(win);
        } else {
            let c = self.clients.remove(pos);
            self.clients.insert(0, c);
        }
    }

    /// Repoint `current`/`prev_focus` for a focus change to `c`.
    ///
    /// Focusing `prev_focus` rotates: the previous client becomes
    /// current and `prev_focus` walks to its list-previous, which may
    /// be None. Focusing anything else shifts the old current into
    /// `prev_focus`. Focusing the current client is a no-op here; the
    /// caller still repaints borders and restacks.
    pub fn refocus(&mut self, c: Option<Window>) {
        if self.clients.is_empty() {
            self.current = None;
            self.prev_focus = None;
            return;
        }
        if c == self.prev_focus {
            let cur = match self.prev_focus {
                Some(w) if self.position_of(w).is_some() => Some(w),
                _ => self.head(),
            };
            self.current = cur;
            self.prev_focus = cur.and_then(|w| self.prev_client_of(w));
        } else if c != self.current {
            self.prev_focus = self.current;
            self.current = c;
        }
        if self.current.is_none() {
            self.current = self.head();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop_with(wins: &[Window]) -> Desktop {
        let mut d = Desktop::new(Mode::Tile, 0.52, true);
        for &w in wins {
            d.attach(Client::new(w), true);
        }
        d
    }

    fn order(d: &Desktop) -> Vec<Window> {
        d.clients.iter().map(|c| c.win).collect()
    }

    #[test]
    fn test_attach_head_and_aside() {
        let mut d = Desktop::new(Mode::Tile, 0.52, true);
        d.attach(Client::new(1), false);
        d.attach(Client::new(2), false);
        d.attach(Client::new(3), false);
        assert_eq!(order(&d), vec![3, 2, 1]);

        let mut d = Desktop::new(Mode::Tile, 0.52, true);
        d.attach(Client::new(1), true);
        d.attach(Client::new(2), true);
        assert_eq!(order(&d), vec![1, 2]);
    }

    #[test]
    fn test_move_up_down_roundtrip() {
        let mut d = desktop_with(&[1, 2, 3]);
        d.move_up(2);
        assert_eq!(order(&d), vec![2, 1, 3]);
        d.move_down(2);
        assert_eq!(order(&d), vec![1, 2, 3]);
    }

    #[test]
    fn test_move_wraps_at_edges() {
        let mut d = desktop_with(&[1, 2, 3]);
        d.move_up(1);
        assert_eq!(order(&d), vec![2, 3, 1]);
        d.move_down(1);
        assert_eq!(order(&d), vec![1, 2, 3]);

        // Two applications of the wrapped pair are the identity.
        d.move_up(1);
        d.move_down(1);
        d.move_up(1);
        d.move_down(1);
        assert_eq!(order(&d), vec![1, 2, 3]);
    }

    #[test]
    fn test_promote() {
        let mut d = desktop_with(&[1, 2, 3]);
        d.promote(3);
        assert_eq!(order(&d), vec![3, 1, 2]);
        // Promoting the head pushes it down one slot.
        d.promote(3);
        assert_eq!(order(&d), vec![1, 3, 2]);
    }

    #[test]
    fn test_prev_next_wrap() {
        let d = desktop_with(&[1, 2, 3]);
        assert_eq!(d.prev_client_of(1), Some(3));
        assert_eq!(d.prev_client_of(3), Some(2));
        assert_eq!(d.next_client_of(3), Some(1));
        assert_eq!(d.next_client_of(1), Some(2));

        let single = desktop_with(&[9]);
        assert_eq!(single.prev_client_of(9), None);
        assert_eq!(single.next_client_of(9), None);
    }

    #[test]
    fn test_refocus_rotation() {
        let mut d = desktop_with(&[1, 2, 3]);
        d.refocus(Some(2));
        assert_eq!(d.current, Some(2));
        d.refocus(Some(3));
        assert_eq!((d.current, d.prev_focus), (Some(3), Some(2)));

        // Focusing prev_focus rotates and walks prev_focus backwards.
        d.refocus(Some(2));
        assert_eq!((d.current, d.prev_focus), (Some(2), Some(1)));
    }

    #[test]
    fn test_refocus_after_removing_current() {
        // 1(head) 2(current) 3, prev_focus = 1; client 2 goes away.
        let mut d = desktop_with(&[1, 2, 3]);
        d.current = Some(2);
        d.prev_focus = Some(1);
        assert!(d.detach(2).is_some());
        d.current = None;
        d.refocus(d.prev_focus);
        assert_eq!(d.current, Some(1));
        // prev_focus walked to the list-previous of the new current.
        assert_eq!(d.prev_focus, Some(3));
    }

    #[test]
    fn test_refocus_empty_clears_both() {
        let mut d = desktop_with(&[5]);
        d.refocus(Some(5));
        assert!(d.detach(5).is_some());
        d.refocus(None);
        assert_eq!((d.current, d.prev_focus), (None, None));
    }

    #[test]
    fn test_refocus_null_with_clients_falls_back_to_head() {
        let mut d = desktop_with(&[4, 5]);
        d.refocus(None);
        assert_eq!(d.current, Some(4));
    }
}

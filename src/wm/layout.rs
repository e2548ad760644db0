//! Layout Module
//!
//! The layout engine is a set of pure functions mapping the tileable
//! sub-sequence of a desktop's client list onto window placements.
//! Floating, transient and fullscreen clients keep their own geometry
//! and are never touched here.
//!
//! Four layouts are provided: a vertical-master stack (TILE), its
//! transpose with the master row on top (BSTACK), a near-square GRID,
//! and MONOCLE where every tileable client covers the whole area.

use x11rb::protocol::xproto::Window;

use crate::wm::client::Client;

/// Window geometry in root coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Per-desktop tiling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tile,
    Monocle,
    Bstack,
    Grid,
    Float,
}

impl Mode {
    /// Stable numeric id used on the status line.
    pub fn index(self) -> usize {
        match self {
            Mode::Tile => 0,
            Mode::Monocle => 1,
            Mode::Bstack => 2,
            Mode::Grid => 3,
            Mode::Float => 4,
        }
    }
}

/// Screen area available to the layout: full width `ww`, usable height
/// `hh`, and a vertical offset `cy` (non-zero when a top panel is shown).
#[derive(Debug, Clone, Copy)]
pub struct Area {
    pub ww: u32,
    pub hh: u32,
    pub cy: i32,
}

/// Layout parameters carried per desktop.
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub master_size: f32,
    pub growth: i32,
    pub border: u32,
}

/// Compute placements for all tileable clients under the given mode.
///
/// FLOAT never reaches this point and an empty tileable set yields no
/// placements. The single-client degenerate case (monocle regardless of
/// mode) is decided by the caller, which sees the whole client list.
pub fn arrange(mode: Mode, clients: &[Client], area: Area, params: Params) -> Vec<(Window, Geometry)> {
    match mode {
        Mode::Tile => stack(clients, area, params, false),
        Mode::Bstack => stack(clients, area, params, true),
        Mode::Grid => grid(clients, area, params),
        Mode::Monocle => monocle(clients, area),
        Mode::Float => Vec::new(),
    }
}

fn tileable(clients: &[Client]) -> Vec<Window> {
    clients
        .iter()
        .filter(|c| c.is_tileable())
        .map(|c| c.win)
        .collect()
}

/// Master/stack split. The master takes `master_size` of the long axis;
/// the remaining clients share the other side evenly, with the division
/// remainder and the signed `growth` offset absorbed by the first stack
/// client so no gap is left at the far edge.
fn stack(clients: &[Client], area: Area, params: Params, bottom: bool) -> Vec<(Window, Geometry)> {
    let wins = tileable(clients);
    let Some((&master, stackers)) = wins.split_first() else {
        return Vec::new();
    };
    let Area { ww, hh, cy } = area;
    let b = params.border;
    let n = stackers.len() as i32;

    if n == 0 {
        return vec![(
            master,
            Geometry {
                x: 0,
                y: cy,
                width: ww.saturating_sub(2 * b).max(1),
                height: hh.saturating_sub(2 * b).max(1),
            },
        )];
    }

    let mut out = Vec::with_capacity(wins.len());
    if bottom {
        let ma = (hh as f32 * params.master_size) as u32;
        out.push((
            master,
            Geometry {
                x: 0,
                y: cy,
                width: ww.saturating_sub(2 * b).max(1),
                height: ma.saturating_sub(b).max(1),
            },
        ));

        let row_y = cy + ma as i32;
        let row_h = hh.saturating_sub(ma + b).max(1);
        let z = (ww as i32 - params.growth) / n;
        let d = (ww as i32 - params.growth) % n;
        let mut cx = 0i32;
        for (i, &win) in stackers.iter().enumerate() {
            let mut w = z - b as i32;
            if i == 0 {
                w += d + params.growth;
            }
            let w = w.max(1) as u32;
            out.push((
                win,
                Geometry {
                    x: cx,
                    y: row_y,
                    width: w,
                    height: row_h,
                },
            ));
            cx += w as i32;
        }
    } else {
        let ma = (ww as f32 * params.master_size) as u32;
        out.push((
            master,
            Geometry {
                x: 0,
                y: cy,
                width: ma.saturating_sub(b).max(1),
                height: hh.saturating_sub(2 * b).max(1),
            },
        ));

        let col_x = ma as i32;
        let col_w = ww.saturating_sub(ma + b).max(1);
        let z = (hh as i32 - params.growth) / n;
        let d = (hh as i32 - params.growth) % n;
        let mut y = cy;
        for (i, &win) in stackers.iter().enumerate() {
            let mut h = z - b as i32;
            if i == 0 {
                h += d + params.growth;
            }
            let h = h.max(1) as u32;
            out.push((
                win,
                Geometry {
                    x: col_x,
                    y,
                    width: col_w,
                    height: h,
                },
            ));
            y += h as i32;
        }
    }
    out
}

/// Near-square grid, filled column by column, top to bottom. `cols` is
/// the smallest integer whose square covers the client count (five
/// clients prefer two columns); overflow rows land on the rightmost
/// columns so every client gets a cell.
fn grid(clients: &[Client], area: Area, params: Params) -> Vec<(Window, Geometry)> {
    let wins = tileable(clients);
    let n = wins.len();
    if n == 0 {
        return Vec::new();
    }
    let mut cols = 0usize;
    while cols <= n / 2 {
        if cols * cols >= n {
            break;
        }
        cols += 1;
    }
    if n == 5 {
        cols = 2;
    }
    let cols = cols.max(1);

    let Area { ww, hh, cy } = area;
    let b = params.border;
    let mut rows = n / cols;
    let ch = hh.saturating_sub(b);
    let cw = ww.saturating_sub(b) / cols as u32;

    let mut out = Vec::with_capacity(n);
    let mut rn = 0usize;
    let mut cn = 0usize;
    for (i, &win) in wins.iter().enumerate() {
        if i / rows.max(1) + 1 > cols - n % cols {
            rows = n / cols + 1;
        }
        let rows_u = rows.max(1) as u32;
        out.push((
            win,
            Geometry {
                x: (cn as u32 * cw) as i32,
                y: cy + (rn as u32 * ch / rows_u) as i32,
                width: cw.saturating_sub(b).max(1),
                height: (ch / rows_u).saturating_sub(b).max(1),
            },
        ));
        rn += 1;
        if rn >= rows {
            rn = 0;
            cn += 1;
        }
    }
    out
}

/// Every tileable client covers the full usable area, borderless.
fn monocle(clients: &[Client], area: Area) -> Vec<(Window, Geometry)> {
    tileable(clients)
        .into_iter()
        .map(|win| {
            (
                win,
                Geometry {
                    x: 0,
                    y: area.cy,
                    width: area.ww,
                    height: area.hh,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::client::Client;

    fn clients(wins: &[Window]) -> Vec<Client> {
        wins.iter().map(|&w| Client::new(w)).collect()
    }

    fn area() -> Area {
        // 1000x600 screen with an 18px top panel.
        Area {
            ww: 1000,
            hh: 582,
            cy: 18,
        }
    }

    fn params() -> Params {
        Params {
            master_size: 0.55,
            growth: 0,
            border: 1,
        }
    }

    #[test]
    fn test_tile_three_clients() {
        let cs = clients(&[10, 20, 30]);
        let placed = arrange(Mode::Tile, &cs, area(), params());
        assert_eq!(
            placed,
            vec![
                (
                    10,
                    Geometry {
                        x: 0,
                        y: 18,
                        width: 549,
                        height: 580
                    }
                ),
                (
                    20,
                    Geometry {
                        x: 550,
                        y: 18,
                        width: 449,
                        height: 290
                    }
                ),
                (
                    30,
                    Geometry {
                        x: 550,
                        y: 308,
                        width: 449,
                        height: 290
                    }
                ),
            ]
        );
    }

    #[test]
    fn test_tile_single_tileable_fills_area() {
        let mut cs = clients(&[10, 20, 30]);
        cs[1].set_floating(true);
        cs[2].set_fullscreen(true);
        let placed = arrange(Mode::Tile, &cs, area(), params());
        assert_eq!(
            placed,
            vec![(
                10,
                Geometry {
                    x: 0,
                    y: 18,
                    width: 998,
                    height: 580
                }
            )]
        );
    }

    #[test]
    fn test_tile_growth_absorbed_by_first_stack_client() {
        let cs = clients(&[1, 2, 3, 4]);
        let p = Params {
            growth: 30,
            ..params()
        };
        let placed = arrange(Mode::Tile, &cs, area(), p);
        // z = (582 - 30) / 3 = 184, remainder 0.
        assert_eq!(placed[1].1.height, 183 + 30);
        assert_eq!(placed[2].1.height, 183);
        assert_eq!(placed[3].1.height, 183);
        // Stack clients chain without gaps.
        assert_eq!(placed[2].1.y, placed[1].1.y + placed[1].1.height as i32);
        assert_eq!(placed[3].1.y, placed[2].1.y + placed[2].1.height as i32);
    }

    #[test]
    fn test_bstack_is_the_transpose() {
        let cs = clients(&[1, 2, 3]);
        let placed = arrange(Mode::Bstack, &cs, area(), params());
        // Master row on top, full width.
        assert_eq!(placed[0].1.x, 0);
        assert_eq!(placed[0].1.y, 18);
        assert_eq!(placed[0].1.width, 998);
        assert_eq!(placed[0].1.height, (582.0 * 0.55) as u32 - 1);
        // Stack row below the master, clients side by side.
        let row_y = 18 + (582.0 * 0.55) as i32;
        assert_eq!(placed[1].1.y, row_y);
        assert_eq!(placed[2].1.y, row_y);
        assert_eq!(placed[2].1.x, placed[1].1.x + placed[1].1.width as i32);
    }

    #[test]
    fn test_grid_columns() {
        // cols is the smallest square cover: 3 -> 2, 4 -> 2, 5 -> 2
        // (special case), 7 -> 3.
        for (n, want_cols) in [(3usize, 2u32), (4, 2), (5, 2), (7, 3)] {
            let wins: Vec<Window> = (1..=n as Window).collect();
            let cs = clients(&wins);
            let placed = arrange(Mode::Grid, &cs, area(), params());
            assert_eq!(placed.len(), n);
            let mut xs: Vec<i32> = placed.iter().map(|p| p.1.x).collect();
            xs.sort_unstable();
            xs.dedup();
            assert_eq!(xs.len() as u32, want_cols, "n={n}");
        }
    }

    #[test]
    fn test_grid_no_overlap() {
        let wins: Vec<Window> = (1..=5).collect();
        let cs = clients(&wins);
        let placed = arrange(Mode::Grid, &cs, area(), params());
        for (i, a) in placed.iter().enumerate() {
            for b in placed.iter().skip(i + 1) {
                let (ga, gb) = (a.1, b.1);
                let disjoint = ga.x + ga.width as i32 <= gb.x
                    || gb.x + gb.width as i32 <= ga.x
                    || ga.y + ga.height as i32 <= gb.y
                    || gb.y + gb.height as i32 <= ga.y;
                assert!(disjoint, "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_monocle_covers_everything() {
        let cs = clients(&[7, 8]);
        let placed = arrange(Mode::Monocle, &cs, area(), params());
        for (_, g) in placed {
            assert_eq!(
                g,
                Geometry {
                    x: 0,
                    y: 18,
                    width: 1000,
                    height: 582
                }
            );
        }
    }

    #[test]
    fn test_float_and_empty_are_noops() {
        let cs = clients(&[1]);
        assert!(arrange(Mode::Float, &cs, area(), params()).is_empty());
        assert!(arrange(Mode::Tile, &[], area(), params()).is_empty());
    }

    #[test]
    fn test_skips_non_tileable() {
        let mut cs = clients(&[1, 2, 3]);
        cs[0].set_transient(true);
        let placed = arrange(Mode::Tile, &cs, area(), params());
        assert!(placed.iter().all(|(w, _)| *w != 1));
        assert_eq!(placed.len(), 2);
    }
}

//! Half-block terminal renderer.
//!
//! Each terminal cell shows two vertically stacked pixels using `▀` with
//! separate foreground/background colours. The board is scaled uniformly to
//! fit the terminal and centred; everything is drawn from a [`Snapshot`].

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use crate::collision::Rect;
use crate::entity::{Pipe, PipeKind};
use crate::session::Snapshot;

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    const fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }

    fn term(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const LETTERBOX: Rgb = Rgb(18, 22, 30);
const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const CITY: Rgb = Rgb(160, 215, 225);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const PANEL: Rgb = Rgb(210, 185, 110);
const PANEL_IN: Rgb = Rgb(220, 195, 120);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Pixel buffer ────────────────────────────────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![LETTERBOX; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, LETTERBOX);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    pub fn flush(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = None;
        let mut prev_bg = None;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if prev_bg != Some(bot) {
                    queue!(out, style::SetBackgroundColor(bot.term()))?;
                    prev_bg = Some(bot);
                }
                if top == bot {
                    queue!(out, style::Print(' '))?;
                } else {
                    if prev_fg != Some(top) {
                        queue!(out, style::SetForegroundColor(top.term()))?;
                        prev_fg = Some(top);
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                prev_fg = None;
                prev_bg = None;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

/// Draws `n` horizontally centred on `cx`.
fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1; // 3px per digit + 1px spacing
    let start_x = cx - total_w / 2;
    for (i, ch) in s.bytes().enumerate() {
        draw_digit(buf, start_x + i as i32 * 4, y, ch - b'0', fg);
    }
}

// ── Board projection ───────────────────────────────────────────────────────

/// Maps board units onto terminal pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    scale: f64,
    ox: i32,
    oy: i32,
    /// Board area in pixels.
    area: Rect,
}

impl Viewport {
    fn fit(pw: usize, ph: usize, board_w: i32, board_h: i32) -> Self {
        let scale = (pw as f64 / board_w as f64).min(ph as f64 / board_h as f64);
        let w = (board_w as f64 * scale).round() as i32;
        let h = (board_h as f64 * scale).round() as i32;
        let ox = (pw as i32 - w) / 2;
        let oy = (ph as i32 - h) / 2;
        Viewport {
            scale,
            ox,
            oy,
            area: Rect::new(ox, oy, w, h),
        }
    }

    fn x(&self, bx: i32) -> i32 {
        self.ox + (bx as f64 * self.scale).floor() as i32
    }

    fn y(&self, by: i32) -> i32 {
        self.oy + (by as f64 * self.scale).floor() as i32
    }

    /// Board rectangle to pixel rectangle, clipped to the board area.
    fn project(&self, r: Rect) -> Rect {
        let x0 = self.x(r.x).max(self.area.x);
        let y0 = self.y(r.y).max(self.area.y);
        let x1 = self.x(r.x + r.w).min(self.area.x + self.area.w);
        let y1 = self.y(r.y + r.h).min(self.area.y + self.area.h);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Pixel size of `len` board units, never below one pixel.
    fn len(&self, len: i32) -> i32 {
        ((len as f64 * self.scale).round() as i32).max(1)
    }
}

// ── Scene ───────────────────────────────────────────────────────────────────

pub struct Renderer {
    buf: PixelBuf,
}

impl Renderer {
    pub fn new(pw: usize, ph: usize) -> Self {
        Self {
            buf: PixelBuf::new(pw, ph),
        }
    }

    pub fn resize(&mut self, pw: usize, ph: usize) {
        self.buf.resize(pw, ph);
    }

    pub fn draw(
        &mut self,
        snap: &Snapshot<'_>,
        frame: u64,
        out: &mut impl Write,
    ) -> io::Result<()> {
        self.compose(snap, frame);
        self.buf.flush(out)
    }

    fn compose(&mut self, snap: &Snapshot<'_>, frame: u64) {
        let vp = Viewport::fit(
            self.buf.w,
            self.buf.h,
            snap.board_width,
            snap.board_height,
        );
        self.buf.clear(LETTERBOX);
        if vp.area.is_empty() {
            return;
        }

        self.draw_sky(&vp);
        for pipe in snap.pipes() {
            self.draw_pipe(&vp, pipe);
        }
        self.draw_bird(&vp, snap, frame);

        let cx = vp.area.x + vp.area.w / 2;
        if snap.game_over {
            self.draw_game_over(&vp, snap, frame);
        } else {
            draw_number(&mut self.buf, cx, vp.area.y + 3, snap.score, WHITE);
            draw_number(&mut self.buf, cx, vp.area.y + 10, snap.high_score, BIRD_Y);
        }
    }

    fn draw_sky(&mut self, vp: &Viewport) {
        let a = vp.area;
        for y in 0..a.h {
            let t = ((y * 256) / a.h.max(1)) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            self.buf.fill_rect(a.x, a.y + y, a.w, 1, c);
        }
        // Skyline silhouette along the bottom edge.
        let base = a.y + a.h;
        for x in 0..a.w {
            let fx = x as f64 * 0.35;
            let h = ((fx.sin() * 0.5 + 0.5) * a.h as f64 * 0.06) as i32 + a.h / 14;
            let step = if (x / 3) % 2 == 0 { 0 } else { a.h / 40 };
            self.buf.fill_rect(a.x + x, base - h - step, 1, h + step, CITY);
        }
    }

    fn draw_pipe(&mut self, vp: &Viewport, pipe: &Pipe) {
        let body = vp.project(pipe.bounds());
        if body.is_empty() {
            return;
        }
        for x in 0..body.w {
            let c = pipe_shade(x, body.w);
            self.buf.fill_rect(body.x + x, body.y, 1, body.h, c);
        }

        // Cap on the opening end, a little wider than the body.
        let cap_h = vp.len(26).max(2);
        let cap_extra = vp.len(3);
        let cap_y = match pipe.kind {
            PipeKind::Top => vp.y(pipe.y + pipe.height) - cap_h,
            PipeKind::Bottom => vp.y(pipe.y),
        };
        let cap_x = vp.x(pipe.x) - cap_extra;
        let cap_w = vp.len(pipe.width) + cap_extra * 2;
        let clip = vp.area;
        for x in 0..cap_w {
            let px = cap_x + x;
            if px < clip.x || px >= clip.x + clip.w {
                continue;
            }
            let c = pipe_shade(x, cap_w);
            for y in 0..cap_h {
                let py = cap_y + y;
                if py >= clip.y && py < clip.y + clip.h {
                    let edge = y == 0 || y == cap_h - 1;
                    self.buf.set(px, py, if edge { CAP_DARK } else { c });
                }
            }
        }
    }

    fn draw_bird(&mut self, vp: &Viewport, snap: &Snapshot<'_>, frame: u64) {
        let bird = snap.bird;
        let r = vp.project(bird.bounds());
        if r.is_empty() {
            return;
        }
        let (x, y, w, h) = (r.x, r.y, r.w, r.h);
        self.buf.fill_rect(x, y, w, h, BIRD_Y);
        self.buf.fill_rect(x + 1, y, (w - 2).max(1), 1, BIRD_HI);

        // Wing flaps while rising or every few frames while alive.
        let up = bird.velocity_y < 0 || (!snap.game_over && frame % 8 < 4);
        let wing_y = if up { y + h / 3 } else { y + h / 2 };
        self.buf
            .fill_rect(x, wing_y, (w / 2).max(1), (h / 3).max(1), BIRD_WING);

        // Eye
        let ex = x + w - (w / 3).max(1) - 1;
        self.buf.fill_rect(ex, y + 1, (w / 4).max(1), (h / 3).max(1), BIRD_EYE);
        self.buf.set(ex + (w / 4).max(1) - 1, y + 1, BIRD_PUPIL);

        // Beak
        let beak_w = (w / 4).max(1);
        self.buf
            .fill_rect(x + w, y + h / 2, beak_w, (h / 3).max(1), BIRD_BEAK);
    }

    fn draw_game_over(&mut self, vp: &Viewport, snap: &Snapshot<'_>, frame: u64) {
        let a = vp.area;
        for y in a.y..a.y + a.h {
            for x in a.x..a.x + a.w {
                let c = self.buf.get(x as usize, y as usize);
                self.buf.set(x, y, c.dim());
            }
        }

        let cx = a.x + a.w / 2;
        let cy = a.y + a.h / 2;
        let panel_w = (a.w * 2 / 3).max(17);
        let panel_h = 22;
        let px = cx - panel_w / 2;
        let py = cy - panel_h / 2;
        self.buf
            .fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
        self.buf.fill_rect(px, py, panel_w, panel_h, PANEL);
        self.buf
            .fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PANEL_IN);

        draw_number(&mut self.buf, cx, py + 3, snap.score, WHITE);
        // Best score blinks when this run set it.
        let best = if snap.new_high_score && frame % 16 < 8 {
            BIRD_BEAK
        } else {
            BIRD_Y
        };
        draw_number(&mut self.buf, cx, py + 13, snap.high_score, best);
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::score::tests::MemoryStore;
    use crate::session::Session;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_viewport_fits_and_centres() {
        let vp = Viewport::fit(80, 48, 360, 640);
        assert_eq!(vp.area.h, 48);
        assert_eq!(vp.area.w, 27);
        assert_eq!(vp.area.x, (80 - 27) / 2);
        assert_eq!(vp.y(0), 0);
        assert_eq!(vp.y(640), 48);
    }

    #[test]
    fn test_projection_clips_to_board() {
        let vp = Viewport::fit(80, 48, 360, 640);
        let r = vp.project(Rect::new(300, -400, 64, 512));
        assert_eq!(r.y, vp.area.y);
        assert!(r.x + r.w <= vp.area.x + vp.area.w);
        assert!(vp.project(Rect::new(400, 0, 64, 100)).is_empty());
    }

    #[test]
    fn test_compose_does_not_touch_session() {
        let mut session = Session::new(GameConfig::default(), MemoryStore::default());
        session.place_pipes(&mut ChaCha8Rng::seed_from_u64(2));
        for _ in 0..40 {
            session.advance();
        }
        let before = format!("{:?}", session.snapshot());
        let mut renderer = Renderer::new(80, 48);
        renderer.compose(&session.snapshot(), 0);
        renderer.compose(&session.snapshot(), 1);
        assert_eq!(format!("{:?}", session.snapshot()), before);
    }

    #[test]
    fn test_tiny_terminal_does_not_panic() {
        let session = Session::new(GameConfig::default(), MemoryStore::default());
        for (w, h) in [(0, 0), (1, 2), (3, 1), (200, 2)] {
            let mut renderer = Renderer::new(w, h);
            renderer.compose(&session.snapshot(), 0);
        }
    }

    #[test]
    fn test_flush_writes_one_line_per_row_pair() {
        let buf = PixelBuf::new(4, 6);
        let mut out = Vec::new();
        buf.flush(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 2);
    }
}

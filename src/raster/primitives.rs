//! Rasterization of the shapes a panel needs: strokes, markers and borders.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;

/// Draw an anti-aliased line using Wu's algorithm.
///
/// Two pixels are plotted per step along the major axis, weighted by the
/// fractional distance from the ideal line.
///
/// # References
///
/// Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();
    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };
    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let gradient = if dx.abs() < f32::EPSILON { 1.0 } else { (y1 - y0) / dx };

    // Swap back to screen coordinates when plotting a steep line.
    let mut put = |major: i32, minor: i32, intensity: f32| {
        if steep {
            plot(fb, minor, major, color, intensity);
        } else {
            plot(fb, major, minor, color, intensity);
        }
    };

    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;
    put(xpxl1, ypxl1, rfpart(yend) * xgap);
    put(xpxl1, ypxl1 + 1, fpart(yend) * xgap);
    let mut intery = yend + gradient;

    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;
    put(xpxl2, ypxl2, rfpart(yend) * xgap);
    put(xpxl2, ypxl2 + 1, fpart(yend) * xgap);

    for x in (xpxl1 + 1)..xpxl2 {
        let ipart = intery.floor() as i32;
        put(x, ipart, rfpart(intery));
        put(x, ipart + 1, fpart(intery));
        intery += gradient;
    }
}

/// Draw a connected stroke through `points`, `width` pixels wide.
///
/// Wide strokes are built from parallel Wu lines offset along the segment
/// normal. Segments touching a non-finite point are skipped.
pub fn draw_polyline(fb: &mut Framebuffer, points: &[(f32, f32)], width: f32, color: Rgba) {
    let passes = width.max(1.0).round() as i32;
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
            continue;
        }

        let len = (x1 - x0).hypot(y1 - y0);
        let (nx, ny) = if len > f32::EPSILON { (-(y1 - y0) / len, (x1 - x0) / len) } else { (0.0, 0.0) };
        for k in 0..passes {
            let offset = k as f32 - (passes - 1) as f32 / 2.0;
            draw_line_aa(fb, x0 + nx * offset, y0 + ny * offset, x1 + nx * offset, y1 + ny * offset, color);
        }
    }
}

/// Draw a filled circle using the midpoint algorithm.
pub fn draw_circle(fb: &mut Framebuffer, cx: i32, cy: i32, radius: i32, color: Rgba) {
    if radius <= 0 {
        if radius == 0 && cx >= 0 && cy >= 0 {
            fb.set_pixel(cx as u32, cy as u32, color);
        }
        return;
    }

    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;
    while x >= y {
        span(fb, cx - x, cx + x, cy + y, color);
        span(fb, cx - x, cx + x, cy - y, color);
        span(fb, cx - y, cx + y, cy + x, color);
        span(fb, cx - y, cx + y, cy - x, color);

        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Draw a one-pixel rectangle outline.
pub fn draw_rect_outline(fb: &mut Framebuffer, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
    if width == 0 || height == 0 {
        return;
    }
    fb.fill_rect(x, y, width, 1, color);
    fb.fill_rect(x, y + height - 1, width, 1, color);
    fb.fill_rect(x, y, 1, height, color);
    fb.fill_rect(x + width - 1, y, 1, height, color);
}

#[inline]
fn plot(fb: &mut Framebuffer, x: i32, y: i32, color: Rgba, intensity: f32) {
    if x >= 0 && y >= 0 {
        let alpha = (f32::from(color.a) * intensity.clamp(0.0, 1.0)) as u8;
        fb.blend_pixel(x as u32, y as u32, color.with_alpha(alpha));
    }
}

#[inline]
fn span(fb: &mut Framebuffer, x1: i32, x2: i32, y: i32, color: Rgba) {
    if y < 0 || x2 < 0 {
        return;
    }
    let start = x1.max(0) as u32;
    let end = (x2 + 1) as u32;
    fb.fill_rect(start, y as u32, end.saturating_sub(start), 1, color);
}

#[inline]
fn fpart(x: f32) -> f32 {
    x - x.floor()
}

#[inline]
fn rfpart(x: f32) -> f32 {
    1.0 - fpart(x)
}

use super::model::{RadialMenu, SliceContent};
use super::{
    CENTER_ICON_ALPHA, CENTER_ICON_SIZE, CLOSE_GLYPH_SIZE, LABEL_FONT_SIZE, OUTLINE_EXTRA_WIDTH,
};
use crate::gui::menu::layout::Point;
use crate::gui::theme::ThemeColors;
use cairo::Context;
use gdk_pixbuf::Pixbuf;
use gdk4::prelude::*;
use palette::Srgba;
use std::f64::consts::{FRAC_PI_2, PI};

const ELLIPSIS: char = '\u{2026}';

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

/// Draw the whole menu for the current frame. A closed menu draws nothing.
pub fn draw(cr: &Context, menu: &RadialMenu, colors: &ThemeColors) -> Result<(), cairo::Error> {
    let Some(center) = menu.center() else {
        return Ok(());
    };
    let outer = menu.options().donut_size / 2.0;

    for index in 0..menu.slice_count() {
        let progress = menu.progress(index);
        if progress <= 0.0 {
            continue;
        }
        draw_slice(cr, menu, index, progress, center, colors)?;
    }

    // static overlays, outside the per-slice animation
    draw_close_glyph(cr, center, outer, menu)?;
    if let Some(icon) = &menu.options().center_icon {
        draw_center_icon(cr, center, outer, icon)?;
    }
    Ok(())
}

fn draw_slice(
    cr: &Context,
    menu: &RadialMenu,
    index: usize,
    progress: f64,
    center: Point,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let ring = menu.ring();
    let opts = menu.options();
    let outer = opts.donut_size / 2.0;
    let start = ring.arc_start_deg(index).to_radians();
    let end = start + ring.sweep().to_radians();

    cr.save()?;
    // slices pop out of the ring center as they animate in
    cr.translate(center.x, center.y);
    cr.scale(progress, progress);
    cr.translate(-center.x, -center.y);

    // slightly wider arc behind the colored one, read as an outline
    set_source(cr, colors.outline);
    cr.set_line_width(opts.thickness + OUTLINE_EXTRA_WIDTH);
    cr.arc(center.x, center.y, outer, start, end);
    cr.stroke()?;

    set_source(cr, menu.slice_color(index));
    cr.set_line_width(opts.thickness);
    cr.arc(center.x, center.y, outer, start, end);
    cr.stroke()?;

    if let Some(content) = menu.slice_content(index) {
        let centerline = outer - opts.thickness / 4.0;
        let mid = ring.mid_angle_deg(index);
        match content {
            SliceContent::Text(label) => {
                let max_arc_len = ring.sweep() / 360.0 * 2.0 * PI * centerline;
                draw_curved_label(cr, label, center, centerline, mid, max_arc_len, colors)?;
            }
            SliceContent::Icon(pixbuf) => {
                draw_slice_icon(cr, pixbuf, center, centerline, mid, opts.icon_size)?;
            }
        }
    }
    cr.restore()
}

/// Lay the label glyph by glyph along the centerline arc. Slices whose
/// midpoint falls in the lower half are traversed backwards so their text
/// stays upright.
fn draw_curved_label(
    cr: &Context,
    text: &str,
    center: Point,
    radius: f64,
    mid_angle_deg: f64,
    max_arc_len: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
    cr.set_font_size(LABEL_FONT_SIZE);
    set_source(cr, colors.label);

    let measure = |s: &str| cr.text_extents(s).map(|e| e.x_advance()).unwrap_or(0.0);
    let label = ellipsize(text, max_arc_len, &measure);
    if label.is_empty() {
        return Ok(());
    }
    let width = measure(&label);

    let dir = if mid_angle_deg > 0.0 && mid_angle_deg < 180.0 {
        -1.0
    } else {
        1.0
    };
    let mut angle = mid_angle_deg.to_radians() - dir * (width / 2.0) / radius;

    for ch in label.chars() {
        let glyph = ch.to_string();
        let advance = measure(&glyph);
        let glyph_angle = angle + dir * (advance / 2.0) / radius;

        cr.save()?;
        cr.translate(
            center.x + radius * glyph_angle.cos(),
            center.y + radius * glyph_angle.sin(),
        );
        cr.rotate(glyph_angle + dir * FRAC_PI_2);
        cr.move_to(-advance / 2.0, LABEL_FONT_SIZE / 2.0);
        cr.show_text(&glyph)?;
        cr.restore()?;

        angle += dir * advance / radius;
    }
    Ok(())
}

/// Shorten `text` so it measures no wider than `max_width`, appending an
/// ellipsis when anything was cut. Returns an empty string when not even the
/// ellipsis fits.
pub(crate) fn ellipsize<F: Fn(&str) -> f64>(text: &str, max_width: f64, measure: &F) -> String {
    if measure(text) <= max_width {
        return text.to_owned();
    }
    let mut truncated = text.to_owned();
    while truncated.pop().is_some() {
        let candidate = format!("{truncated}{ELLIPSIS}");
        if measure(&candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}

fn draw_slice_icon(
    cr: &Context,
    pixbuf: &Pixbuf,
    center: Point,
    radius: f64,
    mid_angle_deg: f64,
    icon_size: f64,
) -> Result<(), cairo::Error> {
    let rad = mid_angle_deg.to_radians();
    let (px, py) = (center.x + radius * rad.cos(), center.y + radius * rad.sin());

    let largest = pixbuf.width().max(pixbuf.height()) as f64;
    let scale = icon_size / largest;
    let (iw, ih) = (pixbuf.width() as f64 * scale, pixbuf.height() as f64 * scale);

    cr.save()?;
    cr.translate(px - iw / 2.0, py - ih / 2.0);
    cr.scale(scale, scale);
    cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
    cr.paint()?;
    cr.restore()
}

/// Stroked x near the top of the ring, marking the reserved close slice.
fn draw_close_glyph(
    cr: &Context,
    center: Point,
    outer: f64,
    menu: &RadialMenu,
) -> Result<(), cairo::Error> {
    let opts = menu.options();
    let y = center.y - (outer - opts.thickness / 4.0);
    let half = CLOSE_GLYPH_SIZE / 2.0;

    cr.save()?;
    set_source(cr, opts.close_tint);
    cr.set_line_width(2.5);
    cr.set_line_cap(cairo::LineCap::Round);
    cr.move_to(center.x - half, y - half);
    cr.line_to(center.x + half, y + half);
    cr.move_to(center.x + half, y - half);
    cr.line_to(center.x - half, y + half);
    cr.stroke()?;
    cr.restore()
}

/// Faint affordance for the center action, sitting just below the ring.
fn draw_center_icon(
    cr: &Context,
    center: Point,
    outer: f64,
    pixbuf: &Pixbuf,
) -> Result<(), cairo::Error> {
    let largest = pixbuf.width().max(pixbuf.height()) as f64;
    let scale = CENTER_ICON_SIZE / largest;
    let iw = pixbuf.width() as f64 * scale;

    cr.save()?;
    cr.translate(center.x - iw / 2.0, center.y + outer);
    cr.scale(scale, scale);
    cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
    cr.paint_with_alpha(CENTER_ICON_ALPHA)?;
    cr.restore()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ten units per char keeps the arithmetic readable
    fn measure(s: &str) -> f64 {
        s.chars().count() as f64 * 10.0
    }

    #[test]
    fn short_labels_pass_through_unchanged() {
        assert_eq!(ellipsize("hello", 100.0, &measure), "hello");
        assert_eq!(ellipsize("hello", 50.0, &measure), "hello");
    }

    #[test]
    fn long_labels_are_cut_and_marked() {
        let result = ellipsize("hello world", 60.0, &measure);
        assert_eq!(result, "hello…");
        assert!(measure(&result) <= 60.0);
    }

    #[test]
    fn truncated_labels_always_fit_the_budget() {
        for max in [10.0, 25.0, 40.0, 75.0] {
            let result = ellipsize("a rather long section label", max, &measure);
            assert!(measure(&result) <= max);
            assert!(result.ends_with(ELLIPSIS));
        }
    }

    #[test]
    fn impossible_budget_yields_nothing() {
        assert_eq!(ellipsize("hello", 5.0, &measure), "");
    }
}

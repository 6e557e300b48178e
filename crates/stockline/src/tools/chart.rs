//! Closing-price line chart rendered to PNG

use crate::error::{Result, StockError};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 500;

const MARGIN_LEFT: u32 = 60;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 20;
const MARGIN_BOTTOM: u32 = 40;
const GRID_LINES: u32 = 5;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const FRAME: Rgb<u8> = Rgb([60, 60, 60]);
const LINE: Rgb<u8> = Rgb([31, 119, 180]);

/// Chart title for a stock code, e.g. `2330.TW - Last 31 days stock prices`
pub fn chart_title(code: &str, days: i64) -> String {
    format!("{code}.TW - Last {days} days stock prices")
}

/// Caption sent alongside the chart image
pub fn chart_caption(title: &str, closes: &[f64]) -> String {
    let (min, max) = value_range(closes);
    let last = closes.last().copied().unwrap_or_default();
    format!("{title}\n最低 {min:.2} / 最高 {max:.2} / 最新 {last:.2}")
}

/// Render closes as a PNG line chart
///
/// The y axis spans the data range padded by 5%; a flat series is padded by
/// one unit on each side.
pub fn render_line_chart(closes: &[f64]) -> Result<Vec<u8>> {
    if closes.is_empty() {
        return Err(StockError::ChartError("no data points to plot".to_string()));
    }
    if closes.iter().any(|v| !v.is_finite()) {
        return Err(StockError::ChartError("non-finite price in series".to_string()));
    }

    let mut img = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);

    let left = MARGIN_LEFT as i64;
    let right = (CHART_WIDTH - MARGIN_RIGHT) as i64;
    let top = MARGIN_TOP as i64;
    let bottom = (CHART_HEIGHT - MARGIN_BOTTOM) as i64;

    for i in 1..GRID_LINES {
        let y = top + (bottom - top) * i64::from(i) / i64::from(GRID_LINES);
        draw_line(&mut img, (left, y), (right, y), GRID);
    }

    draw_line(&mut img, (left, top), (right, top), FRAME);
    draw_line(&mut img, (left, bottom), (right, bottom), FRAME);
    draw_line(&mut img, (left, top), (left, bottom), FRAME);
    draw_line(&mut img, (right, top), (right, bottom), FRAME);

    let (min, max) = padded_range(closes);
    let span = max - min;
    let steps = (closes.len().max(2) - 1) as f64;

    let points: Vec<(i64, i64)> = closes
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            let x = left as f64 + (right - left) as f64 * (i as f64 / steps);
            let y = bottom as f64 - (bottom - top) as f64 * ((value - min) / span);
            (x.round() as i64, y.round() as i64)
        })
        .collect();

    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        draw_line(&mut img, (x0, y0), (x1, y1), LINE);
        draw_line(&mut img, (x0, y0 + 1), (x1, y1 + 1), LINE);
    }

    for &(x, y) in &points {
        for dx in -1..=1 {
            for dy in -1..=1 {
                put_pixel(&mut img, x + dx, y + dy, LINE);
            }
        }
    }

    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| StockError::ChartError(e.to_string()))?;

    Ok(buf.into_inner())
}

fn value_range(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })
        .unwrap_or((0.0, 0.0))
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let (min, max) = value_range(values);
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}

fn put_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
        if x < img.width() && y < img.height() {
            img.put_pixel(x, y, color);
        }
    }
}

/// Bresenham line, clipped to the image
fn draw_line(img: &mut RgbImage, from: (i64, i64), to: (i64, i64), color: Rgb<u8>) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_pixel(img, x, y, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_render_produces_png_of_expected_size() {
        let png = render_line_chart(&[600.0, 612.5, 605.0, 630.0]).unwrap();
        assert!(png.starts_with(PNG_MAGIC));

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), CHART_WIDTH);
        assert_eq!(decoded.height(), CHART_HEIGHT);
    }

    #[test]
    fn test_render_draws_line_color() {
        let png = render_line_chart(&[1.0, 2.0]).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();

        assert!(decoded.pixels().any(|p| *p == LINE));
        assert_eq!(*decoded.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn test_render_flat_and_single_point_series() {
        assert!(render_line_chart(&[100.0, 100.0, 100.0]).is_ok());
        assert!(render_line_chart(&[100.0]).is_ok());
    }

    #[test]
    fn test_render_rejects_bad_input() {
        assert!(matches!(render_line_chart(&[]), Err(StockError::ChartError(_))));
        assert!(matches!(
            render_line_chart(&[1.0, f64::NAN]),
            Err(StockError::ChartError(_))
        ));
    }

    #[test]
    fn test_title_and_caption() {
        let title = chart_title("2330", 31);
        assert_eq!(title, "2330.TW - Last 31 days stock prices");

        let caption = chart_caption(&title, &[600.0, 580.0, 610.0]);
        assert!(caption.starts_with(&title));
        assert!(caption.contains("最低 580.00 / 最高 610.00 / 最新 610.00"));
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(&[5.0, 5.0]), (4.0, 6.0));
        let (lo, hi) = padded_range(&[100.0, 200.0]);
        assert!((lo - 95.0).abs() < 1e-9);
        assert!((hi - 205.0).abs() < 1e-9);
    }
}

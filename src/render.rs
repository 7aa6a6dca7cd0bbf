//! Report rendering: turns a [`SprintSnapshot`] into a PNG summary card.
//!
//! Layout, top to bottom, on a fixed-width canvas:
//! - a completion bar (done / total sprint tasks)
//! - one coloured band per non-empty status bucket, with one tick per task
//! - one row per task: assignee swatch, closed marker, title-length bar
//!
//! The output is a pure function of the snapshot and board config: the
//! same input always encodes to the same bytes.

use crate::config::BoardConfig;
use crate::error::{Result, StandupError};
use crate::snapshot::{group_by_status, Completion, SprintSnapshot, StatusBucket, TaskItem};
use image::{ImageEncoder, Rgba, RgbaImage};
use sha2::{Digest, Sha256};

/// Attachment file name used when the report is delivered.
pub const FILE_NAME: &str = "standup.png";
/// MIME type of [`RenderedReport::png`].
pub const MIME_TYPE: &str = "image/png";

pub const WIDTH: u32 = 800;
/// Taller canvases are refused rather than silently cropped.
pub const MAX_HEIGHT: u32 = 16_384;

const PADDING: u32 = 16;
const PROGRESS_HEIGHT: u32 = 14;
const BAND_HEIGHT: u32 = 22;
const ROW_HEIGHT: u32 = 18;
const ROW_GAP: u32 = 4;
const BUCKET_GAP: u32 = 12;
const SWATCH: u32 = 12;
const TICK: u32 = 6;
const TITLE_BAR_HEIGHT: u32 = 6;
const PX_PER_CHAR: u32 = 7;

const BACKGROUND: Rgba<u8> = Rgba([0x2B, 0x2D, 0x31, 0xFF]);
const ROW_BACKGROUND: Rgba<u8> = Rgba([0x38, 0x3A, 0x40, 0xFF]);
const TRACK: Rgba<u8> = Rgba([0x4E, 0x50, 0x58, 0xFF]);
const PROGRESS_FILL: Rgba<u8> = Rgba([0x57, 0xF2, 0x87, 0xFF]);
const CLOSED: Rgba<u8> = Rgba([0x57, 0xF2, 0x87, 0xFF]);
const OPEN: Rgba<u8> = Rgba([0x1E, 0x1F, 0x22, 0xFF]);
const UNASSIGNED: Rgba<u8> = Rgba([0x80, 0x84, 0x8E, 0xFF]);
const TITLE_BAR: Rgba<u8> = Rgba([0xDB, 0xDE, 0xE1, 0xFF]);
const TICK_COLOR: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

/// A rendered summary card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// PNG-encoded image bytes.
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Task rows drawn.
    pub rows: usize,
    /// Status bands drawn.
    pub buckets: usize,
}

/// Parse a `#RRGGBB` colour.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Stable mid-tone colour for an arbitrary label (assignee, unknown status).
pub fn label_color(label: &str) -> [u8; 3] {
    let digest = Sha256::digest(label.as_bytes());
    // Keep channels away from the background and from pure white.
    [
        80 + digest[0] % 150,
        80 + digest[1] % 150,
        80 + digest[2] % 150,
    ]
}

fn rgba([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 0xFF])
}

fn status_color(status: &str, board: &BoardConfig) -> Rgba<u8> {
    let rgb = board
        .column(status)
        .and_then(|c| parse_hex_color(&c.color))
        .unwrap_or_else(|| label_color(status));
    rgba(rgb)
}

fn bucket_height(bucket: &StatusBucket<'_>) -> u32 {
    BAND_HEIGHT + bucket.len() as u32 * (ROW_HEIGHT + ROW_GAP) + BUCKET_GAP
}

/// Height of the canvas for a given set of buckets.
fn canvas_height(buckets: &[StatusBucket<'_>]) -> u64 {
    let header = u64::from(PADDING * 2 + PROGRESS_HEIGHT);
    let body: u64 = if buckets.is_empty() {
        // Placeholder band so an empty sprint still yields a visible card.
        u64::from(BAND_HEIGHT + BUCKET_GAP)
    } else {
        buckets.iter().map(|b| u64::from(bucket_height(b))).sum()
    };
    header + body + u64::from(PADDING)
}

/// Fill a rectangle, clipped to the canvas.
fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

fn draw_progress(img: &mut RgbaImage, completion: Completion) {
    let track_width = WIDTH - PADDING * 2;
    fill_rect(img, PADDING, PADDING, track_width, PROGRESS_HEIGHT, TRACK);
    if completion.total > 0 {
        let filled = (u64::from(track_width) * completion.done as u64 / completion.total as u64) as u32;
        fill_rect(img, PADDING, PADDING, filled, PROGRESS_HEIGHT, PROGRESS_FILL);
    }
}

fn draw_band(img: &mut RgbaImage, y: u32, color: Rgba<u8>, count: usize) {
    fill_rect(img, PADDING, y, WIDTH - PADDING * 2, BAND_HEIGHT, color);
    let tick_y = y + (BAND_HEIGHT - TICK) / 2;
    let max_ticks = ((WIDTH - PADDING * 4) / (TICK + 3)) as usize;
    for i in 0..count.min(max_ticks) {
        let x = PADDING * 2 + i as u32 * (TICK + 3);
        fill_rect(img, x, tick_y, TICK, TICK, TICK_COLOR);
    }
}

fn draw_row(img: &mut RgbaImage, y: u32, stripe: Rgba<u8>, task: &TaskItem) {
    let row_width = WIDTH - PADDING * 2;
    fill_rect(img, PADDING, y, row_width, ROW_HEIGHT, ROW_BACKGROUND);
    fill_rect(img, PADDING, y, 4, ROW_HEIGHT, stripe);

    let inner_y = y + (ROW_HEIGHT - SWATCH) / 2;
    let assignee = task
        .assignee
        .as_deref()
        .map(|name| rgba(label_color(name)))
        .unwrap_or(UNASSIGNED);
    fill_rect(img, PADDING + 10, inner_y, SWATCH, SWATCH, assignee);

    let marker = if task.is_closed { CLOSED } else { OPEN };
    fill_rect(img, PADDING + 28, inner_y, SWATCH, SWATCH, marker);

    let bar_x = PADDING + 50;
    let max_bar = WIDTH - PADDING - bar_x - 8;
    let chars = task.title.chars().count() as u32;
    let bar = chars.saturating_mul(PX_PER_CHAR).clamp(24, max_bar);
    let bar_y = y + (ROW_HEIGHT - TITLE_BAR_HEIGHT) / 2;
    fill_rect(img, bar_x, bar_y, bar, TITLE_BAR_HEIGHT, TITLE_BAR);
}

/// Encode an RGBA pixel buffer to PNG bytes.
fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| StandupError::Render(format!("PNG encode: {e}")))?;
    Ok(buf)
}

/// Render the sprint board of `snapshot` as a PNG card.
///
/// # Errors
///
/// Returns [`StandupError::Render`] when the sprint has too many tasks to
/// fit under [`MAX_HEIGHT`] or PNG encoding fails.
pub fn render(snapshot: &SprintSnapshot, board: &BoardConfig) -> Result<RenderedReport> {
    let buckets = group_by_status(&snapshot.tasks, board);
    let height = canvas_height(&buckets);
    if height > u64::from(MAX_HEIGHT) {
        return Err(StandupError::Render(format!(
            "{} tasks need a {height}px canvas (limit {MAX_HEIGHT}px)",
            snapshot.tasks.len()
        )));
    }
    let height = height as u32;

    let mut img = RgbaImage::from_pixel(WIDTH, height, BACKGROUND);
    draw_progress(&mut img, Completion::by_status(&snapshot.tasks, board));

    let mut y = PADDING * 2 + PROGRESS_HEIGHT;
    if buckets.is_empty() {
        draw_band(&mut img, y, TRACK, 0);
    }
    let mut rows = 0;
    for bucket in &buckets {
        let color = status_color(bucket.status, board);
        draw_band(&mut img, y, color, bucket.len());
        y += BAND_HEIGHT + ROW_GAP;
        for task in &bucket.tasks {
            draw_row(&mut img, y, color, task);
            y += ROW_HEIGHT + ROW_GAP;
            rows += 1;
        }
        y += BUCKET_GAP - ROW_GAP;
    }

    let png = encode_png(&img)?;
    tracing::debug!(width = WIDTH, height, rows, bytes = png.len(), "report rendered");
    Ok(RenderedReport {
        png,
        width: WIDTH,
        height,
        rows,
        buckets: buckets.len(),
    })
}

// src/raster/window.rs

/// GDAL-order affine transform: `[origin_x, px_w, row_rot, origin_y, col_rot, px_h]`.
pub type GeoTransform = [f64; 6];

/// Integer rectangle in a raster's pixel grid.
///
/// Offsets are signed so that intersection arithmetic stays closed under
/// clipping, but a window handed to a read or write has non-negative
/// offsets and strictly positive dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub col_off: isize,
    pub row_off: isize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn new(col_off: isize, row_off: isize, width: usize, height: usize) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    /// The full-extent window of a raster with the given dimensions.
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Shape as `(cols, rows)`, the tuple order GDAL reads and writes use.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Overlap with `other`, or `None` when the overlap has zero area.
    ///
    /// Edge tiles are produced by intersecting an oversized stride window
    /// against the full-extent window; a `None` here means the tile fell
    /// entirely outside and must be skipped, never read.
    pub fn intersection(&self, other: &Window) -> Option<Window> {
        let col0 = self.col_off.max(other.col_off);
        let row0 = self.row_off.max(other.row_off);
        let col1 = (self.col_off + self.width as isize).min(other.col_off + other.width as isize);
        let row1 = (self.row_off + self.height as isize).min(other.row_off + other.height as isize);

        if col1 <= col0 || row1 <= row0 {
            return None;
        }
        Some(Window::new(
            col0,
            row0,
            (col1 - col0) as usize,
            (row1 - row0) as usize,
        ))
    }

    /// The affine transform of this window within a raster whose global
    /// transform is `gt`. Pixel size and rotation terms are unchanged;
    /// only the origin moves to the window's upper-left corner.
    pub fn transform(&self, gt: &GeoTransform) -> GeoTransform {
        let col = self.col_off as f64;
        let row = self.row_off as f64;
        [
            gt[0] + col * gt[1] + row * gt[2],
            gt[1],
            gt[2],
            gt[3] + col * gt[4] + row * gt[5],
            gt[4],
            gt[5],
        ]
    }
}

/// Map world coordinates to fractional pixel coordinates `(col, row)`.
///
/// Returns `None` for a singular transform (zero determinant), which a
/// well-formed raster never carries.
pub fn world_to_pixel(gt: &GeoTransform, x: f64, y: f64) -> Option<(f64, f64)> {
    let det = gt[1] * gt[5] - gt[2] * gt[4];
    if det == 0.0 {
        return None;
    }
    let dx = x - gt[0];
    let dy = y - gt[3];
    let col = (gt[5] * dx - gt[2] * dy) / det;
    let row = (gt[1] * dy - gt[4] * dx) / det;
    Some((col, row))
}

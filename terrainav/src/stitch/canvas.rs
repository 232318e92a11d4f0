//! Tile window arithmetic and canvas placement.

use image::{imageops, RgbImage};

use super::StitchError;
use crate::coord::{tile_index_for, GeoPoint, TileIndex, TILE_SIZE};

/// The rectangle of tiles covering a box, and the crop that trims it back
/// to the box's exact pixel footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWindow {
    pub top_left: TileIndex,
    pub bottom_right: TileIndex,
    pub tiles_x: u32,
    pub tiles_y: u32,
    /// Crop origin and size within the full canvas
    pub crop: [u32; 4],
}

impl TileWindow {
    /// Computes the window for a box at `zoom`.
    ///
    /// Fails with [`StitchError::InvalidGeometry`] when the corners are
    /// inverted or the crop would be empty.
    pub fn for_bounds(
        top_left: GeoPoint,
        bottom_right: GeoPoint,
        zoom: u8,
    ) -> Result<Self, StitchError> {
        let tl = tile_index_for(top_left, zoom)?;
        let br = tile_index_for(bottom_right, zoom)?;

        if br.tile_x < tl.tile_x || br.tile_y < tl.tile_y {
            return Err(StitchError::InvalidGeometry(format!(
                "tile span ({}, {}) -> ({}, {}) is negative at zoom {}",
                tl.tile_x, tl.tile_y, br.tile_x, br.tile_y, zoom
            )));
        }

        let tiles_x = br.tile_x - tl.tile_x + 1;
        let tiles_y = br.tile_y - tl.tile_y + 1;

        let width = (br.pixel_x + TILE_SIZE * (tiles_x - 1)) as i64 - tl.pixel_x as i64;
        let height = (br.pixel_y + TILE_SIZE * (tiles_y - 1)) as i64 - tl.pixel_y as i64;
        if width <= 0 || height <= 0 {
            return Err(StitchError::InvalidGeometry(format!(
                "box {} -> {} covers {}x{} pixels at zoom {}",
                top_left, bottom_right, width, height, zoom
            )));
        }

        Ok(Self {
            top_left: tl,
            bottom_right: br,
            tiles_x,
            tiles_y,
            crop: [tl.pixel_x, tl.pixel_y, width as u32, height as u32],
        })
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_x as usize * self.tiles_y as usize
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.tiles_x * TILE_SIZE, self.tiles_y * TILE_SIZE)
    }

    /// All tile addresses of the window, row by row.
    pub fn tiles(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.top_left.tile_y..=self.bottom_right.tile_y).flat_map(move |y| {
            (self.top_left.tile_x..=self.bottom_right.tile_x).map(move |x| (x, y))
        })
    }
}

/// Pastes a decoded tile at its slot in the canvas.
pub fn place_tile(
    canvas: &mut RgbImage,
    window: &TileWindow,
    tile_x: u32,
    tile_y: u32,
    tile: &RgbImage,
) {
    let x = (tile_x - window.top_left.tile_x) * TILE_SIZE;
    let y = (tile_y - window.top_left.tile_y) * TILE_SIZE;
    imageops::replace(canvas, tile, x as i64, y as i64);
}

/// Cuts the box's exact footprint out of the full canvas.
pub fn crop_to_window(canvas: &RgbImage, window: &TileWindow) -> RgbImage {
    let [x, y, w, h] = window.crop;
    imageops::crop_imm(canvas, x, y, w, h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::tile_origin;
    use image::Rgb;

    #[test]
    fn test_window_spanning_tiles() {
        let zoom = 10;
        // Corners a third of the way into tiles (100, 200) and (102, 201)
        let tl_origin = tile_origin(100, 200, zoom);
        let next = tile_origin(101, 201, zoom);
        let top_left = GeoPoint {
            lat: tl_origin.lat - (tl_origin.lat - next.lat) / 3.0,
            lon: tl_origin.lon + (next.lon - tl_origin.lon) / 3.0,
        };
        let br_origin = tile_origin(102, 201, zoom);
        let br_next = tile_origin(103, 202, zoom);
        let bottom_right = GeoPoint {
            lat: br_origin.lat - (br_origin.lat - br_next.lat) / 2.0,
            lon: br_origin.lon + (br_next.lon - br_origin.lon) / 2.0,
        };

        let window = TileWindow::for_bounds(top_left, bottom_right, zoom).unwrap();
        assert_eq!(window.tiles_x, 3);
        assert_eq!(window.tiles_y, 2);
        assert_eq!(window.tile_count(), 6);
        assert_eq!(window.canvas_size(), (768, 512));

        let [x, y, w, h] = window.crop;
        assert_eq!(x, window.top_left.pixel_x);
        assert_eq!(y, window.top_left.pixel_y);
        assert_eq!(w, window.bottom_right.pixel_x + 512 - x);
        assert_eq!(h, window.bottom_right.pixel_y + 256 - y);
        assert!(x + w <= 768 && y + h <= 512);

        let tiles: Vec<_> = window.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                (100, 200),
                (101, 200),
                (102, 200),
                (100, 201),
                (101, 201),
                (102, 201)
            ]
        );
    }

    #[test]
    fn test_degenerate_box_is_rejected() {
        let p = GeoPoint {
            lat: 35.16,
            lon: -89.90,
        };
        let result = TileWindow::for_bounds(p, p, 18);
        assert!(matches!(result, Err(StitchError::InvalidGeometry(_))));
    }

    #[test]
    fn test_inverted_box_is_rejected() {
        let result = TileWindow::for_bounds(
            GeoPoint {
                lat: 35.0,
                lon: -89.0,
            },
            GeoPoint {
                lat: 35.1,
                lon: -89.1,
            },
            12,
        );
        assert!(matches!(result, Err(StitchError::InvalidGeometry(_))));
    }

    #[test]
    fn test_place_and_crop() {
        let origin = tile_origin(10, 10, 5);
        let far = tile_origin(12, 12, 5);
        let window = TileWindow::for_bounds(
            GeoPoint {
                lat: origin.lat - 1e-9,
                lon: origin.lon + 1e-9,
            },
            GeoPoint {
                lat: far.lat + 1e-9,
                lon: far.lon - 1e-9,
            },
            5,
        )
        .unwrap();
        assert_eq!((window.tiles_x, window.tiles_y), (2, 2));

        let (w, h) = window.canvas_size();
        let mut canvas = RgbImage::new(w, h);
        let red = RgbImage::from_pixel(256, 256, Rgb([255, 0, 0]));
        place_tile(&mut canvas, &window, 11, 10, &red);

        assert_eq!(canvas.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(256, 0), &Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(511, 255), &Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(256, 256), &Rgb([0, 0, 0]));

        let cropped = crop_to_window(&canvas, &window);
        assert_eq!(cropped.dimensions(), (window.crop[2], window.crop[3]));
    }
}

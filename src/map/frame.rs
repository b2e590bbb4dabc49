use geo::{Coord, Rect};
use staticmap::{lat_to_y, lon_to_x, x_to_lon, y_to_lat, Bounds};

pub const TILE_SIZE: u32 = 256;
pub const MAX_ZOOM: u8 = 17;

/// Web Mercator viewport shared by the basemap and the overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub zoom: u8,
    /// lon/lat
    pub center: Coord<f64>,
}

impl Frame {
    /// Picks the highest zoom level where `extent` fits inside the padded image.
    pub fn fit(extent: Rect<f64>, width: u32, height: u32, padding: u32) -> Frame {
        let usable_w = width.saturating_sub(padding * 2).max(1) as f64;
        let usable_h = height.saturating_sub(padding * 2).max(1) as f64;
        let (min, max) = (extent.min(), extent.max());
        let zoom = (0..=MAX_ZOOM)
            .rev()
            .find(|zoom| {
                let w = (lon_to_x(max.x, *zoom) - lon_to_x(min.x, *zoom)) * TILE_SIZE as f64;
                let h = (lat_to_y(min.y, *zoom) - lat_to_y(max.y, *zoom)) * TILE_SIZE as f64;
                w <= usable_w && h <= usable_h
            })
            .unwrap_or(0);
        let x = (lon_to_x(min.x, 0) + lon_to_x(max.x, 0)) / 2.0;
        let y = (lat_to_y(min.y, 0) + lat_to_y(max.y, 0)) / 2.0;
        Frame {
            width,
            height,
            zoom,
            center: Coord {
                x: x_to_lon(x, 0),
                y: y_to_lat(y, 0),
            },
        }
    }

    /// Same bounds `StaticMap` derives for a fixed zoom and center, so tiles and
    /// overlays land on the same pixels.
    pub fn bounds(&self) -> Bounds {
        let x_center = lon_to_x(self.center.x, self.zoom);
        let y_center = lat_to_y(self.center.y, self.zoom);
        let x_m = 0.5 * f64::from(self.width) / f64::from(TILE_SIZE);
        let y_m = 0.5 * f64::from(self.height) / f64::from(TILE_SIZE);
        Bounds {
            height: self.height,
            width: self.width,
            x_center,
            y_center,
            x_min: (x_center - x_m).floor() as i32,
            x_max: (x_center + x_m).ceil() as i32,
            y_min: (y_center - y_m).floor() as i32,
            y_max: (y_center + y_m).ceil() as i32,
            tile_size: TILE_SIZE,
            zoom: self.zoom,
        }
    }

    /// Image pixel position of a lon/lat coordinate, origin at the top left corner.
    pub fn to_pixel(&self, coord: Coord<f64>) -> (f64, f64) {
        let bounds = self.bounds();
        (
            bounds.x_to_px(lon_to_x(coord.x, self.zoom)),
            bounds.y_to_px(lat_to_y(coord.y, self.zoom)),
        )
    }

    /// lon/lat bounds of the whole image.
    pub fn extent(&self) -> Rect<f64> {
        let bounds = self.bounds();
        let half_w = f64::from(self.width) / 2.0 / f64::from(TILE_SIZE);
        let half_h = f64::from(self.height) / 2.0 / f64::from(TILE_SIZE);
        Rect::new(
            Coord {
                x: x_to_lon(bounds.x_center - half_w, self.zoom),
                y: y_to_lat(bounds.y_center + half_h, self.zoom),
            },
            Coord {
                x: x_to_lon(bounds.x_center + half_w, self.zoom),
                y: y_to_lat(bounds.y_center - half_h, self.zoom),
            },
        )
    }
}

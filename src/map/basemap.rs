use super::Frame;
use crate::Result;
use staticmap::StaticMapBuilder;
use tracing::info;

/// Source of the background raster drawn under the isochrones.
pub trait Basemap: Send + Sync {
    /// PNG image covering exactly `frame`.
    fn render(&self, frame: &Frame) -> Result<Vec<u8>>;
}

/// Stitches slippy map tiles fetched from `url_template`.
pub struct TileServer {
    url_template: String,
}

impl TileServer {
    pub fn new(url_template: impl Into<String>) -> Self {
        TileServer {
            url_template: url_template.into(),
        }
    }
}

impl Basemap for TileServer {
    fn render(&self, frame: &Frame) -> Result<Vec<u8>> {
        info!(
            zoom = frame.zoom,
            lat_center = frame.center.y,
            lon_center = frame.center.x,
            "Fetching basemap tiles",
        );
        let mut map = StaticMapBuilder::default()
            .width(frame.width)
            .height(frame.height)
            .zoom(frame.zoom)
            .lat_center(frame.center.y)
            .lon_center(frame.center.x)
            .url_template(self.url_template.clone())
            .build()?;
        Ok(map.encode_png()?)
    }
}

#[cfg(test)]
mod test {
    use super::{Basemap, TileServer};
    use crate::map::Frame;
    use crate::test::solid_png;
    use crate::Result;
    use geo::{coord, Rect};
    use httpmock::prelude::*;
    use tiny_skia::{ColorU8, Pixmap};

    #[test]
    fn stitches_tiles_into_frame() -> Result<()> {
        let tile = solid_png(256, 256, tiny_skia::Color::from_rgba8(10, 20, 30, 255))?;
        let extent = Rect::new(coord! { x: 55.10, y: 24.95 }, coord! { x: 55.25, y: 25.06 });
        let frame = Frame::fit(extent, 800, 800, 24);
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path_contains(format!("/{}/", frame.zoom))
                .path_contains(".png");
            then.status(200).header("content-type", "image/png").body(&tile);
        });
        let basemap = TileServer::new(format!("{}/{{z}}/{{x}}/{{y}}.png", server.base_url()));
        let png = basemap.render(&frame)?;
        let bounds = frame.bounds();
        let tiles = (bounds.x_max - bounds.x_min) * (bounds.y_max - bounds.y_min);
        assert_eq!(tiles as usize, mock.hits());
        let image = Pixmap::decode_png(&png).unwrap();
        assert_eq!((800, 800), (image.width(), image.height()));
        assert_eq!(
            ColorU8::from_rgba(10, 20, 30, 255),
            image.pixel(400, 400).unwrap().demultiply()
        );
        Ok(())
    }

    #[test]
    fn unreachable_tile_server() {
        let extent = Rect::new(coord! { x: 55.10, y: 24.95 }, coord! { x: 55.25, y: 25.06 });
        let frame = Frame::fit(extent, 256, 256, 0);
        let basemap = TileServer::new("http://127.0.0.1:1/{z}/{x}/{y}.png");
        assert!(basemap.render(&frame).is_err());
    }
}

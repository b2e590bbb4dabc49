use super::{Basemap, Frame};
use crate::isochrone::IsochroneCollection;
use crate::Result;
use geo::{Coord, Point, Rect};
use image::{Rgb, RgbImage};
use staticmap::tools::{Circle, CircleBuilder, Color, Line, LineBuilder, Tool};
use staticmap::{lat_to_y, lon_to_x, Bounds};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, PixmapMut, PixmapPaint, Shader, Transform};

pub const TITLE: &str = "Isochrone Map";
pub const X_LABEL: &str = "Longitude";
pub const Y_LABEL: &str = "Latitude";

const PADDING: u32 = 24;
const FILL_ALPHA: u8 = 128;
const EDGE: [u8; 3] = [0, 0, 0];
const EDGE_WIDTH: f32 = 1.0;
const MARKER: [u8; 3] = [255, 0, 0];
const MARKER_RADIUS: f32 = 7.0;

/// Matplotlib's viridis sampled at nine evenly spaced stops.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

pub struct Fill {
    pub minutes: u32,
    pub color: [u8; 3],
    pub ring: Vec<Coord<f64>>,
}

pub struct Marker {
    pub point: Point<f64>,
    pub color: [u8; 3],
}

/// Drawn bottom to top.
pub enum Layer {
    Basemap(Pixmap),
    Fill(Fill),
    Marker(Marker),
}

pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub frame: Frame,
    pub layers: Vec<Layer>,
}

/// Isochrones are drawn in the order received, callers wanting short ranges on top
/// should sort the collection first.
pub fn render(
    isochrones: &IsochroneCollection,
    location: Point<f64>,
    basemap: &dyn Basemap,
    width: u32,
    height: u32,
) -> Result<Figure> {
    let extent = match isochrones.bounding_rect() {
        Some(rect) => Rect::new(
            Coord {
                x: rect.min().x.min(location.x()),
                y: rect.min().y.min(location.y()),
            },
            Coord {
                x: rect.max().x.max(location.x()),
                y: rect.max().y.max(location.y()),
            },
        ),
        None => Rect::new(location.0, location.0),
    };
    let frame = Frame::fit(extent, width, height, PADDING);
    let tiles = basemap.render(&frame)?;
    let tiles = Pixmap::decode_png(&tiles).map_err(staticmap::Error::from)?;

    let mut layers = vec![Layer::Basemap(tiles)];
    let count = isochrones.len();
    for (index, isochrone) in isochrones.isochrones.iter().enumerate() {
        layers.push(Layer::Fill(Fill {
            minutes: isochrone.minutes,
            color: ramp_color(index, count),
            ring: isochrone.polygon.exterior().0.clone(),
        }));
    }
    layers.push(Layer::Marker(Marker {
        point: location,
        color: MARKER,
    }));

    Ok(Figure {
        title: TITLE.into(),
        x_label: X_LABEL.into(),
        y_label: Y_LABEL.into(),
        frame,
        layers,
    })
}

pub fn tick_label(value: f64) -> String {
    format!("{value:.3}")
}

/// Categorical color for the polygon at `index` out of `count`.
pub fn ramp_color(index: usize, count: usize) -> [u8; 3] {
    if count <= 1 {
        return VIRIDIS[0];
    }
    let t = index as f64 / (count - 1) as f64 * (VIRIDIS.len() - 1) as f64;
    let lower = t.floor() as usize;
    let upper = (lower + 1).min(VIRIDIS.len() - 1);
    let frac = t - lower as f64;
    let mut res = [0u8; 3];
    for (channel, value) in res.iter_mut().enumerate() {
        let a = VIRIDIS[lower][channel] as f64;
        let b = VIRIDIS[upper][channel] as f64;
        *value = (a + (b - a) * frac).round() as u8;
    }
    res
}

impl Fill {
    fn edge(&self) -> Result<Line> {
        Ok(LineBuilder::new()
            .lon_coordinates(self.ring.iter().map(|it| it.x))
            .lat_coordinates(self.ring.iter().map(|it| it.y))
            .color(Color::new(true, EDGE[0], EDGE[1], EDGE[2], 255))
            .width(EDGE_WIDTH)
            .build()?)
    }
}

/// Semi-transparent polygon interior, the outline is drawn separately as a [Line].
impl Tool for Fill {
    fn extent(&self, _: u8, _: f64) -> (f64, f64, f64, f64) {
        let xs = self.ring.iter().map(|it| it.x);
        let ys = self.ring.iter().map(|it| it.y);
        (
            xs.clone().fold(f64::NAN, f64::min),
            ys.clone().fold(f64::NAN, f64::min),
            xs.fold(f64::NAN, f64::max),
            ys.fold(f64::NAN, f64::max),
        )
    }

    fn draw(&self, bounds: &Bounds, mut pixmap: PixmapMut) {
        let mut path_builder = PathBuilder::new();
        for (index, coord) in self.ring.iter().enumerate() {
            let x = bounds.x_to_px(lon_to_x(coord.x, bounds.zoom)) as f32;
            let y = bounds.y_to_px(lat_to_y(coord.y, bounds.zoom)) as f32;
            match index {
                0 => path_builder.move_to(x, y),
                _ => path_builder.line_to(x, y),
            }
        }
        path_builder.close();
        let [r, g, b] = self.color;
        let paint = Paint {
            shader: Shader::SolidColor(tiny_skia::Color::from_rgba8(r, g, b, FILL_ALPHA)),
            anti_alias: true,
            ..Default::default()
        };
        if let Some(path) = path_builder.finish() {
            pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);
        }
    }
}

impl Marker {
    /// Dot with a one pixel dark rim.
    fn circles(&self) -> Result<[Circle; 2]> {
        let circle = |radius: f32, [r, g, b]: [u8; 3]| {
            CircleBuilder::new()
                .lon_coordinate(self.point.x())
                .lat_coordinate(self.point.y())
                .radius(radius)
                .color(Color::new(true, r, g, b, 255))
                .build()
        };
        Ok([circle(MARKER_RADIUS, EDGE)?, circle(MARKER_RADIUS - 1.0, self.color)?])
    }
}

impl Figure {
    pub fn fills(&self) -> impl Iterator<Item = &Fill> {
        self.layers.iter().filter_map(|it| match it {
            Layer::Fill(fill) => Some(fill),
            _ => None,
        })
    }

    pub fn markers(&self) -> impl Iterator<Item = &Marker> {
        self.layers.iter().filter_map(|it| match it {
            Layer::Marker(marker) => Some(marker),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn basemaps(&self) -> impl Iterator<Item = &Pixmap> {
        self.layers.iter().filter_map(|it| match it {
            Layer::Basemap(tiles) => Some(tiles),
            _ => None,
        })
    }

    /// (minutes, color) pairs, one per fill
    pub fn legend(&self) -> Vec<(u32, [u8; 3])> {
        self.fills().map(|it| (it.minutes, it.color)).collect()
    }

    /// Flattens all layers into a single image of the frame size.
    pub fn composite(&self) -> Result<Pixmap> {
        let mut canvas = Pixmap::new(self.frame.width, self.frame.height)
            .ok_or(staticmap::Error::InvalidSize)?;
        canvas.fill(tiny_skia::Color::WHITE);
        let bounds = self.frame.bounds();
        for layer in &self.layers {
            match layer {
                Layer::Basemap(tiles) => canvas.draw_pixmap(
                    0,
                    0,
                    tiles.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                ),
                Layer::Fill(fill) => {
                    fill.draw(&bounds, canvas.as_mut());
                    fill.edge()?.draw(&bounds, canvas.as_mut());
                }
                Layer::Marker(marker) => {
                    for circle in marker.circles()? {
                        circle.draw(&bounds, canvas.as_mut());
                    }
                }
            }
        }
        Ok(canvas)
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        Ok(self
            .composite()?
            .encode_png()
            .map_err(staticmap::Error::from)?)
    }

    /// Opaque RGB copy of the composited map.
    pub fn to_rgb(&self) -> Result<RgbImage> {
        let canvas = self.composite()?;
        let mut res = RgbImage::new(canvas.width(), canvas.height());
        for (pixel, color) in res.pixels_mut().zip(canvas.pixels()) {
            let color = color.demultiply();
            *pixel = Rgb([color.red(), color.green(), color.blue()]);
        }
        Ok(res)
    }
}

#[cfg(test)]
mod test {
    use super::{ramp_color, render, tick_label, VIRIDIS};
    use crate::isochrone::{build_geometry, location_point, IsochroneResponse, Query};
    use crate::test::{mock_ors_response, BlankBasemap};
    use crate::Result;
    use tiny_skia::ColorU8;

    fn figure(minutes: &str, ranges: &[u32]) -> Result<super::Figure> {
        let query = Query::parse("25.0031", "55.1675", minutes)?;
        let response: IsochroneResponse = serde_json::from_value(mock_ors_response(ranges))?;
        let mut isochrones = build_geometry(&response, &query)?;
        isochrones.sort_longest_first();
        render(
            &isochrones,
            location_point(&query),
            &BlankBasemap,
            400,
            300,
        )
    }

    #[test]
    fn layers() -> Result<()> {
        let figure = figure("5,10,15", &[300, 600, 900])?;
        assert_eq!(3, figure.fills().count());
        assert_eq!(1, figure.markers().count());
        assert_eq!(1, figure.basemaps().count());
        assert_eq!(
            vec![15, 10, 5],
            figure.legend().iter().map(|it| it.0).collect::<Vec<_>>()
        );
        assert_eq!("Isochrone Map", figure.title);
        assert_eq!("Longitude", figure.x_label);
        assert_eq!("Latitude", figure.y_label);
        Ok(())
    }

    #[test]
    fn marker_and_fill_are_visible() -> Result<()> {
        let figure = figure("5", &[300])?;
        let canvas = figure.composite()?;
        assert_eq!((400, 300), (canvas.width(), canvas.height()));
        let marker = figure.markers().next().unwrap();
        let (x, y) = figure.frame.to_pixel(marker.point.0);
        let pixel = |x: u32, y: u32| canvas.pixel(x, y).unwrap().demultiply();
        assert_eq!(ColorU8::from_rgba(255, 0, 0, 255), pixel(x as u32, y as u32));
        // between the marker and the isochrone edge
        let fill = pixel(x as u32 + 30, y as u32);
        assert_ne!(ColorU8::from_rgba(255, 255, 255, 255), fill);
        assert_eq!(ColorU8::from_rgba(255, 255, 255, 255), pixel(1, 1));
        Ok(())
    }

    #[test]
    fn rgb_copy_matches_frame() -> Result<()> {
        let figure = figure("5,10", &[300, 600])?;
        let image = figure.to_rgb()?;
        assert_eq!((400, 300), image.dimensions());
        assert_eq!([255, 255, 255], image.get_pixel(1, 1).0);
        Ok(())
    }

    #[test]
    fn png_encoding() -> Result<()> {
        let png = figure("5,10", &[300, 600])?.to_png()?;
        assert_eq!(&[0x89, b'P', b'N', b'G'], &png[..4]);
        Ok(())
    }

    #[test]
    fn ramp() {
        assert_eq!(VIRIDIS[0], ramp_color(0, 1));
        assert_eq!(VIRIDIS[0], ramp_color(0, 3));
        assert_eq!(VIRIDIS[4], ramp_color(1, 3));
        assert_eq!(VIRIDIS[8], ramp_color(2, 3));
    }

    #[test]
    fn ticks() {
        assert_eq!("25.000", tick_label(25.0));
        assert_eq!("-0.100", tick_label(-0.1));
    }
}

use super::figure::tick_label;
use super::Figure;
use crate::{Error, Result};
use image::DynamicImage;
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point, Polygon, Pt, Rgb, TextMatrix,
};

pub const FILE_NAME: &str = "isochrone_map.pdf";
pub const MIME_TYPE: &str = "application/pdf";

// A4 landscape
const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MAP_MAX_W: f32 = 200.0;
const MAP_MAX_H: f32 = 160.0;
const MAP_LEFT: f32 = 30.0;
const MAP_BOTTOM: f32 = 24.0;

/// Renders the figure on a single page, fully in memory.
pub fn export_pdf(figure: &Figure) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new(figure.title.clone(), Mm(PAGE_W), Mm(PAGE_H), "Map");
    let layer = doc.get_page(page).get_layer(layer);
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let canvas = figure.to_rgb()?;
    let (px_w, px_h) = (canvas.width() as f32, canvas.height() as f32);
    let scale = (MAP_MAX_W / px_w).min(MAP_MAX_H / px_h);
    let (map_w, map_h) = (px_w * scale, px_h * scale);
    let (left, bottom) = (MAP_LEFT, MAP_BOTTOM);
    let (right, top) = (left + map_w, bottom + map_h);

    Image::from_dynamic_image(&DynamicImage::ImageRgb8(canvas)).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(left)),
            translate_y: Some(Mm(bottom)),
            dpi: Some(px_w / (map_w / 25.4)),
            ..Default::default()
        },
    );

    layer.set_outline_color(black());
    layer.set_outline_thickness(0.75);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(left), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(bottom)), false),
            (Point::new(Mm(right), Mm(top)), false),
            (Point::new(Mm(left), Mm(top)), false),
        ],
        is_closed: true,
    });

    layer.set_fill_color(black());
    layer.use_text(&figure.title, 16.0, Mm(left), Mm(top + 10.0), &bold);
    layer.use_text(
        &figure.x_label,
        12.0,
        Mm(left + map_w / 2.0 - 10.0),
        Mm(bottom - 14.0),
        &regular,
    );
    draw_vertical_text(
        &layer,
        &figure.y_label,
        12.0,
        y_label_matrix(left, bottom, map_h),
        &regular,
    );

    let extent = figure.frame.extent();
    layer.use_text(tick_label(extent.min().x), 8.0, Mm(left), Mm(bottom - 6.0), &regular);
    layer.use_text(
        tick_label(extent.max().x),
        8.0,
        Mm(right - 10.0),
        Mm(bottom - 6.0),
        &regular,
    );
    layer.use_text(tick_label(extent.min().y), 8.0, Mm(left - 14.0), Mm(bottom), &regular);
    layer.use_text(tick_label(extent.max().y), 8.0, Mm(left - 14.0), Mm(top - 3.0), &regular);

    draw_legend(figure, &layer, &regular, right + 10.0, top);

    doc.save_to_bytes().map_err(pdf_error)
}

/// Bottom to top, left of the map and roughly centered on its height.
fn y_label_matrix(left: f32, bottom: f32, map_h: f32) -> TextMatrix {
    TextMatrix::TranslateRotate(
        Pt::from(Mm(left - 18.0)),
        Pt::from(Mm(bottom + map_h / 2.0 - 8.0)),
        90.0,
    )
}

fn draw_vertical_text(
    layer: &PdfLayerReference,
    text: &str,
    size: f32,
    matrix: TextMatrix,
    font: &IndirectFontRef,
) {
    layer.begin_text_section();
    layer.set_font(font, size);
    layer.set_text_matrix(matrix);
    layer.write_text(text, font);
    layer.end_text_section();
}

fn draw_legend(
    figure: &Figure,
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    left: f32,
    top: f32,
) {
    layer.set_fill_color(black());
    layer.use_text("Travel time", 11.0, Mm(left), Mm(top - 4.0), font);
    for (index, (minutes, color)) in figure.legend().into_iter().enumerate() {
        let y = top - 12.0 - index as f32 * 8.0;
        layer.set_fill_color(Color::Rgb(Rgb::new(
            color[0] as f32 / 255.0,
            color[1] as f32 / 255.0,
            color[2] as f32 / 255.0,
            None,
        )));
        layer.add_polygon(Polygon {
            rings: vec![vec![
                (Point::new(Mm(left), Mm(y)), false),
                (Point::new(Mm(left + 6.0), Mm(y)), false),
                (Point::new(Mm(left + 6.0), Mm(y + 4.0)), false),
                (Point::new(Mm(left), Mm(y + 4.0)), false),
            ]],
            mode: PaintMode::FillStroke,
            winding_order: WindingOrder::NonZero,
        });
        layer.set_fill_color(black());
        layer.use_text(format!("{minutes} min"), 10.0, Mm(left + 9.0), Mm(y + 0.5), font);
    }
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn pdf_error(error: impl std::fmt::Debug) -> Error {
    Error::Pdf(format!("{error:?}"))
}

use crate::context::Context;
use crate::isochrone::{build_geometry, location_point, Query};
use crate::map::{export_pdf, render};
use crate::{Error, Result};
use actix_web::web;
use geo::Rect;
use std::time::Instant;
use tracing::info;

/// Everything a submission produces, fully materialized.
pub struct IsochroneMap {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// lon/lat bounds of `png`
    pub extent: Rect<f64>,
    pub png: Vec<u8>,
    pub pdf: Vec<u8>,
    /// (minutes, color) pairs in drawing order
    pub legend: Vec<(u32, [u8; 3])>,
}

/// fetch -> parse -> render -> export
pub async fn run(query: &Query, ctx: &Context) -> Result<IsochroneMap> {
    let started_at = Instant::now();
    let response = ctx.ors.fetch(query).await?;
    let mut isochrones = build_geometry(&response, query)?;
    if isochrones.is_empty() {
        return Err(Error::Geometry(
            "routing service returned no isochrones".into(),
        ));
    }
    isochrones.sort_longest_first();
    info!(
        isochrones = isochrones.len(),
        crs = isochrones.crs(),
        "Built isochrone geometry",
    );
    let location = location_point(query);
    let basemap = ctx.basemap.clone();
    let (width, height) = (ctx.conf.map_width, ctx.conf.map_height);
    let res = web::block(move || -> Result<IsochroneMap> {
        let figure = render(&isochrones, location, basemap.as_ref(), width, height)?;
        Ok(IsochroneMap {
            title: figure.title.clone(),
            x_label: figure.x_label.clone(),
            y_label: figure.y_label.clone(),
            extent: figure.frame.extent(),
            png: figure.to_png()?,
            pdf: export_pdf(&figure)?,
            legend: figure.legend(),
        })
    })
    .await??;
    info!(
        isochrones = res.legend.len(),
        png_bytes = res.png.len(),
        pdf_bytes = res.pdf.len(),
        time_ms = started_at.elapsed().as_millis() as u64,
        "Generated isochrone map",
    );
    Ok(res)
}

use crate::conf::Conf;
use crate::context::Context;
use crate::isochrone::Query;
use crate::map::pdf::FILE_NAME;
use crate::{pipeline, Error, Result};
use std::fs;
use tracing::info;

/// `export <lat> <lon> <minutes> [out.pdf]`
pub async fn run(args: &[String], conf: Conf) -> Result<()> {
    let [lat, lon, minutes, rest @ ..] = args else {
        return Err(Error::CLI(
            "Usage: export <lat> <lon> <minutes> [out.pdf]".into(),
        ));
    };
    let out = rest.first().map(String::as_str).unwrap_or(FILE_NAME);
    let query = Query::parse(lat, lon, minutes)?;
    let ctx = Context::new(conf)?;
    let map = pipeline::run(&query, &ctx).await?;
    fs::write(out, &map.pdf)?;
    info!(out, bytes = map.pdf.len(), "Saved isochrone map");
    Ok(())
}

use crate::context::Context;
use crate::isochrone::QueryArgs;
use crate::view::{self, Page};
use crate::{pipeline, Error};
use actix_web::http::header::ContentType;
use actix_web::web::{Data, Query};
use actix_web::{get, HttpResponse};
use tracing::warn;

#[get("/")]
pub async fn get(args: Query<QueryArgs>, ctx: Data<Context>) -> HttpResponse {
    let mut page = Page {
        lat: args.lat_or_default(),
        lon: args.lon_or_default(),
        minutes: args.minutes_or_default(),
        logo: ctx.logo.clone(),
        error: None,
        map: None,
    };
    let submission = match args.to_query() {
        Some(Ok(query)) => pipeline::run(&query, &ctx).await.map(Some),
        Some(Err(e)) => Err(e),
        None => Ok(None),
    };
    match submission {
        Ok(map) => page.map = map,
        Err(e) => {
            warn!(error = %e, "Failed to generate isochrone map");
            page.error = Some(user_message(&e));
        }
    }
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(view::render(&page))
}

fn user_message(error: &Error) -> String {
    match error {
        Error::Http { .. } | Error::InvalidInput(_) => error.to_string(),
        _ => format!("An error occurred: {error}"),
    }
}

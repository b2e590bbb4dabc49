use crate::{Error, Result};
use actix_web::web::Path;
use actix_web::{get, HttpResponse, Responder};
use include_dir::{include_dir, Dir};

static STATIC_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

#[get("/static/{file}")]
pub async fn get(file: Path<String>) -> Result<impl Responder> {
    let Some(asset) = STATIC_DIR.get_file(file.as_str()) else {
        return Err(Error::NotFound(format!("Asset not found: {file}")));
    };
    let content_type = match asset.path().extension().and_then(|it| it.to_str()) {
        Some("css") => "text/css; charset=utf-8",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    };
    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .body(asset.contents()))
}

#[cfg(test)]
mod test {
    use crate::Result;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::{test, App};

    #[test]
    async fn stylesheet() -> Result<()> {
        let app = test::init_service(App::new().service(super::get)).await;
        let req = TestRequest::get().uri("/static/style.css").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(
            "text/css; charset=utf-8",
            res.headers().get("content-type").unwrap().to_str().unwrap()
        );
        Ok(())
    }

    #[test]
    async fn unknown_asset() -> Result<()> {
        let app = test::init_service(App::new().service(super::get)).await;
        let req = TestRequest::get().uri("/static/missing.js").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(StatusCode::NOT_FOUND, res.status());
        Ok(())
    }
}

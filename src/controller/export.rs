use crate::context::Context;
use crate::isochrone::QueryArgs;
use crate::map::pdf::{FILE_NAME, MIME_TYPE};
use crate::{pipeline, Error, Result};
use actix_web::http::header::ContentDisposition;
use actix_web::web::{Data, Query};
use actix_web::{get, HttpResponse, Responder};

#[get("/isochrone_map.pdf")]
pub async fn get(args: Query<QueryArgs>, ctx: Data<Context>) -> Result<impl Responder> {
    let Some(query) = args.to_query() else {
        return Err(Error::InvalidInput(
            "Error: enter at least one isochrone time".into(),
        ));
    };
    let map = pipeline::run(&query?, &ctx).await?;
    Ok(HttpResponse::Ok()
        .content_type(MIME_TYPE)
        .insert_header(ContentDisposition::attachment(FILE_NAME))
        .body(map.pdf))
}

#[cfg(test)]
mod test {
    use crate::error::ApiError;
    use crate::test::{mock_context, mock_ors_response};
    use crate::Result;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use actix_web::web::Data;
    use actix_web::{test, App};
    use httpmock::prelude::*;

    #[test]
    async fn pdf_attachment() -> Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/isochrones/driving-car");
                then.status(200).json_body(mock_ors_response(&[300, 600]));
            })
            .await;
        let app = test::init_service(
            App::new()
                .app_data(Data::new(mock_context(&server.base_url())))
                .service(super::get),
        )
        .await;
        let req = TestRequest::get()
            .uri("/isochrone_map.pdf?lat=25.0031&lon=55.1675&minutes=5,10")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(
            "application/pdf",
            res.headers().get("content-type").unwrap().to_str().unwrap()
        );
        let disposition = res
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("isochrone_map.pdf"));
        let body = test::read_body(res).await;
        assert!(body.starts_with(b"%PDF"));
        Ok(())
    }

    #[test]
    async fn missing_minutes() -> Result<()> {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(mock_context("http://127.0.0.1:1")))
                .service(super::get),
        )
        .await;
        let req = TestRequest::get().uri("/isochrone_map.pdf").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(StatusCode::BAD_REQUEST, res.status());
        Ok(())
    }

    #[test]
    async fn upstream_unauthorized() -> Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/isochrones/driving-car");
                then.status(401).body("Unauthorized");
            })
            .await;
        let app = test::init_service(
            App::new()
                .app_data(Data::new(mock_context(&server.base_url())))
                .service(super::get),
        )
        .await;
        let req = TestRequest::get()
            .uri("/isochrone_map.pdf?minutes=5")
            .to_request();
        let res: ApiError = test::call_and_read_body_json(&app, req).await;
        assert_eq!(502, res.http_code);
        assert!(res.message.contains("401"));
        Ok(())
    }

    #[test]
    async fn invalid_minutes() -> Result<()> {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(mock_context("http://127.0.0.1:1")))
                .service(super::get),
        )
        .await;
        let req = TestRequest::get()
            .uri("/isochrone_map.pdf?minutes=abc")
            .to_request();
        let res: ApiError = test::call_and_read_body_json(&app, req).await;
        assert_eq!(400, res.http_code);
        Ok(())
    }
}

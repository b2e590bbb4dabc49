pub mod asset;
pub mod export;
pub mod page;

use actix_web::web::ServiceConfig;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(page::get)
        .service(export::get)
        .service(asset::get);
}

use crate::conf::Conf;
use crate::isochrone::OrsClient;
use crate::map::{Basemap, TileServer};
use crate::Result;
use base64::prelude::{Engine, BASE64_STANDARD};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Immutable state shared by every submission.
pub struct Context {
    pub conf: Conf,
    pub ors: OrsClient,
    pub basemap: Arc<dyn Basemap>,
    /// Inline `data:` URI of the sidebar logo or the reason it's missing
    pub logo: std::result::Result<String, String>,
}

impl Context {
    pub fn new(conf: Conf) -> Result<Self> {
        let basemap = Arc::new(TileServer::new(conf.tile_url_template.clone()));
        Context::with_basemap(conf, basemap)
    }

    pub fn with_basemap(conf: Conf, basemap: Arc<dyn Basemap>) -> Result<Self> {
        Ok(Context {
            ors: OrsClient::new(&conf)?,
            logo: load_logo(&conf.logo_path),
            conf,
            basemap,
        })
    }
}

fn load_logo(path: &Path) -> std::result::Result<String, String> {
    let mime = match path.extension().and_then(|it| it.to_str()) {
        Some("svg") => "image/svg+xml",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/png",
    };
    match std::fs::read(path) {
        Ok(bytes) => Ok(format!("data:{mime};base64,{}", BASE64_STANDARD.encode(bytes))),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Logo is not available");
            Err(format!(
                "Logo file '{}' not found. Please ensure it is in the working directory.",
                path.display()
            ))
        }
    }
}

#[cfg(test)]
mod test {
    use super::load_logo;
    use crate::test::mock_context;
    use crate::Result;
    use std::fs;

    #[test]
    fn missing_logo() {
        let ctx = mock_context("http://127.0.0.1:1");
        let message = ctx.logo.unwrap_err();
        assert!(message.contains("does-not-exist.png"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn logo_as_data_uri() -> Result<()> {
        let path = std::env::temp_dir().join(format!("isochrone-map-logo-{}.svg", std::process::id()));
        fs::write(&path, "<svg/>")?;
        let res = load_logo(&path);
        fs::remove_file(&path)?;
        assert_eq!(Ok("data:image/svg+xml;base64,PHN2Zy8+".to_string()), res);
        Ok(())
    }
}

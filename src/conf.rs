use crate::{Error, Result};
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tracing::info;
use url::Url;

pub const DEFAULT_ORS_API_URL: &str = "https://api.openrouteservice.org";
pub const DEFAULT_TILE_URL_TEMPLATE: &str = "https://a.tile.openstreetmap.org/{z}/{x}/{y}.png";

#[derive(Clone, Debug)]
pub struct Conf {
    pub ors_api_key: String,
    pub ors_api_url: Url,
    pub ors_timeout: Duration,
    pub tile_url_template: String,
    pub map_width: u32,
    pub map_height: u32,
    pub logo_path: PathBuf,
    pub bind_addr: String,
}

impl Conf {
    pub fn from_env() -> Result<Conf> {
        Conf::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Conf> {
        let var = |name: &str| lookup(name).filter(|it| !it.trim().is_empty());

        let Some(ors_api_key) = var("ORS_API_KEY") else {
            return Err(Error::Conf(
                "Missing routing service credential: set ORS_API_KEY".into(),
            ));
        };

        let ors_api_url = var("ORS_API_URL").unwrap_or_else(|| DEFAULT_ORS_API_URL.into());
        let ors_api_url = Url::parse(&ors_api_url)?;

        let tile_url_template =
            var("TILE_URL_TEMPLATE").unwrap_or_else(|| DEFAULT_TILE_URL_TEMPLATE.into());
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !tile_url_template.contains(placeholder) {
                return Err(Error::Conf(format!(
                    "TILE_URL_TEMPLATE is missing the {placeholder} placeholder"
                )));
            }
        }
        Url::parse(
            &tile_url_template
                .replace("{z}", "0")
                .replace("{x}", "0")
                .replace("{y}", "0"),
        )?;

        let conf = Conf {
            ors_api_key,
            ors_api_url,
            ors_timeout: Duration::from_secs(parse_or(
                "ORS_TIMEOUT_SEC",
                var("ORS_TIMEOUT_SEC"),
                30,
            )?),
            tile_url_template,
            map_width: parse_or("MAP_WIDTH", var("MAP_WIDTH"), 800)?,
            map_height: parse_or("MAP_HEIGHT", var("MAP_HEIGHT"), 800)?,
            logo_path: var("LOGO_PATH").unwrap_or_else(|| "logo.png".into()).into(),
            bind_addr: var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8000".into()),
        };

        info!(
            ors_api_url = conf.ors_api_url.as_str(),
            tile_url_template = conf.tile_url_template.as_str(),
            bind_addr = conf.bind_addr.as_str(),
            "Loaded configuration",
        );

        Ok(conf)
    }
}

fn parse_or<T: FromStr>(name: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::Conf(format!("{name} has invalid value: {value}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod test {
    use super::Conf;
    use crate::Error;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn missing_api_key() {
        let res = Conf::from_lookup(lookup(&[]));
        assert!(matches!(res, Err(Error::Conf(msg)) if msg.contains("ORS_API_KEY")));
    }

    #[test]
    fn blank_api_key() {
        let res = Conf::from_lookup(lookup(&[("ORS_API_KEY", "  ")]));
        assert!(matches!(res, Err(Error::Conf(_))));
    }

    #[test]
    fn defaults() {
        let conf = Conf::from_lookup(lookup(&[("ORS_API_KEY", "secret")])).unwrap();
        assert_eq!("secret", conf.ors_api_key);
        assert_eq!("https://api.openrouteservice.org/", conf.ors_api_url.as_str());
        assert_eq!(Duration::from_secs(30), conf.ors_timeout);
        assert_eq!(800, conf.map_width);
        assert_eq!(800, conf.map_height);
        assert_eq!("127.0.0.1:8000", conf.bind_addr);
    }

    #[test]
    fn overrides() {
        let conf = Conf::from_lookup(lookup(&[
            ("ORS_API_KEY", "secret"),
            ("ORS_API_URL", "http://localhost:8080"),
            ("ORS_TIMEOUT_SEC", "5"),
            ("MAP_WIDTH", "640"),
        ]))
        .unwrap();
        assert_eq!("http://localhost:8080/", conf.ors_api_url.as_str());
        assert_eq!(Duration::from_secs(5), conf.ors_timeout);
        assert_eq!(640, conf.map_width);
    }

    #[test]
    fn invalid_number() {
        let res = Conf::from_lookup(lookup(&[("ORS_API_KEY", "secret"), ("MAP_WIDTH", "wide")]));
        assert!(matches!(res, Err(Error::Conf(msg)) if msg.contains("MAP_WIDTH")));
    }

    #[test]
    fn tile_template_without_placeholders() {
        let res = Conf::from_lookup(lookup(&[
            ("ORS_API_KEY", "secret"),
            ("TILE_URL_TEMPLATE", "https://tiles.example.com/tile.png"),
        ]));
        assert!(matches!(res, Err(Error::Conf(_))));
    }
}

use crate::map::figure::tick_label;
use crate::map::pdf::{FILE_NAME, MIME_TYPE};
use crate::pipeline::IsochroneMap;
use base64::prelude::{Engine, BASE64_STANDARD};
use std::fmt::Write;

pub struct Page {
    pub lat: String,
    pub lon: String,
    pub minutes: String,
    /// Inline `data:` URI of the logo or the reason it's missing
    pub logo: Result<String, String>,
    pub error: Option<String>,
    pub map: Option<IsochroneMap>,
}

pub fn render(page: &Page) -> String {
    let mut sidebar = String::new();
    match &page.logo {
        Ok(uri) => {
            let _ = write!(sidebar, r#"<img class="logo" src="{uri}" alt="Logo">"#);
        }
        Err(message) => {
            let _ = write!(sidebar, r#"<p class="error">{}</p>"#, escape(message));
        }
    }
    let _ = write!(
        sidebar,
        r#"
            <h2>Generate Isochrone Maps</h2>
            <p>Enter coordinates and isochrone times to generate a map.</p>
            <form method="get" action="/">
                <label for="lat">Enter the latitude:</label>
                <input id="lat" name="lat" type="text" inputmode="decimal" value="{lat}">
                <label for="lon">Enter the longitude:</label>
                <input id="lon" name="lon" type="text" inputmode="decimal" value="{lon}">
                <label for="minutes">Enter isochrone times in minutes (e.g., 5,10,15,20):</label>
                <input id="minutes" name="minutes" type="text" value="{minutes}" title="Comma-separated times in minutes.">
                <button type="submit">Generate</button>
            </form>
        "#,
        lat = escape(&page.lat),
        lon = escape(&page.lon),
        minutes = escape(&page.minutes),
    );
    if let Some(error) = &page.error {
        let _ = write!(sidebar, r#"<p class="error">{}</p>"#, escape(error));
    }

    let mut main = String::new();
    if let Some(map) = &page.map {
        let _ = write!(
            sidebar,
            r#"<a class="download" download="{FILE_NAME}" href="data:{MIME_TYPE};base64,{}">Download map as PDF</a>"#,
            BASE64_STANDARD.encode(&map.pdf),
        );
        let (min, max) = (map.extent.min(), map.extent.max());
        let _ = write!(
            main,
            r#"<figure class="plot">
                <figcaption class="title">{title}</figcaption>
                <span class="y-label">{y_label}</span>
                <span class="y-ticks"><span>{y_max}</span><span>{y_min}</span></span>
                <img class="map" src="data:image/png;base64,{png}" alt="{title}">
                <span class="x-ticks"><span>{x_min}</span><span>{x_max}</span></span>
                <span class="x-label">{x_label}</span>
            </figure>"#,
            title = escape(&map.title),
            x_label = escape(&map.x_label),
            y_label = escape(&map.y_label),
            x_min = tick_label(min.x),
            x_max = tick_label(max.x),
            y_min = tick_label(min.y),
            y_max = tick_label(max.y),
            png = BASE64_STANDARD.encode(&map.png),
        );
        main.push_str(r#"<ul class="legend">"#);
        for (minutes, [r, g, b]) in &map.legend {
            let _ = write!(
                main,
                r#"<li><span class="swatch" style="background: rgb({r}, {g}, {b})"></span>{minutes} min</li>"#,
            );
        }
        main.push_str("</ul>");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Isochrone Map Generator</title>
    <link rel="stylesheet" href="/static/style.css">
</head>
<body>
    <header><h1>Isochrone Map Generator</h1></header>
    <aside>{sidebar}</aside>
    <main>{main}</main>
    <footer>
        <p>Powered by OpenRouteService &amp; OpenStreetMap</p>
    </footer>
</body>
</html>
"#
    )
}

pub fn escape(value: &str) -> String {
    let mut res = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => res.push_str("&amp;"),
            '<' => res.push_str("&lt;"),
            '>' => res.push_str("&gt;"),
            '"' => res.push_str("&quot;"),
            '\'' => res.push_str("&#39;"),
            c => res.push(c),
        }
    }
    res
}

//! HTML rendering of the widget page

use crate::view::WeatherView;

const CARD_CLASSES: &str = "bg-blue-200 p-4 rounded-lg text-center";

// Asks the browser for a position and reloads the page with the answer.
const GEOLOCATION_SCRIPT: &str = r#"
document.getElementById('current-location-btn').addEventListener('click', () => {
  if (!navigator.geolocation) {
    window.location.search = '?geolocation=unsupported';
    return;
  }
  navigator.geolocation.getCurrentPosition(
    (position) => {
      const params = new URLSearchParams({
        latitude: position.coords.latitude,
        longitude: position.coords.longitude,
      });
      window.location.search = '?' + params.toString();
    },
    (error) => {
      const reasons = { [error.PERMISSION_DENIED]: 'denied', [error.TIMEOUT]: 'timeout' };
      const reason = reasons[error.code] || 'unavailable';
      window.location.search = '?geolocation=' + reason;
    },
    { timeout: 10000 },
  );
});
"#;

/// Escape text for use in element content and quoted attributes
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn hidden_class(visible: bool) -> &'static str {
    if visible { "" } else { " hidden" }
}

/// Render the forecast container's cards
#[must_use]
pub fn render_forecast(view: &WeatherView) -> String {
    view.forecast
        .iter()
        .map(|card| {
            format!(
                r#"<div class="{CARD_CLASSES}"><p><strong>{}</strong></p><p>{}</p><p>{}</p><p>{}</p></div>"#,
                escape_html(&card.title()),
                escape_html(&card.max_temperature),
                escape_html(&card.min_temperature),
                escape_html(&card.wind_speed),
            )
        })
        .collect()
}

/// Render the whole widget page for `view`, keeping `search_text` in the input
#[must_use]
pub fn render_page(view: &WeatherView, search_text: &str) -> String {
    let error_message = view.error_message.as_deref().unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Weather</title>
<style>.hidden {{ display: none; }}</style>
</head>
<body>
<main>
<form id="search-form" method="get" action="/">
<input id="city-input" name="city" type="text" placeholder="Enter a city name" value="{search}">
<button id="search-btn" type="submit">Search</button>
<button id="current-location-btn" type="button">Use Current Location</button>
</form>
<section id="weather-data" class="{weather_class}">
<h2 id="location">{location}</h2>
<p id="temperature">{temperature}</p>
<p id="wind">{wind}</p>
<p id="precipitation">{precipitation}</p>
<div id="forecast">{forecast}</div>
</section>
<p id="error-message" class="{error_class}">{error}</p>
</main>
<script>{script}</script>
</body>
</html>
"#,
        search = escape_html(search_text),
        weather_class = hidden_class(view.weather_visible).trim_start(),
        location = escape_html(&view.location),
        temperature = escape_html(&view.temperature),
        wind = escape_html(&view.wind),
        precipitation = escape_html(&view.precipitation),
        forecast = render_forecast(view),
        error_class = hidden_class(view.error_visible()).trim_start(),
        error = escape_html(error_message),
        script = GEOLOCATION_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DailyForecast;

    fn rendered_view() -> WeatherView {
        let forecast = DailyForecast {
            time: Vec::new(),
            temperature_max: vec![Some(21.5); 5],
            temperature_min: vec![Some(12.0); 5],
            precipitation_sum: vec![Some(1.2); 5],
            wind_speed: vec![Some(4.0); 5],
        };
        let mut view = WeatherView::default();
        view.render("Paris", &forecast);
        view
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#39;y&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Zürich"), "Zürich");
    }

    #[test]
    fn test_render_forecast_cards() {
        let html = render_forecast(&rendered_view());
        assert_eq!(html.matches(CARD_CLASSES).count(), 5);
        assert!(html.contains("<strong>Day 1</strong>"));
        assert!(html.contains("<strong>Day 5</strong>"));
        assert!(html.contains("Max Temp: 21.5°C"));
    }

    #[test]
    fn test_page_with_weather() {
        let html = render_page(&rendered_view(), "Paris");
        assert!(html.contains(r#"<section id="weather-data" class="">"#));
        assert!(html.contains(r#"<p id="error-message" class="hidden"></p>"#));
        assert!(html.contains(r#"<h2 id="location">Paris</h2>"#));
        assert!(html.contains(r#"value="Paris""#));
        assert!(html.contains("Precipitation: 1.2 mm"));
    }

    #[test]
    fn test_page_with_error() {
        let mut view = rendered_view();
        view.show_error("City not found.");
        let html = render_page(&view, "Nowhere");
        assert!(html.contains(r#"<section id="weather-data" class="hidden">"#));
        assert!(html.contains(r#"<p id="error-message" class="">City not found.</p>"#));
    }

    #[test]
    fn test_empty_page_hides_both_panels() {
        let html = render_page(&WeatherView::default(), "");
        assert!(html.contains(r#"<section id="weather-data" class="hidden">"#));
        assert!(html.contains(r#"<p id="error-message" class="hidden">"#));
    }

    #[test]
    fn test_script_reports_browser_timeout() {
        let html = render_page(&WeatherView::default(), "");
        assert!(html.contains("[error.TIMEOUT]: 'timeout'"));
        assert!(html.contains("[error.PERMISSION_DENIED]: 'denied'"));
    }

    #[test]
    fn test_label_is_escaped() {
        let mut view = rendered_view();
        view.location = "<b>Paris</b>".to_string();
        let html = render_page(&view, "\"><script>");
        assert!(html.contains("&lt;b&gt;Paris&lt;/b&gt;"));
        assert!(html.contains(r#"value="&quot;&gt;&lt;script&gt;""#));
    }
}

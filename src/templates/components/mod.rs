use crate::domain::alert::{Alert, Severity};
use crate::domain::recommendation::RecommendationSource;
use maud::{html, Markup, DOCTYPE};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

// Everything but RFC 3986 unreserved characters is escaped inside a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Dashboard path of a listing, with the id percent-encoded.
pub fn listing_href(listing_id: &str) -> String {
    format!("/listings/{}", utf8_percent_encode(listing_id, PATH_SEGMENT))
}

/// Passes through only absolute http(s) URLs; anything else from provider
/// data is not safe to put in an href.
pub fn external_url(url: Option<&str>) -> Option<&str> {
    let url = url?.trim();
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then_some(url)
}

pub fn card(title: &str, body: Markup) -> Markup {
    html! {
        section class="card" {
            h2 { (title) }
            div class="card-body" {
                (body)
            }
        }
    }
}

pub fn stat_tile(label: &str, value: impl AsRef<str>) -> Markup {
    html! {
        div class="stat" {
            div class="label" { (label) }
            div class="value" { (value.as_ref()) }
        }
    }
}

pub fn severity_badge(severity: Severity) -> Markup {
    html! {
        span class={ "badge " (severity.as_str()) } { (severity.as_str()) }
    }
}

pub fn source_badge(source: RecommendationSource) -> Markup {
    let class = match source {
        RecommendationSource::Ai => "badge ai",
        RecommendationSource::Fallback => "badge fallback",
    };
    html! {
        span class=(class) { (source.label()) }
    }
}

pub fn money(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => "n/a".to_string(),
    }
}

/// One alert row with a mark-read form when still unread.
pub fn alert_row(alert: &Alert) -> Markup {
    html! {
        li.alert.read[alert.is_read] {
            (severity_badge(alert.severity))
            " "
            strong { (alert.title) }
            " "
            small { (alert.created_at.format("%Y-%m-%d %H:%M UTC").to_string()) }
            p { (alert.message) }
            @if !alert.is_read {
                form class="inline" method="post" action={ "/alerts/" (alert.id) "/read" } {
                    input type="hidden" name="listing_id" value=(alert.listing_id);
                    button type="submit" { "Mark read" }
                }
            }
        }
    }
}

/// Standalone error page; does not depend on the layout so it renders even
/// when page data could not be loaded.
pub fn error_page(status: u16, message: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Error " (status) }
                style {
                    "body { font-family: system-ui, sans-serif; max-width: 720px; margin: 4rem auto; padding: 1rem; }"
                    "p { font-size: 1.1rem; color: #444; }"
                }
            }
            body {
                h1 { "Error " (status) }
                p { (message) }
                p { a href="/" { "← Back to dashboard" } }
            }
        }
    }
}

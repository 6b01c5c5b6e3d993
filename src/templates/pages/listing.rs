use crate::domain::alert::Alert;
use crate::domain::snapshot::{SnapshotSummary, StoredSnapshot};
use crate::templates::components::{
    alert_row, card, external_url, listing_href, money, source_badge, stat_tile,
};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub struct ListingPageVm {
    pub current: StoredSnapshot,
    pub alerts: Vec<Alert>,
    pub unread_alerts: i64,
    pub history: Vec<SnapshotSummary>,
}

pub fn listing_page(vm: &ListingPageVm) -> Markup {
    let snap = &vm.current.snapshot;
    let target = &snap.target;
    let stats = &snap.stats;
    let recs = &snap.recommendations;
    let href = listing_href(&snap.listing_id);

    desktop_layout(
        &target.name,
        html! {
            h1 { (target.name) }
            p {
                "Listing " code { (snap.listing_id) }
                " · analyzed " (snap.captured_at.format("%Y-%m-%d %H:%M UTC").to_string())
                @if let Some(url) = external_url(target.url.as_deref()) {
                    " · " a href=(url) { "view listing" }
                }
            }
            form class="inline" method="post" action={ (href) "/refresh" } {
                button type="submit" { "Refresh now" }
            }
            " "
            a href={ "/api" (href) "/history.xlsx" } { "Download history (.xlsx)" }

            (card("Market", html! {
                div class="stats" {
                    (stat_tile("Your price", money(target.price)))
                    (stat_tile("Competitors", stats.competitor_count.to_string()))
                    (stat_tile("Avg price", money(stats.has_prices().then_some(stats.price_avg))))
                    (stat_tile("Price range", if stats.has_prices() {
                        format!("${:.0} – ${:.0}", stats.price_min, stats.price_max)
                    } else {
                        "n/a".to_string()
                    }))
                    (stat_tile("Avg rating", format!("{:.2}", stats.rating_avg)))
                    (stat_tile("Cheaper than you", stats
                        .target_price_percentile
                        .map(|p| format!("{p:.0}%"))
                        .unwrap_or_else(|| "n/a".to_string())))
                }
                @if !stats.missing_amenities.is_empty() {
                    p { "Common amenities you lack: " (stats.missing_amenities.join(", ")) }
                }
            }))

            (card("Recommendations", html! {
                h3 { "Pricing " (source_badge(recs.pricing.source)) }
                @if let Some(suggested) = recs.pricing.suggested_price {
                    p {
                        strong { (money(Some(suggested))) }
                        " per night (range " (money(recs.pricing.min_price)) " – " (money(recs.pricing.max_price))
                        ", confidence " (recs.pricing.confidence) ")"
                    }
                } @else {
                    p { strong { "No price suggestion" } " (insufficient data)" }
                }
                p { (recs.pricing.reasoning) }

                h3 { "Features " (source_badge(recs.features.source)) }
                @if recs.features.suggestions.is_empty() {
                    p { "Your amenities already match the market." }
                } @else {
                    ul {
                        @for s in &recs.features.suggestions {
                            li { strong { (s.feature) } ": " (s.reason) }
                        }
                    }
                }

                h3 { "Description " (source_badge(recs.description.source)) }
                p { strong { (recs.description.title) } }
                p { (recs.description.description) }
            }))

            (card(&format!("Alerts ({} unread)", vm.unread_alerts), html! {
                @if vm.unread_alerts > 0 {
                    form method="post" action={ (href) "/alerts/read" } {
                        button type="submit" { "Mark all read" }
                    }
                }
                @if vm.alerts.is_empty() {
                    p { "No alerts yet. Alerts appear after the second analysis." }
                } @else {
                    ul { @for a in &vm.alerts { (alert_row(a)) } }
                }
            }))

            (card("Competitors", html! {
                table {
                    thead {
                        tr { th { "Name" } th { "Distance" } th { "Price" } th { "Rating" } th { "Reviews" } th { "Amenities" } }
                    }
                    tbody {
                        @for c in &snap.competitors {
                            tr {
                                td {
                                    @match external_url(c.url.as_deref()) {
                                        Some(url) => { a href=(url) { (c.name) } }
                                        None => { (c.name) }
                                    }
                                }
                                td { (c.distance_km.map(|d| format!("{d:.1} km")).unwrap_or_default()) }
                                td { (c.display_price()) }
                                td { (c.rating.map(|r| format!("{r:.2}")).unwrap_or_else(|| "n/a".to_string())) }
                                td { (c.review_count) }
                                td { (c.amenities.len()) }
                            }
                        }
                    }
                }
            }))

            (card("History", html! {
                table {
                    thead {
                        tr { th { "Captured" } th { "Competitors" } th { "Avg price" } th { "Avg rating" } th { "Suggested" } }
                    }
                    tbody {
                        @for h in &vm.history {
                            tr {
                                td {
                                    (h.captured_at.format("%Y-%m-%d %H:%M").to_string())
                                    @if h.is_current { " (current)" }
                                }
                                td { (h.competitor_count) }
                                td { (money(Some(h.price_avg))) }
                                td { (format!("{:.2}", h.rating_avg)) }
                                td { (money(h.suggested_price)) }
                            }
                        }
                    }
                }
            }))
        },
    )
}

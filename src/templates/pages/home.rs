// templates/pages/home.rs

use crate::domain::snapshot::TrackedListing;
use crate::templates::components::{card, listing_href, money};
use crate::templates::desktop_layout;
use maud::{html, Markup};

pub fn home_page(listings: &[TrackedListing]) -> Markup {
    desktop_layout(
        "Dashboard",
        html! {
            h1 { "Tracked listings" }

            (card("Analyze a listing", html! {
                form method="post" action="/listings" {
                    label for="listing_id" { "Listing ID " }
                    input type="text" id="listing_id" name="listing_id" placeholder="e.g. 53154983" required;
                    " "
                    button type="submit" { "Analyze" }
                }
                p { small { "Fetching competitors and recommendations can take a little while." } }
            }))

            @if listings.is_empty() {
                p { "No listings tracked yet. Analyze one to get started." }
            } @else {
                section class="card" {
                    table {
                        thead {
                            tr {
                                th { "Listing" }
                                th { "Last analyzed" }
                                th { "Competitors" }
                                th { "Your price" }
                                th { "Market avg" }
                                th { "Suggested" }
                                th { "Unread alerts" }
                            }
                        }
                        tbody {
                            @for row in listings {
                                tr {
                                    td { a href=(listing_href(&row.summary.listing_id)) { (row.summary.listing_name) } }
                                    td { (row.summary.captured_at.format("%Y-%m-%d %H:%M").to_string()) }
                                    td { (row.summary.competitor_count) }
                                    td { (money(row.summary.target_price)) }
                                    td { (money(Some(row.summary.price_avg))) }
                                    td { (money(row.summary.suggested_price)) }
                                    td { (row.unread_alerts) }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

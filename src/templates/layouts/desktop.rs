use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLES: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1f2937; background: #f9fafb; }
header { display: flex; align-items: center; justify-content: space-between; padding: 0.75rem 1.5rem; background: #fff; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
header nav a { margin-left: 1rem; color: #524ed2; text-decoration: none; }
main { max-width: 1100px; margin: 1.5rem auto; padding: 0 1rem; }
.card { background: #fff; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1rem; box-shadow: 0 1px 2px rgba(0,0,0,.06); }
.stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 0.75rem; }
.stat { background: #f3f4f6; border-radius: 6px; padding: 0.6rem 0.8rem; }
.stat .label { font-size: 0.8rem; color: #6b7280; }
.stat .value { font-size: 1.3rem; font-weight: 600; }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th, td { text-align: left; padding: 0.4rem 0.5rem; border-bottom: 1px solid #e5e7eb; }
.badge { display: inline-block; border-radius: 999px; padding: 0.1rem 0.55rem; font-size: 0.75rem; font-weight: 600; }
.badge.low { background: #e5e7eb; }
.badge.medium { background: #fef3c7; color: #92400e; }
.badge.high { background: #fee2e2; color: #991b1b; }
.badge.opportunity { background: #d1fae5; color: #065f46; }
.badge.ai { background: #ede9fe; color: #5b21b6; }
.badge.fallback { background: #e5e7eb; }
.alert.read { opacity: 0.55; }
form.inline { display: inline; }
button { cursor: pointer; padding: 0.35rem 0.9rem; border: none; border-radius: 4px; background: #524ed2; color: #fff; }
input[type=text] { padding: 0.4rem; font-size: 1rem; }
"#;

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " · Listing Radar" }
                style { (PreEscaped(STYLES)) }
            }
            body {
                header {
                    strong { "Listing Radar" }
                    nav {
                        a href="/" { "Dashboard" }
                        a href="/health" { "Health" }
                    }
                }
                main { (content) }
            }
        }
    }
}

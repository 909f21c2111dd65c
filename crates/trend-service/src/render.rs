//! Server-rendered HTML for the dashboard page.

use trend_api::DashboardView;
use trend_core::{embed_url, format_grouped, FirepowerEntry, RankedVideo, NO_SUMMARY_PLACEHOLDER};

const PAGE_TITLE: &str = "Trending Sports Videos";

const STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; \
margin: 0; display: flex; color: #222; }
aside { width: 280px; padding: 20px; background: #f4f5f7; min-height: 100vh; }
main { flex: 1; padding: 20px 32px; }
.search input { width: 60%; padding: 6px; }
.error { background: #fdecea; color: #8a1c12; padding: 12px; border-radius: 6px; }
.tags button { margin: 0 6px 6px 0; border-radius: 12px; border: 1px solid #ccc; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(340px, 1fr)); gap: 20px; }
.card { border: 1px solid #ddd; border-radius: 8px; padding: 12px; }
.card iframe { width: 100%; aspect-ratio: 16 / 9; border: 0; }
.meta { color: #666; font-size: 0.9em; }
.summary { background: #f9f9f9; padding: 8px; border-radius: 6px; font-size: 0.9em; }
.bar-row { margin: 4px 0; font-size: 0.8em; }
.bar { background: #e4572e; height: 10px; border-radius: 3px; }
.notice { color: #666; }
";

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Render the whole dashboard page for `view`.
#[must_use]
pub fn render_dashboard(view: &DashboardView) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{PAGE_TITLE}</title>\n"));
    html.push_str("<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&render_sidebar(view));

    html.push_str("<main>\n");
    html.push_str(&format!("<h1>{PAGE_TITLE}</h1>\n"));
    html.push_str("<form class=\"search\" method=\"get\" action=\"/\">\n");
    html.push_str(&format!(
        "<input type=\"text\" name=\"search\" placeholder=\"Search title or channel\" value=\"{}\">\n",
        escape_html(&view.search)
    ));
    html.push_str("<button type=\"submit\">Search</button>\n</form>\n");

    if let Some(error) = &view.error {
        html.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(error)));
    }

    html.push_str(&format!("<p class=\"total\">Total: {} videos</p>\n", view.total));

    if !view.top_tags.is_empty() {
        html.push_str("<div class=\"tags\">\n");
        for tag in &view.top_tags {
            html.push_str(&format!(
                "<button type=\"button\" disabled>#{} ({})</button>\n",
                escape_html(&tag.tag),
                tag.count
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("<div class=\"grid\">\n");
    for video in &view.videos {
        html.push_str(&render_card(video));
    }
    html.push_str("</div>\n</main>\n</body>\n</html>\n");
    html
}

fn render_sidebar(view: &DashboardView) -> String {
    let mut html = String::from("<aside>\n<h2>Controls</h2>\n");
    html.push_str(&format!(
        "<p><a class=\"refresh\" href=\"{}\">Refresh data</a></p>\n",
        escape_html(&refresh_href(&view.search))
    ));

    if view.videos.is_empty() {
        html.push_str("<p class=\"notice\">No videos to chart.</p>\n");
    } else {
        html.push_str("<details>\n<summary>Firepower top 10</summary>\n");
        html.push_str(&render_chart(&view.firepower_chart));
        html.push_str("</details>\n");
    }

    html.push_str("</aside>\n");
    html
}

fn refresh_href(search: &str) -> String {
    if search.is_empty() {
        return "/".to_string();
    }
    let encoded: String = url::form_urlencoded::byte_serialize(search.as_bytes()).collect();
    format!("/?search={encoded}")
}

fn render_chart(entries: &[FirepowerEntry]) -> String {
    let max = entries.iter().map(|entry| entry.firepower).max().unwrap_or(0);
    let mut html = String::new();
    for entry in entries {
        html.push_str(&format!(
            "<div class=\"bar-row\"><div>{} ({})</div><div class=\"bar\" style=\"width: {}%\"></div></div>\n",
            escape_html(&entry.title),
            format_grouped(entry.firepower),
            bar_percent(entry.firepower, max)
        ));
    }
    html
}

fn bar_percent(value: u64, max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    value.saturating_mul(100) / max
}

fn render_card(video: &RankedVideo) -> String {
    let record = &video.record;
    let mut html = String::from("<article class=\"card\">\n");

    match record.video_id() {
        Some(id) => html.push_str(&format!(
            "<iframe src=\"{}\" title=\"{}\" allowfullscreen></iframe>\n",
            escape_html(&embed_url(&id)),
            escape_html(&record.title)
        )),
        None if !record.video_url.is_empty() => html.push_str(&format!(
            "<p><a href=\"{0}\">{0}</a></p>\n",
            escape_html(&record.video_url)
        )),
        None => html.push_str("<p class=\"notice\">No player available.</p>\n"),
    }

    html.push_str(&format!("<h3>{}</h3>\n", escape_html(&record.title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} · {}</p>\n",
        escape_html(&record.channel),
        escape_html(&video.time_txt)
    ));
    html.push_str(&format!(
        "<p class=\"metrics\">Views {} · Likes {} · Firepower {}</p>\n",
        format_grouped(record.view_count),
        format_grouped(record.like_count),
        format_grouped(video.firepower)
    ));

    let summary = match record.summary_text() {
        Some(text) => escape_html(text).replace('\n', "<br>"),
        None => escape_html(NO_SUMMARY_PLACEHOLDER),
    };
    html.push_str(&format!("<div class=\"summary\">{summary}</div>\n"));

    html.push_str("</article>\n");
    html
}

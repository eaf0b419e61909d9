// src/fetch/table.rs

use reqwest::Client;
use scraper::{ElementRef, Html};
use tracing::{info, instrument, warn};
use url::Url;

use super::{element_text, get_text, selector};
use crate::error::{Result, ScrapeError};
use crate::position::PositionCode;
use crate::process::raw_table::{Header, RawTable};

/// `<base>/nfl/stats/<position>.php`
pub fn stats_url(base: &Url, position: PositionCode) -> Result<Url> {
    base.join(&format!("nfl/stats/{}.php", position.path_segment()))
        .map_err(|e| ScrapeError::parse(format!("building {} stats URL: {}", position, e)))
}

/// Fetch one position's stats page and return its first table, tagged with the position.
#[instrument(level = "info", skip(client, base))]
pub async fn fetch_position_table(
    client: &Client,
    base: &Url,
    position: PositionCode,
) -> Result<RawTable> {
    let url = stats_url(base, position)?;
    let html = get_text(client, &url).await?;
    let mut table = parse_first_table(&html, position)?;
    table.tag_position();
    info!(%url, rows = table.rows.len(), "fetched stats table");
    Ok(table)
}

/// Expand one header `<tr>` into labels, repeating a cell `colspan` times.
fn header_labels(row: &ElementRef<'_>) -> Vec<String> {
    let mut labels = Vec::new();
    for cell in row_cells(row, &["th", "td"]) {
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        let text = element_text(&cell);
        labels.extend(std::iter::repeat(text).take(span));
    }
    labels
}

/// Combine header rows into one `Header` per column. The bottom row names the
/// fields; the row above, if any, supplies each column's group.
fn build_headers(rows: &[Vec<String>]) -> Vec<Header> {
    match rows {
        [] => Vec::new(),
        [only] => only.iter().map(|f| Header::single(f.as_str())).collect(),
        [.., groups, fields] => fields
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let category = groups.get(i).map(String::as_str).unwrap_or("");
                Header::compound(category, f.as_str())
            })
            .collect(),
    }
}

/// Parse the first `<table>` in `html`.
///
/// Header rows come from `<thead>`, or failing that from leading rows made only
/// of `<th>` cells. Every row with at least one `<td>` is data. The table must
/// have a `Player` column; anything else is the wrong table.
pub fn parse_first_table(html: &str, position: PositionCode) -> Result<RawTable> {
    let doc = Html::parse_document(html);
    let table_sel = selector("table");
    let row_sel = selector("tr");

    let table = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| ScrapeError::parse(format!("no <table> on {} page", position)))?;

    let mut header_rows: Vec<Vec<String>> = Vec::new();
    let mut rows = Vec::new();

    for tr in table.select(&row_sel) {
        let Some(in_thead) = row_context(&tr, &table) else {
            continue;
        };
        if in_thead {
            header_rows.push(header_labels(&tr));
            continue;
        }
        let cells = row_cells(&tr, &["td"]);
        if cells.is_empty() {
            if rows.is_empty() {
                header_rows.push(header_labels(&tr));
            }
            continue;
        }
        rows.push(cells.iter().map(element_text).collect::<Vec<_>>());
    }

    let headers = build_headers(&header_rows);
    if headers.is_empty() {
        return Err(ScrapeError::parse(format!(
            "first table on {} page has no header row",
            position
        )));
    }

    let table = RawTable::new(position, headers, rows);
    if !table.has_field("player") {
        warn!(%position, "first table has no Player column");
        return Err(ScrapeError::parse(format!(
            "first table on {} page has no Player column",
            position
        )));
    }
    Ok(table)
}

/// Direct `<th>`/`<td>` children of a row, so nested tables don't leak in.
fn row_cells<'a>(tr: &ElementRef<'a>, names: &[&str]) -> Vec<ElementRef<'a>> {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| names.contains(&c.value().name()))
        .collect()
}

/// Whether the row sits under a `<thead>`, or `None` when its nearest
/// enclosing `<table>` is not `table`.
fn row_context(tr: &ElementRef<'_>, table: &ElementRef<'_>) -> Option<bool> {
    let mut in_thead = false;
    for a in tr.ancestors().filter_map(ElementRef::wrap) {
        match a.value().name() {
            "thead" => in_thead = true,
            "table" => return (a.id() == table.id()).then_some(in_thead),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{build_client, test_server};
    use crate::config::ScrapeConfig;
    use crate::process::raw_table::POSITION_COLUMN;

    const QB_PAGE: &str = r##"
<html><body>
<div class="mobile-table">
<table id="data" class="table">
  <thead>
    <tr>
      <th colspan="2"></th>
      <th colspan="2">PASSING</th>
      <th colspan="3">MISC</th>
    </tr>
    <tr>
      <th>Rank</th><th>Player</th>
      <th>YDS</th><th>TD</th>
      <th>G</th><th>FPTS</th><th>ROST</th>
    </tr>
  </thead>
  <tbody>
    <tr class="mpb-player-1">
      <td>1</td>
      <td class="player-label"><a href="/nfl/players/jane-doe.php" class="player-name">Jane Doe</a> (BUF)</td>
      <td>4,306</td><td>29</td>
      <td>17</td><td>385.0</td><td>99.9%</td>
    </tr>
    <tr class="mpb-player-2">
      <td>2</td>
      <td class="player-label"><a href="#">John Roe</a> (PHI)</td>
      <td>3,858</td><td>23</td>
      <td>16</td><td>357.2</td><td>99.1%</td>
    </tr>
  </tbody>
</table>
</div>
<table><tr><th>Other</th></tr><tr><td>ignored</td></tr></table>
</body></html>
"##;

    const K_PAGE: &str = r#"
<table>
  <tr><th>Rank</th><th>Player</th><th>FG</th><th>G</th><th>ROST</th></tr>
  <tr><td>1</td><td>Kay Kicker (DAL)</td><td>30</td><td>17</td><td>55%</td></tr>
</table>
"#;

    #[test]
    fn test_two_level_headers() {
        let t = parse_first_table(QB_PAGE, PositionCode::QB).unwrap();
        assert_eq!(t.headers.len(), 7);
        assert_eq!(t.headers[0], Header::compound("", "Rank"));
        assert_eq!(t.headers[1], Header::compound("", "Player"));
        assert_eq!(t.headers[2], Header::compound("PASSING", "YDS"));
        assert_eq!(t.headers[6], Header::compound("MISC", "ROST"));
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][1], "Jane Doe (BUF)");
        assert_eq!(t.rows[1][6], "99.1%");
    }

    #[test]
    fn test_single_level_headers_without_thead() {
        let t = parse_first_table(K_PAGE, PositionCode::K).unwrap();
        assert_eq!(t.headers[1], Header::single("Player"));
        assert_eq!(t.rows, vec![vec!["1", "Kay Kicker (DAL)", "30", "17", "55%"]]);
    }

    #[test]
    fn test_no_table_is_parse_error() {
        let err = parse_first_table("<html><p>maintenance</p></html>", PositionCode::RB);
        assert!(matches!(err, Err(ScrapeError::Parse(_))));
    }

    #[test]
    fn test_wrong_table_is_parse_error() {
        let html = "<table><tr><th>Date</th></tr><tr><td>today</td></tr></table>";
        assert!(matches!(
            parse_first_table(html, PositionCode::RB),
            Err(ScrapeError::Parse(_))
        ));
    }

    #[test]
    fn test_thead_td_row_is_header_only() {
        let html = r#"<table>
<thead><tr><td>Rank</td><td>Player</td><td>G</td></tr></thead>
<tbody><tr><td>1</td><td>Ray Back</td><td>17</td></tr></tbody>
</table>"#;
        let t = parse_first_table(html, PositionCode::RB).unwrap();
        assert_eq!(t.headers[1], Header::single("Player"));
        assert_eq!(t.rows, vec![vec!["1", "Ray Back", "17"]]);
    }

    #[test]
    fn test_nested_table_rows_ignored() {
        let html = r#"<table>
<thead><tr><th>Player</th><th>G</th></tr></thead>
<tbody>
<tr><td>Wes Receiver<table><tr><th>Team</th></tr><tr><td>KC</td></tr></table></td><td>16</td></tr>
</tbody>
</table>"#;
        let t = parse_first_table(html, PositionCode::WR).unwrap();
        assert_eq!(t.headers.len(), 2);
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].len(), 2);
        assert_eq!(t.rows[0][1], "16");
    }

    #[test]
    fn test_header_only_table() {
        let html = "<table><thead><tr><th>Player</th><th>G</th></tr></thead><tbody></tbody></table>";
        let t = parse_first_table(html, PositionCode::TE).unwrap();
        assert!(t.rows.is_empty());
        assert_eq!(t.headers.len(), 2);
    }

    #[test]
    fn test_stats_url() {
        let base = Url::parse("https://www.fantasypros.com").unwrap();
        assert_eq!(
            stats_url(&base, PositionCode::DST).unwrap().as_str(),
            "https://www.fantasypros.com/nfl/stats/dst.php"
        );
    }

    #[tokio::test]
    async fn test_fetch_position_table_tags_position() {
        let base = test_server::serve(vec![("/nfl/stats/qb.php", 200, QB_PAGE.to_string())]).await;
        let client = build_client(&ScrapeConfig::default()).unwrap();

        let t = fetch_position_table(&client, &base, PositionCode::QB)
            .await
            .unwrap();
        assert_eq!(t.headers.last(), Some(&Header::single(POSITION_COLUMN)));
        assert!(t.rows.iter().all(|r| r.last().map(String::as_str) == Some("QB")));

        let err = fetch_position_table(&client, &base, PositionCode::WR)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Fetch { .. }));
    }
}

/// HTML Report Rendering
///
/// Pages are assembled with `format!` around a shared head and footer. Every
/// value that comes from the user or from upstream JSON goes through
/// `html_escape`.

pub mod chart;

use crate::analysis::WalletReport;
use crate::chains::IbcDenoms;
use crate::denom::format_micro_amount;
use crate::error::LcdError;
use crate::missions::evaluate_missions;
use crate::series::CumulativeSeries;

pub const PAGE_TITLE: &str = "Terra Observatory";
pub const NO_DATA_MESSAGE: &str = "Unable to get data";
pub const NO_CHART_MESSAGE: &str =
    "Unable to get data, does the wallet have enough transactions or delegations ?";

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `base_url` with exactly one trailing slash.
fn base_prefix(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

fn render_head(base: &str) -> String {
    format!(
        r##"<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="initial-scale=0.45, user-scalable=yes">
    <link rel="icon" type="image/svg+xml" href="{base}asset/favicon.svg">
    <title>{title}</title>
    <meta name="application-name" content="{title}">
    <meta name="theme-color" content="#ffffff">
    <link href="{base}asset/main.css" rel="stylesheet" media="all">
</head>"##,
        base = html_escape(base),
        title = PAGE_TITLE,
    )
}

fn render_end() -> &'static str {
    r##"<script>
    const button = document.querySelector("#btn-submit");
    const form = document.querySelector("#form");
    if (form) {
        form.addEventListener("submit", () => {
            button.disabled = true;
            button.textContent = " Checking the stars ";
            button.classList.add("btn-submit-loading");
        });
    }
</script>"##
}

/// Wrap `content` in the page skeleton; report pages are `compact` (less
/// top padding above the card).
fn render_page(base_url: &str, compact: bool, content: &str) -> String {
    let base = base_prefix(base_url);
    let padding_top = if compact { 35 } else { 165 };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
{head}
<body>
<div class="page-wrapper bg-img-1 p-t-{padding_top} p-b-100">
<div class="wrapper wrapper--w680"><center><a href="{base}"><img src="{base}asset/logo.svg" alt="Terra Observatory" style="width: 70%;" /></a></center></div>
{content}
</div>
</body>
{end}
</html>"##,
        head = render_head(&base),
        padding_top = padding_top,
        base = html_escape(&base),
        content = content,
        end = render_end(),
    )
}

pub fn render_home_page(base_url: &str) -> String {
    let content = r##"<div class="wrapper wrapper--w680">
<div class="card card-1">
<div class="card-body">
<ul class="tab-list">
<li class="tab-list__item active"><a class="tab-list__link" href="#rewards" data-toggle="tab">Game Of Alliances Rewards</a></li>
</ul>
<div class="tab-content">
<div class="tab-pane active" id="rewards">
<p>Track your summed Terra staking rewards</p>
<br/>
<form id="form" method="POST" action="#">
<div class="input-group">
<label class="label">Wallet Address</label>
<input class="input--style-1" type="text" name="wallet" placeholder="terra1..." required="required">
</div>
<button class="btn-submit" id="btn-submit" type="submit">Launch observation &#127756;</button>
</form>
</div>
</div>
</div>
</div>
</div>"##;

    render_page(base_url, false, content)
}

pub fn render_report_page(
    base_url: &str,
    wallet: &str,
    result: &Result<WalletReport, LcdError>,
    ibc: &IbcDenoms,
) -> String {
    let body = match result {
        Ok(report) => render_report_body(report, ibc),
        Err(_) => format!("<center><h4>{}</h4></center>", NO_DATA_MESSAGE),
    };

    let content = format!(
        r##"<div class="wrapper wrapper--w880">
<div class="card card-1">
<div class="card-body">
<ul class="tab-list">
<li class="tab-list__item active"><a class="tab-list__link" href="#graphs" data-toggle="tab">Results for: {wallet}</a></li>
</ul>
<div class="tab-content">
<div class="tab-pane active" id="graphs">
{body}
</div>
</div>
</div>
</div>
</div>"##,
        wallet = html_escape(wallet),
        body = body,
    );

    render_page(base_url, true, &content)
}

fn render_report_body(report: &WalletReport, ibc: &IbcDenoms) -> String {
    let mut html = String::new();

    html.push_str("<center><h3>Here is what we found in the Terra Game Of Alliances for you ! &#127776;</h3></center>");
    html.push_str(&format!("<br/> {} chains analysed.", report.chains_analysed()));

    let disqualified = report.disqualification.is_disqualified();
    html.push_str(&format!(
        "<br/> Disqualification Status: {}",
        if disqualified { "True" } else { "False" }
    ));
    for reason in report.disqualification.reasons() {
        html.push_str(&format!("<br/> {}", html_escape(reason)));
    }

    html.push_str("<br/><br/> <b>Missions Status:</b>");
    for mission in evaluate_missions(&report.stats) {
        html.push_str(&format!(
            "<br/> {} - {}  --&gt; {}",
            mission.tier, mission.description, mission.status
        ));
    }

    html.push_str("<br/><br/><h4><b>Balances:</b></h4>");
    for (denom, amount) in report.summed_balances(ibc) {
        html.push_str(&format!(
            "<br/>{} : {}",
            html_escape(&denom),
            format_micro_amount(amount)
        ));
    }

    html.push_str("<br/><br/><h4><b>Total Rewards:</b></h4>");
    html.push_str(&chart_or_message(&report.total));

    html.push_str("<br/><hr><br/><h4><b>Rewards per chain:</b></h4>");
    for chain in &report.found_chains {
        html.push_str(&format!(
            "<h4>Chain: {} - Address: {}</h4>",
            html_escape(&chain.chain),
            html_escape(&chain.address)
        ));
        html.push_str(&chart_or_message(&chain.series));
        html.push_str("<br/><hr><br/>");
    }

    html
}

fn chart_or_message(series: &CumulativeSeries) -> String {
    chart::render_chart_grid(series)
        .unwrap_or_else(|| format!("<h4>{}</h4>", NO_CHART_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{ClaimBuckets, DelegationStats};
    use crate::analysis::{ActivityStats, ChainReport};
    use crate::chains::default_ibc_denoms;
    use crate::discovery::{foreign_chain_reason, Disqualification, REASON_FOREIGN_HOME_TRANSFER};
    use chrono::{DateTime, Utc};
    use std::collections::BTreeMap;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn sample_report() -> WalletReport {
        let mut claims = ClaimBuckets::new();
        claims.add(ts("2023-03-01T00:00:00Z"), "har", 1.25);
        claims.add(ts("2023-03-02T00:00:00Z"), "luna", 0.5);

        let mut disqualification = Disqualification::default();
        disqualification.flag(REASON_FOREIGN_HOME_TRANSFER);
        disqualification.flag(foreign_chain_reason("harkonnen"));

        WalletReport {
            wallet: "terra1abc".to_string(),
            secondary_addresses: vec!["harkonnen1abc".to_string()],
            disqualification,
            stats: ActivityStats {
                total_delegations: 2,
                ..Default::default()
            },
            balances: BTreeMap::from([(
                "terra1abc".to_string(),
                BTreeMap::from([("uluna".to_string(), 2_500_000u128)]),
            )]),
            found_chains: vec![
                ChainReport {
                    chain: "harkonnen".to_string(),
                    address: "harkonnen1abc".to_string(),
                    delegations: DelegationStats::default(),
                    series: CumulativeSeries::from_buckets(&claims),
                    claims: claims.clone(),
                },
                ChainReport {
                    chain: "ordos".to_string(),
                    address: "ordos1abc".to_string(),
                    delegations: DelegationStats::default(),
                    claims: ClaimBuckets::new(),
                    series: CumulativeSeries::default(),
                },
            ],
            total: CumulativeSeries::merge_chains([&claims]),
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_home_page_has_wallet_form() {
        let html = render_home_page("/observatory");
        assert!(html.contains(r#"name="wallet""#));
        assert!(html.contains(r#"href="/observatory/asset/main.css""#));
        assert!(html.contains("<title>Terra Observatory</title>"));
    }

    #[test]
    fn test_report_page() {
        let ibc = IbcDenoms::new(default_ibc_denoms());
        let html = render_report_page("/", "terra1abc", &Ok(sample_report()), &ibc);

        assert!(html.contains("Results for: terra1abc"));
        assert!(html.contains("3 chains analysed."));
        assert!(html.contains("Disqualification Status: True"));
        assert!(html.contains("Received IBC transfer from another Terra wallet"));
        assert!(html.contains("original Terra address on harkonnen"));
        assert!(html.contains("1 - Delegate to any validator using the Alliance module  --&gt; OK"));
        assert!(html.contains("luna : 2.500000"));
        assert!(html.contains("Chain: harkonnen - Address: harkonnen1abc"));
        assert!(html.contains("har (summed)"));
        // ordos has no claims
        assert_eq!(html.matches(NO_CHART_MESSAGE).count(), 1);
    }

    #[test]
    fn test_report_page_without_data() {
        let err = LcdError::MissingField {
            url: "http://lcd/".to_string(),
            field: "pagination",
        };
        let html = render_report_page("/", "<b>terra</b>", &Err(err), &IbcDenoms::default());

        assert!(html.contains("Unable to get data"));
        assert!(html.contains("Results for: &lt;b&gt;terra&lt;/b&gt;"));
        assert!(!html.contains("<b>terra</b>"));
    }

    #[test]
    fn test_linked_assets_are_shipped() {
        let asset_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("frontend/asset");
        let html = render_home_page("/");

        let linked: Vec<&str> = html
            .split("\"/asset/")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect();

        assert!(linked.contains(&"main.css"));
        assert!(linked.contains(&"logo.svg"));
        for file in linked {
            assert!(asset_dir.join(file).is_file(), "missing asset {}", file);
        }
    }
}

//! Drift report rendering
//!
//! Self-contained HTML artifact: headline share plus a per-feature table
//! with every detector's statistic.

use super::DriftSummary;

pub fn render_drift_report(summary: &DriftSummary) -> String {
    let mut rows = String::new();
    for feature in &summary.features {
        let badge = if feature.drifted {
            r#"<span class="badge drift">drift</span>"#
        } else {
            r#"<span class="badge ok">ok</span>"#
        };
        let score = |method: &str| {
            feature
                .scores
                .get(method)
                .map(|s| format!("{:.4}", s))
                .unwrap_or_else(|| "-".to_string())
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            feature.name,
            badge,
            score("ks"),
            score("psi"),
            score("js"),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Data Drift Report</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 2rem; background: #fafafa; color: #222; }}
h1 {{ font-size: 1.4rem; }}
.headline {{ font-size: 2.2rem; font-weight: 700; margin: 0.5rem 0; }}
.meta {{ color: #666; margin-bottom: 1.5rem; }}
table {{ border-collapse: collapse; width: 100%; background: #fff; }}
th, td {{ border: 1px solid #ddd; padding: 6px 10px; text-align: right; font-size: 0.9rem; }}
th {{ background: #f0f0f0; }}
td:first-child, th:first-child {{ text-align: left; }}
.badge {{ padding: 2px 8px; border-radius: 8px; font-size: 0.8rem; }}
.badge.drift {{ background: #fdd; color: #a00; }}
.badge.ok {{ background: #dfd; color: #060; }}
</style>
</head>
<body>
<h1>Data Drift Report</h1>
<div class="headline">{:.1}% of features drifted</div>
<p class="meta">{} of {} features &mdash; reference {} rows, current {} rows &mdash; computed {}</p>
<table>
<tr><th>feature</th><th>status</th><th>KS statistic</th><th>PSI</th><th>JS divergence</th></tr>
{}</table>
</body>
</html>
"#,
        summary.share * 100.0,
        summary.n_drifted,
        summary.n_features,
        summary.reference_rows,
        summary.current_rows,
        summary.computed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        rows
    )
}

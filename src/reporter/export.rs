use chrono::Utc;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera};

use crate::error::{AssessmentError, Result};
use crate::models::AssessmentReport;

pub struct JsonExporter;

impl JsonExporter {
    pub fn export(report: &AssessmentReport, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| AssessmentError::persistence(path.display().to_string(), e))?;
        fs::write(path, json)
            .map_err(|e| AssessmentError::persistence(path.display().to_string(), e))?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<AssessmentReport> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

pub struct HtmlExporter;

impl HtmlExporter {
    pub fn export(report: &AssessmentReport, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let html = Self::render(report)
            .map_err(|e| AssessmentError::persistence(path.display().to_string(), e))?;
        fs::write(path, html)
            .map_err(|e| AssessmentError::persistence(path.display().to_string(), e))?;
        Ok(())
    }

    pub fn render(report: &AssessmentReport) -> std::result::Result<String, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template("report.html", TEMPLATE)?;

        let mut context = TeraContext::new();
        context.insert(
            "generated",
            &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        context.insert("summary", &report.summary);

        let phases: Vec<HtmlPhase> = report
            .results
            .iter()
            .map(|r| HtmlPhase {
                name: r.phase.to_string(),
                timestamp: r.timestamp.to_rfc3339(),
                tools: r
                    .tools_used
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
                error: r.error.clone(),
                findings: r
                    .findings
                    .iter()
                    .map(|f| HtmlFinding {
                        tool: f.tool.to_string(),
                        key: f
                            .vulnerability
                            .clone()
                            .or_else(|| f.exploit.clone())
                            .or_else(|| match (&f.service, &f.version) {
                                (Some(s), Some(v)) => Some(format!("{} {}", s, v)),
                                _ => None,
                            })
                            .unwrap_or_default(),
                        result: serde_json::to_string_pretty(&f.result).unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();
        context.insert("phases", &phases);

        tera.render("report.html", &context)
    }
}

#[derive(serde::Serialize)]
struct HtmlPhase {
    name: String,
    timestamp: String,
    tools: String,
    error: Option<String>,
    findings: Vec<HtmlFinding>,
}

#[derive(serde::Serialize)]
struct HtmlFinding {
    tool: String,
    key: String,
    result: String,
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Security Assessment Report</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #0d1117; color: #c9d1d9; line-height: 1.6; }
        .container { max-width: 1200px; margin: 0 auto; padding: 2rem; }
        h1 { color: #58a6ff; margin-bottom: 0.5rem; }
        h2 { color: #c9d1d9; margin: 2rem 0 0.5rem; }
        .subtitle { color: #8b949e; margin-bottom: 2rem; }
        .summary { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 1rem; margin-bottom: 2rem; }
        .stat { background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 1rem; text-align: center; }
        .stat-value { font-size: 2rem; font-weight: bold; }
        .stat-label { color: #8b949e; font-size: 0.875rem; }
        .high .stat-value { color: #f85149; }
        .medium .stat-value { color: #d29922; }
        .phase { background: #161b22; border: 1px solid #30363d; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }
        .meta { color: #8b949e; font-size: 0.875rem; }
        .error { color: #f85149; margin-top: 0.5rem; }
        .finding { margin-top: 0.75rem; }
        .tool { color: #f0883e; font-weight: 500; }
        pre { background: #0d1117; border: 1px solid #30363d; border-radius: 4px; padding: 0.5rem; overflow-x: auto; font-size: 0.8rem; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Security Assessment Report</h1>
        <p class="subtitle">Generated: {{ generated }}{% if summary %} | Target: {{ summary.target }}{% endif %}</p>

        {% if summary %}
        <div class="summary">
            <div class="stat">
                <div class="stat-value">{{ summary.phases_completed | length }}</div>
                <div class="stat-label">Phases</div>
            </div>
            <div class="stat medium">
                <div class="stat-value">{{ summary.vulnerabilities_found }}</div>
                <div class="stat-label">Vulnerabilities</div>
            </div>
            <div class="stat high">
                <div class="stat-value">{{ summary.high_risk_vulnerabilities }}</div>
                <div class="stat-label">High Risk</div>
            </div>
            <div class="stat high">
                <div class="stat-value">{{ summary.exploits_available }}</div>
                <div class="stat-label">Exploits</div>
            </div>
        </div>
        {% endif %}

        {% for phase in phases %}
        <div class="phase">
            <h2>{{ phase.name }}</h2>
            <div class="meta">{{ phase.timestamp }} | tools: {% if phase.tools %}{{ phase.tools }}{% else %}none{% endif %}</div>
            {% if phase.error %}<div class="error">Error: {{ phase.error }}</div>{% endif %}
            {% for finding in phase.findings %}
            <div class="finding">
                <span class="tool">{{ finding.tool }}</span> {{ finding.key }}
                <pre>{{ finding.result }}</pre>
            </div>
            {% endfor %}
        </div>
        {% endfor %}
    </div>
</body>
</html>"#;

//! HTML report generation.
//!
//! This module renders a subject record into a self-contained HTML (or
//! JSON) document and writes it under the configured output directory.

use crate::cli::OutputFormat;
use crate::config::{Config, ReportConfig};
use crate::graph::{self, RelationGraph};
use crate::models::{ConfidenceBand, EmailEntry, ImageEntry, ProfileEntry, SubjectRecord};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Fixed legal notice printed at the bottom of every report.
pub const LEGAL_NOTICE: &str = "This report was generated for informational purposes within the \
applicable legal framework. Any use of this information must comply with data protection laws \
(GDPR, CCPA, etc.) and must not infringe on the privacy of the people concerned.";

/// Errors raised while rendering or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A rendered report and, when it was saved, where.
#[derive(Debug, Clone)]
pub struct ReportOutput {
    pub content: String,
    /// `None` when rendering or writing failed, or nothing was written.
    pub path: Option<PathBuf>,
}

impl ReportOutput {
    pub fn is_written(&self) -> bool {
        self.path.is_some()
    }
}

/// Generate a complete HTML report.
///
/// `graph_image` is an image URI embedded as-is. The output depends only on
/// the arguments, never on the current time.
pub fn generate_html_report(
    record: &SubjectRecord,
    graph_image: Option<&str>,
    config: &ReportConfig,
    generated_at: DateTime<Utc>,
) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n");
    html.push_str("<html lang=\"en\">\n");
    html.push_str("<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!(
        "<title>OSINT report: {}</title>\n",
        escape_html(&record.name)
    ));
    html.push_str(&generate_style(record.confidence_band()));
    html.push_str("</head>\n");
    html.push_str("<body>\n");
    html.push_str("<div class=\"container\">\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>OSINT Report</h1>\n");
    html.push_str(&format!(
        "<div class=\"confidence\">Confidence level: {}%</div>\n",
        record.metadata.confidence
    ));
    html.push_str("</header>\n");

    if let Some(ref message) = record.error {
        html.push_str("<section class=\"section error\">\n");
        html.push_str("<h2>Aggregation failed</h2>\n");
        html.push_str(&format!("<p>{}</p>\n", escape_html(message)));
        html.push_str("</section>\n");
    }

    html.push_str(&generate_subject_section(record));
    html.push_str(&generate_profiles_section(&record.social_profiles));
    html.push_str(&generate_emails_section(&record.emails));
    html.push_str(&generate_images_section(&record.images, config.gallery_limit));

    if let Some(uri) = graph_image {
        html.push_str("<section class=\"section\">\n");
        html.push_str("<h2>Relationship graph</h2>\n");
        html.push_str("<div class=\"network-graph\">\n");
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"Relationship graph\" style=\"max-width:100%;\">\n",
            escape_html(uri)
        ));
        html.push_str("</div>\n");
        html.push_str("</section>\n");
    }

    html.push_str(&format!(
        "<div class=\"timestamp\">Report generated on {}</div>\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<div class=\"legal-notice\"><p><strong>Legal notice:</strong> {}</p></div>\n",
        LEGAL_NOTICE
    ));
    html.push_str("<footer><p>Generated by osint-aggregator</p></footer>\n");
    html.push_str("</div>\n");
    html.push_str("</body>\n");
    html.push_str("</html>\n");

    html
}

/// Generate the inline stylesheet; the header badge follows the band.
fn generate_style(band: ConfidenceBand) -> String {
    let mut style = String::new();

    style.push_str("<style>\n");
    style.push_str("body { font-family: Arial, sans-serif; line-height: 1.6; margin: 0; padding: 20px; color: #333; }\n");
    style.push_str(".container { max-width: 1200px; margin: 0 auto; }\n");
    style.push_str("header { background-color: #2c3e50; color: white; padding: 20px; margin-bottom: 20px; border-radius: 5px; }\n");
    style.push_str("h1, h2, h3 { margin-top: 0; }\n");
    style.push_str(&format!(
        ".confidence {{ float: right; background-color: {}; color: white; padding: 5px 10px; border-radius: 3px; }}\n",
        band.color()
    ));
    style.push_str(".section { background-color: #f9f9f9; padding: 15px; margin-bottom: 20px; border-radius: 5px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }\n");
    style.push_str(".error { border-left: 4px solid #F44336; }\n");
    style.push_str(".profile { margin-bottom: 10px; padding-bottom: 10px; border-bottom: 1px solid #ddd; }\n");
    style.push_str(".profile:last-child { border-bottom: none; }\n");
    style.push_str(".email { margin-bottom: 5px; }\n");
    style.push_str(".badge { float: right; color: white; padding: 2px 5px; border-radius: 3px; font-size: 0.8em; }\n");
    style.push_str(".gallery { display: flex; flex-wrap: wrap; gap: 10px; }\n");
    style.push_str(".gallery-item { width: 150px; margin-bottom: 10px; }\n");
    style.push_str(".gallery-item img { max-width: 100%; max-height: 150px; object-fit: contain; }\n");
    style.push_str(".network-graph { text-align: center; margin-top: 20px; }\n");
    style.push_str(".timestamp { text-align: right; font-style: italic; color: #888; font-size: 0.8em; margin-top: 30px; }\n");
    style.push_str(".legal-notice { background-color: #f8f8f8; border-left: 4px solid #ccc; padding: 10px; font-size: 0.9em; margin-top: 20px; }\n");
    style.push_str("footer { margin-top: 30px; text-align: center; font-size: 0.8em; color: #888; }\n");
    style.push_str("</style>\n");

    style
}

/// Generate the subject information section.
fn generate_subject_section(record: &SubjectRecord) -> String {
    let mut section = String::new();

    section.push_str("<section class=\"section\">\n");
    section.push_str("<h2>Subject information</h2>\n");
    section.push_str(&format!(
        "<p><strong>Name:</strong> {}</p>\n",
        escape_html(&record.name)
    ));

    let fields: [(&str, &BTreeSet<String>); 4] = [
        ("Possible aliases", &record.possible_aliases),
        ("Possible usernames", &record.possible_usernames),
        ("Locations", &record.locations),
        ("Organizations", &record.organizations),
    ];

    for (label, values) in fields {
        if values.is_empty() {
            continue;
        }
        let joined: Vec<String> = values.iter().map(|v| escape_html(v)).collect();
        section.push_str(&format!(
            "<p><strong>{}:</strong> {}</p>\n",
            label,
            joined.join(", ")
        ));
    }

    section.push_str("</section>\n");
    section
}

/// Generate the per-platform profile listing.
fn generate_profiles_section(profiles: &BTreeMap<String, Vec<ProfileEntry>>) -> String {
    let mut section = String::new();

    section.push_str("<section class=\"section\">\n");
    section.push_str("<h2>Social media profiles</h2>\n");

    if profiles.is_empty() {
        section.push_str("<p>No social profile found.</p>\n");
    }

    for (platform, entries) in profiles {
        section.push_str(&format!("<h3>{}</h3>\n", escape_html(&capitalize(platform))));

        if entries.is_empty() {
            section.push_str("<p>No profile found.</p>\n");
            continue;
        }

        for profile in entries {
            section.push_str(&generate_profile_block(profile));
        }
    }

    section.push_str("</section>\n");
    section
}

/// Generate a single profile block.
fn generate_profile_block(profile: &ProfileEntry) -> String {
    let mut block = String::new();

    block.push_str("<div class=\"profile\">\n");
    block.push_str(&format!(
        "<p><strong>{}</strong></p>\n",
        escape_html(or_na(&profile.name))
    ));
    if profile.url.is_empty() {
        block.push_str("<p>N/A</p>\n");
    } else {
        let url = escape_html(&profile.url);
        block.push_str(&format!(
            "<p><a href=\"{}\" target=\"_blank\">{}</a></p>\n",
            url, url
        ));
    }
    if let Some(ref description) = profile.description {
        block.push_str(&format!("<p>{}</p>\n", escape_html(description)));
    }
    block.push_str("</div>\n");

    block
}

/// Generate the email listing with a confidence badge per address.
fn generate_emails_section(emails: &[EmailEntry]) -> String {
    let mut section = String::new();

    section.push_str("<section class=\"section\">\n");
    section.push_str("<h2>Email addresses</h2>\n");

    if emails.is_empty() {
        section.push_str("<p>No email address found.</p>\n");
    }

    for email in emails {
        let band = ConfidenceBand::for_email(email.confidence);
        section.push_str("<div class=\"email\">\n");
        section.push_str(&format!(
            "<p><strong>{}</strong> <span class=\"badge\" style=\"background-color:{};\">{}%</span></p>\n",
            escape_html(or_na(&email.address)),
            band.color(),
            email.confidence
        ));
        section.push_str(&format!(
            "<p><small>Source: {}</small></p>\n",
            escape_html(or_na(&email.source))
        ));
        section.push_str("</div>\n");
    }

    section.push_str("</section>\n");
    section
}

/// Generate the image gallery, showing at most `limit` images.
fn generate_images_section(images: &[ImageEntry], limit: usize) -> String {
    let mut section = String::new();

    section.push_str("<section class=\"section\">\n");
    section.push_str("<h2>Related images</h2>\n");

    if images.is_empty() {
        section.push_str("<p>No image found.</p>\n");
        section.push_str("</section>\n");
        return section;
    }

    section.push_str("<div class=\"gallery\">\n");
    for image in images.iter().take(limit) {
        let url = escape_html(&image.url);
        section.push_str("<div class=\"gallery-item\">\n");
        section.push_str(&format!(
            "<a href=\"{}\" target=\"_blank\"><img src=\"{}\" alt=\"Image\"></a>\n",
            url, url
        ));
        section.push_str(&format!(
            "<p><small>Source: {}</small></p>\n",
            escape_html(or_na(&image.source))
        ));
        section.push_str("</div>\n");
    }
    section.push_str("</div>\n");

    if images.len() > limit {
        section.push_str(&format!(
            "<p><em>+ {} more images not shown</em></p>\n",
            images.len() - limit
        ));
    }

    section.push_str("</section>\n");
    section
}

/// Minimal document returned when a report cannot be produced.
pub fn generate_error_document(message: &str) -> String {
    format!(
        "<html><body><h1>Error</h1><p>{}</p></body></html>",
        escape_html(message)
    )
}

/// Generate a JSON report.
pub fn generate_json_report(record: &SubjectRecord) -> Result<String, ReportError> {
    serde_json::to_string_pretty(record).map_err(Into::into)
}

/// Replace every non-alphanumeric character with `_`.
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// File name of a report: `<safe name>_<YYYYmmdd_HHMMSS>.<ext>`.
pub fn report_file_name(name: &str, at: DateTime<Utc>, format: OutputFormat) -> String {
    format!(
        "{}_{}.{}",
        safe_file_stem(name),
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Render a record in the configured format, graph included when enabled.
pub fn render_report(
    record: &SubjectRecord,
    config: &ReportConfig,
    generated_at: DateTime<Utc>,
) -> Result<String, ReportError> {
    match config.format {
        OutputFormat::Json => generate_json_report(record),
        OutputFormat::Html => {
            let graph_image = if config.include_graph && !record.is_failed() {
                let graph = RelationGraph::from_record(record);
                debug!(
                    "Relationship graph for '{}': {} nodes, {} edges",
                    record.name,
                    graph.node_count(),
                    graph.edge_count()
                );
                let title = format!("Relationship graph for {}", record.name);
                Some(graph::svg_data_uri(&graph::render_svg(&graph, &title)))
            } else {
                None
            };
            Ok(generate_html_report(
                record,
                graph_image.as_deref(),
                config,
                generated_at,
            ))
        }
    }
}

/// Render a record and write it under the configured output directory.
///
/// Never fails: a rendering or write error yields the error document and no
/// path.
pub fn write_report(
    record: &SubjectRecord,
    config: &Config,
    generated_at: DateTime<Utc>,
) -> ReportOutput {
    let path = config.general.output_dir.join(report_file_name(
        &record.name,
        generated_at,
        config.report.format,
    ));

    let result = render_report(record, &config.report, generated_at)
        .and_then(|content| save(&path, &content).map(|_| content));

    match result {
        Ok(content) => {
            info!("Report generated: {}", path.display());
            ReportOutput {
                content,
                path: Some(path),
            }
        }
        Err(e) => {
            error!("Report generation failed for '{}': {}", record.name, e);
            ReportOutput {
                content: generate_error_document(&e.to_string()),
                path: None,
            }
        }
    }
}

fn save(path: &Path, content: &str) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, content).map_err(io_err)
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn or_na(text: &str) -> &str {
    if text.is_empty() {
        "N/A"
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use chrono::TimeZone;

    fn frozen_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    fn create_test_record() -> SubjectRecord {
        let mut record = SubjectRecord::new("John Doe", frozen_clock());
        record.social_profiles.insert(
            "twitter".to_string(),
            vec![ProfileEntry {
                platform: "twitter".to_string(),
                name: "John <script>".to_string(),
                url: "https://twitter.com/johndoe".to_string(),
                description: Some("Engineer in Paris".to_string()),
            }],
        );
        record.social_profiles.insert("github".to_string(), Vec::new());
        record.emails.push(EmailEntry {
            address: "john@acme.com".to_string(),
            confidence: 95,
            source: "hunter.io".to_string(),
        });
        record.possible_usernames.insert("johndoe".to_string());
        record.locations.insert("Paris".to_string());
        record.add_source(Source::SocialMedia);
        record.metadata.confidence = 42;
        record
    }

    fn images(count: usize) -> Vec<ImageEntry> {
        (0..count)
            .map(|i| ImageEntry {
                url: format!("https://img.example/{}.jpg", i),
                source: "google".to_string(),
                page_url: None,
            })
            .collect()
    }

    #[test]
    fn test_generate_html_report() {
        let record = create_test_record();
        let html = generate_html_report(&record, None, &ReportConfig::default(), frozen_clock());

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Confidence level: 42%"));
        assert!(html.contains("<h3>Twitter</h3>"));
        assert!(html.contains("<h3>Github</h3>"));
        assert!(html.contains("No profile found."));
        assert!(html.contains("John &lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Engineer in Paris"));
        assert!(html.contains("john@acme.com"));
        assert!(html.contains("Report generated on 2024-05-17 09:30:00 UTC"));
        assert!(html.contains(LEGAL_NOTICE));
        assert!(!html.contains("Relationship graph"));
    }

    #[test]
    fn test_optional_fields_only_when_present() {
        let record = create_test_record();
        let section = generate_subject_section(&record);

        assert!(section.contains("Possible usernames:</strong> johndoe"));
        assert!(section.contains("Locations:</strong> Paris"));
        assert!(!section.contains("Possible aliases"));
        assert!(!section.contains("Organizations"));
    }

    #[test]
    fn test_header_badge_color_follows_band() {
        let mut record = create_test_record();
        record.metadata.confidence = 85;
        let html = generate_html_report(&record, None, &ReportConfig::default(), frozen_clock());
        assert!(html.contains(".confidence { float: right; background-color: #4CAF50;"));
    }

    #[test]
    fn test_email_badges() {
        let emails = vec![
            EmailEntry {
                address: "a@x.io".to_string(),
                confidence: 95,
                source: "hunter.io".to_string(),
            },
            EmailEntry {
                address: "b@x.io".to_string(),
                confidence: 60,
                source: "hunter.io".to_string(),
            },
            EmailEntry {
                address: "c@x.io".to_string(),
                confidence: 10,
                source: "hunter.io".to_string(),
            },
        ];
        let section = generate_emails_section(&emails);

        assert!(section.contains("background-color:#4CAF50;\">95%"));
        assert!(section.contains("background-color:#FF9800;\">60%"));
        assert!(section.contains("background-color:#F44336;\">10%"));
    }

    #[test]
    fn test_gallery_caps_at_twelve() {
        let section = generate_images_section(&images(15), 12);

        assert_eq!(section.matches("<img ").count(), 12);
        assert!(section.contains("+ 3 more images not shown"));
    }

    #[test]
    fn test_gallery_without_overflow() {
        let section = generate_images_section(&images(12), 12);
        assert_eq!(section.matches("<img ").count(), 12);
        assert!(!section.contains("more images not shown"));

        let empty = generate_images_section(&[], 12);
        assert!(empty.contains("No image found."));
    }

    #[test]
    fn test_graph_embedded_when_given() {
        let record = create_test_record();
        let html = generate_html_report(
            &record,
            Some("data:image/svg+xml;base64,AAAA"),
            &ReportConfig::default(),
            frozen_clock(),
        );
        assert!(html.contains("<h2>Relationship graph</h2>"));
        assert!(html.contains("src=\"data:image/svg+xml;base64,AAAA\""));
    }

    #[test]
    fn test_render_is_byte_identical_with_frozen_clock() {
        let record = create_test_record();
        let config = ReportConfig::default();
        let first = render_report(&record, &config, frozen_clock()).unwrap();
        let second = render_report(&record, &config, frozen_clock()).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_failed_record_report() {
        let record = SubjectRecord::failed("Jane", frozen_clock(), "boom".to_string());
        let html = render_report(&record, &ReportConfig::default(), frozen_clock()).unwrap();
        assert!(html.contains("Aggregation failed"));
        assert!(html.contains("boom"));
        assert!(html.contains("Confidence level: 0%"));
        assert!(!html.contains("Relationship graph"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_record()).unwrap();
        assert!(json.contains("\"social_profiles\""));
        assert!(json.contains("\"confidence\": 42"));
        assert!(json.contains("\"social_media\""));
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(safe_file_stem("Jean-Luc O'Neil"), "Jean_Luc_O_Neil");
        assert_eq!(safe_file_stem("Zoë"), "Zoë");
        assert_eq!(
            report_file_name("John Doe", frozen_clock(), OutputFormat::Html),
            "John_Doe_20240517_093000.html"
        );
        assert_eq!(
            report_file_name("John Doe", frozen_clock(), OutputFormat::Json),
            "John_Doe_20240517_093000.json"
        );
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.general.output_dir = dir.path().join("nested");

        let record = create_test_record();
        let output = write_report(&record, &config, frozen_clock());

        let path = output.path.expect("report should be written");
        assert_eq!(path.file_name().unwrap(), "John_Doe_20240517_093000.html");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), output.content);
    }

    #[test]
    fn test_write_failure_returns_error_document() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = Config::default();
        config.general.output_dir = blocker.join("reports");

        let output = write_report(&create_test_record(), &config, frozen_clock());
        assert!(!output.is_written());
        assert!(output.content.starts_with("<html><body><h1>Error</h1>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }
}

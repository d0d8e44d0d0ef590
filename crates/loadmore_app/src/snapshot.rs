use std::path::{Path, PathBuf};

use chrono::Utc;
use html_escape::{encode_double_quoted_attribute, encode_text};
use loadmore_core::{InstanceView, LoaderViewModel};
use loadmore_engine::SnapshotWriter;
use loadmore_logging::loadmore_info;

/// Writes `instance-<id>.html` for every instance in the view.
pub fn write_snapshots(dir: &Path, view: &LoaderViewModel) -> anyhow::Result<Vec<PathBuf>> {
    let writer = SnapshotWriter::new(dir);
    let captured_at = Utc::now().to_rfc3339();
    let mut written = Vec::with_capacity(view.instances.len());
    for instance in &view.instances {
        let path = writer.write(instance.instance, &render_instance(instance, &captured_at))?;
        loadmore_info!("wrote snapshot {:?}", path);
        written.push(path);
    }
    Ok(written)
}

/// Renders the container as it would look in the page right now.
pub fn render_instance(view: &InstanceView, captured_at: &str) -> String {
    let mut html = format!(
        "<!-- instance {} captured {} -->\n<div class=\"{}\">\n",
        view.instance,
        captured_at,
        encode_double_quoted_attribute(&view.classes.join(" "))
    );
    html.push_str("<div class=\"newspack-listings__list-container\">");
    html.push_str(&view.results_html);
    html.push_str("</div>\n");
    if let Some(control) = &view.control {
        html.push_str(&format!(
            "<button type=\"button\" data-next=\"{}\">{}</button>\n",
            encode_double_quoted_attribute(&control.data_next),
            encode_text(&control.label)
        ));
    }
    html.push_str("</div>\n");
    html
}

pub fn summary_line(view: &InstanceView) -> String {
    let next = view
        .control
        .as_ref()
        .map(|control| control.data_next.as_str())
        .unwrap_or("-");
    format!(
        "[#{}] {:?}: {} page(s), {} fragment(s), next {}",
        view.instance, view.phase, view.pages_loaded, view.fragments_appended, next
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use loadmore_core::{ControlView, InstancePhase, InstanceView, LoaderViewModel};

    use super::{render_instance, summary_line, write_snapshots};

    fn view(control: Option<ControlView>) -> InstanceView {
        InstanceView {
            instance: 2,
            phase: InstancePhase::Idle,
            classes: vec!["curated-list".to_string(), "has-more-button".to_string()],
            control,
            results_html: "<li>A</li>".to_string(),
            pages_loaded: 1,
            fragments_appended: 1,
            last_outcome: None,
        }
    }

    #[test]
    fn renders_control_with_escaped_cursor() {
        let html = render_instance(
            &view(Some(ControlView {
                data_next: "/p2?a=1&b=\"x\"".to_string(),
                label: "More <listings>".to_string(),
            })),
            "now",
        );

        assert_eq!(
            html,
            "<!-- instance 2 captured now -->\n\
             <div class=\"curated-list has-more-button\">\n\
             <div class=\"newspack-listings__list-container\"><li>A</li></div>\n\
             <button type=\"button\" data-next=\"/p2?a=1&amp;b=&quot;x&quot;\">\
             More &lt;listings&gt;</button>\n\
             </div>\n"
        );
    }

    #[test]
    fn done_instance_has_no_control() {
        let html = render_instance(&view(None), "now");

        assert!(!html.contains("<button"));
        assert!(summary_line(&view(None)).ends_with("next -"));
    }

    #[test]
    fn snapshots_land_in_output_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("snapshots");
        let model = LoaderViewModel {
            instances: vec![view(None)],
            fetching: 0,
        };

        let written = write_snapshots(&out, &model).unwrap();

        assert_eq!(written, vec![out.join("instance-2.html")]);
        assert!(fs::read_to_string(&written[0])
            .unwrap()
            .contains("<li>A</li>"));
    }
}

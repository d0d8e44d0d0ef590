use loadmore_logging::{loadmore_debug, loadmore_warn};
use scraper::{ElementRef, Html, Selector};

/// CSS selectors that locate list instances and their parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderSettings {
    pub container_selector: String,
    pub control_selector: String,
    pub results_selector: String,
    pub loading_label_selector: String,
}

impl Default for BinderSettings {
    fn default() -> Self {
        Self {
            container_selector: ".has-more-button".to_string(),
            control_selector: "[data-next]".to_string(),
            results_selector: ".newspack-listings__list-container".to_string(),
            loading_label_selector: ".loading".to_string(),
        }
    }
}

/// A container found on the page, captured once at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredList {
    pub next_url: String,
    pub classes: Vec<String>,
    /// Trimmed control text, restored after every request chain.
    pub label: String,
    pub loading_label: Option<String>,
    pub results_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

struct Selectors {
    container: Selector,
    control: Selector,
    results: Selector,
    loading_label: Selector,
}

impl Selectors {
    fn parse(settings: &BinderSettings) -> Result<Self, BindError> {
        Ok(Self {
            container: parse_selector(&settings.container_selector)?,
            control: parse_selector(&settings.control_selector)?,
            results: parse_selector(&settings.results_selector)?,
            loading_label: parse_selector(&settings.loading_label_selector)?,
        })
    }
}

/// Discovers every eligible container in document order.
///
/// A part (control, results target, loading label) belongs to its nearest
/// enclosing container, so nested containers never share parts. Containers
/// without a control are skipped; that is the normal state of a list whose
/// pages were all rendered server-side.
pub fn bind_instances(
    html: &str,
    settings: &BinderSettings,
) -> Result<Vec<DiscoveredList>, BindError> {
    let selectors = Selectors::parse(settings)?;
    let doc = Html::parse_document(html);

    let mut lists = Vec::new();
    for container in doc.select(&selectors.container) {
        let Some(control) = owned_part(container, &selectors.control, &selectors.container) else {
            loadmore_debug!("container without a load-more control skipped");
            continue;
        };
        let Some(next_url) = control.value().attr("data-next") else {
            loadmore_debug!("control without data-next skipped");
            continue;
        };
        let Some(results) = owned_part(container, &selectors.results, &selectors.container) else {
            loadmore_warn!(
                "container with control {:?} has no results target; skipped",
                next_url
            );
            continue;
        };

        let loading_label =
            owned_part(container, &selectors.loading_label, &selectors.container)
                .map(|el| el.text().collect::<String>())
                .filter(|text| !text.is_empty());

        lists.push(DiscoveredList {
            next_url: next_url.to_string(),
            classes: container.value().classes().map(str::to_string).collect(),
            label: control.text().collect::<String>().trim().to_string(),
            loading_label,
            results_html: results.inner_html(),
        });
    }

    loadmore_debug!("bound {} list instance(s)", lists.len());
    Ok(lists)
}

fn parse_selector(selector: &str) -> Result<Selector, BindError> {
    Selector::parse(selector).map_err(|err| BindError::InvalidSelector {
        selector: selector.to_string(),
        message: err.to_string(),
    })
}

fn owned_part<'a>(
    container: ElementRef<'a>,
    part: &Selector,
    container_selector: &Selector,
) -> Option<ElementRef<'a>> {
    container
        .select(part)
        .find(|el| is_owned_by(*el, container, container_selector))
}

fn is_owned_by(
    element: ElementRef<'_>,
    container: ElementRef<'_>,
    container_selector: &Selector,
) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| container_selector.matches(ancestor))
        .is_some_and(|nearest| nearest.id() == container.id())
}

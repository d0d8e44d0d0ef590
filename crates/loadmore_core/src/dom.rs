use std::collections::BTreeSet;

/// Marks a container that still has pages to load.
pub const CLASS_HAS_MORE: &str = "has-more-button";
/// Present on the container while a request chain is outstanding.
pub const CLASS_LOADING: &str = "is-loading";
/// Present on the container after a chain ended in failure.
pub const CLASS_ERROR: &str = "is-error";

/// The "load more" control. Its `data-next` value lives on the owning
/// [`crate::ListInstance`] as `next_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadMoreControl {
    pub label: String,
}

/// Typed model of one instance's DOM subtree.
///
/// Only the owning instance's update path mutates it. Results are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDom {
    classes: BTreeSet<String>,
    control: Option<LoadMoreControl>,
    original_label: String,
    loading_label: Option<String>,
    results_html: String,
}

impl InstanceDom {
    pub fn new(
        classes: impl IntoIterator<Item = String>,
        original_label: impl Into<String>,
        loading_label: Option<String>,
        results_html: impl Into<String>,
    ) -> Self {
        let original_label = original_label.into();
        Self {
            classes: classes.into_iter().collect(),
            control: Some(LoadMoreControl {
                label: original_label.clone(),
            }),
            original_label,
            loading_label: loading_label.filter(|label| !label.is_empty()),
            results_html: results_html.into(),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn control(&self) -> Option<&LoadMoreControl> {
        self.control.as_ref()
    }

    pub fn results_html(&self) -> &str {
        &self.results_html
    }

    pub(crate) fn begin_loading(&mut self) {
        self.classes.remove(CLASS_ERROR);
        self.classes.insert(CLASS_LOADING.to_string());
        if let (Some(control), Some(loading)) = (self.control.as_mut(), self.loading_label.as_ref())
        {
            control.label = loading.clone();
        }
    }

    pub(crate) fn finish_loading(&mut self) {
        self.classes.remove(CLASS_LOADING);
        self.restore_label();
    }

    pub(crate) fn show_error(&mut self) {
        self.classes.remove(CLASS_LOADING);
        self.classes.insert(CLASS_ERROR.to_string());
        self.restore_label();
    }

    pub(crate) fn append_fragments(&mut self, fragments: &[String]) {
        for fragment in fragments {
            self.results_html.push_str(fragment);
        }
    }

    /// Drops the control and the "has more" affordance. Irreversible.
    pub(crate) fn mark_exhausted(&mut self) {
        self.control = None;
        self.classes.remove(CLASS_HAS_MORE);
    }

    fn restore_label(&mut self) {
        if let Some(control) = self.control.as_mut() {
            control.label = self.original_label.clone();
        }
    }
}

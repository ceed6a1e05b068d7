//! Style block injection.

/// Wraps rendered CSS in a `<style>` element appended after the view.
pub struct StyleInjector;

impl StyleInjector {
    pub fn inject(css: &str) -> String {
        format!("<style type='text/css'>{css}</style>")
    }

    /// The final output of a render: the view followed by its style block.
    /// A missing or blank style adds nothing.
    pub fn compose(view: String, css: Option<&str>) -> String {
        match css {
            Some(css) if !css.trim().is_empty() => {
                let mut output = view;
                output.push_str(&Self::inject(css));
                output
            }
            _ => view,
        }
    }
}

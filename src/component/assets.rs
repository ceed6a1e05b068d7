//! Asset directory lookups.
//!
//! A component's asset directory holds at most one `view.*` and one
//! `style.*` file. The file name picks the format: the extension segments
//! after `view.` / `style.`, ignoring `tera`, last one wins. `view.md.tera`
//! is Markdown with a Tera pre-pass; `view.tera` is plain Tera.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::core::ComponentError;
use crate::templating::content::FormatTag;
use crate::templating::dispatcher::ContentKind;

/// Finds `view.*` and `style.*` files for one component class.
#[derive(Debug)]
pub struct AssetLocator {
    dir: Option<PathBuf>,
    cache_lookups: bool,
    views: Mutex<Option<Vec<PathBuf>>>,
    styles: Mutex<Option<Vec<PathBuf>>>,
}

impl AssetLocator {
    pub fn new(dir: Option<PathBuf>, cache_lookups: bool) -> Self {
        Self {
            dir,
            cache_lookups,
            views: Mutex::new(None),
            styles: Mutex::new(None),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Every `view.*` or `style.*` file in the directory, sorted by name.
    /// Missing directories yield no files.
    pub fn files(&self, kind: ContentKind) -> Result<Vec<PathBuf>, ComponentError> {
        let Some(dir) = &self.dir else {
            return Ok(Vec::new());
        };

        if !self.cache_lookups {
            return scan(dir, kind);
        }

        let slot = match kind {
            ContentKind::View => &self.views,
            ContentKind::Style => &self.styles,
        };
        let mut cached = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(files) = cached.as_ref() {
            return Ok(files.clone());
        }
        let files = scan(dir, kind)?;
        *cached = Some(files.clone());
        Ok(files)
    }

    /// The single asset file for `kind`, if there is one.
    ///
    /// # Errors
    ///
    /// [`ComponentError::MultipleViews`] / [`ComponentError::MultipleStyles`]
    /// when the directory holds more than one candidate.
    pub fn file(&self, kind: ContentKind, component: &str) -> Result<Option<PathBuf>, ComponentError> {
        let mut files = self.files(kind)?;
        if files.len() > 1 {
            let files = files
                .iter()
                .map(|path| {
                    path.file_name()
                        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
                })
                .collect();
            return Err(match kind {
                ContentKind::View => ComponentError::MultipleViews {
                    component: component.to_string(),
                    files,
                },
                ContentKind::Style => ComponentError::MultipleStyles {
                    component: component.to_string(),
                    files,
                },
            });
        }
        Ok(files.pop())
    }

    /// Forget cached lookups.
    pub fn clear(&self) {
        *self.views.lock().unwrap_or_else(PoisonError::into_inner) = None;
        *self.styles.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn scan(dir: &Path, kind: ContentKind) -> Result<Vec<PathBuf>, ComponentError> {
    let pattern = format!("{}/{kind}.*", glob::Pattern::escape(&dir.to_string_lossy()));
    let entries = glob::glob(&pattern).map_err(|e| ComponentError::Other {
        message: format!("Invalid asset pattern {pattern}: {e}"),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            ComponentError::io(path, std::io::Error::from(e))
        })?;
        if fs::metadata(&path).map(|meta| meta.is_file()).unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();

    tracing::trace!(dir = %dir.display(), %kind, count = files.len(), "Scanned asset directory");
    Ok(files)
}

/// The format an asset file declares through its name.
///
/// Falls back to `tera` for views and `css` for styles when the name
/// carries no format segment other than `tera`.
///
/// ```
/// use std::path::Path;
/// use tilekit::component::assets::file_format;
/// use tilekit::templating::{ContentKind, FormatTag};
///
/// assert_eq!(file_format(Path::new("view.html.tera"), ContentKind::View), FormatTag::HTML);
/// assert_eq!(file_format(Path::new("view.tera"), ContentKind::View), FormatTag::TERA);
/// assert_eq!(file_format(Path::new("style.tera"), ContentKind::Style), FormatTag::CSS);
/// ```
pub fn file_format(path: &Path, kind: ContentKind) -> FormatTag {
    let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
    let format = name
        .split('.')
        .skip(1)
        .filter(|part| !part.is_empty() && !part.eq_ignore_ascii_case("tera"))
        .last()
        .map(FormatTag::new);

    format.unwrap_or(match kind {
        ContentKind::View => FormatTag::TERA,
        ContentKind::Style => FormatTag::CSS,
    })
}

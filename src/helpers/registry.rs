//! Name-to-component registry used for helper calls and nested rendering.
//!
//! Registering a component class installs two names under the class's scope:
//! its canonical name (`DropdownMenu`) and its underscored alias
//! (`dropdown_menu`). Components without a namespace land in the global
//! scope; namespaced ones land under their namespace.
//!
//! Installing a name that another component already owns is allowed. The
//! new binding wins, a [`Diagnostic::NameCollision`] is recorded and, unless
//! disabled, a warning is logged once per component and name.
//!
//! A binding keeps its component class alive until the names are removed
//! with [`HelperRegistry::unregister`]. Classes refer back to the registry
//! weakly, so the two never form a cycle.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use dashmap::DashMap;
use strsim::levenshtein;

use super::naming::{split_qualified, underscore};
use crate::component::ComponentClass;
use crate::core::ComponentError;

/// Where a helper name is installed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HelperScope {
    Global,
    Namespace(String),
}

/// A scoped helper name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HelperKey {
    pub scope: HelperScope,
    pub name: String,
}

impl HelperKey {
    pub fn new(scope: HelperScope, name: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
        }
    }
}

impl fmt::Display for HelperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            HelperScope::Global => f.write_str(&self.name),
            HelperScope::Namespace(namespace) => write!(f, "{}::{}", namespace, self.name),
        }
    }
}

/// Non-fatal conditions observed while registering helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `component` replaced the binding `shadowed` held for `key`.
    NameCollision {
        key: HelperKey,
        component: String,
        shadowed: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NameCollision {
                key,
                component,
                shadowed,
            } => write!(
                f,
                "`{component}` shadows the helper `{key}` of `{shadowed}`; the existing binding is overwritten"
            ),
        }
    }
}

struct HelperBinding {
    component: String,
    class: Arc<ComponentClass>,
}

/// Returned by [`HelperRegistry::register`]; pass it to
/// [`HelperRegistry::unregister`] to remove the names again.
#[derive(Debug, Clone)]
pub struct HelperHandle {
    component: String,
    keys: Vec<HelperKey>,
    class: Arc<ComponentClass>,
}

impl HelperHandle {
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn keys(&self) -> &[HelperKey] {
        &self.keys
    }
}

/// Registry of component helpers.
pub struct HelperRegistry {
    bindings: DashMap<HelperKey, HelperBinding>,
    warned: Mutex<HashSet<(String, HelperKey)>>,
    diagnostics: Mutex<Vec<Diagnostic>>,
    warn_on_collision: bool,
    registrations: AtomicUsize,
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("names", &self.names())
            .field("warn_on_collision", &self.warn_on_collision)
            .finish()
    }
}

impl HelperRegistry {
    pub fn new(warn_on_collision: bool) -> Self {
        Self {
            bindings: DashMap::new(),
            warned: Mutex::new(HashSet::new()),
            diagnostics: Mutex::new(Vec::new()),
            warn_on_collision,
            registrations: AtomicUsize::new(0),
        }
    }

    /// The names `register` installs for `class`.
    pub fn handle_for(&self, class: &Arc<ComponentClass>) -> HelperHandle {
        let scope = match class.namespace() {
            Some(namespace) => HelperScope::Namespace(namespace.to_string()),
            None => HelperScope::Global,
        };

        let mut keys = vec![HelperKey::new(scope.clone(), class.name())];
        let alias = underscore(class.name());
        if alias != class.name() {
            keys.push(HelperKey::new(scope, alias));
        }

        HelperHandle {
            component: class.full_name().to_string(),
            keys,
            class: Arc::clone(class),
        }
    }

    /// Install the canonical name and underscored alias of `class`.
    pub fn register(&self, class: &Arc<ComponentClass>) -> HelperHandle {
        let handle = self.handle_for(class);

        for key in &handle.keys {
            let previous = self.bindings.insert(
                key.clone(),
                HelperBinding {
                    component: handle.component.clone(),
                    class: Arc::clone(&handle.class),
                },
            );

            match previous {
                Some(previous) if !Arc::ptr_eq(&previous.class, &handle.class) => {
                    self.report_collision(key, &handle.component, previous.component);
                }
                _ => {}
            }
        }

        self.registrations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            component = %handle.component,
            names = ?handle.keys.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "Registered component helpers"
        );

        handle
    }

    fn report_collision(&self, key: &HelperKey, component: &str, shadowed: String) {
        let first_time = self
            .warned
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((component.to_string(), key.clone()));
        if !first_time {
            return;
        }

        let diagnostic = Diagnostic::NameCollision {
            key: key.clone(),
            component: component.to_string(),
            shadowed,
        };
        if self.warn_on_collision {
            tracing::warn!("{diagnostic}. Consider renaming this component.");
        }
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner).push(diagnostic);
    }

    /// Remove the names installed by `handle`. Names that have since been
    /// taken over by another component are left alone. Returns how many
    /// names were removed.
    pub fn unregister(&self, handle: &HelperHandle) -> usize {
        let removed = handle
            .keys
            .iter()
            .filter(|key| {
                self.bindings
                    .remove_if(*key, |_, binding| Arc::ptr_eq(&binding.class, &handle.class))
                    .is_some()
            })
            .count();
        tracing::debug!(component = %handle.component, removed, "Unregistered component helpers");
        removed
    }

    /// Remove one name regardless of which component owns it.
    pub fn remove(&self, key: &HelperKey) -> bool {
        self.bindings.remove(key).is_some()
    }

    /// Resolve a helper name to its component class.
    ///
    /// Accepts `Name`, its underscored or hyphenated alias (`dropdown_menu`,
    /// `dropdown-menu`) and namespaced forms (`Navigation::DropdownMenu`).
    ///
    /// # Errors
    ///
    /// [`ComponentError::UnknownComponent`] with close matches when nothing is
    /// bound under the name.
    pub fn lookup(&self, name: &str) -> Result<Arc<ComponentClass>, ComponentError> {
        let (namespace, short) = split_qualified(name.trim());
        let scope = match namespace {
            Some(namespace) => HelperScope::Namespace(namespace.to_string()),
            None => HelperScope::Global,
        };

        let candidates = [short.to_string(), underscore(short)];
        let binding = candidates
            .iter()
            .find_map(|candidate| self.bindings.get(&HelperKey::new(scope.clone(), candidate.as_str())));

        match binding {
            Some(binding) => Ok(Arc::clone(&binding.class)),
            None => Err(ComponentError::UnknownComponent {
                name: name.to_string(),
                suggestions: self.suggestions(name),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    fn suggestions(&self, name: &str) -> Vec<String> {
        let threshold = (name.len() / 2).max(2);
        let mut scored: Vec<(usize, String)> = self
            .names()
            .into_iter()
            .map(|candidate| (levenshtein(name, &candidate), candidate))
            .filter(|(distance, _)| *distance <= threshold)
            .collect();
        scored.sort();
        scored.into_iter().take(3).map(|(_, candidate)| candidate).collect()
    }

    /// All installed names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<HelperKey> = self.bindings.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys.into_iter().map(|key| key.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drain the recorded diagnostics.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Number of successful `register` calls.
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::Relaxed)
    }
}

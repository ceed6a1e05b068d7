//! Lifecycle callbacks around initialization and rendering.
//!
//! Each [`Phase`] runs its hooks in a fixed order:
//!
//! 1. `before` hooks, in registration order
//! 2. `around` hooks, nested so the first registered is outermost; each
//!    receives a continuation and may skip it to suppress the phase
//! 3. the phase body
//! 4. `after` hooks, in registration order, only when the body ran
//!
//! A suppressed `initialize` leaves props unbound; a suppressed `render`
//! produces empty output. Any hook error aborts the phase.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::Component;
use crate::core::ComponentError;

/// A lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Initialize,
    Render,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initialize => f.write_str("initialize"),
            Phase::Render => f.write_str("render"),
        }
    }
}

/// Continuation handed to around hooks.
pub type Next<'a> = &'a mut dyn FnMut(&mut Component) -> anyhow::Result<()>;

/// A before/after hook.
pub type Hook = Arc<dyn Fn(&mut Component) -> anyhow::Result<()> + Send + Sync>;

/// An around hook. Call the continuation to run the rest of the phase.
pub type AroundHook = Arc<dyn Fn(&mut Component, Next<'_>) -> anyhow::Result<()> + Send + Sync>;

/// A hook given inline or by the name of a method defined on the builder.
#[derive(Clone)]
pub(crate) enum HookRef<H> {
    Inline(H),
    Method(String),
}

#[derive(Clone)]
pub(crate) enum PendingHook {
    Before(Phase, HookRef<Hook>),
    Around(Phase, HookRef<AroundHook>),
    After(Phase, HookRef<Hook>),
}

#[derive(Clone, Default)]
struct PhaseHooks {
    before: Vec<Hook>,
    around: Vec<AroundHook>,
    after: Vec<Hook>,
}

/// Resolved hooks of one component class.
#[derive(Clone, Default)]
pub struct Callbacks {
    initialize: PhaseHooks,
    render: PhaseHooks,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = |hooks: &PhaseHooks| (hooks.before.len(), hooks.around.len(), hooks.after.len());
        f.debug_struct("Callbacks")
            .field("initialize", &counts(&self.initialize))
            .field("render", &counts(&self.render))
            .finish()
    }
}

impl Callbacks {
    /// Resolve pending registrations against the builder's methods.
    ///
    /// # Errors
    ///
    /// [`ComponentError::UndefinedCallback`] for a method name that was
    /// never defined.
    pub(crate) fn resolve(
        component: &str,
        pending: Vec<PendingHook>,
        methods: &HashMap<String, Hook>,
        around_methods: &HashMap<String, AroundHook>,
    ) -> Result<Self, ComponentError> {
        let undefined = |method: String, phase: Phase| ComponentError::UndefinedCallback {
            component: component.to_string(),
            method,
            phase,
        };

        let mut callbacks = Callbacks::default();
        for hook in pending {
            match hook {
                PendingHook::Before(phase, hook) => {
                    let hook = resolve_ref(hook, methods).map_err(|m| undefined(m, phase))?;
                    callbacks.phase_mut(phase).before.push(hook);
                }
                PendingHook::Around(phase, hook) => {
                    let hook = resolve_ref(hook, around_methods).map_err(|m| undefined(m, phase))?;
                    callbacks.phase_mut(phase).around.push(hook);
                }
                PendingHook::After(phase, hook) => {
                    let hook = resolve_ref(hook, methods).map_err(|m| undefined(m, phase))?;
                    callbacks.phase_mut(phase).after.push(hook);
                }
            }
        }
        Ok(callbacks)
    }

    fn phase(&self, phase: Phase) -> &PhaseHooks {
        match phase {
            Phase::Initialize => &self.initialize,
            Phase::Render => &self.render,
        }
    }

    fn phase_mut(&mut self, phase: Phase) -> &mut PhaseHooks {
        match phase {
            Phase::Initialize => &mut self.initialize,
            Phase::Render => &mut self.render,
        }
    }

    /// Number of hooks registered for `phase`.
    pub fn len(&self, phase: Phase) -> usize {
        let hooks = self.phase(phase);
        hooks.before.len() + hooks.around.len() + hooks.after.len()
    }

    pub fn is_empty(&self, phase: Phase) -> bool {
        self.len(phase) == 0
    }

    /// Run `phase` around `body`. Returns whether the body ran.
    pub(crate) fn run(
        &self,
        phase: Phase,
        component_name: &str,
        component: &mut Component,
        body: &mut dyn FnMut(&mut Component) -> Result<(), ComponentError>,
    ) -> Result<bool, ComponentError> {
        let hooks = self.phase(phase);
        let wrap = |error: anyhow::Error| ComponentError::from_callback(component_name, phase, error);

        for hook in &hooks.before {
            hook(component).map_err(wrap)?;
        }

        let mut ran = false;
        {
            let mut inner = |component: &mut Component| -> anyhow::Result<()> {
                ran = true;
                body(component).map_err(anyhow::Error::from)
            };
            run_around(&hooks.around, component, &mut inner).map_err(wrap)?;
        }

        if ran {
            for hook in &hooks.after {
                hook(component).map_err(wrap)?;
            }
        } else {
            tracing::debug!(component = component_name, %phase, "Phase suppressed by an around callback");
        }
        Ok(ran)
    }
}

fn resolve_ref<H: Clone>(hook: HookRef<H>, methods: &HashMap<String, H>) -> Result<H, String> {
    match hook {
        HookRef::Inline(hook) => Ok(hook),
        HookRef::Method(name) => methods.get(&name).cloned().ok_or(name),
    }
}

fn run_around(
    hooks: &[AroundHook],
    component: &mut Component,
    body: &mut dyn FnMut(&mut Component) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    match hooks.split_first() {
        None => body(component),
        Some((outer, rest)) => {
            let mut next = |component: &mut Component| run_around(rest, component, &mut *body);
            outer(component, &mut next)
        }
    }
}

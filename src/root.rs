//! The render root: one mounted component driving one backend.

use std::collections::BTreeMap;
use std::fmt;

use reactk_core::{
    ActionExecutor, Backend, CompatibilityOracle, Compatibility, Component, Context, Executor,
    ShadowNode, ThreadedExecutor, reconcile, render_root,
};
use reactk_props::Value;
use tracing::{debug, info, info_span};

use crate::{Error, RootConfig};

/// What a pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pass {
    /// 1-based pass number.
    pub number: u64,
    /// Number of actions applied.
    pub actions: usize,
}

/// Classifies through per-kind overrides, falling back to the executor.
struct Overrides<'a> {
    kinds: &'a BTreeMap<String, Compatibility>,
    fallback: &'a dyn CompatibilityOracle,
}

impl CompatibilityOracle for Overrides<'_> {
    fn classify(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        if old.kind_name() != new.kind_name() {
            return Compatibility::Recreate;
        }
        self.kinds
            .get(new.kind_name())
            .copied()
            .unwrap_or_else(|| self.fallback.classify(old, new))
    }
}

/// Owns a component, its context and the executor holding the live
/// resources.
///
/// Every pass renders the whole component, reconciles the result against
/// what the executor committed last and applies the actions.
pub struct RenderRoot<E = Box<dyn ActionExecutor>> {
    component: Box<dyn Component>,
    context: Context,
    executor: E,
    overrides: BTreeMap<String, Compatibility>,
    config: RootConfig,
    passes: u64,
}

impl RenderRoot {
    /// Mounts `component` on the backend built by `factory`.
    ///
    /// With [`RootConfig::threaded`] the backend is built and driven on a
    /// dedicated thread; otherwise it lives on the calling thread.
    ///
    /// # Errors
    ///
    /// Fails if the executor thread cannot be spawned or the first pass
    /// fails.
    pub fn mount<C, B, F>(
        component: C,
        factory: F,
        context: Context,
        config: RootConfig,
    ) -> Result<Self, Error>
    where
        C: Component + 'static,
        B: Backend + 'static,
        F: FnOnce() -> B + Send + 'static,
    {
        let executor: Box<dyn ActionExecutor> = if config.threaded {
            Box::new(ThreadedExecutor::spawn(factory)?)
        } else {
            Box::new(Executor::new(factory()))
        };
        Self::new(component, executor, context, config)
    }
}

impl<E: ActionExecutor> RenderRoot<E> {
    /// Mounts `component` on `executor` and runs the first pass.
    ///
    /// # Errors
    ///
    /// Fails on invalid compatibility overrides or if the first pass fails.
    pub fn new<C>(
        component: C,
        executor: E,
        context: Context,
        config: RootConfig,
    ) -> Result<Self, Error>
    where
        C: Component + 'static,
    {
        let overrides = config.overrides()?;
        let mut root = Self {
            component: Box::new(component),
            context,
            executor,
            overrides,
            config,
            passes: 0,
        };
        root.rerender()?;
        Ok(root)
    }

    /// Runs one pass.
    ///
    /// # Errors
    ///
    /// Propagates render, reconcile and execution failures. A failed pass
    /// leaves the executor with whatever it committed before the failure;
    /// the next pass reconciles against that.
    pub fn rerender(&mut self) -> Result<Pass, Error> {
        let number = self.passes + 1;
        let span = info_span!("pass", number);
        let _guard = span.enter();

        let top = render_root(self.component.as_ref(), &self.context)?;
        let oracle = Overrides {
            kinds: &self.overrides,
            fallback: &self.executor,
        };
        let actions = reconcile(&self.executor, &oracle, &top)?;
        let count = actions.len();
        if self.config.log_actions {
            for action in &actions {
                info!(%action, "action");
            }
        }
        self.executor.apply(actions, &top)?;

        self.passes = number;
        info!(actions = count, "pass complete");
        Ok(Pass {
            number,
            actions: count,
        })
    }

    /// The render context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Writes a context value and re-renders if it changed.
    ///
    /// # Errors
    ///
    /// Propagates the failure of the pass.
    pub fn set_context(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Option<Pass>, Error> {
        let key = key.into();
        if !self.context.set(key.clone(), value) {
            debug!(%key, "context unchanged");
            return Ok(None);
        }
        self.rerender().map(Some)
    }

    /// The executor holding the committed tree.
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// The configuration the root was mounted with.
    #[must_use]
    pub const fn config(&self) -> &RootConfig {
        &self.config
    }

    /// Number of completed passes.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }
}

impl<E: ActionExecutor> fmt::Debug for RenderRoot<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRoot")
            .field("component", &self.component.type_name())
            .field("context", &self.context)
            .field("executor", &self.executor)
            .field("overrides", &self.overrides)
            .field("passes", &self.passes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;

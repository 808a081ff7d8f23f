//! Macro context - host hooks into the pipeline.
//!
//! A macro context has two hook surfaces:
//!
//! - `on_parse` runs right after lexing and parsing, with mutable access
//!   to the raw tree. Calling [`ParseContext::finish`] returns the raw
//!   tree immediately, skipping preprocessing.
//! - `on_walk` runs once per block during template expansion, with a
//!   cursor over the block's pending children (see
//!   [`crate::expand::WalkCursor`]).
//!
//! Hooks are `Rc<dyn Fn…>` so the expander can re-enter itself from
//! inside a callback (`invoke_walk`) without double-borrowing; hosts that
//! need mutable state use interior mutability. Panics inside hooks are
//! caught and re-raised as [`MacroError`]s. Hooks are single-worker by
//! construction and must not block.

use std::rc::Rc;

use oxc_par::Document;

use crate::error::MacroError;
use crate::expand::WalkCursor;
use crate::walk::{walk, WalkContext, WalkControl, WalkOptions};

/// Hook invoked after parse, before preprocessing.
pub type ParseHook = Rc<dyn Fn(&mut ParseContext<'_>) -> Result<(), MacroError>>;

/// Hook invoked per block during template expansion.
pub type WalkHook = Rc<dyn Fn(&mut WalkCursor<'_, '_>) -> Result<(), MacroError>>;

/// The hook bundle a host installs for one compilation.
#[derive(Clone, Default)]
pub struct MacroHooks {
    /// Post-parse hook.
    pub on_parse: Option<ParseHook>,
    /// Per-block walk hook.
    pub on_walk: Option<WalkHook>,
}

impl MacroHooks {
    /// An empty hook bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the post-parse hook.
    pub fn on_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ParseContext<'_>) -> Result<(), MacroError> + 'static,
    {
        self.on_parse = Some(Rc::new(hook));
        self
    }

    /// Install the per-block walk hook.
    pub fn on_walk<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut WalkCursor<'_, '_>) -> Result<(), MacroError> + 'static,
    {
        self.on_walk = Some(Rc::new(hook));
        self
    }

    /// Whether any hook is installed.
    pub fn is_empty(&self) -> bool {
        self.on_parse.is_none() && self.on_walk.is_none()
    }
}

impl std::fmt::Debug for MacroHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacroHooks")
            .field("on_parse", &self.on_parse.is_some())
            .field("on_walk", &self.on_walk.is_some())
            .finish()
    }
}

/// Context handed to the `on_parse` hook.
pub struct ParseContext<'a> {
    /// The raw parsed tree, mutable.
    pub tree: &'a mut Document,
    finished: bool,
}

impl<'a> ParseContext<'a> {
    /// Wrap a freshly parsed document.
    pub fn new(tree: &'a mut Document) -> Self {
        Self {
            tree,
            finished: false,
        }
    }

    /// Return the raw tree as the compilation result, skipping
    /// preprocessing.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Whether `finish` was called.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Walk the raw tree's blocks.
    pub fn walk(
        &self,
        callback: &mut dyn FnMut(&oxc_par::Node, &WalkContext<'_>) -> WalkControl,
        options: &WalkOptions<'_>,
    ) {
        walk(&self.tree.blocks, callback, options);
    }

    /// Build a macro error from a message.
    pub fn throw_error(&self, message: impl Into<String>) -> MacroError {
        MacroError::Message(message.into())
    }
}

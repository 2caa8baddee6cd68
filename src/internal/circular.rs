//! Circular dependency detection infrastructure.
//!
//! The resolution stack of one call path is a chain of frames living on the
//! Rust call stack. Each frame borrows its parent, so entering a child frame
//! is a push and dropping it is the pop, on success and on error alike.
//! Independent call paths never share a chain.
//!
//! Builds are synchronous, so every nested build of one resolve runs on the
//! same thread. A per-thread counter of active builds bounds recursion that
//! escapes the chain (a factory resolving through a captured `Container`).

use std::cell::Cell;
use std::marker::PhantomData;

use crate::error::{DiError, DiResult};
use crate::key::RegistrationKey;

/// Fits a 2 MiB thread stack in unoptimized builds.
pub(crate) const DEFAULT_MAX_DEPTH: usize = 128;

thread_local! {
    static ACTIVE_BUILDS: Cell<usize> = Cell::new(0);
}

/// One in-progress construction on a resolution chain.
pub(crate) struct Frame<'a> {
    key: RegistrationKey,
    parent: Option<&'a Frame<'a>>,
    depth: usize,
}

impl<'a> Frame<'a> {
    /// Enters `key` below `parent`, failing if `key` is already being
    /// constructed on this chain or the chain would exceed `max_depth`.
    pub(crate) fn enter(
        parent: Option<&'a Frame<'a>>,
        key: &RegistrationKey,
        max_depth: usize,
    ) -> DiResult<Frame<'a>> {
        if let Some(parent) = parent {
            if parent.iter().any(|frame| &frame.key == key) {
                // Deepest first: the re-entered key, then the whole chain
                // back to the root.
                let chain = std::iter::once(key.clone())
                    .chain(parent.iter().map(|frame| frame.key.clone()))
                    .collect();
                return Err(DiError::Circular(chain));
            }
        }

        let depth = parent.map_or(0, |p| p.depth) + 1;
        if depth > max_depth {
            return Err(DiError::DepthExceeded(max_depth));
        }

        Ok(Frame {
            key: key.clone(),
            parent,
            depth,
        })
    }

    pub(crate) fn key(&self) -> &RegistrationKey {
        &self.key
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    /// Walks from this frame to the root.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Frame<'a>> {
        std::iter::successors(Some(self), |frame| frame.parent)
    }
}

/// Marks one active build on the current thread; dropping it ends the build.
pub(crate) struct ThreadDepth {
    _not_send: PhantomData<*const ()>,
}

impl ThreadDepth {
    /// Counts a build on this thread, failing past `max_depth` nested builds.
    pub(crate) fn enter(max_depth: usize) -> DiResult<Self> {
        ACTIVE_BUILDS.with(|active| {
            let depth = active.get() + 1;
            if depth > max_depth {
                return Err(DiError::DepthExceeded(max_depth));
            }
            active.set(depth);
            Ok(ThreadDepth {
                _not_send: PhantomData,
            })
        })
    }
}

impl Drop for ThreadDepth {
    fn drop(&mut self) {
        ACTIVE_BUILDS.with(|active| active.set(active.get().saturating_sub(1)));
    }
}

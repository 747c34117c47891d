//! Modal Stack Module
//!
//! A last-in-first-out stack of presented UI overlays. Nested create flows
//! push a creation modal and, on completion, hand the new entity identifier
//! back to the form underneath through a one-shot callback — the only
//! cross-form composition mechanism in the system.

use crate::entities::EntityId;

/// Invoked with the identifier of the entity a nested create flow produced.
pub type CompletionCallback = Box<dyn FnOnce(EntityId) + Send>;

struct Frame<M> {
    modal: M,
    on_complete: Option<CompletionCallback>,
}

// == Modal Stack ==
/// Strictly LIFO presentation stack. The top frame is the rendered one.
/// There is no identifier-based removal.
pub struct ModalStack<M> {
    frames: Vec<Frame<M>>,
}

impl<M> ModalStack<M> {
    // == Constructor ==
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    // == Push ==
    /// Presents a modal on top of the stack.
    pub fn push(&mut self, modal: M) {
        self.frames.push(Frame {
            modal,
            on_complete: None,
        });
    }

    /// Presents a modal whose completion hands an entity identifier back to
    /// the caller. The callback is `FnOnce` and consumed on delivery, so it
    /// runs exactly once or not at all.
    pub fn push_with(&mut self, modal: M, on_complete: CompletionCallback) {
        self.frames.push(Frame {
            modal,
            on_complete: Some(on_complete),
        });
    }

    // == Pop ==
    /// Dismisses the top modal without completing it. Any completion
    /// callback is dropped unrun (the flow was cancelled). Popping an empty
    /// stack is a no-op returning `None`.
    pub fn pop(&mut self) -> Option<M> {
        self.frames.pop().map(|frame| frame.modal)
    }

    // == Complete ==
    /// Finishes the top modal's flow: removes the frame and delivers `id`
    /// to its completion callback, if one was registered. Returns the
    /// dismissed modal, or `None` when the stack was empty.
    pub fn complete(&mut self, id: EntityId) -> Option<M> {
        let mut frame = self.frames.pop()?;
        if let Some(callback) = frame.on_complete.take() {
            callback(id);
        }
        Some(frame.modal)
    }

    // == Top ==
    /// The modal currently rendered.
    pub fn top(&self) -> Option<&M> {
        self.frames.last().map(|frame| &frame.modal)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<M> Default for ModalStack<M> {
    fn default() -> Self {
        Self::new()
    }
}

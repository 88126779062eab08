#![forbid(unsafe_code)]

//! Structural commands over an [`EditState`].
//!
//! Each command snapshots what it needs during `run` so that `undo` applies
//! the exact inverse. Text commands also move the caret, so typing and
//! deleting coalesce without separate focus steps.
//!
//! | Command | Effect | Coalesces with |
//! |---------|--------|----------------|
//! | [`InsertElement`] | insert a subtree | - |
//! | [`DeleteElement`] | detach a subtree | - |
//! | [`ReparentElement`] | move a subtree | - |
//! | [`ChangeKind`] | replace an element's kind | - |
//! | [`SetOpen`] | expand or collapse | - |
//! | [`InsertText`] | insert attributed text | contiguous typing within a word |
//! | [`DeleteText`] | delete a text range | repeated backspace / forward delete |
//! | [`ReplaceText`] | replace a text range | - |
//! | [`FormatText`] | set/add/remove/toggle attributes | - |
//! | [`FocusElement`] | move focus | the next focus move |

mod focus;
mod format;
mod text;
mod tree;

pub use focus::FocusElement;
pub use format::{FormatOp, FormatText};
pub use text::{DeleteDirection, DeleteText, InsertText, ReplaceText};
pub use tree::{ChangeKind, DeleteElement, InsertElement, ReparentElement, SetOpen};

use outline_text::AttributedText;
use outline_undo::Command;

use crate::id::ElementId;
use crate::state::EditState;

/// A command over an [`EditState`].
pub type EditCommand = Command<EditState>;

/// The editable text of `id`, if it exists and its kind carries text.
fn editable_text(state: &mut EditState, id: ElementId) -> Option<&mut AttributedText> {
    let carries_text = state.document.get(id)?.kind().carries_text();
    if !carries_text {
        return None;
    }
    state.document.text_mut(id)
}

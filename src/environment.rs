use crate::{
    error::{ScriptError, Span},
    runtime::Value,
    stdlib::BuiltinOp,
};
use std::collections::HashMap;

pub type Frame = HashMap<String, Value>;

/// Stack of binding frames, innermost last. Never empty.
///
/// `Clone` copies every frame, so a clone is fully independent of the
/// original; closures rely on this through [`ScopeStack::snapshot`].
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// A stack holding one empty frame.
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame::new()],
        }
    }

    /// A single frame holding every built-in operator under its own name.
    pub fn standard() -> Self {
        let mut scope = Self::new();
        for op in BuiltinOp::ALL {
            scope.assign(op.name(), Value::BuiltIn(op));
        }
        scope
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Panics when only one frame is left; every push must be paired with a
    /// pop, so this is never reachable from a script.
    pub fn pop(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the outermost frame");
        self.frames.pop();
    }

    /// Looks `name` up from the innermost frame outwards.
    pub fn get(&self, name: &str, span: Span) -> Result<&Value, ScriptError> {
        self.lookup(name)
            .ok_or_else(|| ScriptError::UnboundVariable {
                name: name.to_string(),
                span,
            })
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Binds `name` in the top frame unless that frame already binds it.
    /// Outer frames are untouched, so this may shadow.
    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), ScriptError> {
        let top = self.top_mut();
        if top.contains_key(name) {
            return Err(ScriptError::Redeclaration {
                name: name.to_string(),
            });
        }
        top.insert(name.to_string(), value);
        Ok(())
    }

    /// Binds `name` in the top frame, replacing any binding already there.
    pub fn assign(&mut self, name: &str, value: Value) {
        self.top_mut().insert(name.to_string(), value);
    }

    pub fn snapshot(&self) -> ScopeStack {
        self.clone()
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.frames
            .last_mut()
            .expect("scope stack always has at least one frame")
    }
}

use std::collections::HashMap;

use inkwell::values::{FloatValue, PointerValue};

/// What a name refers to inside a function body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'ctx> {
    /// Stack slot in the entry block; read with a load, written with a store.
    Slot(PointerValue<'ctx>),
    /// Incoming parameter value, before it has been spilled to a slot.
    Param(FloatValue<'ctx>),
}

/// Symbol table with nested binding frames.
///
/// Every `bind` inside a frame records what the name referred to before, and
/// `exit` puts those back in reverse order. A name that was unbound when the
/// frame was entered is unbound again afterwards.
#[derive(Debug)]
pub struct Scope<T> {
    bindings: HashMap<String, T>,
    frames: Vec<Vec<(String, Option<T>)>>,
}

impl<T> Default for Scope<T> {
    fn default() -> Self {
        Scope {
            bindings: HashMap::new(),
            frames: vec![],
        }
    }
}

impl<T: Clone> Scope<T> {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.bindings.get(name)
    }

    /// Opens a frame.
    pub fn enter(&mut self) {
        self.frames.push(vec![]);
    }

    /// Binds `name`, shadowing whatever it referred to.
    ///
    /// Outside of any frame the previous binding is simply replaced.
    pub fn bind(&mut self, name: &str, value: T) {
        let previous = self.bindings.insert(String::from(name), value);

        if let Some(frame) = self.frames.last_mut() {
            frame.push((String::from(name), previous));
        }
    }

    /// Closes the innermost frame and restores the bindings it shadowed.
    pub fn exit(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };

        for (name, previous) in frame.into_iter().rev() {
            match previous {
                Some(value) => {
                    self.bindings.insert(name, value);
                }
                None => {
                    self.bindings.remove(&name);
                }
            }
        }
    }

    /// Drops every binding and frame. Used at the start of each function body.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.frames.clear();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

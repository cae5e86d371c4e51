use crate::ast::Expression;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Environment frame for variable bindings
///
/// Frames form a parent-linked chain. Lookups walk outward; writes only ever touch
/// the frame they are made on, so a parent shared by several call frames is never
/// mutated by its descendants.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Expression>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// A root frame with no parent
    pub fn new() -> Self {
        Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        }
    }

    /// An empty frame whose lookups fall back to `parent`
    pub fn extend(parent: &Rc<Environment>) -> Self {
        Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        }
    }

    /// Look `name` up in this frame, then in each ancestor.
    pub fn get(&self, name: &str) -> Option<Expression> {
        let mut frame = self;
        loop {
            if let Some(value) = frame.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            frame = frame.parent.as_deref()?;
        }
    }

    /// Insert or overwrite `name` in this frame only.
    pub fn set(&self, name: impl Into<String>, value: Expression) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn parent(&self) -> Option<&Rc<Environment>> {
        self.parent.as_ref()
    }

    /// Get all bindings visible from this frame, innermost winning.
    /// Returns a Vec of (name, value) pairs sorted by name
    pub fn bindings(&self) -> Vec<(String, Expression)> {
        let mut frames = Vec::new();
        let mut frame = Some(self);
        while let Some(current) = frame {
            frames.push(current);
            frame = current.parent.as_deref();
        }

        // Outermost first so inner frames override
        let mut bindings = HashMap::new();
        for frame in frames.into_iter().rev() {
            for (name, value) in frame.bindings.borrow().iter() {
                bindings.insert(name.clone(), value.clone());
            }
        }

        let mut result: Vec<_> = bindings.into_iter().collect();
        result.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

impl Drop for Environment {
    // Tail calls extend the caller's frame, so chains can be as long as the
    // recursion was deep. Unlink them iteratively instead of recursing per frame.
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(frame) = parent {
            match Rc::try_unwrap(frame) {
                Ok(mut env) => parent = env.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// Create a fresh global environment
pub fn create_global_env() -> Rc<Environment> {
    Rc::new(Environment::new())
}

#[cfg(test)]
#[expect(clippy::unwrap_used)] // test code OK
mod tests {
    use super::*;
    use crate::ast::val;

    #[test]
    fn test_lookup_walks_parent_chain() {
        let global = create_global_env();
        global.set("x", val(1));
        global.set("y", val(2));

        let child = Rc::new(Environment::extend(&global));
        child.set("y", val(20));
        let grandchild = Environment::extend(&child);

        assert_eq!(grandchild.get("x").unwrap(), val(1));
        assert_eq!(grandchild.get("y").unwrap(), val(20));
        assert_eq!(grandchild.get("z"), None);
        assert_eq!(global.get("y").unwrap(), val(2));
    }

    #[test]
    fn test_set_only_touches_current_frame() {
        let global = create_global_env();
        global.set("r", val(10));

        let child = Environment::extend(&global);
        child.set("r", val(99));
        child.set("local", val(true));

        assert_eq!(child.get("r").unwrap(), val(99));
        assert_eq!(global.get("r").unwrap(), val(10));
        assert_eq!(global.get("local"), None);

        // Redefinition in the same frame overwrites
        global.set("r", val(11));
        assert_eq!(global.get("r").unwrap(), val(11));
        assert_eq!(child.get("r").unwrap(), val(99));
    }

    #[test]
    fn test_bindings_sorted_and_shadowed() {
        let global = create_global_env();
        global.set("b", val(1));
        global.set("a", val(2));
        let child = Environment::extend(&global);
        child.set("b", val(3));

        assert_eq!(
            child.bindings(),
            vec![("a".to_owned(), val(2)), ("b".to_owned(), val(3))]
        );
        assert!(child.parent().is_some());
        assert!(global.parent().is_none());
    }

    #[test]
    fn test_dropping_long_chain_does_not_recurse() {
        let mut frame = create_global_env();
        for i in 0..200_000 {
            let next = Rc::new(Environment::extend(&frame));
            next.set("i", val(i));
            frame = next;
        }
        assert_eq!(frame.get("i").unwrap(), val(199_999));
        drop(frame);
    }
}

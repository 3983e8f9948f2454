//! The type engine: resolver, options and recursion guard in one place.
//!
//! Every algorithm that may need class facts or may recurse without a
//! structural bound is a method on [`TypeEngine`]. The engine itself holds
//! no type state, so it is cheap to create one per thread or per analysis
//! run. Types are `Send + Sync` and can be shared across engines freely.

use std::cell::RefCell;
use std::sync::Arc;

use psz_common::SolverOptions;
use tracing::debug;

use crate::recursion::{DepthCounter, RecursionProfile};
use crate::resolver::{ClassReflection, ClassResolver};
use crate::trinary::TrinaryLogic;

pub struct TypeEngine<'a> {
    resolver: &'a dyn ClassResolver,
    options: SolverOptions,
    depth: RefCell<DepthCounter>,
    inference_depth: RefCell<DepthCounter>,
}

impl<'a> TypeEngine<'a> {
    pub fn new(resolver: &'a dyn ClassResolver) -> Self {
        Self::with_options(resolver, SolverOptions::default())
    }

    pub fn with_options(resolver: &'a dyn ClassResolver, options: SolverOptions) -> Self {
        let profile = RecursionProfile::Custom {
            max_depth: options.max_relation_depth,
        };
        Self {
            resolver,
            options,
            depth: RefCell::new(DepthCounter::with_profile(profile)),
            inference_depth: RefCell::new(DepthCounter::with_profile(RecursionProfile::Inference)),
        }
    }

    pub fn resolver(&self) -> &'a dyn ClassResolver {
        self.resolver
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Whether any query on this engine ever hit the recursion cap.
    pub fn depth_exceeded(&self) -> bool {
        self.depth.borrow().is_exceeded() || self.inference_depth.borrow().is_exceeded()
    }

    /// Run `f` one level deeper, or answer `fallback` at the cap.
    pub(crate) fn guarded<T>(
        &self,
        operation: &'static str,
        fallback: impl FnOnce() -> T,
        f: impl FnOnce() -> T,
    ) -> T {
        enter_guarded(&self.depth, operation, fallback, f)
    }

    /// `guarded` for template inference walks, which have their own cap.
    pub(crate) fn guarded_inference<T>(
        &self,
        operation: &'static str,
        fallback: impl FnOnce() -> T,
        f: impl FnOnce() -> T,
    ) -> T {
        enter_guarded(&self.inference_depth, operation, fallback, f)
    }

    // -------------------------------------------------------------------------
    // Class facts
    // -------------------------------------------------------------------------

    pub(crate) fn class(&self, name: &str) -> Option<Arc<ClassReflection>> {
        self.resolver.get_class(name)
    }

    /// Is every instance of `sub_class` an instance of `super_class`?
    ///
    /// Unrelated classes can still share instances when one side is an
    /// interface and the other is not final.
    pub(crate) fn class_relation(&self, super_class: &str, sub_class: &str) -> TrinaryLogic {
        if super_class.eq_ignore_ascii_case(sub_class) {
            return TrinaryLogic::Yes;
        }
        let (Some(this), Some(that)) = (self.class(super_class), self.class(sub_class)) else {
            return TrinaryLogic::Maybe;
        };
        if self.resolver.is_subclass_of(sub_class, super_class) == Some(true) {
            return TrinaryLogic::Yes;
        }
        if self.resolver.is_subclass_of(super_class, sub_class) == Some(true) {
            return TrinaryLogic::Maybe;
        }
        if this.is_interface() && !that.is_final {
            return TrinaryLogic::Maybe;
        }
        if that.is_interface() && !this.is_final {
            return TrinaryLogic::Maybe;
        }
        TrinaryLogic::No
    }

    /// Is a value declared as `class_name` an instance of `ancestor`?
    pub(crate) fn instance_of(&self, class_name: &str, ancestor: &str) -> TrinaryLogic {
        match self.resolver.is_subclass_of(class_name, ancestor) {
            None => TrinaryLogic::Maybe,
            Some(true) => TrinaryLogic::Yes,
            Some(false) => match self.class(class_name) {
                // Another class may implement both interfaces.
                Some(class) if class.is_interface() => TrinaryLogic::Maybe,
                _ => TrinaryLogic::No,
            },
        }
    }
}

fn enter_guarded<T>(
    counter: &RefCell<DepthCounter>,
    operation: &'static str,
    fallback: impl FnOnce() -> T,
    f: impl FnOnce() -> T,
) -> T {
    let entered = counter.borrow_mut().enter();
    if !entered {
        debug!(
            operation,
            max_depth = counter.borrow().max_depth(),
            "type recursion limit reached"
        );
        return fallback();
    }
    let result = f();
    counter.borrow_mut().leave();
    result
}

#[cfg(test)]
#[path = "../tests/engine_tests.rs"]
mod tests;

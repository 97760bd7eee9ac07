//! Known function signatures, across every unit of a session.
//!
//! Each unit is generated into a fresh LLVM module, but a function defined
//! or declared by an earlier unit must still be callable. The registry keeps
//! every prototype seen so far and materializes a declaration in the
//! current module the first time a unit refers to it.

use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::FunctionValue;
use kal_ir::{Name, Prototype, StringInterner};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
pub struct FunctionRegistry {
    protos: FxHashMap<Name, Prototype>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `proto`, returning the prototype it replaced.
    ///
    /// Pass the returned value to [`restore`](Self::restore) to undo.
    pub fn insert(&mut self, proto: Prototype) -> Option<Prototype> {
        self.protos.insert(proto.name, proto)
    }

    /// Put `name` back to a state previously returned by `insert`.
    pub fn restore(&mut self, name: Name, previous: Option<Prototype>) {
        match previous {
            Some(proto) => {
                self.protos.insert(name, proto);
            }
            None => {
                self.protos.remove(&name);
            }
        }
    }

    #[inline]
    pub fn get(&self, name: Name) -> Option<&Prototype> {
        self.protos.get(&name)
    }

    #[inline]
    pub fn contains(&self, name: Name) -> bool {
        self.protos.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.protos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.protos.is_empty()
    }

    /// The function `name` in `module`, declaring it from its registered
    /// prototype if the module does not have it yet.
    ///
    /// Returns `None` when neither the module nor the registry knows `name`.
    /// Asking twice never creates a second function.
    pub fn get_function<'ctx>(
        &self,
        context: &'ctx Context,
        module: &Module<'ctx>,
        interner: &StringInterner,
        name: Name,
    ) -> Option<FunctionValue<'ctx>> {
        if let Some(function) = module.get_function(interner.lookup(name)) {
            return Some(function);
        }
        let proto = self.get(name)?;
        tracing::trace!(name = name.raw(), "materialize declaration");
        Some(declare_function(context, module, interner, proto))
    }
}

/// `double name(double, ...)` in `module`, with named parameters. Returns
/// the existing function if the module already has one by that name.
pub(crate) fn declare_function<'ctx>(
    context: &'ctx Context,
    module: &Module<'ctx>,
    interner: &StringInterner,
    proto: &Prototype,
) -> FunctionValue<'ctx> {
    let name = interner.lookup(proto.name);
    if let Some(function) = module.get_function(name) {
        return function;
    }
    let f64_type = context.f64_type();
    let params: Vec<BasicMetadataTypeEnum<'ctx>> = vec![f64_type.into(); proto.params.len()];
    let function = module.add_function(name, f64_type.fn_type(&params, false), None);
    for (param, &param_name) in function.get_param_iter().zip(&proto.params) {
        param.set_name(interner.lookup(param_name));
    }
    function
}

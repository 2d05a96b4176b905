//! Interpreter for class IR.
//!
//! Executes method bodies against a [`Runtime`] on behalf of one
//! [`TestExecution`]. Instrumented classes in the runtime's overlay shadow
//! their originals, so calls into the class under test run the rewritten
//! bodies and reach [`Instr::MockCall`] instructions; see [`mock`] for how
//! those dispatch.
//!
//! # Dispatch
//!
//! - instance calls resolve on the receiver's runtime class, walking
//!   superclasses; private methods bind to the static owner instead
//! - static calls resolve on the named class; if no class declares the
//!   method, host natives registered under that identity are tried
//! - constructions allocate an instance of the named class and run its
//!   matching `<init>`; a class without a no-argument constructor can
//!   still be constructed with no arguments

mod mock;

use smallvec::SmallVec;

use tm_ir::{
    Access, ClassLookup, Instr, Invocation, InvokeKind, Literal, MethodBody, MethodDef, MethodRef,
    Name, TypeRef, Value, VarId,
};

use crate::diagnostics::CallStack;
use crate::errors::{
    abstract_method, arity_mismatch, missing_native, no_such_class, no_such_method,
    null_receiver, thrown, EvalError, EvalResult,
};
use crate::execution::TestExecution;
use crate::natives::NativeCall;
use crate::runtime::Runtime;

pub struct Interpreter<'rt> {
    runtime: &'rt Runtime,
    execution: &'rt TestExecution,
    stack: CallStack,
}

impl<'rt> Interpreter<'rt> {
    pub fn new(runtime: &'rt Runtime, execution: &'rt TestExecution) -> Self {
        Self {
            runtime,
            execution,
            stack: CallStack::new(runtime.config().max_call_depth),
        }
    }

    pub fn runtime(&self) -> &'rt Runtime {
        self.runtime
    }

    pub fn execution(&self) -> &'rt TestExecution {
        self.execution
    }

    /// Frames currently on the interpreter's call stack.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// `Class.method(args)`.
    pub fn invoke_static(
        &mut self,
        class: Name,
        method: Name,
        params: &[TypeRef],
        args: &[Value],
    ) -> EvalResult {
        let runtime = self.runtime;
        match runtime.resolve_method(class, method, params) {
            Some((owner, def)) if def.is_static => self.run_method(owner, def, None, args),
            _ => self.call_host_static(&MethodRef::new(class, method, params.iter().copied()), args),
        }
    }

    /// `receiver.method(args)`, dispatched on the receiver's runtime class.
    pub fn invoke_virtual(
        &mut self,
        receiver: &Value,
        method: Name,
        params: &[TypeRef],
        args: &[Value],
    ) -> EvalResult {
        let owner = receiver.runtime_type().map_or(Name::OBJECT, TypeRef::base);
        self.dispatch_virtual(owner, receiver.clone(), method, params, args)
    }

    /// `new Class(args)`.
    pub fn construct(&mut self, class: Name, params: &[TypeRef], args: &[Value]) -> EvalResult {
        let runtime = self.runtime;
        let interner = runtime.interner();
        let Some(def) = runtime.lookup_class(class) else {
            return Err(no_such_class(interner.lookup(class)));
        };
        let object = Value::new_object(class);
        match def.find_method(Name::INIT, params) {
            Some(ctor) => {
                self.run_method(class, ctor, Some(object.clone()), args)?;
            }
            None if params.is_empty() && args.is_empty() => {}
            None => {
                let ctor = MethodRef::new(class, Name::INIT, params.iter().copied());
                return Err(no_such_method(&ctor.display(interner).to_string()));
            }
        }
        Ok(object)
    }

    fn dispatch_virtual(
        &mut self,
        static_owner: Name,
        receiver: Value,
        method: Name,
        params: &[TypeRef],
        args: &[Value],
    ) -> EvalResult {
        let runtime = self.runtime;
        let interner = runtime.interner();
        let describe = || MethodRef::new(static_owner, method, params.iter().copied());

        let Some(runtime_type) = receiver.runtime_type() else {
            return Err(null_receiver(&describe().display(interner).to_string()));
        };

        let private = runtime
            .lookup_class(static_owner)
            .and_then(|c| c.find_method(method, params))
            .filter(|def| def.access == Access::Private && !def.is_static);
        if let Some(def) = private {
            return self.run_method(static_owner, def, Some(receiver), args);
        }

        match runtime.resolve_method(runtime_type.base(), method, params) {
            Some((owner, def)) if !def.is_static => self.run_method(owner, def, Some(receiver), args),
            _ => Err(no_such_method(&describe().display(interner).to_string())),
        }
    }

    fn call_host_static(&mut self, method: &MethodRef, args: &[Value]) -> EvalResult {
        let runtime = self.runtime;
        let interner = runtime.interner();
        let Some(native) = runtime.natives().get(method) else {
            return Err(no_such_method(&method.display(interner).to_string()));
        };
        native(&NativeCall {
            interner,
            execution: self.execution,
            receiver: None,
            args,
        })
    }

    /// Run `def`, declared in `owner`, with a receiver for instance methods.
    fn run_method(
        &mut self,
        owner: Name,
        def: &MethodDef,
        receiver: Option<Value>,
        args: &[Value],
    ) -> EvalResult {
        let runtime = self.runtime;
        let interner = runtime.interner();
        let frame = def.method_ref(owner);

        if args.len() != def.sig.params.len() {
            return Err(arity_mismatch(
                &frame.display(interner).to_string(),
                def.sig.params.len(),
                args.len(),
            ));
        }
        if !def.is_static && receiver.as_ref().map_or(true, Value::is_null) {
            return Err(null_receiver(&frame.display(interner).to_string()));
        }

        match &def.body {
            MethodBody::Native => {
                let Some(native) = runtime.natives().get(&frame) else {
                    return Err(missing_native(&frame.display(interner).to_string()));
                };
                native(&NativeCall {
                    interner,
                    execution: self.execution,
                    receiver: receiver.as_ref(),
                    args,
                })
            }
            MethodBody::Abstract => Err(abstract_method(&frame.display(interner).to_string())),
            MethodBody::Code { locals, instrs } => {
                tracing::trace!(method = %frame.display(interner), depth = self.stack.depth(), "enter");
                self.stack
                    .push(frame)
                    .map_err(|e| self.stack.attach_backtrace(e, interner))?;
                let result = tm_stack::ensure_sufficient_stack(|| {
                    self.exec_code(*locals, instrs, receiver, args)
                });
                let result = result.map_err(|e| self.stack.attach_backtrace(e, interner));
                self.stack.pop();
                result
            }
        }
    }

    fn exec_code(
        &mut self,
        locals: u32,
        instrs: &[Instr],
        receiver: Option<Value>,
        args: &[Value],
    ) -> EvalResult {
        let runtime = self.runtime;
        let interner = runtime.interner();
        let mut regs = Registers::new(locals, receiver, args)?;

        for instr in instrs {
            match instr {
                Instr::Const { dst, value } => {
                    let value = match *value {
                        Literal::Null => Value::Null,
                        Literal::Bool(b) => Value::Bool(b),
                        Literal::Int(n) => Value::Int(n),
                        Literal::Str(s) => Value::string(interner.lookup(s)),
                    };
                    regs.set(*dst, value)?;
                }
                Instr::Move { dst, src } => {
                    let value = regs.get(*src)?.clone();
                    regs.set(*dst, value)?;
                }
                Instr::Concat { dst, parts } => {
                    let mut text = String::new();
                    for part in parts {
                        text.push_str(&regs.get(*part)?.to_text(interner));
                    }
                    regs.set(*dst, Value::string(text))?;
                }
                Instr::GetField { dst, object, field } => {
                    let target = regs.get(*object)?;
                    let Some(obj) = target.as_object() else {
                        return Err(null_receiver(&format!(".{}", interner.lookup(*field))));
                    };
                    let value = obj.get_field(*field);
                    regs.set(*dst, value)?;
                }
                Instr::SetField {
                    object,
                    field,
                    value,
                } => {
                    let Some(obj) = regs.get(*object)?.as_object() else {
                        return Err(null_receiver(&format!(".{}", interner.lookup(*field))));
                    };
                    obj.set_field(*field, regs.get(*value)?.clone());
                }
                Instr::Call(call) => {
                    let result = self.invoke(call, &regs)?;
                    if let Some(dst) = call.dst {
                        regs.set(dst, result)?;
                    }
                }
                Instr::MockCall(mocked) => {
                    let result = self.dispatch_mock(mocked, &regs)?;
                    if let Some(dst) = mocked.call.dst {
                        regs.set(dst, result)?;
                    }
                }
                Instr::Throw { value } => {
                    let value = regs.get(*value)?.clone();
                    return Err(self.throw(value));
                }
                Instr::Return { value } => {
                    return match value {
                        Some(var) => Ok(regs.get(*var)?.clone()),
                        None => Ok(Value::Void),
                    };
                }
            }
        }
        Ok(Value::Void)
    }

    /// Perform an original (unsubstituted) invocation.
    fn invoke(&mut self, call: &Invocation, regs: &Registers) -> EvalResult {
        let args = regs.collect(&call.args)?;
        match call.kind {
            InvokeKind::Instance => {
                let receiver = match call.receiver {
                    Some(var) => regs.get(var)?.clone(),
                    None => Value::Null,
                };
                self.dispatch_virtual(
                    call.owner.base(),
                    receiver,
                    call.method,
                    &call.sig.params,
                    &args,
                )
            }
            InvokeKind::Static => {
                self.invoke_static(call.owner.base(), call.method, &call.sig.params, &args)
            }
            InvokeKind::Construct => self.construct(call.owner.base(), &call.sig.params, &args),
        }
    }

    fn throw(&self, value: Value) -> EvalError {
        let interner = self.runtime.interner();
        let message = match &value {
            Value::Null => return null_receiver("throw"),
            Value::Object(obj) => {
                let class = interner.lookup(obj.class());
                match obj.get_field(Name::MESSAGE) {
                    Value::Null => class.to_owned(),
                    msg => format!("{class}: {}", msg.to_text(interner)),
                }
            }
            other => other.to_text(interner),
        };
        thrown(value, message)
    }
}

/// Register file of one frame.
struct Registers {
    slots: Vec<Value>,
}

impl Registers {
    fn new(locals: u32, receiver: Option<Value>, args: &[Value]) -> Result<Self, EvalError> {
        let mut slots = vec![Value::Null; locals as usize];
        let first_arg = usize::from(receiver.is_some());
        if slots.len() < first_arg + args.len() {
            return Err(EvalError::new(format!(
                "{locals} locals cannot hold {} arguments",
                first_arg + args.len()
            )));
        }
        if let Some(receiver) = receiver {
            slots[0] = receiver;
        }
        for (slot, arg) in slots[first_arg..].iter_mut().zip(args) {
            *slot = arg.clone();
        }
        Ok(Self { slots })
    }

    fn get(&self, var: VarId) -> Result<&Value, EvalError> {
        self.slots
            .get(var.index())
            .ok_or_else(|| out_of_range(var, self.slots.len()))
    }

    fn set(&mut self, var: VarId, value: Value) -> Result<(), EvalError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(var.index())
            .ok_or_else(|| out_of_range(var, len))?;
        *slot = value;
        Ok(())
    }

    fn collect(&self, vars: &[VarId]) -> Result<SmallVec<[Value; 4]>, EvalError> {
        vars.iter().map(|v| self.get(*v).cloned()).collect()
    }
}

fn out_of_range(var: VarId, len: usize) -> EvalError {
    EvalError::new(format!("register r{} out of range ({len} locals)", var.raw()))
}

//! Reference constant evaluator
//!
//! A tree-walking interpreter over the AST supporting:
//! - integer, boolean and string arithmetic and comparison
//! - locals, parameters and variables with initializers
//! - free function and method calls, with `this` written back to the caller
//! - record construction (default member initializers, constructor
//!   initializer lists and bodies)
//! - reflections, queries, fragment closures and `__compiler_error`
//! - injection statements, which append to the effect list
//! - recursion depth and step limits

use super::{
    ConstValue, ConstantEvaluator, EvalError, EvalOutcome, InjectionEffect, StructValue,
};
use crate::frontend::ast::{
    AstContext, BinaryOp, DeclId, DeclKind, Expr, ExprKind, MethodData, Stmt, StmtKind, Type,
    UnaryOp,
};
use crate::frontend::reflect::{evaluate_query, Reflection, ReflectionQuery};
use crate::util::config::EvalConfig;
use crate::util::span::Span;
use std::collections::HashMap;

/// Evaluation limits and counters
#[derive(Debug, Clone)]
pub struct ConstEvalEnv {
    /// Current call depth
    recursion_depth: usize,
    /// Maximum call depth
    max_depth: usize,
    /// Expressions and statements evaluated so far
    steps: u64,
    /// Maximum number of steps
    max_steps: u64,
}

impl ConstEvalEnv {
    pub fn new() -> Self {
        ConstEvalEnv {
            recursion_depth: 0,
            max_depth: 512,
            steps: 0,
            max_steps: 1_000_000,
        }
    }

    /// Set the maximum call depth
    pub fn with_max_depth(
        mut self,
        max_depth: usize,
    ) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the step limit
    pub fn with_max_steps(
        mut self,
        max_steps: u64,
    ) -> Self {
        self.max_steps = max_steps;
        self
    }

    fn inc_depth(
        &mut self,
        span: Span,
    ) -> Result<(), EvalError> {
        self.recursion_depth += 1;
        if self.recursion_depth > self.max_depth {
            Err(EvalError::RecursionTooDeep {
                depth: self.recursion_depth,
                max_depth: self.max_depth,
                span,
            })
        } else {
            Ok(())
        }
    }

    fn dec_depth(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    fn step(
        &mut self,
        span: Span,
    ) -> Result<(), EvalError> {
        self.steps += 1;
        if self.steps > self.max_steps {
            Err(EvalError::StepLimit {
                limit: self.max_steps,
                span,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for ConstEvalEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Tree-walking interpreter
#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    env: ConstEvalEnv,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(env: ConstEvalEnv) -> Self {
        Interpreter { env }
    }

    pub fn from_config(config: &EvalConfig) -> Self {
        Self::with_env(
            ConstEvalEnv::new()
                .with_max_depth(config.max_depth)
                .with_max_steps(config.max_steps),
        )
    }
}

impl ConstantEvaluator for Interpreter {
    fn evaluate(
        &self,
        ast: &AstContext,
        expr: &Expr,
    ) -> EvalOutcome {
        let mut machine = Machine::new(ast, self.env.clone());
        let result = machine.eval(expr);
        tracing::trace!(
            steps = machine.env.steps,
            effects = machine.effects.len(),
            ok = result.is_ok(),
            "constant evaluation finished"
        );
        match result {
            Ok(value) => EvalOutcome {
                value: Some(value),
                notes: Vec::new(),
                effects: machine.effects,
            },
            Err(err) => EvalOutcome {
                value: None,
                notes: vec![err.into_note()],
                effects: machine.effects,
            },
        }
    }
}

#[derive(Debug, Default)]
struct Frame {
    locals: HashMap<DeclId, ConstValue>,
    this: Option<ConstValue>,
}

enum Flow {
    Normal,
    Return(ConstValue),
}

/// Storage location an assignment writes to
enum Root {
    Local(DeclId),
    This,
}

struct Place {
    root: Root,
    path: Vec<usize>,
}

struct Machine<'a> {
    ast: &'a AstContext,
    env: ConstEvalEnv,
    frames: Vec<Frame>,
    effects: Vec<InjectionEffect>,
}

impl<'a> Machine<'a> {
    fn new(
        ast: &'a AstContext,
        env: ConstEvalEnv,
    ) -> Self {
        Self {
            ast,
            env,
            frames: vec![Frame::default()],
            effects: Vec::new(),
        }
    }

    fn frame(&self) -> &Frame {
        // the bottom frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    fn frame_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn name_of(
        &self,
        decl: DeclId,
    ) -> String {
        format!("'{}'", self.ast.decl(decl).name)
    }

    fn not_constant(
        what: impl Into<String>,
        span: Span,
    ) -> EvalError {
        EvalError::NotConstant {
            what: what.into(),
            span,
        }
    }

    fn mismatch(
        expected: &str,
        found: &ConstValue,
        span: Span,
    ) -> EvalError {
        EvalError::TypeMismatch {
            expected: expected.to_string(),
            found: found.type_name().to_string(),
            span,
        }
    }

    fn eval(
        &mut self,
        expr: &Expr,
    ) -> Result<ConstValue, EvalError> {
        self.env.step(expr.span)?;
        let span = expr.span;
        match &expr.kind {
            ExprKind::IntLit(v) => Ok(ConstValue::Int(*v)),
            ExprKind::BoolLit(b) => Ok(ConstValue::Bool(*b)),
            ExprKind::StrLit(s) => Ok(ConstValue::Str(s.clone())),
            ExprKind::Constant(value) => Ok((**value).clone()),
            ExprKind::Reflect(r) => Ok(ConstValue::Reflection((**r).clone())),
            ExprKind::LValueToRValue(inner) => self.eval(inner),
            ExprKind::DeclRef(d) => self.eval_decl_ref(*d, span),
            ExprKind::This => self
                .frame()
                .this
                .clone()
                .ok_or_else(|| Self::not_constant("'this'", span)),
            ExprKind::Member { base, member } => self.eval_member(base, *member, span),
            ExprKind::DependentMember { name, .. } => {
                Err(Self::not_constant(format!("unresolved member '{}'", name), span))
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                self.eval_unary(*op, &value, span)
            }
            ExprKind::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs, span),
            ExprKind::Assign { target, value } => {
                let value = self.eval(value)?;
                let place = self.place_of(target)?;
                self.store(&place, value.clone(), span)?;
                Ok(value)
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args, span),
            ExprKind::Construct { record, ctor, args } => {
                let args = args
                    .iter()
                    .map(|a| self.eval(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.construct(*record, *ctor, args, span)
            }
            ExprKind::InvalidReflection(message) => {
                let message = self.eval(message)?;
                match message {
                    ConstValue::Str(m) => Ok(ConstValue::Reflection(Reflection::invalid(m))),
                    other => Err(Self::mismatch("string", &other, span)),
                }
            }
            ExprKind::CompilerError(message) => {
                let message = self.eval(message)?;
                Err(EvalError::UserError {
                    message: message.to_string(),
                    span,
                })
            }
            ExprKind::Concatenate(parts) => {
                let mut text = String::new();
                for part in parts {
                    let value = self.eval(part)?;
                    match &value {
                        ConstValue::Reflection(r) => {
                            let name = evaluate_query(self.ast, ReflectionQuery::GetName, r)
                                .map_err(|source| EvalError::Query { source, span })?;
                            text.push_str(&name.to_string());
                        }
                        ConstValue::Str(_) | ConstValue::Int(_) | ConstValue::Bool(_) => {
                            text.push_str(&value.to_string())
                        }
                        other => return Err(Self::mismatch("string", other, span)),
                    }
                }
                Ok(ConstValue::Str(text))
            }
            ExprKind::Query { query, operand } => {
                let value = self.eval(operand)?;
                let reflection = value
                    .as_reflection()
                    .ok_or_else(|| Self::mismatch("meta::info", &value, span))?;
                evaluate_query(self.ast, *query, reflection)
                    .map_err(|source| EvalError::Query { source, span })
            }
            ExprKind::Splice(_) => Err(Self::not_constant("unresolved splice", span)),
            ExprKind::Fragment(fragment) => match &fragment.init {
                Some(init) => self.eval(init),
                None => Err(Self::not_constant("dependent fragment", span)),
            },
        }
    }

    fn eval_decl_ref(
        &mut self,
        d: DeclId,
        span: Span,
    ) -> Result<ConstValue, EvalError> {
        if let Some(value) = self.frame().locals.get(&d) {
            if value.is_uninit() {
                return Err(EvalError::Uninitialized { span });
            }
            return Ok(value.clone());
        }
        let ast = self.ast;
        match ast.kind(d) {
            DeclKind::Var(var) => {
                let in_fragment = ast
                    .parent(d)
                    .map(|p| matches!(ast.kind(p), DeclKind::Fragment(_)))
                    .unwrap_or(false);
                if in_fragment {
                    return Err(Self::not_constant(
                        format!("placeholder {}", self.name_of(d)),
                        span,
                    ));
                }
                match &var.init {
                    Some(init) => {
                        self.env.inc_depth(span)?;
                        self.frames.push(Frame::default());
                        let result = self.eval(init);
                        self.frames.pop();
                        self.env.dec_depth();
                        result
                    }
                    None => Err(EvalError::Uninitialized { span }),
                }
            }
            DeclKind::Field(_) => {
                let this = Expr::new(ExprKind::This, Type::Dependent, span);
                self.eval_member(&this, d, span)
            }
            _ => Err(Self::not_constant(self.name_of(d), span)),
        }
    }

    fn eval_member(
        &mut self,
        base: &Expr,
        member: DeclId,
        span: Span,
    ) -> Result<ConstValue, EvalError> {
        let ast = self.ast;
        match ast.kind(member) {
            DeclKind::Field(_) => {
                let object = self.eval(base)?;
                let index = self
                    .ast
                    .field_index(member)
                    .ok_or_else(|| Self::not_constant(self.name_of(member), span))?;
                let value = object
                    .field(index)
                    .ok_or_else(|| Self::mismatch("object", &object, span))?;
                if value.is_uninit() {
                    return Err(EvalError::Uninitialized { span });
                }
                Ok(value.clone())
            }
            DeclKind::Var(_) => self.eval_decl_ref(member, span),
            _ => Err(Self::not_constant(self.name_of(member), span)),
        }
    }

    fn eval_unary(
        &self,
        op: UnaryOp,
        value: &ConstValue,
        span: Span,
    ) -> Result<ConstValue, EvalError> {
        match op {
            UnaryOp::Neg => {
                let v = value
                    .as_int()
                    .ok_or_else(|| Self::mismatch("int", value, span))?;
                v.checked_neg()
                    .map(ConstValue::Int)
                    .ok_or_else(|| EvalError::Overflow {
                        op: "negation".to_string(),
                        span,
                    })
            }
            UnaryOp::Not => value
                .as_bool()
                .map(|b| ConstValue::Bool(!b))
                .ok_or_else(|| Self::mismatch("bool", value, span)),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
    ) -> Result<ConstValue, EvalError> {
        let left = self.eval(lhs)?;
        if op.is_logical() {
            let l = left
                .as_bool()
                .ok_or_else(|| Self::mismatch("bool", &left, span))?;
            // short-circuit
            if (op == BinaryOp::And && !l) || (op == BinaryOp::Or && l) {
                return Ok(ConstValue::Bool(l));
            }
            let right = self.eval(rhs)?;
            return right
                .as_bool()
                .map(ConstValue::Bool)
                .ok_or_else(|| Self::mismatch("bool", &right, span));
        }

        let right = self.eval(rhs)?;
        match op {
            BinaryOp::Eq => return Ok(ConstValue::Bool(left.equals(&right, self.ast))),
            BinaryOp::Ne => return Ok(ConstValue::Bool(!left.equals(&right, self.ast))),
            _ => {}
        }

        let l = left
            .as_int()
            .ok_or_else(|| Self::mismatch("int", &left, span))?;
        let r = right
            .as_int()
            .ok_or_else(|| Self::mismatch("int", &right, span))?;
        let overflow = |name: &str| EvalError::Overflow {
            op: name.to_string(),
            span,
        };
        match op {
            BinaryOp::Add => l
                .checked_add(r)
                .map(ConstValue::Int)
                .ok_or_else(|| overflow("addition")),
            BinaryOp::Sub => l
                .checked_sub(r)
                .map(ConstValue::Int)
                .ok_or_else(|| overflow("subtraction")),
            BinaryOp::Mul => l
                .checked_mul(r)
                .map(ConstValue::Int)
                .ok_or_else(|| overflow("multiplication")),
            BinaryOp::Div | BinaryOp::Rem if r == 0 => Err(EvalError::DivisionByZero { span }),
            BinaryOp::Div => l
                .checked_div(r)
                .map(ConstValue::Int)
                .ok_or_else(|| overflow("division")),
            BinaryOp::Rem => l
                .checked_rem(r)
                .map(ConstValue::Int)
                .ok_or_else(|| overflow("remainder")),
            BinaryOp::Lt => Ok(ConstValue::Bool(l < r)),
            BinaryOp::Le => Ok(ConstValue::Bool(l <= r)),
            BinaryOp::Gt => Ok(ConstValue::Bool(l > r)),
            BinaryOp::Ge => Ok(ConstValue::Bool(l >= r)),
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::And | BinaryOp::Or => {
                Err(Self::not_constant("operator", span))
            }
        }
    }

    fn place_of(
        &self,
        target: &Expr,
    ) -> Result<Place, EvalError> {
        match &target.kind {
            ExprKind::DeclRef(d) => match self.ast.kind(*d) {
                DeclKind::Field(_) => {
                    let index = self
                        .ast
                        .field_index(*d)
                        .ok_or_else(|| Self::not_constant(self.name_of(*d), target.span))?;
                    Ok(Place {
                        root: Root::This,
                        path: vec![index],
                    })
                }
                _ if self.frame().locals.contains_key(d) => Ok(Place {
                    root: Root::Local(*d),
                    path: Vec::new(),
                }),
                _ => Err(Self::not_constant(
                    format!("assignment to {}", self.name_of(*d)),
                    target.span,
                )),
            },
            ExprKind::This => Ok(Place {
                root: Root::This,
                path: Vec::new(),
            }),
            ExprKind::LValueToRValue(inner) => self.place_of(inner),
            ExprKind::Member { base, member } => {
                let mut place = self.place_of(base)?;
                let index = self
                    .ast
                    .field_index(*member)
                    .ok_or_else(|| Self::not_constant(self.name_of(*member), target.span))?;
                place.path.push(index);
                Ok(place)
            }
            _ => Err(Self::not_constant("assignment target", target.span)),
        }
    }

    fn store(
        &mut self,
        place: &Place,
        value: ConstValue,
        span: Span,
    ) -> Result<(), EvalError> {
        let frame = self.frame_mut();
        let mut slot = match place.root {
            Root::Local(d) => frame.locals.get_mut(&d),
            Root::This => frame.this.as_mut(),
        }
        .ok_or_else(|| Self::not_constant("assignment target", span))?;
        for index in &place.path {
            slot = match slot {
                ConstValue::Struct(StructValue { fields, .. }) => fields
                    .get_mut(*index)
                    .ok_or_else(|| Self::not_constant("field", span))?,
                _ => return Err(Self::not_constant("member of a non-object", span)),
            };
        }
        *slot = value;
        Ok(())
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
    ) -> Result<ConstValue, EvalError> {
        let arg_values = args
            .iter()
            .map(|a| self.eval(a))
            .collect::<Result<Vec<_>, _>>()?;

        match &callee.kind {
            ExprKind::DeclRef(f) => {
                let (value, _) = self.call(*f, None, arg_values, span)?;
                Ok(value)
            }
            ExprKind::Member { base, member } => {
                let is_static =
                    matches!(self.ast.kind(*member), DeclKind::Method(m) if m.is_static());
                if is_static {
                    let (value, _) = self.call(*member, None, arg_values, span)?;
                    return Ok(value);
                }
                let object = self.eval(base)?;
                let (value, this) = self.call(*member, Some(object), arg_values, span)?;
                // write the callee's view of `this` back into a named object
                if let (Ok(place), Some(this)) = (self.place_of(base), this) {
                    self.store(&place, this, span)?;
                }
                Ok(value)
            }
            ExprKind::LValueToRValue(inner) => self.eval_call(inner, args, span),
            _ => Err(Self::not_constant("call target", span)),
        }
    }

    fn call(
        &mut self,
        function: DeclId,
        this: Option<ConstValue>,
        args: Vec<ConstValue>,
        span: Span,
    ) -> Result<(ConstValue, Option<ConstValue>), EvalError> {
        let ast = self.ast;
        let data = ast
            .kind(function)
            .function()
            .ok_or_else(|| Self::not_constant(self.name_of(function), span))?;
        let body = data.body.as_ref().ok_or_else(|| {
            Self::not_constant(format!("undefined function {}", self.name_of(function)), span)
        })?;

        let mut frame = Frame {
            locals: HashMap::new(),
            this,
        };
        let mut args = args.into_iter();
        for param in &data.params {
            let value = match args.next() {
                Some(v) => v,
                None => match ast.kind(*param) {
                    DeclKind::Param(p) => match &p.default {
                        Some(default) => self.eval(default)?,
                        None => {
                            return Err(Self::not_constant(
                                format!("missing argument for {}", self.name_of(*param)),
                                span,
                            ))
                        }
                    },
                    _ => ConstValue::Uninit,
                },
            };
            frame.locals.insert(*param, value);
        }

        self.env.inc_depth(span)?;
        self.frames.push(frame);
        let flow = self.exec(body);
        let frame = self.frames.pop().unwrap_or_default();
        self.env.dec_depth();

        let value = match flow? {
            Flow::Return(v) => v,
            Flow::Normal => ConstValue::Void,
        };
        Ok((value, frame.this))
    }

    /// Default-initialize storage of type `ty`
    fn default_value(
        &mut self,
        ty: &Type,
        span: Span,
    ) -> Result<ConstValue, EvalError> {
        let ast = self.ast;
        let ty = ast.canonical_type(ty);
        let record = match ty.unqualified() {
            Type::Record(r) => *r,
            _ => return Ok(ConstValue::Uninit),
        };
        let ctor = ast.constructors(record).into_iter().find(|c| {
            ast.kind(*c)
                .function()
                .map(|f| f.params.is_empty())
                .unwrap_or(false)
        });
        self.construct(record, ctor, Vec::new(), span)
    }

    fn construct(
        &mut self,
        record: DeclId,
        ctor: Option<DeclId>,
        args: Vec<ConstValue>,
        span: Span,
    ) -> Result<ConstValue, EvalError> {
        let ast = self.ast;
        let fields = ast.fields(record);
        let object = ConstValue::Struct(StructValue {
            record,
            fields: vec![ConstValue::Uninit; fields.len()],
        });

        let ctor_data = ctor.and_then(|c| match ast.kind(c) {
            DeclKind::Method(m) => Some(m),
            _ => None,
        });

        let mut frame = Frame {
            locals: HashMap::new(),
            this: Some(object),
        };
        let mut aggregate = Vec::new();
        match ctor_data {
            Some(m) => {
                for (param, value) in m.function.params.iter().zip(args) {
                    frame.locals.insert(*param, value);
                }
            }
            None => aggregate = args,
        }

        self.env.inc_depth(span)?;
        self.frames.push(frame);
        let result = self.run_constructor(&fields, ctor_data, aggregate, span);
        let frame = self.frames.pop().unwrap_or_default();
        self.env.dec_depth();
        result?;

        frame
            .this
            .ok_or_else(|| Self::not_constant("object under construction", span))
    }

    fn run_constructor(
        &mut self,
        fields: &[DeclId],
        ctor: Option<&MethodData>,
        aggregate: Vec<ConstValue>,
        span: Span,
    ) -> Result<(), EvalError> {
        let ast = self.ast;
        let mut aggregate = aggregate.into_iter();
        for (index, field) in fields.iter().enumerate() {
            let member_init = ctor.and_then(|m| m.ctor_inits.iter().find(|i| i.field == *field));
            let value = match (member_init, aggregate.next()) {
                (Some(init), _) => self.eval(&init.init)?,
                (None, Some(value)) => value,
                (None, None) => match ast.kind(*field) {
                    DeclKind::Field(f) => match &f.init {
                        Some(init) => self.eval(init)?,
                        None => self.default_value(&f.ty, span)?,
                    },
                    _ => ConstValue::Uninit,
                },
            };
            let place = Place {
                root: Root::This,
                path: vec![index],
            };
            self.store(&place, value, span)?;
        }
        if let Some(body) = ctor.and_then(|m| m.function.body.as_ref()) {
            self.exec(body)?;
        }
        Ok(())
    }

    fn exec(
        &mut self,
        stmt: &Stmt,
    ) -> Result<Flow, EvalError> {
        self.env.step(stmt.span)?;
        match &stmt.kind {
            StmtKind::Compound(stmts) => {
                for s in stmts {
                    if let Flow::Return(v) = self.exec(s)? {
                        return Ok(Flow::Return(v));
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Expr(e) => {
                self.eval(e)?;
                Ok(Flow::Normal)
            }
            StmtKind::Decl(d) => {
                let ast = self.ast;
                if let DeclKind::Var(var) = ast.kind(*d) {
                    let value = match &var.init {
                        Some(init) => self.eval(init)?,
                        None => self.default_value(&var.ty, stmt.span)?,
                    };
                    self.frame_mut().locals.insert(*d, value);
                }
                Ok(Flow::Normal)
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(e) => self.eval(e)?,
                    None => ConstValue::Void,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let c = self.eval(cond)?;
                let c = c.as_bool().ok_or_else(|| Self::mismatch("bool", &c, cond.span))?;
                if c {
                    self.exec(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::While { cond, body } => loop {
                let c = self.eval(cond)?;
                let c = c.as_bool().ok_or_else(|| Self::mismatch("bool", &c, cond.span))?;
                if !c {
                    return Ok(Flow::Normal);
                }
                if let Flow::Return(v) = self.exec(body)? {
                    return Ok(Flow::Return(v));
                }
            },
            StmtKind::Inject(operand) => {
                let value = self.eval(operand)?;
                tracing::trace!(ty = ?operand.ty, "injection effect recorded");
                self.effects.push(InjectionEffect {
                    ty: operand.ty.clone(),
                    value,
                    span: stmt.span,
                });
                Ok(Flow::Normal)
            }
            StmtKind::Null => Ok(Flow::Normal),
        }
    }
}

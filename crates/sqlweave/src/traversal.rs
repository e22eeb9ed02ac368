//! Tree traversal utilities for SQL expression ASTs.
//!
//! # Traversal
//!
//! Two iterator types are provided:
//! - [`DfsIter`] -- depth-first (pre-order) traversal using a stack.
//! - [`BfsIter`] -- breadth-first (level-order) traversal using a queue.
//!
//! Both are available through the [`ExpressionWalk`] trait methods
//! [`dfs`](ExpressionWalk::dfs) and [`bfs`](ExpressionWalk::bfs), along with
//! search helpers ([`find`](ExpressionWalk::find),
//! [`find_all`](ExpressionWalk::find_all), [`contains`](ExpressionWalk::contains)).
//!
//! # Transformation
//!
//! [`transform`] and [`transform_map`] rebuild a tree bottom-up: children are
//! rewritten first, then the callback sees the rebuilt parent. The input tree is
//! consumed and nothing is shared between the old and new trees.
//!
//! [`Expression::Unparsed`] leaves are terminal. Nothing descends into them,
//! but a transform callback still sees the leaf itself and may replace it.

use std::collections::VecDeque;

use crate::error::Result;
use crate::expressions::*;

/// Depth-first pre-order iterator over an expression tree.
///
/// For a binary expression `a + b`, the iteration order is: `Add`, `a`, `b`.
pub struct DfsIter<'a> {
    stack: Vec<&'a Expression>,
}

impl<'a> DfsIter<'a> {
    pub fn new(root: &'a Expression) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for DfsIter<'a> {
    type Item = &'a Expression;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.stack.pop()?;
        // Reverse so children come out left to right
        self.stack.extend(children_of(expr).into_iter().rev());
        Some(expr)
    }
}

/// Level-order breadth-first iterator over an expression tree.
///
/// For `(a + b) = c` the order is `Eq`, `Paren`, `c`, `Add`, `a`, `b`.
pub struct BfsIter<'a> {
    queue: VecDeque<&'a Expression>,
}

impl<'a> BfsIter<'a> {
    pub fn new(root: &'a Expression) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(root);
        Self { queue }
    }
}

impl<'a> Iterator for BfsIter<'a> {
    type Item = &'a Expression;

    fn next(&mut self) -> Option<Self::Item> {
        let expr = self.queue.pop_front()?;
        self.queue.extend(children_of(expr));
        Some(expr)
    }
}

/// Extension trait that adds traversal and search methods to [`Expression`].
pub trait ExpressionWalk {
    /// Depth-first (pre-order) iterator over this expression and all descendants.
    fn dfs(&self) -> DfsIter<'_>;

    /// Breadth-first (level-order) iterator over this expression and all descendants.
    fn bfs(&self) -> BfsIter<'_>;

    /// First expression matching `predicate` in depth-first order.
    fn find<F>(&self, predicate: F) -> Option<&Expression>
    where
        F: Fn(&Expression) -> bool;

    /// All expressions matching `predicate` in depth-first order.
    fn find_all<F>(&self, predicate: F) -> Vec<&Expression>
    where
        F: Fn(&Expression) -> bool;

    fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Expression) -> bool;

    /// Direct child expressions, in source order.
    fn children(&self) -> Vec<&Expression>;

    /// A leaf has depth 0.
    fn tree_depth(&self) -> usize;

    /// Owned variant of [`transform`].
    fn transform_owned<F>(self, fun: F) -> Result<Expression>
    where
        F: Fn(Expression) -> Result<Option<Expression>>,
        Self: Sized;
}

impl ExpressionWalk for Expression {
    fn dfs(&self) -> DfsIter<'_> {
        DfsIter::new(self)
    }

    fn bfs(&self) -> BfsIter<'_> {
        BfsIter::new(self)
    }

    fn find<F>(&self, predicate: F) -> Option<&Expression>
    where
        F: Fn(&Expression) -> bool,
    {
        self.dfs().find(|e| predicate(e))
    }

    fn find_all<F>(&self, predicate: F) -> Vec<&Expression>
    where
        F: Fn(&Expression) -> bool,
    {
        self.dfs().filter(|e| predicate(e)).collect()
    }

    fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Expression) -> bool,
    {
        self.dfs().any(|e| predicate(e))
    }

    fn children(&self) -> Vec<&Expression> {
        children_of(self)
    }

    fn tree_depth(&self) -> usize {
        children_of(self)
            .into_iter()
            .map(|c| c.tree_depth() + 1)
            .max()
            .unwrap_or(0)
    }

    fn transform_owned<F>(self, fun: F) -> Result<Expression>
    where
        F: Fn(Expression) -> Result<Option<Expression>>,
    {
        transform(self, &fun)
    }
}

/// Transforms an expression tree bottom-up, with optional node removal.
///
/// If `fun` returns `Ok(None)`, the node is replaced with `NULL`.
///
/// # Example
///
/// ```rust
/// use sqlweave::expressions::Expression;
/// use sqlweave::traversal::transform;
///
/// let expr = sqlweave::parse_expression("(a) + 1", "generic").unwrap();
/// let result = transform(expr, &|e| match e {
///     Expression::Paren(p) => Ok(Some(p.this)),
///     other => Ok(Some(other)),
/// })
/// .unwrap();
/// assert_eq!(result.sql(), "a + 1");
/// ```
pub fn transform<F>(expr: Expression, fun: &F) -> Result<Expression>
where
    F: Fn(Expression) -> Result<Option<Expression>>,
{
    transform_map(expr, &|e| match fun(e)? {
        Some(transformed) => Ok(transformed),
        None => Ok(Expression::Null(Null)),
    })
}

/// Transforms an expression tree bottom-up without node removal.
///
/// ```rust
/// use sqlweave::expressions::Expression;
/// use sqlweave::traversal::transform_map;
///
/// let expr = sqlweave::parse_expression("a + b", "generic").unwrap();
/// let result = transform_map(expr, &|e| match e {
///     Expression::Column(mut c) => {
///         c.name.name = c.name.name.to_uppercase();
///         Ok(Expression::Column(c))
///     }
///     other => Ok(other),
/// })
/// .unwrap();
/// assert_eq!(result.sql(), "A + B");
/// ```
pub fn transform_map<F>(expr: Expression, fun: &F) -> Result<Expression>
where
    F: Fn(Expression) -> Result<Expression>,
{
    let rebuilt = map_children(expr, &mut |child| transform_map(child, fun))?;
    fun(rebuilt)
}

/// Replace every node structurally equal to `target` with a copy of `replacement`.
///
/// Matching is top-down: once a node is replaced, its original children are
/// not visited.
pub fn replace_nodes(expr: Expression, target: &Expression, replacement: &Expression) -> Result<Expression> {
    if &expr == target {
        return Ok(replacement.clone());
    }
    map_children(expr, &mut |child| replace_nodes(child, target, replacement))
}

// ---------------------------------------------------------------------------
// Common expression predicates
// ---------------------------------------------------------------------------

pub fn is_column(expr: &Expression) -> bool {
    matches!(expr, Expression::Column(_))
}

/// Number, string, boolean or NULL.
pub fn is_literal(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::Literal(_) | Expression::Boolean(_) | Expression::Null(_)
    )
}

pub fn is_subquery(expr: &Expression) -> bool {
    matches!(expr, Expression::Subquery(_))
}

pub fn is_select(expr: &Expression) -> bool {
    matches!(expr, Expression::Select(_))
}

pub fn is_unparsed(expr: &Expression) -> bool {
    matches!(expr, Expression::Unparsed(_))
}

// ---------------------------------------------------------------------------
// Child enumeration
// ---------------------------------------------------------------------------

fn push_opt<'a>(out: &mut Vec<&'a Expression>, slot: &'a Option<Expression>) {
    if let Some(e) = slot {
        out.push(e);
    }
}

fn push_table<'a>(out: &mut Vec<&'a Expression>, table: &'a TableRef) {
    if let Some(sample) = &table.sample {
        push_opt(out, &sample.size);
        if let Some(bucket) = &sample.bucket {
            out.push(&bucket.numerator);
            out.push(&bucket.denominator);
            push_opt(out, &bucket.field);
        }
        push_opt(out, &sample.seed);
    }
}

fn push_column_def<'a>(out: &mut Vec<&'a Expression>, def: &'a ColumnDef) {
    for constraint in &def.constraints {
        if let ColumnConstraint::Default(e) = constraint {
            out.push(e);
        }
    }
}

fn push_properties<'a>(out: &mut Vec<&'a Expression>, properties: &'a [Property]) {
    for property in properties {
        match property {
            Property::PartitionedBy(exprs) => out.extend(exprs),
            Property::Generic { value, .. } => out.push(value),
            Property::FileFormat(_) | Property::Location(_) | Property::Comment(_) => {}
        }
    }
}

fn push_bound<'a>(out: &mut Vec<&'a Expression>, bound: &'a FrameBound) {
    if let FrameBound::Preceding(e) | FrameBound::Following(e) = bound {
        out.push(e);
    }
}

/// Direct children of `expr` in source order.
pub fn children_of(expr: &Expression) -> Vec<&Expression> {
    let mut out: Vec<&Expression> = Vec::new();
    match expr {
        Expression::Literal(_)
        | Expression::Boolean(_)
        | Expression::Null(_)
        | Expression::Identifier(_)
        | Expression::Column(_)
        | Expression::Star(_)
        | Expression::Var(_)
        | Expression::Placeholder(_)
        | Expression::Parameter(_)
        | Expression::Unparsed(_)
        | Expression::Drop(_)
        | Expression::Use(_)
        | Expression::Command(_)
        | Expression::Rand(_)
        | Expression::CurrentDate(_)
        | Expression::CurrentTimestamp(_) => {}

        Expression::Dot(d) => out.push(&d.this),
        Expression::Table(t) => push_table(&mut out, t),
        Expression::DataType(dt) => {
            out.extend(&dt.params);
            out.extend(&dt.nested);
        }
        Expression::Interval(i) => out.push(&i.this),

        Expression::Select(s) => {
            if let Some(with) = &s.with {
                out.extend(with.ctes.iter().map(|c| &c.this));
            }
            if let Some(distinct) = &s.distinct {
                out.extend(&distinct.on);
            }
            out.extend(&s.expressions);
            out.extend(&s.from);
            for join in &s.joins {
                out.push(&join.this);
                push_opt(&mut out, &join.on);
            }
            push_opt(&mut out, &s.where_clause);
            out.extend(&s.group_by);
            push_opt(&mut out, &s.having);
            push_opt(&mut out, &s.qualify);
            out.extend(&s.order_by);
            out.extend(&s.distribute_by);
            out.extend(&s.sort_by);
            out.extend(&s.cluster_by);
            push_opt(&mut out, &s.limit);
            push_opt(&mut out, &s.offset);
        }
        Expression::Union(op) | Expression::Intersect(op) | Expression::Except(op) => {
            out.push(&op.left);
            out.push(&op.right);
            out.extend(&op.order_by);
            push_opt(&mut out, &op.limit);
        }
        Expression::Subquery(s) => out.push(&s.this),
        Expression::Values(v) => out.extend(&v.rows),
        Expression::Tuple(f) | Expression::Coalesce(f) | Expression::Array(f) => {
            out.extend(&f.expressions)
        }

        Expression::Insert(i) => {
            out.extend(&i.partition);
            out.push(&i.query);
        }
        Expression::Update(u) => {
            out.extend(&u.set);
            out.extend(&u.from);
            push_opt(&mut out, &u.where_clause);
        }
        Expression::Delete(d) => push_opt(&mut out, &d.where_clause),
        Expression::Create(c) => {
            for def in &c.columns {
                push_column_def(&mut out, def);
            }
            push_properties(&mut out, &c.properties);
            push_opt(&mut out, &c.expression);
        }
        Expression::Cache(c) => {
            push_properties(&mut out, &c.options);
            push_opt(&mut out, &c.query);
        }

        Expression::Alias(a) => out.push(&a.this),
        Expression::Ordered(o) => out.push(&o.this),
        Expression::Window(w) => {
            out.push(&w.this);
            out.extend(&w.partition_by);
            out.extend(&w.order_by);
            if let Some(frame) = &w.frame {
                push_bound(&mut out, &frame.start);
                if let Some(end) = &frame.end {
                    push_bound(&mut out, end);
                }
            }
        }
        Expression::Filter(f) => {
            out.push(&f.this);
            out.push(&f.condition);
        }
        Expression::Lambda(l) => out.push(&l.body),
        Expression::Unnest(u) => out.extend(&u.expressions),
        Expression::ColumnDef(def) => push_column_def(&mut out, def),
        Expression::Paren(p) => out.push(&p.this),

        Expression::And(b)
        | Expression::Or(b)
        | Expression::Eq(b)
        | Expression::Neq(b)
        | Expression::NullSafeEq(b)
        | Expression::Lt(b)
        | Expression::Lte(b)
        | Expression::Gt(b)
        | Expression::Gte(b)
        | Expression::Is(b)
        | Expression::Like(b)
        | Expression::ILike(b)
        | Expression::Escape(b)
        | Expression::Add(b)
        | Expression::Sub(b)
        | Expression::Mul(b)
        | Expression::Div(b)
        | Expression::IntDiv(b)
        | Expression::Mod(b)
        | Expression::DPipe(b)
        | Expression::Collate(b)
        | Expression::BitwiseAnd(b)
        | Expression::BitwiseOr(b)
        | Expression::BitwiseXor(b)
        | Expression::ShiftLeft(b)
        | Expression::ShiftRight(b) => {
            out.push(&b.left);
            out.push(&b.right);
        }
        Expression::Not(u) | Expression::Neg(u) | Expression::BitwiseNot(u) | Expression::Exists(u) => {
            out.push(&u.this)
        }
        Expression::In(i) => {
            out.push(&i.this);
            out.extend(&i.expressions);
            push_opt(&mut out, &i.query);
        }
        Expression::Between(b) => {
            out.push(&b.this);
            out.push(&b.low);
            out.push(&b.high);
        }
        Expression::Case(c) => {
            push_opt(&mut out, &c.operand);
            for (cond, result) in &c.whens {
                out.push(cond);
                out.push(result);
            }
            push_opt(&mut out, &c.default);
        }
        Expression::If(f) => {
            out.push(&f.condition);
            out.push(&f.true_value);
            push_opt(&mut out, &f.false_value);
        }
        Expression::Cast(c) | Expression::TryCast(c) => out.push(&c.this),
        Expression::Extract(e) => out.push(&e.this),
        Expression::Bracket(b) => {
            out.push(&b.this);
            out.extend(&b.expressions);
        }
        Expression::Map(m) => {
            out.push(&m.keys);
            out.push(&m.values);
        }
        Expression::Function(f) => out.extend(&f.args),

        Expression::Lower(f)
        | Expression::Upper(f)
        | Expression::Length(f)
        | Expression::Initcap(f)
        | Expression::Ln(f)
        | Expression::ApproxDistinct(f)
        | Expression::ArrayAgg(f)
        | Expression::SetAgg(f)
        | Expression::ArraySize(f)
        | Expression::Explode(f)
        | Expression::PosExplode(f)
        | Expression::TsOrDsToDate(f)
        | Expression::UnixToTime(f)
        | Expression::TimeToUnix(f)
        | Expression::Day(f)
        | Expression::Month(f)
        | Expression::Year(f) => out.push(&f.this),

        Expression::Split(f)
        | Expression::RegexpLike(f)
        | Expression::JsonExtract(f)
        | Expression::JsonExtractScalar(f)
        | Expression::Log(f)
        | Expression::Pow(f)
        | Expression::Quantile(f)
        | Expression::ApproxQuantile(f)
        | Expression::ArrayContains(f)
        | Expression::ArrayContainsAll(f) => {
            out.push(&f.this);
            out.push(&f.expression);
        }
        Expression::Substring(s) => {
            out.push(&s.this);
            push_opt(&mut out, &s.start);
            push_opt(&mut out, &s.length);
        }
        Expression::StrPosition(s) => {
            out.push(&s.this);
            out.push(&s.substr);
            push_opt(&mut out, &s.position);
        }
        Expression::GroupConcat(g) => {
            out.push(&g.this);
            push_opt(&mut out, &g.separator);
        }
        Expression::ArraySort(a) => {
            out.push(&a.this);
            push_opt(&mut out, &a.asc);
            push_opt(&mut out, &a.comparator);
        }
        Expression::DateAdd(d)
        | Expression::DateSub(d)
        | Expression::DateDiff(d)
        | Expression::TsOrDsAdd(d) => {
            out.push(&d.this);
            out.push(&d.expression);
        }
        Expression::DateTrunc(d) => out.push(&d.this),
        Expression::StrToTime(f)
        | Expression::StrToDate(f)
        | Expression::StrToUnix(f)
        | Expression::UnixToStr(f)
        | Expression::TimeToStr(f) => {
            out.push(&f.this);
            push_opt(&mut out, &f.format);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Child rebuilding
// ---------------------------------------------------------------------------

type MapFn<'f> = dyn FnMut(Expression) -> Result<Expression> + 'f;

fn map_slot(slot: &mut Expression, f: &mut MapFn<'_>) -> Result<()> {
    let old = std::mem::replace(slot, Expression::Null(Null));
    *slot = f(old)?;
    Ok(())
}

fn map_opt(slot: &mut Option<Expression>, f: &mut MapFn<'_>) -> Result<()> {
    if let Some(old) = slot.take() {
        *slot = Some(f(old)?);
    }
    Ok(())
}

fn map_vec(items: &mut Vec<Expression>, f: &mut MapFn<'_>) -> Result<()> {
    let old = std::mem::take(items);
    *items = old.into_iter().map(&mut *f).collect::<Result<_>>()?;
    Ok(())
}

fn map_table(table: &mut TableRef, f: &mut MapFn<'_>) -> Result<()> {
    if let Some(sample) = &mut table.sample {
        map_opt(&mut sample.size, f)?;
        if let Some(bucket) = &mut sample.bucket {
            map_slot(&mut bucket.numerator, f)?;
            map_slot(&mut bucket.denominator, f)?;
            map_opt(&mut bucket.field, f)?;
        }
        map_opt(&mut sample.seed, f)?;
    }
    Ok(())
}

fn map_column_def(def: &mut ColumnDef, f: &mut MapFn<'_>) -> Result<()> {
    for constraint in &mut def.constraints {
        if let ColumnConstraint::Default(e) = constraint {
            map_slot(e, f)?;
        }
    }
    Ok(())
}

fn map_properties(properties: &mut [Property], f: &mut MapFn<'_>) -> Result<()> {
    for property in properties {
        match property {
            Property::PartitionedBy(exprs) => map_vec(exprs, f)?,
            Property::Generic { value, .. } => map_slot(value, f)?,
            Property::FileFormat(_) | Property::Location(_) | Property::Comment(_) => {}
        }
    }
    Ok(())
}

fn map_bound(bound: &mut FrameBound, f: &mut MapFn<'_>) -> Result<()> {
    if let FrameBound::Preceding(e) | FrameBound::Following(e) = bound {
        map_slot(e, f)?;
    }
    Ok(())
}

/// Rebuild `expr` with each direct child replaced by `f(child)`.
///
/// Children are visited in the same order as [`children_of`] returns them.
pub fn map_children(mut expr: Expression, f: &mut MapFn<'_>) -> Result<Expression> {
    match &mut expr {
        Expression::Literal(_)
        | Expression::Boolean(_)
        | Expression::Null(_)
        | Expression::Identifier(_)
        | Expression::Column(_)
        | Expression::Star(_)
        | Expression::Var(_)
        | Expression::Placeholder(_)
        | Expression::Parameter(_)
        | Expression::Unparsed(_)
        | Expression::Drop(_)
        | Expression::Use(_)
        | Expression::Command(_)
        | Expression::Rand(_)
        | Expression::CurrentDate(_)
        | Expression::CurrentTimestamp(_) => {}

        Expression::Dot(d) => map_slot(&mut d.this, f)?,
        Expression::Table(t) => map_table(t, f)?,
        Expression::DataType(dt) => {
            map_vec(&mut dt.params, f)?;
            map_vec(&mut dt.nested, f)?;
        }
        Expression::Interval(i) => map_slot(&mut i.this, f)?,

        Expression::Select(s) => {
            if let Some(with) = &mut s.with {
                for cte in &mut with.ctes {
                    map_slot(&mut cte.this, f)?;
                }
            }
            if let Some(distinct) = &mut s.distinct {
                map_vec(&mut distinct.on, f)?;
            }
            map_vec(&mut s.expressions, f)?;
            map_vec(&mut s.from, f)?;
            for join in &mut s.joins {
                map_slot(&mut join.this, f)?;
                map_opt(&mut join.on, f)?;
            }
            map_opt(&mut s.where_clause, f)?;
            map_vec(&mut s.group_by, f)?;
            map_opt(&mut s.having, f)?;
            map_opt(&mut s.qualify, f)?;
            map_vec(&mut s.order_by, f)?;
            map_vec(&mut s.distribute_by, f)?;
            map_vec(&mut s.sort_by, f)?;
            map_vec(&mut s.cluster_by, f)?;
            map_opt(&mut s.limit, f)?;
            map_opt(&mut s.offset, f)?;
        }
        Expression::Union(op) | Expression::Intersect(op) | Expression::Except(op) => {
            map_slot(&mut op.left, f)?;
            map_slot(&mut op.right, f)?;
            map_vec(&mut op.order_by, f)?;
            map_opt(&mut op.limit, f)?;
        }
        Expression::Subquery(s) => map_slot(&mut s.this, f)?,
        Expression::Values(v) => map_vec(&mut v.rows, f)?,
        Expression::Tuple(v) | Expression::Coalesce(v) | Expression::Array(v) => {
            map_vec(&mut v.expressions, f)?
        }

        Expression::Insert(i) => {
            map_vec(&mut i.partition, f)?;
            map_slot(&mut i.query, f)?;
        }
        Expression::Update(u) => {
            map_vec(&mut u.set, f)?;
            map_vec(&mut u.from, f)?;
            map_opt(&mut u.where_clause, f)?;
        }
        Expression::Delete(d) => map_opt(&mut d.where_clause, f)?,
        Expression::Create(c) => {
            for def in &mut c.columns {
                map_column_def(def, f)?;
            }
            map_properties(&mut c.properties, f)?;
            map_opt(&mut c.expression, f)?;
        }
        Expression::Cache(c) => {
            map_properties(&mut c.options, f)?;
            map_opt(&mut c.query, f)?;
        }

        Expression::Alias(a) => map_slot(&mut a.this, f)?,
        Expression::Ordered(o) => map_slot(&mut o.this, f)?,
        Expression::Window(w) => {
            map_slot(&mut w.this, f)?;
            map_vec(&mut w.partition_by, f)?;
            map_vec(&mut w.order_by, f)?;
            if let Some(frame) = &mut w.frame {
                map_bound(&mut frame.start, f)?;
                if let Some(end) = &mut frame.end {
                    map_bound(end, f)?;
                }
            }
        }
        Expression::Filter(flt) => {
            map_slot(&mut flt.this, f)?;
            map_slot(&mut flt.condition, f)?;
        }
        Expression::Lambda(l) => map_slot(&mut l.body, f)?,
        Expression::Unnest(u) => map_vec(&mut u.expressions, f)?,
        Expression::ColumnDef(def) => map_column_def(def, f)?,
        Expression::Paren(p) => map_slot(&mut p.this, f)?,

        Expression::And(b)
        | Expression::Or(b)
        | Expression::Eq(b)
        | Expression::Neq(b)
        | Expression::NullSafeEq(b)
        | Expression::Lt(b)
        | Expression::Lte(b)
        | Expression::Gt(b)
        | Expression::Gte(b)
        | Expression::Is(b)
        | Expression::Like(b)
        | Expression::ILike(b)
        | Expression::Escape(b)
        | Expression::Add(b)
        | Expression::Sub(b)
        | Expression::Mul(b)
        | Expression::Div(b)
        | Expression::IntDiv(b)
        | Expression::Mod(b)
        | Expression::DPipe(b)
        | Expression::Collate(b)
        | Expression::BitwiseAnd(b)
        | Expression::BitwiseOr(b)
        | Expression::BitwiseXor(b)
        | Expression::ShiftLeft(b)
        | Expression::ShiftRight(b) => {
            map_slot(&mut b.left, f)?;
            map_slot(&mut b.right, f)?;
        }
        Expression::Not(u) | Expression::Neg(u) | Expression::BitwiseNot(u) | Expression::Exists(u) => {
            map_slot(&mut u.this, f)?
        }
        Expression::In(i) => {
            map_slot(&mut i.this, f)?;
            map_vec(&mut i.expressions, f)?;
            map_opt(&mut i.query, f)?;
        }
        Expression::Between(b) => {
            map_slot(&mut b.this, f)?;
            map_slot(&mut b.low, f)?;
            map_slot(&mut b.high, f)?;
        }
        Expression::Case(c) => {
            map_opt(&mut c.operand, f)?;
            for (cond, result) in &mut c.whens {
                map_slot(cond, f)?;
                map_slot(result, f)?;
            }
            map_opt(&mut c.default, f)?;
        }
        Expression::If(i) => {
            map_slot(&mut i.condition, f)?;
            map_slot(&mut i.true_value, f)?;
            map_opt(&mut i.false_value, f)?;
        }
        Expression::Cast(c) | Expression::TryCast(c) => map_slot(&mut c.this, f)?,
        Expression::Extract(e) => map_slot(&mut e.this, f)?,
        Expression::Bracket(b) => {
            map_slot(&mut b.this, f)?;
            map_vec(&mut b.expressions, f)?;
        }
        Expression::Map(m) => {
            map_slot(&mut m.keys, f)?;
            map_slot(&mut m.values, f)?;
        }
        Expression::Function(func) => map_vec(&mut func.args, f)?,

        Expression::Lower(u)
        | Expression::Upper(u)
        | Expression::Length(u)
        | Expression::Initcap(u)
        | Expression::Ln(u)
        | Expression::ApproxDistinct(u)
        | Expression::ArrayAgg(u)
        | Expression::SetAgg(u)
        | Expression::ArraySize(u)
        | Expression::Explode(u)
        | Expression::PosExplode(u)
        | Expression::TsOrDsToDate(u)
        | Expression::UnixToTime(u)
        | Expression::TimeToUnix(u)
        | Expression::Day(u)
        | Expression::Month(u)
        | Expression::Year(u) => map_slot(&mut u.this, f)?,

        Expression::Split(b)
        | Expression::RegexpLike(b)
        | Expression::JsonExtract(b)
        | Expression::JsonExtractScalar(b)
        | Expression::Log(b)
        | Expression::Pow(b)
        | Expression::Quantile(b)
        | Expression::ApproxQuantile(b)
        | Expression::ArrayContains(b)
        | Expression::ArrayContainsAll(b) => {
            map_slot(&mut b.this, f)?;
            map_slot(&mut b.expression, f)?;
        }
        Expression::Substring(s) => {
            map_slot(&mut s.this, f)?;
            map_opt(&mut s.start, f)?;
            map_opt(&mut s.length, f)?;
        }
        Expression::StrPosition(s) => {
            map_slot(&mut s.this, f)?;
            map_slot(&mut s.substr, f)?;
            map_opt(&mut s.position, f)?;
        }
        Expression::GroupConcat(g) => {
            map_slot(&mut g.this, f)?;
            map_opt(&mut g.separator, f)?;
        }
        Expression::ArraySort(a) => {
            map_slot(&mut a.this, f)?;
            map_opt(&mut a.asc, f)?;
            map_opt(&mut a.comparator, f)?;
        }
        Expression::DateAdd(d)
        | Expression::DateSub(d)
        | Expression::DateDiff(d)
        | Expression::TsOrDsAdd(d) => {
            map_slot(&mut d.this, f)?;
            map_slot(&mut d.expression, f)?;
        }
        Expression::DateTrunc(d) => map_slot(&mut d.this, f)?,
        Expression::StrToTime(ff)
        | Expression::StrToDate(ff)
        | Expression::StrToUnix(ff)
        | Expression::UnixToStr(ff)
        | Expression::TimeToStr(ff) => {
            map_slot(&mut ff.this, f)?;
            map_opt(&mut ff.format, f)?;
        }
    }
    Ok(expr)
}

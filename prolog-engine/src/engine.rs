//! The resolution engine.
//!
//! Goals are proved in continuation-passing style.  Every procedure,
//! builtin or user-defined, receives the continuation `k` to run once per
//! solution and reports back a [`Control`]:
//!
//! - `Next`: alternatives are exhausted (or the continuation asked for
//!   more and there was nothing left), try the caller's next alternative.
//! - `Stop`: the top continuation is satisfied, unwind everything.
//! - `Cut(b)`: a cut fired, discard alternatives up to the frame that
//!   owns barrier `b`.
//!
//! Every frame undoes the bindings it made before returning, so the
//! environment after a call equals the environment before it.

use crate::database::{Clause, Database, PredKey};
use crate::stream::{Streams, StreamIo};
use crate::{EngineConfig, Error, Unknown, builtins};
use indexmap::IndexMap;
use prolog_terms::{Arena, Env, Term, TermDisplay, VarMap, View, WriteOptions};
use std::cmp::Ordering;
use std::io::{self, BufRead, BufReader, Write};

/// Stack left when a new segment is allocated, and the segment size.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

/// A cut barrier.  Each user procedure call and each opaque meta-call
/// gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Barrier(u64);

/// What a frame tells its caller when it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Next,
    Stop,
    Cut(Barrier),
}

pub type Solve = Result<Control, Error>;

/// A success continuation.
pub type Cont<'k> = &'k mut dyn FnMut(&mut Engine) -> Solve;

/// A native procedure.  `args` are the goal's arguments, `cut` is the
/// barrier of the clause body the goal appears in.
pub type Builtin = fn(&mut Engine, &[Term], Barrier, Cont<'_>) -> Solve;

/// A Prolog interpreter: working arena, bindings, clause database,
/// builtins and streams.
pub struct Engine {
    pub(crate) arena: Arena,
    pub(crate) env: Env,
    pub(crate) db: Database,
    pub(crate) builtins: IndexMap<PredKey, Builtin>,
    pub(crate) streams: Streams,
    pub(crate) config: EngineConfig,
    next_barrier: u64,
    depth: usize,
}

impl Engine {
    /// An engine with the default configuration reading from stdin and
    /// writing to stdout and stderr.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, Error> {
        Self::with_io(
            config,
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// An engine whose `user_input`, `user_output` and `user_error` are
    /// the given streams.
    pub fn with_io(
        config: EngineConfig,
        input: Box<dyn BufRead>,
        output: Box<dyn Write>,
        error: Box<dyn Write>,
    ) -> Result<Self, Error> {
        let mut arena = Arena::with_capacity(config.arena_bytes, config.arena_terms);
        arena.define_default_opers()?;
        Ok(Self {
            arena,
            env: Env::new(),
            db: Database::new(),
            builtins: builtins::table(),
            streams: Streams::new(input, output, error),
            config,
            next_barrier: 0,
            depth: 0,
        })
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The working arena, for building goals and clauses.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// Options of `writeq/1`: quoted, with operators and `'$VAR'` names.
    pub fn write_options(&self, quoted: bool) -> WriteOptions<'_> {
        WriteOptions {
            quoted,
            ignore_ops: false,
            number_vars: true,
            ops: Some(self.arena.opers()),
        }
    }

    /// Writes `term` as `writeq/1` would, with the current bindings.
    pub fn display(&self, term: Term) -> TermDisplay<'_> {
        term.display(&self.arena)
            .env(&self.env)
            .options(self.write_options(true))
    }

    /// Registers an output stream, optionally under an alias, and returns
    /// its stream term.
    pub fn add_output(&mut self, w: Box<dyn Write>, alias: Option<&str>) -> Result<Term, Error> {
        self.add_stream(StreamIo::Output(w), alias)
    }

    /// Registers an input stream, optionally under an alias, and returns
    /// its stream term.
    pub fn add_input(&mut self, r: Box<dyn BufRead>, alias: Option<&str>) -> Result<Term, Error> {
        self.add_stream(StreamIo::Input(r), alias)
    }

    /// Installs a native procedure, replacing any builtin of the same name
    /// and arity.
    pub fn define_builtin(&mut self, name: &str, arity: usize, f: Builtin) {
        self.builtins.insert(PredKey::new(name, arity), f);
    }

    /// Adds `clause` (`Head :- Body` or a fact) at the end of its procedure.
    pub fn add_clause(&mut self, clause: Term) -> Result<(), Error> {
        let r = self.assert_clause(clause, false);
        self.boundary(r)
    }

    /// Adds each clause of `clauses` in order.
    pub fn add_clauses(&mut self, clauses: impl IntoIterator<Item = Term>) -> Result<(), Error> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    /// Unifies two terms, honouring the `occurs_check` flag.  The bindings
    /// stay in the environment.
    pub fn unify(&mut self, a: Term, b: Term) -> Result<bool, Error> {
        Ok(self
            .env
            .unify(&self.arena, a, b, self.config.occurs_check)?)
    }

    /// Compares two terms in the standard order.
    pub fn compare(&self, a: Term, b: Term) -> Result<Ordering, Error> {
        Ok(self.env.compare(&self.arena, a, b)?)
    }

    /// Proves `goal`, calling `k` for each solution.
    ///
    /// Returns `Ok(true)` if `k` stopped the search and `Ok(false)` once
    /// the alternatives are exhausted.  Bindings made by the proof are
    /// undone when this returns; read them from inside `k`.
    pub fn solve(&mut self, goal: Term, k: Cont<'_>) -> Result<bool, Error> {
        Ok(self.call(goal, k)? == Control::Stop)
    }

    /// Runs `goal` as a query.  `on_solution` sees the engine with the
    /// solution's bindings and returns `true` to stop.
    ///
    /// Everything the proof allocates in the working arena is released
    /// when the query ends.  An exception no `catch/3` handled comes back
    /// as [`Error::Uncaught`].
    pub fn query(
        &mut self,
        goal: Term,
        mut on_solution: impl FnMut(&Engine) -> bool,
    ) -> Result<bool, Error> {
        let epoch = self.arena.begin_epoch()?;
        let mark = self.env.mark();
        let r = self.solve(goal, &mut |e: &mut Engine| {
            Ok(if on_solution(e) {
                Control::Stop
            } else {
                Control::Next
            })
        });
        let r = self.boundary(r);
        self.env.undo_to(mark);
        self.arena.end_epoch(epoch)?;
        r
    }

    /// Renders an uncaught ball.
    fn boundary<T>(&self, r: Result<T, Error>) -> Result<T, Error> {
        match r {
            Err(Error::Exception(ball)) => {
                Err(Error::Uncaught(self.display(ball).to_string()))
            }
            r => r,
        }
    }

    pub(crate) fn barrier(&mut self) -> Barrier {
        self.next_barrier += 1;
        Barrier(self.next_barrier)
    }

    /// Proves `goal` behind a new cut barrier.
    pub(crate) fn call(&mut self, goal: Term, k: Cont<'_>) -> Solve {
        let barrier = self.barrier();
        match self.solve_goal(goal, barrier, k)? {
            Control::Cut(b) if b == barrier => Ok(Control::Next),
            r => Ok(r),
        }
    }

    /// True if `goal` has a solution.  Its bindings are undone.
    pub(crate) fn provable(&mut self, goal: Term) -> Result<bool, Error> {
        let barrier = self.barrier();
        let mark = self.env.mark();
        let mut found = false;
        let r = self.solve_goal(goal, barrier, &mut |_: &mut Engine| {
            found = true;
            Ok(Control::Cut(barrier))
        });
        self.env.undo_to(mark);
        r?;
        Ok(found)
    }

    /// Proves one goal of a clause body, whose cut barrier is `cut`.
    ///
    /// Goals nest on the native stack, which is grown on demand; the
    /// nesting itself is bounded by `max_depth`.
    pub(crate) fn solve_goal(&mut self, goal: Term, cut: Barrier, k: Cont<'_>) -> Solve {
        if self.depth >= self.config.max_depth {
            return Err(self.resource_error("stack"));
        }
        self.depth += 1;
        let r = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
            self.dispatch(goal, cut, k)
        });
        self.depth -= 1;
        r
    }

    fn dispatch(&mut self, goal: Term, cut: Barrier, k: Cont<'_>) -> Solve {
        let resolved = self.env.resolve(goal);
        if resolved.is_var() {
            return Err(self.instantiation_error());
        }
        if goal.is_var() {
            // A variable goal is a meta-call, opaque to cut.
            return self.call(resolved, k);
        }
        if !resolved.is_callable() {
            return Err(self.type_error("callable", resolved));
        }
        let key = PredKey::of(&self.arena, &resolved)?;
        if let Some(&builtin) = self.builtins.get(&key) {
            let args = self.args(resolved)?;
            return builtin(self, &args, cut, k);
        }
        self.call_user(resolved, key, k)
    }

    fn call_user(&mut self, goal: Term, key: PredKey, k: Cont<'_>) -> Solve {
        let Some(clauses) = self.db.snapshot(&key) else {
            return match self.config.unknown {
                Unknown::Error => {
                    let ind = key.to_term(&mut self.arena);
                    Err(self.existence_error("procedure", ind))
                }
                Unknown::Fail => Ok(Control::Next),
            };
        };
        log::trace!("call {}", self.display(goal));
        let barrier = self.barrier();
        for clause in clauses {
            let mark = self.env.mark();
            let r = self.try_clause(goal, &clause, barrier, k);
            self.env.undo_to(mark);
            match r? {
                Control::Next => {}
                Control::Cut(b) if b == barrier => return Ok(Control::Next),
                r => return Ok(r),
            }
        }
        Ok(Control::Next)
    }

    fn try_clause(&mut self, goal: Term, clause: &Clause, barrier: Barrier, k: Cont<'_>) -> Solve {
        let mut vars = VarMap::new();
        let head = self
            .arena
            .import(&self.db.arena, None, clause.head, &mut vars)?;
        if !self
            .env
            .unify(&self.arena, head, goal, self.config.occurs_check)?
        {
            return Ok(Control::Next);
        }
        let body = self
            .arena
            .import(&self.db.arena, None, clause.body, &mut vars)?;
        self.solve_goal(body, barrier, k)
    }

    /// Arguments of a callable term.
    pub(crate) fn args(&self, term: Term) -> Result<Vec<Term>, Error> {
        Ok(match self.arena.view(&term)? {
            View::Func(_, _, args) => args.to_vec(),
            _ => Vec::new(),
        })
    }

    /// Unifies `a` and `b`, runs `k` on success and undoes the bindings.
    pub(crate) fn unify_then(&mut self, a: Term, b: Term, k: Cont<'_>) -> Solve {
        let mark = self.env.mark();
        let r = if self.unify(a, b)? {
            k(self)
        } else {
            Ok(Control::Next)
        };
        self.env.undo_to(mark);
        r
    }

    /// The name of `term` if it resolves to an atom.
    pub(crate) fn atom_name(&self, term: Term) -> Option<std::string::String> {
        let term = self.env.resolve(term);
        if term.is_atom() {
            self.arena.atom_name(&term).ok().map(str::to_owned)
        } else {
            None
        }
    }

    /// The value of `term` if it resolves to an integer.
    pub(crate) fn int_value(&self, term: Term) -> Option<i64> {
        self.arena.unpack_int(&self.env.resolve(term)).ok()
    }

    /// The truth value of `term` if it resolves to `true` or `false`.
    pub(crate) fn bool_value(&self, term: Term) -> Option<bool> {
        match self.atom_name(term).as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    /// Arguments of `term` if it resolves to a compound `name/N`.
    pub(crate) fn compound_args(&self, term: Term, name: &str, arity: usize) -> Option<Vec<Term>> {
        let term = self.env.resolve(term);
        let (_, args) = self.arena.unpack_func_any(&term, &[name]).ok()?;
        (term.is_func() && args.len() == arity).then(|| args.to_vec())
    }

    /// Items of a proper list.  Errors on a partial list or a non-list.
    pub(crate) fn list_items(&mut self, list: Term) -> Result<Vec<Term>, Error> {
        let list = self.env.resolve(list);
        if list.is_var() {
            return Err(self.instantiation_error());
        }
        match self.env.list_items(&self.arena, list)? {
            Some(items) => Ok(items),
            None => {
                if self.ends_in_var(list)? {
                    Err(self.instantiation_error())
                } else {
                    Err(self.type_error("list", list))
                }
            }
        }
    }

    fn ends_in_var(&self, list: Term) -> Result<bool, Error> {
        let mut term = self.env.resolve(list);
        loop {
            if term.is_var() {
                return Ok(true);
            }
            match self.compound_args(term, ".", 2) {
                Some(cell) => term = self.env.resolve(cell[1]),
                None => return Ok(false),
            }
        }
    }

    /// Raises `ball`, copied so that it survives the undoing of the
    /// bindings it was built under.
    pub(crate) fn throw(&mut self, ball: Term) -> Error {
        match self.arena.copy_term(&self.env, ball, &mut VarMap::new()) {
            Ok(ball) => {
                log::trace!("throw {}", self.display(ball));
                Error::Exception(ball)
            }
            Err(e) => e.into(),
        }
    }

    /// Raises `error(Formal, _)`.
    pub(crate) fn error(&mut self, formal: Term) -> Error {
        let context = self.arena.fresh_var();
        let ball = self.arena.func("error", [formal, context]);
        self.throw(ball)
    }

    pub(crate) fn instantiation_error(&mut self) -> Error {
        let formal = self.arena.atom("instantiation_error");
        self.error(formal)
    }

    pub(crate) fn uninstantiation_error(&mut self, culprit: Term) -> Error {
        let formal = self.arena.func("uninstantiation_error", [culprit]);
        self.error(formal)
    }

    pub(crate) fn type_error(&mut self, kind: &str, culprit: Term) -> Error {
        let kind = self.arena.atom(kind);
        let formal = self.arena.func("type_error", [kind, culprit]);
        self.error(formal)
    }

    pub(crate) fn domain_error(&mut self, domain: &str, culprit: Term) -> Error {
        let domain = self.arena.atom(domain);
        let formal = self.arena.func("domain_error", [domain, culprit]);
        self.error(formal)
    }

    pub(crate) fn existence_error(&mut self, kind: &str, culprit: Term) -> Error {
        let kind = self.arena.atom(kind);
        let formal = self.arena.func("existence_error", [kind, culprit]);
        self.error(formal)
    }

    pub(crate) fn permission_error(&mut self, action: &str, kind: &str, culprit: Term) -> Error {
        let action = self.arena.atom(action);
        let kind = self.arena.atom(kind);
        let formal = self.arena.func("permission_error", [action, kind, culprit]);
        self.error(formal)
    }

    pub(crate) fn resource_error(&mut self, what: &str) -> Error {
        let what = self.arena.atom(what);
        let formal = self.arena.func("resource_error", [what]);
        self.error(formal)
    }

    pub(crate) fn representation_error(&mut self, what: &str) -> Error {
        let what = self.arena.atom(what);
        let formal = self.arena.func("representation_error", [what]);
        self.error(formal)
    }
}

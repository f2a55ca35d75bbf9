//! Streams and the I/O builtins.
//!
//! An engine owns a table of streams keyed by integer id, plus an alias
//! table.  Streams appear in terms as `'$stream'(Id)`; builtins also accept
//! an alias atom.  Ids 0, 1 and 2 are `user_input`, `user_output` and
//! `user_error`, which exist for the life of the engine.

use crate::database::PredKey;
use crate::engine::{Barrier, Builtin, Cont, Engine, Solve};
use crate::Error;
use indexmap::IndexMap;
use prolog_terms::{Term, WriteOptions};
use smartstring::alias::String;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};

pub(crate) const USER_INPUT: u64 = 0;
pub(crate) const USER_OUTPUT: u64 = 1;
pub(crate) const USER_ERROR: u64 = 2;

/// The two directions a stream can have.
pub(crate) enum StreamIo {
    Input(Box<dyn BufRead>),
    Output(Box<dyn Write>),
}

pub(crate) struct Stream {
    io: StreamIo,
    alias: Option<String>,
}

/// The stream table of an engine.
pub(crate) struct Streams {
    table: IndexMap<u64, Stream>,
    aliases: IndexMap<String, u64>,
    next_id: u64,
    pub(crate) input: u64,
    pub(crate) output: u64,
}

impl Streams {
    pub(crate) fn new(input: Box<dyn BufRead>, output: Box<dyn Write>, error: Box<dyn Write>) -> Self {
        let mut streams = Self {
            table: IndexMap::new(),
            aliases: IndexMap::new(),
            next_id: USER_INPUT,
            input: USER_INPUT,
            output: USER_OUTPUT,
        };
        streams.insert(StreamIo::Input(input), Some("user_input"));
        streams.insert(StreamIo::Output(output), Some("user_output"));
        streams.insert(StreamIo::Output(error), Some("user_error"));
        streams
    }

    /// Adds a stream.  Returns `None` if `alias` is taken.
    pub(crate) fn insert(&mut self, io: StreamIo, alias: Option<&str>) -> Option<u64> {
        if alias.is_some_and(|a| self.aliases.contains_key(a)) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        let alias = alias.map(String::from);
        if let Some(alias) = &alias {
            self.aliases.insert(alias.clone(), id);
        }
        self.table.insert(id, Stream { io, alias });
        Some(id)
    }

    pub(crate) fn alias(&self, name: &str) -> Option<u64> {
        self.aliases.get(name).copied()
    }

    /// `Some(true)` for an input stream, `Some(false)` for an output one.
    pub(crate) fn is_input(&self, id: u64) -> Option<bool> {
        self.table
            .get(&id)
            .map(|s| matches!(s.io, StreamIo::Input(_)))
    }

    pub(crate) fn write_all(&mut self, id: u64, bytes: &[u8]) -> io::Result<()> {
        match self.table.get_mut(&id) {
            Some(Stream {
                io: StreamIo::Output(w),
                ..
            }) => w.write_all(bytes),
            _ => Ok(()),
        }
    }

    pub(crate) fn flush(&mut self, id: u64) -> io::Result<()> {
        match self.table.get_mut(&id) {
            Some(Stream {
                io: StreamIo::Output(w),
                ..
            }) => w.flush(),
            _ => Ok(()),
        }
    }

    /// Next byte of an input stream, `None` at end of stream.
    pub(crate) fn read_byte(&mut self, id: u64) -> io::Result<Option<u8>> {
        let Some(Stream {
            io: StreamIo::Input(r),
            ..
        }) = self.table.get_mut(&id)
        else {
            return Ok(None);
        };
        let byte = r.fill_buf()?.first().copied();
        if byte.is_some() {
            r.consume(1);
        }
        Ok(byte)
    }

    /// Closes a stream.  The standard streams are only flushed.  Unless
    /// `force` is set, a failing flush leaves the stream open.
    pub(crate) fn close(&mut self, id: u64, force: bool) -> io::Result<()> {
        match self.flush(id) {
            Err(e) if !force => return Err(e),
            _ => {}
        }
        if id <= USER_ERROR {
            return Ok(());
        }
        if let Some(stream) = self.table.shift_remove(&id) {
            if let Some(alias) = stream.alias {
                self.aliases.shift_remove(&alias);
            }
        }
        if self.input == id {
            self.input = USER_INPUT;
        }
        if self.output == id {
            self.output = USER_OUTPUT;
        }
        Ok(())
    }
}

pub(crate) fn register(table: &mut IndexMap<PredKey, Builtin>) {
    let entries: &[(&str, usize, Builtin)] = &[
        ("current_input", 1, current_input),
        ("current_output", 1, current_output),
        ("set_input", 1, set_input),
        ("set_output", 1, set_output),
        ("open", 3, open),
        ("open", 4, open),
        ("close", 1, close),
        ("close", 2, close),
        ("flush_output", 0, flush_output),
        ("flush_output", 1, flush_output),
        ("put_byte", 1, put_byte),
        ("put_byte", 2, put_byte),
        ("get_byte", 1, get_byte),
        ("get_byte", 2, get_byte),
        ("nl", 0, nl),
        ("nl", 1, nl),
        ("write", 1, write),
        ("write", 2, write),
        ("writeq", 1, writeq),
        ("writeq", 2, writeq),
        ("write_canonical", 1, write_canonical),
        ("write_canonical", 2, write_canonical),
        ("write_term", 2, write_term),
        ("write_term", 3, write_term),
    ];
    for &(name, arity, f) in entries {
        table.insert(PredKey::new(name, arity), f);
    }
}

impl Engine {
    pub(crate) fn add_stream(&mut self, io: StreamIo, alias: Option<&str>) -> Result<Term, Error> {
        match self.streams.insert(io, alias) {
            Some(id) => Ok(self.stream_term(id)),
            None => {
                let alias = alias.unwrap_or_default();
                let culprit = self.arena.func("alias", [alias]);
                Err(self.permission_error("open", "source_sink", culprit))
            }
        }
    }

    pub(crate) fn stream_term(&mut self, id: u64) -> Term {
        self.arena.func("$stream", [Term::int(id as i64)])
    }

    /// The id of the stream `t` names, by stream term or alias.
    pub(crate) fn stream_id(&mut self, t: Term) -> Result<u64, Error> {
        let t = self.env.resolve(t);
        if t.is_var() {
            return Err(self.instantiation_error());
        }
        if t.is_atom() {
            let name = self.arena.atom_name(&t)?;
            return match self.streams.alias(name) {
                Some(id) => Ok(id),
                None => Err(self.existence_error("stream", t)),
            };
        }
        let Some(id) = self
            .compound_args(t, "$stream", 1)
            .and_then(|args| self.int_value(args[0]))
        else {
            return Err(self.domain_error("stream_or_alias", t));
        };
        match u64::try_from(id).ok().filter(|id| self.streams.is_input(*id).is_some()) {
            Some(id) => Ok(id),
            None => Err(self.existence_error("stream", t)),
        }
    }

    pub(crate) fn output_stream(&mut self, t: Term) -> Result<u64, Error> {
        let id = self.stream_id(t)?;
        if self.streams.is_input(id) == Some(true) {
            let t = self.env.resolve(t);
            return Err(self.permission_error("output", "stream", t));
        }
        Ok(id)
    }

    pub(crate) fn input_stream(&mut self, t: Term) -> Result<u64, Error> {
        let id = self.stream_id(t)?;
        if self.streams.is_input(id) == Some(false) {
            let t = self.env.resolve(t);
            return Err(self.permission_error("input", "stream", t));
        }
        Ok(id)
    }

    /// Writes `term` to stream `id` with `flags` and the current
    /// operator table.
    fn write_with(&mut self, id: u64, term: Term, flags: WriteFlags) -> Result<(), Error> {
        let opts = WriteOptions {
            quoted: flags.quoted,
            ignore_ops: flags.ignore_ops,
            number_vars: flags.number_vars,
            ops: Some(self.arena.opers()),
        };
        let text = term
            .display(&self.arena)
            .env(&self.env)
            .options(opts)
            .to_string();
        self.streams.write_all(id, text.as_bytes())?;
        Ok(())
    }
}

/// Splits off the leading stream argument of the `/N+1` form of an
/// output builtin; the `/N` form writes to the current output.
fn output_args<'a>(e: &mut Engine, args: &'a [Term], n: usize) -> Result<(u64, &'a [Term]), Error> {
    if args.len() > n {
        Ok((e.output_stream(args[0])?, &args[1..]))
    } else {
        Ok((e.streams.output, args))
    }
}

fn input_args<'a>(e: &mut Engine, args: &'a [Term], n: usize) -> Result<(u64, &'a [Term]), Error> {
    if args.len() > n {
        Ok((e.input_stream(args[0])?, &args[1..]))
    } else {
        Ok((e.streams.input, args))
    }
}

/// Checks that `s` is unbound or a stream term.
fn check_stream_or_var(e: &mut Engine, s: Term) -> Result<(), Error> {
    let s = e.env.resolve(s);
    if !s.is_var() && e.compound_args(s, "$stream", 1).is_none() {
        return Err(e.domain_error("stream", s));
    }
    Ok(())
}

fn current_input(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    check_stream_or_var(e, args[0])?;
    let s = e.stream_term(e.streams.input);
    e.unify_then(args[0], s, k)
}

fn current_output(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    check_stream_or_var(e, args[0])?;
    let s = e.stream_term(e.streams.output);
    e.unify_then(args[0], s, k)
}

fn set_input(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    e.streams.input = e.input_stream(args[0])?;
    k(e)
}

fn set_output(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    e.streams.output = e.output_stream(args[0])?;
    k(e)
}

/// `open(File, Mode, Stream)` and `open(File, Mode, Stream, Options)`.
fn open(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let file = e.env.resolve(args[0]);
    let mode = e.env.resolve(args[1]);
    if file.is_var() || mode.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(path) = e.atom_name(file) else {
        return Err(e.domain_error("source_sink", file));
    };
    let Some(mode_name) = e.atom_name(mode) else {
        return Err(e.type_error("atom", mode));
    };
    let stream = e.env.resolve(args[2]);
    if !stream.is_var() {
        return Err(e.uninstantiation_error(stream));
    }

    let mut alias = None;
    let options = match args.get(3) {
        Some(&options) => e.list_items(options)?,
        None => Vec::new(),
    };
    for option in options {
        let option = e.env.resolve(option);
        if option.is_var() {
            return Err(e.instantiation_error());
        }
        let Some(a) = e.compound_args(option, "alias", 1) else {
            return Err(e.domain_error("stream_option", option));
        };
        let a = e.env.resolve(a[0]);
        if a.is_var() {
            return Err(e.instantiation_error());
        }
        match e.atom_name(a) {
            Some(name) => alias = Some(name),
            None => return Err(e.domain_error("stream_option", option)),
        }
    }

    let opened = match mode_name.as_str() {
        "read" => File::open(&path).map(|f| StreamIo::Input(Box::new(BufReader::new(f)))),
        "write" => File::create(&path).map(|f| StreamIo::Output(Box::new(BufWriter::new(f)))),
        "append" => OpenOptions::new()
            .append(true)
            .create(true)
            .open(&path)
            .map(|f| StreamIo::Output(Box::new(BufWriter::new(f)))),
        _ => return Err(e.domain_error("io_mode", mode)),
    };
    let io = match opened {
        Ok(io) => io,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(e.existence_error("source_sink", file));
        }
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            return Err(e.permission_error("open", "source_sink", file));
        }
        Err(err) => return Err(err.into()),
    };
    let s = e.add_stream(io, alias.as_deref())?;
    log::debug!("open {path} ({mode_name}) as {}", e.display(s));
    e.unify_then(stream, s, k)
}

/// `close(Stream)` and `close(Stream, Options)`.
fn close(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let id = e.stream_id(args[0])?;
    let mut force = false;
    let options = match args.get(1) {
        Some(&options) => e.list_items(options)?,
        None => Vec::new(),
    };
    for option in options {
        let option = e.env.resolve(option);
        if option.is_var() {
            return Err(e.instantiation_error());
        }
        match e
            .compound_args(option, "force", 1)
            .and_then(|f| e.bool_value(f[0]))
        {
            Some(f) => force = f,
            None => return Err(e.domain_error("close_option", option)),
        }
    }
    e.streams.close(id, force)?;
    log::debug!("close stream {id}");
    k(e)
}

fn flush_output(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (id, _) = output_args(e, args, 0)?;
    e.streams.flush(id)?;
    k(e)
}

fn put_byte(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (id, rest) = output_args(e, args, 1)?;
    let b = e.env.resolve(rest[0]);
    if b.is_var() {
        return Err(e.instantiation_error());
    }
    let Some(byte) = e.int_value(b).and_then(|n| u8::try_from(n).ok()) else {
        return Err(e.type_error("byte", b));
    };
    e.streams.write_all(id, &[byte])?;
    k(e)
}

fn get_byte(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (id, rest) = input_args(e, args, 1)?;
    let b = e.env.resolve(rest[0]);
    if !b.is_var() && !e.int_value(b).is_some_and(|n| (-1..=255).contains(&n)) {
        return Err(e.type_error("in_byte", b));
    }
    let byte = match e.streams.read_byte(id)? {
        Some(byte) => Term::int(byte),
        None => Term::int(-1),
    };
    e.unify_then(b, byte, k)
}

fn nl(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (id, _) = output_args(e, args, 0)?;
    e.streams.write_all(id, b"\n")?;
    k(e)
}

/// The flags of `write_term/2` options.
#[derive(Debug, Clone, Copy, Default)]
struct WriteFlags {
    quoted: bool,
    ignore_ops: bool,
    number_vars: bool,
}

fn write(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (id, rest) = output_args(e, args, 1)?;
    let flags = WriteFlags {
        number_vars: true,
        ..WriteFlags::default()
    };
    e.write_with(id, rest[0], flags)?;
    k(e)
}

fn writeq(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (id, rest) = output_args(e, args, 1)?;
    let flags = WriteFlags {
        quoted: true,
        number_vars: true,
        ..WriteFlags::default()
    };
    e.write_with(id, rest[0], flags)?;
    k(e)
}

fn write_canonical(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (id, rest) = output_args(e, args, 1)?;
    let flags = WriteFlags {
        quoted: true,
        ignore_ops: true,
        number_vars: false,
    };
    e.write_with(id, rest[0], flags)?;
    k(e)
}

/// `write_term(Term, Options)` and `write_term(Stream, Term, Options)`.
fn write_term(e: &mut Engine, args: &[Term], _: Barrier, k: Cont<'_>) -> Solve {
    let (id, rest) = output_args(e, args, 2)?;
    let mut flags = WriteFlags::default();
    for option in e.list_items(rest[1])? {
        let option = e.env.resolve(option);
        if option.is_var() {
            return Err(e.instantiation_error());
        }
        let value = ["quoted", "ignore_ops", "numbervars"]
            .into_iter()
            .find_map(|name| {
                e.compound_args(option, name, 1)
                    .map(|v| (name, e.bool_value(v[0])))
            });
        match value {
            Some(("quoted", Some(v))) => flags.quoted = v,
            Some(("ignore_ops", Some(v))) => flags.ignore_ops = v,
            Some(("numbervars", Some(v))) => flags.number_vars = v,
            _ => return Err(e.domain_error("write_option", option)),
        }
    }
    e.write_with(id, rest[0], flags)?;
    k(e)
}

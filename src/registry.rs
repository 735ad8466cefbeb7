use crate::builtin::BuiltinCommand;
use crate::command::{Context, Flow};
use argh::EarlyExit;
use std::io::Write;
use tracing::debug;

/// Object-safe handle to one built-in command.
///
/// A builtin takes the arguments after its name and produces a [`Flow`]. Whatever it
/// does on the way (printing, touching files, running helper programs) is its own
/// business; failures are reported to the user and the shell continues.
pub trait Builtin {
    /// Exact name the user types.
    fn name(&self) -> &'static str;

    /// One-line description for `help`.
    fn summary(&self) -> &'static str;

    /// Full usage text for `help <name>`.
    fn usage(&self) -> String;

    fn invoke(&self, args: &[&str], ctx: &mut Context<'_>) -> Flow;
}

/// Adapter turning a [`BuiltinCommand`] type into a [`Builtin`] table entry.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: BuiltinCommand> Builtin for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn summary(&self) -> &'static str {
        T::summary()
    }

    fn usage(&self) -> String {
        match T::from_args(&[T::name()], &["--help"]) {
            Ok(_) => String::new(),
            Err(EarlyExit { output, .. }) => output,
        }
    }

    fn invoke(&self, args: &[&str], ctx: &mut Context<'_>) -> Flow {
        let parsed = match T::from_words(args) {
            Some(cmd) => Ok(cmd),
            None => T::from_args(&[T::name()], args),
        };
        let cmd = match parsed {
            Ok(cmd) => cmd,
            Err(EarlyExit { output, status }) => {
                if status.is_err() {
                    debug!(builtin = T::name(), "invalid arguments");
                }
                let _ = writeln!(ctx.out, "{}", output.trim_end());
                return Flow::Continue;
            }
        };
        match cmd.execute(ctx) {
            Ok(flow) => flow,
            Err(e) => {
                let _ = writeln!(ctx.out, "{:#}", e);
                Flow::Continue
            }
        }
    }
}

/// The fixed, ordered table of builtins.
///
/// Lookup is by exact, case-sensitive name; the first entry wins. Order only matters
/// for `help`.
pub struct Registry {
    builtins: Vec<Box<dyn Builtin>>,
}

impl Registry {
    pub fn new(builtins: Vec<Box<dyn Builtin>>) -> Self {
        Self { builtins }
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins
            .iter()
            .find(|builtin| builtin.name() == name)
            .map(|builtin| builtin.as_ref())
    }

    /// `(name, summary)` pairs in registration order.
    pub fn list(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.builtins
            .iter()
            .map(|builtin| (builtin.name(), builtin.summary()))
    }
}

impl Default for Registry {
    /// The shell's builtins, in the order `help` shows them.
    fn default() -> Self {
        use crate::builtin::*;
        use crate::extras::*;
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Help>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<History>::default()),
            Box::new(Factory::<Remind>::default()),
            Box::new(Factory::<Search>::default()),
            Box::new(Factory::<Run>::default()),
            Box::new(Factory::<Learn>::default()),
            Box::new(Factory::<Ssh>::default()),
            Box::new(Factory::<Define>::default()),
            Box::new(Factory::<Preview>::default()),
            Box::new(Factory::<Compress>::default()),
            Box::new(Factory::<Env>::default()),
        ])
    }
}

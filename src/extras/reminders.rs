use crate::builtin::{BuiltinCommand, owned};
use crate::command::{Context, Flow};
use anyhow::Result;
use argh::FromArgs;
use chrono::{Local, NaiveDateTime};
use std::io::Write;
use thiserror::Error;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task: String,
    pub due: NaiveDateTime,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReminderError {
    #[error("remind: reminder list is full ({capacity} reminders)")]
    Full { capacity: usize },
}

/// A fixed-capacity list of pending reminders, kept in memory for the session.
#[derive(Debug, Clone)]
pub struct ReminderStore {
    pending: Vec<Reminder>,
    capacity: usize,
}

impl ReminderStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, task: impl Into<String>, due: NaiveDateTime) -> Result<(), ReminderError> {
        if self.pending.len() >= self.capacity {
            return Err(ReminderError::Full {
                capacity: self.capacity,
            });
        }
        self.pending.push(Reminder {
            task: task.into(),
            due,
        });
        Ok(())
    }

    pub fn pending(&self) -> &[Reminder] {
        &self.pending
    }

    /// Remove and return the reminders due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: NaiveDateTime) -> Vec<Reminder> {
        let (mut due, later): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|r| r.due <= now);
        self.pending = later;
        due.sort_by_key(|r| r.due);
        due
    }
}

#[derive(FromArgs)]
/// Set a reminder: `remind <task...> <YYYY-MM-DD> <HH:MM:SS>`. Without arguments lists
/// pending reminders.
pub struct Remind {
    #[argh(positional, greedy)]
    /// task words followed by the date and the time.
    pub words: Vec<String>,
}

impl BuiltinCommand for Remind {
    fn name() -> &'static str {
        "remind"
    }

    fn summary() -> &'static str {
        "set a reminder for a task at a given time"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Flow> {
        let store = &mut ctx.stores.reminders;
        if self.words.is_empty() {
            if store.pending().is_empty() {
                writeln!(ctx.out, "No reminders set.")?;
            }
            for reminder in store.pending() {
                writeln!(ctx.out, "{}  {}", reminder.due.format(TIME_FORMAT), reminder.task)?;
            }
            return Ok(Flow::Continue);
        }

        let [task @ .., date, time] = self.words.as_slice() else {
            anyhow::bail!("Usage: remind <task> <YYYY-MM-DD> <HH:MM:SS>");
        };
        if task.is_empty() {
            anyhow::bail!("Usage: remind <task> <YYYY-MM-DD> <HH:MM:SS>");
        }
        let due = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), TIME_FORMAT)
            .map_err(|_| anyhow::anyhow!("remind: invalid time '{} {}', expected YYYY-MM-DD HH:MM:SS", date, time))?;
        let task = task.join(" ");

        store.add(task.as_str(), due)?;
        if due <= Local::now().naive_local() {
            writeln!(ctx.out, "Reminder set for '{}' (already due).", task)?;
        } else {
            writeln!(ctx.out, "Reminder set for '{}' at {}.", task, due.format(TIME_FORMAT))?;
        }
        Ok(Flow::Continue)
    }

    fn from_words(args: &[&str]) -> Option<Self> {
        Some(Remind {
            words: owned(args),
        })
    }
}

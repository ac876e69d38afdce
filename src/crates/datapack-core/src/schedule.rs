use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use crate::command::Command;

/// Commands grouped by the output tick they run at.
///
/// Commands for a tick keep their insertion order and are never removed.
#[derive(Debug, Clone, Default)]
pub struct TickSchedule {
    ticks: BTreeMap<u32, Vec<Command>>,
    command_count: usize,
}

impl TickSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: u32, command: Command) {
        self.ticks.entry(tick).or_default().push(command);
        self.command_count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Total number of commands across all ticks
    pub fn command_count(&self) -> usize {
        self.command_count
    }

    pub fn commands_at(&self, tick: u32) -> &[Command] {
        self.ticks.get(&tick).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct ticks that received at least one command
    pub fn tick_set(&self) -> BTreeSet<u32> {
        self.ticks.keys().copied().collect()
    }

    /// `(min, max)` tick, or `(0, 0)` when nothing was scheduled
    pub fn bounds(&self) -> (u32, u32) {
        let min = self.ticks.keys().next().copied().unwrap_or(0);
        let max = self.ticks.keys().next_back().copied().unwrap_or(0);
        (min, max)
    }

    /// Function body for one tick: one command per line
    pub fn render_tick(commands: &[Command]) -> String {
        let mut body = String::new();
        for command in commands {
            body.push_str(&command.to_string());
            body.push('\n');
        }
        body
    }

    pub fn iter(&self) -> btree_map::Iter<'_, u32, Vec<Command>> {
        self.ticks.iter()
    }
}

impl<'a> IntoIterator for &'a TickSchedule {
    type Item = (&'a u32, &'a Vec<Command>);
    type IntoIter = btree_map::Iter<'a, u32, Vec<Command>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::SoundSource;

    #[test]
    fn test_empty_schedule() {
        let schedule = TickSchedule::new();
        assert!(schedule.is_empty());
        assert_eq!(schedule.bounds(), (0, 0));
        assert!(schedule.commands_at(3).is_empty());
    }

    #[test]
    fn test_commands_keep_order() {
        let mut schedule = TickSchedule::new();
        schedule.push(8, Command::stop(Some(SoundSource::Record), Some("a")));
        schedule.push(2, Command::stop(None, None));
        schedule.push(8, Command::stop(Some(SoundSource::Record), Some("b")));

        assert_eq!(schedule.command_count(), 3);
        assert_eq!(schedule.bounds(), (2, 8));
        assert_eq!(schedule.tick_set().into_iter().collect::<Vec<_>>(), vec![2, 8]);
        assert_eq!(
            TickSchedule::render_tick(schedule.commands_at(8)),
            "stopsound @s record a\nstopsound @s record b\n"
        );
    }
}

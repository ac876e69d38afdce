//! Core types for Minecraft playsound datapack generation
//!
//! This crate holds the I/O-free parts of the MIDI to datapack pipeline:
//! tick scaling, the five-variant sound mapping, command text, the per-tick
//! schedule and the binary dispatch tree that routes a scoreboard play head
//! to the function for the current tick.
//!
//! # Examples
//!
//! ```
//! use datapack_core::{map_note, NamingRule, TickScale};
//!
//! let scale = TickScale::new(24, 8);
//! assert_eq!(scale.to_output(24), 8);
//!
//! let rule = NamingRule::from_base("block.note_block.harp");
//! let mapped = map_note(66.0, &rule).unwrap();
//! assert_eq!(mapped.name, "block.note_block.harp");
//! assert_eq!(mapped.pitch, 1.0);
//! ```
//!
//! # Main Components
//!
//! - **TickScale**: source tick to output tick conversion
//! - **NamingRule** / **InstrumentRange**: the five sample variants
//! - **Command**: `playsound` / `stopsound` directives
//! - **TickSchedule**: commands grouped by output tick
//! - **DispatchTree**: routing functions over the scheduled ticks
//! - **UtilityFunctions**: load/play/pause/stop/reverse-play/tick/uninstall

pub mod command;
pub mod functions;
pub mod pack;
pub mod schedule;
pub mod sound;
pub mod tick;
pub mod tree;

pub use command::{Command, PanOffset, SoundSource, ACTOR};
pub use functions::{UtilityFunction, UtilityFunctions};
pub use pack::{FunctionTag, PackMeta, TargetVersion};
pub use schedule::TickSchedule;
pub use sound::{bend_semitones, map_note, InstrumentRange, MappedSound, NamingRule};
pub use tick::{round_to, TickScale};
pub use tree::{DispatchNode, DispatchTree, NodeBody};

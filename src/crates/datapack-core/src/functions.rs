//! Fixed playback-control functions
//!
//! The play head is a pair of scoreboard objectives per player: `<score>`
//! holds the current position and `<score>_cal` the signed step added to it
//! every game tick. Position `-1` means "before the start" and
//! `max_tick + 2` is the end-of-piece sentinel.

/// One of the fixed playback-control functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtilityFunction {
    Load,
    Play,
    Pause,
    Stop,
    ReversePlay,
    Tick,
    Uninstall,
}

impl UtilityFunction {
    /// Every function, in the order they are written
    pub const ALL: [UtilityFunction; 7] = [
        UtilityFunction::Load,
        UtilityFunction::Play,
        UtilityFunction::Pause,
        UtilityFunction::Stop,
        UtilityFunction::ReversePlay,
        UtilityFunction::Tick,
        UtilityFunction::Uninstall,
    ];

    /// File stem of the `.mcfunction`
    pub fn name(self) -> &'static str {
        match self {
            UtilityFunction::Load => "load",
            UtilityFunction::Play => "play",
            UtilityFunction::Pause => "pause",
            UtilityFunction::Stop => "stop",
            UtilityFunction::ReversePlay => "reverse-play",
            UtilityFunction::Tick => "tick",
            UtilityFunction::Uninstall => "uninstall",
        }
    }
}

/// Parameters shared by every utility function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityFunctions {
    pub namespace: String,
    pub score: String,
    pub tag: String,
    pub min_tick: u32,
    pub max_tick: u32,
    /// Whether a dispatch tree was generated (false when nothing was scheduled)
    pub has_tree: bool,
}

impl UtilityFunctions {
    /// Name of the step objective
    pub fn step_score(&self) -> String {
        format!("{}_cal", self.score)
    }

    /// Folder name of the datapack in the world's `datapacks` directory
    pub fn datapack_folder(&self) -> String {
        format!("{}_midi_datapack", self.namespace)
    }

    /// `(function, body)` for every utility function
    pub fn render_all(&self) -> Vec<(UtilityFunction, String)> {
        UtilityFunction::ALL
            .into_iter()
            .map(|function| (function, self.render(function)))
            .collect()
    }

    pub fn render(&self, function: UtilityFunction) -> String {
        let score = &self.score;
        let cal = self.step_score();
        let tag = &self.tag;
        let ns = &self.namespace;
        let end_sentinel = self.max_tick as i64 + 2;

        match function {
            UtilityFunction::Load => format!(
                "scoreboard objectives add {score} dummy\n\
                 scoreboard objectives add {cal} dummy\n"
            ),
            UtilityFunction::Play => format!(
                "execute unless score @s {score} matches 0.. run scoreboard players set @s {score} -1\n\
                 execute as @a[scores={{{score}={end_sentinel}}}] run scoreboard players set @s {score} -1\n\
                 tag @s add {tag}\n\
                 scoreboard players set @s {cal} 1\n"
            ),
            UtilityFunction::Pause => format!(
                "tag @s remove {tag}\n\
                 scoreboard players set @s {cal} 0\n"
            ),
            UtilityFunction::Stop => format!(
                "tag @s remove {tag}\n\
                 scoreboard players set @s {score} -1\n\
                 scoreboard players reset @s {cal}\n"
            ),
            UtilityFunction::ReversePlay => format!(
                "tag @s add {tag}\n\
                 scoreboard players remove @s[scores={{{score}={end_sentinel}}}] {score} 1\n\
                 scoreboard players set @s {cal} -1\n"
            ),
            UtilityFunction::Tick => {
                let mut body = format!(
                    "execute as @a[scores={{{score}=-1..{}}}] run scoreboard players operation @s {score} += @s {cal}\n",
                    self.max_tick as i64 + 1
                );
                if self.has_tree {
                    body.push_str(&format!(
                        "execute as @a[tag={tag}] at @s run function {ns}:tree/{}_{}\n",
                        self.min_tick, self.max_tick
                    ));
                }
                body
            }
            UtilityFunction::Uninstall => {
                let folder = self.datapack_folder();
                format!(
                    "tag @e remove {tag}\n\
                     scoreboard objectives remove {score}\n\
                     scoreboard objectives remove {cal}\n\
                     datapack disable \"file/{folder}\"\n\
                     tellraw @a [{{\"text\":\"{folder} has been uninstalled. Delete the datapack folder manually if needed.\",\"color\":\"yellow\"}}]\n"
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn functions() -> UtilityFunctions {
        UtilityFunctions {
            namespace: "song".to_string(),
            score: "pos".to_string(),
            tag: "playing".to_string(),
            min_tick: 8,
            max_tick: 40,
            has_tree: true,
        }
    }

    #[test]
    fn test_load() {
        assert_eq!(
            functions().render(UtilityFunction::Load),
            "scoreboard objectives add pos dummy\nscoreboard objectives add pos_cal dummy\n"
        );
    }

    #[test]
    fn test_play_resets_finished_players() {
        let play = functions().render(UtilityFunction::Play);
        assert!(play.contains("execute as @a[scores={pos=42}] run scoreboard players set @s pos -1\n"));
        assert!(play.ends_with("tag @s add playing\nscoreboard players set @s pos_cal 1\n"));
    }

    #[test]
    fn test_tick_dispatches_to_root() {
        let tick = functions().render(UtilityFunction::Tick);
        assert_eq!(
            tick,
            "execute as @a[scores={pos=-1..41}] run scoreboard players operation @s pos += @s pos_cal\n\
             execute as @a[tag=playing] at @s run function song:tree/8_40\n"
        );
    }

    #[test]
    fn test_tick_without_tree() {
        let mut empty = functions();
        empty.min_tick = 0;
        empty.max_tick = 0;
        empty.has_tree = false;
        let tick = empty.render(UtilityFunction::Tick);
        assert_eq!(
            tick,
            "execute as @a[scores={pos=-1..1}] run scoreboard players operation @s pos += @s pos_cal\n"
        );
    }

    #[test]
    fn test_reverse_play_steps_back_from_end() {
        let reverse = functions().render(UtilityFunction::ReversePlay);
        assert!(reverse.contains("scoreboard players remove @s[scores={pos=42}] pos 1\n"));
        assert!(reverse.ends_with("scoreboard players set @s pos_cal -1\n"));
    }

    #[test]
    fn test_uninstall() {
        let uninstall = functions().render(UtilityFunction::Uninstall);
        assert!(uninstall.starts_with("tag @e remove playing\n"));
        assert!(uninstall.contains("datapack disable \"file/song_midi_datapack\"\n"));
        assert!(uninstall.contains("{\"text\":\"song_midi_datapack has been uninstalled."));
    }

    #[test]
    fn test_render_all() {
        let all = functions().render_all();
        let names: Vec<&str> = all.iter().map(|(function, _)| function.name()).collect();
        assert_eq!(names, vec!["load", "play", "pause", "stop", "reverse-play", "tick", "uninstall"]);
        assert!(all.iter().all(|(_, body)| !body.is_empty()));
    }
}

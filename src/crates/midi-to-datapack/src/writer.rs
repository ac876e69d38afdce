//! Writes the generated datapack to disk
//!
//! ```text
//! <namespace>_midi_datapack/
//!   pack.mcmeta
//!   data/<namespace>/<functions>/{load,play,...}.mcfunction
//!   data/<namespace>/<functions>/note/<tick>.mcfunction
//!   data/<namespace>/<functions>/tree/<start>_<end>.mcfunction
//!   data/minecraft/tags/<functions>/{tick,load}.json
//! ```
//!
//! All files are UTF-8 without a byte-order mark.

use datapack_core::{DispatchTree, FunctionTag, PackMeta, TargetVersion, TickSchedule, UtilityFunctions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{GenerateError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatapackLayout {
    pub root: PathBuf,
    pub function_dir: PathBuf,
    pub note_dir: PathBuf,
    pub tree_dir: PathBuf,
    pub tag_dir: PathBuf,
}

impl DatapackLayout {
    pub fn new(output_dir: &Path, namespace: &str, version: TargetVersion) -> Self {
        let root = output_dir.join(format!("{}_midi_datapack", namespace));
        let data = root.join("data");
        let function_dir = data.join(namespace).join(version.functions_dir());
        DatapackLayout {
            note_dir: function_dir.join("note"),
            tree_dir: function_dir.join("tree"),
            tag_dir: data.join("minecraft").join("tags").join(version.functions_dir()),
            function_dir,
            root,
        }
    }
}

pub struct DatapackWriter {
    layout: DatapackLayout,
    namespace: String,
    version: TargetVersion,
}

impl DatapackWriter {
    pub fn new(output_dir: &Path, namespace: &str, version: TargetVersion) -> Self {
        DatapackWriter {
            layout: DatapackLayout::new(output_dir, namespace, version),
            namespace: namespace.to_string(),
            version,
        }
    }

    pub fn layout(&self) -> &DatapackLayout {
        &self.layout
    }

    /// Create the directory tree, discarding note and tree functions of a
    /// previous run so regeneration starts clean.
    pub fn prepare(&self) -> Result<()> {
        for dir in [&self.layout.note_dir, &self.layout.tree_dir] {
            if dir.exists() {
                fs::remove_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;
            }
        }
        for dir in [&self.layout.note_dir, &self.layout.tree_dir, &self.layout.tag_dir] {
            fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;
        }
        Ok(())
    }

    pub fn write_pack_meta(&self) -> Result<()> {
        let json = PackMeta::new(self.version)
            .to_json()
            .map_err(|e| GenerateError::io(&self.layout.root, e.into()))?;
        write_file(&self.layout.root.join("pack.mcmeta"), &json)
    }

    pub fn write_tags(&self) -> Result<()> {
        for function in ["tick", "load"] {
            let json = FunctionTag::single(&self.namespace, function)
                .to_json()
                .map_err(|e| GenerateError::io(&self.layout.tag_dir, e.into()))?;
            write_file(&self.layout.tag_dir.join(format!("{}.json", function)), &json)?;
        }
        Ok(())
    }

    /// One `note/<tick>.mcfunction` per scheduled tick
    pub fn write_notes(&self, schedule: &TickSchedule) -> Result<usize> {
        let mut written = 0;
        for (tick, commands) in schedule {
            let path = self.layout.note_dir.join(format!("{}.mcfunction", tick));
            write_file(&path, &TickSchedule::render_tick(commands))?;
            written += 1;
        }
        debug!(files = written, "note functions written");
        Ok(written)
    }

    /// One `tree/<start>_<end>.mcfunction` per dispatch node
    pub fn write_tree(&self, tree: &DispatchTree, score: &str) -> Result<usize> {
        let nodes = tree.nodes();
        for node in &nodes {
            let path = self.layout.tree_dir.join(format!("{}.mcfunction", node.name()));
            write_file(&path, &node.render(&self.namespace, score))?;
        }
        debug!(files = nodes.len(), depth = tree.depth(), "dispatch tree written");
        Ok(nodes.len())
    }

    pub fn write_utilities(&self, functions: &UtilityFunctions) -> Result<()> {
        for (function, body) in functions.render_all() {
            let path = self.layout.function_dir.join(format!("{}.mcfunction", function.name()));
            write_file(&path, &body)?;
        }
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| GenerateError::io(path, e))
}

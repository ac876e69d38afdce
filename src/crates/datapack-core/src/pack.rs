use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PACK_DESCRIPTION: &str = "Auto-generated MIDI Datapack";

/// Game version band the datapack targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TargetVersion {
    /// 1.13 through 1.20
    #[default]
    #[serde(rename = "1.13-1.20")]
    Legacy,
    /// 1.21 and later
    #[serde(rename = "1.21+")]
    Modern,
}

impl TargetVersion {
    pub fn pack_format(self) -> u32 {
        match self {
            TargetVersion::Legacy => 41,
            TargetVersion::Modern => 48,
        }
    }

    /// Directory name for functions and function tags (renamed in 1.21)
    pub fn functions_dir(self) -> &'static str {
        match self {
            TargetVersion::Legacy => "functions",
            TargetVersion::Modern => "function",
        }
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetVersion::Legacy => write!(f, "1.13-1.20"),
            TargetVersion::Modern => write!(f, "1.21+"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown target version '{0}' (expected 1.13-1.20 or 1.21+)")]
pub struct UnknownTargetVersion(pub String);

impl FromStr for TargetVersion {
    type Err = UnknownTargetVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1.13-1.20" | "legacy" => Ok(TargetVersion::Legacy),
            "1.21+" | "1.21" | "modern" => Ok(TargetVersion::Modern),
            other => Err(UnknownTargetVersion(other.to_string())),
        }
    }
}

/// Contents of `pack.mcmeta`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackMeta {
    pub pack: PackInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackInfo {
    pub pack_format: u32,
    pub description: String,
}

impl PackMeta {
    pub fn new(version: TargetVersion) -> Self {
        PackMeta {
            pack: PackInfo {
                pack_format: version.pack_format(),
                description: PACK_DESCRIPTION.to_string(),
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A `minecraft:tick` / `minecraft:load` function tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionTag {
    pub values: Vec<String>,
}

impl FunctionTag {
    pub fn single(namespace: &str, function: &str) -> Self {
        FunctionTag {
            values: vec![format!("{}:{}", namespace, function)],
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_tables() {
        assert_eq!(TargetVersion::Legacy.pack_format(), 41);
        assert_eq!(TargetVersion::Legacy.functions_dir(), "functions");
        assert_eq!(TargetVersion::Modern.pack_format(), 48);
        assert_eq!(TargetVersion::Modern.functions_dir(), "function");
    }

    #[test]
    fn test_pack_meta_json() {
        let json = PackMeta::new(TargetVersion::Modern).to_json().unwrap();
        assert_eq!(
            json,
            "{\n  \"pack\": {\n    \"pack_format\": 48,\n    \"description\": \"Auto-generated MIDI Datapack\"\n  }\n}"
        );
    }

    #[test]
    fn test_function_tag_json() {
        let json = FunctionTag::single("song", "tick").to_json().unwrap();
        assert_eq!(json, "{\n  \"values\": [\n    \"song:tick\"\n  ]\n}");
    }

    #[test]
    fn test_parse_version() {
        assert_eq!("1.21+".parse::<TargetVersion>().unwrap(), TargetVersion::Modern);
        assert_eq!("1.13-1.20".parse::<TargetVersion>().unwrap(), TargetVersion::Legacy);
        assert!("1.8".parse::<TargetVersion>().is_err());
    }
}

//! Motion library files
//!
//! Motion data and presets are authored in TOML and resolved into shared
//! [`MotionData`] / [`MotionDataPreset`] values at load time:
//!
//! ```toml
//! defaults = ["idle_sway"]
//!
//! [[data]]
//! name = "idle_sway"
//! kind = "weapon_sway"
//!
//! [[data.channels]]
//! stiffness = 120.0
//! damping_ratio = 0.6
//!
//! [data.channels.force]
//! type = "curve"
//! wrap = "loop"
//! keys = [
//!     { time = 0.0, value = [0.0, 0.0] },
//!     { time = 1.5, value = [0.004, 0.006], easing = "ease_in_out_quad" },
//!     { time = 3.0, value = [0.0, 0.0], easing = "ease_in_out_quad" },
//! ]
//!
//! [[presets]]
//! name = "aiming"
//! data = ["aim_sway"]
//! ```

use crate::broadcaster::MotionDataBroadcaster;
use crate::curve::{Easing, WrapMode};
use crate::data::{CurveKeyData, DataKind, ForceData, MotionData, MotionDataPreset};
use crate::presets::MotionProfiles;
use crate::spring::SpringParams;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use sway_core::{MotionError, Result};

/// Top-level motion library file
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LibraryFile {
    /// Data installed as broadcaster defaults
    #[serde(default)]
    pub defaults: Vec<String>,
    #[serde(default)]
    pub data: Vec<DataDef>,
    #[serde(default)]
    pub presets: Vec<PresetDef>,
}

/// One `[[data]]` entry
#[derive(Debug, Deserialize, Serialize)]
pub struct DataDef {
    pub name: String,
    pub kind: String,
    pub channels: Vec<ChannelDef>,
}

/// One `[[data.channels]]` entry. Exactly one of `damping` and
/// `damping_ratio` must be given.
#[derive(Debug, Deserialize, Serialize)]
pub struct ChannelDef {
    pub stiffness: f32,
    #[serde(default)]
    pub damping: Option<f32>,
    #[serde(default)]
    pub damping_ratio: Option<f32>,
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default)]
    pub force: ForceDef,
}

fn default_mass() -> f32 {
    1.0
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForceDef {
    Constant {
        #[serde(default)]
        value: Vec<f32>,
    },
    Curve {
        keys: Vec<KeyDef>,
        #[serde(default)]
        wrap: WrapMode,
    },
}

impl Default for ForceDef {
    fn default() -> Self {
        ForceDef::Constant { value: Vec::new() }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct KeyDef {
    pub time: f32,
    pub value: Vec<f32>,
    #[serde(default)]
    pub easing: Easing,
}

/// One `[[presets]]` entry, referencing data by name
#[derive(Debug, Deserialize, Serialize)]
pub struct PresetDef {
    pub name: String,
    pub data: Vec<String>,
}

/// Resolved motion library
#[derive(Debug, Default)]
pub struct MotionLibrary {
    data: IndexMap<String, Arc<MotionData>>,
    presets: IndexMap<String, Arc<MotionDataPreset>>,
    defaults: Vec<Arc<MotionData>>,
}

impl MotionLibrary {
    /// Load and resolve a library from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let library = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            data = library.data.len(),
            presets = library.presets.len(),
            "loaded motion library"
        );
        Ok(library)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: LibraryFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    /// Resolve parsed definitions; every name must be unique and every
    /// reference must point at declared data.
    pub fn from_file(file: LibraryFile) -> Result<Self> {
        let mut library = Self::default();

        for def in &file.data {
            let data = build_data(def)?;
            if library.data.contains_key(&def.name) {
                return Err(MotionError::InvalidLibrary(format!(
                    "motion data `{}` declared twice",
                    def.name
                )));
            }
            library.data.insert(def.name.clone(), data.into_shared());
        }

        for def in &file.presets {
            if library.presets.contains_key(&def.name) {
                return Err(MotionError::InvalidLibrary(format!(
                    "preset `{}` declared twice",
                    def.name
                )));
            }
            let entries = library.lookup_all(&def.data, &format!("preset `{}`", def.name))?;
            let preset = entries
                .into_iter()
                .fold(MotionDataPreset::new(def.name.as_str()), |p, d| p.with(d));
            library
                .presets
                .insert(def.name.clone(), preset.into_shared());
        }

        library.defaults = library.lookup_all(&file.defaults, "defaults")?;
        Ok(library)
    }

    /// Library holding the built-in [`MotionProfiles`]
    pub fn builtin() -> Self {
        let mut library = Self::default();
        for data in MotionProfiles::all() {
            library.data.insert(data.name().to_string(), data);
        }
        for preset in [
            MotionProfiles::aiming_preset(),
            MotionProfiles::sprinting_preset(),
        ] {
            library.presets.insert(preset.name().to_string(), preset);
        }
        library.defaults = ["weapon_sway_idle", "camera_bob_walk", "camera_shake_none", "ui_still"]
            .iter()
            .filter_map(|name| library.data.get(*name).cloned())
            .collect();
        library
    }

    /// Resolve names, rejecting unknown names and repeated kinds
    fn lookup_all(&self, names: &[String], owner: &str) -> Result<Vec<Arc<MotionData>>> {
        let mut seen: Vec<&DataKind> = Vec::with_capacity(names.len());
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let data = self.data.get(name).ok_or_else(|| {
                MotionError::UnknownReference(format!("{owner} references motion data `{name}`"))
            })?;
            if seen.contains(&data.kind()) {
                return Err(MotionError::InvalidLibrary(format!(
                    "{owner} lists kind `{}` more than once",
                    data.kind()
                )));
            }
            seen.push(data.kind());
            resolved.push(data.clone());
        }
        Ok(resolved)
    }

    pub fn data(&self, name: &str) -> Option<&Arc<MotionData>> {
        self.data.get(name)
    }

    pub fn preset(&self, name: &str) -> Option<&Arc<MotionDataPreset>> {
        self.presets.get(name)
    }

    pub fn defaults(&self) -> &[Arc<MotionData>] {
        &self.defaults
    }

    /// Default data for a kind, else the first declared data of that kind
    pub fn fallback_for(&self, kind: &DataKind) -> Option<&Arc<MotionData>> {
        self.defaults
            .iter()
            .find(|d| d.kind() == kind)
            .or_else(|| self.data.values().find(|d| d.kind() == kind))
    }

    /// Names in declaration order
    pub fn data_names(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Install every default on a broadcaster
    pub fn install_defaults(&self, broadcaster: &mut MotionDataBroadcaster) {
        for data in &self.defaults {
            broadcaster.set_default(data.clone());
        }
    }
}

fn build_data(def: &DataDef) -> Result<MotionData> {
    let mut data = MotionData::new(def.name.as_str(), def.kind.as_str());
    for (index, channel) in def.channels.iter().enumerate() {
        let owner = format!("motion data `{}` channel {index}", def.name);
        data = data.channel(build_spring(channel, &owner)?, build_force(&channel.force, &owner)?);
    }
    data.validate()?;
    Ok(data)
}

fn build_spring(def: &ChannelDef, owner: &str) -> Result<SpringParams> {
    let params = match (def.damping, def.damping_ratio) {
        (Some(damping), None) => SpringParams::new(def.stiffness, damping, def.mass),
        (None, Some(ratio)) => SpringParams::from_damping_ratio(def.stiffness, ratio, def.mass),
        (Some(_), Some(_)) => {
            return Err(MotionError::InvalidLibrary(format!(
                "{owner}: give either `damping` or `damping_ratio`, not both"
            )))
        }
        (None, None) => {
            return Err(MotionError::InvalidLibrary(format!(
                "{owner}: missing `damping` or `damping_ratio`"
            )))
        }
    };
    params
        .validate()
        .map_err(|e| MotionError::InvalidSpring(format!("{owner}: {e}")))?;
    Ok(params)
}

fn build_force(def: &ForceDef, owner: &str) -> Result<ForceData> {
    match def {
        ForceDef::Constant { value } => Ok(ForceData::constant(&components(value, owner)?)),
        ForceDef::Curve { keys, wrap } => {
            if keys.is_empty() {
                return Err(MotionError::InvalidLibrary(format!(
                    "{owner}: curve force has no keys"
                )));
            }
            let keys = keys
                .iter()
                .map(|k| {
                    if !k.time.is_finite() || k.time < 0.0 {
                        return Err(MotionError::InvalidLibrary(format!(
                            "{owner}: key time {} is not a non-negative number",
                            k.time
                        )));
                    }
                    Ok(CurveKeyData {
                        time: k.time,
                        value: components(&k.value, owner)?,
                        easing: k.easing,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(ForceData::Curve { keys, wrap: *wrap })
        }
    }
}

fn components(value: &[f32], owner: &str) -> Result<[f32; 3]> {
    if value.len() > 3 {
        return Err(MotionError::InvalidLibrary(format!(
            "{owner}: {} components given, at most 3 supported",
            value.len()
        )));
    }
    let mut out = [0.0; 3];
    out[..value.len()].copy_from_slice(value);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = r#"
defaults = ["idle"]

[[data]]
name = "idle"
kind = "weapon_sway"

[[data.channels]]
stiffness = 120.0
damping = 14.0

[data.channels.force]
type = "curve"
wrap = "loop"
keys = [
    { time = 0.0, value = [0.0, 0.0] },
    { time = 1.5, value = [0.004, 0.006], easing = "ease_in_out_quad" },
    { time = 3.0, value = [0.0, 0.0], easing = { cubic_bezier = [0.25, 0.1, 0.25, 1.0] } },
]

[[data]]
name = "aim"
kind = "weapon_sway"

[[data.channels]]
stiffness = 600.0
damping_ratio = 1.0
mass = 2.0

[[data]]
name = "bob"
kind = "camera_bob"

[[data.channels]]
stiffness = 400.0
damping = 30.0
force = { type = "constant", value = [0.0, -0.02, 0.0] }

[[presets]]
name = "aiming"
data = ["aim", "bob"]
"#;

    #[test]
    fn test_parse_library() {
        let library = MotionLibrary::from_toml_str(LIBRARY).unwrap();

        assert_eq!(library.data_names().collect::<Vec<_>>(), vec!["idle", "aim", "bob"]);
        assert_eq!(library.defaults().len(), 1);

        let aim = library.data("aim").unwrap();
        let spring = aim.channels()[0].spring;
        assert_eq!(spring.mass, 2.0);
        assert!(spring.is_critically_damped());
        assert_eq!(aim.channels()[0].force, ForceData::rest());

        let idle = library.data("idle").unwrap();
        match &idle.channels()[0].force {
            ForceData::Curve { keys, wrap } => {
                assert_eq!(*wrap, WrapMode::Loop);
                assert_eq!(keys.len(), 3);
                assert!((keys[1].value[1] - 0.006).abs() < 1e-6);
                assert_eq!(keys[1].value[2], 0.0);
                assert!(matches!(keys[2].easing, Easing::CubicBezier(..)));
            }
            other => panic!("expected curve force, got {other:?}"),
        }
    }

    #[test]
    fn test_presets_share_data() {
        let library = MotionLibrary::from_toml_str(LIBRARY).unwrap();
        let preset = library.preset("aiming").unwrap();

        let sway = preset.get(&DataKind::from("weapon_sway")).unwrap();
        assert!(Arc::ptr_eq(sway, library.data("aim").unwrap()));
        assert!(preset.defines(&DataKind::from("camera_bob")));
    }

    #[test]
    fn test_fallback_prefers_defaults() {
        let library = MotionLibrary::from_toml_str(LIBRARY).unwrap();
        assert_eq!(library.fallback_for(&"weapon_sway".into()).unwrap().name(), "idle");
        assert_eq!(library.fallback_for(&"camera_bob".into()).unwrap().name(), "bob");
        assert!(library.fallback_for(&"ui_scale".into()).is_none());
    }

    #[test]
    fn test_unknown_reference_is_rejected() {
        let toml = r#"
[[presets]]
name = "broken"
data = ["missing"]
"#;
        let err = MotionLibrary::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, MotionError::UnknownReference(_)));
    }

    #[test]
    fn test_invalid_spring_is_rejected() {
        let toml = r#"
[[data]]
name = "bad"
kind = "weapon_sway"

[[data.channels]]
stiffness = -5.0
damping = 1.0
"#;
        let err = MotionLibrary::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, MotionError::InvalidSpring(_)));
    }

    #[test]
    fn test_ambiguous_damping_is_rejected() {
        let toml = r#"
[[data]]
name = "bad"
kind = "weapon_sway"

[[data.channels]]
stiffness = 100.0
damping = 1.0
damping_ratio = 0.5
"#;
        let err = MotionLibrary::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, MotionError::InvalidLibrary(_)));
    }

    #[test]
    fn test_repeated_kind_in_preset_is_rejected() {
        let toml = format!(
            "{LIBRARY}\n[[presets]]\nname = \"twice\"\ndata = [\"idle\", \"aim\"]\n"
        );
        let err = MotionLibrary::from_toml_str(&toml).unwrap_err();
        assert!(matches!(err, MotionError::InvalidLibrary(_)));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = MotionLibrary::from_toml_str("[[data]\nname = ").unwrap_err();
        assert!(matches!(err, MotionError::Parse(_)));
    }

    #[test]
    fn test_builtin_library_resolves() {
        let library = MotionLibrary::builtin();
        assert_eq!(library.defaults().len(), 4);
        assert!(library.preset("sprinting").is_some());

        let mut broadcaster = MotionDataBroadcaster::new();
        library.install_defaults(&mut broadcaster);
        let sway = broadcaster.resolve(&"weapon_sway".into()).unwrap();
        assert_eq!(sway.name(), "weapon_sway_idle");
    }
}

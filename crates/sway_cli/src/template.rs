//! Starter motion libraries

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Write a starter library to `path`
pub fn create_library(path: &Path, template: &str, force: bool) -> Result<()> {
    let content = match template {
        "minimal" => TEMPLATE_MINIMAL,
        "shooter" => TEMPLATE_SHOOTER,
        other => bail!("Unknown template `{other}` (expected shooter or minimal)"),
    };

    if path.exists() && !force {
        bail!(
            "{} already exists. Pass --force to overwrite it.",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

const TEMPLATE_MINIMAL: &str = r#"# Sway motion library
defaults = ["bounce"]

[[data]]
name = "bounce"
kind = "ui_scale"

[[data.channels]]
stiffness = 180.0
damping_ratio = 0.45
force = { type = "constant", value = [0.1] }
"#;

const TEMPLATE_SHOOTER: &str = r#"# Sway motion library
defaults = ["idle_sway", "walk_bob", "no_shake"]

# ---------------------------------------------------------------------------
# Weapon sway
# ---------------------------------------------------------------------------

[[data]]
name = "idle_sway"
kind = "weapon_sway"

[[data.channels]]
stiffness = 120.0
damping = 14.0

[data.channels.force]
type = "curve"
wrap = "loop"
keys = [
    { time = 0.0, value = [0.0, 0.0, 0.0] },
    { time = 1.5, value = [0.004, 0.006, 0.0], easing = "ease_in_out_quad" },
    { time = 3.0, value = [0.0, 0.0, 0.0], easing = "ease_in_out_quad" },
]

[[data]]
name = "aim_sway"
kind = "weapon_sway"

[[data.channels]]
stiffness = 600.0
damping_ratio = 0.9

[[data]]
name = "sprint_sway"
kind = "weapon_sway"

[[data.channels]]
stiffness = 180.0
damping = 12.0

[data.channels.force]
type = "curve"
wrap = "loop"
keys = [
    { time = 0.0, value = [-0.02, 0.0, 0.0] },
    { time = 0.3, value = [0.02, -0.015, 0.0], easing = "ease_in_out_quad" },
    { time = 0.6, value = [-0.02, 0.0, 0.0], easing = "ease_in_out_quad" },
]

# ---------------------------------------------------------------------------
# Camera
# ---------------------------------------------------------------------------

[[data]]
name = "walk_bob"
kind = "camera_bob"

[[data.channels]]
stiffness = 400.0
damping = 30.0

[data.channels.force]
type = "curve"
wrap = "loop"
keys = [
    { time = 0.0, value = [0.0, 0.0, 0.0] },
    { time = 0.25, value = [0.0, -0.03, 0.0], easing = "ease_out_quad" },
    { time = 0.5, value = [0.0, 0.0, 0.0], easing = "ease_in_quad" },
]

[[data]]
name = "no_shake"
kind = "camera_shake"

[[data.channels]]
stiffness = 900.0
damping_ratio = 0.2

[[data]]
name = "explosion_shake"
kind = "camera_shake"

[[data.channels]]
stiffness = 900.0
damping_ratio = 0.2

[data.channels.force]
type = "curve"
keys = [
    { time = 0.0, value = [0.0, 0.0, 0.0] },
    { time = 0.03, value = [0.8, 1.2, 0.0], easing = "step" },
    { time = 0.15, value = [0.0, 0.0, 0.0], easing = "ease_out_cubic" },
]

# ---------------------------------------------------------------------------
# Game-state presets
# ---------------------------------------------------------------------------

[[presets]]
name = "aiming"
data = ["aim_sway"]

[[presets]]
name = "sprinting"
data = ["sprint_sway"]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use sway_motion::MotionLibrary;

    #[test]
    fn test_templates_parse() {
        for template in [TEMPLATE_MINIMAL, TEMPLATE_SHOOTER] {
            let library = MotionLibrary::from_toml_str(template).unwrap();
            assert!(!library.defaults().is_empty());
        }
    }

    #[test]
    fn test_unknown_template_rejected() {
        let path = std::env::temp_dir().join("sway_unknown_template_test.toml");
        let _ = fs::remove_file(&path);

        let err = create_library(&path, "racing", false).unwrap_err();
        assert!(err.to_string().contains("racing"));
        assert!(!path.exists());
    }

    #[test]
    fn test_shooter_presets_resolve() {
        let library = MotionLibrary::from_toml_str(TEMPLATE_SHOOTER).unwrap();
        assert_eq!(
            library.preset_names().collect::<Vec<_>>(),
            vec!["aiming", "sprinting"]
        );
    }
}

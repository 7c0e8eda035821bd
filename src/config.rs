use crate::events::AppEvent;
use crate::gui::menu::{
    AnimationSpec, Easing, ICON_SOURCE_SIZE, MenuError, MenuOptions, RadialMenu, Slice,
    SliceContent,
};
use async_channel::Sender;
use derive_more::{AsRef, Display, From};
use directories::ProjectDirs;
use gdk_pixbuf::Pixbuf;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use palette::Srgba;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// `#rrggbb` or `#rrggbbaa`, the only color syntax the config accepts.
#[derive(Debug, Clone, Copy, PartialEq, SerializeDisplay, DeserializeFromStr)]
pub struct HexColor(pub Srgba<f64>);

#[derive(Debug, Error)]
#[error("invalid color {0:?} (expected #rrggbb or #rrggbbaa)")]
pub struct ColorParseError(String);

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
            return Err(ColorParseError(s.to_owned()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|_| ColorParseError(s.to_owned()))
        };
        let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self(Srgba::new(channel(0)?, channel(2)?, channel(4)?, alpha)))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b, a) = self.0.into_components();
        let byte = |v: f64| (v * 255.0).round() as u8;
        if a < 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b), byte(a))
        } else {
            write!(f, "#{:02x}{:02x}{:02x}", byte(r), byte(g), byte(b))
        }
    }
}

/// Shell command line run when a section or the center action is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, From, AsRef)]
#[as_ref(forward)]
pub struct ExecCommand(String);

impl ExecCommand {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SectionConfig {
    pub label: Option<String>,
    pub icon: Option<PathBuf>,
    pub color: HexColor,
    pub exec: Option<ExecCommand>,
}

impl SectionConfig {
    fn labeled(label: &str, color: &str, exec: Option<&str>) -> Self {
        Self {
            label: Some(label.to_owned()),
            icon: None,
            color: color.parse().expect("literal color"),
            exec: exec.map(|e| ExecCommand(e.to_owned())),
        }
    }

    /// Resolve the slice content. An icon path wins over a label; a section
    /// with neither is rejected here rather than at draw time.
    fn content(&self, index: usize) -> Result<SliceContent, MenuError> {
        match (&self.icon, &self.label) {
            (Some(path), _) => {
                Pixbuf::from_file_at_scale(path, ICON_SOURCE_SIZE, ICON_SOURCE_SIZE, true)
                    .map(SliceContent::Icon)
                    .map_err(|e| MenuError::InvalidContent {
                        index,
                        reason: format!("icon {}: {e}", path.display()),
                    })
            }
            (None, Some(label)) => Ok(SliceContent::Text(label.clone())),
            (None, None) => Err(MenuError::InvalidContent {
                index,
                reason: "section needs a label or an icon".into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub easing: Easing,
    pub duration_ms: u64,
    pub per_slice_delay_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            easing: Easing::CubicOut,
            duration_ms: 280,
            per_slice_delay_ms: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub donut_size: f64,
    pub thickness: f64,
    pub section_icon_size: f64,
    pub animation: AnimationConfig,
    pub close_color: HexColor,
    pub close_tint: HexColor,
    pub center_icon: Option<PathBuf>,
    pub center_exec: Option<ExecCommand>,
    pub sections: Vec<SectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            donut_size: 320.0,
            thickness: 85.0,
            section_icon_size: 20.0,
            animation: AnimationConfig::default(),
            close_color: "#ee6055".parse().expect("literal color"),
            close_tint: "#ffffff".parse().expect("literal color"),
            center_icon: None,
            center_exec: None,
            sections: vec![
                SectionConfig::labeled("Terminal", "#fffba6", Some("foot")),
                SectionConfig::labeled("Browser", "#96d9ff", Some("firefox")),
                SectionConfig::labeled("Files", "#8093f1", None),
                SectionConfig::labeled("Editor", "#d5e2bc", None),
                SectionConfig::labeled("Music", "#dacabe", None),
            ],
        }
    }
}

impl Config {
    /// Build the menu component from this config. Fails fast on any
    /// configuration or content problem; no partially-built menu appears.
    pub fn build_menu(&self) -> Result<RadialMenu, MenuError> {
        let slices = self
            .sections
            .iter()
            .enumerate()
            .map(|(i, section)| {
                Ok(Slice {
                    // indices as reported to the host, after the close slice
                    content: section.content(i + 1)?,
                    color: section.color.0,
                })
            })
            .collect::<Result<Vec<_>, MenuError>>()?;

        let center_icon = self
            .center_icon
            .as_ref()
            .map(|path| {
                Pixbuf::from_file_at_scale(path, ICON_SOURCE_SIZE, ICON_SOURCE_SIZE, true).map_err(
                    |e| {
                        MenuError::Configuration(format!(
                            "center icon {}: {e}",
                            path.display()
                        ))
                    },
                )
            })
            .transpose()?;

        let options = MenuOptions {
            donut_size: self.donut_size,
            thickness: self.thickness,
            icon_size: self.section_icon_size,
            animation_enabled: self.animation.enabled,
            animation: AnimationSpec {
                easing: self.animation.easing,
                duration: Duration::from_millis(self.animation.duration_ms),
            },
            per_slice_delay: Duration::from_millis(self.animation.per_slice_delay_ms),
            close_color: self.close_color.0,
            close_tint: self.close_tint.0,
            center_icon,
        };

        RadialMenu::new(slices, options)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "torus", "torus").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("TORUS"))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Load the config, falling back to the built-in defaults when the file is
/// missing or broken. Menu build errors are not degraded here; the caller
/// decides.
pub fn load_or_default() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_deserialization() {
        let cases = vec![
            ("\"linear\"", Easing::Linear),
            ("\"Linear\"", Easing::Linear),
            ("\"cubic-out\"", Easing::CubicOut),
            ("\"CUBIC-OUT\"", Easing::CubicOut),
            ("\"ease-out\"", Easing::CubicOut),
        ];

        for (json, expected) in cases {
            let deserialized: Easing = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
        assert!(serde_json::from_str::<Easing>("\"bounce\"").is_err());
    }

    #[test]
    fn test_hex_color_parsing() {
        let color: HexColor = "#ee6055".parse().unwrap();
        assert_eq!(color.0, Srgba::new(0xee as f64 / 255.0, 0x60 as f64 / 255.0, 0x55 as f64 / 255.0, 1.0));

        // leading hash optional, alpha supported
        assert!("96d9ff".parse::<HexColor>().is_ok());
        let with_alpha: HexColor = "#ffffff80".parse().unwrap();
        assert_eq!(with_alpha.0.alpha, 0x80 as f64 / 255.0);

        assert!("red".parse::<HexColor>().is_err());
        assert!("#ff".parse::<HexColor>().is_err());
        assert!("#gggggg".parse::<HexColor>().is_err());
    }

    #[test]
    fn test_hex_color_roundtrip() {
        for text in ["#ee6055", "#ffffff80"] {
            let color: HexColor = text.parse().unwrap();
            assert_eq!(color.to_string(), text);
        }
    }

    #[test]
    fn test_default_config_file_parses() {
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert!(!config.sections.is_empty());
        assert!(config.animation.enabled);
    }

    #[test]
    fn test_default_config_builds_a_menu() {
        let config = Config::default();
        let menu = config.build_menu().unwrap();
        // close slice prepended to the configured sections
        assert_eq!(menu.slice_count(), config.sections.len() + 1);
    }

    #[test]
    fn test_section_without_content_is_rejected() {
        let mut config = Config::default();
        config.sections[1].label = None;
        config.sections[1].icon = None;
        let err = config.build_menu().unwrap_err();
        assert!(matches!(err, MenuError::InvalidContent { index: 2, .. }));
    }
}

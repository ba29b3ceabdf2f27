use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM, DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WEIGHT,
    POINTER_ERASE_FACTOR, TOUCH_ERASE_FACTOR,
};
use crate::drawing::EraseSettings;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Application configuration persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfigData {
    /// Stroke color picked on startup
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Stroke weight picked on startup
    #[serde(default = "default_weight")]
    pub default_weight: u32,

    #[serde(default = "default_pointer_erase_factor")]
    pub pointer_erase_factor: f64,

    #[serde(default = "default_touch_erase_factor")]
    pub touch_erase_factor: f64,

    /// Initial view center as `[lat, lng]`
    #[serde(default = "default_map_center")]
    pub map_center: [f64; 2],

    #[serde(default = "default_map_zoom")]
    pub map_zoom: f64,
}

fn default_color() -> String {
    DEFAULT_STROKE_COLOR.to_string()
}

fn default_weight() -> u32 {
    DEFAULT_STROKE_WEIGHT
}

fn default_pointer_erase_factor() -> f64 {
    POINTER_ERASE_FACTOR
}

fn default_touch_erase_factor() -> f64 {
    TOUCH_ERASE_FACTOR
}

fn default_map_center() -> [f64; 2] {
    [DEFAULT_MAP_CENTER.0, DEFAULT_MAP_CENTER.1]
}

fn default_map_zoom() -> f64 {
    DEFAULT_MAP_ZOOM
}

impl Default for AppConfigData {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_weight: default_weight(),
            pointer_erase_factor: default_pointer_erase_factor(),
            touch_erase_factor: default_touch_erase_factor(),
            map_center: default_map_center(),
            map_zoom: default_map_zoom(),
        }
    }
}

impl AppConfigData {
    pub fn erase_settings(&self) -> EraseSettings {
        EraseSettings {
            pointer_factor: self.pointer_erase_factor,
            touch_factor: self.touch_erase_factor,
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct AppConfig {
    /// The persisted configuration data
    pub data: AppConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved (dirty flag)
    pub dirty: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: AppConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to remember the toolbar's stroke style as the startup default
#[derive(Message)]
pub struct RememberStyleRequest {
    pub color: String,
    pub weight: u32,
}

/// Parse config JSON. On failure returns defaults plus a user-facing reason.
fn parse_config(json: &str) -> (AppConfigData, Option<String>) {
    match serde_json::from_str(json) {
        Ok(data) => (data, None),
        Err(e) => {
            warn!("Failed to parse config file: {}", e);
            (
                AppConfigData::default(),
                Some(format!("Configuration file was corrupted: {}", e)),
            )
        }
    }
}

/// Load configuration from `path`
fn load_config(path: PathBuf) -> (AppConfig, Option<String>) {
    let (data, reset_reason) = if path.exists() {
        match std::fs::read_to_string(&path) {
            Ok(json) => {
                let parsed = parse_config(&json);
                if parsed.1.is_none() {
                    info!("Loaded config from {:?}", path);
                }
                parsed
            }
            Err(e) => {
                warn!("Failed to read config file: {}", e);
                (
                    AppConfigData::default(),
                    Some(format!("Could not read configuration file: {}", e)),
                )
            }
        }
    } else {
        info!("No config file found, using defaults");
        (AppConfigData::default(), None)
    };

    (
        AppConfig {
            data,
            config_path: path,
            dirty: false,
        },
        reset_reason,
    )
}

/// Save configuration to disk
fn save_config(config: &AppConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<AppConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let (loaded, reset_reason) = load_config(crate::paths::config_file());
    *config = loaded;

    if let Some(reason) = reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<AppConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

fn remember_style_system(
    mut events: MessageReader<RememberStyleRequest>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for event in events.read() {
        if config.data.default_color == event.color && config.data.default_weight == event.weight {
            continue;
        }
        config.data.default_color = event.color.clone();
        config.data.default_weight = event.weight;
        config.dirty = true;
        save_events.write(SaveConfigRequest);
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<RememberStyleRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    remember_style_system.run_if(on_message::<RememberStyleRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

// src/constants.rs

/// El nombre del directorio de configuración de planos (en ~/.config/).
pub const APP_DIR: &str = "planos";

/// El nombre del archivo de variables por defecto globales (en ~/.config/planos/).
pub const GLOBAL_DEFAULTS_FILENAME: &str = "defaults.toml";

/// Texto con el que se muestran los valores de variables `no_echo`.
pub const MASKED_VALUE: &str = "****";

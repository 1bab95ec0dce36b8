// src/config.rs

use crate::constants::{APP_DIR, GLOBAL_DEFAULTS_FILENAME};
use crate::models::{ProvidedVariables, VariablesFile};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No se pudo encontrar el directorio de configuración del sistema.")]
    ConfigDirNotFound,
    #[error("No se pudo leer '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error al parsear el defaults.toml global: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Devuelve la ruta al directorio de configuración de Planos.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    let config_path = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join(APP_DIR);
    log::debug!("Directorio de config: {:?}", config_path);
    Ok(config_path)
}

/// Devuelve la ruta al archivo de valores por defecto globales.
pub fn get_defaults_path() -> Result<PathBuf, ConfigError> {
    get_config_dir().map(|dir| dir.join(GLOBAL_DEFAULTS_FILENAME))
}

/// Carga las variables por defecto globales. Si el archivo no existe, no hay defaults.
pub fn load_global_defaults() -> Result<ProvidedVariables, ConfigError> {
    load_defaults_from(&get_defaults_path()?)
}

pub fn load_defaults_from(path: &Path) -> Result<ProvidedVariables, ConfigError> {
    if !path.exists() {
        return Ok(ProvidedVariables::new());
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: VariablesFile = toml::from_str(&content)?;
    log::info!(
        "{} variables globales cargadas desde {:?}",
        file.variables.len(),
        path
    );
    Ok(file.variables)
}

/// Fusiona las variables globales con las de la ejecución.
/// Las variables de la ejecución siempre tienen prioridad.
pub fn merge_provided(global: ProvidedVariables, local: ProvidedVariables) -> ProvidedVariables {
    let mut merged = global;
    merged.extend(local);
    merged
}

// src/core/blueprint.rs

use crate::models::{BlueprintDefinition, VariablesFile};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlueprintError {
    #[error("Error de Ficheros: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error al parsear TOML en '{path}': {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("No se encontró el archivo '{path}'.")]
    FileNotFound { path: String },
    #[error(
        "La directiva '{directive}' del blueprint '{blueprint}' no tiene una variable declarada con ese nombre."
    )]
    UndeclaredDirectiveSource { blueprint: String, directive: String },
}

type BlueprintResult<T> = Result<T, BlueprintError>;

/// Carga un blueprint desde TOML. Si no define `name`, se usa el nombre del archivo.
pub fn load_blueprint(path: &Path) -> BlueprintResult<BlueprintDefinition> {
    let mut blueprint: BlueprintDefinition = load_toml(path)?;

    if blueprint.name.is_empty() {
        blueprint.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    // Cada directiva debe apuntar a una variable que el blueprint declara,
    // si no, su valor nunca llegaría a resolverse.
    for directive in &blueprint.params_to_add {
        if !blueprint.variables.contains_key(&directive.var_name) {
            return Err(BlueprintError::UndeclaredDirectiveSource {
                blueprint: blueprint.name.clone(),
                directive: directive.var_name.clone(),
            });
        }
    }

    log::info!(
        "Blueprint '{}' cargado: {} variables, {} directivas.",
        blueprint.name,
        blueprint.variables.len(),
        blueprint.params_to_add.len()
    );
    Ok(blueprint)
}

/// Carga un archivo de variables proporcionadas.
pub fn load_variables(path: &Path) -> BlueprintResult<VariablesFile> {
    let file: VariablesFile = load_toml(path)?;
    log::debug!(
        "{} variables cargadas desde '{}'.",
        file.variables.len(),
        path.display()
    );
    Ok(file)
}

fn load_toml<T: DeserializeOwned>(path: &Path) -> BlueprintResult<T> {
    if !path.is_file() {
        return Err(BlueprintError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    log::debug!("Leyendo '{}'", path.display());
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| BlueprintError::TomlParse {
        path: path.display().to_string(),
        source: e,
    })
}

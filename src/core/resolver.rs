// src/core/resolver.rs

use crate::core::expander::{self, CollisionPolicy, ExpandError};
use crate::models::{
    BlueprintDefinition, Declarations, ProvidedVariables, Resolutions, VarType, VarValue,
    VariableDeclaration,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ResolveError {
    #[error("Error de expansión: {0}")]
    Expand(#[from] ExpandError),
    #[error("Al blueprint '{blueprint}' le falta la variable requerida '{name}'.")]
    MissingVariable { blueprint: String, name: String },
    #[error(
        "La variable '{name}' del blueprint '{blueprint}' es de tipo '{expected}', pero se recibió un valor de tipo '{found}'."
    )]
    TypeMismatch {
        blueprint: String,
        name: String,
        expected: VarType,
        found: &'static str,
    },
    #[error(
        "Valor '{value}' no permitido para '{name}' en '{blueprint}'. Valores permitidos: {allowed:?}"
    )]
    DisallowedValue {
        blueprint: String,
        name: String,
        value: String,
        allowed: Vec<String>,
    },
    #[error(
        "El valor {value} de '{name}' en '{blueprint}' está fuera del rango permitido ({range})."
    )]
    OutOfRange {
        blueprint: String,
        name: String,
        value: f64,
        range: String,
    },
}

type ResolveResult<T> = Result<T, ResolveError>;

/// Resultado de una construcción de plantilla: las declaraciones finales
/// (incluidas las generadas) y el valor resuelto de cada una.
#[derive(Debug, Clone)]
pub struct ResolvedBlueprint {
    pub name: String,
    pub declarations: Declarations,
    pub values: Resolutions,
}

// --- FUNCIÓN PÚBLICA PRINCIPAL ---

/// Resuelve todas las variables de un blueprint a partir de las variables proporcionadas.
///
/// Cada llamada parte de las declaraciones base del blueprint; nada se guarda
/// entre construcciones.
pub fn resolve_variables(
    blueprint: &BlueprintDefinition,
    provided: &ProvidedVariables,
    policy: CollisionPolicy,
) -> ResolveResult<ResolvedBlueprint> {
    // 1. Las variables generadas tienen prioridad sobre las proporcionadas.
    let mut variable_dict = provided.clone();
    variable_dict.extend(expander::expand_resolutions(
        provided,
        &blueprint.params_to_add,
    )?);

    // 2. Declaraciones frescas para esta construcción.
    let declarations = expander::expand_declarations(
        blueprint.variables.clone(),
        &variable_dict,
        &blueprint.params_to_add,
        policy,
    )?;

    for name in variable_dict.keys() {
        if !declarations.contains_key(name) {
            log::warn!(
                "La variable '{}' no está declarada en el blueprint '{}' y será ignorada.",
                name,
                blueprint.name
            );
        }
    }

    // 3. Resolver cada declaración.
    let mut values = Resolutions::new();
    for (name, declaration) in &declarations {
        let value = resolve_variable(
            name,
            declaration,
            variable_dict.get(name),
            &blueprint.name,
        )?;
        values.insert(name.clone(), value);
    }

    log::info!(
        "Blueprint '{}' resuelto: {} variables.",
        blueprint.name,
        values.len()
    );

    Ok(ResolvedBlueprint {
        name: blueprint.name.clone(),
        declarations,
        values,
    })
}

/// Resuelve una variable: el valor proporcionado, o el `default` de su declaración.
pub fn resolve_variable(
    name: &str,
    declaration: &VariableDeclaration,
    provided: Option<&VarValue>,
    blueprint_name: &str,
) -> ResolveResult<VarValue> {
    let value = provided
        .or(declaration.default.as_ref())
        .cloned()
        .ok_or_else(|| ResolveError::MissingVariable {
            blueprint: blueprint_name.to_string(),
            name: name.to_string(),
        })?;

    check_type(name, declaration.var_type, &value, blueprint_name)?;

    if !declaration.allowed_values.is_empty() {
        let rendered = value.to_string();
        if !declaration.allowed_values.contains(&rendered) {
            return Err(ResolveError::DisallowedValue {
                blueprint: blueprint_name.to_string(),
                name: name.to_string(),
                value: rendered,
                allowed: declaration.allowed_values.clone(),
            });
        }
    }

    if declaration.var_type == VarType::Number {
        check_range(name, declaration, &value, blueprint_name)?;
    }

    Ok(value)
}

fn check_type(
    name: &str,
    expected: VarType,
    value: &VarValue,
    blueprint_name: &str,
) -> ResolveResult<()> {
    let accepted = match expected {
        // CloudFormation recibe cualquier escalar como cadena.
        VarType::String => matches!(
            value,
            VarValue::String(_)
                | VarValue::Integer(_)
                | VarValue::Float(_)
                | VarValue::Boolean(_)
                | VarValue::Datetime(_)
        ),
        VarType::Number => value.as_number().is_some(),
        VarType::Boolean => value.as_bool().is_some(),
        // Una lista separada por comas también es válida.
        VarType::List => matches!(value, VarValue::List(_) | VarValue::String(_)),
        VarType::Mapping => matches!(value, VarValue::Mapping(_)),
    };

    if accepted {
        Ok(())
    } else {
        Err(ResolveError::TypeMismatch {
            blueprint: blueprint_name.to_string(),
            name: name.to_string(),
            expected,
            found: value.kind(),
        })
    }
}

fn check_range(
    name: &str,
    declaration: &VariableDeclaration,
    value: &VarValue,
    blueprint_name: &str,
) -> ResolveResult<()> {
    let Some(number) = value.as_number() else {
        return Ok(());
    };

    let below = declaration.min_value.is_some_and(|min| number < min);
    let above = declaration.max_value.is_some_and(|max| number > max);
    if !below && !above {
        return Ok(());
    }

    let bound = |b: Option<f64>| b.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string());
    Err(ResolveError::OutOfRange {
        blueprint: blueprint_name.to_string(),
        name: name.to_string(),
        value: number,
        range: format!(
            "{}..={}",
            bound(declaration.min_value),
            bound(declaration.max_value)
        ),
    })
}

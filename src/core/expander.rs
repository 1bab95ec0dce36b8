// src/core/expander.rs

use crate::models::{
    Declarations, ExpansionDirective, NestedValue, ProvidedVariables, Resolutions, VarValue,
    VariableDeclaration,
};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ExpandError {
    #[error(
        "La variable '{directive}' debe ser un mapa para poder expandirse, pero su valor es de tipo '{found}'."
    )]
    InvalidDirectiveSource {
        directive: String,
        found: &'static str,
    },
    #[error("La entrada '{key}' de '{directive}' tiene metadatos pero no define el campo 'Value'.")]
    MissingValueField { directive: String, key: String },
    #[error(
        "La variable generada '{name}' (desde '{directive}') colisiona con una declaración existente."
    )]
    NameCollision { name: String, directive: String },
}

pub type ExpandResult<T> = Result<T, ExpandError>;

/// Qué hacer cuando una variable generada ya estaba declarada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// La declaración generada reemplaza a la existente.
    #[default]
    Overwrite,
    /// La colisión se reporta como error.
    Reject,
}

/// Añade al blueprint una declaración por cada clave del mapa fuente de cada directiva.
///
/// Una directiva cuya variable fuente no fue proporcionada no hace nada.
/// Nunca se elimina una declaración.
pub fn expand_declarations(
    mut declarations: Declarations,
    provided: &ProvidedVariables,
    directives: &[ExpansionDirective],
    policy: CollisionPolicy,
) -> ExpandResult<Declarations> {
    for directive in directives {
        let Some(source) = source_mapping(provided, directive)? else {
            continue;
        };

        for key in source.keys() {
            let generated =
                VariableDeclaration::new(directive.var_type, Some(directive.description.clone()));

            if let Some(existing) = declarations.get(key)
                && *existing != generated
            {
                if policy == CollisionPolicy::Reject {
                    return Err(ExpandError::NameCollision {
                        name: key.clone(),
                        directive: directive.var_name.clone(),
                    });
                }
                log::warn!(
                    "La variable '{}' generada desde '{}' sobrescribe una declaración existente (tipo '{}' -> '{}').",
                    key,
                    directive.var_name,
                    existing.var_type,
                    generated.var_type
                );
            }

            declarations.insert(key.clone(), generated);
        }
    }

    Ok(declarations)
}

/// Devuelve los valores de las variables generadas por las directivas.
///
/// Las entradas con metadatos (`{ Value = "...", ... }`) se resuelven a su `Value`.
/// El llamador debe fusionar el resultado por encima de sus propias variables.
pub fn expand_resolutions(
    provided: &ProvidedVariables,
    directives: &[ExpansionDirective],
) -> ExpandResult<Resolutions> {
    let mut additional = BTreeMap::new();

    for directive in directives {
        let Some(source) = source_mapping(provided, directive)? else {
            continue;
        };

        for (key, raw) in source {
            let value = match NestedValue::from(raw) {
                NestedValue::Plain(v) => v,
                NestedValue::WithMetadata { value, .. } => {
                    value.ok_or_else(|| ExpandError::MissingValueField {
                        directive: directive.var_name.clone(),
                        key: key.clone(),
                    })?
                }
            };
            additional.insert(key.clone(), value);
        }
    }

    Ok(additional)
}

/// Obtiene el mapa fuente de una directiva, o `None` si la variable no fue proporcionada.
fn source_mapping<'a>(
    provided: &'a ProvidedVariables,
    directive: &ExpansionDirective,
) -> ExpandResult<Option<&'a BTreeMap<String, VarValue>>> {
    let Some(value) = provided.get(&directive.var_name) else {
        log::debug!(
            "La directiva '{}' se omite: la variable no fue proporcionada.",
            directive.var_name
        );
        return Ok(None);
    };

    value
        .as_mapping()
        .map(Some)
        .ok_or_else(|| ExpandError::InvalidDirectiveSource {
            directive: directive.var_name.clone(),
            found: value.kind(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VarType;

    fn mapping(entries: &[(&str, VarValue)]) -> VarValue {
        VarValue::Mapping(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    fn provided(name: &str, value: VarValue) -> ProvidedVariables {
        let mut vars = ProvidedVariables::new();
        vars.insert(name.to_string(), value);
        vars
    }

    fn tags_directive() -> Vec<ExpansionDirective> {
        vec![ExpansionDirective::new("Tags", VarType::String, "Extra tag")]
    }

    fn base_declarations() -> Declarations {
        let mut base = Declarations::new();
        base.insert(
            "VpcId".to_string(),
            VariableDeclaration::new(VarType::String, Some("VPC ID".to_string())),
        );
        base
    }

    #[test]
    fn test_no_provided_source_is_identity() {
        let base = base_declarations();
        let vars = provided("Unrelated", VarValue::from("x"));

        let result = expand_declarations(
            base.clone(),
            &vars,
            &tags_directive(),
            CollisionPolicy::Overwrite,
        )
        .unwrap();
        assert_eq!(result, base);
        assert!(expand_resolutions(&vars, &tags_directive()).unwrap().is_empty());
    }

    #[test]
    fn test_tags_keys_become_declarations() {
        let vars = provided(
            "Tags",
            mapping(&[("Owner", "x".into()), ("Team", "y".into())]),
        );

        let result = expand_declarations(
            base_declarations(),
            &vars,
            &tags_directive(),
            CollisionPolicy::Overwrite,
        )
        .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(result["Owner"].var_type, VarType::String);
        assert_eq!(result["Team"].var_type, VarType::String);
        assert_eq!(result["Team"].description.as_deref(), Some("Extra tag"));
        assert!(result.contains_key("VpcId"));
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let vars = provided(
            "Tags",
            mapping(&[("Owner", "x".into()), ("Team", "y".into())]),
        );
        let directives = tags_directive();

        let once = expand_declarations(
            base_declarations(),
            &vars,
            &directives,
            CollisionPolicy::Overwrite,
        )
        .unwrap();
        let twice =
            expand_declarations(once.clone(), &vars, &directives, CollisionPolicy::Overwrite)
                .unwrap();
        assert_eq!(once, twice);

        // También con la política estricta: volver a generar lo mismo no es una colisión.
        let strict =
            expand_declarations(once.clone(), &vars, &directives, CollisionPolicy::Reject).unwrap();
        assert_eq!(once, strict);
    }

    #[test]
    fn test_collision_overwrites_by_default() {
        let mut base = Declarations::new();
        base.insert(
            "Owner".to_string(),
            VariableDeclaration::new(VarType::Number, None),
        );
        let vars = provided("Tags", mapping(&[("Owner", "x".into())]));

        let result =
            expand_declarations(base, &vars, &tags_directive(), CollisionPolicy::Overwrite)
                .unwrap();
        assert_eq!(result["Owner"].var_type, VarType::String);
    }

    #[test]
    fn test_collision_rejected_with_strict_policy() {
        let mut base = Declarations::new();
        base.insert(
            "Owner".to_string(),
            VariableDeclaration::new(VarType::Number, None),
        );
        let vars = provided("Tags", mapping(&[("Owner", "x".into())]));

        let err = expand_declarations(base, &vars, &tags_directive(), CollisionPolicy::Reject)
            .unwrap_err();
        assert_eq!(
            err,
            ExpandError::NameCollision {
                name: "Owner".to_string(),
                directive: "Tags".to_string(),
            }
        );
    }

    #[test]
    fn test_non_mapping_source_is_an_error() {
        let vars = provided("Tags", VarValue::from("Owner=x"));

        let err = expand_declarations(
            Declarations::new(),
            &vars,
            &tags_directive(),
            CollisionPolicy::Overwrite,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ExpandError::InvalidDirectiveSource {
                directive: "Tags".to_string(),
                found: "string",
            }
        );

        let vars = provided("Tags", VarValue::List(vec![]));
        assert!(matches!(
            expand_resolutions(&vars, &tags_directive()),
            Err(ExpandError::InvalidDirectiveSource { found: "list", .. })
        ));
    }

    #[test]
    fn test_resolution_unwraps_metadata_value() {
        let directives = vec![ExpansionDirective::new(
            "OtherTags",
            VarType::String,
            "Extra tag",
        )];
        let entry = mapping(&[("Value", "prod".into()), ("Type", "string".into())]);
        let vars = provided("OtherTags", mapping(&[("Name", entry)]));

        let resolved = expand_resolutions(&vars, &directives).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved["Name"], VarValue::from("prod"));
    }

    #[test]
    fn test_resolution_of_flat_mapping() {
        let directives = vec![ExpansionDirective::new(
            "OtherTags",
            VarType::String,
            "Extra tag",
        )];
        let vars = provided("OtherTags", mapping(&[("Name", "prod".into())]));

        let resolved = expand_resolutions(&vars, &directives).unwrap();
        assert_eq!(resolved["Name"], VarValue::from("prod"));
    }

    #[test]
    fn test_resolution_metadata_without_value_field() {
        let vars = provided(
            "Tags",
            mapping(&[("Name", mapping(&[("Type", "string".into())]))]),
        );

        let err = expand_resolutions(&vars, &tags_directive()).unwrap_err();
        assert_eq!(
            err,
            ExpandError::MissingValueField {
                directive: "Tags".to_string(),
                key: "Name".to_string(),
            }
        );
    }

    #[test]
    fn test_directives_are_processed_independently() {
        let directives = vec![
            ExpansionDirective::new("Tags", VarType::String, "Extra tag"),
            ExpansionDirective::new("Ports", VarType::Number, "Extra port"),
            ExpansionDirective::new("Missing", VarType::String, "Never provided"),
        ];
        let mut vars = provided("Tags", mapping(&[("Owner", "x".into())]));
        vars.insert(
            "Ports".to_string(),
            mapping(&[("HttpPort", VarValue::Integer(80))]),
        );

        let decls = expand_declarations(
            Declarations::new(),
            &vars,
            &directives,
            CollisionPolicy::Overwrite,
        )
        .unwrap();
        assert_eq!(decls["Owner"].var_type, VarType::String);
        assert_eq!(decls["HttpPort"].var_type, VarType::Number);
        assert_eq!(decls.len(), 2);

        let resolved = expand_resolutions(&vars, &directives).unwrap();
        assert_eq!(resolved["HttpPort"], VarValue::Integer(80));
    }
}

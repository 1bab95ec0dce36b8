// src/core/parameters.rs

use crate::core::resolver::ResolvedBlueprint;
use crate::models::Declarations;
use serde::Serialize;
use std::collections::BTreeMap;

/// Un parámetro de CloudFormation, con los nombres de campo de la plantilla.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CfnParameter {
    #[serde(rename = "Type")]
    pub param_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub no_echo: bool,
}

/// La sección `Parameters` de una plantilla.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ParametersSection {
    #[serde(rename = "Parameters")]
    pub parameters: BTreeMap<String, CfnParameter>,
}

/// Construye los parámetros de CloudFormation de un conjunto de declaraciones.
/// Las variables de tipo `mapping` o `boolean` no generan parámetro salvo
/// que declaren un `cfn_type` explícito.
pub fn build_parameters(declarations: &Declarations) -> ParametersSection {
    let parameters = declarations
        .iter()
        .filter_map(|(name, decl)| {
            let param_type = decl
                .cfn_type
                .clone()
                .or_else(|| decl.var_type.cfn_type().map(str::to_string))?;
            Some((
                name.clone(),
                CfnParameter {
                    param_type,
                    default: decl.default.as_ref().map(|v| v.to_string()),
                    description: decl.description.clone(),
                    allowed_values: decl.allowed_values.clone(),
                    min_value: decl.min_value,
                    max_value: decl.max_value,
                    no_echo: decl.no_echo,
                },
            ))
        })
        .collect();

    ParametersSection { parameters }
}

impl ResolvedBlueprint {
    pub fn parameters(&self) -> ParametersSection {
        build_parameters(&self.declarations)
    }
}

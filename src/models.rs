// src/models.rs

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

// --- VALORES DE VARIABLES ---

/// Un valor proporcionado para una variable. Usa `untagged` para aceptar
/// directamente lo que se escribe en TOML.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum VarValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<VarValue>),
    Datetime(toml::value::Datetime),
    Mapping(BTreeMap<String, VarValue>),
}

impl VarValue {
    /// Nombre del tipo de valor, usado en mensajes de error.
    pub fn kind(&self) -> &'static str {
        match self {
            VarValue::Boolean(_) => "boolean",
            VarValue::Integer(_) | VarValue::Float(_) => "number",
            VarValue::String(_) => "string",
            VarValue::List(_) => "list",
            VarValue::Datetime(_) => "datetime",
            VarValue::Mapping(_) => "mapping",
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, VarValue>> {
        match self {
            VarValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Interpreta el valor como número. CloudFormation pasa los números como
    /// cadenas, así que una cadena numérica también cuenta. `NaN` e infinitos no son números.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            VarValue::Integer(i) => Some(*i as f64),
            VarValue::Float(f) => Some(*f),
            VarValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|n: &f64| n.is_finite())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VarValue::Boolean(b) => Some(*b),
            VarValue::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        VarValue::String(value.to_string())
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        VarValue::String(value)
    }
}

/// La representación en texto que recibiría CloudFormation como parámetro.
impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Boolean(b) => write!(f, "{}", b),
            VarValue::Integer(i) => write!(f, "{}", i),
            VarValue::Float(x) => write!(f, "{}", x),
            VarValue::String(s) => f.write_str(s),
            VarValue::Datetime(d) => write!(f, "{}", d),
            VarValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                f.write_str(&parts.join(","))
            }
            VarValue::Mapping(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

// --- DECLARACIONES ---

/// Tipo semántico de una variable declarada.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    #[default]
    String,
    Number,
    List,
    Mapping,
    Boolean,
}

impl VarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarType::String => "string",
            VarType::Number => "number",
            VarType::List => "list",
            VarType::Mapping => "mapping",
            VarType::Boolean => "boolean",
        }
    }

    /// Tipo de parámetro de CloudFormation equivalente. Los mapas y booleanos
    /// solo existen dentro del blueprint y no generan parámetro.
    pub fn cfn_type(&self) -> Option<&'static str> {
        match self {
            VarType::String => Some("String"),
            VarType::Number => Some("Number"),
            VarType::List => Some("CommaDelimitedList"),
            VarType::Mapping | VarType::Boolean => None,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Una variable declarada por un blueprint (`[variables.<Nombre>]` en TOML).
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VariableDeclaration {
    #[serde(rename = "type", default)]
    pub var_type: VarType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<VarValue>,
    #[serde(default)]
    pub allowed_values: Vec<String>,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub no_echo: bool,
    /// Sobrescribe el tipo de parámetro de CloudFormation (ej: `AWS::EC2::VPC::Id`).
    #[serde(default)]
    pub cfn_type: Option<String>,
}

impl VariableDeclaration {
    pub fn new(var_type: VarType, description: Option<String>) -> Self {
        Self {
            var_type,
            description,
            ..Default::default()
        }
    }
}

/// Una directiva de expansión (`[[params_to_add]]`): las claves del mapa en
/// `var_name` se convierten en nuevas variables de tipo `var_type`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ExpansionDirective {
    pub var_name: String,
    #[serde(default)]
    pub var_type: VarType,
    #[serde(default)]
    pub description: String,
}

impl ExpansionDirective {
    pub fn new(var_name: &str, var_type: VarType, description: &str) -> Self {
        Self {
            var_name: var_name.to_string(),
            var_type,
            description: description.to_string(),
        }
    }
}

/// Una entrada del mapa fuente de una directiva, clasificada una sola vez:
/// o es un valor plano, o es un mapa con `Value` y metadatos adicionales.
#[derive(Debug, Clone, PartialEq)]
pub enum NestedValue {
    Plain(VarValue),
    WithMetadata {
        value: Option<VarValue>,
        metadata: BTreeMap<String, VarValue>,
    },
}

/// Clave que contiene el valor efectivo dentro de una entrada con metadatos.
pub const NESTED_VALUE_KEY: &str = "Value";

impl From<&VarValue> for NestedValue {
    fn from(value: &VarValue) -> Self {
        match value {
            VarValue::Mapping(map) => {
                let mut metadata = map.clone();
                let value = metadata.remove(NESTED_VALUE_KEY);
                NestedValue::WithMetadata { value, metadata }
            }
            other => NestedValue::Plain(other.clone()),
        }
    }
}

/// Nombre -> declaración. Los nombres son únicos dentro de un blueprint.
pub type Declarations = BTreeMap<String, VariableDeclaration>;

/// Nombre -> valor proporcionado en tiempo de ejecución.
pub type ProvidedVariables = BTreeMap<String, VarValue>;

/// Nombre -> valor resuelto.
pub type Resolutions = BTreeMap<String, VarValue>;

// --- MODELOS DE ARCHIVOS TOML ---

/// Un blueprint: sus variables declaradas y sus directivas de expansión.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct BlueprintDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variables: Declarations,
    #[serde(default)]
    pub params_to_add: Vec<ExpansionDirective>,
}

/// Un archivo de variables proporcionadas (también el formato de los defaults globales).
#[derive(Deserialize, Debug, Clone, Default)]
pub struct VariablesFile {
    #[serde(default)]
    pub variables: ProvidedVariables,
}

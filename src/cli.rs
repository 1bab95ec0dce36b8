// src/cli.rs

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Planos: resolución de variables para blueprints de CloudFormation.", long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Falla si una variable generada colisiona con una declaración existente.
    #[arg(long, global = true)]
    pub reject_collisions: bool,

    /// No cargar las variables por defecto globales (~/.config/planos/defaults.toml).
    #[arg(long, global = true)]
    pub no_defaults: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Muestra las declaraciones del blueprint, incluidas las generadas.
    Declarations(BuildArgs),
    /// Resuelve el valor de cada variable del blueprint.
    Resolve(BuildArgs),
    /// Imprime la sección `Parameters` de la plantilla en TOML.
    Parameters(BuildArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Archivo TOML con la definición del blueprint.
    pub blueprint: PathBuf,

    /// Archivo TOML con las variables proporcionadas.
    pub variables: PathBuf,
}

// src/bin/planos.rs

use anyhow::{Context, Result};
use clap::Parser;

use planos::cli::{BuildArgs, Cli, Commands};
use planos::config;
use planos::constants::MASKED_VALUE;
use planos::core::expander::CollisionPolicy;
use planos::core::resolver::{self, ResolvedBlueprint};
use planos::core::blueprint;

/// El punto de entrada principal de la aplicación.
fn main() {
    // Para ver los logs, ejecuta con `RUST_LOG=debug planos ...`
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        eprintln!("\nError: {:?}", e);
        std::process::exit(1);
    }
}

/// El despachador principal de la aplicación.
fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let policy = if cli.reject_collisions {
        CollisionPolicy::Reject
    } else {
        CollisionPolicy::Overwrite
    };

    let args = match &cli.command {
        Commands::Declarations(args) | Commands::Resolve(args) | Commands::Parameters(args) => args,
    };
    let resolved = build(args, policy, cli.no_defaults)?;

    match &cli.command {
        Commands::Declarations(_) => handle_declarations(&resolved),
        Commands::Resolve(_) => handle_resolve(&resolved),
        Commands::Parameters(_) => handle_parameters(&resolved),
    }
}

/// Carga el blueprint y las variables, y ejecuta una construcción completa.
fn build(
    args: &BuildArgs,
    policy: CollisionPolicy,
    no_defaults: bool,
) -> Result<ResolvedBlueprint> {
    let blueprint = blueprint::load_blueprint(&args.blueprint).with_context(|| {
        format!(
            "No se pudo cargar el blueprint '{}'",
            args.blueprint.display()
        )
    })?;
    let file = blueprint::load_variables(&args.variables).with_context(|| {
        format!(
            "No se pudieron cargar las variables de '{}'",
            args.variables.display()
        )
    })?;

    let provided = if no_defaults {
        file.variables
    } else {
        let global = config::load_global_defaults()
            .context("No se pudieron cargar las variables globales.")?;
        config::merge_provided(global, file.variables)
    };

    resolver::resolve_variables(&blueprint, &provided, policy)
        .with_context(|| format!("No se pudo resolver el blueprint '{}'", blueprint.name))
}

fn handle_declarations(resolved: &ResolvedBlueprint) -> Result<()> {
    println!("\n--- Declaraciones de '{}' ---", resolved.name);
    for (name, decl) in &resolved.declarations {
        match &decl.description {
            Some(d) => println!("  - {} ({}) : {}", name, decl.var_type, d),
            None => println!("  - {} ({})", name, decl.var_type),
        }
    }
    println!("\n--------------------------");
    Ok(())
}

fn handle_resolve(resolved: &ResolvedBlueprint) -> Result<()> {
    println!("\n--- Variables resueltas de '{}' ---", resolved.name);
    for (name, value) in &resolved.values {
        let masked = resolved
            .declarations
            .get(name)
            .is_some_and(|d| d.no_echo);
        if masked {
            println!("  - {} = \"{}\"", name, MASKED_VALUE);
        } else {
            println!("  - {} = \"{}\"", name, value);
        }
    }
    println!("\n--------------------------");
    Ok(())
}

fn handle_parameters(resolved: &ResolvedBlueprint) -> Result<()> {
    let toml_string = toml::to_string_pretty(&resolved.parameters())?;
    print!("{}", toml_string);
    Ok(())
}

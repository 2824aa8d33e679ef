//! Dual-write coordinator keeping a relational quad store (authoritative) and
//! a SPARQL index (eventually consistent) in sync.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logger;
pub mod nquads;
pub mod update_parser;

#[cfg(test)]
mod tests;

use std::{fs, io::Read, path::Path, sync::Arc};

use quadsync_domain::Term;
use quadsync_index::IndexSyncAdapter;
use quadsync_repository::RepositoryManager;

use crate::{
    cli::{Cli, CliCommand},
    coordinator::{DualWriteCoordinator, WriteOutcome},
    error::AppError,
    nquads::read_nquads,
};

pub async fn run(cli: Cli) -> Result<(), AppError> {
    let config = config::load_configuration(cli.config.as_deref())?;
    logger::initialize(&config.logger, &config.telemetry);

    let repository = RepositoryManager::connect(&config.repository).await?;
    let index = Arc::new(IndexSyncAdapter::connect(&config.index).await?);
    let coordinator = DualWriteCoordinator::new(&repository, index);

    execute(&coordinator, &cli.dataset, cli.command).await
}

/// Run one command and print its result on stdout.
pub async fn execute(
    coordinator: &DualWriteCoordinator,
    dataset: &str,
    command: CliCommand,
) -> Result<(), AppError> {
    match command {
        CliCommand::Update { file, expression } => {
            let text = match (expression, file) {
                (Some(text), _) => text,
                (None, Some(path)) => fs::read_to_string(path)?,
                (None, None) => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            let outcome = coordinator.execute_update(dataset, &text, None).await?;
            print_outcome(&outcome);
        }
        CliCommand::Add { file } => {
            let quads = read_file(&file)?;
            let outcome = coordinator.add_quads(dataset, &quads, None).await?;
            print_outcome(&outcome);
        }
        CliCommand::Remove { file } => {
            let quads = read_file(&file)?;
            let outcome = coordinator.remove_quads(dataset, &quads, None).await?;
            print_outcome(&outcome);
        }
        CliCommand::Count { graph } => {
            let graph = graph.as_deref().map(parse_graph).transpose()?;
            let count = coordinator.count_quads(dataset, graph.as_ref()).await?;
            println!("{count}");
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<quadsync_domain::Quad>, AppError> {
    read_nquads(fs::File::open(path)?)
}

fn parse_graph(graph: &str) -> Result<Term, AppError> {
    if graph.eq_ignore_ascii_case("default") {
        return Ok(Term::default_graph());
    }
    let term: Term = graph
        .parse()
        .map_err(|e| AppError::InvalidArgument(format!("graph '{graph}': {e}")))?;
    if !term.is_uri() {
        return Err(AppError::InvalidArgument(format!(
            "graph '{graph}' is not an IRI"
        )));
    }
    Ok(term)
}

fn print_outcome(outcome: &WriteOutcome) {
    println!(
        "inserted={} removed={} ambiguous={} index={}",
        outcome.inserted,
        outcome.removed,
        outcome.ambiguous_matches.len(),
        outcome.index
    );
    for ambiguous in &outcome.ambiguous_matches {
        let candidates: Vec<String> = ambiguous
            .candidates
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "ambiguous: {} matches {}",
            ambiguous.term,
            candidates.join(", ")
        );
    }
}

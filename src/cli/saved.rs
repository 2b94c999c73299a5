//! Saved issue query commands

use anyhow::Result;
use clap::Subcommand;

use super::issue::FilterArgs;
use super::output::{pagination_meta, Column, DetailBlock, Output};
use crate::resolve::IssueFilterOptions;
use crate::storage::{SavedQuery, SavedQueryStore};

#[derive(Subcommand)]
pub enum SavedCommands {
    /// List saved queries
    List,

    /// Add or replace a saved query
    Add {
        #[arg(long)]
        name: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Remove a saved query
    Remove {
        #[arg(long)]
        name: String,
    },
}

pub fn run(cmd: SavedCommands, store: &SavedQueryStore, output: &Output) -> Result<String> {
    match cmd {
        SavedCommands::List => list(store, output),
        SavedCommands::Add { name, filters } => add(store, &name, filters),
        SavedCommands::Remove { name } => remove(store, &name),
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn list(store: &SavedQueryStore, output: &Output) -> Result<String> {
    let queries = store.list();
    let columns = vec![
        Column::keyed("name", |q: &SavedQuery| q.name.clone()),
        Column::keyed("search", |q: &SavedQuery| opt(&q.search)),
        Column::keyed("team", |q: &SavedQuery| opt(&q.team)),
        Column::keyed("project", |q: &SavedQuery| opt(&q.project)),
        Column::keyed("state", |q: &SavedQuery| opt(&q.state)),
        Column::keyed("labels", |q: &SavedQuery| q.labels.join(",")),
    ];
    let body = output.render_list(&queries, &columns)?;
    Ok(format!(
        "{}\n{}\n",
        pagination_meta(None, None, queries.len()),
        body
    ))
}

fn add(store: &SavedQueryStore, name: &str, filters: FilterArgs) -> Result<String> {
    let query = IssueFilterOptions::from(filters).to_saved(name);
    store.save_query(query.clone())?;

    let block = DetailBlock::new("SAVED_QUERY_ADDED")
        .field("NAME", query.name.clone())
        .field("TEAM", opt(&query.team))
        .field("PROJECT", opt(&query.project))
        .field("STATE", opt(&query.state))
        .field("LABELS", query.labels.join(","));
    Ok(format!("{}\n", block))
}

fn remove(store: &SavedQueryStore, name: &str) -> Result<String> {
    // Removing an unknown name still reports success
    store.remove(name)?;
    Ok(format!(
        "{}\n",
        DetailBlock::new("SAVED_QUERY_REMOVED").field("NAME", name)
    ))
}

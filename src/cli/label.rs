//! `ltui labels`

use anyhow::Result;
use clap::Args;

use super::output::{sanitize_single_line, Column};
use super::session::Session;
use crate::domain::{FilterClause, Label};

#[derive(Args, Debug, Default)]
pub struct LabelArgs {
    /// Only labels belonging to this team
    #[arg(long)]
    pub team: Option<String>,
}

pub async fn run(args: LabelArgs, session: &Session) -> Result<String> {
    let columns = vec![
        Column::keyed("id", |l: &Label| l.id.clone()),
        Column::keyed("name", |l: &Label| sanitize_single_line(&l.name)),
        Column::keyed("group", |l: &Label| l.group().to_string()),
        Column::keyed("color", |l: &Label| l.color.clone().unwrap_or_default()),
    ];
    session.output().check_columns(&columns)?;

    let mut params = session.page();
    if let Some(reference) = args.team.as_deref() {
        let team = session.resolver().require_team(reference).await?;
        params = params.filter(
            FilterClause::empty().with_field("team", FilterClause::field_eq("id", team.id)),
        );
    }

    let page = session.api().issue_labels(&params).await?;
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

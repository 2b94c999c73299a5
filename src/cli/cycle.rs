//! `ltui cycles`

use anyhow::Result;
use clap::Args;

use super::output::{sanitize_single_line, Column};
use super::session::Session;
use crate::domain::{Cycle, FilterClause};

#[derive(Args, Debug, Default)]
pub struct CycleArgs {
    /// Only cycles of this team
    #[arg(long)]
    pub team: Option<String>,
}

pub async fn run(args: CycleArgs, session: &Session) -> Result<String> {
    let columns = vec![
        Column::keyed("id", |c: &Cycle| c.id.clone()),
        Column::keyed("number", |c: &Cycle| {
            c.number.map(|n| n.to_string()).unwrap_or_default()
        }),
        Column::keyed("name", |c: &Cycle| {
            sanitize_single_line(c.name.as_deref().unwrap_or(""))
        }),
        Column::keyed("startsAt", |c: &Cycle| c.starts_at.clone().unwrap_or_default()),
        Column::keyed("endsAt", |c: &Cycle| c.ends_at.clone().unwrap_or_default()),
        Column::keyed("status", |c: &Cycle| c.status().to_string()),
    ];
    session.output().check_columns(&columns)?;

    let mut params = session.page();
    if let Some(reference) = args.team.as_deref() {
        let team = session.resolver().require_team(reference).await?;
        params = params.filter(
            FilterClause::empty().with_field("team", FilterClause::field_eq("id", team.id)),
        );
    }

    let page = session.api().cycles(&params).await?;
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

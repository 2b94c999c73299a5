//! `ltui users`

use anyhow::Result;
use clap::Args;

use super::output::{sanitize_single_line, Column};
use super::session::Session;
use crate::domain::{FilterClause, User};

#[derive(Args, Debug, Default)]
pub struct UserArgs {
    /// Hide deactivated users
    #[arg(long)]
    pub active_only: bool,
}

pub async fn run(args: UserArgs, session: &Session) -> Result<String> {
    let columns = vec![
        Column::keyed("id", |u: &User| u.id.clone()),
        Column::keyed("name", |u: &User| sanitize_single_line(&u.name)),
        Column::keyed("email", |u: &User| u.email.clone().unwrap_or_default()),
        Column::keyed("displayName", |u: &User| {
            u.display_name.clone().unwrap_or_default()
        }),
    ];
    session.output().check_columns(&columns)?;

    let mut params = session.page();
    if args.active_only {
        params = params
            .filter(FilterClause::empty().with_field("active", FilterClause::eq(true)));
    }

    let page = session.api().users(&params).await?;
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

//! `ltui notifications`

use anyhow::Result;
use clap::Args;

use super::output::Column;
use super::session::Session;
use crate::domain::{FilterClause, Notification};

#[derive(Args, Debug, Default)]
pub struct NotificationArgs {
    /// Only notifications not yet read
    #[arg(long)]
    pub unread_only: bool,
}

pub async fn run(args: NotificationArgs, session: &Session) -> Result<String> {
    let columns = vec![
        Column::keyed("id", |n: &Notification| n.id.clone()),
        Column::keyed("type", |n: &Notification| n.kind.clone()),
        Column::keyed("read", |n: &Notification| n.is_read().to_string()),
        Column::keyed("createdAt", |n: &Notification| {
            n.created_at.clone().unwrap_or_default()
        }),
    ];
    session.output().check_columns(&columns)?;

    let mut params = session.page();
    if args.unread_only {
        params = params
            .filter(FilterClause::empty().with_field("readAt", FilterClause::is_null(true)));
    }

    let page = session.api().notifications(&params).await?;
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

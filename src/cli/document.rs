//! Document CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::{sanitize_single_line, truncate_multiline, Column, DetailBlock};
use super::session::Session;
use crate::domain::{Document, FilterClause};
use crate::error::LtuiError;

const DEFAULT_MAX_CONTENT_CHARS: usize = 4000;

#[derive(Subcommand)]
pub enum DocumentCommands {
    /// List documents in the workspace
    List {
        /// Only documents of this project
        #[arg(long)]
        project: Option<String>,

        /// Full-text search over document content
        #[arg(long)]
        search: Option<String>,
    },

    /// View a document with its content
    View {
        id: String,

        #[arg(long, default_value_t = DEFAULT_MAX_CONTENT_CHARS)]
        max_content_chars: usize,
    },
}

pub async fn run(cmd: DocumentCommands, session: &Session) -> Result<String> {
    match cmd {
        DocumentCommands::List { project, search } => {
            list(session, project.as_deref(), search.as_deref()).await
        }
        DocumentCommands::View {
            id,
            max_content_chars,
        } => view(session, &id, max_content_chars).await,
    }
}

fn columns() -> Vec<Column<Document>> {
    vec![
        Column::keyed("id", |d: &Document| d.id.clone()),
        Column::keyed("title", |d: &Document| sanitize_single_line(&d.title)),
        Column::keyed("project", |d: &Document| {
            d.project
                .as_ref()
                .map(|p| p.id.clone())
                .unwrap_or_else(|| "-".to_string())
        }),
        Column::keyed("updatedAt", |d: &Document| {
            d.updated_at
                .clone()
                .or_else(|| d.created_at.clone())
                .unwrap_or_default()
        }),
    ]
}

async fn list(session: &Session, project: Option<&str>, search: Option<&str>) -> Result<String> {
    let columns = columns();
    session.output().check_columns(&columns)?;

    // Search ignores --project; the search endpoint takes no filter
    let page = match (search, project) {
        (Some(term), _) => session.api().search_documents(term, &session.page()).await?,
        (None, Some(reference)) => {
            let project = session.resolver().require_project(reference).await?;
            let filter = FilterClause::empty()
                .with_field("project", FilterClause::field_eq("id", project.id));
            session.api().documents(&session.page().filter(filter)).await?
        }
        (None, None) => session.api().documents(&session.page()).await?,
    };
    Ok(session
        .output()
        .render_page(&page.page_info, &page.nodes, &columns)?)
}

async fn view(session: &Session, id: &str, max_content_chars: usize) -> Result<String> {
    let document = session
        .api()
        .document(id)
        .await?
        .ok_or_else(|| LtuiError::reference("Document", id))?;

    let block = DetailBlock::new("DOCUMENT_DETAIL")
        .field("DOCUMENT", document.id.clone())
        .field("TITLE", document.title.clone())
        .field(
            "PROJECT",
            document.project.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
        )
        .field("UPDATED_AT", document.updated_at.clone().unwrap_or_default())
        .field(
            "AUTHOR",
            document.creator.as_ref().map(|c| c.name.clone()).unwrap_or_default(),
        )
        .field("URL", document.url.clone().unwrap_or_default());

    let content = truncate_multiline(document.content.as_deref().unwrap_or(""), max_content_chars);
    let mut out = format!("{}\nCONTENT_START\n{}\nCONTENT_END\n", block, content.text);
    if content.truncated {
        out.push_str("CONTENT_TRUNCATED: true\n");
    }
    Ok(out)
}

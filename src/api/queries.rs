//! GraphQL documents
//!
//! Each collection query takes `$first`, `$after` and (where supported)
//! `$filter`/`$sort`, and returns `nodes` plus `pageInfo`.

const PAGE_INFO: &str = "pageInfo { startCursor endCursor }";

const ISSUE_FIELDS: &str = "
  id identifier title number description priority createdAt updatedAt
  state { id name }
  team { id key }
  project { id name }
  assignee { id name }
  labels(first: 25) { nodes { id name } }
";

const PROJECT_FIELDS: &str = "
  id name slugId state targetDate url health progress
  issueCountHistory completedIssueCountHistory
  status { id name }
";

pub fn viewer() -> String {
    "query Viewer { viewer { id name email displayName } }".to_string()
}

pub fn teams() -> String {
    format!(
        "query Teams($first: Int, $after: String, $filter: TeamFilter) {{
          teams(first: $first, after: $after, filter: $filter) {{
            nodes {{ id key name description archivedAt }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn team() -> String {
    "query Team($id: String!) { team(id: $id) { id key name description archivedAt } }".to_string()
}

pub fn team_states() -> String {
    format!(
        "query TeamStates($id: String!, $first: Int) {{
          team(id: $id) {{
            states(first: $first) {{ nodes {{ id name type }} {PAGE_INFO} }}
          }}
        }}"
    )
}

pub fn projects() -> String {
    format!(
        "query Projects($first: Int, $after: String, $filter: ProjectFilter) {{
          projects(first: $first, after: $after, filter: $filter) {{
            nodes {{ {PROJECT_FIELDS} }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn project() -> String {
    format!("query Project($id: String!) {{ project(id: $id) {{ {PROJECT_FIELDS} }} }}")
}

const MILESTONE_FIELDS: &str = "id name targetDate archivedAt project { id name }";

pub fn project_milestones() -> String {
    format!(
        "query ProjectMilestones($id: String!, $first: Int) {{
          project(id: $id) {{
            projectMilestones(first: $first) {{ nodes {{ {MILESTONE_FIELDS} }} {PAGE_INFO} }}
          }}
        }}"
    )
}

pub fn milestones() -> String {
    format!(
        "query Milestones($first: Int, $after: String, $filter: ProjectMilestoneFilter) {{
          projectMilestones(first: $first, after: $after, filter: $filter) {{
            nodes {{ {MILESTONE_FIELDS} }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn milestone() -> String {
    format!(
        "query Milestone($id: String!) {{ projectMilestone(id: $id) {{ {MILESTONE_FIELDS} }} }}"
    )
}

pub fn project_teams() -> String {
    format!(
        "query ProjectTeams($id: String!, $first: Int) {{
          project(id: $id) {{
            teams(first: $first) {{ nodes {{ id key name }} {PAGE_INFO} }}
          }}
        }}"
    )
}

pub fn workflow_states() -> String {
    format!(
        "query WorkflowStates($first: Int, $after: String, $filter: WorkflowStateFilter) {{
          workflowStates(first: $first, after: $after, filter: $filter) {{
            nodes {{ id name type }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn workflow_state() -> String {
    "query WorkflowState($id: String!) { workflowState(id: $id) { id name type } }".to_string()
}

pub fn issue_labels() -> String {
    format!(
        "query IssueLabels($first: Int, $after: String, $filter: IssueLabelFilter) {{
          issueLabels(first: $first, after: $after, filter: $filter) {{
            nodes {{ id name color isGroup parent {{ id name }} }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn users() -> String {
    format!(
        "query Users($first: Int, $after: String, $filter: UserFilter) {{
          users(first: $first, after: $after, filter: $filter) {{
            nodes {{ id name email displayName active }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn issues() -> String {
    format!(
        "query Issues($first: Int, $after: String, $filter: IssueFilter, $sort: [IssueSortInput!]) {{
          issues(first: $first, after: $after, filter: $filter, sort: $sort) {{
            nodes {{ {ISSUE_FIELDS} }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn issue() -> String {
    format!("query Issue($id: String!) {{ issue(id: $id) {{ {ISSUE_FIELDS} }} }}")
}

pub fn search_issues() -> String {
    format!(
        "query SearchIssues($term: String!, $first: Int, $after: String, $filter: IssueFilter) {{
          searchIssues(term: $term, first: $first, after: $after, filter: $filter) {{
            nodes {{ id identifier title }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn issue_comments() -> String {
    format!(
        "query IssueComments($id: String!, $first: Int) {{
          issue(id: $id) {{
            comments(first: $first) {{
              nodes {{ id body createdAt user {{ id name }} }}
              {PAGE_INFO}
            }}
          }}
        }}"
    )
}

pub fn issue_history() -> String {
    format!(
        "query IssueHistory($id: String!, $first: Int) {{
          issue(id: $id) {{
            history(first: $first) {{
              nodes {{
                id createdAt actorId
                actor {{ id name }}
                fromState {{ id name }} toState {{ id name }}
                fromAssignee {{ id name }} toAssignee {{ id name }}
                fromPriority toPriority
                fromProject {{ id name }} toProject {{ id name }}
                fromTitle toTitle
              }}
              {PAGE_INFO}
            }}
          }}
        }}"
    )
}

pub fn cycles() -> String {
    format!(
        "query Cycles($first: Int, $after: String, $filter: CycleFilter) {{
          cycles(first: $first, after: $after, filter: $filter) {{
            nodes {{ id number name startsAt endsAt completedAt }}
            {PAGE_INFO}
          }}
        }}"
    )
}

const DOCUMENT_FIELDS: &str =
    "id title content url createdAt updatedAt project { id name } creator { id name }";

pub fn documents() -> String {
    format!(
        "query Documents($first: Int, $after: String, $filter: DocumentFilter) {{
          documents(first: $first, after: $after, filter: $filter) {{
            nodes {{ {DOCUMENT_FIELDS} }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn document() -> String {
    format!("query Document($id: String!) {{ document(id: $id) {{ {DOCUMENT_FIELDS} }} }}")
}

pub fn search_documents() -> String {
    format!(
        "query SearchDocuments($term: String!, $first: Int, $after: String) {{
          searchDocuments(term: $term, first: $first, after: $after) {{
            nodes {{ {DOCUMENT_FIELDS} }}
            {PAGE_INFO}
          }}
        }}"
    )
}

const ROADMAP_FIELDS: &str = "id name url updatedAt owner { id name }";

pub fn roadmaps() -> String {
    format!(
        "query Roadmaps($first: Int, $after: String) {{
          roadmaps(first: $first, after: $after) {{
            nodes {{ {ROADMAP_FIELDS} }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn roadmap() -> String {
    format!("query Roadmap($id: String!) {{ roadmap(id: $id) {{ {ROADMAP_FIELDS} }} }}")
}

pub fn roadmap_projects() -> String {
    format!(
        "query RoadmapProjects($id: String!, $first: Int) {{
          roadmap(id: $id) {{
            projects(first: $first) {{ nodes {{ {PROJECT_FIELDS} }} {PAGE_INFO} }}
          }}
        }}"
    )
}

pub fn notifications() -> String {
    format!(
        "query Notifications($first: Int, $after: String, $filter: NotificationFilter) {{
          notifications(first: $first, after: $after, filter: $filter) {{
            nodes {{ id type readAt createdAt }}
            {PAGE_INFO}
          }}
        }}"
    )
}

pub fn create_issue() -> String {
    format!(
        "mutation CreateIssue($input: IssueCreateInput!) {{
          issueCreate(input: $input) {{ success issue {{ {ISSUE_FIELDS} }} }}
        }}"
    )
}

pub fn update_issue() -> String {
    "mutation UpdateIssue($id: String!, $input: IssueUpdateInput!) {
      issueUpdate(id: $id, input: $input) { success }
    }"
    .to_string()
}

pub fn create_comment() -> String {
    "mutation CreateComment($input: CommentCreateInput!) {
      commentCreate(input: $input) { success comment { id body createdAt user { id name } } }
    }"
    .to_string()
}

pub fn create_attachment() -> String {
    "mutation CreateAttachment($input: AttachmentCreateInput!) {
      attachmentCreate(input: $input) { success attachment { id title url } }
    }"
    .to_string()
}

pub fn create_issue_relation() -> String {
    "mutation CreateIssueRelation($input: IssueRelationCreateInput!) {
      issueRelationCreate(input: $input) { success }
    }"
    .to_string()
}

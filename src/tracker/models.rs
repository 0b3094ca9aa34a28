//! Typed ticket records and the wire shapes of the tracker's search response.

use serde::{Deserialize, Serialize};

/// One ticket returned by a tracker search. Identity is the key only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketResult {
    pub key: String,
    pub summary: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub issues: Option<Vec<IssueDto>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueDto {
    pub key: String,
    #[serde(default)]
    pub fields: FieldsDto,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FieldsDto {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<NamedDto>,
    #[serde(default)]
    pub assignee: Option<AssigneeDto>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub issuetype: Option<NamedDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedDto {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssigneeDto {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl From<IssueDto> for TicketResult {
    fn from(issue: IssueDto) -> Self {
        let fields = issue.fields;
        Self {
            key: issue.key,
            summary: fields.summary.unwrap_or_default(),
            status: fields.status.map(|s| s.name).unwrap_or_default(),
            assignee: fields.assignee.map(|a| a.display_name),
            description: fields.description,
            issue_type: fields.issuetype.map(|t| t.name),
        }
    }
}

impl SearchResponse {
    pub fn into_tickets(self) -> Vec<TicketResult> {
        self.issues.unwrap_or_default().into_iter().map(TicketResult::from).collect()
    }
}

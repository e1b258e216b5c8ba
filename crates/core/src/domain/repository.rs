// Repository Info record

use serde::Serialize;

use super::error::{DomainError, Result};
use super::value::{FieldValue, Record};

/// Conventional control directory name inside a working tree
pub const CONTROL_DIR_NAME: &str = ".git";

/// Head-pointer file inside the control directory
pub const HEAD_FILE: &str = "HEAD";

/// History-index file, present once the repository has recorded history
pub const INDEX_FILE: &str = "index";

/// Prefix of a symbolic branch reference
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

pub const SHORT_HASH_LEN: usize = 7;
pub const FULL_HASH_LEN: usize = 40;

/// Keys owned by the record itself; commands and derivations may not use them
pub const RESERVED_KEYS: [&str; 2] = ["isRepo", "hasCommits"];

/// Repository Info
///
/// Serializes flat: `{isRepo, hasCommits, ...fields, ...formatted}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryInfo {
    pub is_repo: bool,
    pub has_commits: bool,
    /// Raw command results (or sentinels when there are no commits)
    #[serde(flatten)]
    pub fields: Record,
    /// Derived fields computed from `fields`
    #[serde(flatten)]
    pub formatted: Record,
}

impl RepositoryInfo {
    /// Record for a path without a control directory
    pub fn not_a_repo() -> Self {
        Self {
            is_repo: false,
            has_commits: false,
            fields: Record::new(),
            formatted: Record::new(),
        }
    }

    /// Look up a raw or derived field; derived fields win on equal names
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.formatted.get(name).or_else(|| self.fields.get(name))
    }

    /// Like `get`, but also answers the `isRepo` and `hasCommits` flags
    pub fn lookup(&self, name: &str) -> Option<FieldValue> {
        match name {
            "isRepo" => Some(FieldValue::Bool(self.is_repo)),
            "hasCommits" => Some(FieldValue::Bool(self.has_commits)),
            _ => self.get(name).cloned(),
        }
    }

    pub fn branch(&self) -> Option<&str> {
        self.get("branch").and_then(FieldValue::as_str)
    }

    pub fn hash(&self) -> Option<&str> {
        self.get("hash").and_then(FieldValue::as_str)
    }

    pub fn commits(&self) -> Option<i64> {
        self.get("commits").and_then(FieldValue::as_i64)
    }

    pub fn version(&self) -> Option<&str> {
        self.get("version").and_then(FieldValue::as_str)
    }
}

/// Sentinel values for a repository that has no commits yet
pub fn empty_result_set() -> Record {
    let zeros = |len: usize| FieldValue::Text("0".repeat(len));

    let mut record = Record::new();
    record.insert("commits".to_string(), FieldValue::Integer(0));
    record.insert("hash".to_string(), zeros(SHORT_HASH_LEN));
    record.insert("hashFull".to_string(), zeros(FULL_HASH_LEN));
    record
}

/// Extract the branch name from head-pointer content such as `ref: refs/heads/main`
///
/// A detached HEAD (bare commit id) has no branch and is rejected.
pub fn parse_head_branch(content: &str) -> Result<String> {
    let start = content
        .find(BRANCH_REF_PREFIX)
        .map(|idx| idx + BRANCH_REF_PREFIX.len())
        .ok_or_else(|| DomainError::MalformedHead(content.trim().to_string()))?;

    let rest = &content[start..];
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Ok(rest[..end].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_head_branch() {
        assert_eq!(parse_head_branch("ref: refs/heads/main\n").unwrap(), "main");
        assert_eq!(
            parse_head_branch("ref: refs/heads/feature/login").unwrap(),
            "feature/login"
        );
    }

    #[test]
    fn test_parse_head_branch_detached() {
        let result = parse_head_branch("3f2a9c1d0b8e7f6a5b4c3d2e1f0a9b8c7d6e5f4a\n");
        assert!(matches!(result, Err(DomainError::MalformedHead(_))));
    }

    #[test]
    fn test_empty_result_set_widths() {
        let record = empty_result_set();
        assert_eq!(record["commits"], FieldValue::Integer(0));
        assert_eq!(record["hash"].as_str().unwrap().len(), 7);
        assert_eq!(record["hashFull"].as_str().unwrap().len(), 40);
        assert_eq!(record["hashFull"], FieldValue::Text("0".repeat(40)));
    }

    #[test]
    fn test_not_a_repo_serializes_flags_only() {
        let json = serde_json::to_value(RepositoryInfo::not_a_repo()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"isRepo": false, "hasCommits": false})
        );
    }

    #[test]
    fn test_serializes_flat() {
        let mut info = RepositoryInfo::not_a_repo();
        info.is_repo = true;
        info.fields.insert("branch".to_string(), "main".into());
        info.formatted
            .insert("version".to_string(), "main-3 [abc1234]".into());

        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(
            json,
            r#"{"isRepo":true,"hasCommits":false,"branch":"main","version":"main-3 [abc1234]"}"#
        );
        assert_eq!(info.branch(), Some("main"));
        assert_eq!(info.version(), Some("main-3 [abc1234]"));
    }

    #[test]
    fn test_lookup_answers_flags() {
        let mut info = RepositoryInfo::not_a_repo();
        assert_eq!(info.lookup("isRepo"), Some(FieldValue::Bool(false)));
        assert_eq!(info.lookup("hasCommits"), Some(FieldValue::Bool(false)));
        assert_eq!(info.lookup("branch"), None);

        info.is_repo = true;
        info.fields.insert("branch".to_string(), "main".into());
        assert_eq!(info.lookup("isRepo"), Some(FieldValue::Bool(true)));
        assert_eq!(info.lookup("branch"), Some("main".into()));
    }
}

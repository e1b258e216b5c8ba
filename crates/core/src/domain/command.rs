// Git command descriptors

use chrono::DateTime;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::value::FieldValue;

/// User-supplied post-processing function
pub type TransformFn = Arc<dyn Fn(&str) -> Option<FieldValue> + Send + Sync>;

/// Post-processing applied to the trimmed stdout of a successful command
///
/// A transform returning `None` could not interpret its input; the field becomes `Null`.
#[derive(Clone)]
pub enum Transform {
    /// Replace the first occurrence of `from` with `to`
    Replace { from: String, to: String },
    /// Parse a base-10 integer
    Integer,
    /// Parse an RFC 2822 timestamp (`git log --date=rfc2822`)
    Rfc2822Date,
    Custom(TransformFn),
}

impl Transform {
    pub fn replace(from: impl Into<String>, to: impl Into<String>) -> Self {
        Transform::Replace {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> Option<FieldValue> + Send + Sync + 'static,
    {
        Transform::Custom(Arc::new(f))
    }

    pub fn apply(&self, raw: &str) -> Option<FieldValue> {
        match self {
            Transform::Replace { from, to } => Some(FieldValue::Text(raw.replacen(from, to, 1))),
            Transform::Integer => raw.parse::<i64>().ok().map(FieldValue::Integer),
            Transform::Rfc2822Date => DateTime::parse_from_rfc2822(raw)
                .ok()
                .map(FieldValue::Timestamp),
            Transform::Custom(f) => f(raw),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Replace { from, to } => f
                .debug_struct("Replace")
                .field("from", from)
                .field("to", to)
                .finish(),
            Transform::Integer => write!(f, "Integer"),
            Transform::Rfc2822Date => write!(f, "Rfc2822Date"),
            Transform::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Command Descriptor: a named repository query
#[derive(Debug, Clone)]
pub struct GitCommand {
    pub name: String,
    /// Subcommand and arguments, space separated (e.g. `rev-parse HEAD`)
    pub template: String,
    pub transform: Option<Transform>,
}

impl GitCommand {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: template.into(),
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Template tokens passed to the binary after `--git-dir <dir>`
    pub fn args(&self) -> Vec<String> {
        self.template
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Turn the stdout of a successful run into the field value
    pub fn process(&self, stdout: &str) -> FieldValue {
        let out = stdout.trim();
        let Some(transform) = &self.transform else {
            return FieldValue::Text(out.to_string());
        };

        match transform.apply(out) {
            Some(value) => value,
            None => {
                warn!(
                    command = %self.name,
                    output = %out,
                    transform = ?transform,
                    "Command output could not be transformed, using null"
                );
                FieldValue::Null
            }
        }
    }
}

/// Ordered collection of command descriptors keyed by name
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    entries: IndexMap<String, GitCommand>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command, replacing any earlier entry with the same name in place
    pub fn with(mut self, command: GitCommand) -> Self {
        self.insert(command);
        self
    }

    pub fn insert(&mut self, command: GitCommand) {
        self.entries.insert(command.name.clone(), command);
    }

    pub fn get(&self, name: &str) -> Option<&GitCommand> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GitCommand> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<GitCommand> for CommandTable {
    fn from_iter<I: IntoIterator<Item = GitCommand>>(iter: I) -> Self {
        let mut table = CommandTable::new();
        for command in iter {
            table.insert(command);
        }
        table
    }
}

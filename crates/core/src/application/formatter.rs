// Output Formatter - derived fields computed from a raw record

use indexmap::IndexMap;
use std::sync::Arc;

use crate::domain::{FieldValue, Record};

/// Pure function computing one derived field from the full raw record
pub type Derivation = Arc<dyn Fn(&Record) -> FieldValue + Send + Sync>;

/// Ordered derived-field name -> derivation
pub type Derivations = IndexMap<String, Derivation>;

pub fn derivation<F>(f: F) -> Derivation
where
    F: Fn(&Record) -> FieldValue + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Compute every derivation against `data`
///
/// Absent data yields an empty record without invoking any derivation.
pub fn format_output(data: Option<&Record>, derivations: &Derivations) -> Record {
    let Some(data) = data else {
        return Record::new();
    };

    derivations
        .iter()
        .map(|(name, derive)| (name.clone(), derive(data)))
        .collect()
}

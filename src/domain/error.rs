use thiserror::Error;

/// Integrity violations found while assembling a content catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("{entity} `{id}` is declared more than once")]
    Duplicate { entity: &'static str, id: i64 },
    #[error("{owner} `{owner_id}` references unknown {entity} `{id}`")]
    DanglingReference {
        owner: &'static str,
        owner_id: i64,
        entity: &'static str,
        id: i64,
    },
    #[error("custom field key `{name_key}` is invalid: {reason}")]
    InvalidFieldKey { name_key: String, reason: String },
}

impl DomainError {
    pub fn duplicate(entity: &'static str, id: i64) -> Self {
        Self::Duplicate { entity, id }
    }

    pub fn dangling(owner: &'static str, owner_id: i64, entity: &'static str, id: i64) -> Self {
        Self::DanglingReference {
            owner,
            owner_id,
            entity,
            id,
        }
    }

    pub fn invalid_field_key(name_key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFieldKey {
            name_key: name_key.into(),
            reason: reason.into(),
        }
    }
}

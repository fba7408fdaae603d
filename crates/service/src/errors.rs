use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e {
            sea_orm::DbErr::RecordNotFound(msg) => ServiceError::NotFound(msg),
            sea_orm::DbErr::RecordNotUpdated => ServiceError::not_found("listing"),
            other => ServiceError::Db(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_map_to_service_errors() {
        assert!(matches!(ServiceError::from(sea_orm::DbErr::RecordNotUpdated), ServiceError::NotFound(_)));
        let err = ServiceError::from(sea_orm::DbErr::Custom("boom".into()));
        assert!(matches!(err, ServiceError::Db(ref m) if m.contains("boom")));
    }
}

use tracing::debug;

use super::session::Session;

/// Whether the session user owns a record belonging to `owner_id`.
/// Anonymous sessions own nothing.
pub fn is_owner(session: &Session, owner_id: i32) -> bool {
    match session.current_user() {
        Some(user) => {
            let owns = user.0 == owner_id;
            if !owns {
                debug!(user_id = %user, owner_id, "ownership check failed");
            }
            owns
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::session::UserId;

    #[test]
    fn owner_matches_user_id() {
        assert!(is_owner(&Session::for_user(UserId(5)), 5));
        assert!(!is_owner(&Session::for_user(UserId(6)), 5));
    }

    #[test]
    fn anonymous_owns_nothing() {
        assert!(!is_owner(&Session::anonymous(), 0));
    }
}

use serde::{Deserialize, Serialize};

/// The "currently selected profile" used to be implicit shared state across
/// every view; here it is an explicit value object threaded through the
/// operations that care, with one invalidation rule: deleting the profile
/// it points at clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub selected_profile: Option<String>,
}

impl Session {
    pub fn select(&mut self, profile_id: String) {
        self.selected_profile = Some(profile_id);
    }

    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.selected_profile = None;
    }

    /// Drop the selection iff it pointed at the deleted profile.
    pub fn invalidate(&mut self, deleted_id: &str) {
        if self.selected_profile.as_deref() == Some(deleted_id) {
            self.selected_profile = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_clears_only_matching_selection() {
        let mut session = Session::default();
        session.select("p1".to_string());

        session.invalidate("p2");
        assert_eq!(session.selected_profile.as_deref(), Some("p1"));

        session.invalidate("p1");
        assert_eq!(session.selected_profile, None);
    }
}

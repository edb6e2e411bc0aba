use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    BusinessProfile, InvestorNote, PitchAssessment, PitchResult, ProfileDraft, ProfileNote,
    RoadmapAssessment, RoadmapResult, SavedArtifact, SavedLogo, StrategyAssessment,
    StrategyResult,
};
use crate::session::Session;
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("no business profile with id '{0}'")]
    NotFound(String),
    #[error("no note with id '{note_id}' on profile '{profile_id}'")]
    NoteNotFound {
        profile_id: String,
        note_id: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields of a note edit. Only supplied fields are merged; the rest of the
/// note is left as it was.
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Attaches generated artifacts to a stored profile without disturbing its
/// siblings. Every operation is load, edit one sub-collection, write back;
/// there is no transaction, so two overlapping cycles on the same profile
/// are a lost-update hazard (last write wins).
pub struct Profiles<'a> {
    store: &'a Store,
}

impl<'a> Profiles<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn create(&self, draft: ProfileDraft) -> Result<BusinessProfile, ProfileError> {
        let mut profile = BusinessProfile {
            id: String::new(),
            business_name: draft.business_name,
            business_type: draft.business_type,
            solo_or_team: draft.solo_or_team,
            stage: draft.stage,
            time_available_per_week: draft.time_available_per_week,
            income_urgency: draft.income_urgency,
            target_customer: draft.target_customer,
            problem_being_solved: draft.problem_being_solved,
            pricing_model: draft.pricing_model,
            created_at: Utc::now(),
            existing_assets: draft.existing_assets,
            saved_roadmaps: Vec::new(),
            saved_pitches: Vec::new(),
            saved_revenue_strategies: Vec::new(),
            saved_logos: Vec::new(),
            notes: Vec::new(),
            favorite_investors: Vec::new(),
            investor_notes: Default::default(),
        };
        self.store.upsert(&mut profile)?;
        Ok(profile)
    }

    pub fn list(&self) -> Vec<BusinessProfile> {
        self.store.list()
    }

    pub fn get(&self, profile_id: &str) -> Result<BusinessProfile, ProfileError> {
        self.store
            .list::<BusinessProfile>()
            .into_iter()
            .find(|p| p.id == profile_id)
            .ok_or_else(|| ProfileError::NotFound(profile_id.to_string()))
    }

    /// Deletes the profile and clears the session selection if it pointed
    /// at the deleted id.
    pub fn delete(&self, profile_id: &str, session: &mut Session) -> Result<(), ProfileError> {
        self.get(profile_id)?;
        self.store.remove::<BusinessProfile>(profile_id)?;
        session.invalidate(profile_id);
        Ok(())
    }

    fn modify<F>(&self, profile_id: &str, edit: F) -> Result<BusinessProfile, ProfileError>
    where
        F: FnOnce(&mut BusinessProfile),
    {
        let mut profile = self.get(profile_id)?;
        edit(&mut profile);
        self.store.upsert(&mut profile)?;
        Ok(profile)
    }

    fn new_artifact<A, R>(assessment: A, result: R) -> SavedArtifact<A, R> {
        let now = Utc::now();
        SavedArtifact {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            assessment,
            result,
        }
    }

    pub fn attach_roadmap(
        &self,
        profile_id: &str,
        assessment: RoadmapAssessment,
        result: RoadmapResult,
    ) -> Result<SavedArtifact<RoadmapAssessment, RoadmapResult>, ProfileError> {
        let artifact = Self::new_artifact(assessment, result);
        let saved = artifact.clone();
        self.modify(profile_id, |p| {
            p.saved_roadmaps.push(artifact);
        })?;
        Ok(saved)
    }

    pub fn attach_pitch(
        &self,
        profile_id: &str,
        assessment: PitchAssessment,
        result: PitchResult,
    ) -> Result<SavedArtifact<PitchAssessment, PitchResult>, ProfileError> {
        let artifact = Self::new_artifact(assessment, result);
        let saved = artifact.clone();
        self.modify(profile_id, |p| {
            p.saved_pitches.push(artifact);
        })?;
        Ok(saved)
    }

    pub fn attach_strategy(
        &self,
        profile_id: &str,
        assessment: StrategyAssessment,
        result: StrategyResult,
    ) -> Result<SavedArtifact<StrategyAssessment, StrategyResult>, ProfileError> {
        let artifact = Self::new_artifact(assessment, result);
        let saved = artifact.clone();
        self.modify(profile_id, |p| {
            p.saved_revenue_strategies.push(artifact);
        })?;
        Ok(saved)
    }

    pub fn attach_logo(
        &self,
        profile_id: &str,
        style: &str,
        image_ref: &str,
    ) -> Result<SavedLogo, ProfileError> {
        let logo = SavedLogo {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            style: style.to_string(),
            image_ref: image_ref.to_string(),
        };
        let saved = logo.clone();
        self.modify(profile_id, |p| {
            p.saved_logos.push(logo);
        })?;
        Ok(saved)
    }

    /// Set-append: already-present assets are not duplicated.
    pub fn add_asset(&self, profile_id: &str, asset: &str) -> Result<(), ProfileError> {
        self.modify(profile_id, |p| {
            if !p.existing_assets.iter().any(|a| a == asset) {
                p.existing_assets.push(asset.to_string());
            }
        })?;
        Ok(())
    }

    pub fn save_note(
        &self,
        profile_id: &str,
        title: &str,
        content: &str,
    ) -> Result<ProfileNote, ProfileError> {
        let now = Utc::now();
        let note = ProfileNote {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        let saved = note.clone();
        self.modify(profile_id, |p| {
            p.notes.push(note);
        })?;
        Ok(saved)
    }

    /// Merges only the supplied patch fields and refreshes `updated_at`.
    pub fn update_note(
        &self,
        profile_id: &str,
        note_id: &str,
        patch: NotePatch,
    ) -> Result<ProfileNote, ProfileError> {
        let mut profile = self.get(profile_id)?;
        let note = profile
            .notes
            .iter_mut()
            .find(|n| n.id == note_id)
            .ok_or_else(|| ProfileError::NoteNotFound {
                profile_id: profile_id.to_string(),
                note_id: note_id.to_string(),
            })?;
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        note.updated_at = Utc::now();
        let updated = note.clone();
        self.store.upsert(&mut profile)?;
        Ok(updated)
    }

    /// Deleting an already-gone note is a no-op, matching store removal.
    pub fn delete_note(&self, profile_id: &str, note_id: &str) -> Result<(), ProfileError> {
        self.modify(profile_id, |p| {
            p.notes.retain(|n| n.id != note_id);
        })?;
        Ok(())
    }

    /// Flips membership and returns the new state. A repeated call undoes
    /// the previous one; a single call is never idempotent.
    pub fn toggle_favorite_investor(
        &self,
        profile_id: &str,
        investor_id: &str,
    ) -> Result<bool, ProfileError> {
        let mut favorited = false;
        self.modify(profile_id, |p| {
            if let Some(pos) = p.favorite_investors.iter().position(|i| i == investor_id) {
                p.favorite_investors.remove(pos);
            } else {
                p.favorite_investors.push(investor_id.to_string());
                favorited = true;
            }
        })?;
        Ok(favorited)
    }

    /// Full replacement of the investor's entry: callers pass the complete
    /// desired state, unlike note patches which merge. Compatibility is
    /// clamped to 0-100.
    pub fn save_investor_note(
        &self,
        profile_id: &str,
        investor_id: &str,
        pros: Vec<String>,
        cons: Vec<String>,
        compatibility: i64,
        notes: &str,
    ) -> Result<(), ProfileError> {
        let entry = InvestorNote {
            pros,
            cons,
            compatibility: compatibility.clamp(0, 100) as u8,
            notes: notes.to_string(),
        };
        self.modify(profile_id, |p| {
            p.investor_notes.insert(investor_id.to_string(), entry);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BusinessType, IncomeUrgency, Milestone, SoloOrTeam, Stage};
    use crate::store::Store;

    fn acme_draft() -> ProfileDraft {
        ProfileDraft {
            business_name: "Acme".to_string(),
            business_type: BusinessType::Product,
            solo_or_team: SoloOrTeam::Solo,
            stage: Stage::IdeaOnly,
            time_available_per_week: "10 hours".to_string(),
            income_urgency: IncomeUrgency::Immediate,
            target_customer: None,
            problem_being_solved: None,
            pricing_model: None,
            existing_assets: vec!["Skills".to_string()],
        }
    }

    fn roadmap_assessment() -> RoadmapAssessment {
        RoadmapAssessment {
            business_name: "Acme".to_string(),
            business_type: BusinessType::Product,
            stage: Stage::IdeaOnly,
            time_available_per_week: "10 hours".to_string(),
            income_urgency: IncomeUrgency::Immediate,
            existing_assets: vec!["Skills".to_string()],
        }
    }

    fn roadmap_result() -> RoadmapResult {
        RoadmapResult {
            summary: "Ship a prototype".to_string(),
            milestones: vec![Milestone {
                title: "Landing page".to_string(),
                description: "Validate demand".to_string(),
                timeframe: "Week 1".to_string(),
            }],
        }
    }

    fn pitch_result() -> PitchResult {
        PitchResult {
            elevator_pitch: "Acme does X".to_string(),
            problem: "X is slow".to_string(),
            solution: "Acme makes X fast".to_string(),
            ask: "Intro to customers".to_string(),
        }
    }

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_at(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_create_assigns_unique_ids_and_empty_collections() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);

        let a = profiles.create(acme_draft()).unwrap();
        let b = profiles.create(acme_draft()).unwrap();

        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(a.saved_roadmaps.is_empty());
        assert!(a.notes.is_empty());

        let listed = profiles.list();
        assert_eq!(listed.iter().filter(|p| p.id == a.id).count(), 1);
        assert_eq!(listed.iter().filter(|p| p.id == b.id).count(), 1);
    }

    #[test]
    fn test_get_unknown_profile_is_not_found() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        assert!(matches!(
            profiles.get("missing"),
            Err(ProfileError::NotFound(_))
        ));
        assert!(matches!(
            profiles.attach_roadmap("missing", roadmap_assessment(), roadmap_result()),
            Err(ProfileError::NotFound(_))
        ));
    }

    #[test]
    fn test_appends_never_disturb_sibling_artifacts() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let profile = profiles.create(acme_draft()).unwrap();

        let roadmap = profiles
            .attach_roadmap(&profile.id, roadmap_assessment(), roadmap_result())
            .unwrap();
        profiles
            .attach_pitch(
                &profile.id,
                PitchAssessment {
                    business_name: "Acme".to_string(),
                    target_customer: None,
                    problem_being_solved: None,
                    pricing_model: None,
                },
                pitch_result(),
            )
            .unwrap();
        profiles.save_note(&profile.id, "Idea", "Try ads").unwrap();

        let stored = profiles.get(&profile.id).unwrap();
        assert_eq!(stored.saved_roadmaps, vec![roadmap]);
        assert_eq!(stored.saved_pitches.len(), 1);
        assert_eq!(stored.notes.len(), 1);
    }

    #[test]
    fn test_note_lifecycle_acme_scenario() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let profile = profiles.create(acme_draft()).unwrap();

        let note = profiles.save_note(&profile.id, "Title", "Body").unwrap();
        assert_eq!(note.title, "Title");
        assert_eq!(note.content, "Body");
        assert_eq!(note.created_at, note.updated_at);

        std::thread::sleep(std::time::Duration::from_millis(10));
        let edited = profiles
            .update_note(
                &profile.id,
                &note.id,
                NotePatch {
                    title: None,
                    content: Some("Body2".to_string()),
                },
            )
            .unwrap();
        assert_eq!(edited.title, "Title");
        assert_eq!(edited.content, "Body2");
        assert!(edited.updated_at > edited.created_at);

        let stored = profiles.get(&profile.id).unwrap();
        assert_eq!(stored.notes, vec![edited]);
    }

    #[test]
    fn test_update_missing_note_fails_without_partial_effect() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let profile = profiles.create(acme_draft()).unwrap();
        profiles.save_note(&profile.id, "Keep", "me").unwrap();

        let result = profiles.update_note(
            &profile.id,
            "missing",
            NotePatch {
                title: Some("x".to_string()),
                content: None,
            },
        );
        assert!(matches!(result, Err(ProfileError::NoteNotFound { .. })));

        let stored = profiles.get(&profile.id).unwrap();
        assert_eq!(stored.notes.len(), 1);
        assert_eq!(stored.notes[0].title, "Keep");
    }

    #[test]
    fn test_delete_note_removes_only_that_note() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let profile = profiles.create(acme_draft()).unwrap();
        let a = profiles.save_note(&profile.id, "A", "a").unwrap();
        let b = profiles.save_note(&profile.id, "B", "b").unwrap();

        profiles.delete_note(&profile.id, &a.id).unwrap();
        let stored = profiles.get(&profile.id).unwrap();
        assert_eq!(stored.notes, vec![b]);

        // Deleting again is a no-op.
        profiles.delete_note(&profile.id, &a.id).unwrap();
        assert_eq!(profiles.get(&profile.id).unwrap().notes.len(), 1);
    }

    #[test]
    fn test_toggle_favorite_twice_restores_membership() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let profile = profiles.create(acme_draft()).unwrap();

        assert!(profiles
            .toggle_favorite_investor(&profile.id, "inv-7")
            .unwrap());
        assert_eq!(
            profiles.get(&profile.id).unwrap().favorite_investors,
            vec!["inv-7".to_string()]
        );

        assert!(!profiles
            .toggle_favorite_investor(&profile.id, "inv-7")
            .unwrap());
        assert!(profiles.get(&profile.id).unwrap().favorite_investors.is_empty());
    }

    #[test]
    fn test_save_investor_note_replaces_not_merges() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let profile = profiles.create(acme_draft()).unwrap();

        profiles
            .save_investor_note(
                &profile.id,
                "inv-7",
                vec!["deep pockets".to_string()],
                vec!["slow".to_string()],
                80,
                "warm intro",
            )
            .unwrap();
        profiles
            .save_investor_note(&profile.id, "inv-7", vec![], vec![], 150, "cold")
            .unwrap();

        let stored = profiles.get(&profile.id).unwrap();
        let entry = &stored.investor_notes["inv-7"];
        assert!(entry.pros.is_empty());
        assert!(entry.cons.is_empty());
        assert_eq!(entry.compatibility, 100);
        assert_eq!(entry.notes, "cold");
    }

    #[test]
    fn test_compatibility_is_clamped_low() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let profile = profiles.create(acme_draft()).unwrap();

        profiles
            .save_investor_note(&profile.id, "inv-1", vec![], vec![], -5, "")
            .unwrap();
        let stored = profiles.get(&profile.id).unwrap();
        assert_eq!(stored.investor_notes["inv-1"].compatibility, 0);
    }

    #[test]
    fn test_add_asset_has_set_semantics() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let profile = profiles.create(acme_draft()).unwrap();

        profiles.add_asset(&profile.id, "Skills").unwrap();
        profiles.add_asset(&profile.id, "Audience").unwrap();
        let stored = profiles.get(&profile.id).unwrap();
        assert_eq!(
            stored.existing_assets,
            vec!["Skills".to_string(), "Audience".to_string()]
        );
    }

    #[test]
    fn test_delete_cascades_to_session_selection() {
        let (_dir, store) = test_store();
        let profiles = Profiles::new(&store);
        let keep = profiles.create(acme_draft()).unwrap();
        let gone = profiles.create(acme_draft()).unwrap();

        let mut session = Session::default();
        session.select(gone.id.clone());

        profiles.delete(&gone.id, &mut session).unwrap();
        assert_eq!(session.selected_profile, None);
        assert!(profiles.list().iter().all(|p| p.id != gone.id));

        // An unrelated selection survives a delete.
        session.select(keep.id.clone());
        let another = profiles.create(acme_draft()).unwrap();
        profiles.delete(&another.id, &mut session).unwrap();
        assert_eq!(session.selected_profile.as_deref(), Some(keep.id.as_str()));
    }
}

use crate::models::{BusinessProfile, JobStatus, SavedJob};
use crate::store::Entity;

/// Status filter with an explicit "show everything" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(JobStatus),
}

/// Whether a job with this application URL is already tracked.
pub fn is_saved(jobs: &[SavedJob], apply_url: &str) -> bool {
    jobs.iter().any(|j| j.id == apply_url)
}

/// Whether the investor is in the profile's favorites.
pub fn is_favorited(profile: &BusinessProfile, investor_id: &str) -> bool {
    profile.favorite_investors.iter().any(|i| i == investor_id)
}

pub fn filter_by_status(jobs: &[SavedJob], filter: StatusFilter) -> Vec<&SavedJob> {
    jobs.iter()
        .filter(|j| match filter {
            StatusFilter::All => true,
            StatusFilter::Only(status) => j.status == status,
        })
        .collect()
}

/// First match or None; the linear scan is fine at tens of records.
pub fn find_by_id<'a, T: Entity>(collection: &'a [T], id: &str) -> Option<&'a T> {
    collection.iter().find(|e| e.id() == id)
}

//! Leaderboard of users, ranked by name or by owned NFTs

use crate::client::{HttpClient, UsersPageFetcher};
use crate::models::{User, UserSort};
use catalog_cache::{Page, PaginatedAccumulator, Result};
use std::sync::Arc;

/// Paged leaderboard
///
/// Each page is appended and the whole list is re-ranked by the chosen
/// [`UserSort`]. Clones share the same list and cursor.
#[derive(Clone)]
pub struct StatisticsService {
    users: Arc<PaginatedAccumulator<User, UsersPageFetcher>>,
    sort: UserSort,
}

impl StatisticsService {
    pub fn new(client: HttpClient, sort: UserSort) -> Self {
        let users = PaginatedAccumulator::new(UsersPageFetcher::new(client))
            .with_sort_by(move |a: &User, b: &User| sort.compare(a, b));
        Self {
            users: Arc::new(users),
            sort,
        }
    }

    pub fn sort(&self) -> UserSort {
        self.sort
    }

    /// Load the next page of users
    ///
    /// `Ok(None)` means another page load was already running and this call
    /// did nothing.
    pub async fn fetch_next_page(&self) -> Result<Option<Page<User>>> {
        self.users.fetch_next_page().await
    }

    /// Every user loaded so far, ranked
    pub async fn users(&self) -> Vec<User> {
        self.users.items().await
    }

    pub async fn next_page(&self) -> u32 {
        self.users.cursor().await
    }

    pub fn is_loading(&self) -> bool {
        self.users.is_loading()
    }
}

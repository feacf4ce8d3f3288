//! Session state for one browsing user and the pure updates applied to it.
//!
//! Lookups are issued outside the session lock. Each one carries a ticket
//! stamped with the generation it was issued under; applying a ticket from an
//! older generation is a no-op, so the most recent action always wins.
use crate::favourites::FavouritesList;
use crate::models::ShowRecord;
use crate::selection::EMPTY_INPUT_MESSAGE;
use tracing::debug;

pub const LOOKUP_FAILED_MESSAGE: &str = "Could not reach the show service. Please try again.";
pub const SAVE_FAILED_MESSAGE: &str = "Could not save favourites.";

#[derive(Debug, Clone)]
pub struct Session {
    pub selected_key: String,
    pub favourites: FavouritesList,
    pub results: Vec<ShowRecord>,
    /// Transient message shown on the status line ahead of the results status.
    pub notice: Option<String>,
    pub overlay: Option<ShowRecord>,
    loaded: bool,
    search_generation: u64,
    details_generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsTicket {
    generation: u64,
    pub id: u32,
}

impl Session {
    pub fn new(selected_key: String, favourites: FavouritesList) -> Self {
        Self {
            selected_key,
            favourites,
            results: Vec::new(),
            notice: None,
            overlay: None,
            loaded: false,
            search_generation: 0,
            details_generation: 0,
        }
    }

    /// Whether any search response has been applied yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn begin_search(&mut self, key: String) -> SearchTicket {
        self.search_generation += 1;
        self.selected_key = key.clone();
        SearchTicket {
            generation: self.search_generation,
            key,
        }
    }

    pub fn apply_search(&mut self, ticket: &SearchTicket, results: Vec<ShowRecord>) -> bool {
        if ticket.generation != self.search_generation {
            debug!(key = %ticket.key, "Dropping superseded search response");
            return false;
        }
        self.results = results;
        self.notice = None;
        self.loaded = true;
        true
    }

    /// Leaves `loaded` untouched so the next page load retries the search.
    pub fn fail_search(&mut self, ticket: &SearchTicket) -> bool {
        if ticket.generation != self.search_generation {
            return false;
        }
        self.notice = Some(LOOKUP_FAILED_MESSAGE.to_string());
        true
    }

    /// Blank search box: prior results stay mounted.
    pub fn reject_empty_input(&mut self) {
        self.notice = Some(EMPTY_INPUT_MESSAGE.to_string());
    }

    pub fn begin_details(&mut self, id: u32) -> DetailsTicket {
        self.details_generation += 1;
        DetailsTicket {
            generation: self.details_generation,
            id,
        }
    }

    /// Replaces any open overlay with `record`.
    pub fn apply_details(&mut self, ticket: &DetailsTicket, record: ShowRecord) -> bool {
        if ticket.generation != self.details_generation {
            debug!(show_id = ticket.id, "Dropping superseded details response");
            return false;
        }
        self.overlay = Some(record);
        self.notice = None;
        true
    }

    pub fn fail_details(&mut self, ticket: &DetailsTicket) -> bool {
        if ticket.generation != self.details_generation {
            return false;
        }
        self.notice = Some(LOOKUP_FAILED_MESSAGE.to_string());
        true
    }

    /// Hides the overlay. Any details lookup still in flight is superseded.
    pub fn close_details(&mut self) {
        self.details_generation += 1;
        self.overlay = None;
        self.notice = None;
    }

    pub fn set_favourites(&mut self, favourites: FavouritesList) {
        self.favourites = favourites;
        self.notice = None;
    }

    pub fn set_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
    }

    /// A record already known to the session: current results, the open
    /// overlay, then favourites.
    pub fn find_record(&self, id: u32) -> Option<ShowRecord> {
        self.results
            .iter()
            .find(|r| r.id == id)
            .or_else(|| self.overlay.as_ref().filter(|r| r.id == id))
            .or_else(|| self.favourites.get(id))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(id: u32) -> ShowRecord {
        ShowRecord {
            id,
            name: format!("Show {id}"),
            image: None,
            summary: None,
            cast: vec![],
        }
    }

    fn session() -> Session {
        Session::new("harry".to_string(), FavouritesList::new())
    }

    #[test]
    fn later_search_wins_regardless_of_arrival_order() {
        let mut s = session();
        let first = s.begin_search("harry".to_string());
        let second = s.begin_search("friends".to_string());

        assert!(s.apply_search(&second, vec![show(2)]));
        assert!(!s.apply_search(&first, vec![show(1)]));
        assert_eq!(s.results, vec![show(2)]);
        assert_eq!(s.selected_key, "friends");
    }

    #[test]
    fn empty_input_keeps_results() {
        let mut s = session();
        let t = s.begin_search("harry".to_string());
        s.apply_search(&t, vec![show(1), show(2)]);
        s.reject_empty_input();
        assert_eq!(s.results.len(), 2);
        assert_eq!(s.notice.as_deref(), Some(EMPTY_INPUT_MESSAGE));
        assert_eq!(s.selected_key, "harry");
    }

    #[test]
    fn close_supersedes_pending_details() {
        let mut s = session();
        let t = s.begin_details(5);
        s.close_details();
        assert!(!s.apply_details(&t, show(5)));
        assert!(s.overlay.is_none());
    }

    #[test]
    fn reopening_details_replaces_overlay() {
        let mut s = session();
        let a = s.begin_details(1);
        assert!(s.apply_details(&a, show(1)));
        let b = s.begin_details(2);
        assert!(s.apply_details(&b, show(2)));
        assert_eq!(s.overlay.as_ref().map(|r| r.id), Some(2));
    }

    #[test]
    fn details_actions_clear_a_stale_notice() {
        let mut s = session();
        s.reject_empty_input();
        let t = s.begin_details(3);
        assert!(s.apply_details(&t, show(3)));
        assert_eq!(s.notice, None);

        s.set_notice(SAVE_FAILED_MESSAGE);
        s.close_details();
        assert_eq!(s.notice, None);
    }

    #[test]
    fn failed_first_search_is_retried() {
        let mut s = session();
        let t = s.begin_search("harry".to_string());
        assert!(s.fail_search(&t));
        assert!(!s.is_loaded());
        assert_eq!(s.notice.as_deref(), Some(LOOKUP_FAILED_MESSAGE));
    }

    #[test]
    fn find_record_checks_overlay_and_favourites() {
        let mut s = session();
        let t = s.begin_details(9);
        s.apply_details(&t, show(9));
        assert_eq!(s.find_record(9), Some(show(9)));
        assert_eq!(s.find_record(10), None);
    }
}

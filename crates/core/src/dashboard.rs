//! Dashboard counters over a set of tickets.
//!
//! Works on anything implementing [`TicketFacts`] so the server (database
//! rows) and the client (decoded API payloads) share one implementation.

use serde::{Deserialize, Serialize};

use crate::authorized_email::normalize_email;
use crate::ticket::{STATUS_CLOSED, STATUS_IN_PROGRESS, STATUS_OPEN, STATUS_RESOLVED};
use crate::types::Timestamp;

/// Number of tickets shown in the dashboard's "recent" panel.
pub const RECENT_TICKETS: usize = 6;

/// The few ticket attributes the dashboard needs.
pub trait TicketFacts {
    fn status(&self) -> &str;
    fn owner_email(&self) -> &str;
    fn created_at(&self) -> Timestamp;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    /// Resolved and closed together.
    pub resolved: usize,
    /// Tickets filed by the viewer.
    pub mine: usize,
}

impl TicketStats {
    pub fn compute<T: TicketFacts>(tickets: &[T], viewer_email: Option<&str>) -> Self {
        let viewer = viewer_email.map(normalize_email);
        let mut stats = TicketStats {
            total: tickets.len(),
            ..Default::default()
        };
        for t in tickets {
            match t.status() {
                STATUS_OPEN => stats.open += 1,
                STATUS_IN_PROGRESS => stats.in_progress += 1,
                STATUS_RESOLVED | STATUS_CLOSED => stats.resolved += 1,
                _ => {}
            }
            if let Some(v) = &viewer {
                if normalize_email(t.owner_email()) == *v {
                    stats.mine += 1;
                }
            }
        }
        stats
    }
}

/// The `n` newest tickets, newest first.
pub fn recent<T: TicketFacts + Clone>(tickets: &[T], n: usize) -> Vec<T> {
    let mut sorted = tickets.to_vec();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.created_at()));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[derive(Clone)]
    struct Fake {
        status: &'static str,
        owner: &'static str,
        created_at: Timestamp,
    }

    impl TicketFacts for Fake {
        fn status(&self) -> &str {
            self.status
        }
        fn owner_email(&self) -> &str {
            self.owner
        }
        fn created_at(&self) -> Timestamp {
            self.created_at
        }
    }

    fn fake(status: &'static str, owner: &'static str, age_mins: i64) -> Fake {
        Fake {
            status,
            owner,
            created_at: Utc::now() - Duration::minutes(age_mins),
        }
    }

    #[test]
    fn counts_by_status_and_owner() {
        let tickets = vec![
            fake(STATUS_OPEN, "ana@clinic.org", 1),
            fake(STATUS_OPEN, "luis@clinic.org", 2),
            fake(STATUS_IN_PROGRESS, "ana@clinic.org", 3),
            fake(STATUS_RESOLVED, "luis@clinic.org", 4),
            fake(STATUS_CLOSED, "Ana@Clinic.org", 5),
        ];
        let stats = TicketStats::compute(&tickets, Some("ana@clinic.org"));
        assert_eq!(
            stats,
            TicketStats { total: 5, open: 2, in_progress: 1, resolved: 2, mine: 3 }
        );
    }

    #[test]
    fn no_viewer_means_no_own_tickets() {
        let tickets = vec![fake(STATUS_OPEN, "ana@clinic.org", 1)];
        assert_eq!(TicketStats::compute(&tickets, None).mine, 0);
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = TicketStats::compute::<Fake>(&[], Some("x@y.z"));
        assert_eq!(stats, TicketStats::default());
    }

    #[test]
    fn recent_sorts_newest_first_and_truncates() {
        let tickets: Vec<_> = (0..10).map(|i| fake(STATUS_OPEN, "a@b.c", 10 - i)).collect();
        let top = recent(&tickets, RECENT_TICKETS);
        assert_eq!(top.len(), RECENT_TICKETS);
        assert!(top.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(top[0].created_at, tickets[9].created_at);
    }
}

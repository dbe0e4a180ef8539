//! Terminal resolution: pick exactly one terminal binding for a shop from
//! progressively-specific routing hints.
//!
//! Each hint is a weaker filter than the previous one, applied in a fixed
//! order. A hint that matches nothing in the current candidate set is treated
//! as not provided rather than as a failure, so a single generic binding
//! still serves shops that never configured fine-grained routing.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::error::StorageError;
use crate::storage::models::TerminalBinding;
use crate::storage::TerminalStore;

/// Optional disambiguation hints from the POS session, most specific first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingHints {
    pub location_id: Option<String>,
    pub staff_member_id: Option<String>,
    pub user_id: Option<String>,
    pub shop_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no terminal bound to shop {shop_domain}")]
    NoTerminalForShop { shop_domain: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Resolves a shop's inbound request to exactly one terminal binding.
pub struct TerminalResolver {
    store: Arc<dyn TerminalStore>,
}

impl TerminalResolver {
    pub fn new(store: Arc<dyn TerminalStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(
        &self,
        shop_domain: &str,
        hints: &RoutingHints,
    ) -> Result<TerminalBinding, ResolveError> {
        let bindings = self.store.find_by_shop_domain(shop_domain).await?;
        if bindings.is_empty() {
            warn!(shop_domain = %shop_domain, "no terminal bound to shop");
            return Err(ResolveError::NoTerminalForShop {
                shop_domain: shop_domain.to_string(),
            });
        }

        let binding = pick_binding(bindings, hints);
        info!(
            shop_domain = %shop_domain,
            terminal_id = %binding.terminal_id,
            demo = binding.demo,
            "resolved terminal binding"
        );
        Ok(binding)
    }
}

/// Narrow a non-empty candidate set down to one binding.
///
/// The set only ever shrinks: each step keeps the narrowed subset when it is
/// non-empty and keeps the wider set otherwise, so a later hint can never
/// undo an earlier successful narrowing and the set can never re-empty after
/// step one. Ties are broken by the stable creation order the store returns.
fn pick_binding(bindings: Vec<TerminalBinding>, hints: &RoutingHints) -> TerminalBinding {
    let candidates = bindings;
    let candidates = narrow(candidates, hints.location_id.as_deref(), "location_id", |b| {
        b.location_id.as_deref()
    });
    let candidates = narrow(
        candidates,
        hints.staff_member_id.as_deref(),
        "staff_member_id",
        |b| b.staff_member_id.as_deref(),
    );
    let candidates = narrow(candidates, hints.user_id.as_deref(), "user_id", |b| {
        b.user_id.as_deref()
    });
    let candidates = narrow(candidates, hints.shop_id.as_deref(), "shop_id", |b| {
        b.shop_id.as_deref()
    });

    // Non-empty by construction; first in creation order wins a tie.
    candidates
        .into_iter()
        .next()
        .expect("candidate set never empties after the shop-domain filter")
}

fn narrow(
    candidates: Vec<TerminalBinding>,
    hint: Option<&str>,
    hint_name: &str,
    field: impl Fn(&TerminalBinding) -> Option<&str>,
) -> Vec<TerminalBinding> {
    let Some(hint) = hint else {
        return candidates;
    };
    if candidates.len() <= 1 {
        return candidates;
    }

    let refined: Vec<TerminalBinding> = candidates
        .iter()
        .filter(|binding| field(binding).is_some_and(|value| value == hint))
        .cloned()
        .collect();

    if refined.is_empty() {
        debug!(hint = hint_name, value = hint, "hint matched no candidate, keeping wider set");
        candidates
    } else {
        debug!(
            hint = hint_name,
            value = hint,
            remaining = refined.len(),
            "narrowed candidate set"
        );
        refined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn binding(terminal_id: &str) -> TerminalBinding {
        TerminalBinding {
            id: Uuid::new_v4(),
            shop_domain: "acme.example-shops.com".to_string(),
            terminal_id: terminal_id.to_string(),
            api_key: "key".to_string(),
            location_id: None,
            staff_member_id: None,
            user_id: None,
            shop_id: None,
            demo: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn hints() -> RoutingHints {
        RoutingHints::default()
    }

    #[test]
    fn single_binding_wins_even_with_non_matching_hints() {
        let only = binding("T1");
        let picked = pick_binding(
            vec![only.clone()],
            &RoutingHints {
                location_id: Some("loc-404".to_string()),
                staff_member_id: Some("staff-404".to_string()),
                user_id: Some("user-404".to_string()),
                shop_id: Some("shop-404".to_string()),
            },
        );
        assert_eq!(picked.terminal_id, only.terminal_id);
    }

    #[test]
    fn matching_location_hint_narrows_to_that_binding() {
        let generic = binding("T1");
        let mut located = binding("T2");
        located.location_id = Some("loc-9".to_string());

        let picked = pick_binding(
            vec![generic, located],
            &RoutingHints {
                location_id: Some("loc-9".to_string()),
                ..hints()
            },
        );
        assert_eq!(picked.terminal_id, "T2");
    }

    #[test]
    fn non_matching_hint_keeps_the_wider_set() {
        let first = binding("T1");
        let second = binding("T2");

        let picked = pick_binding(
            vec![first, second],
            &RoutingHints {
                location_id: Some("loc-404".to_string()),
                ..hints()
            },
        );
        // Falls back to stable order: first created wins.
        assert_eq!(picked.terminal_id, "T1");
    }

    #[test]
    fn location_hint_is_applied_before_staff_hint() {
        let mut by_location = binding("T1");
        by_location.location_id = Some("loc-1".to_string());
        let mut by_staff = binding("T2");
        by_staff.staff_member_id = Some("staff-1".to_string());

        // Both hints match exactly one binding each; location wins because
        // it narrows first and the staff hint can no longer un-narrow it.
        let picked = pick_binding(
            vec![by_location, by_staff],
            &RoutingHints {
                location_id: Some("loc-1".to_string()),
                staff_member_id: Some("staff-1".to_string()),
                ..hints()
            },
        );
        assert_eq!(picked.terminal_id, "T1");
    }

    #[test]
    fn later_hints_refine_within_the_narrowed_set() {
        let mut a = binding("T1");
        a.location_id = Some("loc-1".to_string());
        a.staff_member_id = Some("staff-1".to_string());
        let mut b = binding("T2");
        b.location_id = Some("loc-1".to_string());
        b.staff_member_id = Some("staff-2".to_string());
        let mut c = binding("T3");
        c.location_id = Some("loc-2".to_string());

        let picked = pick_binding(
            vec![a, b, c],
            &RoutingHints {
                location_id: Some("loc-1".to_string()),
                staff_member_id: Some("staff-2".to_string()),
                ..hints()
            },
        );
        assert_eq!(picked.terminal_id, "T2");
    }

    #[test]
    fn narrowing_stops_once_a_single_candidate_remains() {
        let mut located = binding("T1");
        located.location_id = Some("loc-1".to_string());
        let mut other = binding("T2");
        other.shop_id = Some("shop-1".to_string());

        // After the location narrows to one, the shop_id hint must not be
        // applied even though it matches only the other binding.
        let picked = pick_binding(
            vec![located, other],
            &RoutingHints {
                location_id: Some("loc-1".to_string()),
                shop_id: Some("shop-1".to_string()),
                ..hints()
            },
        );
        assert_eq!(picked.terminal_id, "T1");
    }

    #[test]
    fn tie_break_is_deterministic_creation_order() {
        let first = binding("T1");
        let second = binding("T2");
        for _ in 0..3 {
            let picked = pick_binding(vec![first.clone(), second.clone()], &hints());
            assert_eq!(picked.terminal_id, "T1");
        }
    }
}

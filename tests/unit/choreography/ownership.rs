use super::*;

#[test]
fn latest_claim_wins() {
    let registry = OwnershipRegistry::new();
    let first = registry.claim();
    assert!(first.is_current());

    let second = registry.claim();
    assert!(!first.is_current());
    assert!(second.is_current());
    assert_eq!(registry.current(), Some(second.id()));
}

#[test]
fn dropping_the_owner_releases_the_surface() {
    let registry = OwnershipRegistry::new();
    let token = registry.claim();
    assert_eq!(registry.current(), Some(token.id()));
    drop(token);
    assert_eq!(registry.current(), None);
}

#[test]
fn dropping_a_superseded_token_keeps_the_live_owner() {
    let registry = OwnershipRegistry::new();
    let stale = registry.claim();
    let live = registry.claim();
    drop(stale);
    assert!(live.is_current());
    assert_eq!(registry.current(), Some(live.id()));
}

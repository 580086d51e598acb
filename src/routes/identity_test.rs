use super::*;

#[test]
fn missing_cookie_mints_fresh_identity() {
    let identity = Identity::from_jar(&CookieJar::new());
    assert!(identity.fresh);
    assert!(session::is_valid_identity(&identity.id));
}

#[test]
fn valid_cookie_is_reused() {
    let id = session::generate_identity();
    let jar = CookieJar::new().add(Cookie::new(IDENTITY_COOKIE, id.clone()));
    let identity = Identity::from_jar(&jar);
    assert!(!identity.fresh);
    assert_eq!(identity.id, id);
}

#[test]
fn malformed_cookie_is_replaced() {
    let jar = CookieJar::new().add(Cookie::new(IDENTITY_COOKIE, "../../etc"));
    let identity = Identity::from_jar(&jar);
    assert!(identity.fresh);
    assert_ne!(identity.id, "../../etc");
}

#[test]
fn persist_sets_cookie_for_fresh_identity() {
    let identity = Identity::from_jar(&CookieJar::new());
    let jar = identity.persist(CookieJar::new(), true);
    let cookie = jar.get(IDENTITY_COOKIE).unwrap();
    assert_eq!(cookie.value(), identity.id);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(Duration::days(400)));
}

#[test]
fn persist_leaves_jar_alone_for_known_identity() {
    let identity = Identity { id: session::generate_identity(), fresh: false };
    let jar = identity.persist(CookieJar::new(), false);
    assert!(jar.get(IDENTITY_COOKIE).is_none());
}

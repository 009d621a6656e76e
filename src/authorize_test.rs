use super::*;
use crate::test_support::profile;

fn snapshot(status: SessionStatus, admin: Option<bool>) -> SessionSnapshot {
    SessionSnapshot {
        token: admin.map(|_| "t".to_owned()),
        user: admin.map(|is_admin| profile("u1", is_admin)),
        status,
    }
}

const ALL_REQUIREMENTS: [RouteRequirement; 4] = [
    RouteRequirement::Public,
    RouteRequirement::AuthenticatedOnly,
    RouteRequirement::AuthenticatedAdminOnly,
    RouteRequirement::AnonymousOnly,
];

// =============================================================================
// decision table
// =============================================================================

#[test]
fn authenticated_only_anonymous_redirects_to_login() {
    let snap = snapshot(SessionStatus::Anonymous, None);
    assert_eq!(authorize(RouteRequirement::AuthenticatedOnly, &snap), Decision::RedirectToLogin);
}

#[test]
fn admin_route_with_regular_user_redirects_home() {
    let snap = snapshot(SessionStatus::Authenticated, Some(false));
    assert_eq!(authorize(RouteRequirement::AuthenticatedAdminOnly, &snap), Decision::RedirectToHome);
}

#[test]
fn admin_route_with_admin_renders() {
    let snap = snapshot(SessionStatus::Authenticated, Some(true));
    assert_eq!(authorize(RouteRequirement::AuthenticatedAdminOnly, &snap), Decision::Render);
}

#[test]
fn public_renders_while_verifying() {
    let snap = SessionSnapshot { token: Some("t".into()), user: None, status: SessionStatus::Verifying };
    assert_eq!(authorize(RouteRequirement::Public, &snap), Decision::Render);
}

#[test]
fn authenticated_only_shows_loading_while_verifying() {
    let snap = SessionSnapshot { token: Some("t".into()), user: None, status: SessionStatus::Verifying };
    assert_eq!(authorize(RouteRequirement::AuthenticatedOnly, &snap), Decision::ShowLoading);
}

#[test]
fn unresolved_waits_for_every_guarded_route() {
    let snap = SessionSnapshot::default();
    for requirement in ALL_REQUIREMENTS {
        let expected = if requirement == RouteRequirement::Public { Decision::Render } else { Decision::ShowLoading };
        assert_eq!(authorize(requirement, &snap), expected, "{requirement:?}");
    }
}

#[test]
fn public_always_renders() {
    for snap in [
        SessionSnapshot::default(),
        snapshot(SessionStatus::Anonymous, None),
        snapshot(SessionStatus::Authenticated, Some(false)),
        snapshot(SessionStatus::Authenticated, Some(true)),
    ] {
        assert_eq!(authorize(RouteRequirement::Public, &snap), Decision::Render);
    }
}

#[test]
fn anonymous_only_routes() {
    assert_eq!(
        authorize(RouteRequirement::AnonymousOnly, &snapshot(SessionStatus::Anonymous, None)),
        Decision::Render
    );
    assert_eq!(
        authorize(RouteRequirement::AnonymousOnly, &snapshot(SessionStatus::Authenticated, Some(false))),
        Decision::RedirectToHome
    );
    assert_eq!(
        authorize(RouteRequirement::AnonymousOnly, &snapshot(SessionStatus::Authenticated, Some(true))),
        Decision::RedirectToHome
    );
}

#[test]
fn authenticated_only_renders_for_any_signed_in_user() {
    for admin in [false, true] {
        let snap = snapshot(SessionStatus::Authenticated, Some(admin));
        assert_eq!(authorize(RouteRequirement::AuthenticatedOnly, &snap), Decision::Render);
    }
}

#[test]
fn authorize_is_repeatable() {
    let snaps = [
        SessionSnapshot::default(),
        SessionSnapshot { token: Some("t".into()), user: None, status: SessionStatus::Verifying },
        snapshot(SessionStatus::Anonymous, None),
        snapshot(SessionStatus::Authenticated, Some(false)),
        snapshot(SessionStatus::Authenticated, Some(true)),
    ];
    for snap in &snaps {
        for requirement in ALL_REQUIREMENTS {
            let before = snap.clone();
            assert_eq!(authorize(requirement, snap), authorize(requirement, snap));
            assert_eq!(*snap, before);
        }
    }
}

// =============================================================================
// RouteRequirement / Decision helpers
// =============================================================================

#[test]
fn requirement_parses_short_and_long_names() {
    assert_eq!("public".parse::<RouteRequirement>(), Ok(RouteRequirement::Public));
    assert_eq!("Admin".parse::<RouteRequirement>(), Ok(RouteRequirement::AuthenticatedAdminOnly));
    assert_eq!("authenticated_only".parse::<RouteRequirement>(), Ok(RouteRequirement::AuthenticatedOnly));
    assert_eq!(" anonymous ".parse::<RouteRequirement>(), Ok(RouteRequirement::AnonymousOnly));
    let err = "staff".parse::<RouteRequirement>().unwrap_err();
    assert_eq!(err, ParseRequirementError("staff".to_owned()));
    assert!(err.to_string().contains("unknown route requirement 'staff'"));
}

#[test]
fn requirement_serde_is_snake_case() {
    let json = serde_json::to_string(&RouteRequirement::AuthenticatedAdminOnly).unwrap();
    assert_eq!(json, "\"authenticated_admin_only\"");
}

#[test]
fn redirect_paths() {
    assert_eq!(Decision::RedirectToLogin.redirect_path(), Some("/login"));
    assert_eq!(Decision::RedirectToHome.redirect_path(), Some("/"));
    assert_eq!(Decision::Render.redirect_path(), None);
    assert_eq!(Decision::ShowLoading.redirect_path(), None);
}

use sessionguard::routing::{guard_outcome, redirect_decision, route_outcome};
use sessionguard::settings::RouteSettings;
use sessionguard::testing::constants::{PROTECTED_PATHS, PUBLIC_PATHS, TEST_EMAIL, TEST_SECRET};
use sessionguard::testing::{
    assert_guard_redirect, assert_redirect, RecordingNavigator, TestFixtures, TestSessionBuilder,
};
use sessionguard::{GuardOutcome, Navigator, RouteClass, RouteDecision, RouteTable};

#[test]
fn test_protected_path_while_signed_out_goes_to_login() {
    let routes = RouteTable::default();

    for path in PROTECTED_PATHS {
        assert_guard_redirect(&route_outcome(false, false, path, &routes), "/login");
    }
    assert_guard_redirect(
        &route_outcome(false, false, "/dashboard/store-payments", &routes),
        "/login",
    );
}

#[test]
fn test_public_path_while_signed_in_goes_to_dashboard() {
    let routes = RouteTable::default();

    for path in PUBLIC_PATHS {
        assert_guard_redirect(&route_outcome(false, true, path, &routes), "/dashboard");
    }
}

#[test]
fn test_root_follows_session() {
    let routes = RouteTable::default();

    assert_guard_redirect(&route_outcome(false, false, "/", &routes), "/login");
    assert_guard_redirect(&route_outcome(false, true, "/", &routes), "/dashboard");
    assert_guard_redirect(&route_outcome(false, true, "/?ref=email", &routes), "/dashboard");
}

#[test]
fn test_matching_paths_render() {
    let routes = RouteTable::default();

    assert_eq!(
        route_outcome(false, true, "/dashboard", &routes),
        GuardOutcome::Render
    );
    assert_eq!(
        route_outcome(false, false, "/signup", &routes),
        GuardOutcome::Render
    );
    assert_eq!(
        route_outcome(false, false, "/pricing", &routes),
        GuardOutcome::Render
    );
    assert_eq!(
        route_outcome(false, true, "/pricing", &routes),
        GuardOutcome::Render
    );
}

#[test]
fn test_no_decision_while_loading() {
    let routes = RouteTable::default();

    for path in ["/", "/login", "/dashboard", "/pricing"] {
        assert_eq!(route_outcome(true, false, path, &routes), GuardOutcome::Waiting);
        assert_eq!(
            guard_outcome(true, false, path, true, &routes),
            GuardOutcome::Waiting
        );
    }
}

#[test]
fn test_decision_rule_is_pure() {
    let routes = RouteTable::default();

    assert_eq!(
        redirect_decision(false, RouteClass::Unclassified, &routes),
        RouteDecision::Allow
    );
    assert_eq!(
        redirect_decision(true, RouteClass::Protected, &routes),
        RouteDecision::Allow
    );
    assert_eq!(
        redirect_decision(false, RouteClass::Root, &routes),
        redirect_decision(false, RouteClass::Protected, &routes)
    );
}

#[test]
fn test_guard_wrappers() {
    let routes = RouteTable::default();

    assert_guard_redirect(
        &guard_outcome(false, false, "/otp", true, &routes),
        "/login",
    );
    assert_eq!(
        guard_outcome(false, true, "/otp", true, &routes),
        GuardOutcome::Render
    );
    assert_guard_redirect(
        &guard_outcome(false, true, "/login", false, &routes),
        "/dashboard",
    );
    assert_eq!(
        guard_outcome(false, false, "/login", false, &routes),
        GuardOutcome::Render
    );
}

#[test]
fn test_restore_redirects_once() {
    let mut session = TestFixtures::session();
    let mut navigator = RecordingNavigator::new();

    assert_eq!(session.manager.decide("/dashboard"), GuardOutcome::Waiting);

    if let Some(redirect) = session.manager.restore("/dashboard") {
        navigator.navigate(&redirect);
    }
    if let Some(redirect) = session.manager.restore("/dashboard") {
        navigator.navigate(&redirect);
    }

    assert_eq!(navigator.targets(), vec!["/login"]);
}

#[test]
fn test_signed_in_manager_decisions() {
    let mut session = TestFixtures::signed_out_session();
    assert_guard_redirect(&session.manager.decide("/dashboard"), "/login");

    let redirect = session.manager.login(TEST_EMAIL, TEST_SECRET).unwrap();
    assert_redirect(Some(&redirect), "/dashboard");

    assert_guard_redirect(&session.manager.decide("/login"), "/dashboard");
    assert_eq!(session.manager.decide("/dashboard"), GuardOutcome::Render);
    assert_eq!(session.manager.guard("/activate-2fa", true), GuardOutcome::Render);

    let redirect = session.manager.logout();
    assert_redirect(Some(&redirect), "/login");
    assert_guard_redirect(&session.manager.guard("/activate-2fa", true), "/login");
}

#[test]
fn test_custom_route_table() {
    let routes = RouteSettings {
        root: "/".to_string(),
        login_path: "/auth/sign-in".to_string(),
        dashboard_path: "/app".to_string(),
        public: vec!["/auth".to_string()],
        protected: vec!["/app".to_string(), "/settings".to_string()],
    };
    let mut session = TestSessionBuilder::new().with_routes(routes).build();

    assert_redirect(session.manager.restore("/settings/billing").as_ref(), "/auth/sign-in");

    let redirect = session.manager.login(TEST_EMAIL, TEST_SECRET).unwrap();
    assert_eq!(redirect.target, "/app");
    assert_guard_redirect(&session.manager.decide("/auth/sign-in"), "/app");
}

#[test]
fn test_unsafe_route_settings_rejected() {
    for bad in ["//evil.com", "/../etc", "https://evil.com", "/login%2F..%2F"] {
        let settings = RouteSettings {
            login_path: bad.to_string(),
            ..RouteSettings::default()
        };
        assert!(
            RouteTable::from_settings(&settings).is_err(),
            "{bad} should be rejected"
        );
    }
}

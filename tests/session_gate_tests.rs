use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use notewise::auth::{FormMode, Identity, IdentityNotifier};
use notewise::kernel::{
    Event, Reactor, ReactorConfig, Route, SessionGate, SessionKind, SessionStatus, UserInput, View,
};

fn reactor_at(route: Route) -> Reactor {
    let (_tx, rx) = mpsc::channel(100);
    Reactor::new(rx, route, ReactorConfig::default())
}

fn someone() -> Identity {
    Identity::new("uid-42", Some("x@test.com".into()))
}

#[tokio::test]
async fn test_checking_until_first_emission() {
    for route in [Route::Root, Route::Login, Route::Signup] {
        let reactor = reactor_at(route);
        assert_eq!(reactor.session_kind(), SessionKind::Checking);
        let view = reactor.view().screen.view();
        assert_ne!(view, View::Workflow, "protected view never shown while checking");
    }

    let reactor = reactor_at(Route::Root);
    assert_eq!(reactor.view().screen.view(), View::Waiting);
}

#[tokio::test]
async fn test_root_redirects_to_login_when_signed_out() {
    let mut reactor = reactor_at(Route::Root);
    reactor.step(Event::IdentityChanged(None));

    assert_eq!(reactor.location(), Route::Login);
    assert_eq!(reactor.view().screen.view(), View::Form(FormMode::SignIn));
}

#[tokio::test]
async fn test_forms_redirect_home_when_signed_in() {
    for route in [Route::Login, Route::Signup] {
        let mut reactor = reactor_at(route);
        reactor.step(Event::IdentityChanged(Some(someone())));

        assert_eq!(reactor.location(), Route::Root);
        assert_eq!(reactor.view().screen.view(), View::Workflow);
    }
}

#[tokio::test]
async fn test_root_reachable_only_when_authenticated() {
    let mut reactor = reactor_at(Route::Root);
    let emissions = [None, Some(someone()), None, Some(someone()), None];

    for identity in emissions {
        reactor.step(Event::IdentityChanged(identity));
        reactor.step(Event::Input(UserInput::Navigate(Route::Root)));

        let on_workflow = reactor.view().screen.view() == View::Workflow;
        let authenticated = reactor.session_kind() == SessionKind::Authenticated;
        assert_eq!(on_workflow, authenticated);
    }
}

#[tokio::test]
async fn test_form_keeps_typed_input_when_session_resolves_unauthenticated() {
    let mut reactor = reactor_at(Route::Login);
    reactor.step(Event::Input(UserInput::EditEmail("x@test.com".into())));
    let mount = reactor.view().id;

    reactor.step(Event::IdentityChanged(None));

    assert_eq!(reactor.view().id, mount, "same form instance stays mounted");
    assert_eq!(reactor.form().unwrap().input().email, "x@test.com");
}

#[tokio::test]
async fn test_gate_watchers_see_every_transition() {
    let gate = SessionGate::new();
    let mut watcher = gate.watch();
    assert_eq!(*watcher.borrow(), SessionStatus::Checking);

    gate.observe(Some(someone()));
    watcher.changed().await.unwrap();
    assert_eq!(watcher.borrow().kind(), SessionKind::Authenticated);

    gate.observe(None);
    watcher.changed().await.unwrap();
    assert_eq!(*watcher.borrow_and_update(), SessionStatus::Unauthenticated);
}

#[tokio::test]
async fn test_listener_receives_initial_and_stops_after_unsubscribe() {
    let notifier = IdentityNotifier::new();
    notifier.publish(None);

    let seen: Arc<Mutex<Vec<bool>>> = Arc::default();
    let sink = seen.clone();
    let listener = notifier.listen(move |identity| sink.lock().unwrap().push(identity.is_some()));

    tokio::time::sleep(Duration::from_millis(20)).await;
    notifier.publish(Some(someone()));
    tokio::time::sleep(Duration::from_millis(20)).await;

    listener.unsubscribe();
    notifier.publish(None);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(*seen.lock().unwrap(), vec![false, true]);
}

#[tokio::test]
async fn test_listener_sees_quick_sign_in_and_sign_out() {
    let notifier = IdentityNotifier::new();
    notifier.publish(None);

    let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
    let sink = seen.clone();
    let _listener = notifier.listen(move |identity| {
        sink.lock()
            .unwrap()
            .push(identity.map(|i| i.uid().to_string()))
    });

    notifier.publish(Some(someone()));
    notifier.publish(None);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![None, Some("uid-42".to_string()), None]
    );
}

#[tokio::test]
async fn test_reactor_exposes_resolved_session() {
    let mut reactor = reactor_at(Route::Root);
    assert_eq!(reactor.session(), SessionStatus::Checking);

    reactor.step(Event::IdentityChanged(Some(someone())));
    assert_eq!(reactor.session(), SessionStatus::Authenticated(someone()));
    assert_eq!(reactor.gate.current_status(), reactor.session());
}

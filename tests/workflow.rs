mod common;

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{FakeGraph, FakeProvider, column, message};
use mail_tickets::auth::session::ScopeSets;
use mail_tickets::auth::{Purpose, Session};
use mail_tickets::domain::mapping::LogicalField;
use mail_tickets::domain::sharepoint::{Site, SpList};
use mail_tickets::terminal::worker::execute;
use mail_tickets::tickets::TicketClock;
use mail_tickets::workflow::{AppState, Destination, Effect, LoadStatus, Outcome};
use serde_json::json;

struct Harness {
    state: AppState,
    session: Session<FakeProvider>,
    graph: FakeGraph,
    prompts: Arc<AtomicUsize>,
}

impl Harness {
    fn new(same_account: bool) -> Self {
        let mut graph = FakeGraph::default();
        graph.messages = vec![
            message("m1", "Printer broken", "2024-03-05T14:37:00Z"),
            message("m2", "VPN down", "2024-03-05T15:00:00Z"),
        ];
        graph.sites = vec![site("s1"), site("s2")];
        graph.lists.insert("s1".into(), vec![list("helpdesk")]);
        graph.lists.insert("s2".into(), vec![list("other")]);
        graph.columns = vec![column("Title"), column("Body"), column("ContentType")];
        let provider = FakeProvider::default();
        let prompts = Arc::clone(&provider.prompts);
        Self {
            state: AppState::new(same_account),
            session: Session::new(provider, ScopeSets::default(), same_account),
            graph,
            prompts,
        }
    }

    /// Run effects to completion, feeding outcomes back into the state.
    fn run(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            if let Some(outcome) = execute(&mut self.session, &self.graph, TicketClock::Utc, effect) {
                queue.extend(self.state.apply(outcome));
            }
        }
    }

    fn session_prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    fn outcome_of(&mut self, effect: Effect) -> Option<Outcome> {
        execute(&mut self.session, &self.graph, TicketClock::Utc, effect)
    }
}

fn site(id: &str) -> Site {
    serde_json::from_value(json!({ "id": id, "displayName": format!("Site {id}") })).unwrap()
}

fn list(id: &str) -> SpList {
    serde_json::from_value(json!({ "id": id, "displayName": id })).unwrap()
}

#[test]
fn loading_without_a_credential_reports_an_error() {
    let mut h = Harness::new(true);
    let outcome = h.outcome_of(Effect::LoadMessages);
    assert!(matches!(outcome, Some(Outcome::Messages(Err(_)))));
    assert_eq!(h.graph.calls(), 0);
}

#[test]
fn shared_account_signs_in_once_and_loads_everything() {
    let mut h = Harness::new(true);
    let effects = h.state.sign_in(Purpose::MailRead);
    h.run(effects);

    assert_eq!(h.session_prompts(), 1);
    assert!(h.state.reader.is_some());
    assert_eq!(h.state.reader, h.state.writer);
    assert_eq!(h.state.inbox_status, LoadStatus::Ready);
    assert_eq!(h.state.messages.len(), 2);
    assert_eq!(h.state.sites.len(), 2);
}

#[test]
fn separate_accounts_need_two_sign_ins() {
    let mut h = Harness::new(false);
    let effects = h.state.sign_in(Purpose::MailRead);
    h.run(effects);
    assert!(h.state.writer.is_none());
    assert!(h.state.sites.is_empty());

    let effects = h.state.sign_in(Purpose::ListWrite);
    h.run(effects);
    assert_eq!(h.session_prompts(), 2);
    assert_ne!(h.state.reader, h.state.writer);
    assert_eq!(h.state.sites.len(), 2);
}

#[test]
fn full_form_creates_tickets_with_the_chosen_mapping() {
    let mut h = Harness::new(true);
    let effects = h.state.sign_in(Purpose::MailRead);
    h.run(effects);

    let effects = h.state.choose_site("s1");
    h.run(effects);
    let effects = h.state.choose_list("helpdesk");
    h.run(effects);
    assert!(h.state.mapping_available());
    assert!(
        h.state
            .destination
            .columns()
            .iter()
            .all(|c| c.name != "ContentType")
    );

    h.state
        .assign_mapping(LogicalField::Subject, "Title")
        .unwrap();
    h.state
        .assign_mapping(LogicalField::Description, "Body")
        .unwrap();
    h.state.toggle_message("m2");

    let effects = h.state.request_submit().unwrap();
    h.run(effects);

    assert!(!h.state.submitting);
    assert_eq!(h.state.results.len(), 1);
    assert!(h.state.results[0].is_success());
    assert_eq!(
        serde_json::Value::Object(h.graph.posted_fields().remove(0)),
        json!({ "Title": "VPN down", "Body": "preview of VPN down" })
    );
}

#[test]
fn switching_site_drops_the_list_and_the_mapping() {
    let mut h = Harness::new(true);
    let effects = h.state.sign_in(Purpose::MailRead);
    h.run(effects);
    let effects = h.state.choose_site("s1");
    h.run(effects);
    let effects = h.state.choose_list("helpdesk");
    h.run(effects);
    h.state
        .assign_mapping(LogicalField::Subject, "Title")
        .unwrap();

    let effects = h.state.choose_site("s2");
    h.run(effects);

    assert!(h.state.mapping.is_empty());
    assert_eq!(h.state.destination.list_id(), None);
    assert_eq!(h.state.destination.lists()[0].id, "other");
}

#[test]
fn lists_for_an_abandoned_site_are_ignored() {
    let mut h = Harness::new(true);
    let effects = h.state.sign_in(Purpose::MailRead);
    h.run(effects);

    let first = h.state.choose_site("s1");
    let second = h.state.choose_site("s2");
    let late = first
        .into_iter()
        .filter_map(|e| h.outcome_of(e))
        .collect::<Vec<_>>();
    h.run(second);
    for outcome in late {
        h.state.apply(outcome);
    }

    assert!(matches!(h.state.destination, Destination::SiteChosen(_)));
    assert_eq!(h.state.destination.site_id(), Some("s2"));
    assert_eq!(h.state.destination.lists()[0].id, "other");
}

#[test]
fn incomplete_form_is_rejected_before_any_request() {
    let mut h = Harness::new(true);
    let effects = h.state.sign_in(Purpose::MailRead);
    h.run(effects);
    let before = h.graph.calls();

    h.state.toggle_message("m1");
    assert!(h.state.request_submit().is_err());
    assert!(!h.state.submitting);
    assert_eq!(h.graph.calls(), before);
}

#[test]
fn submitting_after_logout_fails_without_posting() {
    let mut h = Harness::new(true);
    let effects = h.state.sign_in(Purpose::MailRead);
    h.run(effects);
    let effects = h.state.choose_site("s1");
    h.run(effects);
    let effects = h.state.choose_list("helpdesk");
    h.run(effects);
    h.state.toggle_message("m1");
    let submit = h.state.request_submit().unwrap();

    let logout = h.state.sign_out();
    h.run(logout);
    let outcome = submit
        .into_iter()
        .filter_map(|e| h.outcome_of(e))
        .next();

    assert!(matches!(outcome, Some(Outcome::SubmitFailed(_))));
    assert!(h.graph.posted_fields().is_empty());
    assert!(!h.state.signed_in());
    assert!(h.state.results.is_empty());
}

#[test]
fn sign_out_while_the_browser_is_open_stays_signed_out() {
    let mut h = Harness::new(true);
    let mut effects = h.state.sign_in(Purpose::MailRead);
    effects.extend(h.state.sign_out());
    h.run(effects);

    assert!(!h.state.signed_in());
    assert!(h.session.credential(Purpose::MailRead).is_none());
    assert_eq!(h.state.inbox_status, LoadStatus::Idle);

    let effects = h.state.sign_in(Purpose::MailRead);
    assert_eq!(effects, vec![Effect::SignIn(Purpose::MailRead)]);
    h.run(effects);
    assert!(h.state.signed_in());
    assert_eq!(h.state.inbox_status, LoadStatus::Ready);
}

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;

use crate::auth::session::IdentityProvider;
use crate::auth::{Credential, Purpose, Session};
use crate::error::TransportError;
use crate::graph::GraphApi;
use crate::tickets::{TicketClock, submit_tickets};
use crate::workflow::{Effect, Outcome};

/// Background thread that owns the session and runs effects one at a time,
/// in the order they were sent.
pub struct Worker {
    jobs: Sender<Effect>,
    outcomes: Receiver<Outcome>,
}

impl Worker {
    /// `tx`/`rx` are the two ends of the outcome channel; the caller may have
    /// handed clones of `tx` to the identity provider for sign-in prompts.
    pub fn spawn<P, G>(
        mut session: Session<P>,
        graph: G,
        clock: TicketClock,
        tx: Sender<Outcome>,
        rx: Receiver<Outcome>,
    ) -> Self
    where
        P: IdentityProvider + 'static,
        G: GraphApi + 'static,
    {
        let (jobs, job_rx) = std::sync::mpsc::channel::<Effect>();
        thread::spawn(move || {
            for effect in job_rx {
                let Some(outcome) = execute(&mut session, &graph, clock, effect) else {
                    continue;
                };
                if tx.send(outcome).is_err() {
                    break;
                }
            }
            log::debug!("worker stopped");
        });
        Self { jobs, outcomes: rx }
    }

    pub fn send(&self, effect: Effect) {
        if self.jobs.send(effect).is_err() {
            log::error!("worker thread is gone, dropping effect");
        }
    }

    /// Next finished outcome, if any, without blocking.
    pub fn try_next(&self) -> Option<Outcome> {
        match self.outcomes.try_recv() {
            Ok(o) => Some(o),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

fn fetch<P, T>(
    session: &mut Session<P>,
    purpose: Purpose,
    call: impl FnOnce(&Credential) -> Result<T, TransportError>,
) -> Result<T, String>
where
    P: IdentityProvider,
{
    let credential = session.acquire_silent(purpose).map_err(|e| e.to_string())?;
    call(&credential).map_err(|e| {
        log::warn!("Graph call failed: {e}");
        e.to_string()
    })
}

/// Run one effect to completion.
pub fn execute<P, G>(
    session: &mut Session<P>,
    graph: &G,
    clock: TicketClock,
    effect: Effect,
) -> Option<Outcome>
where
    P: IdentityProvider,
    G: GraphApi,
{
    match effect {
        Effect::SetSameAccount(same) => {
            session.set_same_account(same);
            None
        }
        Effect::SignIn(purpose) => Some(match session.acquire_credential(purpose) {
            Ok(c) => Outcome::SignedIn {
                purpose,
                account: c.account,
            },
            Err(e) => Outcome::SignInFailed {
                purpose,
                error: e.to_string(),
            },
        }),
        Effect::SignOut => {
            session.logout();
            None
        }
        Effect::LoadMessages => Some(Outcome::Messages(fetch(session, Purpose::MailRead, |c| {
            graph.list_messages(c)
        }))),
        Effect::LoadSites => Some(Outcome::Sites(fetch(session, Purpose::ListWrite, |c| {
            graph.list_sites(c)
        }))),
        Effect::LoadLists { site_id } => {
            let result = fetch(session, Purpose::ListWrite, |c| graph.list_lists(c, &site_id));
            Some(Outcome::Lists { site_id, result })
        }
        Effect::LoadColumns { site_id, list_id } => {
            let result = fetch(session, Purpose::ListWrite, |c| {
                graph.list_columns(c, &site_id, &list_id)
            });
            Some(Outcome::Columns {
                site_id,
                list_id,
                result,
            })
        }
        Effect::Submit(request) => {
            if let Err(e) = request.validate() {
                return Some(Outcome::SubmitFailed(e.to_string()));
            }
            let writer = match session.acquire_silent(Purpose::ListWrite) {
                Ok(c) => c,
                Err(e) => return Some(Outcome::SubmitFailed(e.to_string())),
            };
            Some(match submit_tickets(graph, &writer, &request, clock) {
                Ok(results) => Outcome::Submitted(results),
                Err(e) => Outcome::SubmitFailed(e.to_string()),
            })
        }
    }
}

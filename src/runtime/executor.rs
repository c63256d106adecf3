//! Dialogue runtime executor

use super::traits::{FarmerRegistry, PriceSource};
use crate::backend::RegistryError;
use crate::config::DialogueConfig;
use crate::locale::{self, MessageId};
use crate::state_machine::{transition, Effect, Event, InboundMessage, OutboundPrompt, Session};
use crate::store::{SessionGuard, SessionStore};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// Upper bound on chained transitions for one inbound message
const MAX_EVENTS_PER_TURN: usize = 16;

/// Runs turns against the state machine and executes collaborator effects.
///
/// A turn holds the identity's session lock from load to save, including
/// across price lookups. Other identities are never blocked by it.
#[derive(Clone)]
pub struct DialogueRuntime {
    config: Arc<DialogueConfig>,
    sessions: Arc<SessionStore>,
    registry: Arc<dyn FarmerRegistry>,
    prices: Arc<dyn PriceSource>,
}

impl DialogueRuntime {
    pub fn new(
        config: Arc<DialogueConfig>,
        sessions: Arc<SessionStore>,
        registry: Arc<dyn FarmerRegistry>,
        prices: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            config,
            sessions,
            registry,
            prices,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Process one text message and return every prompt it produced
    pub async fn handle(&self, identity: &str, text: &str) -> Vec<OutboundPrompt> {
        self.handle_inbound(&InboundMessage::text(identity, text))
            .await
    }

    pub async fn handle_inbound(&self, message: &InboundMessage) -> Vec<OutboundPrompt> {
        let mut prompts = Vec::new();
        self.process(message, |prompt| prompts.push(prompt)).await;
        prompts
    }

    /// Process one message, handing each prompt to `emit` as soon as it is
    /// produced so the transport can deliver it before slow effects finish.
    pub async fn process<F>(&self, message: &InboundMessage, mut emit: F)
    where
        F: FnMut(OutboundPrompt) + Send,
    {
        let started = Instant::now();
        let mut guard = self.sessions.lock(&message.identity).await;
        let mut session = guard
            .clone()
            .unwrap_or_else(|| Session::new(message.identity.clone()));
        let from = session.state;

        self.run_turn(
            &mut guard,
            &mut session,
            Event::from(message.content.clone()),
            &mut emit,
        )
        .await;

        tracing::info!(
            identity = %session.identity,
            from = %from,
            to = %session.state,
            duration_ms = %started.elapsed().as_millis(),
            "Turn processed"
        );

        session.touch();
        *guard = Some(session);
    }

    /// Saves the session after every accepted transition, so a turn dropped
    /// mid-effect keeps the collaborator results it already applied.
    async fn run_turn<F>(
        &self,
        guard: &mut SessionGuard,
        session: &mut Session,
        event: Event,
        emit: &mut F,
    ) where
        F: FnMut(OutboundPrompt) + Send,
    {
        // Process events in a loop to handle chained effects
        let mut events_to_process = VecDeque::from([event]);
        let mut processed = 0;

        while let Some(current_event) = events_to_process.pop_front() {
            processed += 1;
            if processed > MAX_EVENTS_PER_TURN {
                tracing::error!(identity = %session.identity, "Turn exceeded event limit");
                emit(internal_error(session));
                return;
            }

            let event_name = current_event.name();
            if let Event::UnsupportedMessage { kind } = &current_event {
                tracing::info!(identity = %session.identity, kind = %kind, "Non-text message");
            }
            let result = match transition(session, &self.config, current_event) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(
                        identity = %session.identity,
                        event = event_name,
                        error = %e,
                        "Transition rejected"
                    );
                    emit(internal_error(session));
                    return;
                }
            };

            if result.session.state != session.state {
                tracing::debug!(
                    identity = %session.identity,
                    event = event_name,
                    from = %session.state,
                    to = %result.session.state,
                    "State changed"
                );
            }
            *session = result.session;
            session.touch();
            **guard = Some(session.clone());

            for effect in result.effects {
                match effect {
                    Effect::Reply(prompt) => emit(prompt),
                    effect => {
                        if let Some(generated_event) = self.execute_effect(session, effect).await {
                            events_to_process.push_back(generated_event);
                        }
                    }
                }
            }
        }
    }

    async fn execute_effect(&self, session: &Session, effect: Effect) -> Option<Event> {
        let identity = session.identity.as_str();
        let started = Instant::now();

        match effect {
            Effect::Reply(_) => None,

            Effect::CheckExistence => {
                let outcome = self.registry.farmer_exists(identity).await;
                log_registry_call("farmer_exists", identity, started, &outcome);
                Some(Event::ExistenceChecked { outcome })
            }

            Effect::Register { registration } => {
                let outcome = self.registry.register(&registration).await;
                log_registry_call("register", identity, started, &outcome);
                Some(Event::RegistrationFinished { outcome })
            }

            Effect::Login { password } => {
                let outcome = self.registry.login(identity, &password).await;
                log_registry_call("login", identity, started, &outcome);
                Some(Event::LoginFinished { outcome })
            }

            Effect::FetchPrices { commodity, region } => {
                let rows = self.prices.fetch_price_rows(&commodity, &region).await;
                tracing::info!(
                    identity,
                    commodity = %commodity,
                    region = %region,
                    rows = rows.len(),
                    duration_ms = %started.elapsed().as_millis(),
                    "Price lookup finished"
                );
                Some(Event::PricesFetched { rows })
            }

            Effect::SubmitListing { token, listing } => {
                let outcome = self.registry.submit_listing(&token, &listing).await;
                log_registry_call("submit_listing", identity, started, &outcome);
                Some(Event::ListingSubmitted { outcome })
            }
        }
    }
}

fn internal_error(session: &Session) -> OutboundPrompt {
    OutboundPrompt::text(locale::text(session.language, MessageId::InternalError))
}

fn log_registry_call<T>(
    operation: &'static str,
    identity: &str,
    started: Instant,
    outcome: &Result<T, RegistryError>,
) {
    let duration_ms = started.elapsed().as_millis();
    match outcome {
        Ok(_) => tracing::info!(
            operation,
            identity,
            duration_ms = %duration_ms,
            "Registry call succeeded"
        ),
        Err(e) => tracing::warn!(
            operation,
            identity,
            duration_ms = %duration_ms,
            kind = e.kind.as_str(),
            error = %e,
            "Registry call failed"
        ),
    }
}

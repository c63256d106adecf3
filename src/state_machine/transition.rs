//! Pure state transition function
//!
//! Given the same session, configuration and event this always produces the
//! same session and effects. Validation failures never move the state; they
//! only emit a retry prompt.

use super::state::{DialogueState, ListingRequest, PendingListing, Session};
use super::{Effect, Event, OutboundPrompt};
use crate::backend::RegistryError;
use crate::config::{DialogueConfig, PINCODE_LEN};
use crate::locale::{self, AudioClip, MessageId};
use crate::price::{summarize, PriceRow, PriceSummary};
use crate::state_machine::AuthToken;
use thiserror::Error;

/// Category sent to the registry when a listing has none
const FALLBACK_CATEGORY: &str = "Others";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Prompts emitted by this transition, in order
    #[allow(dead_code)] // Useful for tests
    pub fn replies(&self) -> impl Iterator<Item = &OutboundPrompt> {
        self.effects.iter().filter_map(|e| match e {
            Effect::Reply(prompt) => Some(prompt),
            _ => None,
        })
    }

    fn goto(mut self, state: DialogueState) -> Self {
        self.session.state = state;
        self
    }

    fn say(self, id: MessageId) -> Self {
        let body = locale::text(self.session.language, id);
        self.with_effect(Effect::say(body))
    }

    fn say_text(self, body: String) -> Self {
        self.with_effect(Effect::say(body))
    }

    fn play(self, clip: AudioClip) -> Self {
        let language = self.session.language;
        self.with_effect(Effect::play(clip, language))
    }

    fn show_categories(self, config: &DialogueConfig) -> Self {
        let menu = locale::category_menu(self.session.language, &config.catalog);
        self.say_text(menu)
    }

    /// Session is missing data the current step depends on
    fn restart_required(mut self) -> Self {
        self.session.reset();
        self.say(MessageId::RestartRequired)
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("event {event} is not expected in state {state}")]
    Unexpected {
        state: DialogueState,
        event: &'static str,
    },
}

/// Pure transition function
pub fn transition(
    session: &Session,
    config: &DialogueConfig,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let next = TransitionResult::new(session.clone());

    match (session.state, event) {
        // ============================================================
        // User input
        // ============================================================
        (_, Event::UserText { text }) => Ok(on_text(next, config, &text)),

        (_, Event::UnsupportedMessage { .. }) => Ok(next.say(MessageId::TextOnly)),

        // ============================================================
        // Greeting override: valid from any state
        // ============================================================
        (_, Event::ExistenceChecked { outcome }) => Ok(on_existence(next, outcome)),

        // ============================================================
        // Registration and login
        // ============================================================
        (DialogueState::CollectingPasswordRegister, Event::RegistrationFinished { outcome }) => {
            Ok(on_registration(next, outcome))
        }

        (
            DialogueState::CollectingPasswordRegister | DialogueState::CollectingPasswordLogin,
            Event::LoginFinished { outcome },
        ) => Ok(on_login(next, config, outcome)),

        // ============================================================
        // Listing sub-flow
        // ============================================================
        (DialogueState::ChoosingCrop, Event::PricesFetched { rows }) => Ok(on_prices(next, &rows)),

        (DialogueState::AwaitingQuantity, Event::ListingSubmitted { outcome }) => {
            Ok(on_listing_submitted(next, outcome))
        }

        // ============================================================
        // Stale or out-of-order collaborator results
        // ============================================================
        (state, event) => Err(TransitionError::Unexpected {
            state,
            event: event.name(),
        }),
    }
}

// ============================================================================
// Text handlers, one per state
// ============================================================================

fn on_text(next: TransitionResult, config: &DialogueConfig, raw: &str) -> TransitionResult {
    let input = raw.trim();
    let folded = input.to_lowercase();

    if config.is_greeting(&folded) {
        return next.with_effect(Effect::CheckExistence);
    }

    match next.session.state {
        DialogueState::Entry | DialogueState::ConversationOver => next.say(MessageId::SendGreeting),
        DialogueState::ChoosingLanguage => choose_language(next, &folded),
        DialogueState::CollectingName => collect_name(next, input),
        DialogueState::CollectingAddress => collect_address(next, input),
        DialogueState::CollectingRegion => collect_region(next, config, input),
        DialogueState::CollectingPincode => collect_pincode(next, input),
        DialogueState::CollectingPasswordRegister => collect_register_password(next, input),
        DialogueState::CollectingPasswordLogin => collect_login_password(next, input),
        DialogueState::ChoosingCategory => choose_category(next, config, input),
        DialogueState::ChoosingCrop => choose_crop(next, config, input),
        DialogueState::AwaitingPrice => enter_price(next, input),
        DialogueState::AwaitingQuantity => enter_quantity(next, input),
        DialogueState::AwaitingRepeat => answer_repeat(next, config, &folded),
    }
}

fn choose_language(mut next: TransitionResult, folded: &str) -> TransitionResult {
    match DialogueConfig::parse_language(folded) {
        Some(language) => {
            next.session.language = language;
            next.goto(DialogueState::CollectingName)
                .say(MessageId::AskName)
                .play(AudioClip::AskName)
        }
        None => next.say(MessageId::LanguageRetry),
    }
}

fn collect_name(mut next: TransitionResult, input: &str) -> TransitionResult {
    if input.is_empty() {
        return next.say(MessageId::RetryName);
    }
    next.session.profile.name = Some(input.to_string());
    next.goto(DialogueState::CollectingAddress)
        .say(MessageId::AskAddress)
        .play(AudioClip::AskAddress)
}

fn collect_address(mut next: TransitionResult, input: &str) -> TransitionResult {
    if input.is_empty() {
        return next.say(MessageId::RetryAddress);
    }
    next.session.profile.address = Some(input.to_string());
    next.goto(DialogueState::CollectingRegion)
        .say(MessageId::AskRegion)
        .play(AudioClip::AskState)
}

/// Also reached after login when no region is on file; in that case the
/// farmer goes straight to the listing menu.
fn collect_region(mut next: TransitionResult, config: &DialogueConfig, input: &str) -> TransitionResult {
    if input.is_empty() {
        return next.say(MessageId::RetryRegion);
    }
    next.session.profile.region = Some(input.to_string());

    if next.session.is_authenticated() {
        next.goto(DialogueState::ChoosingCategory).show_categories(config)
    } else {
        next.goto(DialogueState::CollectingPincode)
            .say(MessageId::AskPincode)
            .play(AudioClip::AskPincode)
    }
}

fn collect_pincode(mut next: TransitionResult, input: &str) -> TransitionResult {
    if !is_valid_pincode(input) {
        return next.say(MessageId::RetryPincode);
    }
    next.session.profile.pincode = Some(input.to_string());
    next.goto(DialogueState::CollectingPasswordRegister)
        .say(MessageId::AskPassword)
        .play(AudioClip::AskPassword)
}

fn collect_register_password(mut next: TransitionResult, input: &str) -> TransitionResult {
    if input.is_empty() {
        return next.say(MessageId::RetryPassword);
    }
    next.session.profile.password = Some(input.to_string());

    // Signup already went through; only the login is outstanding
    if next.session.registered {
        return next.with_effect(Effect::Login {
            password: input.to_string(),
        });
    }

    match next.session.registration() {
        Some(registration) => next.with_effect(Effect::Register { registration }),
        None => next.restart_required(),
    }
}

fn collect_login_password(next: TransitionResult, input: &str) -> TransitionResult {
    if input.is_empty() {
        return next.say(MessageId::RetryPassword);
    }
    next.with_effect(Effect::Login {
        password: input.to_string(),
    })
}

fn choose_category(mut next: TransitionResult, config: &DialogueConfig, input: &str) -> TransitionResult {
    let language = next.session.language;
    match config.catalog.category(input) {
        Some(category) => {
            next.session.pending_listing = Some(PendingListing::new(category.name));
            next.goto(DialogueState::ChoosingCrop)
                .say_text(locale::crop_menu(language, category))
        }
        None => next.say(MessageId::RetryCategory).show_categories(config),
    }
}

fn choose_crop(mut next: TransitionResult, config: &DialogueConfig, input: &str) -> TransitionResult {
    let language = next.session.language;
    let Some(category) = next
        .session
        .pending_listing
        .as_ref()
        .and_then(|p| config.catalog.by_name(&p.category))
    else {
        return next.restart_required();
    };
    let Some(product) = category.product(input) else {
        return next
            .say(MessageId::RetryCrop)
            .say_text(locale::crop_menu(language, category));
    };
    let Some(region) = next.session.profile.region.clone() else {
        return next.restart_required();
    };

    if let Some(pending) = next.session.pending_listing.as_mut() {
        pending.crop_name = Some(product.name.to_string());
        pending.commodity = Some(product.commodity.to_string());
    }

    // State stays at ChoosingCrop until the lookup result arrives
    next.say(MessageId::CheckingPrices)
        .with_effect(Effect::FetchPrices {
            commodity: product.commodity.to_string(),
            region,
        })
}

fn enter_price(mut next: TransitionResult, input: &str) -> TransitionResult {
    let Some(price) = parse_positive(input) else {
        return next.say(MessageId::RetryPrice);
    };
    let Some(pending) = next.session.pending_listing.as_mut() else {
        return next.restart_required();
    };
    pending.price_per_kg = Some(price);
    next.goto(DialogueState::AwaitingQuantity)
        .say(MessageId::AskQuantity)
        .play(AudioClip::AskQuantity)
}

fn enter_quantity(mut next: TransitionResult, input: &str) -> TransitionResult {
    let Some(quantity) = parse_positive(input) else {
        return next.say(MessageId::RetryQuantity);
    };
    let Some(pending) = next.session.pending_listing.as_mut() else {
        return next.restart_required();
    };
    pending.quantity_kg = Some(quantity);

    let listing = listing_request(pending);
    match (next.session.auth_token.clone(), listing) {
        (Some(token), Some(listing)) => next.with_effect(Effect::SubmitListing { token, listing }),
        _ => next.restart_required(),
    }
}

fn answer_repeat(next: TransitionResult, config: &DialogueConfig, folded: &str) -> TransitionResult {
    if config.is_affirmative(folded) {
        next.goto(DialogueState::ChoosingCategory)
            .play(AudioClip::NextCrop)
            .show_categories(config)
    } else {
        next.goto(DialogueState::ConversationOver)
            .say(MessageId::Closing)
            .play(AudioClip::Closing)
    }
}

// ============================================================================
// Collaborator results
// ============================================================================

fn on_existence(mut next: TransitionResult, outcome: Result<bool, RegistryError>) -> TransitionResult {
    match outcome {
        Ok(true) => {
            next.session.registered = true;
            next.session.restart_dialogue(DialogueState::CollectingPasswordLogin);
            next.say(MessageId::WelcomeBack)
                .play(AudioClip::WelcomeBack)
                .say(MessageId::AskLoginPassword)
                .play(AudioClip::AskLoginPassword)
        }
        Ok(false) => {
            next.session.restart_dialogue(DialogueState::ChoosingLanguage);
            next.play(AudioClip::Welcome)
                .say(MessageId::Welcome)
                .say(MessageId::LanguageMenu)
        }
        Err(_) => next.say(MessageId::RegistryUnavailable),
    }
}

fn on_registration(mut next: TransitionResult, outcome: Result<(), RegistryError>) -> TransitionResult {
    match outcome {
        Ok(()) => {
            next.session.registered = true;
            match next.session.profile.password.clone() {
                Some(password) => next.with_effect(Effect::Login { password }),
                None => next.restart_required(),
            }
        }
        Err(e) if e.kind.is_retryable() => next.say(MessageId::RegistryUnavailable),
        Err(_) => next.say(MessageId::RegistrationFailed),
    }
}

fn on_login(
    mut next: TransitionResult,
    config: &DialogueConfig,
    outcome: Result<AuthToken, RegistryError>,
) -> TransitionResult {
    let after_signup = next.session.state == DialogueState::CollectingPasswordRegister;

    match outcome {
        Ok(token) => {
            next.session.auth_token = Some(token);
            next.session.registered = true;
            next = if after_signup {
                next.say(MessageId::RegistrationComplete)
                    .play(AudioClip::RegComplete)
            } else {
                next.say(MessageId::LoginSuccess)
            };

            if next.session.profile.region.is_some() {
                next.goto(DialogueState::ChoosingCategory).show_categories(config)
            } else {
                next.goto(DialogueState::CollectingRegion)
                    .say(MessageId::AskRegionForPrices)
                    .play(AudioClip::AskState)
            }
        }
        // Signup succeeded; retries go through login only
        Err(_) if after_signup => next
            .goto(DialogueState::CollectingPasswordLogin)
            .say(MessageId::RegisteredLoginFailed),
        Err(e) if e.is_rejected() => next.say(MessageId::LoginFailed),
        Err(_) => next
            .say(MessageId::RegistryUnavailable)
            .say(MessageId::AskLoginPassword),
    }
}

fn on_prices(next: TransitionResult, rows: &[PriceRow]) -> TransitionResult {
    let language = next.session.language;
    let crop = next
        .session
        .pending_listing
        .as_ref()
        .and_then(|p| p.crop_name.clone());
    let region = next.session.profile.region.clone();
    let (Some(crop), Some(region)) = (crop, region) else {
        return next.restart_required();
    };

    let next = match summarize(rows) {
        PriceSummary::Available(stats) => {
            next.say_text(locale::price_suggestion(language, &crop, &region, &stats))
        }
        PriceSummary::Insufficient => next.say(MessageId::PriceUnavailable),
    };
    next.goto(DialogueState::AwaitingPrice)
        .say(MessageId::AskPrice)
        .play(AudioClip::AskPrice)
}

/// Submission failures still complete the attempt: the farmer is moved on to
/// the repeat prompt instead of being left at the quantity step.
fn on_listing_submitted(mut next: TransitionResult, outcome: Result<(), RegistryError>) -> TransitionResult {
    let language = next.session.language;
    let pending = next.session.pending_listing.take();

    next = match (outcome, pending.as_ref().and_then(listing_request)) {
        (Ok(()), Some(listing)) => next
            .say_text(locale::listing_saved(
                language,
                &listing.crop_name,
                listing.quantity_kg,
                listing.price_per_kg,
            ))
            .play(AudioClip::ThankYou),
        (Ok(()), None) => next,
        (Err(_), _) => next.say(MessageId::ListingFailed),
    };
    next.goto(DialogueState::AwaitingRepeat)
        .say(MessageId::AskMoreCrops)
        .play(AudioClip::AskMoreCrops)
}

// ============================================================================
// Validation helpers
// ============================================================================

/// Exactly six ASCII digits
pub fn is_valid_pincode(input: &str) -> bool {
    input.len() == PINCODE_LEN && input.bytes().all(|b| b.is_ascii_digit())
}

/// A finite number greater than zero, optionally prefixed with ₹
pub fn parse_positive(input: &str) -> Option<f64> {
    let cleaned = input.trim().trim_start_matches('₹').trim();
    let value: f64 = cleaned.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

fn listing_request(pending: &PendingListing) -> Option<ListingRequest> {
    let category = if pending.category.is_empty() {
        FALLBACK_CATEGORY.to_string()
    } else {
        pending.category.clone()
    };
    Some(ListingRequest {
        crop_name: pending.crop_name.clone()?,
        category,
        price_per_kg: pending.price_per_kg?,
        quantity_kg: pending.quantity_kg?,
    })
}

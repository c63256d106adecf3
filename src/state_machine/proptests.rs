//! Property-based tests for the dialogue state machine
//!
//! These tests drive random event sequences through the transition function
//! and check invariants that must hold after every step.

use super::state::*;
use super::transition::*;
use super::*;
use crate::backend::RegistryError;
use crate::config::DialogueConfig;
use crate::locale::Language;
use crate::price::{PriceCell, PriceRow};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_config() -> DialogueConfig {
    DialogueConfig::default()
}

fn test_session(state: DialogueState) -> Session {
    let mut session = Session::new("919876543210");
    session.state = state;
    session
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = DialogueState> {
    proptest::sample::select(DialogueState::ALL.to_vec())
}

fn arb_language() -> impl Strategy<Value = Language> {
    prop_oneof![Just(Language::En), Just(Language::Hi)]
}

fn arb_registry_error() -> impl Strategy<Value = RegistryError> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(RegistryError::transient),
        "[a-z ]{1,20}".prop_map(RegistryError::rejected),
        "[a-z ]{1,20}".prop_map(RegistryError::malformed),
    ]
}

/// Replies a farmer could plausibly send at any step
fn arb_user_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("hi".to_string()),
        Just("नमस्ते".to_string()),
        Just("yes".to_string()),
        Just("no".to_string()),
        Just("1".to_string()),
        Just("2".to_string()),
        Just("3".to_string()),
        Just("144001".to_string()),
        Just("Punjab".to_string()),
        Just("₹24.5".to_string()),
        Just(String::new()),
        "[a-zA-Z0-9 ]{0,12}",
    ]
}

fn arb_price_row() -> impl Strategy<Value = PriceRow> {
    ("[A-Z][a-z]{3,8}", prop::option::of(1.0f64..10_000.0)).prop_map(|(market, modal)| {
        let row = PriceRow::new(market);
        match modal {
            Some(value) => row.with_modal(PriceCell::Number(value)),
            None => row,
        }
    })
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_user_text().prop_map(|text| Event::UserText { text }),
        1 => "[a-z]{3,8}".prop_map(|kind| Event::UnsupportedMessage { kind }),
        1 => prop_oneof![
            any::<bool>().prop_map(Ok::<bool, RegistryError>),
            arb_registry_error().prop_map(Err)
        ]
            .prop_map(|outcome| Event::ExistenceChecked { outcome }),
        1 => prop_oneof![Just(Ok::<(), RegistryError>(())), arb_registry_error().prop_map(Err)]
            .prop_map(|outcome| Event::RegistrationFinished { outcome }),
        1 => prop_oneof![
            "[a-z]{8}".prop_map(|t| Ok::<AuthToken, RegistryError>(AuthToken::new(t))),
            arb_registry_error().prop_map(Err)
        ]
        .prop_map(|outcome| Event::LoginFinished { outcome }),
        1 => prop_oneof![Just(Ok::<(), RegistryError>(())), arb_registry_error().prop_map(Err)]
            .prop_map(|outcome| Event::ListingSubmitted { outcome }),
        1 => proptest::collection::vec(arb_price_row(), 0..5)
            .prop_map(|rows| Event::PricesFetched { rows }),
    ]
}

// ============================================================================
// Session Validity Checkers
// ============================================================================

fn is_valid_session(session: &Session) -> bool {
    // A pending listing only exists inside the listing sub-flow
    if session.pending_listing.is_some() != session.state.in_listing_flow() {
        return false;
    }
    // Listing steps past the menu need a crop
    if matches!(
        session.state,
        DialogueState::AwaitingPrice | DialogueState::AwaitingQuantity
    ) && !matches!(&session.pending_listing, Some(p) if p.crop_name.is_some())
    {
        return false;
    }
    true
}

fn effects_are_valid(effects: &[Effect], session: &Session) -> bool {
    effects.iter().all(|effect| match effect {
        Effect::Reply(_) => true,
        Effect::FetchPrices { .. } => session.state == DialogueState::ChoosingCrop,
        Effect::SubmitListing { .. } => {
            session.state == DialogueState::AwaitingQuantity && session.is_authenticated()
        }
        Effect::Register { .. } => {
            session.state == DialogueState::CollectingPasswordRegister && !session.registered
        }
        Effect::Login { .. } => matches!(
            session.state,
            DialogueState::CollectingPasswordRegister | DialogueState::CollectingPasswordLogin
        ),
        Effect::CheckExistence => true,
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Any sequence of events leaves the session consistent
    #[test]
    fn prop_transitions_preserve_validity(events in proptest::collection::vec(arb_event(), 0..40)) {
        let config = test_config();
        let mut session = test_session(DialogueState::Entry);

        for event in events {
            match transition(&session, &config, event) {
                Ok(result) => {
                    prop_assert!(
                        effects_are_valid(&result.effects, &result.session),
                        "Invalid effects for {:?}: {:?}",
                        result.session.state,
                        result.effects
                    );
                    session = result.session;
                    prop_assert!(is_valid_session(&session), "Invalid session: {:?}", session);
                }
                Err(_) => { /* Stale collaborator result is OK */ }
            }
        }
    }

    // A greeting followed by an existence answer re-enters the dialogue
    // from whatever state the user was in
    #[test]
    fn prop_greeting_always_reenters(
        state in arb_state(),
        language in arb_language(),
        exists in any::<bool>()
    ) {
        let config = test_config();
        let mut session = test_session(state);
        session.language = language;

        let greeted = transition(&session, &config, Event::UserText { text: "Hi".to_string() });
        prop_assert!(greeted.is_ok());
        let greeted = greeted.unwrap();
        prop_assert_eq!(greeted.session.state, state);

        let result = transition(
            &greeted.session,
            &config,
            Event::ExistenceChecked { outcome: Ok(exists) },
        );
        prop_assert!(result.is_ok());
        let result = result.unwrap();
        let expected = if exists {
            DialogueState::CollectingPasswordLogin
        } else {
            DialogueState::ChoosingLanguage
        };
        prop_assert_eq!(result.session.state, expected);
        prop_assert!(result.session.pending_listing.is_none());
        prop_assert_eq!(result.session.language, language);
    }

    // Invalid pincodes never advance the dialogue
    #[test]
    fn prop_invalid_pincode_keeps_state(input in "[0-9]{0,5}|[0-9]{7,10}|[0-9]{0,5}[a-z][0-9]{0,5}") {
        prop_assume!(!test_config().is_greeting(&input));
        let session = test_session(DialogueState::CollectingPincode);
        let result = transition(&session, &test_config(), Event::UserText { text: input });
        prop_assert!(result.is_ok());
        let result = result.unwrap();
        prop_assert_eq!(result.session.state, DialogueState::CollectingPincode);
        prop_assert!(result.session.profile.pincode.is_none());
        prop_assert!(result.effects.iter().all(|e| matches!(e, Effect::Reply(_))));
    }

    // Non-positive prices are re-prompted without losing the pending listing
    #[test]
    fn prop_non_positive_price_keeps_state(value in -10_000.0f64..=0.0) {
        let mut session = test_session(DialogueState::AwaitingPrice);
        let mut pending = PendingListing::new("Vegetables");
        pending.crop_name = Some("Onion".to_string());
        session.pending_listing = Some(pending.clone());

        let result = transition(
            &session,
            &test_config(),
            Event::UserText { text: value.to_string() },
        );
        prop_assert!(result.is_ok());
        let result = result.unwrap();
        prop_assert_eq!(result.session.state, DialogueState::AwaitingPrice);
        prop_assert_eq!(result.session.pending_listing, Some(pending));
    }

    // Positive prices are accepted as entered
    #[test]
    fn prop_positive_price_accepted(value in 0.01f64..100_000.0) {
        prop_assert_eq!(parse_positive(&value.to_string()), Some(value));
    }

    // Transitions never touch the identity
    #[test]
    fn prop_identity_is_stable(state in arb_state(), event in arb_event()) {
        let session = test_session(state);
        if let Ok(result) = transition(&session, &test_config(), event) {
            prop_assert_eq!(result.session.identity, session.identity);
        }
    }
}

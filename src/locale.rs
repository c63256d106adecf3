//! Localized prompt text and audio cue keys
//!
//! Every user-facing string is looked up by `(Language, MessageId)` so the
//! dialogue code never branches on language itself.

use crate::catalog::{Catalog, Category};
use crate::price::PriceStats;
use serde::{Deserialize, Serialize};

/// Conversation language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }
}

/// Pre-recorded audio clips the transport can play alongside text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioClip {
    Welcome,
    AskName,
    AskAddress,
    AskState,
    AskPincode,
    AskPassword,
    RegComplete,
    AskPrice,
    AskQuantity,
    AskMoreCrops,
    NextCrop,
    ThankYou,
    WelcomeBack,
    AskLoginPassword,
    Closing,
}

impl AudioClip {
    /// File stem of the clip, without language prefix
    pub fn key(self) -> &'static str {
        match self {
            AudioClip::Welcome => "welcome",
            AudioClip::AskName => "ask_name",
            AudioClip::AskAddress => "ask_address",
            AudioClip::AskState => "ask_state",
            AudioClip::AskPincode => "ask_pincode",
            AudioClip::AskPassword => "ask_password",
            AudioClip::RegComplete => "reg_complete",
            AudioClip::AskPrice => "ask_price",
            AudioClip::AskQuantity => "ask_quantity",
            AudioClip::AskMoreCrops => "ask_more_crops",
            AudioClip::NextCrop => "next_crop",
            AudioClip::ThankYou => "thank_you",
            AudioClip::WelcomeBack => "welcome_back",
            AudioClip::AskLoginPassword => "ask_loginpassword",
            AudioClip::Closing => "closing",
        }
    }

    /// The welcome clip is bilingual and shared by both languages
    pub fn is_localized(self) -> bool {
        !matches!(self, AudioClip::Welcome)
    }
}

/// Identifiers for fixed prompt text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    Welcome,
    LanguageMenu,
    LanguageRetry,
    AskName,
    RetryName,
    AskAddress,
    RetryAddress,
    AskRegion,
    AskRegionForPrices,
    RetryRegion,
    AskPincode,
    RetryPincode,
    AskPassword,
    RetryPassword,
    RegistrationComplete,
    RegistrationFailed,
    RegisteredLoginFailed,
    RegistryUnavailable,
    WelcomeBack,
    AskLoginPassword,
    LoginSuccess,
    LoginFailed,
    CategoryHeader,
    RetryCategory,
    CropHeader,
    RetryCrop,
    CheckingPrices,
    PriceUnavailable,
    AskPrice,
    RetryPrice,
    AskQuantity,
    RetryQuantity,
    ListingFailed,
    AskMoreCrops,
    Closing,
    SendGreeting,
    TextOnly,
    RestartRequired,
    InternalError,
}

fn pick(lang: Language, en: &'static str, hi: &'static str) -> &'static str {
    match lang {
        Language::En => en,
        Language::Hi => hi,
    }
}

/// Look up the fixed text for a message
#[allow(clippy::too_many_lines)]
pub fn text(lang: Language, id: MessageId) -> &'static str {
    match id {
        MessageId::Welcome => pick(
            lang,
            "Welcome to Agrikart! We help you sell your produce at the right price.",
            "एग्रीकार्ट में आपका स्वागत है! हम आपकी उपज को सही दाम पर बेचने में मदद करते हैं।",
        ),
        // The language menu is shown before a language is known
        MessageId::LanguageMenu => {
            "Please choose your language / कृपया अपनी भाषा चुनें:\n1. English\n2. हिंदी (Hindi)"
        }
        MessageId::LanguageRetry => {
            "Please reply 1 for English or 2 for Hindi. / अंग्रेज़ी के लिए 1 या हिंदी के लिए 2 भेजें।"
        }
        MessageId::AskName => pick(lang, "What is your full name?", "आपका पूरा नाम क्या है?"),
        MessageId::RetryName => pick(
            lang,
            "Name cannot be empty. Please type your full name.",
            "नाम खाली नहीं हो सकता। कृपया अपना पूरा नाम लिखें।",
        ),
        MessageId::AskAddress => pick(
            lang,
            "Please enter your address (village/town, district).",
            "कृपया अपना पता लिखें (गाँव/कस्बा, ज़िला)।",
        ),
        MessageId::RetryAddress => pick(
            lang,
            "Address cannot be empty. Please type your address.",
            "पता खाली नहीं हो सकता। कृपया अपना पता लिखें।",
        ),
        MessageId::AskRegion => pick(
            lang,
            "Which state do you farm in? (e.g. Punjab)",
            "आप किस राज्य में खेती करते हैं? (जैसे Punjab)",
        ),
        MessageId::AskRegionForPrices => pick(
            lang,
            "To suggest market prices, please tell us which state you farm in (e.g. Punjab).",
            "बाज़ार भाव बताने के लिए कृपया अपना राज्य लिखें (जैसे Punjab)।",
        ),
        MessageId::RetryRegion => pick(
            lang,
            "State cannot be empty. Please type the name of your state.",
            "राज्य खाली नहीं हो सकता। कृपया अपने राज्य का नाम लिखें।",
        ),
        MessageId::AskPincode => pick(
            lang,
            "Please enter your 6-digit pincode.",
            "कृपया अपना 6 अंकों का पिनकोड लिखें।",
        ),
        MessageId::RetryPincode => pick(
            lang,
            "That doesn't look right. A pincode has exactly 6 digits, e.g. 144001.",
            "यह सही नहीं लगता। पिनकोड में ठीक 6 अंक होते हैं, जैसे 144001।",
        ),
        MessageId::AskPassword => pick(
            lang,
            "Create a password for your Agrikart account.",
            "अपने एग्रीकार्ट खाते के लिए एक पासवर्ड बनाएं।",
        ),
        MessageId::RetryPassword => pick(
            lang,
            "Password cannot be empty. Please type a password.",
            "पासवर्ड खाली नहीं हो सकता। कृपया पासवर्ड लिखें।",
        ),
        MessageId::RegistrationComplete => pick(
            lang,
            "Registration complete! You can now list your produce.",
            "पंजीकरण पूरा हुआ! अब आप अपनी उपज बेचने के लिए डाल सकते हैं।",
        ),
        MessageId::RegistrationFailed => pick(
            lang,
            "We could not complete your registration. Please check your details and send your password again to retry.",
            "आपका पंजीकरण पूरा नहीं हो सका। कृपया दोबारा कोशिश करने के लिए अपना पासवर्ड फिर से भेजें।",
        ),
        MessageId::RegisteredLoginFailed => pick(
            lang,
            "Your account was created, but we could not log you in. Please enter your password to log in.",
            "आपका खाता बन गया है, लेकिन लॉगिन नहीं हो सका। कृपया लॉगिन के लिए अपना पासवर्ड लिखें।",
        ),
        MessageId::RegistryUnavailable => pick(
            lang,
            "Our service is not reachable right now. Please try again in a moment.",
            "हमारी सेवा अभी उपलब्ध नहीं है। कृपया थोड़ी देर बाद फिर कोशिश करें।",
        ),
        MessageId::WelcomeBack => pick(lang, "Welcome back to Agrikart!", "एग्रीकार्ट में फिर से स्वागत है!"),
        MessageId::AskLoginPassword => pick(
            lang,
            "Please enter your password to log in.",
            "लॉगिन करने के लिए कृपया अपना पासवर्ड लिखें।",
        ),
        MessageId::LoginSuccess => pick(lang, "Login successful.", "लॉगिन सफल रहा।"),
        MessageId::LoginFailed => pick(
            lang,
            "Incorrect password. Please try again.",
            "पासवर्ड गलत है। कृपया फिर से कोशिश करें।",
        ),
        MessageId::CategoryHeader => pick(
            lang,
            "What would you like to sell? Reply with a number:",
            "आप क्या बेचना चाहते हैं? नंबर लिखकर जवाब दें:",
        ),
        MessageId::RetryCategory => pick(
            lang,
            "Please choose a category from the list by its number.",
            "कृपया सूची में से श्रेणी का नंबर चुनें।",
        ),
        MessageId::CropHeader => pick(
            lang,
            "Which crop? Reply with a number:",
            "कौन सी फसल? नंबर लिखकर जवाब दें:",
        ),
        MessageId::RetryCrop => pick(
            lang,
            "Please choose a crop from the list by its number or name.",
            "कृपया सूची में से फसल का नंबर या नाम चुनें।",
        ),
        MessageId::CheckingPrices => pick(
            lang,
            "Checking today's market prices, please wait...",
            "आज के बाज़ार भाव देखे जा रहे हैं, कृपया प्रतीक्षा करें...",
        ),
        MessageId::PriceUnavailable => pick(
            lang,
            "We could not find recent market prices for this crop in your state.",
            "आपके राज्य में इस फसल के हाल के बाज़ार भाव नहीं मिले।",
        ),
        MessageId::AskPrice => pick(
            lang,
            "Please enter your selling price per kg (in ₹).",
            "कृपया प्रति किलो अपना बिक्री मूल्य (₹ में) लिखें।",
        ),
        MessageId::RetryPrice => pick(
            lang,
            "Please enter the price as a number greater than 0, e.g. 25 or 25.5.",
            "कृपया मूल्य 0 से बड़ी संख्या में लिखें, जैसे 25 या 25.5।",
        ),
        MessageId::AskQuantity => pick(
            lang,
            "How many kg do you want to sell?",
            "आप कितने किलो बेचना चाहते हैं?",
        ),
        MessageId::RetryQuantity => pick(
            lang,
            "Please enter the quantity in kg as a number greater than 0, e.g. 100.",
            "कृपया मात्रा किलो में 0 से बड़ी संख्या में लिखें, जैसे 100।",
        ),
        MessageId::ListingFailed => pick(
            lang,
            "We could not save your listing right now. Please try again later.",
            "आपकी सूची अभी सहेजी नहीं जा सकी। कृपया बाद में फिर कोशिश करें।",
        ),
        MessageId::AskMoreCrops => pick(
            lang,
            "Do you want to list another crop? (yes/no)",
            "क्या आप एक और फसल डालना चाहते हैं? (हाँ/नहीं)",
        ),
        MessageId::Closing => pick(
            lang,
            "Thank you for using Agrikart! Send 'hi' anytime to list more produce.",
            "एग्रीकार्ट का उपयोग करने के लिए धन्यवाद! और उपज डालने के लिए कभी भी 'hi' भेजें।",
        ),
        MessageId::SendGreeting => pick(
            lang,
            "Send 'hi' to get started.",
            "शुरू करने के लिए 'hi' भेजें।",
        ),
        MessageId::TextOnly => pick(
            lang,
            "Sorry, I can only read text messages. Please type your reply.",
            "माफ़ कीजिए, मैं केवल टेक्स्ट संदेश पढ़ सकता हूँ। कृपया अपना जवाब लिखें।",
        ),
        MessageId::RestartRequired => pick(
            lang,
            "Some of your details are missing. Please send 'hi' to start again.",
            "आपकी कुछ जानकारी अधूरी है। कृपया फिर से शुरू करने के लिए 'hi' भेजें।",
        ),
        MessageId::InternalError => pick(
            lang,
            "Something went wrong. Please send 'hi' to start again.",
            "कुछ गड़बड़ हो गई। कृपया फिर से शुरू करने के लिए 'hi' भेजें।",
        ),
    }
}

/// Numbered category menu
pub fn category_menu(lang: Language, catalog: &Catalog) -> String {
    let mut menu = text(lang, MessageId::CategoryHeader).to_string();
    for (index, category) in catalog.categories().iter().enumerate() {
        menu.push_str(&format!("\n{}. {}", index + 1, category.label(lang)));
    }
    menu
}

/// Numbered crop menu for one category
pub fn crop_menu(lang: Language, category: &Category) -> String {
    let mut menu = text(lang, MessageId::CropHeader).to_string();
    for (index, product) in category.products.iter().enumerate() {
        menu.push_str(&format!("\n{}. {}", index + 1, product.name));
    }
    menu
}

/// Market price summary shown before asking for the selling price
pub fn price_suggestion(lang: Language, crop: &str, region: &str, stats: &PriceStats) -> String {
    // Reports are per quintal (100 kg)
    let (min_kg, max_kg, avg_kg) = (stats.min / 100.0, stats.max / 100.0, stats.avg / 100.0);
    match lang {
        Language::En => format!(
            "Market prices for {crop} in {region} ({} markets, Rs/quintal):\nMin: ₹{} (₹{min_kg:.2}/kg)\nMax: ₹{} (₹{max_kg:.2}/kg)\nAverage: ₹{:.2} (about ₹{avg_kg:.2}/kg)",
            stats.sample_count, stats.min, stats.max, stats.avg
        ),
        Language::Hi => format!(
            "{region} में {crop} के बाज़ार भाव ({} मंडियां, रु/क्विंटल):\nन्यूनतम: ₹{} (₹{min_kg:.2}/किलो)\nअधिकतम: ₹{} (₹{max_kg:.2}/किलो)\nऔसत: ₹{:.2} (लगभग ₹{avg_kg:.2}/किलो)",
            stats.sample_count, stats.min, stats.max, stats.avg
        ),
    }
}

/// Confirmation after a listing was accepted by the registry
pub fn listing_saved(lang: Language, crop: &str, quantity_kg: f64, price_per_kg: f64) -> String {
    match lang {
        Language::En => format!("Listed {quantity_kg} kg of {crop} at ₹{price_per_kg}/kg."),
        Language::Hi => format!("{crop} की {quantity_kg} किलो उपज ₹{price_per_kg}/किलो पर डाल दी गई है।"),
    }
}

//! User-facing copy.
//!
//! English templates are machine-translated at send time; a few have
//! hand-written variants that are used as-is. Placeholders are filled after
//! translation so user-supplied values reach the user untouched.

pub const WELCOME: &str = "👋 Welcome to Aerogramme! In which language would you like to continue? \n\n👋 Bienvenue sur Aerogramme ! Dans quelle langue souhaitez-vous continuer? \n\n👋 ¡Bienvenido a Aerogramme! ¿En qué idioma te gustaría continuar? \n\n👋 एरोग्राम में आपका स्वागत है! आप किस भाषा में जारी रखना चाहेंगे? \n\n👋 Aerogrammeへようこそ！どの言語で続けたいですか？";

pub const LANGUAGE_MENU: &str = "1️⃣ Press \"1\" for English\n2️⃣ Envoyez \"2\" pour Français\n3️⃣ Envía \"3\" para Español\n4️⃣ भेजें \"4\" हिंदी के लिए\n5️⃣ 日本語の場合は\"5\"を送信してください";

pub const HELP: &str = "Please ask to \"restart\" if you want to restart our conversation any time 🔄 and \"language\" if you want to change the language. 😊";

pub const INTRODUCTION: &str = "Hello and welcome to Aerogramme. With me, you can send your postcards directly from WhatsApp. Here's what an Aerogramme postcard looks like once printed👇\n\nOn the front: your photo\nOn the back: your text (you can write a lot!)*\n\nThe price of a postcard is {price} {currency}. Each postcard will be sent in an envelope.";

pub const GREETING: &str = "💌 Let's start from the beginning: who do you want to surprise? Give me the full name of the recipient (First + Last)!";

const NAME_CONFIRMATION: &str = "Great, I've noted that you want to send your postcard to {name}. 🏠 Now, give me their full address.\n\nPlease include: Street Number, Street Name, City, Postal Code, Country.\nFor example: 10 Avenue des Champs-Élysées, Paris, 75008, France";
const NAME_CONFIRMATION_FR: &str = "Parfait, j'ai noté que vous voulez envoyer votre carte postale à {name}. 🏠 Maintenant, donnez moi son adresse complète.\n\nPensez à renseigner: Numéro, Nom de Rue, Ville, Code Postal, Pays.\nPar exemple: 10 Avenue des Champs-Élysées, Paris, 75008, France";
const NAME_CONFIRMATION_ES: &str = "Perfecto, he anotado que quieres enviar tu postal a {name}. 🏠 Ahora, dame su dirección completa.\n\nIncluye: Número de Calle, Nombre de Calle, Ciudad, Código Postal, País.\nPor ejemplo: 10 Avenue des Champs-Élysées, Paris, 75008, France";
const NAME_CONFIRMATION_DE: &str = "Perfekt, ich habe notiert, dass Sie Ihre Postkarte an {name} senden möchten. 🏠 Geben Sie mir nun die vollständige Adresse.\n\nBitte angeben: Hausnummer, Straßenname, Stadt, Postleitzahl, Land.\nZum Beispiel: 10 Avenue des Champs-Élysées, Paris, 75008, France";

pub const ADDRESS_PREVIEW: &str = "📍 I've formatted your address as:\n\n{address}\n\nType \"Yes\" to proceed or \"No\" to make changes";
pub const ADDRESS_MANUAL: &str = "Please manually adjust your address and make your changes:";
pub const ADDRESS_CLARIFY: &str = "Please respond with \"Yes\" to proceed or \"No\" to make changes";

pub const MESSAGE_PROMPT: &str = "Perfect, I've saved the address. Now, tell me the message you'd like to write on the back of your postcard. 📝";
pub const MESSAGE_SAVED: &str = "Great, I've saved your message: « {message} ».";
pub const IMAGE_PROMPT: &str = "Now, send me the photo you want to use for your postcard. 📸";

const SUMMARY: &str = "✅ Please confirm your details:\n👤 Recipient: {name}\n📍 Address: {address}\n📝 Message: {message}\n\nType 'Yes' to proceed ✅ or 'No' to make changes ✏️.";
const SUMMARY_FR: &str = "✅ Veuillez confirmer vos informations :\n👤 Destinataire : {name}\n📍 Adresse : {address}\n📝 Message : {message}\n\nTapez 'Oui' pour continuer ✅ ou 'Non' pour apporter des modifications ✏️.";
pub const NO_MESSAGE: &str = "No message provided";
pub const CONFIRM_CLARIFY: &str = "I'm not sure if you want to proceed or make changes. Please type 'Yes' to proceed or 'No' to make changes. 😊";

pub const EDIT_MENU: &str = "What would you like to edit?\n1️⃣ Name\n2️⃣ Address\n3️⃣ Message\n4️⃣ Image\n\nJust type the number or name of what you want to change.";
pub const EDIT_INVALID: &str = "Please select a valid option (1-4) or type the name of what you want to edit.";
pub const EDIT_NAME_PROMPT: &str = "Please enter the new recipient name:";
pub const EDIT_ADDRESS_PROMPT: &str = "Please enter the new address exactly as you want it to appear (no formatting will be applied):\n\nFor example: '10 Avenue des Champs-Élysées, Paris, 75008, France'";
pub const EDIT_MESSAGE_PROMPT: &str = "Please enter the new message for the postcard:";
pub const EDIT_IMAGE_PROMPT: &str = "Please send the new image for your postcard:";

pub const UPDATED_NAME: &str = "✅ Updated recipient name to: {name}";
pub const UPDATED_ADDRESS: &str = "✅ Updated address to: {address}";
pub const UPDATED_MESSAGE: &str = "✅ Updated message to: \"{message}\"";
pub const UPDATED_IMAGE: &str = "✅ Updated image for your postcard";

pub const PAYMENT_PREPARING: &str = "Great! Your order is confirmed. I'm preparing your payment link... 💳";
pub const PAYMENT_LINK: &str = "Awesome! All you need to do now is click here to complete payment 👉 {link}\nAnd that's it — your postcard will be sent within 24h once payment is received 🚀✉️";
pub const PAYMENT_LINK_FAILED: &str = "Payment link generation failed";
pub const PAYMENT_REMINDER: &str = "Please complete your payment using the link above. I'll notify you once payment is confirmed! 💳\n\n(Testing: type 'donepay' to simulate payment)";
pub const PAYMENT_CONGRATS: &str = "Congratulations on successfully completing your payment! 🎉 Your postcard is on its way to making someone's day a little brighter.";
pub const PAYMENT_INSPIRE: &str = "If you're inspired to send another heartfelt message, simply let us know, your next postcard awaits! 🖊️✨";

pub const ANOTHER_CLARIFY: &str = "I'm not sure if you'd like to send another postcard. Could you please say yes or no? 😊";
pub const FAREWELL: &str = "Have a great day! You can come anytime if you want to send postcards to your loved ones! 💌";

pub const LIMIT_NOTICE: &str = "You've reached the message limit for this chat (150 messages per 24 hours). Please try again tomorrow.";
pub const APOLOGY: &str = "Sorry, something went wrong. Please try again.";

/// Hand-written name confirmation, if one exists for the language.
pub fn native_name_confirmation(language: &str) -> Option<&'static str> {
    match language {
        "fr" => Some(NAME_CONFIRMATION_FR),
        "es" => Some(NAME_CONFIRMATION_ES),
        "de" => Some(NAME_CONFIRMATION_DE),
        _ => None,
    }
}

pub fn name_confirmation() -> &'static str {
    NAME_CONFIRMATION
}

pub fn native_summary(language: &str) -> Option<&'static str> {
    match language {
        "fr" => Some(SUMMARY_FR),
        _ => None,
    }
}

pub fn summary() -> &'static str {
    SUMMARY
}

/// The recurring reminder; English for every language without its own copy.
pub fn periodic_promotion(language: &str) -> &'static str {
    match language {
        "fr" => {
            "Un petit mot qui fait grand plaisir : n'oubliez pas qu'une carte postale, ça touche toujours le cœur. Prenez un moment pour envoyer un sourire à ceux que vous aimez."
        }
        "es" => {
            "Una pequeña palabra que trae una gran alegría: no olvides que una postal siempre toca el corazón. Tómate un momento para enviar una sonrisa a quienes amas."
        }
        _ => {
            "A little word that brings great pleasure: don't forget that a postcard always touches the heart. Take a moment to send a smile to those you love."
        }
    }
}

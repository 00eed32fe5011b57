//! Localized display strings.
//!
//! Each language owns an immutable table; a [`Localizer`] carries the selected language and
//! the fallback used when a key (or a whole language) is missing. Switching language is a
//! plain field update, so the next frame renders in the new language.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Language {
    #[default]
    Fr,
    En,
    Du,
    Ba,
    Ew,
}

impl Language {
    pub(crate) const ALL: [Language; 5] = [
        Language::Fr,
        Language::En,
        Language::Du,
        Language::Ba,
        Language::Ew,
    ];

    pub(crate) fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
            Language::Du => "du",
            Language::Ba => "ba",
            Language::Ew => "ew",
        }
    }

    pub(crate) fn display_name(self) -> &'static str {
        match self {
            Language::Fr => "Français",
            Language::En => "English",
            Language::Du => "Douala",
            Language::Ba => "Bassa",
            Language::Ew => "Ewondo",
        }
    }

    pub(crate) fn from_code(code: &str) -> Option<Language> {
        let code = code.trim();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }

    pub(crate) fn next(self) -> Language {
        let idx = Language::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Language::ALL[(idx + 1) % Language::ALL.len()]
    }

    pub(crate) fn prev(self) -> Language {
        let idx = Language::ALL.iter().position(|l| *l == self).unwrap_or(0);
        let prev = if idx == 0 {
            Language::ALL.len() - 1
        } else {
            idx - 1
        };
        Language::ALL[prev]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| {
            let known = Language::ALL
                .iter()
                .map(|l| l.code())
                .collect::<Vec<_>>()
                .join(", ");
            format!("unknown language '{}' (expected one of: {known})", s.trim())
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum MessageKey {
    Title,
    Placeholder,
    Submit,
    Submitting,
    SelectLanguage,
    OfflineMessage,
    Comment,
    Rating,
    Star,
    UniqueCode,
    CodePlaceholder,
    InvalidCode,
    AnalysisError,
    CommentTooLong,
    CharLimitReached,
    LimitReached,
    Saved,
    SaveError,
    NetworkError,
    CodeValidationError,
    NothingToSubmit,
    DarkMode,
    LightMode,
    MoreEmojis,
    StageValidatingCode,
    StageAnalyzing,
    StagePersisting,
    Emoji,
    Sentiment,
    FinishHint,
    EnterNumber,
    InvalidChoice,
    KeyLanguage,
    KeyNext,
    KeyTheme,
    KeyQuit,
    KeyEdit,
    KeyNewLine,
    KeyPick,
    KeyInsert,
    KeyMore,
    KeyStars,
    KeySet,
}

impl MessageKey {
    /// Stable identifier, also the last-resort rendering of a missing key.
    pub(crate) fn id(self) -> &'static str {
        match self {
            MessageKey::Title => "title",
            MessageKey::Placeholder => "placeholder",
            MessageKey::Submit => "submit",
            MessageKey::Submitting => "submitting",
            MessageKey::SelectLanguage => "selectLanguage",
            MessageKey::OfflineMessage => "offlineMessage",
            MessageKey::Comment => "comment",
            MessageKey::Rating => "rating",
            MessageKey::Star => "star",
            MessageKey::UniqueCode => "uniqueCode",
            MessageKey::CodePlaceholder => "codePlaceholder",
            MessageKey::InvalidCode => "invalidCode",
            MessageKey::AnalysisError => "analysisError",
            MessageKey::CommentTooLong => "commentTooLong",
            MessageKey::CharLimitReached => "charLimitReached",
            MessageKey::LimitReached => "limitReached",
            MessageKey::Saved => "saved",
            MessageKey::SaveError => "saveError",
            MessageKey::NetworkError => "networkError",
            MessageKey::CodeValidationError => "codeValidationError",
            MessageKey::NothingToSubmit => "nothingToSubmit",
            MessageKey::DarkMode => "darkMode",
            MessageKey::LightMode => "lightMode",
            MessageKey::MoreEmojis => "moreEmojis",
            MessageKey::StageValidatingCode => "stageValidatingCode",
            MessageKey::StageAnalyzing => "stageAnalyzing",
            MessageKey::StagePersisting => "stagePersisting",
            MessageKey::Emoji => "emoji",
            MessageKey::Sentiment => "sentiment",
            MessageKey::FinishHint => "finishHint",
            MessageKey::EnterNumber => "enterNumber",
            MessageKey::InvalidChoice => "invalidChoice",
            MessageKey::KeyLanguage => "keyLanguage",
            MessageKey::KeyNext => "keyNext",
            MessageKey::KeyTheme => "keyTheme",
            MessageKey::KeyQuit => "keyQuit",
            MessageKey::KeyEdit => "keyEdit",
            MessageKey::KeyNewLine => "keyNewLine",
            MessageKey::KeyPick => "keyPick",
            MessageKey::KeyInsert => "keyInsert",
            MessageKey::KeyMore => "keyMore",
            MessageKey::KeyStars => "keyStars",
            MessageKey::KeySet => "keySet",
        }
    }
}

type Table = &'static [(MessageKey, &'static str)];

const FR: Table = &[
    (MessageKey::Title, "Partagez votre expérience"),
    (MessageKey::Placeholder, "Votre commentaire..."),
    (MessageKey::Submit, "Envoyer"),
    (MessageKey::Submitting, "Envoi en cours..."),
    (MessageKey::SelectLanguage, "Choisir langue"),
    (
        MessageKey::OfflineMessage,
        "Hors ligne : données synchronisées plus tard",
    ),
    (MessageKey::Comment, "Commentaire"),
    (MessageKey::Rating, "Évaluation"),
    (MessageKey::Star, "Étoile"),
    (MessageKey::UniqueCode, "Code unique"),
    (
        MessageKey::CodePlaceholder,
        "Entrez votre code unique (ou BLFLGE pour anonyme)",
    ),
    (
        MessageKey::InvalidCode,
        "Code unique invalide, veuillez vérifier ou utiliser BLFLGE pour anonyme",
    ),
    (
        MessageKey::AnalysisError,
        "Erreur lors de l'analyse du commentaire.",
    ),
    (
        MessageKey::CommentTooLong,
        "Commentaire trop long (max 500 caractères).",
    ),
    (MessageKey::CharLimitReached, "Limite de caractères atteinte !"),
    (MessageKey::LimitReached, "Limite atteinte"),
    (MessageKey::Saved, "Feedback enregistré avec succès !"),
    (MessageKey::SaveError, "Erreur lors de l'enregistrement."),
    (MessageKey::NetworkError, "Erreur réseau : "),
    (
        MessageKey::CodeValidationError,
        "Erreur lors de la validation du code.",
    ),
    (
        MessageKey::NothingToSubmit,
        "Ajoutez un commentaire ou une note avant d'envoyer.",
    ),
    (MessageKey::DarkMode, "Mode sombre"),
    (MessageKey::LightMode, "Mode clair"),
    (MessageKey::MoreEmojis, "Plus d'émojis"),
    (MessageKey::StageValidatingCode, "validation du code"),
    (MessageKey::StageAnalyzing, "analyse du commentaire"),
    (MessageKey::StagePersisting, "enregistrement du feedback"),
    (MessageKey::Emoji, "Émoji"),
    (MessageKey::Sentiment, "Sentiment :"),
    (MessageKey::FinishHint, "Appuyez sur Entrée sur une ligne vide pour terminer."),
    (MessageKey::EnterNumber, "Entrez un numéro"),
    (MessageKey::InvalidChoice, "Choix invalide. Réessayez."),
    (MessageKey::KeyLanguage, "Langue"),
    (MessageKey::KeyNext, "Suivant"),
    (MessageKey::KeyTheme, "Thème"),
    (MessageKey::KeyQuit, "Quitter"),
    (MessageKey::KeyEdit, "Saisir"),
    (MessageKey::KeyNewLine, "Nouvelle ligne"),
    (MessageKey::KeyPick, "Choisir"),
    (MessageKey::KeyInsert, "Insérer"),
    (MessageKey::KeyMore, "Plus"),
    (MessageKey::KeyStars, "Étoiles"),
    (MessageKey::KeySet, "Noter"),
];

const EN: Table = &[
    (MessageKey::Title, "Share your experience"),
    (MessageKey::Placeholder, "Your comment..."),
    (MessageKey::Submit, "Submit"),
    (MessageKey::Submitting, "Submitting..."),
    (MessageKey::SelectLanguage, "Select language"),
    (MessageKey::OfflineMessage, "Offline: data will sync later"),
    (MessageKey::Comment, "Comment"),
    (MessageKey::Rating, "Rating"),
    (MessageKey::Star, "Star"),
    (MessageKey::UniqueCode, "Unique code"),
    (
        MessageKey::CodePlaceholder,
        "Enter your unique code (or BLFLGE for anonymous)",
    ),
    (
        MessageKey::InvalidCode,
        "Invalid unique code, please check or use BLFLGE for anonymous",
    ),
    (MessageKey::AnalysisError, "Error analyzing the comment."),
    (
        MessageKey::CommentTooLong,
        "Comment too long (max 500 characters).",
    ),
    (MessageKey::CharLimitReached, "Character limit reached!"),
    (MessageKey::LimitReached, "Limit reached"),
    (MessageKey::Saved, "Feedback saved successfully!"),
    (MessageKey::SaveError, "Error while saving."),
    (MessageKey::NetworkError, "Network error: "),
    (MessageKey::CodeValidationError, "Error validating the code."),
    (
        MessageKey::NothingToSubmit,
        "Add a comment or a rating before submitting.",
    ),
    (MessageKey::DarkMode, "Dark mode"),
    (MessageKey::LightMode, "Light mode"),
    (MessageKey::MoreEmojis, "More emojis"),
    (MessageKey::StageValidatingCode, "validating code"),
    (MessageKey::StageAnalyzing, "analyzing comment"),
    (MessageKey::StagePersisting, "saving feedback"),
    (MessageKey::Emoji, "Emoji"),
    (MessageKey::Sentiment, "Sentiment:"),
    (MessageKey::FinishHint, "Press Enter on an empty line to finish."),
    (MessageKey::EnterNumber, "Enter a number"),
    (MessageKey::InvalidChoice, "Invalid choice. Try again."),
    (MessageKey::KeyLanguage, "Language"),
    (MessageKey::KeyNext, "Next"),
    (MessageKey::KeyTheme, "Theme"),
    (MessageKey::KeyQuit, "Quit"),
    (MessageKey::KeyEdit, "Edit"),
    (MessageKey::KeyNewLine, "New line"),
    (MessageKey::KeyPick, "Pick"),
    (MessageKey::KeyInsert, "Insert"),
    (MessageKey::KeyMore, "More"),
    (MessageKey::KeyStars, "Stars"),
    (MessageKey::KeySet, "Set"),
];

const DU: Table = &[
    (MessageKey::Title, "Ponda na pendisa wé"),
    (MessageKey::Placeholder, "Pendisa di wé..."),
    (MessageKey::Submit, "Tuma"),
    (MessageKey::Submitting, "Tuma na kala..."),
    (MessageKey::SelectLanguage, "Lukisa lole"),
    (
        MessageKey::OfflineMessage,
        "Sans connexion : pendisa tondi na kwe",
    ),
    (MessageKey::Comment, "Pendisa"),
    (MessageKey::Rating, "Évaluation"),
    (MessageKey::Star, "Étoile"),
    (MessageKey::UniqueCode, "Code unique"),
    (
        MessageKey::CodePlaceholder,
        "Nusana code unique (wou BLFLGE po anonyme)",
    ),
    (
        MessageKey::InvalidCode,
        "Code unique mbi, yon ti code wou nusana BLFLGE po anonyme",
    ),
    (MessageKey::AnalysisError, "Ngbu na pendisa comment."),
];

const BA: Table = &[
    (MessageKey::Title, "Lɔŋgɔ na pendisa wé"),
    (MessageKey::Placeholder, "Pendisa di wé..."),
    (MessageKey::Submit, "Tuma"),
    (MessageKey::Submitting, "Tuma na kala..."),
    (MessageKey::SelectLanguage, "Lukisa lole"),
    (
        MessageKey::OfflineMessage,
        "Sans connexion : pendisa tondi na kwe",
    ),
    (MessageKey::Comment, "Pendisa"),
    (MessageKey::Rating, "Évaluation"),
    (MessageKey::Star, "Étoile"),
    (MessageKey::UniqueCode, "Code unique"),
    (
        MessageKey::CodePlaceholder,
        "Nusana code unique (wou BLFLGE po anonyme)",
    ),
    (
        MessageKey::InvalidCode,
        "Code unique mbi, yon ti code wou nusana BLFLGE po anonyme",
    ),
    (MessageKey::AnalysisError, "Ngbu na pendisa comment."),
];

const EW: Table = &[
    (MessageKey::Title, "Londo na pendisa wé"),
    (MessageKey::Placeholder, "Pendisa di wé..."),
    (MessageKey::Submit, "Tuma"),
    (MessageKey::Submitting, "Tuma na kala..."),
    (MessageKey::SelectLanguage, "Lukisa lole"),
    (
        MessageKey::OfflineMessage,
        "Sans connexion : pendisa tondi na kwe",
    ),
    (MessageKey::Comment, "Pendisa"),
    (MessageKey::Rating, "Évaluation"),
    (MessageKey::Star, "Étoile"),
    (MessageKey::UniqueCode, "Code unique"),
    (
        MessageKey::CodePlaceholder,
        "Nusana code unique (wou BLFLGE po anonyme)",
    ),
    (
        MessageKey::InvalidCode,
        "Code unique mbi, yon ti code wou nusana BLFLGE po anonyme",
    ),
    (MessageKey::AnalysisError, "Ngbu na pendisa comment."),
];

fn table(language: Language) -> Table {
    match language {
        Language::Fr => FR,
        Language::En => EN,
        Language::Du => DU,
        Language::Ba => BA,
        Language::Ew => EW,
    }
}

fn lookup(language: Language, key: MessageKey) -> Option<&'static str> {
    table(language)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
}

/// Localization context handed to every renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Localizer {
    current: Language,
    fallback: Language,
}

impl Localizer {
    pub(crate) fn new(current: Language) -> Self {
        Self::with_fallback(current, Language::Fr)
    }

    pub(crate) fn with_fallback(current: Language, fallback: Language) -> Self {
        Self { current, fallback }
    }

    pub(crate) fn language(&self) -> Language {
        self.current
    }

    pub(crate) fn set_language(&mut self, language: Language) {
        self.current = language;
    }

    /// Select a language by code; unknown codes select the fallback language.
    pub(crate) fn set_language_code(&mut self, code: &str) -> Language {
        self.current = Language::from_code(code).unwrap_or(self.fallback);
        self.current
    }

    pub(crate) fn t(&self, key: MessageKey) -> &'static str {
        lookup(self.current, key)
            .or_else(|| lookup(self.fallback, key))
            .unwrap_or_else(|| key.id())
    }
}

impl Default for Localizer {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

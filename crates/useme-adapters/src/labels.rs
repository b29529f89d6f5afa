//! Bilingual surface phrases, keyed by the logical field they denote.
//!
//! Adding a language or an alternate phrasing is a table edit; the extractors
//! only ever ask "which field does this label mean".

#[derive(Debug, Clone, Copy)]
pub struct Phrase<K> {
    pub kind: K,
    pub text: &'static str,
}

/// English and Polish entries sit side by side in each table.
const fn phrase<K>(kind: K, text: &'static str) -> Phrase<K> {
    Phrase { kind, text }
}

/// A logical field recognised through a table of per-language phrases.
pub trait LabelKind: Copy + 'static {
    fn phrases() -> &'static [Phrase<Self>];

    /// Case-sensitive whole-label match.
    fn from_label(label: &str) -> Option<Self> {
        Self::phrases()
            .iter()
            .find(|p| p.text == label)
            .map(|p| p.kind)
    }

    /// First phrase (in table order) that occurs inside `text`.
    fn matching_phrase(text: &str) -> Option<&'static Phrase<Self>> {
        Self::phrases().iter().find(|p| text.contains(p.text))
    }

    fn find_in(text: &str) -> Option<Self> {
        Self::matching_phrase(text).map(|p| p.kind)
    }
}

/// Phrases that are synonyms for a single marker rather than a field set.
#[derive(Debug, Clone, Copy)]
pub struct PhraseSet(&'static [Phrase<()>]);

impl PhraseSet {
    pub fn matches_exact(&self, text: &str) -> bool {
        self.0.iter().any(|p| p.text == text)
    }

    pub fn found_in(&self, text: &str) -> bool {
        self.0.iter().any(|p| text.contains(p.text))
    }
}

pub const NEGOTIABLE_PHRASES: PhraseSet = PhraseSet(&[phrase((), "Negotiable"), phrase((), "Do negocjacji")]);

pub const SUBMITTED_OFFERS_PHRASES: PhraseSet =
    PhraseSet(&[phrase((), "Submitted offers"), phrase((), "Wysłane oferty")]);

/// Labeled summary items on a job detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Employer,
    Published,
    Category,
    Copyright,
    Budget,
    ValidFor,
    Skills,
}

impl LabelKind for DetailField {
    fn phrases() -> &'static [Phrase<Self>] {
        const PHRASES: &[Phrase<DetailField>] = &[
            phrase(DetailField::Employer, "Employer"),
            phrase(DetailField::Employer, "Zleceniodawca"),
            phrase(DetailField::Published, "Published"),
            phrase(DetailField::Published, "Opublikowano"),
            phrase(DetailField::Category, "Category"),
            phrase(DetailField::Category, "Kategoria"),
            phrase(DetailField::Copyright, "Copyright"),
            phrase(DetailField::Copyright, "Prawa autorskie"),
            phrase(DetailField::Budget, "Budget"),
            phrase(DetailField::Budget, "Budżet"),
            phrase(DetailField::ValidFor, "Valid for"),
            phrase(DetailField::ValidFor, "Expires in"),
            phrase(DetailField::ValidFor, "Ważne przez"),
            phrase(DetailField::Skills, "Skills"),
            phrase(DetailField::Skills, "Umiejętności"),
        ];
        PHRASES
    }
}

/// Identity/location paragraphs of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStat {
    Country,
    Location,
    MemberSince,
}

impl LabelKind for ProfileStat {
    fn phrases() -> &'static [Phrase<Self>] {
        const PHRASES: &[Phrase<ProfileStat>] = &[
            phrase(ProfileStat::Country, "From:"),
            phrase(ProfileStat::Country, "Kraj:"),
            phrase(ProfileStat::Location, "Location:"),
            phrase(ProfileStat::Location, "Lokalizacja:"),
            phrase(ProfileStat::MemberSince, "On Useme since"),
            phrase(ProfileStat::MemberSince, "Na Useme od"),
        ];
        PHRASES
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealOutcome {
    Successful,
    Disputed,
    Failed,
}

impl LabelKind for DealOutcome {
    fn phrases() -> &'static [Phrase<Self>] {
        const PHRASES: &[Phrase<DealOutcome>] = &[
            phrase(DealOutcome::Successful, "SUCCESSFUL:"),
            phrase(DealOutcome::Successful, "ZAKOŃCZONE:"),
            phrase(DealOutcome::Disputed, "DISPUTED:"),
            phrase(DealOutcome::Disputed, "SPORNE:"),
            phrase(DealOutcome::Failed, "FAILED:"),
            phrase(DealOutcome::Failed, "ZERWANE:"),
        ];
        PHRASES
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpinionOutcome {
    Positive,
    Neutral,
    Negative,
}

impl LabelKind for OpinionOutcome {
    fn phrases() -> &'static [Phrase<Self>] {
        const PHRASES: &[Phrase<OpinionOutcome>] = &[
            phrase(OpinionOutcome::Positive, "POSITIVE:"),
            phrase(OpinionOutcome::Positive, "POZYTYWNE:"),
            phrase(OpinionOutcome::Neutral, "NEUTRAL:"),
            phrase(OpinionOutcome::Neutral, "NEUTRALNE:"),
            phrase(OpinionOutcome::Negative, "NEGATIVE:"),
            phrase(OpinionOutcome::Negative, "NEGATYWNE:"),
        ];
        PHRASES
    }
}

//! Spoken message tables and the localizer the dialog engine speaks through.
//!
//! The engine only ever references message ids with template parameters; the
//! actual wording and language selection live here. A succinct mode swaps in
//! shorter phrasings where one exists, falling back to the verbose string.

use chrono::Weekday;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgId {
    YourJournalIsNowOpen,
    NewEntryDraftExists,
    YouCanNowCreateYourEntry,
    ForDate,
    IRepeat,
    NextPartPleaseReprompt,
    YourEntryIsEmptyNoRepeat,
    YourEntryIsEmptyNoCorrect,
    OkayCorrectPart,
    CorrectPartReprompt,
    NewEntryAborted,
    YourEntryIsEmptyNoSave,
    NewEntryConfirmation,
    NewEntryConfirmationReprompt,
    OkaySaved,
    OkayNotSaved,
    SuccinctModeExplanation,
    WhatDoYouWantToDoNext,
    DidNotUnderstandTryAgain,
    ExampleRelativeDateQuery,
    ExampleDateQuery,
    CouldNotGetEntry,
    CouldNotGetEntries,
    NoEntriesInTimeRangeFound,
    EntriesInTimeRange,
    ReadEntry,
    JournalIsEmpty,
    NewEntryExample,
    EntryForDateNotFound,
    SearchError,
    SearchNoResultsFound,
    SearchResults,
    DeleteEntryNotFound,
    DeleteEntryCouldNotGetEntry,
    DeleteEntryConfirmation,
    DeleteEntryError,
    OkayDeleted,
    OkayNotDeleted,
    LinkAccount,
    OkayWillBeSuccinct,
    OkayWillBeVerbose,
    InvalidDate,
    InternalError,
    Help,
    ShortPause,
    LongPause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    En,
    De,
}

impl Lang {
    pub fn from_locale(locale: &str) -> Self {
        if locale.to_ascii_lowercase().starts_with("de") {
            Lang::De
        } else {
            Lang::En
        }
    }
}

static EN: Lazy<HashMap<MsgId, &'static str>> = Lazy::new(|| {
    use MsgId::*;
    HashMap::from([
        (YourJournalIsNowOpen, "Okay, your journal is open. What do you want to do next?"),
        (NewEntryDraftExists, "A draft for this date already exists. It is: {Draft}. Do you want to continue with that?"),
        (YouCanNowCreateYourEntry, "You can draft your entry {ForDate} now; I will briefly confirm each part so you can \"correct\" it or hear it again with \"repeat\". Say \"done\" when you are finished."),
        (ForDate, "for {Date}"),
        (IRepeat, "I repeat: {Text}.\n\nNext part please?"),
        (NextPartPleaseReprompt, "Please draft the next part of your entry."),
        (YourEntryIsEmptyNoRepeat, "Your entry is empty. There's nothing to repeat. Please draft your first part of your entry."),
        (YourEntryIsEmptyNoCorrect, "Your entry is empty. There's nothing to correct. Please draft your first part of your entry."),
        (OkayCorrectPart, "OK. Please draft the last part of your entry again."),
        (CorrectPartReprompt, "Please draft the last part of your entry again."),
        (NewEntryAborted, "Okay. Aborted."),
        (YourEntryIsEmptyNoSave, "Your entry is empty. There's nothing to save."),
        (NewEntryConfirmation, "Alright. I have the following entry for {Date}: \"{Text}\". Should I save it like this?"),
        (NewEntryConfirmationReprompt, "Should I save your entry like this?"),
        (OkaySaved, "Okay. Saved."),
        (OkayNotSaved, "Okay. Not saved."),
        (SuccinctModeExplanation, "By the way, if you prefer shorter explanations, just say: be succinct."),
        (WhatDoYouWantToDoNext, "What do you want to do next in your journal?"),
        (DidNotUnderstandTryAgain, "I'm sorry, I didn't get that. Please try again."),
        (ExampleRelativeDateQuery, "Say, for example: what happened a year ago today?"),
        (ExampleDateQuery, "Say, for example: what happened in June 1997?"),
        (CouldNotGetEntry, "Oh no. Something went wrong while fetching the entry."),
        (CouldNotGetEntries, "Oh no. Something went wrong while fetching the entries."),
        (NoEntriesInTimeRangeFound, "I couldn't find any entries for {TimeRange}."),
        (EntriesInTimeRange, "Here are the entries for {Date}: {Entries}"),
        (ReadEntry, "Here's the entry from {WeekDay}, {Date}: {Text}."),
        (JournalIsEmpty, "Your journal is still empty."),
        (NewEntryExample, "Say, for example: create a new entry."),
        (EntryForDateNotFound, "I couldn't find an entry for {SearchDate}. The closest entry is from {WeekDay}, {Date}. It is: {Text}."),
        (SearchError, "Oh no. Something went wrong while searching for entries."),
        (SearchNoResultsFound, "I couldn't find any entries for the query \"{Query}\"."),
        (SearchResults, "Here are the results for the query \"{Query}\": "),
        (DeleteEntryNotFound, "Um. I couldn't find an entry for this date."),
        (DeleteEntryCouldNotGetEntry, "Oh no. Something went wrong while fetching the entry to delete."),
        (DeleteEntryConfirmation, "You'd like to delete the following entry: {Entry}. Should I really delete it?"),
        (DeleteEntryError, "Oh no. Something went wrong while deleting the entry."),
        (OkayDeleted, "Okay. Deleted."),
        (OkayNotDeleted, "Okay. Not deleted."),
        (LinkAccount, "Before you can open your journal, please link your account in the companion app."),
        (OkayWillBeSuccinct, "Okay, I will be succinct. If you want me to be verbose again, say: be verbose."),
        (OkayWillBeVerbose, "Okay, I will be verbose. If you want me to keep it short again, say: be succinct."),
        (InvalidDate, "That is not a valid date. Please give me an exact day."),
        (InternalError, "An internal error occurred. I have already informed the developer, who will take care of the problem. Please try again later."),
        (Help, "With this journal you can create entries or have them read to you. Say, for example: \"create a new entry\". Or: \"read the entry from yesterday\". Or: \"what happened 20 years ago today?\". Or: \"what happened in August 1994?\". Or: \"search for birthday\"."),
        (ShortPause, " "),
        (LongPause, "\n\n"),
    ])
});

static EN_SUCCINCT: Lazy<HashMap<MsgId, &'static str>> = Lazy::new(|| {
    HashMap::from([(
        MsgId::YouCanNowCreateYourEntry,
        "You can draft your entry {ForDate} now; let's go!",
    )])
});

static DE: Lazy<HashMap<MsgId, &'static str>> = Lazy::new(|| {
    use MsgId::*;
    HashMap::from([
        (YourJournalIsNowOpen, "Dein Tagebuch ist nun geöffnet. Was möchtest Du tun?"),
        (NewEntryDraftExists, "Für dieses Datum hast Du bereits einen Eintrag entworfen. Er lautet: {Draft}. Möchtest Du mit diesem Eintrag weiter machen?"),
        (YouCanNowCreateYourEntry, "Du kannst Deinen Eintrag {ForDate} nun verfassen; ich werde jeden Teil kurz bestätigen, sodass Du die Möglichkeit hast, ihn zu \"korrigieren\" oder zu \"wiederholen\". Sage \"fertig\", wenn Du fertig bist."),
        (ForDate, "für den {Date}"),
        (IRepeat, "Ich wiederhole: {Text}.\n\nNächster Teil bitte?"),
        (NextPartPleaseReprompt, "Bitte verfasse den nächsten Teil Deines Eintrags."),
        (YourEntryIsEmptyNoRepeat, "Dein Eintrag ist leer. Es gibt nichts zu wiederholen. Bitte verfasse zuerst den ersten Teil Deines Eintrags."),
        (YourEntryIsEmptyNoCorrect, "Dein Eintrag ist leer. Es gibt nichts zu korrigieren. Bitte verfasse zuerst den ersten Teil Deines Eintrags."),
        (OkayCorrectPart, "OK. Bitte verfasse den letzten Teil Deines Eintrags erneut."),
        (CorrectPartReprompt, "Bitte verfasse den letzten Teil Deines Eintrags erneut."),
        (NewEntryAborted, "Okay. Abgebrochen."),
        (YourEntryIsEmptyNoSave, "Dein Eintrag ist leer. Es gibt nichts zu speichern."),
        (NewEntryConfirmation, "Alles klar. Ich habe folgenden Eintrag für das Datum {Date}: \"{Text}\". Soll ich ihn so speichern?"),
        (NewEntryConfirmationReprompt, "Soll ich Deinen Eintrag so speichern?"),
        (OkaySaved, "Okay. Gespeichert."),
        (OkayNotSaved, "Okay. Nicht gespeichert."),
        (SuccinctModeExplanation, "Übrigens, falls Du keine langen Erklärungen haben möchtest, sage einfach: fasse Dich kurz."),
        (WhatDoYouWantToDoNext, "Was möchtest Du als nächstes in Deinem Tagebuch machen?"),
        (DidNotUnderstandTryAgain, "Ich habe Dich leider nicht richtig verstanden. Bitte versuche es noch einmal."),
        (ExampleRelativeDateQuery, "Sage z.B.: was war heute vor einem Jahr?"),
        (ExampleDateQuery, "Sage z.B.: was war im Juni 1997?"),
        (CouldNotGetEntry, "Oje. Beim Abrufen des Eintrags ist ein Fehler aufgetreten."),
        (CouldNotGetEntries, "Oje. Beim Abrufen der Einträge ist ein Fehler aufgetreten."),
        (NoEntriesInTimeRangeFound, "Keine Einträge für den Zeitraum {TimeRange} gefunden."),
        (EntriesInTimeRange, "Hier sind die Einträge für den Zeitraum {Date}: {Entries}"),
        (ReadEntry, "Hier ist der Eintrag vom {WeekDay}, {Date}: {Text}."),
        (JournalIsEmpty, "Dein Tagebuch ist noch leer."),
        (NewEntryExample, "Sage z.B.: neuen Eintrag erstellen."),
        (EntryForDateNotFound, "Ich habe für den {SearchDate} keinen Eintrag gefunden. Der nächste Eintrag ist vom {WeekDay}, {Date}. Er lautet: {Text}."),
        (SearchError, "Oje. Beim Suchen nach Einträgen ist ein Fehler aufgetreten."),
        (SearchNoResultsFound, "Keine Einträge für die Suche \"{Query}\" gefunden."),
        (SearchResults, "Hier sind die Ergebnisse für die Suche \"{Query}\": "),
        (DeleteEntryNotFound, "Hm. Zu diesem Datum habe ich leider keinen Eintrag gefunden."),
        (DeleteEntryCouldNotGetEntry, "Oje. Beim Aufrufen des zu löschenden Eintrags ist ein Fehler aufgetreten."),
        (DeleteEntryConfirmation, "Du möchtest den folgenden Eintrag löschen: {Entry}. Soll ich ihn wirklich löschen?"),
        (DeleteEntryError, "Oje. Beim Löschen des Eintrags ist ein Fehler aufgetreten."),
        (OkayDeleted, "Okay. Gelöscht."),
        (OkayNotDeleted, "Okay. Nicht gelöscht."),
        (LinkAccount, "Bevor Du Dein Tagebuch öffnen kannst, verbinde bitte zuerst Dein Konto in der Begleit-App."),
        (OkayWillBeSuccinct, "Okay. Ich werde mich kurzfassen. Falls ich wieder ausführlicher sein soll, sage: sei ausführlich."),
        (OkayWillBeVerbose, "Okay. Ich werde ausführlich sein. Falls ich mich wieder kurzfassen soll, sage: fasse Dich kurz."),
        (InvalidDate, "Das ist ein ungültiges Datum. Bitte gib einen genauen Tag für das Datum an."),
        (InternalError, "Es ist ein interner Fehler aufgetreten. Ich habe den Entwickler bereits informiert, er wird sich um das Problem kümmern. Bitte versuche es zu einem späteren Zeitpunkt noch einmal."),
        (Help, "Mit diesem Tagebuch kannst Du Einträge erstellen oder vorlesen lassen. Sage z.B. \"Neuen Eintrag erstellen\". Oder \"Lies mir den Eintrag von gestern vor\". Oder \"Was war heute vor 20 Jahren?\". Oder \"Was war im August 1994?\". Oder \"Suche nach Geburtstag\"."),
        (ShortPause, " "),
        (LongPause, "\n\n"),
    ])
});

static DE_SUCCINCT: Lazy<HashMap<MsgId, &'static str>> = Lazy::new(|| {
    HashMap::from([(
        MsgId::YouCanNowCreateYourEntry,
        "Du kannst Deinen Eintrag {ForDate} nun verfassen. Los geht's!",
    )])
});

const EN_WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];
const DE_WEEKDAYS: [&str; 7] = [
    "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag",
];
const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const DE_MONTHS: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
    "Oktober", "November", "Dezember",
];

static MONTH_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})(-XX)?$").unwrap());

/// Looks up and renders spoken strings for one language and verbosity mode.
#[derive(Debug, Clone, Copy)]
pub struct Localizer {
    lang: Lang,
    succinct: bool,
}

impl Localizer {
    pub fn new(locale: &str, succinct: bool) -> Self {
        Self {
            lang: Lang::from_locale(locale),
            succinct,
        }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    /// Concatenates messages, newline-separated.
    pub fn get(&self, ids: &[MsgId]) -> String {
        ids.iter()
            .map(|id| self.raw(*id).to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders a message, substituting `{Name}` placeholders from `params`.
    pub fn templated(&self, id: MsgId, params: &[(&str, &str)]) -> String {
        let mut text = self.raw(id).to_string();
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }

    pub fn weekday(&self, weekday: Weekday) -> &'static str {
        let index = weekday.num_days_from_monday() as usize;
        match self.lang {
            Lang::En => EN_WEEKDAYS[index],
            Lang::De => DE_WEEKDAYS[index],
        }
    }

    /// Turns a `"YYYY-MM"`-shaped string into a spoken month name with year;
    /// anything else passes through unchanged.
    pub fn readable_month(&self, date_like: &str) -> String {
        let Some(captures) = MONTH_PREFIX_RE.captures(date_like) else {
            return date_like.to_string();
        };
        let year = &captures[1];
        let month: usize = captures[2].parse().unwrap_or(0);
        if !(1..=12).contains(&month) {
            return date_like.to_string();
        }
        let name = match self.lang {
            Lang::En => EN_MONTHS[month - 1],
            Lang::De => DE_MONTHS[month - 1],
        };
        format!("{name} {year}")
    }

    fn raw(&self, id: MsgId) -> &'static str {
        let (table, succinct_table) = match self.lang {
            Lang::En => (&*EN, &*EN_SUCCINCT),
            Lang::De => (&*DE, &*DE_SUCCINCT),
        };
        if self.succinct {
            if let Some(text) = succinct_table.get(&id) {
                return text;
            }
        }
        table.get(&id).copied().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_selects_language() {
        assert_eq!(Lang::from_locale("de-DE"), Lang::De);
        assert_eq!(Lang::from_locale("en-US"), Lang::En);
        assert_eq!(Lang::from_locale("fr-FR"), Lang::En);
    }

    #[test]
    fn every_message_exists_in_both_languages() {
        for (id, _) in EN.iter() {
            assert!(DE.contains_key(id), "missing German string for {id:?}");
        }
        assert_eq!(EN.len(), DE.len());
    }

    #[test]
    fn templated_substitutes_params() {
        let l = Localizer::new("en-US", false);
        let text = l.templated(MsgId::SearchNoResultsFound, &[("Query", "birthday")]);
        assert_eq!(
            text,
            "I couldn't find any entries for the query \"birthday\"."
        );
    }

    #[test]
    fn succinct_mode_prefers_short_variant_and_falls_back() {
        let l = Localizer::new("en-US", true);
        assert_eq!(
            l.templated(MsgId::YouCanNowCreateYourEntry, &[("ForDate", "for today")]),
            "You can draft your entry for today now; let's go!"
        );
        // No succinct variant: verbose wording is used.
        assert_eq!(l.get(&[MsgId::OkaySaved]), "Okay. Saved.");
    }

    #[test]
    fn weekday_names() {
        let en = Localizer::new("en-US", false);
        let de = Localizer::new("de-DE", false);
        assert_eq!(en.weekday(Weekday::Mon), "Monday");
        assert_eq!(de.weekday(Weekday::Sun), "Sonntag");
    }

    #[test]
    fn readable_month_renders_month_name() {
        let en = Localizer::new("en-US", false);
        let de = Localizer::new("de-DE", false);
        assert_eq!(en.readable_month("2019-01"), "January 2019");
        assert_eq!(en.readable_month("2019-01-XX"), "January 2019");
        assert_eq!(de.readable_month("1994-08"), "August 1994");
        assert_eq!(en.readable_month("gibberish"), "gibberish");
    }

    #[test]
    fn get_joins_messages_with_newline() {
        let l = Localizer::new("en-US", false);
        assert_eq!(
            l.get(&[MsgId::OkaySaved, MsgId::WhatDoYouWantToDoNext]),
            "Okay. Saved.\nWhat do you want to do next in your journal?"
        );
    }
}

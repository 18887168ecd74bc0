//! The conversational engine: interprets one turn at a time and decides what
//! to speak and which dialog directive to hand back to the platform.
//!
//! All conversational memory travels inside the request/response pair; nothing
//! is held here between turns. Unknown intents, dialog phases or confirmation
//! values are protocol violations and abort the turn with a generic
//! internal-error response; store failures are interpreted and spoken without
//! ending the conversation.

use crate::config::{ConfigService, UserConfig};
use crate::date_parse::{parse_date_slot, ParsedDate};
use crate::dialog::{
    Confirmation, DialogPhase, Directive, Intent, RequestKind, TurnRequest, TurnResponse,
};
use crate::interpret::{ErrorInterpreter, ErrorReporter};
use crate::journal::{Journal, DATE_FORMAT};
use crate::phrases::{Localizer, MsgId};
use crate::session::SessionState;
use anyhow::Result;
use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{debug, error, info};

/// Hard cap on spoken response length, imposed by the voice platform.
const RESPONSE_TEXT_LIMIT: usize = 8000;

/// Resolves a user's access credential to their journal. May fail on auth or
/// storage problems, which degrade the turn to a spoken error.
pub trait JournalProvider: Send + Sync {
    fn get(&self, access_token: &str) -> Result<Journal>;
}

/// A condition no well-behaved platform request can produce. Not recoverable
/// within the turn; reported as a crash and answered with a generic error.
#[derive(Debug, Error)]
pub enum FatalError {
    #[error("unknown intent '{0}'")]
    UnknownIntent(String),
    #[error("unknown dialog phase '{0}'")]
    UnknownDialogPhase(String),
    #[error("dialog phase '{phase}' is not valid for intent '{intent}'")]
    UnexpectedPhase { intent: String, phase: String },
    #[error("unknown confirmation status '{0}'")]
    UnknownConfirmation(String),
    #[error("unknown slot resolution '{0}'")]
    UnknownResolution(String),
    #[error("could not decode session state: {0}")]
    BadSessionState(#[from] serde_json::Error),
    #[error("confirmed date slot '{0}' does not name a day")]
    UnparsableConfirmedDate(String),
}

pub struct JournalSkill {
    provider: Arc<dyn JournalProvider>,
    interpreter: Box<dyn ErrorInterpreter>,
    reporter: Box<dyn ErrorReporter>,
    config_service: Box<dyn ConfigService>,
}

impl JournalSkill {
    pub fn new(
        provider: Arc<dyn JournalProvider>,
        interpreter: Box<dyn ErrorInterpreter>,
        reporter: Box<dyn ErrorReporter>,
        config_service: Box<dyn ConfigService>,
    ) -> Self {
        Self {
            provider,
            interpreter,
            reporter,
            config_service,
        }
    }

    /// Processes one turn. Never panics: fatal protocol violations are
    /// reported and turned into the internal-error response.
    pub fn handle_turn(&self, request: &TurnRequest) -> TurnResponse {
        info!(intent = %request.intent.name, phase = %request.dialog_phase, "turn started");
        let response = match self.process(request) {
            Ok(response) => response,
            Err(fatal) => {
                self.reporter.report_panic(
                    &fatal,
                    &format!(
                        "intent={} phase={} confirmation={}",
                        request.intent.name, request.dialog_phase, request.intent.confirmation
                    ),
                );
                let l = Localizer::new(&request.locale, false);
                TurnResponse::speak(l.get(&[MsgId::InternalError]), request.session.clone())
                    .ending_session()
            }
        };
        info!("turn completed");
        response
    }

    fn process(&self, request: &TurnRequest) -> Result<TurnResponse, FatalError> {
        let config = self.config_service.get_config(&request.user_id);
        let l = Localizer::new(&request.locale, config.be_succinct);

        if request.access_token.is_empty() {
            return Ok(
                TurnResponse::speak(l.get(&[MsgId::LinkAccount]), request.session.clone())
                    .ending_session(),
            );
        }

        match request.kind {
            RequestKind::Launch => {
                // Best-effort cache warm; the turn does not wait for it.
                let provider = Arc::clone(&self.provider);
                let token = request.access_token.clone();
                thread::spawn(move || {
                    let _ = provider.get(&token);
                });

                Ok(TurnResponse::speak(
                    l.get(&[MsgId::YourJournalIsNowOpen]),
                    request.session.clone(),
                ))
            }
            RequestKind::SessionEnded => Ok(TurnResponse::default()),
            RequestKind::Intent => self.process_intent(request, config, &l),
        }
    }

    fn process_intent(
        &self,
        request: &TurnRequest,
        config: UserConfig,
        l: &Localizer,
    ) -> Result<TurnResponse, FatalError> {
        let mut journal = match self.provider.get(&request.access_token) {
            Ok(journal) => journal,
            Err(e) => {
                error!(error = %format!("{e:#}"), "could not resolve journal");
                self.reporter.report_error(&e);
                return Ok(TurnResponse::speak(
                    self.interpreter.interpret(&e),
                    request.session.clone(),
                ));
            }
        };
        debug!("journal resolved");

        let mut state = SessionState::decode(&request.session)?;
        let intent = &request.intent;

        match intent.name.as_str() {
            "BeSuccinctIntent" => {
                self.config_service.persist_config(
                    &request.user_id,
                    UserConfig {
                        be_succinct: true,
                        ..config
                    },
                );
                Ok(TurnResponse::speak(
                    l.get(&[MsgId::OkayWillBeSuccinct, MsgId::WhatDoYouWantToDoNext]),
                    state.encode(),
                )
                .with_reprompt(l.get(&[MsgId::WhatDoYouWantToDoNext])))
            }
            "BeVerboseIntent" => {
                self.config_service.persist_config(
                    &request.user_id,
                    UserConfig {
                        be_succinct: false,
                        ..config
                    },
                );
                Ok(TurnResponse::speak(
                    l.get(&[MsgId::OkayWillBeVerbose, MsgId::WhatDoYouWantToDoNext]),
                    state.encode(),
                )
                .with_reprompt(l.get(&[MsgId::WhatDoYouWantToDoNext])))
            }
            "NewEntryIntent" => self.new_entry_turn(request, &mut journal, &mut state, config, l),
            "ListAllEntriesInDate" | "ReadAllEntriesInDate" => {
                match self.phase(request)? {
                    DialogPhase::Started | DialogPhase::InProgress => {
                        Ok(delegate(state.encode()))
                    }
                    DialogPhase::Completed => {
                        let parsed =
                            parse_date_slot(intent.slot_value("date"), intent.slot_value("year"));
                        match parsed {
                            ParsedDate::Month(month) => {
                                Ok(self.entries_in_month_response(&journal, &month, &state, l))
                            }
                            _ => Ok(TurnResponse::speak(
                                l.get(&[MsgId::DidNotUnderstandTryAgain]),
                                state.encode(),
                            )
                            .with_reprompt(l.get(&[MsgId::DidNotUnderstandTryAgain]))),
                        }
                    }
                }
            }
            "ReadExistingEntryAbsoluteDateIntent" => match self.phase(request)? {
                DialogPhase::Started | DialogPhase::InProgress => Ok(delegate(state.encode())),
                DialogPhase::Completed => {
                    let parsed =
                        parse_date_slot(intent.slot_value("date"), intent.slot_value("year"));
                    match parsed {
                        ParsedDate::Day(date) => {
                            Ok(self.read_day_response(&journal, date, &state, l))
                        }
                        ParsedDate::Month(month) => {
                            Ok(self.entries_in_month_response(&journal, &month, &state, l))
                        }
                        ParsedDate::Year | ParsedDate::Invalid => Ok(TurnResponse::speak(
                            l.get(&[MsgId::DidNotUnderstandTryAgain, MsgId::ExampleDateQuery]),
                            state.encode(),
                        )
                        .with_reprompt(l.get(&[MsgId::DidNotUnderstandTryAgain]))),
                    }
                }
            },
            "ReadExistingEntryRelativeDateIntent" => {
                let number = intent.slot_value("number").parse::<u32>();
                let unit = intent.slot_resolution("unit");
                let (Ok(offset), Some(unit)) = (number, unit) else {
                    return Ok(TurnResponse::speak(
                        l.get(&[
                            MsgId::DidNotUnderstandTryAgain,
                            MsgId::ShortPause,
                            MsgId::ExampleRelativeDateQuery,
                        ]),
                        state.encode(),
                    )
                    .with_directive(Directive::ElicitSlot("unit".to_string())));
                };
                if unit == "ER_SUCCESS_NO_MATCH" {
                    return Ok(TurnResponse::speak(
                        l.get(&[
                            MsgId::DidNotUnderstandTryAgain,
                            MsgId::ShortPause,
                            MsgId::ExampleRelativeDateQuery,
                        ]),
                        state.encode(),
                    )
                    .with_directive(Directive::ElicitSlot("unit".to_string())));
                }
                // Offsets are user-supplied and may point far before any
                // representable date; saturate instead of overflowing.
                let today = Local::now().date_naive();
                let entry_date = match unit {
                    "DAYS" => today
                        .checked_sub_signed(Duration::days(offset as i64))
                        .unwrap_or(NaiveDate::MIN),
                    "MONTHS" => today
                        .checked_sub_months(Months::new(offset))
                        .unwrap_or(NaiveDate::MIN),
                    "YEARS" => offset
                        .checked_mul(12)
                        .and_then(|months| today.checked_sub_months(Months::new(months)))
                        .unwrap_or(NaiveDate::MIN),
                    other => return Err(FatalError::UnknownResolution(other.to_string())),
                };
                Ok(self.read_day_response(&journal, entry_date, &state, l))
            }
            "SearchIntent" => {
                let query = intent.slot_value("query");
                match journal.search_for(query) {
                    Err(e) => Ok(self.store_failure(
                        &e,
                        &[MsgId::SearchError, MsgId::ShortPause],
                        &state,
                        l,
                    )),
                    Ok(entries) if entries.is_empty() => Ok(TurnResponse::speak(
                        l.templated(MsgId::SearchNoResultsFound, &[("Query", query)])
                            + &l.get(&[MsgId::LongPause, MsgId::WhatDoYouWantToDoNext]),
                        state.encode(),
                    )),
                    Ok(entries) => {
                        let closing = l.get(&[MsgId::LongPause, MsgId::WhatDoYouWantToDoNext]);
                        let mut text = l.templated(MsgId::SearchResults, &[("Query", query)]);
                        for entry in entries {
                            let tuple = format!(
                                "{}, {}: {}. ",
                                l.weekday(entry.date.weekday()),
                                entry.date.format(DATE_FORMAT),
                                entry.text.trim_end_matches(['.', ' '])
                            );
                            if text.len() + tuple.len() + closing.len() > RESPONSE_TEXT_LIMIT {
                                break;
                            }
                            text.push_str(&tuple);
                        }
                        Ok(TurnResponse::speak(
                            text.trim_end().to_string() + &closing,
                            state.encode(),
                        ))
                    }
                }
            }
            "DeleteEntryIntent" => self.delete_entry_turn(request, &mut journal, &state, l),
            "AMAZON.HelpIntent" => {
                Ok(TurnResponse::speak(l.get(&[MsgId::Help]), state.encode()))
            }
            "AMAZON.CancelIntent" | "AMAZON.StopIntent" => {
                Ok(TurnResponse::speak(String::new(), state.encode()).ending_session())
            }
            other => Err(FatalError::UnknownIntent(other.to_string())),
        }
    }

    /// The drafting state machine. Parts are collected per target date in the
    /// session state; the journal is only touched on final confirmation.
    fn new_entry_turn(
        &self,
        request: &TurnRequest,
        journal: &mut Journal,
        state: &mut SessionState,
        config: UserConfig,
        l: &Localizer,
    ) -> Result<TurnResponse, FatalError> {
        let intent = &request.intent;
        let date_slot = intent.slot_value("date").to_string();

        match self.phase(request)? {
            DialogPhase::Started => Ok(delegate(state.encode())),
            DialogPhase::InProgress => match self.confirmation(&intent.confirmation)? {
                Confirmation::None => {
                    if date_slot.is_empty() {
                        return Ok(delegate(state.encode()));
                    }
                    let parsed = parse_date_slot(&date_slot, intent.slot_value("year"));
                    if parsed.as_day().is_none() {
                        return Ok(TurnResponse::speak(
                            l.get(&[MsgId::InvalidDate]),
                            state.encode(),
                        )
                        .with_directive(Directive::ElicitSlot("date".to_string())));
                    }

                    // Returning to a draft left over from an earlier exchange:
                    // offer to resume it before accepting new parts.
                    if state.drafts.contains_key(&date_slot) && !state.drafting {
                        match self.confirmation(intent.slot_confirmation("text"))? {
                            Confirmation::None => {
                                let speech = l.templated(
                                    MsgId::NewEntryDraftExists,
                                    &[("Draft", state.draft_text(&date_slot).as_str())],
                                );
                                return Ok(TurnResponse::speak(speech.clone(), state.encode())
                                    .with_directive(Directive::ConfirmSlot("text".to_string()))
                                    .with_reprompt(speech));
                            }
                            Confirmation::Confirmed => {}
                            Confirmation::Denied => {
                                state.drafts.remove(&date_slot);
                            }
                        }
                    }

                    match intent.slot_value("text").to_lowercase().as_str() {
                        "" => {
                            state.drafting = true;
                            let for_date = l.templated(MsgId::ForDate, &[("Date", &date_slot)]);
                            let succinct = Localizer::new(&request.locale, true);
                            Ok(TurnResponse::speak(
                                l.templated(
                                    MsgId::YouCanNowCreateYourEntry,
                                    &[("ForDate", for_date.as_str())],
                                ),
                                state.encode(),
                            )
                            .with_directive(Directive::ElicitSlot("text".to_string()))
                            .with_reprompt(succinct.templated(
                                MsgId::YouCanNowCreateYourEntry,
                                &[("ForDate", for_date.as_str())],
                            )))
                        }
                        "repeat" | "wiederhole" | "wiederholen" => {
                            let parts = state.draft_parts(&date_slot);
                            match parts.last() {
                                None => Ok(TurnResponse::speak(
                                    l.get(&[MsgId::YourEntryIsEmptyNoRepeat]),
                                    state.encode(),
                                )
                                .with_directive(Directive::ElicitSlot("text".to_string()))),
                                Some(last) => Ok(TurnResponse::speak(
                                    l.templated(MsgId::IRepeat, &[("Text", last.as_str())]),
                                    state.encode(),
                                )
                                .with_directive(Directive::ElicitSlot("text".to_string()))),
                            }
                        }
                        "correct" | "korrigiere" | "korrigieren" => {
                            match state.drafts.get_mut(&date_slot) {
                                Some(parts) if !parts.is_empty() => {
                                    parts.pop();
                                }
                                _ => {
                                    return Ok(TurnResponse::speak(
                                        l.get(&[MsgId::YourEntryIsEmptyNoCorrect]),
                                        state.encode(),
                                    )
                                    .with_directive(Directive::ElicitSlot("text".to_string())));
                                }
                            }
                            Ok(TurnResponse::speak(
                                l.get(&[MsgId::OkayCorrectPart]),
                                state.encode(),
                            )
                            .with_directive(Directive::ElicitSlot("text".to_string()))
                            .with_reprompt(l.get(&[MsgId::CorrectPartReprompt])))
                        }
                        "abort" | "abbrechen" => {
                            state.drafting = false;
                            Ok(TurnResponse::speak(
                                self.menu_closing(
                                    &request.user_id,
                                    config,
                                    l,
                                    MsgId::NewEntryAborted,
                                ),
                                state.encode(),
                            ))
                        }
                        "done" | "fertig" => {
                            if state.draft_parts(&date_slot).is_empty() {
                                state.drafting = false;
                                return Ok(TurnResponse::speak(
                                    self.menu_closing(
                                        &request.user_id,
                                        config,
                                        l,
                                        MsgId::YourEntryIsEmptyNoSave,
                                    ),
                                    state.encode(),
                                ));
                            }
                            Ok(TurnResponse::speak(
                                l.templated(
                                    MsgId::NewEntryConfirmation,
                                    &[
                                        ("Date", date_slot.as_str()),
                                        ("Text", state.draft_text(&date_slot).as_str()),
                                    ],
                                ),
                                state.encode(),
                            )
                            .with_directive(Directive::ConfirmIntent)
                            .with_reprompt(l.get(&[MsgId::NewEntryConfirmationReprompt])))
                        }
                        _ => {
                            let part = intent.slot_value("text").to_string();
                            state
                                .drafts
                                .entry(date_slot.clone())
                                .or_default()
                                .push(part.clone());
                            Ok(TurnResponse::speak(
                                l.templated(MsgId::IRepeat, &[("Text", part.as_str())]),
                                state.encode(),
                            )
                            .with_directive(Directive::ElicitSlot("text".to_string()))
                            .with_reprompt(l.get(&[MsgId::NextPartPleaseReprompt])))
                        }
                    }
                }
                Confirmation::Confirmed => {
                    let date = parse_date_slot(&date_slot, intent.slot_value("year"))
                        .as_day()
                        .ok_or_else(|| FatalError::UnparsableConfirmedDate(date_slot.clone()))?;

                    let text = state.draft_text(&date_slot);
                    if let Err(e) = journal.add_entry(date, &text) {
                        self.reporter.report_error(&e);
                        return Ok(TurnResponse::speak(
                            self.interpreter.interpret(&e),
                            state.encode(),
                        ));
                    }
                    state.drafting = false;
                    state.drafts.remove(&date_slot);
                    Ok(TurnResponse::speak(
                        self.menu_closing(&request.user_id, config, l, MsgId::OkaySaved),
                        state.encode(),
                    ))
                }
                Confirmation::Denied => {
                    // Parts stay in the draft so the entry can be resumed.
                    state.drafting = false;
                    Ok(TurnResponse::speak(
                        self.menu_closing(&request.user_id, config, l, MsgId::OkayNotSaved),
                        state.encode(),
                    ))
                }
            },
            DialogPhase::Completed => Err(FatalError::UnexpectedPhase {
                intent: intent.name.clone(),
                phase: request.dialog_phase.clone(),
            }),
        }
    }

    fn delete_entry_turn(
        &self,
        request: &TurnRequest,
        journal: &mut Journal,
        state: &SessionState,
        l: &Localizer,
    ) -> Result<TurnResponse, FatalError> {
        let intent = &request.intent;
        match self.phase(request)? {
            DialogPhase::Started => Ok(delegate(state.encode())),
            DialogPhase::InProgress | DialogPhase::Completed => {
                match self.confirmation(&intent.confirmation)? {
                    Confirmation::None => {
                        let parsed =
                            parse_date_slot(intent.slot_value("date"), intent.slot_value("year"));
                        let Some(date) = parsed.as_day() else {
                            // Not an exact day: blank the slot so the platform
                            // elicits the date again.
                            let mut updated = intent.clone();
                            updated.clear_slot_value("date");
                            return Ok(delegate(state.encode()).with_updated_intent(updated));
                        };
                        match journal.get_entry(date) {
                            Err(e) => Ok(self.store_failure(
                                &e,
                                &[MsgId::DeleteEntryCouldNotGetEntry, MsgId::ShortPause],
                                state,
                                l,
                            )),
                            Ok(entry) if entry.is_empty() => Ok(TurnResponse::speak(
                                l.get(&[MsgId::DeleteEntryNotFound]),
                                state.encode(),
                            )),
                            Ok(entry) => {
                                let speech = l.templated(
                                    MsgId::DeleteEntryConfirmation,
                                    &[("Entry", entry.as_str())],
                                );
                                Ok(TurnResponse::speak(speech.clone(), state.encode())
                                    .with_directive(Directive::ConfirmIntent)
                                    .with_reprompt(speech))
                            }
                        }
                    }
                    Confirmation::Confirmed => {
                        let date_slot = intent.slot_value("date");
                        let date = parse_date_slot(date_slot, intent.slot_value("year"))
                            .as_day()
                            .ok_or_else(|| {
                                FatalError::UnparsableConfirmedDate(date_slot.to_string())
                            })?;
                        if let Err(e) = journal.delete_entry(date) {
                            return Ok(self.store_failure(
                                &e,
                                &[MsgId::DeleteEntryError, MsgId::ShortPause],
                                state,
                                l,
                            ));
                        }
                        Ok(TurnResponse::speak(
                            l.get(&[
                                MsgId::OkayDeleted,
                                MsgId::LongPause,
                                MsgId::WhatDoYouWantToDoNext,
                            ]),
                            state.encode(),
                        ))
                    }
                    Confirmation::Denied => Ok(TurnResponse::speak(
                        l.get(&[
                            MsgId::OkayNotDeleted,
                            MsgId::LongPause,
                            MsgId::WhatDoYouWantToDoNext,
                        ]),
                        state.encode(),
                    )),
                }
            }
        }
    }

    /// Speaks one day's entry, falling back to the closest entry when the day
    /// has none, and to the empty-journal hint when nothing exists at all.
    fn read_day_response(
        &self,
        journal: &Journal,
        entry_date: NaiveDate,
        state: &SessionState,
        l: &Localizer,
    ) -> TurnResponse {
        let text = match journal.get_entry(entry_date) {
            Ok(text) => text,
            Err(e) => {
                return self.store_failure(
                    &e,
                    &[MsgId::CouldNotGetEntry, MsgId::ShortPause],
                    state,
                    l,
                )
            }
        };
        if !text.is_empty() {
            return TurnResponse::speak(
                l.templated(
                    MsgId::ReadEntry,
                    &[
                        ("WeekDay", l.weekday(entry_date.weekday())),
                        ("Date", &entry_date.format(DATE_FORMAT).to_string()),
                        ("Text", &text),
                    ],
                ) + &l.get(&[MsgId::LongPause, MsgId::WhatDoYouWantToDoNext]),
                state.encode(),
            );
        }
        match journal.get_closest_entry(entry_date) {
            Err(e) => {
                self.store_failure(&e, &[MsgId::CouldNotGetEntry, MsgId::ShortPause], state, l)
            }
            Ok(None) => TurnResponse::speak(
                l.get(&[
                    MsgId::JournalIsEmpty,
                    MsgId::LongPause,
                    MsgId::WhatDoYouWantToDoNext,
                    MsgId::ShortPause,
                    MsgId::NewEntryExample,
                ]),
                state.encode(),
            ),
            Ok(Some(closest)) => TurnResponse::speak(
                l.templated(
                    MsgId::EntryForDateNotFound,
                    &[
                        ("SearchDate", &entry_date.format(DATE_FORMAT).to_string()),
                        ("WeekDay", l.weekday(closest.date.weekday())),
                        ("Date", &closest.date.format(DATE_FORMAT).to_string()),
                        ("Text", &closest.text),
                    ],
                ) + &l.get(&[MsgId::LongPause, MsgId::WhatDoYouWantToDoNext]),
                state.encode(),
            ),
        }
    }

    /// Speaks all entries of one month (`month` is a `"YYYY-MM"` prefix).
    fn entries_in_month_response(
        &self,
        journal: &Journal,
        month: &str,
        state: &SessionState,
        l: &Localizer,
    ) -> TurnResponse {
        let entries = match journal.get_entries(month) {
            Ok(entries) => entries,
            Err(e) => {
                return self.store_failure(
                    &e,
                    &[MsgId::CouldNotGetEntries, MsgId::ShortPause],
                    state,
                    l,
                )
            }
        };
        if entries.is_empty() {
            return TurnResponse::speak(
                l.templated(
                    MsgId::NoEntriesInTimeRangeFound,
                    &[("TimeRange", l.readable_month(month).as_str())],
                ) + &l.get(&[MsgId::LongPause, MsgId::WhatDoYouWantToDoNext]),
                state.encode(),
            );
        }
        let tuples: Vec<String> = entries
            .iter()
            .map(|entry| {
                format!(
                    "{}, {}: {}",
                    l.weekday(entry.date.weekday()),
                    entry.date.format(DATE_FORMAT),
                    entry.text
                )
            })
            .collect();
        TurnResponse::speak(
            l.templated(
                MsgId::EntriesInTimeRange,
                &[
                    ("Date", l.readable_month(month).as_str()),
                    ("Entries", tuples.join(". ").as_str()),
                ],
            ) + &l.get(&[MsgId::LongPause, MsgId::WhatDoYouWantToDoNext]),
            state.encode(),
        )
    }

    /// Converts and reports a backing-store failure; the turn carries on.
    fn store_failure(
        &self,
        error: &anyhow::Error,
        lead: &[MsgId],
        state: &SessionState,
        l: &Localizer,
    ) -> TurnResponse {
        self.reporter.report_error(error);
        TurnResponse::speak(
            l.get(lead) + &self.interpreter.interpret(error),
            state.encode(),
        )
    }

    /// "Okay. <lead>." followed by the one-time succinct-mode hint and the
    /// what-next prompt.
    fn menu_closing(&self, user_id: &str, config: UserConfig, l: &Localizer, lead: MsgId) -> String {
        l.get(&[lead, MsgId::LongPause])
            + &self.succinct_mode_explanation(user_id, config, l)
            + &l.get(&[MsgId::LongPause, MsgId::WhatDoYouWantToDoNext])
    }

    fn succinct_mode_explanation(
        &self,
        user_id: &str,
        config: UserConfig,
        l: &Localizer,
    ) -> String {
        if !config.explain_succinct_mode {
            return String::new();
        }
        self.config_service.persist_config(
            user_id,
            UserConfig {
                explain_succinct_mode: false,
                ..config
            },
        );
        l.get(&[MsgId::SuccinctModeExplanation])
    }

    fn phase(&self, request: &TurnRequest) -> Result<DialogPhase, FatalError> {
        request
            .dialog_phase
            .parse()
            .map_err(|_| FatalError::UnknownDialogPhase(request.dialog_phase.clone()))
    }

    fn confirmation(&self, value: &str) -> Result<Confirmation, FatalError> {
        value
            .parse()
            .map_err(|_| FatalError::UnknownConfirmation(value.to_string()))
    }
}

fn delegate(session: serde_json::Value) -> TurnResponse {
    TurnResponse {
        directive: Some(Directive::Delegate),
        session,
        ..TurnResponse::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InMemoryConfigService;
    use crate::interpret::{LoggingErrorReporter, PlainErrorInterpreter};
    use crate::tsv::FileTabularData;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    struct FileProvider {
        path: PathBuf,
    }

    impl JournalProvider for FileProvider {
        fn get(&self, _access_token: &str) -> Result<Journal> {
            Ok(Journal::new(Box::new(FileTabularData::open(&self.path)?)))
        }
    }

    struct FailingProvider;

    impl JournalProvider for FailingProvider {
        fn get(&self, _access_token: &str) -> Result<Journal> {
            anyhow::bail!("spreadsheet unreachable")
        }
    }

    fn mk_skill() -> (JournalSkill, TempDir) {
        let tmp = tempdir().unwrap();
        let skill = JournalSkill::new(
            Arc::new(FileProvider {
                path: tmp.path().join("journal.tsv"),
            }),
            Box::new(PlainErrorInterpreter),
            Box::new(LoggingErrorReporter),
            Box::new(InMemoryConfigService::new()),
        );
        (skill, tmp)
    }

    fn journal_at(tmp: &TempDir) -> Journal {
        Journal::new(Box::new(
            FileTabularData::open(tmp.path().join("journal.tsv")).unwrap(),
        ))
    }

    fn intent_turn(intent: Intent, phase: &str, session: serde_json::Value) -> TurnRequest {
        TurnRequest::intent(intent, phase)
            .with_token("token")
            .with_user("user")
            .with_session(session)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn missing_access_token_asks_for_account_link() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&TurnRequest::launch());
        assert!(response.speech.contains("link your account"));
        assert!(response.end_session);
    }

    #[test]
    fn launch_opens_the_journal() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&TurnRequest::launch().with_token("token"));
        assert_eq!(
            response.speech,
            "Okay, your journal is open. What do you want to do next?"
        );
        assert!(!response.end_session);
    }

    #[test]
    fn session_ended_is_answered_silently() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&TurnRequest::session_ended().with_token("token"));
        assert!(response.speech.is_empty());
        assert!(response.directive.is_none());
    }

    #[test]
    fn new_entry_started_delegates() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent"),
            "STARTED",
            serde_json::Value::Null,
        ));
        assert_eq!(response.directive, Some(Directive::Delegate));
    }

    #[test]
    fn new_entry_with_month_date_reprompts_for_exact_day() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent").with_slot("date", "2019-01"),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("not a valid date"));
        assert_eq!(
            response.directive,
            Some(Directive::ElicitSlot("date".to_string()))
        );
    }

    #[test]
    fn new_entry_drafting_commit_and_post_commit_state() {
        let (skill, tmp) = mk_skill();
        let date = "2019-01-01";

        // Empty text slot: drafting begins.
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent").with_slot("date", date),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("draft your entry"));
        assert_eq!(
            response.directive,
            Some(Directive::ElicitSlot("text".to_string()))
        );

        // Dictate a part: echoed back.
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot("text", "part one"),
            "IN_PROGRESS",
            response.session,
        ));
        assert!(response.speech.contains("I repeat: part one."));

        // Done: full draft presented for confirmation.
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot("text", "done"),
            "IN_PROGRESS",
            response.session,
        ));
        assert!(response.speech.contains("\"part one\""));
        assert_eq!(response.directive, Some(Directive::ConfirmIntent));

        // Confirmed: committed and draft cleared.
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_confirmation("CONFIRMED"),
            "IN_PROGRESS",
            response.session,
        ));
        assert!(response.speech.contains("Okay. Saved."));
        let state = SessionState::decode(&response.session).unwrap();
        assert!(state.drafts.is_empty());
        assert!(!state.drafting);
        assert_eq!(journal_at(&tmp).get_entry(day(date)).unwrap(), "part one");

        // A draft no longer exists, so "repeat" reports an empty entry.
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot("text", "repeat"),
            "IN_PROGRESS",
            response.session,
        ));
        assert!(response.speech.contains("nothing to repeat"));
    }

    #[test]
    fn new_entry_multiple_parts_are_joined() {
        let (skill, tmp) = mk_skill();
        let date = "2019-03-03";
        let mut session = serde_json::Value::Null;
        for text in ["", "one", "two", "three", "done"] {
            let response = skill.handle_turn(&intent_turn(
                Intent::new("NewEntryIntent")
                    .with_slot("date", date)
                    .with_slot("text", text),
                "IN_PROGRESS",
                session,
            ));
            session = response.session;
        }
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_confirmation("CONFIRMED"),
            "IN_PROGRESS",
            session,
        ));
        assert!(response.speech.contains("Okay. Saved."));
        assert_eq!(
            journal_at(&tmp).get_entry(day(date)).unwrap(),
            "one. two. three"
        );
    }

    #[test]
    fn correct_pops_the_last_part() {
        let (skill, _tmp) = mk_skill();
        let date = "2019-01-01";
        let mut session = serde_json::Value::Null;
        for text in ["", "first", "wrong part"] {
            let response = skill.handle_turn(&intent_turn(
                Intent::new("NewEntryIntent")
                    .with_slot("date", date)
                    .with_slot("text", text),
                "IN_PROGRESS",
                session,
            ));
            session = response.session;
        }

        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot("text", "correct"),
            "IN_PROGRESS",
            session,
        ));
        assert!(response.speech.contains("draft the last part"));
        let state = SessionState::decode(&response.session).unwrap();
        assert_eq!(state.draft_parts(date), ["first"]);
    }

    #[test]
    fn repeat_and_correct_on_empty_draft_explain_emptiness() {
        let (skill, _tmp) = mk_skill();
        let date = "2019-01-01";
        let begin = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent").with_slot("date", date),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));

        for (command, expected) in [
            ("repeat", "nothing to repeat"),
            ("correct", "nothing to correct"),
        ] {
            let response = skill.handle_turn(&intent_turn(
                Intent::new("NewEntryIntent")
                    .with_slot("date", date)
                    .with_slot("text", command),
                "IN_PROGRESS",
                begin.session.clone(),
            ));
            assert!(response.speech.contains(expected), "{command}");
        }
    }

    #[test]
    fn abort_stops_drafting_but_keeps_parts() {
        let (skill, _tmp) = mk_skill();
        let date = "2019-01-01";
        let mut session = serde_json::Value::Null;
        for text in ["", "a part"] {
            let response = skill.handle_turn(&intent_turn(
                Intent::new("NewEntryIntent")
                    .with_slot("date", date)
                    .with_slot("text", text),
                "IN_PROGRESS",
                session,
            ));
            session = response.session;
        }

        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot("text", "abort"),
            "IN_PROGRESS",
            session,
        ));
        assert!(response.speech.contains("Aborted"));
        let state = SessionState::decode(&response.session).unwrap();
        assert!(!state.drafting);
        assert_eq!(state.draft_parts(date), ["a part"]);
    }

    #[test]
    fn denied_save_keeps_draft_for_resume() {
        let (skill, tmp) = mk_skill();
        let date = "2019-01-01";
        let mut session = serde_json::Value::Null;
        for text in ["", "keep me", "done"] {
            let response = skill.handle_turn(&intent_turn(
                Intent::new("NewEntryIntent")
                    .with_slot("date", date)
                    .with_slot("text", text),
                "IN_PROGRESS",
                session,
            ));
            session = response.session;
        }

        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_confirmation("DENIED"),
            "IN_PROGRESS",
            session,
        ));
        assert!(response.speech.contains("Not saved"));
        let state = SessionState::decode(&response.session).unwrap();
        assert_eq!(state.draft_parts(date), ["keep me"]);
        assert_eq!(journal_at(&tmp).get_entry(day(date)).unwrap(), "");

        // Returning to the same date offers to resume the surviving draft.
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent").with_slot("date", date),
            "IN_PROGRESS",
            response.session,
        ));
        assert!(response.speech.contains("already exists"));
        assert!(response.speech.contains("keep me"));
        assert_eq!(
            response.directive,
            Some(Directive::ConfirmSlot("text".to_string()))
        );

        // Denying the resume clears the draft.
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot_confirmation("text", "DENIED"),
            "IN_PROGRESS",
            response.session,
        ));
        let state = SessionState::decode(&response.session).unwrap();
        assert!(state.draft_parts(date).is_empty());
    }

    #[test]
    fn done_on_empty_draft_reports_nothing_to_save() {
        let (skill, _tmp) = mk_skill();
        let date = "2019-01-01";
        let begin = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent").with_slot("date", date),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));

        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot("text", "done"),
            "IN_PROGRESS",
            begin.session,
        ));
        assert!(response.speech.contains("nothing to save"));
        let state = SessionState::decode(&response.session).unwrap();
        assert!(!state.drafting);
    }

    #[test]
    fn read_absolute_date_reads_entry() {
        let (skill, tmp) = mk_skill();
        journal_at(&tmp)
            .add_entry(day("1994-08-20"), "a fine day")
            .unwrap();

        let response = skill.handle_turn(&intent_turn(
            Intent::new("ReadExistingEntryAbsoluteDateIntent").with_slot("date", "1994-08-20"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("Saturday, 1994-08-20"));
        assert!(response.speech.contains("a fine day"));
    }

    #[test]
    fn read_absolute_date_falls_back_to_closest_entry() {
        let (skill, tmp) = mk_skill();
        journal_at(&tmp)
            .add_entry(day("1994-08-20"), "a fine day")
            .unwrap();

        let response = skill.handle_turn(&intent_turn(
            Intent::new("ReadExistingEntryAbsoluteDateIntent").with_slot("date", "1994-08-18"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("couldn't find an entry for 1994-08-18"));
        assert!(response.speech.contains("1994-08-20"));
        assert!(response.speech.contains("a fine day"));
    }

    #[test]
    fn read_on_empty_journal_suggests_creating_an_entry() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("ReadExistingEntryAbsoluteDateIntent").with_slot("date", "1994-08-18"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("journal is still empty"));
    }

    #[test]
    fn read_invalid_date_asks_again_with_example() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("ReadExistingEntryAbsoluteDateIntent").with_slot("date", "gibberish"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("didn't get that"));
        assert!(response.speech.contains("June 1997"));
    }

    #[test]
    fn read_month_lists_all_entries_of_month() {
        let (skill, tmp) = mk_skill();
        let mut journal = journal_at(&tmp);
        journal.add_entry(day("1994-08-04"), "first").unwrap();
        journal.add_entry(day("1994-08-20"), "second").unwrap();
        journal.add_entry(day("1994-09-01"), "other month").unwrap();

        let response = skill.handle_turn(&intent_turn(
            Intent::new("ReadAllEntriesInDate").with_slot("date", "1994-08-XX"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("August 1994"));
        assert!(response.speech.contains("first"));
        assert!(response.speech.contains("second"));
        assert!(!response.speech.contains("other month"));
    }

    #[test]
    fn list_month_without_entries_says_so() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("ListAllEntriesInDate").with_slot("date", "1994-08"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("couldn't find any entries for August 1994"));
    }

    #[test]
    fn relative_date_in_days_reads_entry() {
        let (skill, tmp) = mk_skill();
        let today = Local::now().date_naive();
        journal_at(&tmp).add_entry(today, "fresh entry").unwrap();

        let response = skill.handle_turn(&intent_turn(
            Intent::new("ReadExistingEntryRelativeDateIntent")
                .with_slot("number", "0")
                .with_resolved_slot("unit", "days", "DAYS"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("fresh entry"));
    }

    #[test]
    fn relative_date_with_huge_offset_is_answered_not_crashed() {
        let (skill, _tmp) = mk_skill();
        for (number, unit_value, resolution) in [
            ("400000000", "years", "YEARS"),
            ("4000000000", "days", "DAYS"),
        ] {
            let response = skill.handle_turn(&intent_turn(
                Intent::new("ReadExistingEntryRelativeDateIntent")
                    .with_slot("number", number)
                    .with_resolved_slot("unit", unit_value, resolution),
                "COMPLETED",
                serde_json::Value::Null,
            ));
            assert!(
                response.speech.contains("journal is still empty"),
                "{resolution}"
            );
            assert!(!response.end_session);
        }
    }

    #[test]
    fn relative_date_without_unit_match_reprompts() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("ReadExistingEntryRelativeDateIntent")
                .with_slot("number", "3")
                .with_resolved_slot("unit", "fortnight", "ER_SUCCESS_NO_MATCH"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("didn't get that"));
        assert_eq!(
            response.directive,
            Some(Directive::ElicitSlot("unit".to_string()))
        );
    }

    #[test]
    fn search_speaks_matching_entries() {
        let (skill, tmp) = mk_skill();
        let mut journal = journal_at(&tmp);
        journal.add_entry(day("1994-08-04"), "birthday party.").unwrap();
        journal.add_entry(day("1994-08-20"), "quiet day").unwrap();

        let response = skill.handle_turn(&intent_turn(
            Intent::new("SearchIntent").with_slot("query", "birthday"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("results for the query \"birthday\""));
        assert!(response.speech.contains("1994-08-04: birthday party."));
        assert!(!response.speech.contains("quiet day"));
    }

    #[test]
    fn long_search_results_are_capped_but_keep_closing_prompt() {
        let (skill, tmp) = mk_skill();
        let mut journal = journal_at(&tmp);
        let filler = "x".repeat(400);
        for day_of_month in 1..=28 {
            journal
                .add_entry(
                    day(&format!("1994-08-{day_of_month:02}")),
                    &format!("birthday {filler}"),
                )
                .unwrap();
        }

        let response = skill.handle_turn(&intent_turn(
            Intent::new("SearchIntent").with_slot("query", "birthday"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.len() <= RESPONSE_TEXT_LIMIT);
        // Results come date-ascending, so the cap drops the tail.
        assert!(response.speech.contains("1994-08-01"));
        assert!(!response.speech.contains("1994-08-28"));
        assert!(response
            .speech
            .ends_with("What do you want to do next in your journal?"));
    }

    #[test]
    fn search_without_hits_says_so() {
        let (skill, tmp) = mk_skill();
        journal_at(&tmp).add_entry(day("1994-08-04"), "gardening").unwrap();

        let response = skill.handle_turn(&intent_turn(
            Intent::new("SearchIntent").with_slot("query", "snowstorm"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("couldn't find any entries for the query"));
    }

    #[test]
    fn delete_flow_confirms_then_deletes() {
        let (skill, tmp) = mk_skill();
        journal_at(&tmp).add_entry(day("1994-08-20"), "remove me").unwrap();

        let response = skill.handle_turn(&intent_turn(
            Intent::new("DeleteEntryIntent").with_slot("date", "1994-08-20"),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("remove me"));
        assert_eq!(response.directive, Some(Directive::ConfirmIntent));

        let response = skill.handle_turn(&intent_turn(
            Intent::new("DeleteEntryIntent")
                .with_slot("date", "1994-08-20")
                .with_confirmation("CONFIRMED"),
            "COMPLETED",
            response.session,
        ));
        assert!(response.speech.contains("Okay. Deleted."));
        assert_eq!(journal_at(&tmp).get_entry(day("1994-08-20")).unwrap(), "");
    }

    #[test]
    fn delete_denied_keeps_entry() {
        let (skill, tmp) = mk_skill();
        journal_at(&tmp).add_entry(day("1994-08-20"), "keep me").unwrap();

        let response = skill.handle_turn(&intent_turn(
            Intent::new("DeleteEntryIntent")
                .with_slot("date", "1994-08-20")
                .with_confirmation("DENIED"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("Not deleted"));
        assert_eq!(
            journal_at(&tmp).get_entry(day("1994-08-20")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn delete_with_unknown_date_reports_not_found() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("DeleteEntryIntent").with_slot("date", "1994-08-20"),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("couldn't find an entry"));
    }

    #[test]
    fn delete_with_month_date_re_elicits_via_blanked_slot() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("DeleteEntryIntent").with_slot("date", "1994-08"),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));
        assert_eq!(response.directive, Some(Directive::Delegate));
        let updated = response.updated_intent.unwrap();
        assert_eq!(updated.slot_value("date"), "");
    }

    #[test]
    fn unknown_intent_is_fatal_and_ends_session() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("OrderPizzaIntent"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("internal error"));
        assert!(response.end_session);
    }

    #[test]
    fn unknown_dialog_phase_is_fatal() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent"),
            "HALF_DONE",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("internal error"));
        assert!(response.end_session);
    }

    #[test]
    fn unknown_confirmation_is_fatal() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", "2019-01-01")
                .with_confirmation("MAYBE"),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("internal error"));
    }

    #[test]
    fn provider_failure_is_spoken_not_fatal() {
        let skill = JournalSkill::new(
            Arc::new(FailingProvider),
            Box::new(PlainErrorInterpreter),
            Box::new(LoggingErrorReporter),
            Box::new(InMemoryConfigService::new()),
        );
        let response = skill.handle_turn(&intent_turn(
            Intent::new("SearchIntent").with_slot("query", "anything"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("spreadsheet unreachable"));
        assert!(!response.end_session);
    }

    #[test]
    fn be_succinct_persists_and_shortens_prompts() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("BeSuccinctIntent"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("I will be succinct"));

        // The next drafting prompt uses the short variant.
        let response = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent").with_slot("date", "2019-01-01"),
            "IN_PROGRESS",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("let's go!"));
    }

    #[test]
    fn succinct_hint_is_spoken_exactly_once() {
        let (skill, _tmp) = mk_skill();
        let date = "2019-01-01";
        let mut session = serde_json::Value::Null;
        for text in ["", "a part"] {
            let response = skill.handle_turn(&intent_turn(
                Intent::new("NewEntryIntent")
                    .with_slot("date", date)
                    .with_slot("text", text),
                "IN_PROGRESS",
                session,
            ));
            session = response.session;
        }

        let first = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot("text", "abort"),
            "IN_PROGRESS",
            session,
        ));
        assert!(first.speech.contains("be succinct"));

        let second = skill.handle_turn(&intent_turn(
            Intent::new("NewEntryIntent")
                .with_slot("date", date)
                .with_slot("text", "abort"),
            "IN_PROGRESS",
            first.session,
        ));
        assert!(!second.speech.contains("By the way"));
    }

    #[test]
    fn german_locale_speaks_german() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(
            &intent_turn(
                Intent::new("NewEntryIntent")
                    .with_slot("date", "2019-01-01")
                    .with_slot("text", "fertig"),
                "IN_PROGRESS",
                serde_json::Value::Null,
            )
            .with_locale("de-DE"),
        );
        assert!(response.speech.contains("nichts zu speichern"));
    }

    #[test]
    fn help_is_spoken() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("AMAZON.HelpIntent"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.speech.contains("create a new entry"));
    }

    #[test]
    fn stop_ends_the_session() {
        let (skill, _tmp) = mk_skill();
        let response = skill.handle_turn(&intent_turn(
            Intent::new("AMAZON.StopIntent"),
            "COMPLETED",
            serde_json::Value::Null,
        ));
        assert!(response.end_session);
    }
}

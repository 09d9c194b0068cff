//! Reducer wrappers around the core state units.
//!
//! Responses come back in `spawn_local` tasks, after the render that started
//! them. Folding them in through a reducer means each one is applied to the
//! latest state instead of a stale clone.

use std::rc::Rc;

use datamapper::{
    ClientError, FieldMapping, FlagController, MappingBook, PayloadForwarder, SchedulerFlag,
};
use yew::prelude::*;

use crate::client::ConsoleReporter;

#[derive(Clone, PartialEq, Default)]
pub struct BookState(pub MappingBook);

pub enum BookAction {
    SetApiField(String),
    SetDbField(String),
    /// Re-run validation so field errors show.
    Validate,
    Created(Result<FieldMapping, ClientError>),
    Listed(Result<Vec<FieldMapping>, ClientError>),
    DismissNotice,
}

impl Reducible for BookState {
    type Action = BookAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut book = self.0.clone();
        match action {
            BookAction::SetApiField(value) => book.set_api_field(value),
            BookAction::SetDbField(value) => book.set_db_field(value),
            BookAction::Validate => {
                let _ = book.validate();
            }
            BookAction::Created(result) => {
                book.record_created(result, &ConsoleReporter);
            }
            BookAction::Listed(result) => book.record_listed(result, &ConsoleReporter),
            BookAction::DismissNotice => book.dismiss_notice(),
        }
        Rc::new(BookState(book))
    }
}

#[derive(Clone, PartialEq)]
pub struct FlagStateHolder(pub FlagController);

pub enum FlagAction {
    Fetched {
        seq: u64,
        result: Result<SchedulerFlag, ClientError>,
    },
    Toggled {
        seq: u64,
        result: Result<SchedulerFlag, ClientError>,
    },
    DismissNotice,
}

impl Reducible for FlagStateHolder {
    type Action = FlagAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut controller = self.0.clone();
        match action {
            FlagAction::Fetched { seq, result } => {
                controller.settle_fetch(seq, result, &ConsoleReporter);
            }
            FlagAction::Toggled { seq, result } => {
                controller.settle_toggle(seq, result, &ConsoleReporter);
            }
            FlagAction::DismissNotice => controller.dismiss_notice(),
        }
        Rc::new(FlagStateHolder(controller))
    }
}

#[derive(Clone, PartialEq, Default)]
pub struct ForwarderState(pub PayloadForwarder);

pub enum ForwarderAction {
    SetText(String),
    /// Clear the old banner and parse; reports and flags invalid JSON.
    Begin,
    Finished(Result<(), ClientError>),
}

impl Reducible for ForwarderState {
    type Action = ForwarderAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut forwarder = self.0.clone();
        match action {
            ForwarderAction::SetText(text) => forwarder.set_text(text),
            ForwarderAction::Begin => {
                let _ = forwarder.begin_send(&ConsoleReporter);
            }
            ForwarderAction::Finished(result) => {
                let _ = forwarder.finish_send(result, &ConsoleReporter);
            }
        }
        Rc::new(ForwarderState(forwarder))
    }
}
